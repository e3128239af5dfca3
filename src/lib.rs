// Client Pulse - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod journey;
pub mod metrics;
pub mod model;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use journey::client_journey;
pub use metrics::{
    compute_metrics, compute_metrics_with, days_between, percentage, GroupKey, Metrics,
    StatusDistribution, TypeDistribution,
};
pub use model::{
    parse_iso_date, Client, ClientStatus, ClientType, Interaction, InteractionType,
};
pub use store::{DataFile, JsonStore, NewClient, NewInteraction};
pub use validation::{
    error_message, validate_client, validate_interaction, ValidationError, ValidationResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default data file name, resolved against the working directory.
pub const DEFAULT_DATA_FILE: &str = "data.json";
