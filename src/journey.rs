// 🧭 Customer journey - one client's interaction history, oldest first
//
// Matching here is by client NAME, case-insensitively. The metrics
// aggregator deliberately groups by the raw clientId string instead; see
// metrics::GroupKey for the documented mismatch.

use crate::model::{Client, Interaction};

/// Interactions belonging to `client`, sorted ascending by date.
///
/// Interactions whose date does not parse sort after all dated ones, in
/// their original order.
pub fn client_journey(client: &Client, interactions: &[Interaction]) -> Vec<Interaction> {
    let name = client.name.to_lowercase();

    let mut matched: Vec<Interaction> = interactions
        .iter()
        .filter(|i| i.client_id.to_lowercase() == name)
        .cloned()
        .collect();

    matched.sort_by_key(|i| match i.parsed_date() {
        Some(date) => (0, date.timestamp_millis()),
        None => (1, 0),
    });

    matched
}

// ============================================================================
// TESTS
// ============================================================================
