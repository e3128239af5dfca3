// 👥 Client & Interaction records - the two collections everything else consumes
//
// Wire format is the camelCase JSON the REST API speaks. Status/type values
// arrive as free-form strings from the outside; they are classified into
// enums at this boundary, with a lossless catch-all so unknown values
// round-trip instead of being rejected or silently rewritten.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLIENT STATUS
// ============================================================================

/// Client lifecycle status.
///
/// `Otro` keeps the raw wire value so a record with an unexpected status
/// survives a read/write cycle unchanged. The metrics layer buckets it
/// (together with `Desconocido`) under "other".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClientStatus {
    Activo,
    Dormido,
    Desconocido,
    Otro(String),
}

impl ClientStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ClientStatus::Activo => "Activo",
            ClientStatus::Dormido => "Dormido",
            ClientStatus::Desconocido => "Desconocido",
            ClientStatus::Otro(raw) => raw,
        }
    }
}

impl From<String> for ClientStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Activo" => ClientStatus::Activo,
            "Dormido" => ClientStatus::Dormido,
            "Desconocido" => ClientStatus::Desconocido,
            _ => ClientStatus::Otro(raw),
        }
    }
}

impl From<ClientStatus> for String {
    fn from(status: ClientStatus) -> Self {
        status.as_str().to_string()
    }
}

// ============================================================================
// CLIENT TYPE
// ============================================================================

/// Client tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClientType {
    Ordinario,
    Premium,
    Otro(String),
}

impl ClientType {
    pub fn as_str(&self) -> &str {
        match self {
            ClientType::Ordinario => "Ordinario",
            ClientType::Premium => "Premium",
            ClientType::Otro(raw) => raw,
        }
    }
}

impl From<String> for ClientType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Ordinario" => ClientType::Ordinario,
            "Premium" => ClientType::Premium,
            _ => ClientType::Otro(raw),
        }
    }
}

impl From<ClientType> for String {
    fn from(t: ClientType) -> Self {
        t.as_str().to_string()
    }
}

// ============================================================================
// INTERACTION TYPE
// ============================================================================

/// Kind of logged touchpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InteractionType {
    Estrategica,
    Preventa,
    Postventa,
    Otro(String),
}

impl InteractionType {
    pub fn as_str(&self) -> &str {
        match self {
            InteractionType::Estrategica => "Estratégica",
            InteractionType::Preventa => "Preventa",
            InteractionType::Postventa => "Postventa",
            InteractionType::Otro(raw) => raw,
        }
    }
}

impl From<String> for InteractionType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Estratégica" => InteractionType::Estrategica,
            "Preventa" => InteractionType::Preventa,
            "Postventa" => InteractionType::Postventa,
            _ => InteractionType::Otro(raw),
        }
    }
}

impl From<InteractionType> for String {
    fn from(t: InteractionType) -> Self {
        t.as_str().to_string()
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// A tracked customer/account entity.
///
/// Identity is `id` (creation-time milliseconds). `name` is unique by
/// convention only; nothing here enforces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub status: ClientStatus,
    #[serde(rename = "type")]
    pub client_type: ClientType,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub brand: String,
}

// ============================================================================
// INTERACTION
// ============================================================================

/// A logged touchpoint tied to a client by name.
///
/// `client_id` is a client NAME, not a numeric id, and need not resolve to
/// an existing client. The date stays a raw string on the wire; parse it
/// with [`Interaction::parsed_date`] when doing date math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub date: String,
    #[serde(default)]
    pub notes: String,
    #[serde(rename = "repurchasePotential", default)]
    pub repurchase_potential: bool,
}

impl Interaction {
    /// Parse the ISO date string. Accepts a plain date (`2024-01-11`) or a
    /// full RFC 3339 timestamp; returns None for anything unparseable.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        parse_iso_date(&self.date)
    }
}

/// Parse an ISO date string into a UTC instant (plain dates at midnight).
pub fn parse_iso_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Utc
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .single();
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ============================================================================
// TESTS
// ============================================================================
