// 📊 Metrics Aggregator - derived dashboard numbers
//
// Pure functions over the two collections. No I/O, no shared state: callers
// fetch the clients and interactions, this module only counts and averages.

use crate::model::{parse_iso_date, Client, ClientStatus, ClientType, Interaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MS_PER_DAY: i64 = 86_400_000;

// ============================================================================
// GROUPING KEY
// ============================================================================

/// How interaction `clientId` values are grouped for the duration average.
///
/// The reference dashboard groups by the raw string (case-sensitive) while
/// the journey view matches names case-insensitively. That mismatch is real;
/// rather than unify it silently the aggregator takes the mode as a
/// parameter and defaults to the dashboard behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupKey {
    /// Raw `clientId` string ("Acme" and "acme" are distinct groups).
    #[default]
    Exact,
    /// Lowercased `clientId` ("Acme" and "acme" merge into one group).
    CaseInsensitive,
}

impl GroupKey {
    fn normalize(&self, client_id: &str) -> String {
        match self {
            GroupKey::Exact => client_id.to_string(),
            GroupKey::CaseInsensitive => client_id.to_lowercase(),
        }
    }
}

// ============================================================================
// METRICS RECORD
// ============================================================================

/// Distribution of clients across tiers.
///
/// Clients with a tier outside {Ordinario, Premium} land in neither bucket,
/// so `ordinario + premium <= total_clients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TypeDistribution {
    pub ordinario: usize,
    pub premium: usize,
}

/// Distribution of clients across statuses.
///
/// `other` absorbs `Desconocido` and any unexpected value, so
/// `activo + dormido + other == total_clients` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StatusDistribution {
    pub activo: usize,
    pub dormido: usize,
    pub other: usize,
}

/// Flat metrics record consumed by the dashboard and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_interactions: usize,
    pub total_clients: usize,
    pub total_repurchase_opportunities: usize,
    pub count_by_type: TypeDistribution,
    pub count_by_status: StatusDistribution,
    /// Mean day-span between first and last interaction, across clients with
    /// 2+ interactions, rounded to the nearest whole day. 0 if none qualify.
    pub average_relationship_duration_days: i64,
}

impl Metrics {
    /// Share of interactions flagged with repurchase potential, 0-100.
    pub fn repurchase_rate(&self) -> f64 {
        percentage(
            self.total_repurchase_opportunities as f64,
            self.total_interactions as f64,
        )
    }

    pub fn pct_ordinario(&self) -> f64 {
        percentage(self.count_by_type.ordinario as f64, self.total_clients as f64)
    }

    pub fn pct_premium(&self) -> f64 {
        percentage(self.count_by_type.premium as f64, self.total_clients as f64)
    }

    pub fn pct_activo(&self) -> f64 {
        percentage(self.count_by_status.activo as f64, self.total_clients as f64)
    }

    pub fn pct_dormido(&self) -> f64 {
        percentage(self.count_by_status.dormido as f64, self.total_clients as f64)
    }
}

/// Zero-safe percentage: a zero total yields 0, never NaN.
pub fn percentage(value: f64, total: f64) -> f64 {
    if total > 0.0 {
        (value / total) * 100.0
    } else {
        0.0
    }
}

/// Day-span between two instants: ceil(|b - a| / 86 400 000 ms).
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
    let ms = (b - a).num_milliseconds().abs();
    (ms + MS_PER_DAY - 1) / MS_PER_DAY
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Compute dashboard metrics with the default (case-sensitive) grouping.
pub fn compute_metrics(clients: &[Client], interactions: &[Interaction]) -> Metrics {
    compute_metrics_with(clients, interactions, GroupKey::Exact)
}

/// Compute dashboard metrics, grouping interactions by `clientId` under the
/// given normalization mode.
///
/// Interactions whose date does not parse are excluded from the duration
/// computation (they still count toward the totals). This is a deliberate
/// departure from the reference, which let invalid dates poison the average.
pub fn compute_metrics_with(
    clients: &[Client],
    interactions: &[Interaction],
    group_key: GroupKey,
) -> Metrics {
    let mut count_by_type = TypeDistribution::default();
    let mut count_by_status = StatusDistribution::default();

    for client in clients {
        match client.client_type {
            ClientType::Ordinario => count_by_type.ordinario += 1,
            ClientType::Premium => count_by_type.premium += 1,
            // Out-of-enum tiers are counted in neither bucket.
            ClientType::Otro(_) => {}
        }

        match client.status {
            ClientStatus::Activo => count_by_status.activo += 1,
            ClientStatus::Dormido => count_by_status.dormido += 1,
            ClientStatus::Desconocido | ClientStatus::Otro(_) => count_by_status.other += 1,
        }
    }

    let total_repurchase_opportunities = interactions
        .iter()
        .filter(|i| i.repurchase_potential)
        .count();

    // Group parseable interaction dates by (normalized) clientId.
    let mut dates_by_client: HashMap<String, Vec<DateTime<Utc>>> = HashMap::new();
    for interaction in interactions {
        if let Some(date) = parse_iso_date(&interaction.date) {
            dates_by_client
                .entry(group_key.normalize(&interaction.client_id))
                .or_default()
                .push(date);
        }
    }

    // Groups with a single interaction are excluded from both the numerator
    // and the denominator of the average.
    let spans: Vec<i64> = dates_by_client
        .values()
        .filter(|dates| dates.len() > 1)
        .map(|dates| {
            let first = *dates.iter().min().unwrap();
            let last = *dates.iter().max().unwrap();
            days_between(first, last)
        })
        .collect();

    let average_relationship_duration_days = if spans.is_empty() {
        0
    } else {
        let sum: i64 = spans.iter().sum();
        (sum as f64 / spans.len() as f64).round() as i64
    };

    Metrics {
        total_interactions: interactions.len(),
        total_clients: clients.len(),
        total_repurchase_opportunities,
        count_by_type,
        count_by_status,
        average_relationship_duration_days,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientStatus, ClientType, InteractionType};

    fn client(id: i64, name: &str, status: &str, tier: &str) -> Client {
        Client {
            id,
            name: name.to_string(),
            status: ClientStatus::from(status.to_string()),
            client_type: ClientType::from(tier.to_string()),
            product: String::new(),
            brand: String::new(),
        }
    }

    fn interaction(id: i64, client_id: &str, date: &str, repurchase: bool) -> Interaction {
        Interaction {
            id,
            client_id: client_id.to_string(),
            interaction_type: InteractionType::Estrategica,
            date: date.to_string(),
            notes: String::new(),
            repurchase_potential: repurchase,
        }
    }

    #[test]
    fn test_empty_collections_all_zero() {
        let metrics = compute_metrics(&[], &[]);

        assert_eq!(metrics, Metrics::default());
        assert_eq!(metrics.repurchase_rate(), 0.0);
        assert_eq!(metrics.pct_ordinario(), 0.0);
        assert_eq!(metrics.pct_activo(), 0.0);
    }

    #[test]
    fn test_single_client_two_interactions() {
        // Scenario: one Premium/Activo client, 10 days between two touchpoints.
        let clients = vec![client(1, "Acme", "Activo", "Premium")];
        let interactions = vec![
            interaction(1, "Acme", "2024-01-01", true),
            interaction(2, "Acme", "2024-01-11", false),
        ];

        let metrics = compute_metrics(&clients, &interactions);

        assert_eq!(metrics.total_interactions, 2);
        assert_eq!(metrics.total_clients, 1);
        assert_eq!(metrics.total_repurchase_opportunities, 1);
        assert_eq!(metrics.average_relationship_duration_days, 10);
        assert_eq!(metrics.count_by_type.premium, 1);
        assert_eq!(metrics.count_by_type.ordinario, 0);
        assert_eq!(metrics.count_by_status.activo, 1);
    }

    #[test]
    fn test_singleton_groups_excluded_from_average() {
        let clients = vec![
            client(1, "Acme", "Activo", "Premium"),
            client(2, "Globex", "Activo", "Ordinario"),
        ];
        let interactions = vec![
            interaction(1, "Acme", "2024-01-01", false),
            interaction(2, "Acme", "2024-01-21", false),
            // Globex has one interaction: no span, not in the denominator.
            interaction(3, "Globex", "2024-06-01", false),
        ];

        let metrics = compute_metrics(&clients, &interactions);

        assert_eq!(metrics.average_relationship_duration_days, 20);
    }

    #[test]
    fn test_only_singletons_average_is_zero() {
        let interactions = vec![
            interaction(1, "Acme", "2024-01-01", false),
            interaction(2, "Globex", "2024-06-01", false),
        ];

        let metrics = compute_metrics(&[], &interactions);

        assert_eq!(metrics.average_relationship_duration_days, 0);
        assert_eq!(metrics.total_interactions, 2);
    }

    #[test]
    fn test_grouping_is_case_sensitive_by_default() {
        // "Acme" and "acme" are distinct groups under the default mode, so
        // neither reaches 2 interactions and the average stays 0.
        let interactions = vec![
            interaction(1, "Acme", "2024-01-01", false),
            interaction(2, "acme", "2024-01-11", false),
        ];

        let metrics = compute_metrics(&[], &interactions);
        assert_eq!(metrics.average_relationship_duration_days, 0);

        // Under case-insensitive normalization they merge into one group.
        let merged = compute_metrics_with(&[], &interactions, GroupKey::CaseInsensitive);
        assert_eq!(merged.average_relationship_duration_days, 10);
    }

    #[test]
    fn test_unparseable_dates_excluded_from_duration() {
        let interactions = vec![
            interaction(1, "Acme", "2024-01-01", false),
            interaction(2, "Acme", "garbage", false),
            interaction(3, "Acme", "2024-01-06", false),
        ];

        let metrics = compute_metrics(&[], &interactions);

        // The bad date drops out; span is computed over the two valid dates.
        assert_eq!(metrics.average_relationship_duration_days, 5);
        // Totals still count the malformed interaction.
        assert_eq!(metrics.total_interactions, 3);
    }

    #[test]
    fn test_average_over_multiple_groups_unweighted() {
        let interactions = vec![
            interaction(1, "Acme", "2024-01-01", false),
            interaction(2, "Acme", "2024-01-11", false),
            interaction(3, "Globex", "2024-02-01", false),
            interaction(4, "Globex", "2024-02-03", false),
            interaction(5, "Globex", "2024-02-05", false),
        ];

        let metrics = compute_metrics(&[], &interactions);

        // Spans: Acme 10, Globex 4 -> mean 7 (group size does not weight).
        assert_eq!(metrics.average_relationship_duration_days, 7);
    }

    #[test]
    fn test_status_buckets_partition_total() {
        let clients = vec![
            client(1, "A", "Activo", "Ordinario"),
            client(2, "B", "Dormido", "Premium"),
            client(3, "C", "Desconocido", "Ordinario"),
            client(4, "D", "Congelado", "Premium"),
        ];

        let metrics = compute_metrics(&clients, &[]);

        let s = &metrics.count_by_status;
        assert_eq!(s.activo + s.dormido + s.other, metrics.total_clients);
        assert_eq!(s.activo, 1);
        assert_eq!(s.dormido, 1);
        assert_eq!(s.other, 2);
    }

    #[test]
    fn test_out_of_enum_type_counted_in_neither_bucket() {
        let clients = vec![
            client(1, "A", "Activo", "Ordinario"),
            client(2, "B", "Activo", "Platino"),
        ];

        let metrics = compute_metrics(&clients, &[]);

        assert_eq!(metrics.count_by_type.ordinario, 1);
        assert_eq!(metrics.count_by_type.premium, 0);
        assert!(
            metrics.count_by_type.ordinario + metrics.count_by_type.premium
                < metrics.total_clients
        );
    }

    #[test]
    fn test_idempotent() {
        let clients = vec![client(1, "Acme", "Activo", "Premium")];
        let interactions = vec![
            interaction(1, "Acme", "2024-01-01", true),
            interaction(2, "Acme", "2024-01-11", false),
        ];

        let first = compute_metrics(&clients, &interactions);
        let second = compute_metrics(&clients, &interactions);

        assert_eq!(first, second);
    }

    #[test]
    fn test_days_between_ceils_partial_days() {
        let a = parse_iso_date("2024-01-01T00:00:00Z").unwrap();
        let b = parse_iso_date("2024-01-02T06:00:00Z").unwrap();

        // 1.25 days rounds up to 2, matching ceil(ms / 86_400_000).
        assert_eq!(days_between(a, b), 2);
        assert_eq!(days_between(b, a), 2);
        assert_eq!(days_between(a, a), 0);
    }

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(percentage(5.0, 0.0), 0.0);
        assert_eq!(percentage(1.0, 4.0), 25.0);
    }

    #[test]
    fn test_metrics_wire_format() {
        let metrics = compute_metrics(&[client(1, "Acme", "Activo", "Premium")], &[]);
        let json = serde_json::to_value(&metrics).unwrap();

        assert_eq!(json["totalClients"], 1);
        assert_eq!(json["countByType"]["premium"], 1);
        assert_eq!(json["countByStatus"]["activo"], 1);
        assert_eq!(json["averageRelationshipDurationDays"], 0);
    }
}
