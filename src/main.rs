use anyhow::Result;
use std::env;

use client_pulse::{compute_metrics, JsonStore, Metrics, DEFAULT_DATA_FILE};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    // Usage: client-pulse [stats] [path-to-data.json]
    let data_path = match args.get(1).map(String::as_str) {
        Some("stats") => args.get(2).cloned(),
        Some(path) => Some(path.to_string()),
        None => None,
    }
    .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());

    run_stats(&data_path)
}

fn run_stats(data_path: &str) -> Result<()> {
    println!("📊 Client Pulse - Metrics Dashboard");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = JsonStore::open(data_path)?;
    println!(
        "✓ Loaded {} clients, {} interactions from {}\n",
        store.clients().len(),
        store.interactions().len(),
        data_path
    );

    let metrics = compute_metrics(store.clients(), store.interactions());
    print_metrics(&metrics);

    Ok(())
}

fn print_metrics(metrics: &Metrics) {
    println!("Total conversaciones:     {}", metrics.total_interactions);
    println!("Total clientes:           {}", metrics.total_clients);
    println!(
        "Oportunidades recompra:   {} ({:.0}%)",
        metrics.total_repurchase_opportunities,
        metrics.repurchase_rate()
    );
    println!(
        "Duración media relación:  {} días",
        metrics.average_relationship_duration_days
    );

    println!("\nDistribución por tipo:");
    println!(
        "  Ordinario: {} ({:.0}%)",
        metrics.count_by_type.ordinario,
        metrics.pct_ordinario()
    );
    println!(
        "  Premium:   {} ({:.0}%)",
        metrics.count_by_type.premium,
        metrics.pct_premium()
    );

    println!("\nDistribución por estado:");
    println!(
        "  Activos:   {} ({:.0}%)",
        metrics.count_by_status.activo,
        metrics.pct_activo()
    );
    println!(
        "  Dormidos:  {} ({:.0}%)",
        metrics.count_by_status.dormido,
        metrics.pct_dormido()
    );
    println!("  Otros:     {}", metrics.count_by_status.other);
}
