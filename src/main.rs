// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Result};
use std::env;
use std::path::Path;

// Use library instead of local modules
use seafood_cost::{csv_io, format_amount, format_usd, logging, AppConfig, QualityEngine, Session};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    // The TUI owns the terminal; keep log noise down while it runs
    let default_filter = if command.is_none() { "error" } else { "info" };
    logging::init(default_filter);

    let config = AppConfig::from_env();
    let session = Session::load(&config)?;

    match command {
        None => run_ui_mode(session)?,
        Some("costs") => run_costs(&session, args.get(2).map(String::as_str) == Some("--json"))?,
        Some("cost") => match args.get(2) {
            Some(product) => run_cost(&session, product)?,
            None => bail!("usage: seafood-cost cost <product>"),
        },
        Some("check") => run_check(&session),
        Some("export") => match args.get(2) {
            Some(path) => run_export(&session, Path::new(path))?,
            None => bail!("usage: seafood-cost export <path>"),
        },
        Some("export-products") => match args.get(2) {
            Some(path) => run_export_products(&session, Path::new(path))?,
            None => bail!("usage: seafood-cost export-products <path>"),
        },
        Some("export-rates") => match args.get(2) {
            Some(path) => run_export_rates(&session, Path::new(path))?,
            None => bail!("usage: seafood-cost export-rates <path>"),
        },
        Some(other) => bail!(
            "unknown command '{}'. Commands: costs [--json] | cost <product> | check | export <path> | export-products <path> | export-rates <path>",
            other
        ),
    }

    Ok(())
}

fn run_costs(session: &Session, json: bool) -> Result<()> {
    let table = session.compute_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }

    println!("{:<24} {:>12}", "Product", "Cost (USD)");
    println!("{}", "-".repeat(37));
    for row in &table.rows {
        println!("{:<24} {:>12}", row.product, format_usd(row.final_cost_usd));
    }

    Ok(())
}

fn run_cost(session: &Session, product: &str) -> Result<()> {
    let breakdown = session.compute_cost(product)?;

    println!(
        "The final cost for {} is: {} USD\n",
        breakdown.product,
        format_usd(breakdown.final_cost_usd)
    );
    for (label, value) in breakdown.lines() {
        println!("{:<26} {:>12}", label.as_str(), format_amount(value));
    }

    Ok(())
}

fn run_check(session: &Session) {
    let report = QualityEngine::new().check(session);

    println!("{}", report.summary());
    for issue in &report.issues {
        println!(
            "[{}] {}: {} ({})",
            issue.severity.as_str(),
            issue.subject,
            issue.issue,
            issue.recommendation
        );
    }
}

fn run_export(session: &Session, path: &Path) -> Result<()> {
    let table = session.compute_all()?;
    csv_io::write_cost_table(&table, path)?;
    println!("✓ Wrote {} products to {}", table.rows.len(), path.display());
    Ok(())
}

fn run_export_products(session: &Session, path: &Path) -> Result<()> {
    csv_io::write_products(&session.catalog, path)?;
    println!("✓ Wrote {} products to {}", session.catalog.len(), path.display());
    Ok(())
}

fn run_export_rates(session: &Session, path: &Path) -> Result<()> {
    csv_io::write_rates(&session.rates, path)?;
    println!("✓ Wrote {} rates to {}", session.rates.len(), path.display());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(session: Session) -> Result<()> {
    let mut app = ui::App::new(session);
    ui::run_ui(&mut app)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_session: Session) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the CLI: seafood-cost costs");
    std::process::exit(1);
}
