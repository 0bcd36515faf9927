// 📂 CSV import/export
//
// Column headings follow the spreadsheet the tool replaced:
//   products.csv : Product, Smallest Raw Material, Largest Raw Material
//   rates.csv    : Size, Rate (Tk.)
//   costs.csv    : Product, Cost (USD)
//
// Rows go through the same validation as manual edits.

use crate::entities::{ProductCatalog, RateChart};
use crate::present::format_amount;
use crate::session::CostTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct ProductRow {
    #[serde(rename = "Product")]
    product: String,
    #[serde(rename = "Smallest Raw Material")]
    smallest: u32,
    #[serde(rename = "Largest Raw Material")]
    largest: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct RateRow {
    #[serde(rename = "Size")]
    size: u32,
    #[serde(rename = "Rate (Tk.)")]
    rate: f64,
}

#[derive(Debug, Serialize)]
struct CostRow<'a> {
    #[serde(rename = "Product")]
    product: &'a str,
    #[serde(rename = "Cost (USD)")]
    cost_usd: String,
}

pub fn load_products(csv_path: &Path) -> Result<ProductCatalog> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open products CSV {}", csv_path.display()))?;

    let mut catalog = ProductCatalog::new();
    for (i, result) in rdr.deserialize().enumerate() {
        // header is line 1
        let line = i + 2;
        let row: ProductRow = result.with_context(|| format!("Failed to read product on line {}", line))?;
        catalog
            .add(&row.product, row.smallest, row.largest)
            .with_context(|| format!("Invalid product on line {}", line))?;
    }

    Ok(catalog)
}

pub fn load_rates(csv_path: &Path) -> Result<RateChart> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open rates CSV {}", csv_path.display()))?;

    let mut chart = RateChart::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let line = i + 2;
        let row: RateRow = result.with_context(|| format!("Failed to read rate on line {}", line))?;
        chart
            .insert(row.size, row.rate)
            .with_context(|| format!("Invalid rate on line {}", line))?;
    }

    Ok(chart)
}

pub fn write_products(catalog: &ProductCatalog, csv_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;
    for p in catalog.iter() {
        wtr.serialize(ProductRow {
            product: p.name.clone(),
            smallest: p.smallest_size,
            largest: p.largest_size,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_rates(chart: &RateChart, csv_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;
    for e in chart.iter() {
        wtr.serialize(RateRow { size: e.size, rate: e.rate })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the all-products table, costs rounded to 2 decimals
pub fn write_cost_table(table: &CostTable, csv_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(csv_path)
        .with_context(|| format!("Failed to create {}", csv_path.display()))?;
    for row in &table.rows {
        wtr.serialize(CostRow {
            product: &row.product,
            cost_usd: format_amount(row.final_cost_usd),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use std::fs;

    #[test]
    fn test_load_products_with_original_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        fs::write(
            &path,
            "Product,Smallest Raw Material,Largest Raw Material\nTiger,13,17\nVannamei,20,24\n",
        )
        .unwrap();

        let catalog = load_products(&path).unwrap();
        assert_eq!(catalog.names(), vec!["Tiger", "Vannamei"]);
        assert_eq!(catalog.find("Tiger").unwrap().sizes(), 13..=17);
    }

    #[test]
    fn test_load_products_rejects_invalid_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        fs::write(
            &path,
            "Product,Smallest Raw Material,Largest Raw Material\nTiger,13,17\nBroken,20,10\n",
        )
        .unwrap();

        let err = load_products(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));
    }

    #[test]
    fn test_load_rates_rejects_duplicate_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rates.csv");
        fs::write(&path, "Size,Rate (Tk.)\n5,1700\n6,1700\n5,1600\n").unwrap();

        let err = load_rates(&path).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("line 4"));
        assert!(msg.contains("already exists"));
    }

    #[test]
    fn test_write_then_load_session_tables() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::seeded();

        let products = dir.path().join("products.csv");
        let rates = dir.path().join("rates.csv");
        write_products(&session.catalog, &products).unwrap();
        write_rates(&session.rates, &rates).unwrap();

        assert_eq!(load_products(&products).unwrap().names(), session.catalog.names());
        assert_eq!(load_rates(&rates).unwrap(), session.rates);
    }

    #[test]
    fn test_write_cost_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("costs.csv");
        let table = Session::seeded().compute_all().unwrap();

        write_cost_table(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Product,Cost (USD)"));
        assert_eq!(content.lines().count(), 6);
        assert!(content.contains(&format!("Product 1,{:.2}", table.rows[0].final_cost_usd)));
    }
}
