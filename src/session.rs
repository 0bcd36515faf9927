// 🗂️ Session - one operator's copy of the three stores
//
// Every core call takes the session (or its stores) explicitly. Sessions are
// never shared: a server hosting several operators gives each its own.

use crate::config::AppConfig;
use crate::csv_io;
use crate::engine::{self, CostBreakdown, ProductCost};
use crate::entities::{Product, ProductCatalog, RateChart, VariableName, VariableSet, VariableValue};
use crate::error::{CostResult, ValidationError};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// All-products cost table, stamped with when it was computed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTable {
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<ProductCost>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub catalog: ProductCatalog,
    pub rates: RateChart,
    pub variables: VariableSet,
}

impl Session {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The sample products, rate chart and variables the tool starts with
    pub fn seeded() -> Self {
        Session {
            catalog: ProductCatalog::with_defaults(),
            rates: RateChart::with_defaults(),
            variables: VariableSet::with_defaults(),
        }
    }

    /// Seeded session, with products/rates replaced from CSV where configured
    pub fn load(config: &AppConfig) -> Result<Self> {
        let mut session = Session::seeded();

        if let Some(path) = &config.products_csv {
            session.catalog = csv_io::load_products(path)?;
            info!(path = %path.display(), count = session.catalog.len(), "loaded products");
        }
        if let Some(path) = &config.rates_csv {
            session.rates = csv_io::load_rates(path)?;
            info!(path = %path.display(), count = session.rates.len(), "loaded rate chart");
        }

        Ok(session)
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub fn add_product(&mut self, name: &str, smallest: u32, largest: u32) -> Result<Product, ValidationError> {
        let product = self.catalog.add(name, smallest, largest)?.clone();
        info!(product = %product.name, smallest, largest, "added product");
        Ok(product)
    }

    pub fn update_product(&mut self, id: &str, name: &str, smallest: u32, largest: u32) -> Result<(), ValidationError> {
        self.catalog.update(id, name, smallest, largest)?;
        info!(id, product = name, smallest, largest, "updated product");
        Ok(())
    }

    pub fn remove_product(&mut self, id: &str) -> Result<Product, ValidationError> {
        let removed = self
            .catalog
            .remove(id)
            .ok_or_else(|| ValidationError::missing("ProductCatalog", "id", format!("Unknown product id: {}", id)))?;
        info!(product = %removed.name, "removed product");
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Rates
    // ------------------------------------------------------------------

    pub fn add_rate(&mut self, size: u32, rate: f64) -> Result<(), ValidationError> {
        self.rates.insert(size, rate)?;
        info!(size, rate, "added rate");
        Ok(())
    }

    pub fn update_rate(&mut self, size: u32, rate: f64) -> Result<(), ValidationError> {
        self.rates.update(size, rate)?;
        info!(size, rate, "updated rate");
        Ok(())
    }

    pub fn remove_rate(&mut self, size: u32) -> Result<(), ValidationError> {
        self.rates
            .remove(size)
            .ok_or_else(|| ValidationError::missing("RateChart", "size", format!("No rate for size {}", size)))?;
        info!(size, "removed rate");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    pub fn set_variable(&mut self, name: VariableName, display: &str) -> CostResult<VariableValue> {
        let value = self.variables.set_display(name, display)?;
        info!(variable = %name, value = %value.display(), "updated variable");
        Ok(value)
    }

    // ------------------------------------------------------------------
    // Calculation
    // ------------------------------------------------------------------

    pub fn compute_cost(&self, product_name: &str) -> CostResult<CostBreakdown> {
        engine::compute_cost(product_name, &self.catalog, &self.rates, &self.variables)
    }

    pub fn compute_all(&self) -> CostResult<CostTable> {
        let rows = engine::compute_all_costs(&self.catalog, &self.rates, &self.variables)?;
        Ok(CostTable {
            generated_at: Utc::now(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CostError;

    #[test]
    fn test_seeded_session_computes_every_product() {
        let session = Session::seeded();
        let table = session.compute_all().unwrap();

        assert_eq!(table.rows.len(), 5);
        assert!(table.rows.iter().all(|r| r.final_cost_usd > 0.0));
    }

    #[test]
    fn test_empty_session_reports_missing_variable() {
        let mut session = Session::empty();
        session.add_product("Solo", 5, 6).unwrap();

        let err = session.compute_cost("Solo").unwrap_err();
        assert!(matches!(err, CostError::Configuration { .. }));
    }

    #[test]
    fn test_edits_flow_into_calculation() {
        let mut session = Session::seeded();
        let before = session.compute_cost("Product 4").unwrap().final_cost_usd;

        session.update_rate(5, 2000.0).unwrap();
        let after = session.compute_cost("Product 4").unwrap().final_cost_usd;
        assert!(after > before);

        session.set_variable(VariableName::FreightPerKg, "$0.50").unwrap();
        let with_freight = session.compute_cost("Product 4").unwrap().final_cost_usd;
        assert!((with_freight - after - 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_product_lifecycle() {
        let mut session = Session::seeded();

        let added = session.add_product("Scampi", 9, 12).unwrap();
        assert!(session.compute_cost("Scampi").is_ok());

        session.update_product(&added.id, "Scampi XL", 5, 8).unwrap();
        assert!(session.compute_cost("Scampi").is_err());
        assert!(session.compute_cost("Scampi XL").is_ok());

        session.remove_product(&added.id).unwrap();
        assert!(session.remove_product(&added.id).is_err());
        assert_eq!(session.catalog.len(), 5);
    }

    #[test]
    fn test_rate_lifecycle() {
        let mut session = Session::seeded();

        session.add_rate(25, 800.0).unwrap();
        assert!(session.add_rate(25, 700.0).is_err());
        assert_eq!(session.rates.get(25), Some(800.0));

        session.remove_rate(25).unwrap();
        assert!(session.remove_rate(25).is_err());
    }
}
