// 🧮 Cost Engine - per-kilogram export cost of a product
//
// Pipeline:
//   raw material  = mean rate over the product's size range (0 if uncovered)
//   FOB (Tk.)     = raw material + variable overhead + fixed overhead
//   FOB (USD)     = FOB (Tk.) / USD rate
//   subsidy       = FOB (USD) * subsidy rate / 100
//   net FOB (USD) = FOB (USD) - subsidy
//   final cost    = net FOB (USD) + freight per kg
//
// Pure: reads the three stores, mutates nothing, rounds nothing.

use crate::entities::{ProductCatalog, RateChart, VariableName, VariableSet};
use crate::error::{CostError, CostResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ============================================================================
// BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakdownLabel {
    RawMaterialCostTk,
    FobCostTk,
    FobCostUsd,
    SubsidyUsd,
    NetFobCostUsd,
    FreightPerKgUsd,
    FinalCostUsd,
}

impl BreakdownLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakdownLabel::RawMaterialCostTk => "Raw Material Cost (Tk.)",
            BreakdownLabel::FobCostTk => "FOB Cost (Tk.)",
            BreakdownLabel::FobCostUsd => "FOB Cost (USD)",
            BreakdownLabel::SubsidyUsd => "Subsidy (USD)",
            BreakdownLabel::NetFobCostUsd => "Net FOB Cost (USD)",
            BreakdownLabel::FreightPerKgUsd => "Freight per Kg (USD)",
            BreakdownLabel::FinalCostUsd => "Final Cost (USD)",
        }
    }
}

/// Result of one cost derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub product: String,
    /// Rate entries that fell inside the product's size range
    pub matched_sizes: usize,

    pub raw_material_cost_tk: f64,
    pub fob_cost_tk: f64,
    pub fob_cost_usd: f64,
    pub subsidy_usd: f64,
    pub net_fob_cost_usd: f64,
    pub freight_per_kg_usd: f64,
    pub final_cost_usd: f64,

    // Inputs kept for the component chart
    pub usd_rate: f64,
    pub variable_overhead_tk: f64,
    pub fixed_overhead_tk: f64,
}

impl CostBreakdown {
    /// The seven breakdown lines, in render order.
    pub fn lines(&self) -> [(BreakdownLabel, f64); 7] {
        [
            (BreakdownLabel::RawMaterialCostTk, self.raw_material_cost_tk),
            (BreakdownLabel::FobCostTk, self.fob_cost_tk),
            (BreakdownLabel::FobCostUsd, self.fob_cost_usd),
            (BreakdownLabel::SubsidyUsd, self.subsidy_usd),
            (BreakdownLabel::NetFobCostUsd, self.net_fob_cost_usd),
            (BreakdownLabel::FreightPerKgUsd, self.freight_per_kg_usd),
            (BreakdownLabel::FinalCostUsd, self.final_cost_usd),
        ]
    }

    pub fn into_parts(self) -> (f64, Vec<(BreakdownLabel, f64)>) {
        (self.final_cost_usd, self.lines().to_vec())
    }

    /// USD share of each cost component, for the bar chart
    pub fn chart_components(&self) -> [(&'static str, f64); 4] {
        [
            ("Raw Material", self.raw_material_cost_tk / self.usd_rate),
            ("Variable Overhead", self.variable_overhead_tk / self.usd_rate),
            ("Fixed Overhead", self.fixed_overhead_tk / self.usd_rate),
            ("Freight per Kg", self.freight_per_kg_usd),
        ]
    }
}

/// One row of the all-products table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCost {
    pub product: String,
    pub final_cost_usd: f64,
}

// ============================================================================
// ENGINE
// ============================================================================

/// Mean rate of the entries within `smallest..=largest`, with the count of
/// entries used. No coverage yields `(0.0, 0)`.
pub fn raw_material_cost(rates: &RateChart, smallest: u32, largest: u32) -> (f64, usize) {
    let (sum, count) = rates
        .in_range(smallest, largest)
        .fold((0.0, 0usize), |(sum, count), e| (sum + e.rate, count + 1));

    if count == 0 {
        (0.0, 0)
    } else {
        (sum / count as f64, count)
    }
}

/// Derive the cost breakdown of one product.
///
/// Duplicate product names resolve to the first match in catalog order. A
/// size range with no rate coverage costs zero raw material rather than
/// failing.
pub fn compute_cost(
    product_name: &str,
    catalog: &ProductCatalog,
    rates: &RateChart,
    variables: &VariableSet,
) -> CostResult<CostBreakdown> {
    let product = catalog.find(product_name).ok_or_else(|| CostError::NotFound {
        product: product_name.to_string(),
    })?;

    let (raw_material_cost_tk, matched_sizes) =
        raw_material_cost(rates, product.smallest_size, product.largest_size);
    if matched_sizes == 0 {
        warn!(
            product = %product.name,
            smallest = product.smallest_size,
            largest = product.largest_size,
            "no rate coverage for size range, raw material cost is 0"
        );
    }

    let usd_rate = variables.resolve(VariableName::UsdRate)?;
    let variable_overhead_tk = variables.resolve(VariableName::VariableOverhead)?;
    let fixed_overhead_tk = variables.resolve(VariableName::FixedOverhead)?;
    let subsidy_fraction = variables.resolve(VariableName::SubsidyRate)? / 100.0;
    let freight_per_kg_usd = variables.resolve(VariableName::FreightPerKg)?;

    if usd_rate <= 0.0 {
        return Err(CostError::Division {
            variable: VariableName::UsdRate.as_str().to_string(),
            value: usd_rate,
        });
    }

    let fob_cost_tk = raw_material_cost_tk + variable_overhead_tk + fixed_overhead_tk;
    let fob_cost_usd = fob_cost_tk / usd_rate;
    let subsidy_usd = fob_cost_usd * subsidy_fraction;
    let net_fob_cost_usd = fob_cost_usd - subsidy_usd;
    let final_cost_usd = net_fob_cost_usd + freight_per_kg_usd;

    debug!(product = %product.name, matched_sizes, final_cost_usd, "computed cost");

    Ok(CostBreakdown {
        product: product.name.clone(),
        matched_sizes,
        raw_material_cost_tk,
        fob_cost_tk,
        fob_cost_usd,
        subsidy_usd,
        net_fob_cost_usd,
        freight_per_kg_usd,
        final_cost_usd,
        usd_rate,
        variable_overhead_tk,
        fixed_overhead_tk,
    })
}

/// Final cost of every product, in catalog order. The first failing product
/// aborts the batch and is named in the error.
pub fn compute_all_costs(
    catalog: &ProductCatalog,
    rates: &RateChart,
    variables: &VariableSet,
) -> CostResult<Vec<ProductCost>> {
    catalog
        .iter()
        .map(|product| {
            compute_cost(&product.name, catalog, rates, variables)
                .map(|b| ProductCost {
                    product: product.name.clone(),
                    final_cost_usd: b.final_cost_usd,
                })
                .map_err(|e| CostError::ProductFailed {
                    product: product.name.clone(),
                    source: Box::new(e),
                })
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
