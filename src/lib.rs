// Seafood Export Cost Calculator - Core Library
// Exposes all modules for use in CLI, API server, and tests

pub mod config;
pub mod csv_io;
pub mod engine;
pub mod entities;
pub mod error;
pub mod logging;
pub mod present;
pub mod quality;
pub mod session;

// Re-export commonly used types
pub use config::AppConfig;
pub use engine::{
    compute_all_costs, compute_cost, raw_material_cost,
    BreakdownLabel, CostBreakdown, ProductCost,
};
pub use entities::{
    parse_variable_value,
    Product, ProductCatalog,
    RateChart, RateEntry,
    Unit, VariableName, VariableSet, VariableValue,
};
pub use error::{CostError, CostResult, ValidationError, ValidationKind};
pub use present::{format_amount, format_tk, format_usd};
pub use quality::{QualityEngine, QualityIssue, QualityReport, Severity};
pub use session::{CostTable, Session};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
