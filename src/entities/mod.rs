// Entity Models - the three session stores
//
// Each store owns its own invariants:
// - ProductCatalog: unique non-empty names, positive sizes, smallest <= largest
// - RateChart: unique positive sizes, non-negative rates
// - VariableSet: closed set of five typed variables

pub mod product;
pub mod rate;
pub mod variable;

pub use product::{Product, ProductCatalog};
pub use rate::{RateChart, RateEntry};
pub use variable::{parse_variable_value, Unit, VariableName, VariableSet, VariableValue};
