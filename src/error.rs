// ⚠️ Error Taxonomy - every failure names the product or variable involved
//
// The engine never swallows these: they travel back to whoever called it
// (CLI, TUI, HTTP handler), which decides how to report them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// VALIDATION ERROR (editing boundary)
// ============================================================================

/// Why an edit was rejected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationKind {
    /// Malformed or out-of-range input
    #[default]
    Invalid,
    /// The key (product name, rate size) is already taken
    Duplicate,
    /// The addressed record does not exist
    Missing,
}

/// A rejected edit to one of the three stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub context: String,
    #[serde(default)]
    pub kind: ValidationKind,
}

impl ValidationError {
    pub fn new(context: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.to_string(),
            message: message.into(),
            context: context.to_string(),
            kind: ValidationKind::Invalid,
        }
    }

    pub fn duplicate(context: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            kind: ValidationKind::Duplicate,
            ..Self::new(context, field, message)
        }
    }

    pub fn missing(context: &str, field: &str, message: impl Into<String>) -> Self {
        ValidationError {
            kind: ValidationKind::Missing,
            ..Self::new(context, field, message)
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.context, self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// COST ERROR
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CostError {
    #[error("product not found: {product}")]
    NotFound { product: String },

    #[error("configuration error in '{variable}': {reason}")]
    Configuration { variable: String, reason: String },

    #[error("cannot divide by '{variable}' = {value}: rate must be greater than zero")]
    Division { variable: String, value: f64 },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("cost calculation failed for '{product}': {source}")]
    ProductFailed {
        product: String,
        #[source]
        source: Box<CostError>,
    },
}

impl CostError {
    pub fn configuration(variable: &str, reason: impl Into<String>) -> Self {
        CostError::Configuration {
            variable: variable.to_string(),
            reason: reason.into(),
        }
    }

    /// Innermost error, looking through batch wrappers.
    pub fn root(&self) -> &CostError {
        match self {
            CostError::ProductFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type CostResult<T> = std::result::Result<T, CostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = CostError::NotFound { product: "Tiger 16/20".to_string() };
        assert!(err.to_string().contains("Tiger 16/20"));

        let err = CostError::configuration("USD Rate", "not a number: 'abc'");
        assert!(err.to_string().contains("USD Rate"));

        let err = CostError::Division { variable: "USD Rate".to_string(), value: 0.0 };
        assert!(err.to_string().contains("USD Rate"));
    }

    #[test]
    fn test_root_unwraps_batch_failure() {
        let inner = CostError::configuration("Fixed Overhead", "missing");
        let wrapped = CostError::ProductFailed {
            product: "Product 2".to_string(),
            source: Box::new(inner.clone()),
        };

        assert!(wrapped.to_string().contains("Product 2"));
        assert!(wrapped.to_string().contains("Fixed Overhead"));
        assert_eq!(wrapped.root(), &inner);
    }

    #[test]
    fn test_validation_kind_constructors() {
        assert_eq!(ValidationError::new("RateChart", "rate", "bad").kind, ValidationKind::Invalid);
        assert_eq!(ValidationError::duplicate("RateChart", "size", "taken").kind, ValidationKind::Duplicate);
        assert_eq!(ValidationError::missing("RateChart", "size", "gone").kind, ValidationKind::Missing);
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("RateChart", "size", "size 12 already exists");
        assert_eq!(err.to_string(), "[RateChart] size: size 12 already exists");
    }
}
