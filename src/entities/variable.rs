// 🔧 Variable Set - the five named inputs of the cost formula
//
// Operators type display strings like "122 Tk.", "8%" or "$0.20". Those are
// parsed exactly once, here, into a typed record (amount + unit). Everything
// downstream reads numbers only.

use crate::error::{CostError, CostResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// VARIABLE NAME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VariableName {
    UsdRate,
    VariableOverhead,
    FixedOverhead,
    SubsidyRate,
    FreightPerKg,
}

impl VariableName {
    /// All variables, in display order
    pub const ALL: [VariableName; 5] = [
        VariableName::UsdRate,
        VariableName::VariableOverhead,
        VariableName::FixedOverhead,
        VariableName::SubsidyRate,
        VariableName::FreightPerKg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableName::UsdRate => "USD Rate",
            VariableName::VariableOverhead => "Variable Overhead",
            VariableName::FixedOverhead => "Fixed Overhead",
            VariableName::SubsidyRate => "Subsidy Rate",
            VariableName::FreightPerKg => "Freight per Kg",
        }
    }

    pub fn from_label(label: &str) -> Option<VariableName> {
        let label = label.trim();
        VariableName::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(label))
    }

    /// Unit the variable is normally entered in
    pub fn natural_unit(&self) -> Unit {
        match self {
            VariableName::UsdRate | VariableName::VariableOverhead | VariableName::FixedOverhead => Unit::Taka,
            VariableName::SubsidyRate => Unit::Percent,
            VariableName::FreightPerKg => Unit::Usd,
        }
    }

    /// Input hint shown next to the edit field
    pub fn hint(&self) -> &'static str {
        match self.natural_unit() {
            Unit::Taka => "Enter value in Tk.",
            Unit::Percent => "Enter value as percentage, e.g., 8%",
            Unit::Usd => "Enter value in USD, e.g., $0.20",
        }
    }
}

impl std::fmt::Display for VariableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TYPED VALUE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Taka,
    Usd,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableValue {
    pub amount: f64,
    pub unit: Unit,
}

impl VariableValue {
    /// Render back into the operator-facing form
    pub fn display(&self) -> String {
        match self.unit {
            Unit::Taka => format!("{} Tk.", self.amount),
            Unit::Usd => {
                // Cents form only when it reads back as the same amount
                let cents = format!("{:.2}", self.amount);
                if cents.parse::<f64>() == Ok(self.amount) {
                    format!("${}", cents)
                } else {
                    format!("${}", self.amount)
                }
            }
            Unit::Percent => format!("{}%", self.amount),
        }
    }
}

/// Strip unit markers and parse the remaining number.
///
/// Removes every `Tk.`, `$` and `%`, trims, then parses as `f64`. The result
/// must be finite and non-negative. A subsidy percentage must also stay
/// within 0..=100. Percent values are NOT divided by 100 here.
pub fn parse_variable_value(name: VariableName, display: &str) -> CostResult<VariableValue> {
    let unit = if display.contains('%') {
        Unit::Percent
    } else if display.contains('$') {
        Unit::Usd
    } else if display.contains("Tk.") {
        Unit::Taka
    } else {
        name.natural_unit()
    };

    let stripped = display
        .replace("Tk.", "")
        .replace('$', "")
        .replace('%', "");
    let stripped = stripped.trim();

    if stripped.is_empty() {
        return Err(CostError::configuration(name.as_str(), "value is empty"));
    }

    let amount: f64 = stripped.parse().map_err(|_| {
        CostError::configuration(name.as_str(), format!("not a number: '{}'", display))
    })?;

    if !amount.is_finite() {
        return Err(CostError::configuration(
            name.as_str(),
            format!("value must be a finite number, got '{}'", display),
        ));
    }
    if amount < 0.0 {
        return Err(CostError::configuration(
            name.as_str(),
            format!("value must not be negative, got '{}'", display),
        ));
    }
    if name == VariableName::SubsidyRate && amount > 100.0 {
        return Err(CostError::configuration(
            name.as_str(),
            format!("percentage must be between 0 and 100, got '{}'", display),
        ));
    }

    Ok(VariableValue { amount, unit })
}

// ============================================================================
// VARIABLE SET
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSet {
    values: Vec<(VariableName, VariableValue)>,
}

impl VariableSet {
    /// Empty set - every calculation fails until all five are set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut set = VariableSet::new();
        let defaults = [
            (VariableName::UsdRate, "122 Tk."),
            (VariableName::VariableOverhead, "100 Tk."),
            (VariableName::FixedOverhead, "80 Tk."),
            (VariableName::SubsidyRate, "8%"),
            (VariableName::FreightPerKg, "$0.20"),
        ];
        for (name, display) in defaults {
            if let Ok(value) = parse_variable_value(name, display) {
                set.set(name, value);
            }
        }
        set
    }

    pub fn set(&mut self, name: VariableName, value: VariableValue) {
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => {
                self.values.push((name, value));
                self.values.sort_by_key(|(n, _)| *n);
            }
        }
    }

    /// Parse an operator-entered string and store it. On error the previous
    /// value is kept.
    pub fn set_display(&mut self, name: VariableName, display: &str) -> CostResult<VariableValue> {
        let value = parse_variable_value(name, display)?;
        self.set(name, value);
        Ok(value)
    }

    pub fn remove(&mut self, name: VariableName) -> Option<VariableValue> {
        let pos = self.values.iter().position(|(n, _)| *n == name)?;
        Some(self.values.remove(pos).1)
    }

    pub fn get(&self, name: VariableName) -> Option<&VariableValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Numeric value of a variable; missing is a configuration error.
    pub fn resolve(&self, name: VariableName) -> CostResult<f64> {
        self.get(name)
            .map(|v| v.amount)
            .ok_or_else(|| CostError::configuration(name.as_str(), "variable is not set"))
    }

    /// Same as [`resolve`](Self::resolve), addressed by display label.
    pub fn resolve_label(&self, label: &str) -> CostResult<f64> {
        let name = VariableName::from_label(label)
            .ok_or_else(|| CostError::configuration(label, "unknown variable"))?;
        self.resolve(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(VariableName, VariableValue)> {
        self.values.iter()
    }

    pub fn missing(&self) -> Vec<VariableName> {
        VariableName::ALL
            .into_iter()
            .filter(|n| self.get(*n).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_unit_markers() {
        let usd = parse_variable_value(VariableName::UsdRate, "122 Tk.").unwrap();
        assert_eq!(usd.amount, 122.0);
        assert_eq!(usd.unit, Unit::Taka);

        let freight = parse_variable_value(VariableName::FreightPerKg, "$0.20").unwrap();
        assert_eq!(freight.amount, 0.20);
        assert_eq!(freight.unit, Unit::Usd);

        // Percent stays a percentage; the engine converts to a fraction
        let subsidy = parse_variable_value(VariableName::SubsidyRate, "8%").unwrap();
        assert_eq!(subsidy.amount, 8.0);
        assert_eq!(subsidy.unit, Unit::Percent);
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_bare_numbers() {
        let v = parse_variable_value(VariableName::FixedOverhead, "  80  ").unwrap();
        assert_eq!(v.amount, 80.0);
        assert_eq!(v.unit, Unit::Taka);

        let v = parse_variable_value(VariableName::VariableOverhead, "Tk. 100").unwrap();
        assert_eq!(v.amount, 100.0);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        for bad in ["", "Tk.", "abc", "12 kg", "-5 Tk.", "inf", "NaN"] {
            let err = parse_variable_value(VariableName::UsdRate, bad).unwrap_err();
            match err {
                CostError::Configuration { variable, .. } => assert_eq!(variable, "USD Rate"),
                other => panic!("expected configuration error for {:?}, got {:?}", bad, other),
            }
        }

        assert!(parse_variable_value(VariableName::SubsidyRate, "101%").is_err());
        assert!(parse_variable_value(VariableName::SubsidyRate, "100%").is_ok());
    }

    #[test]
    fn test_display_round_trip() {
        let mut set = VariableSet::with_defaults();

        let shown: Vec<String> = VariableName::ALL
            .iter()
            .map(|n| set.get(*n).unwrap().display())
            .collect();
        assert_eq!(shown, vec!["122 Tk.", "100 Tk.", "80 Tk.", "8%", "$0.20"]);
    }

    #[test]
    fn test_resolve_and_missing() {
        let mut set = VariableSet::with_defaults();
        assert_eq!(set.resolve(VariableName::UsdRate).unwrap(), 122.0);
        assert_eq!(set.resolve_label("freight per kg").unwrap(), 0.20);
        assert!(set.missing().is_empty());

        set.remove(VariableName::FixedOverhead);
        assert_eq!(set.missing(), vec![VariableName::FixedOverhead]);
        let err = set.resolve(VariableName::FixedOverhead).unwrap_err();
        assert!(err.to_string().contains("Fixed Overhead"));

        assert!(set.resolve_label("Exchange Margin").is_err());
    }

    #[test]
    fn test_set_display_keeps_previous_on_error() {
        let mut set = VariableSet::with_defaults();

        assert!(set.set_display(VariableName::UsdRate, "one hundred").is_err());
        assert_eq!(set.resolve(VariableName::UsdRate).unwrap(), 122.0);

        set.set_display(VariableName::UsdRate, "118.5 Tk.").unwrap();
        assert_eq!(set.resolve(VariableName::UsdRate).unwrap(), 118.5);
    }

    #[test]
    fn test_usd_display_keeps_sub_cent_precision() {
        let mut set = VariableSet::with_defaults();
        set.set_display(VariableName::FreightPerKg, "$0.125").unwrap();

        let shown = set.get(VariableName::FreightPerKg).unwrap().display();
        assert_eq!(shown, "$0.125");

        // Re-submitting the unchanged form must not move the value
        set.set_display(VariableName::FreightPerKg, &shown).unwrap();
        assert_eq!(set.resolve(VariableName::FreightPerKg).unwrap(), 0.125);

        let whole = parse_variable_value(VariableName::FreightPerKg, "$2").unwrap();
        assert_eq!(whole.display(), "$2.00");
    }
}
