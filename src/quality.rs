// ✅ Data Quality - session checks before anything is calculated
//
// Two engine policies are deliberate but easy to trip over: a product whose
// size range has no rates costs zero raw material, and duplicate product
// names resolve to the first match. Both are reported here so the operator
// sees them up front instead of discovering an odd number in the cost table.

use crate::entities::VariableName;
use crate::session::Session;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Calculations will fail
    Warning,  // Calculations succeed but the result is probably not intended
    Info,     // Worth knowing
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    /// Product name or variable label the issue is about
    pub subject: String,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityReport {
    pub issues: Vec<QualityIssue>,
    pub products_checked: usize,
}

impl QualityReport {
    pub fn summary(&self) -> String {
        format!(
            "{} products checked, {} issues ({} critical, {} warnings)",
            self.products_checked,
            self.issues.len(),
            self.count(Severity::Critical),
            self.count(Severity::Warning),
        )
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.count(Severity::Critical) > 0
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

// ============================================================================
// QUALITY ENGINE
// ============================================================================

#[derive(Debug, Default)]
pub struct QualityEngine;

impl QualityEngine {
    pub fn new() -> Self {
        QualityEngine
    }

    pub fn check(&self, session: &Session) -> QualityReport {
        let mut issues = Vec::new();

        self.check_variables(session, &mut issues);
        self.check_duplicates(session, &mut issues);
        self.check_coverage(session, &mut issues);

        QualityReport {
            issues,
            products_checked: session.catalog.len(),
        }
    }

    fn check_variables(&self, session: &Session, issues: &mut Vec<QualityIssue>) {
        for name in session.variables.missing() {
            issues.push(QualityIssue {
                severity: Severity::Critical,
                subject: name.as_str().to_string(),
                issue: "Variable is not set".to_string(),
                recommendation: name.hint().to_string(),
            });
        }

        if let Some(usd) = session.variables.get(VariableName::UsdRate) {
            if usd.amount <= 0.0 {
                issues.push(QualityIssue {
                    severity: Severity::Critical,
                    subject: VariableName::UsdRate.as_str().to_string(),
                    issue: format!("USD Rate is {}, costs cannot be converted to USD", usd.display()),
                    recommendation: "Set a USD Rate greater than zero".to_string(),
                });
            }
        }

        for (name, value) in session.variables.iter() {
            if value.unit != name.natural_unit() {
                issues.push(QualityIssue {
                    severity: Severity::Info,
                    subject: name.as_str().to_string(),
                    issue: format!("Entered as {}, unit marker is ignored", value.display()),
                    recommendation: name.hint().to_string(),
                });
            }
        }
    }

    fn check_duplicates(&self, session: &Session, issues: &mut Vec<QualityIssue>) {
        for name in session.catalog.duplicate_names() {
            issues.push(QualityIssue {
                severity: Severity::Warning,
                subject: name,
                issue: "Product name appears more than once; calculations use the first entry".to_string(),
                recommendation: "Rename or delete the duplicate product".to_string(),
            });
        }
    }

    fn check_coverage(&self, session: &Session, issues: &mut Vec<QualityIssue>) {
        for product in session.catalog.iter() {
            let covered = session
                .rates
                .in_range(product.smallest_size, product.largest_size)
                .count();
            let wanted = product.size_count();

            if covered == 0 {
                issues.push(QualityIssue {
                    severity: Severity::Warning,
                    subject: product.name.clone(),
                    issue: format!(
                        "No rates for sizes {}-{}; raw material cost will be 0",
                        product.smallest_size, product.largest_size
                    ),
                    recommendation: "Add rate chart entries for this size range".to_string(),
                });
            } else if covered < wanted {
                issues.push(QualityIssue {
                    severity: Severity::Info,
                    subject: product.name.clone(),
                    issue: format!(
                        "{} of {} sizes priced; average uses priced sizes only",
                        covered, wanted
                    ),
                    recommendation: "Add the missing sizes to the rate chart".to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ProductCatalog;

    #[test]
    fn test_seeded_session_is_clean() {
        let report = QualityEngine::new().check(&Session::seeded());

        assert!(report.is_clean(), "unexpected issues: {:?}", report.issues);
        assert_eq!(report.products_checked, 5);
    }

    #[test]
    fn test_coverage_issues() {
        let mut session = Session::seeded();
        session.add_product("Jumbo", 30, 35).unwrap();
        session.add_product("Edge", 22, 28).unwrap();

        let report = QualityEngine::new().check(&session);

        let jumbo = report.issues.iter().find(|i| i.subject == "Jumbo").unwrap();
        assert_eq!(jumbo.severity, Severity::Warning);
        assert!(jumbo.issue.contains("will be 0"));

        let edge = report.issues.iter().find(|i| i.subject == "Edge").unwrap();
        assert_eq!(edge.severity, Severity::Info);
        assert!(edge.issue.contains("3 of 7"));
    }

    #[test]
    fn test_variable_issues() {
        let mut session = Session::seeded();
        session.variables.remove(VariableName::FixedOverhead);
        session.set_variable(VariableName::UsdRate, "0").unwrap();
        session.set_variable(VariableName::FreightPerKg, "0.20 Tk.").unwrap();

        let report = QualityEngine::new().check(&session);

        assert!(report.has_critical_issues());
        assert_eq!(report.count(Severity::Critical), 2);
        assert!(report
            .issues
            .iter()
            .any(|i| i.subject == "Freight per Kg" && i.severity == Severity::Info));
    }

    #[test]
    fn test_duplicate_names_warned() {
        let json = r#"[
            {"id": "a", "name": "Dup", "smallest_size": 5, "largest_size": 6},
            {"id": "b", "name": "Dup", "smallest_size": 7, "largest_size": 8}
        ]"#;
        let mut session = Session::seeded();
        session.catalog = serde_json::from_str::<ProductCatalog>(json).unwrap();

        let report = QualityEngine::new().check(&session);
        assert_eq!(report.count(Severity::Warning), 1);
        assert!(report.summary().contains("1 warnings"));
    }
}
