//! The post-execution verification pass.

use serde::Serialize;

use crate::mock::CompiledClause;

/// A provided clause that was never triggered during the fact's execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnsatisfiedExpectation {
    /// The mocked function identifier.
    pub function: String,
    /// Descriptions of the clause's argument matchers.
    pub matchers: Vec<String>,
}

impl std::fmt::Display for UnsatisfiedExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {})", self.function, self.matchers.join(" "))
    }
}

/// Check that every declared clause was exercised.
///
/// The satisfaction policy is "at least one matching call occurred during
/// the fact's execution"; no upper bound is enforced. One entry is emitted
/// per untriggered clause, in declaration order.
pub(crate) fn verify(clauses: &[CompiledClause]) -> Vec<UnsatisfiedExpectation> {
    clauses
        .iter()
        .filter(|clause| clause.triggers.get() == 0)
        .map(|clause| UnsatisfiedExpectation {
            function: clause.function.clone(),
            matchers: clause.matcher_descriptions(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Expected;
    use crate::value::Value;

    fn clause(function: &str, matchers: Vec<Expected>) -> CompiledClause {
        CompiledClause::new(function.to_string(), matchers, Value::Int(0))
    }

    #[test]
    fn test_untriggered_clause_reported() {
        let clauses = vec![clause("g", vec![Expected::from(2)])];
        let unsatisfied = verify(&clauses);
        assert_eq!(
            unsatisfied,
            vec![UnsatisfiedExpectation {
                function: "g".to_string(),
                matchers: vec!["2".to_string()],
            }]
        );
    }

    #[test]
    fn test_triggered_clause_satisfied() {
        let clauses = vec![clause("g", vec![Expected::from(2)])];
        clauses[0].triggers.set(1);
        assert!(verify(&clauses).is_empty());
    }

    #[test]
    fn test_each_clause_verified_independently() {
        let clauses = vec![
            clause("g", vec![Expected::from(2)]),
            clause("g", vec![Expected::from(3)]),
            clause("h", vec![]),
        ];
        clauses[1].triggers.set(2);

        let unsatisfied = verify(&clauses);
        assert_eq!(unsatisfied.len(), 2);
        assert_eq!(unsatisfied[0].function, "g");
        assert_eq!(unsatisfied[0].matchers, vec!["2".to_string()]);
        assert_eq!(unsatisfied[1].function, "h");
        assert!(unsatisfied[1].matchers.is_empty());
    }

    #[test]
    fn test_display() {
        let u = UnsatisfiedExpectation {
            function: "g".to_string(),
            matchers: vec!["2".to_string(), "anything".to_string()],
        };
        assert_eq!(u.to_string(), "(g 2 anything)");
    }
}
