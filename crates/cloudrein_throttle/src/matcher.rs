//! Operation-name matching.

use crate::TokenBucket;
use cloudrein_error::{ThrottleError, ThrottleErrorKind, ThrottleResult};
use regex::Regex;

/// Build a pattern matching any of several operation prefixes.
///
/// ```
/// use cloudrein_throttle::multi_operation_match;
///
/// assert_eq!(multi_operation_match(&["Describe", "Get", "List"]), "(Describe|Get|List)");
/// ```
pub fn multi_operation_match(operations: &[&str]) -> String {
    format!("({})", operations.join("|"))
}

/// A token bucket bound to the operations whose names start with a pattern.
///
/// The pattern is a regular expression anchored at the start of the
/// operation name, so `"Describe"` matches `DescribeInstances` and
/// `"(Create|Delete)Tags"` matches both tag mutations. It is compiled once,
/// here, so a broken pattern fails when the registry is built instead of on
/// the first request.
#[derive(Debug)]
pub struct OperationMatcher {
    operation: String,
    regex: Regex,
    bucket: TokenBucket,
}

impl OperationMatcher {
    /// Create a matcher and its bucket.
    ///
    /// # Errors
    ///
    /// Returns [`ThrottleErrorKind::InvalidPattern`] if the pattern does not
    /// compile, or [`ThrottleErrorKind::InvalidLimit`] for an unusable rate.
    pub fn new(operation: impl Into<String>, refill_rate: f64, burst: u32) -> ThrottleResult<Self> {
        let operation = operation.into();
        let regex = Regex::new(&format!("^{}", operation)).map_err(|e| {
            ThrottleError::new(ThrottleErrorKind::InvalidPattern {
                pattern: operation.clone(),
                reason: e.to_string(),
            })
        })?;
        let bucket = TokenBucket::new(operation.clone(), refill_rate, burst)?;

        Ok(Self {
            operation,
            regex,
            bucket,
        })
    }

    /// The configured operation pattern.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The bucket this matcher throttles through.
    pub fn bucket(&self) -> &TokenBucket {
        &self.bucket
    }

    /// True if `operation_name` starts with this matcher's pattern.
    pub fn matches(&self, operation_name: &str) -> bool {
        self.regex.is_match(operation_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match_is_anchored() {
        let matcher = OperationMatcher::new("Describe", 1.0, 1).unwrap();
        assert!(matcher.matches("DescribeInstances"));
        assert!(matcher.matches("Describe"));
        assert!(!matcher.matches("BatchDescribeInstances"));
        assert!(!matcher.matches("Desc"));
    }

    #[test]
    fn test_multi_operation_pattern() {
        let matcher =
            OperationMatcher::new(multi_operation_match(&["Describe", "Get", "List"]), 1.0, 1)
                .unwrap();
        assert!(matcher.matches("GetConsoleOutput"));
        assert!(matcher.matches("ListTagsForResource"));
        assert!(!matcher.matches("RunInstances"));
    }

    #[test]
    fn test_single_operation_is_grouped() {
        assert_eq!(multi_operation_match(&["RunInstances"]), "(RunInstances)");
    }

    #[test]
    fn test_catch_all_pattern() {
        let matcher = OperationMatcher::new(".*", 1.0, 1).unwrap();
        assert!(matcher.matches("AnythingAtAll"));
        assert!(matcher.matches(""));
    }

    #[test]
    fn test_bad_pattern_is_a_configuration_error() {
        let err = OperationMatcher::new("Describe(", 1.0, 1).unwrap_err();
        assert!(matches!(
            err.kind(),
            ThrottleErrorKind::InvalidPattern { pattern, .. } if pattern == "Describe("
        ));
    }

    #[test]
    fn test_recompiling_is_deterministic() {
        let a = OperationMatcher::new("(Create|Delete)Tags", 1.0, 1).unwrap();
        let b = OperationMatcher::new("(Create|Delete)Tags", 1.0, 1).unwrap();
        for name in ["CreateTags", "DeleteTags", "DescribeTags", "Tags"] {
            assert_eq!(a.matches(name), b.matches(name));
        }
    }
}
