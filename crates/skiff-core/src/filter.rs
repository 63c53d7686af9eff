//! Conjunctive label filter.
//!
//! The textual form is a comma-delimited list of `key=value` tokens, e.g.
//! `service=web,env=prod`. A bucket passes when every pair matches one of its
//! labels exactly (case-sensitive). An empty filter passes every bucket.

use crate::bucket::Labels;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelFilter {
    pairs: Vec<(String, String)>,
}

impl LabelFilter {
    /// A filter that matches every bucket.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the comma-delimited form.
    ///
    /// Tokens are trimmed and empty tokens are ignored. Each token is split on
    /// its first `=`, so values may themselves contain `=`. A token without
    /// `=`, or with an empty key, is a configuration error.
    pub fn parse(input: &str) -> Result<Self> {
        let mut pairs = Vec::new();

        for token in input.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let Some(eq_pos) = token.find('=') else {
                return Err(Error::Configuration(format!(
                    "label filter token `{}` is not of the form key=value",
                    token
                )));
            };

            let key = token[..eq_pos].trim();
            let value = token[eq_pos + 1..].trim();
            if key.is_empty() {
                return Err(Error::Configuration(format!(
                    "label filter token `{}` has an empty key",
                    token
                )));
            }

            pairs.push((key.to_string(), value.to_string()));
        }

        Ok(Self { pairs })
    }

    /// Parse an optional input, treating `None` as the empty filter.
    pub fn parse_optional(input: Option<&str>) -> Result<Self> {
        match input {
            Some(s) => Self::parse(s),
            None => Ok(Self::empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Whether `labels` satisfies every pair. Stops at the first mismatch.
    pub fn matches(&self, labels: &Labels) -> bool {
        self.pairs
            .iter()
            .all(|(key, value)| labels.get(key).is_some_and(|actual| actual == value))
    }
}

impl FromStr for LabelFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for LabelFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_pairs_in_order() {
        let filter = LabelFilter::parse("service=x,env=prod").unwrap();
        assert_eq!(
            filter.pairs(),
            &[
                ("service".to_string(), "x".to_string()),
                ("env".to_string(), "prod".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_empty_input_is_empty_filter() {
        assert!(LabelFilter::parse("").unwrap().is_empty());
        assert!(LabelFilter::parse(" , ").unwrap().is_empty());
        assert!(LabelFilter::parse_optional(None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_ignores_whitespace_and_trailing_comma() {
        let filter = LabelFilter::parse(" service = x , env=prod,").unwrap();
        assert_eq!(filter.to_string(), "service=x,env=prod");
    }

    #[test]
    fn test_parse_value_may_contain_equals() {
        let filter = LabelFilter::parse("expr=a=b").unwrap();
        assert_eq!(filter.pairs()[0], ("expr".to_string(), "a=b".to_string()));
    }

    #[test]
    fn test_parse_token_without_equals_is_configuration_error() {
        let err = LabelFilter::parse("service=x,env").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("`env`"));
    }

    #[test]
    fn test_parse_empty_key_is_configuration_error() {
        let err = LabelFilter::parse("=prod").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = LabelFilter::empty();
        assert!(filter.matches(&Labels::new()));
        assert!(filter.matches(&labels(&[("a", "b")])));
    }

    #[test]
    fn test_matches_requires_every_pair() {
        let filter = LabelFilter::parse("service=x,env=prod").unwrap();
        assert!(filter.matches(&labels(&[("service", "x"), ("env", "prod"), ("team", "t")])));
        assert!(!filter.matches(&labels(&[("service", "x")])));
        assert!(!filter.matches(&labels(&[("service", "y"), ("env", "prod")])));
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let filter = LabelFilter::parse("env=prod").unwrap();
        assert!(!filter.matches(&labels(&[("env", "Prod")])));
        assert!(!filter.matches(&labels(&[("Env", "prod")])));
    }
}
