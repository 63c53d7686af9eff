//! Run identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const PREFIX: &str = "run_";

/// Identifies one deployment run in logs and reports. Rendered as `run_<uuid>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", PREFIX, self.0)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let uuid_str = s.strip_prefix(PREFIX).unwrap_or(s);
        Ok(Self(Uuid::parse_str(uuid_str)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_display_roundtrip() {
        let id = RunId::new();
        let text = id.to_string();
        assert!(text.starts_with("run_"));

        let parsed: RunId = text.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_run_id_parses_bare_uuid() {
        let id = RunId::new();
        let parsed: RunId = id.as_uuid().to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_run_id_rejects_garbage() {
        assert!("run_not-a-uuid".parse::<RunId>().is_err());
    }

    #[test]
    fn test_run_id_serializes_as_bare_uuid() {
        let id = RunId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.as_uuid().to_string()));
    }
}
