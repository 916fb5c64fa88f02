use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Unique identifier for a single confirmation saga run.
///
/// Every invocation of the saga gets a fresh id, so re-entry never
/// resumes an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a run ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RunId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RunId> for Uuid {
    fn from(id: RunId) -> Self {
        id.0
    }
}

/// Identifier assigned by the record service to a confirmed record.
///
/// Services reply with either a JSON string or a JSON number. The value is
/// sent back to downstream services exactly as received, so `"007"` stays a
/// string and `17.0` stays a float. Display uses the trimmed text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordId {
    raw: Value,
    text: String,
}

impl RecordId {
    /// Creates a record ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        let text = id.into();
        Self {
            raw: Value::String(text.clone()),
            text,
        }
    }

    /// Reads a record ID out of a JSON value.
    ///
    /// Returns `None` for null, blank strings, and non-scalar values.
    pub fn from_json(value: &Value) -> Option<Self> {
        let text = match value {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some(Self {
            raw: value.clone(),
            text,
        })
    }

    /// Returns the record ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the record ID as the JSON value it was read from.
    pub fn to_json(&self) -> Value {
        self.raw.clone()
    }
}

impl Serialize for RecordId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_id_new_creates_unique_ids() {
        let id1 = RunId::new();
        let id2 = RunId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn run_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = RunId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn record_id_accepts_numbers_and_strings() {
        assert_eq!(RecordId::from_json(&json!(42)).unwrap().as_str(), "42");
        assert_eq!(RecordId::from_json(&json!(" POL-7 ")).unwrap().as_str(), "POL-7");
    }

    #[test]
    fn record_id_rejects_empty_and_structured_values() {
        assert_eq!(RecordId::from_json(&json!(null)), None);
        assert_eq!(RecordId::from_json(&json!("")), None);
        assert_eq!(RecordId::from_json(&json!({"id": 1})), None);
        assert_eq!(RecordId::from_json(&json!([1])), None);
    }

    #[test]
    fn record_id_to_json_returns_value_as_received() {
        assert_eq!(RecordId::from_json(&json!(17)).unwrap().to_json(), json!(17));
        assert_eq!(RecordId::from_json(&json!("007")).unwrap().to_json(), json!("007"));
        assert_eq!(RecordId::from_json(&json!(17.0)).unwrap().to_json(), json!(17.0));
        assert_eq!(RecordId::new("POL-7").to_json(), json!("POL-7"));
    }

    #[test]
    fn record_id_serializes_as_raw_value() {
        let id = RecordId::from_json(&json!("007")).unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("007"));
        assert_eq!(id.to_string(), "007");
    }
}
