use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Pending,
    Delivered,
    Acknowledged,
    Failed,
}

/// A unit of data in the broker. The payload is opaque JSON; an envelope is
/// never modified once published, and `status` is informational only.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Envelope {
    pub id: Uuid,
    pub topic: String,
    pub key: Option<String>,
    pub value: Value,
    pub partition: usize,
    pub timestamp: i64,
    pub headers: HashMap<String, String>,
    pub status: EnvelopeStatus,
}

impl Envelope {
    pub fn new(
        topic: impl Into<String>,
        key: Option<String>,
        value: Value,
        partition: usize,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            key,
            value,
            partition,
            timestamp: (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64,
            headers,
            status: EnvelopeStatus::Pending,
        }
    }

    /// Serialized byte length, as counted by producer and broker metrics.
    pub fn payload_size(&self) -> usize {
        serde_json::to_vec(self).map(|raw| raw.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_that_new_envelopes_start_pending_with_fresh_ids() {
        let first = Envelope::new(
            "transactions",
            Some("acc-1".into()),
            serde_json::json!({"amount": 10.0}),
            0,
            HashMap::new(),
        );
        let second = Envelope::new("transactions", None, serde_json::json!({}), 3, HashMap::new());

        assert_eq!(first.status, EnvelopeStatus::Pending);
        assert_ne!(first.id, second.id);
        assert!(first.timestamp > 0);
        assert_eq!(second.partition, 3);
    }

    #[test]
    fn test_that_payload_size_counts_serialized_bytes() {
        let small = Envelope::new("alerts", None, serde_json::json!({"a": 1}), 0, HashMap::new());
        let large = Envelope::new(
            "alerts",
            None,
            serde_json::json!({"a": "x".repeat(512)}),
            0,
            HashMap::new(),
        );
        assert!(small.payload_size() > 0);
        assert!(large.payload_size() > small.payload_size() + 500);
    }
}
