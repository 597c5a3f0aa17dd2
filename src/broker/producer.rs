use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::envelope::Envelope;
use super::{short_id, Broker, BrokerError};

#[derive(Clone, Debug, Serialize)]
pub struct ProducerMetrics {
    pub client_id: String,
    pub messages_sent: u64,
    pub bytes_sent: u64,
}

/// Publishing handle. Builds envelopes, hands them to the broker, and keeps
/// send counters. Performs no validation beyond topic resolution.
pub struct Producer {
    broker: Arc<Broker>,
    client_id: String,
    messages_sent: u64,
    bytes_sent: u64,
}

impl Producer {
    pub fn new(broker: Arc<Broker>, client_id: Option<String>) -> Self {
        let client_id = client_id.unwrap_or_else(|| format!("producer-{}", short_id()));
        broker.register_producer(&client_id);
        Self {
            broker,
            client_id,
            messages_sent: 0,
            bytes_sent: 0,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Send to partition zero with the default producer header.
    pub fn send(
        &mut self,
        topic: &str,
        value: Value,
        key: Option<String>,
    ) -> Result<Envelope, BrokerError> {
        self.send_to_partition(topic, value, key, 0, None)
    }

    pub fn send_to_partition(
        &mut self,
        topic: &str,
        value: Value,
        key: Option<String>,
        partition: usize,
        headers: Option<HashMap<String, String>>,
    ) -> Result<Envelope, BrokerError> {
        let headers = headers.unwrap_or_else(|| {
            HashMap::from([("producer_id".to_string(), self.client_id.clone())])
        });
        let envelope = Envelope::new(topic, key, value, partition, headers);
        let bytes = envelope.payload_size() as u64;

        self.broker.publish(envelope.clone())?;
        self.messages_sent += 1;
        self.bytes_sent += bytes;
        log::debug!("producer {} sent message to {}", self.client_id, topic);
        Ok(envelope)
    }

    /// Apply `send` to each (key, value) pair in order.
    pub fn send_batch(
        &mut self,
        topic: &str,
        items: Vec<(Option<String>, Value)>,
    ) -> Result<Vec<Envelope>, BrokerError> {
        let mut sent = Vec::with_capacity(items.len());
        for (key, value) in items {
            sent.push(self.send(topic, value, key)?);
        }
        Ok(sent)
    }

    pub fn metrics(&self) -> ProducerMetrics {
        ProducerMetrics {
            client_id: self.client_id.clone(),
            messages_sent: self.messages_sent,
            bytes_sent: self.bytes_sent,
        }
    }
}
