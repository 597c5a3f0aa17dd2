//! In-process publish/subscribe broker.
//!
//! Topics are partitioned append-only logs; consumer groups hold per-partition
//! read cursors inside the topic. The broker owns the topic registry, seeds the
//! standard topic catalog at construction, and dispatches publishes by topic
//! name. It is shared as `Arc<Broker>` by every producer and consumer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use derive_more::{Display, Error};
use serde::Serialize;
use uuid::Uuid;

pub mod consumer;
pub mod envelope;
pub mod producer;
pub mod topic;

pub use consumer::{Consumer, ConsumerMetrics, MessageCallback};
pub use envelope::{Envelope, EnvelopeStatus};
pub use producer::{Producer, ProducerMetrics};
pub use topic::{Topic, TopicConfig};

use crate::model::rfc3339_now;

#[derive(Debug, Display, Error)]
pub enum BrokerError {
    #[display("topic not found: {_0}")]
    TopicNotFound(#[error(not(source))] String),
}

pub(crate) fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

struct ConsumerHandle {
    client_id: String,
    group_id: String,
    running: Arc<AtomicBool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopicStats {
    pub partitions: usize,
    pub messages: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct BrokerStats {
    pub messages_total: u64,
    pub bytes_total: u64,
    pub started_at: Option<String>,
    pub topics: usize,
    pub producers: usize,
    pub consumers: usize,
    pub topic_details: HashMap<String, TopicStats>,
}

pub struct Broker {
    topics: RwLock<HashMap<String, Arc<Topic>>>,
    producers: Mutex<Vec<String>>,
    consumers: Mutex<Vec<ConsumerHandle>>,
    running: AtomicBool,
    started_at: Mutex<Option<String>>,
    messages_total: AtomicU64,
    bytes_total: AtomicU64,
}

impl Broker {
    /// The standard topic catalog for the monitoring pipeline.
    pub fn standard_topics() -> Vec<TopicConfig> {
        vec![
            TopicConfig::new("transactions", 4),
            TopicConfig::new("transactions.raw", 2),
            TopicConfig::new("transactions.enriched", 2),
            TopicConfig::new("alerts", 2),
            TopicConfig::new("alerts.high-priority", 1),
            TopicConfig::new("accounts", 2),
            TopicConfig::new("risk-scores", 2),
            TopicConfig::new("aml-detections", 1),
            TopicConfig::new("audit-log", 1),
        ]
    }

    pub fn new() -> Self {
        let broker = Self {
            topics: RwLock::new(HashMap::new()),
            producers: Mutex::new(Vec::new()),
            consumers: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
            started_at: Mutex::new(None),
            messages_total: AtomicU64::new(0),
            bytes_total: AtomicU64::new(0),
        };
        for config in Self::standard_topics() {
            broker.create_topic(config);
        }
        broker
    }

    /// Create a topic, or return the existing one under that name.
    pub fn create_topic(&self, config: TopicConfig) -> Arc<Topic> {
        let mut topics = self.topics.write().unwrap();
        if let Some(existing) = topics.get(&config.name) {
            return Arc::clone(existing);
        }
        log::info!(
            "created topic: {} ({} partitions)",
            config.name,
            config.partitions
        );
        let topic = Arc::new(Topic::new(config));
        topics.insert(topic.name().to_string(), Arc::clone(&topic));
        topic
    }

    pub fn get_topic(&self, name: &str) -> Option<Arc<Topic>> {
        self.topics.read().unwrap().get(name).cloned()
    }

    pub fn list_topics(&self) -> Vec<String> {
        self.topics.read().unwrap().keys().cloned().collect()
    }

    pub fn delete_topic(&self, name: &str) {
        if self.topics.write().unwrap().remove(name).is_some() {
            log::info!("deleted topic: {name}");
        }
    }

    /// Dispatch an envelope to its topic. An unknown topic is an error for
    /// the caller to surface; nothing is retried.
    pub fn publish(&self, envelope: Envelope) -> Result<(usize, usize), BrokerError> {
        let topic = self
            .get_topic(&envelope.topic)
            .ok_or_else(|| BrokerError::TopicNotFound(envelope.topic.clone()))?;
        let bytes = envelope.payload_size() as u64;
        let placed = topic.publish(envelope);
        self.messages_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_total.fetch_add(bytes, Ordering::Relaxed);
        Ok(placed)
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        *self.started_at.lock().unwrap() = Some(rfc3339_now());
        log::info!("message broker started");
    }

    /// Stop the broker and signal every consumer it created. Consumer group
    /// cursors stay in the topics, so a later start resumes where reading
    /// left off.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        for handle in self.consumers.lock().unwrap().iter() {
            log::debug!(
                "stopping consumer {} ({})",
                handle.client_id,
                handle.group_id
            );
            handle.running.store(false, Ordering::SeqCst);
        }
        log::info!("message broker stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn register_producer(&self, client_id: &str) {
        self.producers.lock().unwrap().push(client_id.to_string());
    }

    pub(crate) fn register_consumer(
        &self,
        client_id: &str,
        group_id: &str,
        running: Arc<AtomicBool>,
    ) {
        self.consumers.lock().unwrap().push(ConsumerHandle {
            client_id: client_id.to_string(),
            group_id: group_id.to_string(),
            running,
        });
    }

    pub fn get_stats(&self) -> BrokerStats {
        let topics = self.topics.read().unwrap();
        let topic_details = topics
            .iter()
            .map(|(name, topic)| {
                (
                    name.clone(),
                    TopicStats {
                        partitions: topic.partition_count(),
                        messages: topic.message_count(),
                    },
                )
            })
            .collect();
        BrokerStats {
            messages_total: self.messages_total.load(Ordering::Relaxed),
            bytes_total: self.bytes_total.load(Ordering::Relaxed),
            started_at: self.started_at.lock().unwrap().clone(),
            topics: topics.len(),
            producers: self.producers.lock().unwrap().len(),
            consumers: self.consumers.lock().unwrap().len(),
            topic_details,
        }
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}
