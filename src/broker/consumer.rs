use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::envelope::Envelope;
use super::{short_id, Broker};

pub type MessageCallback = Box<dyn Fn(&Envelope) -> anyhow::Result<()> + Send>;

#[derive(Clone, Debug, Serialize)]
pub struct ConsumerMetrics {
    pub client_id: String,
    pub group_id: String,
    pub topics: Vec<String>,
    pub messages_received: u64,
}

/// Consuming handle for one consumer group.
///
/// `subscribe` registers the group at the current end of each topic log, so a
/// consumer only observes envelopes published after registration. `poll`
/// drains everything unread without blocking and suspends for the timeout
/// only when nothing was available.
pub struct Consumer {
    broker: Arc<Broker>,
    group_id: String,
    client_id: String,
    topics: Vec<String>,
    callbacks: HashMap<String, Vec<MessageCallback>>,
    running: Arc<AtomicBool>,
    messages_received: u64,
}

impl Consumer {
    pub fn new(broker: Arc<Broker>, group_id: impl Into<String>) -> Self {
        let group_id = group_id.into();
        let client_id = format!("consumer-{}", short_id());
        let running = Arc::new(AtomicBool::new(false));
        broker.register_consumer(&client_id, &group_id, Arc::clone(&running));
        Self {
            broker,
            group_id,
            client_id,
            topics: Vec::new(),
            callbacks: HashMap::new(),
            running,
            messages_received: 0,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn subscribe(&mut self, topics: &[&str]) {
        for name in topics {
            if self.topics.iter().any(|existing| existing == name) {
                continue;
            }
            match self.broker.get_topic(name) {
                Some(topic) => {
                    topic.subscribe(&self.group_id);
                    self.topics.push(name.to_string());
                }
                None => log::warn!("subscribe to unknown topic {name} ignored"),
            }
        }
    }

    pub fn unsubscribe(&mut self, topics: &[&str]) {
        for name in topics {
            if let Some(topic) = self.broker.get_topic(name) {
                topic.unsubscribe(&self.group_id);
            }
            self.topics.retain(|existing| existing != name);
        }
    }

    pub fn unsubscribe_all(&mut self) {
        let names: Vec<String> = self.topics.clone();
        for name in names {
            if let Some(topic) = self.broker.get_topic(&name) {
                topic.unsubscribe(&self.group_id);
            }
        }
        self.topics.clear();
    }

    /// Register a callback for one topic. Callbacks run synchronously during
    /// `poll`; an error is logged and delivery continues.
    pub fn on_message<F>(&mut self, topic: &str, callback: F)
    where
        F: Fn(&Envelope) -> anyhow::Result<()> + Send + 'static,
    {
        self.callbacks
            .entry(topic.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Drain every unread envelope across the subscribed topics, invoking
    /// callbacks per envelope. Sleeps for `timeout` only when the drain came
    /// back empty, then returns the batch.
    pub async fn poll(&mut self, timeout: Duration) -> Vec<Envelope> {
        let drained = self.drain();
        if drained.is_empty() {
            tokio::time::sleep(timeout).await;
        }
        drained
    }

    fn drain(&mut self) -> Vec<Envelope> {
        let mut drained = Vec::new();
        let topics = self.topics.clone();
        for name in &topics {
            let Some(topic) = self.broker.get_topic(name) else {
                continue;
            };
            for partition in 0..topic.partition_count() {
                while let Some(envelope) = topic.consume(&self.group_id, partition) {
                    self.messages_received += 1;
                    if let Some(callbacks) = self.callbacks.get(name) {
                        for callback in callbacks {
                            if let Err(err) = callback(&envelope) {
                                log::error!("callback error on {name}: {err:#}");
                            }
                        }
                    }
                    drained.push(envelope);
                }
            }
        }
        drained
    }

    /// Poll until `stop` is observed.
    pub async fn run(&mut self) {
        self.running.store(true, Ordering::SeqCst);
        log::info!("consumer {} ({}) running", self.client_id, self.group_id);
        while self.running.load(Ordering::SeqCst) {
            self.poll(Duration::from_millis(1000)).await;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        log::info!(
            "consumer {} stopped after {} messages",
            self.client_id,
            self.messages_received
        );
    }

    /// Stop the polling loop. Group cursors survive a stop, so envelopes left
    /// unread stay addressable in the log.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn metrics(&self) -> ConsumerMetrics {
        ConsumerMetrics {
            client_id: self.client_id.clone(),
            group_id: self.group_id.clone(),
            topics: self.topics.clone(),
            messages_received: self.messages_received,
        }
    }
}
