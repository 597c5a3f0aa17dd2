use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::envelope::Envelope;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TopicConfig {
    pub name: String,
    pub partitions: usize,
    pub retention_ms: i64,
    pub max_message_size: usize,
}

impl TopicConfig {
    pub fn new(name: impl Into<String>, partitions: usize) -> Self {
        Self {
            name: name.into(),
            partitions,
            retention_ms: 86_400_000,
            max_message_size: 1_048_576,
        }
    }
}

#[derive(Debug)]
struct TopicState {
    partitions: Vec<Vec<Envelope>>,
    cursors: HashMap<String, Vec<usize>>,
}

/// A named, partitioned, append-only log with per-group read cursors.
///
/// An envelope keeps its (partition, offset) position for the lifetime of the
/// topic. Group cursors are non-decreasing and bounded by the log length.
/// `retention_ms` and `max_message_size` are carried as configuration but not
/// enforced: partitions grow for the lifetime of the process and a stalled
/// group only accumulates lag.
#[derive(Debug)]
pub struct Topic {
    config: TopicConfig,
    state: Mutex<TopicState>,
}

impl Topic {
    pub fn new(config: TopicConfig) -> Self {
        let count = config.partitions.max(1);
        Self {
            state: Mutex::new(TopicState {
                partitions: vec![Vec::new(); count],
                cursors: HashMap::new(),
            }),
            config: TopicConfig {
                partitions: count,
                ..config
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &TopicConfig {
        &self.config
    }

    pub fn partition_count(&self) -> usize {
        self.config.partitions
    }

    /// Append an envelope, returning the (partition, offset) it landed at.
    ///
    /// The partition index is the caller-chosen partition wrapped by the
    /// partition count, never derived from the key.
    pub fn publish(&self, envelope: Envelope) -> (usize, usize) {
        let mut state = self.state.lock().unwrap();
        let partition = envelope.partition % self.config.partitions;
        let offset = state.partitions[partition].len();
        state.partitions[partition].push(envelope);
        (partition, offset)
    }

    /// Next unread envelope for the group on the partition, advancing the
    /// group cursor. A group never seen before starts from offset zero, which
    /// is the replay path.
    pub fn consume(&self, group: &str, partition: usize) -> Option<Envelope> {
        let mut state = self.state.lock().unwrap();
        let state = &mut *state;
        if partition >= state.partitions.len() {
            return None;
        }
        let cursors = state
            .cursors
            .entry(group.to_string())
            .or_insert_with(|| vec![0; self.config.partitions]);
        let log = &state.partitions[partition];
        let position = cursors[partition];
        if position < log.len() {
            cursors[partition] = position + 1;
            Some(log[position].clone())
        } else {
            None
        }
    }

    /// Direct addressed read. Moves no cursor.
    pub fn read_at(&self, partition: usize, offset: usize) -> Option<Envelope> {
        let state = self.state.lock().unwrap();
        state
            .partitions
            .get(partition)
            .and_then(|log| log.get(offset))
            .cloned()
    }

    /// Register the group with cursors at the current end of every partition,
    /// so it observes only envelopes published after registration.
    pub fn subscribe(&self, group: &str) {
        let mut state = self.state.lock().unwrap();
        let state = &mut *state;
        let ends = state.partitions.iter().map(Vec::len).collect();
        state.cursors.insert(group.to_string(), ends);
    }

    pub fn unsubscribe(&self, group: &str) {
        let mut state = self.state.lock().unwrap();
        state.cursors.remove(group);
    }

    pub fn latest_offset(&self, partition: usize) -> usize {
        let state = self.state.lock().unwrap();
        state.partitions.get(partition).map(Vec::len).unwrap_or(0)
    }

    /// Unread envelope count for the group on the partition. A group with no
    /// cursor yet would replay from zero, so its lag is the full log.
    pub fn lag(&self, group: &str, partition: usize) -> usize {
        let state = self.state.lock().unwrap();
        let end = state.partitions.get(partition).map(Vec::len).unwrap_or(0);
        let position = state
            .cursors
            .get(group)
            .and_then(|cursors| cursors.get(partition))
            .copied()
            .unwrap_or(0);
        end.saturating_sub(position)
    }

    pub fn message_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.partitions.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Headers;

    fn envelope(partition: usize, tag: u64) -> Envelope {
        Envelope::new(
            "test-topic",
            None,
            serde_json::json!({ "tag": tag }),
            partition,
            Headers::new(),
        )
    }

    #[test]
    fn test_that_publish_wraps_caller_partition_by_count() {
        let topic = Topic::new(TopicConfig::new("test-topic", 4));

        assert_eq!(topic.publish(envelope(7, 1)), (3, 0));
        assert_eq!(topic.publish(envelope(3, 2)), (3, 1));
        assert_eq!(topic.publish(envelope(0, 3)), (0, 0));
        assert_eq!(topic.latest_offset(3), 2);
    }

    #[test]
    fn test_that_read_at_is_stable_across_cursor_movement() {
        let topic = Topic::new(TopicConfig::new("test-topic", 1));
        topic.publish(envelope(0, 1));
        topic.publish(envelope(0, 2));

        let before = topic.read_at(0, 0).unwrap();
        topic.consume("group-a", 0);
        topic.consume("group-a", 0);
        topic.consume("group-b", 0);
        let after = topic.read_at(0, 0).unwrap();

        assert_eq!(before.id, after.id);
        assert_eq!(after.value["tag"], 1);
    }

    #[test]
    fn test_that_unseen_group_replays_from_earliest() {
        let topic = Topic::new(TopicConfig::new("test-topic", 1));
        topic.publish(envelope(0, 1));
        topic.publish(envelope(0, 2));

        let first = topic.consume("late-group", 0).unwrap();
        assert_eq!(first.value["tag"], 1);
        let second = topic.consume("late-group", 0).unwrap();
        assert_eq!(second.value["tag"], 2);
        assert!(topic.consume("late-group", 0).is_none());
    }

    #[test]
    fn test_that_subscribed_group_sees_only_later_envelopes() {
        let topic = Topic::new(TopicConfig::new("test-topic", 1));
        topic.publish(envelope(0, 1));
        topic.publish(envelope(0, 2));
        topic.publish(envelope(0, 3));

        topic.subscribe("live-group");
        assert!(topic.consume("live-group", 0).is_none());

        topic.publish(envelope(0, 4));
        let fourth = topic.consume("live-group", 0).unwrap();
        assert_eq!(fourth.value["tag"], 4);
        assert!(topic.consume("live-group", 0).is_none());
    }

    #[test]
    fn test_that_lag_counts_unread_envelopes() {
        let topic = Topic::new(TopicConfig::new("test-topic", 1));
        topic.subscribe("group-a");
        assert_eq!(topic.lag("group-a", 0), 0);

        topic.publish(envelope(0, 1));
        topic.publish(envelope(0, 2));
        assert_eq!(topic.lag("group-a", 0), 2);

        topic.consume("group-a", 0);
        assert_eq!(topic.lag("group-a", 0), 1);
    }

    #[test]
    fn test_that_unsubscribe_drops_the_group_cursor() {
        let topic = Topic::new(TopicConfig::new("test-topic", 1));
        topic.publish(envelope(0, 1));
        topic.subscribe("group-a");
        topic.unsubscribe("group-a");

        // With the cursor gone the group is unseen again and replays.
        let replayed = topic.consume("group-a", 0).unwrap();
        assert_eq!(replayed.value["tag"], 1);
    }

    #[test]
    fn test_that_zero_partition_config_is_clamped_to_one() {
        let topic = Topic::new(TopicConfig::new("test-topic", 0));
        assert_eq!(topic.partition_count(), 1);
        assert_eq!(topic.publish(envelope(5, 1)), (0, 0));
    }
}
