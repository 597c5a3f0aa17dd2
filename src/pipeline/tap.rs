use std::sync::Mutex;

use tokio::sync::mpsc;

/// Slot for a single bounded observer channel.
///
/// Sends are skipped while no receiver is attached. A full channel makes the
/// sender wait, so a slow observer slows the stage feeding it instead of
/// growing an unbounded queue. A dropped receiver detaches the slot after one
/// warning.
pub(crate) struct TapSlot<T> {
    sender: Mutex<Option<mpsc::Sender<T>>>,
    label: &'static str,
}

impl<T> TapSlot<T> {
    pub(crate) fn new(label: &'static str) -> Self {
        Self {
            sender: Mutex::new(None),
            label,
        }
    }

    pub(crate) fn install(&self, sender: mpsc::Sender<T>) {
        *self.sender.lock().unwrap() = Some(sender);
    }

    pub(crate) async fn send(&self, value: T) {
        let sender = self.sender.lock().unwrap().clone();
        if let Some(sender) = sender {
            if sender.send(value).await.is_err() {
                log::warn!("{} tap receiver dropped", self.label);
                *self.sender.lock().unwrap() = None;
            }
        }
    }
}
