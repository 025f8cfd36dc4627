//! Progress delivery for UI integration
//!
//! Events flow from a running job to whoever holds the receiving end. Sending
//! never blocks the job and a dropped receiver is not an error.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Sending half of a progress channel
#[derive(Debug)]
pub struct ProgressSink<T> {
    sender: Option<UnboundedSender<T>>,
}

impl<T> Clone for ProgressSink<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T> ProgressSink<T> {
    /// Connected sink and the receiver its events arrive on
    pub fn channel() -> (Self, UnboundedReceiver<T>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// Sink that drops every event
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Deliver one event; returns whether anyone was listening
    pub fn emit(&self, event: T) -> bool {
        match &self.sender {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }
}
