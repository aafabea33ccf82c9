//! Event channel built on crossbeam-channel.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sending half handed to pipelines; cheap to clone into workers.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// Progress is optional: if the receiver is gone the event is dropped.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half consumed by the front end.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Iterate until every sender has been dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Factory for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create an unbounded channel. Events are small; workers never block on it.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A sender whose receiver is already gone, for runs nobody watches.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = unbounded();
    EventSender { inner: sender }
}

#[cfg(test)]
mod tests {
    use super::super::{CollectEvent, PipelineEvent, PipelineKind};
    use super::*;
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn events_cross_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Collect(CollectEvent::Failed {
                source: PathBuf::from("/photos/a.jpg"),
                message: "permission denied".to_string(),
            }));
        });
        handle.join().unwrap();

        match receiver.iter().next() {
            Some(Event::Collect(CollectEvent::Failed { source, .. })) => {
                assert_eq!(source, PathBuf::from("/photos/a.jpg"));
            }
            other => panic!("Wrong event: {:?}", other),
        };
    }

    #[test]
    fn receiver_iteration_ends_when_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        let worker = sender.clone();
        worker.send(Event::Pipeline(PipelineEvent::Started {
            kind: PipelineKind::Collect,
        }));
        drop(worker);
        drop(sender);

        assert_eq!(receiver.iter().count(), 1);
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Pipeline(PipelineEvent::Started {
            kind: PipelineKind::Crop,
        }));
    }
}
