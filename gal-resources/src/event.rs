use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use smallvec::SmallVec;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoaderEvent {
    LoadFinished {
        source: String,
    },
    LoadFailed {
        source: Option<String>,
        message: String,
    },
    UnloadFinished,
}

impl LoaderEvent {
    pub fn is_failure(&self) -> bool {
        matches!(self, LoaderEvent::LoadFailed { .. })
    }
}

#[derive(Debug)]
pub struct EventSender {
    sender: Sender<LoaderEvent>,
}

impl EventSender {
    pub fn send(&self, event: LoaderEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

#[derive(Clone, Debug)]
pub struct EventReceiver {
    receiver: Receiver<LoaderEvent>,
}

impl EventReceiver {
    pub fn try_iter(&self) -> impl Iterator<Item = LoaderEvent> + '_ {
        self.receiver.try_iter()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoaderEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }
}

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    let (sender, receiver) = crossbeam_channel::unbounded();
    (EventSender { sender }, EventReceiver { receiver })
}

#[derive(Debug, Default)]
pub struct EventSenders {
    senders: SmallVec<[EventSender; 1]>,
}

impl EventSenders {
    pub fn new() -> EventSenders {
        EventSenders::default()
    }

    pub fn subscribe(&mut self) -> EventReceiver {
        let (sender, receiver) = create_event_channel();
        self.senders.push(sender);
        receiver
    }

    pub fn send(&mut self, event: &LoaderEvent) {
        self.senders.retain(|sender| sender.send(event.clone()));
    }
}
