/// file: src/events.rs
/// description: lifecycle event bus from the controller to presentation, and the command channel into it
use crate::types::{Credentials, LiveEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum ClientEvent {
    Connecting { url: String },
    Connected { connection_id: String },
    ServerGreeting { message: String },
    DonationReceived(Arc<LiveEvent>),
    Reconnecting { attempt: u32, delay: Duration },
    Failed { error: String },
    Disconnected,
}

// Bounded so a stalled consumer cannot grow memory without limit; the
// controller drops lifecycle events rather than wait on a full channel.
const EVENT_CHANNEL_CAPACITY: usize = 1_024;

pub type EventSender = mpsc::Sender<ClientEvent>;
pub type EventReceiver = mpsc::Receiver<ClientEvent>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Requests from a subscription to its controller.
#[derive(Debug)]
pub(crate) enum Command {
    Open(Option<Credentials>),
    Close,
    Reconnect,
    ClearEvents,
    Shutdown,
}

pub(crate) type CommandSender = mpsc::UnboundedSender<Command>;
pub(crate) type CommandReceiver = mpsc::UnboundedReceiver<Command>;

pub(crate) fn create_command_channel() -> (CommandSender, CommandReceiver) {
    mpsc::unbounded_channel()
}
