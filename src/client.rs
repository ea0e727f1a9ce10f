// file: src/client.rs
// description: connection controller owning the push channel, its reconnect timer and the event buffer

use crate::{
    buffer::{EventBuffer, InsertOutcome},
    client_state::{ClientState, ConnectionState, LiveSnapshot},
    error::LiveStreamError,
    events::{ClientEvent, Command, CommandReceiver, EventSender},
    monitoring,
    reconnect::{ReconnectPolicy, ReconnectTimer},
    transport::{MessageStream, Transport},
    types::{Credentials, LiveEvent, RawMessage, ServerMessage, redacted},
};
use futures_util::{StreamExt, future::BoxFuture};
use std::sync::Arc;
use tokio::sync::{mpsc::error::TrySendError, watch};
use tracing::{debug, error, info, trace, warn};
use url::Url;

/// Callback run once for every donation newly merged into the buffer.
pub type EventCallback = Arc<dyn Fn(&LiveEvent) + Send + Sync>;

enum Link {
    Idle,
    Opening(BoxFuture<'static, Result<MessageStream, LiveStreamError>>),
    Open(MessageStream),
}

enum Input {
    Opened(MessageStream),
    Message(RawMessage),
    Failed(LiveStreamError),
    RetryDue,
}

/// Owns at most one live channel and at most one pending reconnect. All
/// mutation happens on the task running [`ConnectionController::run`].
pub struct ConnectionController {
    endpoint: Url,
    transport: Arc<dyn Transport>,
    credentials: Option<Credentials>,
    link: Link,
    timer: ReconnectTimer,
    policy: ReconnectPolicy,
    state: ClientState,
    buffer: EventBuffer,
    publisher: watch::Sender<LiveSnapshot>,
    on_event: Option<EventCallback>,
    event_sender: Option<EventSender>,
}

impl ConnectionController {
    pub fn new(
        endpoint: Url,
        transport: Arc<dyn Transport>,
        policy: ReconnectPolicy,
        buffer: EventBuffer,
        publisher: watch::Sender<LiveSnapshot>,
    ) -> Self {
        Self {
            endpoint,
            transport,
            credentials: None,
            link: Link::Idle,
            timer: ReconnectTimer::default(),
            policy,
            state: ClientState::new(),
            buffer,
            publisher,
            on_event: None,
            event_sender: None,
        }
    }

    pub fn with_callback(mut self, on_event: Option<EventCallback>) -> Self {
        self.on_event = on_event;
        self
    }

    pub fn with_event_sender(mut self, event_sender: Option<EventSender>) -> Self {
        self.event_sender = event_sender;
        self
    }

    pub fn status(&self) -> ConnectionState {
        self.state.status
    }

    pub(crate) async fn run(mut self, mut commands: CommandReceiver) {
        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                input = self.next_input() => self.handle_input(input),
            }
        }

        self.shutdown();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Open(credentials) => self.open(credentials),
            Command::Close => self.close(),
            Command::Reconnect => self.reconnect(),
            Command::ClearEvents => self.clear_events(),
            Command::Shutdown => self.shutdown(),
        }
    }

    fn handle_input(&mut self, input: Input) {
        match input {
            Input::Opened(stream) => self.on_opened(stream),
            Input::Message(message) => self.on_message(message),
            Input::Failed(e) => self.handle_failure(e),
            Input::RetryDue => self.on_retry_due(),
        }
    }

    async fn next_input(&mut self) -> Input {
        match &mut self.link {
            Link::Opening(connecting) => match connecting.await {
                Ok(stream) => Input::Opened(stream),
                Err(e) => Input::Failed(e),
            },
            Link::Open(stream) => match stream.next().await {
                Some(Ok(message)) => Input::Message(message),
                Some(Err(e)) => Input::Failed(e),
                None => Input::Failed(LiveStreamError::ConnectionClosed),
            },
            Link::Idle => {
                self.timer.fired().await;
                Input::RetryDue
            }
        }
    }

    /// Replaces any current channel with one for `credentials`. Incomplete
    /// credentials leave the controller disconnected.
    pub fn open(&mut self, credentials: Option<Credentials>) {
        self.teardown();
        self.credentials = credentials;

        match self.credentials.clone().filter(Credentials::is_complete) {
            Some(credentials) => self.connect(&credentials),
            None => {
                debug!("Live stream credentials not available; staying disconnected");
                self.mark_disconnected();
            }
        }
    }

    /// Idempotent. Cancels any pending retry and drops the channel.
    pub fn close(&mut self) {
        self.teardown();
        self.policy.reset();
        self.mark_disconnected();
    }

    /// Manual retry: resets the attempt counter and connects immediately.
    pub fn reconnect(&mut self) {
        info!("Manual reconnect requested");
        self.policy.reset();
        let credentials = self.credentials.clone();
        self.open(credentials);
    }

    pub fn clear_events(&mut self) {
        self.buffer.clear();
        self.publish();
    }

    fn shutdown(&mut self) {
        let uptime_secs = self.state.uptime().map(|d| d.as_secs());
        let last_message_secs = self.state.since_last_message().map(|d| d.as_secs());
        self.teardown();
        info!(
            uptime_secs = ?uptime_secs,
            last_message_secs_ago = ?last_message_secs,
            total_messages = self.state.total_messages_received,
            donations = self.state.donation_count,
            duplicates = self.state.duplicate_donations,
            malformed = self.state.malformed_messages,
            "Live stream controller stopped"
        );
    }

    fn connect(&mut self, credentials: &Credentials) {
        let url = match credentials.channel_url(&self.endpoint) {
            Ok(url) => url,
            Err(e) => {
                error!("Failed to build channel URL: {}", e);
                self.handle_failure(e);
                return;
            }
        };

        let shown = redacted(&url);
        info!(url = %shown, attempt = self.policy.attempts(), "Opening live donation stream");

        self.state.begin_connect();
        self.emit(ClientEvent::Connecting { url: shown });
        self.publish();

        self.link = Link::Opening(self.transport.connect(url));
    }

    fn teardown(&mut self) {
        if self.timer.cancel() {
            debug!("Cancelled pending reconnect");
        }
        if !matches!(self.link, Link::Idle) {
            debug!("Closing live channel");
            monitoring::CONNECTED_GAUGE.set(0.0);
        }
        self.link = Link::Idle;
    }

    fn mark_disconnected(&mut self) {
        if self.state.status == ConnectionState::Disconnected && self.state.last_error.is_none() {
            return;
        }
        self.state.disconnect();
        self.emit(ClientEvent::Disconnected);
        self.publish();
    }

    fn on_opened(&mut self, stream: MessageStream) {
        self.link = Link::Open(stream);
        self.policy.reset();
        let connection_id = self.state.mark_connected();
        monitoring::CONNECTED_GAUGE.set(1.0);

        info!(connection_id = %connection_id, "Live donation stream connected");
        self.emit(ClientEvent::Connected { connection_id });
        self.publish();
    }

    fn handle_failure(&mut self, e: LiveStreamError) {
        warn!("Live channel failed: {}", e);
        self.teardown();

        match self.policy.next_delay() {
            Some(delay) => {
                let attempt = self.policy.attempts();
                monitoring::RECONNECT_COUNTER.increment(1);
                warn!(
                    "Reconnecting in {} ms (attempt {}/{})",
                    delay.as_millis(),
                    attempt,
                    self.policy.max_attempts()
                );
                self.state.mark_reconnecting();
                self.timer.schedule(delay);
                self.emit(ClientEvent::Reconnecting { attempt, delay });
            }
            None => {
                error!(
                    "Maximum reconnection attempts ({}) reached",
                    self.policy.max_attempts()
                );
                self.state.mark_failed();
                self.emit(ClientEvent::Failed {
                    error: self.state.last_error.clone().unwrap_or_default(),
                });
            }
        }

        self.publish();
    }

    fn on_retry_due(&mut self) {
        match self.credentials.clone().filter(Credentials::is_complete) {
            Some(credentials) => self.connect(&credentials),
            None => self.mark_disconnected(),
        }
    }

    fn on_message(&mut self, message: RawMessage) {
        self.state.record_message();
        monitoring::MESSAGES_RECEIVED_COUNTER.increment(1);

        match ServerMessage::decode(&message) {
            Ok(ServerMessage::Connected(greeting)) => {
                info!("Server confirmed stream: {}", greeting);
                self.emit(ClientEvent::ServerGreeting { message: greeting });
            }
            Ok(ServerMessage::Heartbeat) => {
                trace!("Heartbeat received");
            }
            Ok(ServerMessage::Donation(event)) => self.accept(event),
            Ok(ServerMessage::Other(name)) => {
                debug!("Ignoring unrecognised event '{}'", name);
            }
            Err(e) => {
                self.state.record_malformed();
                monitoring::MALFORMED_COUNTER.increment(1);
                warn!(
                    "Dropping malformed '{}' payload: {}. Payload: {}",
                    message.event,
                    e,
                    message.data.chars().take(100).collect::<String>()
                );
            }
        }
    }

    fn accept(&mut self, event: LiveEvent) {
        match self.buffer.insert(event) {
            InsertOutcome::Added(event) => {
                self.state.record_donation();
                monitoring::DONATION_COUNTER.increment(1);
                debug!(
                    donation_id = %event.id,
                    amount = event.amount,
                    fund = %event.fund_name,
                    frequency = %event.frequency,
                    "Donation received"
                );
                self.publish();
                self.emit(ClientEvent::DonationReceived(event.clone()));
                if let Some(on_event) = &self.on_event {
                    on_event(event.as_ref());
                }
            }
            InsertOutcome::Duplicate => {
                self.state.record_duplicate();
                monitoring::DUPLICATE_COUNTER.increment(1);
                debug!("Dropping duplicate donation delivery");
            }
        }
    }

    fn snapshot(&self) -> LiveSnapshot {
        LiveSnapshot {
            events: self.buffer.snapshot(),
            status: self.state.status,
            last_error: self.state.last_error.clone(),
            reconnect_attempts: self.policy.attempts(),
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot());
    }

    fn emit(&self, event: ClientEvent) {
        let Some(sender) = &self.event_sender else {
            return;
        };
        match sender.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => warn!("Event channel full; dropping lifecycle event"),
        }
    }
}
