/// file: src/live.rs
/// description: subscriber-facing surface binding one controller to the lifetime of a subscription
use crate::{
    buffer::{DEFAULT_CAPACITY, EventBuffer, EventSnapshot},
    client::{ConnectionController, EventCallback},
    client_state::{ConnectionState, LiveSnapshot},
    config::Config,
    error::LiveStreamError,
    events::{Command, CommandSender, EventSender, create_command_channel},
    reconnect::{ReconnectConfig, ReconnectPolicy},
    transport::{SseTransport, Transport},
    types::{Credentials, LiveEvent},
};
use std::sync::Arc;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};
use url::Url;

pub struct SubscribeOptions {
    pub capacity: usize,
    pub enabled: bool,
    pub on_event: Option<EventCallback>,
    pub events: Option<EventSender>,
}

impl Default for SubscribeOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            enabled: true,
            on_event: None,
            events: None,
        }
    }
}

impl SubscribeOptions {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(&LiveEvent) + Send + Sync + 'static,
    {
        self.on_event = Some(Arc::new(callback));
        self
    }

    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.events = Some(sender);
        self
    }
}

/// Factory for subscriptions against one endpoint.
#[derive(Clone)]
pub struct LiveStream {
    endpoint: Url,
    transport: Arc<dyn Transport>,
    reconnect: ReconnectConfig,
}

impl LiveStream {
    pub fn new(endpoint: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            endpoint,
            transport,
            reconnect: ReconnectConfig::default(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, LiveStreamError> {
        let transport = SseTransport::new(config.stream.connect_timeout)?;
        Ok(Self::new(config.stream.base_url.clone(), Arc::new(transport))
            .with_reconnect(config.reconnect))
    }

    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Spawns a controller for this subscription on the current tokio
    /// runtime and, when enabled, opens the channel right away.
    pub fn subscribe(
        &self,
        credentials: Option<Credentials>,
        options: SubscribeOptions,
    ) -> Subscription {
        let (publisher, state) = watch::channel(LiveSnapshot::default());
        let (commands, command_rx) = create_command_channel();

        let controller = ConnectionController::new(
            self.endpoint.clone(),
            self.transport.clone(),
            ReconnectPolicy::new(self.reconnect),
            EventBuffer::new(options.capacity),
            publisher,
        )
        .with_callback(options.on_event)
        .with_event_sender(options.events);

        let task = tokio::spawn(controller.run(command_rx));

        let subscription = Subscription {
            commands,
            state,
            credentials,
            enabled: options.enabled,
            task: Some(task),
        };
        if subscription.enabled {
            subscription.send(Command::Open(subscription.credentials.clone()));
        }
        subscription
    }
}

/// Live view of one controller. Dropping it, or calling
/// [`Subscription::unsubscribe`], closes the channel.
pub struct Subscription {
    commands: CommandSender,
    state: watch::Receiver<LiveSnapshot>,
    credentials: Option<Credentials>,
    enabled: bool,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn snapshot(&self) -> LiveSnapshot {
        self.state.borrow().clone()
    }

    pub fn donations(&self) -> EventSnapshot {
        self.state.borrow().events.clone()
    }

    pub fn status(&self) -> ConnectionState {
        self.state.borrow().status
    }

    pub fn is_connected(&self) -> bool {
        self.state.borrow().is_connected()
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Independent receiver for consumers that want to await changes
    /// elsewhere.
    pub fn watch(&self) -> watch::Receiver<LiveSnapshot> {
        self.state.clone()
    }

    /// Waits for the next published snapshot.
    pub async fn changed(&mut self) -> Result<LiveSnapshot, LiveStreamError> {
        self.state
            .changed()
            .await
            .map_err(|_| LiveStreamError::ControllerStopped)?;
        Ok(self.state.borrow_and_update().clone())
    }

    /// Waits until a published snapshot satisfies `predicate`, checking the
    /// current one first.
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Result<LiveSnapshot, LiveStreamError>
    where
        F: FnMut(&LiveSnapshot) -> bool,
    {
        let snapshot = self
            .state
            .wait_for(|snapshot| predicate(snapshot))
            .await
            .map_err(|_| LiveStreamError::ControllerStopped)?;
        Ok(snapshot.clone())
    }

    pub fn reconnect(&self) {
        self.send(Command::Reconnect);
    }

    pub fn clear_donations(&self) {
        self.send(Command::ClearEvents);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.send(Command::Open(self.credentials.clone()));
        } else {
            self.send(Command::Close);
        }
    }

    /// Reopens the channel when the credentials differ and the
    /// subscription is enabled.
    pub fn set_credentials(&mut self, credentials: Option<Credentials>) {
        if self.credentials == credentials {
            return;
        }
        self.credentials = credentials;
        if self.enabled {
            self.send(Command::Open(self.credentials.clone()));
        }
    }

    /// Closes the channel and waits for the controller to stop. Nothing is
    /// published once this returns.
    pub async fn unsubscribe(mut self) {
        self.send(Command::Shutdown);
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!("Live stream controller ended abnormally: {}", e);
        }
    }

    fn send(&self, command: Command) {
        if let Err(e) = self.commands.send(command) {
            debug!("Controller no longer running; dropped {:?}", e.0);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.commands.send(Command::Shutdown);
        }
    }
}
