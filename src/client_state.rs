/// file: src/client_state.rs
/// description: connection state machine values and the snapshot published to consumers
use crate::buffer::EventSnapshot;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

pub const RECONNECTING_MESSAGE: &str = "Connection lost. Reconnecting...";
pub const FAILED_MESSAGE: &str = "Connection lost. Please refresh the page.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view handed to subscribers on every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveSnapshot {
    pub events: EventSnapshot,
    pub status: ConnectionState,
    pub last_error: Option<String>,
    pub reconnect_attempts: u32,
}

impl LiveSnapshot {
    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }
}

/// Bookkeeping for the current connection, owned by the controller.
#[derive(Debug)]
pub struct ClientState {
    pub connection_id: Option<String>,
    pub status: ConnectionState,
    pub last_error: Option<String>,
    pub last_message_time: Option<Instant>,
    pub connected_since: Option<Instant>,
    pub total_messages_received: u64,
    pub donation_count: u64,
    pub duplicate_donations: u64,
    pub malformed_messages: u64,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            connection_id: None,
            status: ConnectionState::Disconnected,
            last_error: None,
            last_message_time: None,
            connected_since: None,
            total_messages_received: 0,
            donation_count: 0,
            duplicate_donations: 0,
            malformed_messages: 0,
        }
    }
}

impl ClientState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_connect(&mut self) {
        self.status = ConnectionState::Connecting;
        self.connection_id = None;
        self.connected_since = None;
    }

    /// Marks the channel live and returns the fresh connection id.
    pub fn mark_connected(&mut self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.connection_id = Some(id.clone());
        self.status = ConnectionState::Connected;
        self.last_error = None;
        self.connected_since = Some(Instant::now());
        id
    }

    pub fn mark_reconnecting(&mut self) {
        self.status = ConnectionState::Reconnecting;
        self.last_error = Some(RECONNECTING_MESSAGE.to_string());
        self.connected_since = None;
    }

    pub fn mark_failed(&mut self) {
        self.status = ConnectionState::Failed;
        self.last_error = Some(FAILED_MESSAGE.to_string());
        self.connected_since = None;
    }

    pub fn disconnect(&mut self) {
        self.status = ConnectionState::Disconnected;
        self.last_error = None;
        self.connection_id = None;
        self.connected_since = None;
    }

    pub fn record_message(&mut self) {
        self.last_message_time = Some(Instant::now());
        self.total_messages_received += 1;
    }

    /// How long the current channel has been live, if it is.
    pub fn uptime(&self) -> Option<Duration> {
        self.connected_since.map(|since| since.elapsed())
    }

    pub fn since_last_message(&self) -> Option<Duration> {
        self.last_message_time.map(|at| at.elapsed())
    }

    pub fn record_donation(&mut self) {
        self.donation_count += 1;
    }

    pub fn record_duplicate(&mut self) {
        self.duplicate_donations += 1;
    }

    pub fn record_malformed(&mut self) {
        self.malformed_messages += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_clears_error_and_assigns_id() {
        let mut state = ClientState::new();
        state.mark_reconnecting();
        assert_eq!(state.last_error.as_deref(), Some(RECONNECTING_MESSAGE));

        state.begin_connect();
        assert_eq!(state.status, ConnectionState::Connecting);
        assert_eq!(state.last_error.as_deref(), Some(RECONNECTING_MESSAGE));

        let id = state.mark_connected();
        assert_eq!(state.connection_id.as_deref(), Some(id.as_str()));
        assert!(state.status.is_connected());
        assert!(state.last_error.is_none());
    }

    #[test]
    fn failure_and_disconnect() {
        let mut state = ClientState::new();
        state.mark_failed();
        assert_eq!(state.status, ConnectionState::Failed);
        assert_eq!(state.last_error.as_deref(), Some(FAILED_MESSAGE));

        state.disconnect();
        assert_eq!(state.status, ConnectionState::Disconnected);
        assert!(state.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn uptime_and_message_age_track_the_channel() {
        let mut state = ClientState::new();
        assert_eq!(state.uptime(), None);
        assert_eq!(state.since_last_message(), None);

        state.mark_connected();
        tokio::time::advance(Duration::from_secs(5)).await;
        state.record_message();
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(state.uptime(), Some(Duration::from_secs(7)));
        assert_eq!(state.since_last_message(), Some(Duration::from_secs(2)));

        state.mark_reconnecting();
        assert_eq!(state.uptime(), None);
        assert_eq!(state.since_last_message(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn default_snapshot_is_disconnected_and_empty() {
        let snapshot = LiveSnapshot::default();
        assert_eq!(snapshot.status, ConnectionState::Disconnected);
        assert!(!snapshot.is_connected());
        assert!(snapshot.events.is_empty());
        assert!(snapshot.last_error.is_none());
    }
}
