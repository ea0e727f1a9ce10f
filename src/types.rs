/// file: src/types.rs
/// description: wire types for the live donation push channel and the channel URL layout
use crate::error::LiveStreamError;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Event names recognised on the push channel.
pub const EVENT_CONNECTED: &str = "connected";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_DONATION: &str = "donation";

/// One named frame as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub event: String,
    pub data: String,
}

impl RawMessage {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    OneTime,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::OneTime => "one-time",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::OneTime)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A donation pushed by the server. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveEvent {
    pub id: String,
    pub amount: f64,
    pub donor_name: String,
    pub is_anonymous: bool,
    pub fund_name: String,
    pub church_id: String,
    pub church_name: String,
    pub timestamp: DateTime<Utc>,
    pub frequency: Frequency,
}

impl LiveEvent {
    /// Name safe to show on screen; anonymous gifts never expose the donor.
    pub fn display_name(&self) -> &str {
        if self.is_anonymous {
            "Anonymous"
        } else {
            &self.donor_name
        }
    }

    pub fn timestamp_local(&self) -> DateTime<Local> {
        self.timestamp.with_timezone(&Local)
    }
}

/// Decoded form of a [`RawMessage`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    Connected(String),
    Heartbeat,
    Donation(LiveEvent),
    Other(String),
}

impl ServerMessage {
    pub fn decode(raw: &RawMessage) -> Result<Self, LiveStreamError> {
        match raw.event.as_str() {
            EVENT_CONNECTED => Ok(ServerMessage::Connected(raw.data.clone())),
            EVENT_HEARTBEAT => Ok(ServerMessage::Heartbeat),
            EVENT_DONATION => {
                let event: LiveEvent = serde_json::from_str(&raw.data)?;
                if event.id.is_empty() {
                    return Err(LiveStreamError::InvalidMessage(
                        "donation without an id".to_string(),
                    ));
                }
                Ok(ServerMessage::Donation(event))
            }
            other => Ok(ServerMessage::Other(other.to_string())),
        }
    }
}

/// Tenant scope and bearer token needed to open a channel.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub church_id: String,
    pub token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("church_id", &self.church_id)
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .finish()
    }
}

impl Credentials {
    /// Surrounding whitespace is stripped from both values.
    pub fn new(church_id: impl Into<String>, token: impl Into<String>) -> Self {
        let (church_id, token) = (church_id.into(), token.into());
        Self {
            church_id: church_id.trim().to_string(),
            token: token.trim().to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.church_id.trim().is_empty() && !self.token.trim().is_empty()
    }

    /// Builds `<base>/churches/<id>/donations/live?token=<token>`.
    pub fn channel_url(&self, base: &Url) -> Result<Url, LiveStreamError> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| LiveStreamError::InvalidEndpoint(base.to_string()))?
            .pop_if_empty()
            .extend(["churches", self.church_id.trim(), "donations", "live"]);
        url.query_pairs_mut().append_pair("token", self.token.trim());
        Ok(url)
    }
}

/// Renders a channel URL with the token value masked, for logs and UI.
pub fn redacted(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "token" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return shown.to_string();
    }
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
