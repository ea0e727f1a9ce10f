/// file: src/transport.rs
/// description: push-channel transport seam and the server-sent events implementation
use crate::{error::LiveStreamError, types::RawMessage};
use eventsource_stream::Eventsource;
use futures_util::{
    FutureExt, StreamExt,
    future::BoxFuture,
    stream::BoxStream,
};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Inbound frames of one open channel. The stream ending means the server
/// closed the channel.
pub type MessageStream = BoxStream<'static, Result<RawMessage, LiveStreamError>>;

/// Opens push channels. Resolving `Ok` is the transport's confirmation that
/// the channel is live.
pub trait Transport: Send + Sync + 'static {
    fn connect(&self, url: Url) -> BoxFuture<'static, Result<MessageStream, LiveStreamError>>;
}

#[derive(Debug, Clone)]
pub struct SseTransport {
    http: reqwest::Client,
}

impl SseTransport {
    pub fn new(connect_timeout: Duration) -> Result<Self, LiveStreamError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for SseTransport {
    fn connect(&self, url: Url) -> BoxFuture<'static, Result<MessageStream, LiveStreamError>> {
        let http = self.http.clone();
        async move {
            let response = http
                .get(url)
                .header(ACCEPT, "text/event-stream")
                .header(CACHE_CONTROL, "no-cache")
                .send()
                .await?
                .error_for_status()?;

            debug!(status = %response.status(), "Event stream response received");

            let stream = response
                .bytes_stream()
                .eventsource()
                .map(|item| match item {
                    Ok(event) => Ok(RawMessage {
                        event: event.event,
                        data: event.data,
                    }),
                    Err(e) => Err(LiveStreamError::StreamError(e.to_string())),
                });

            Ok(stream.boxed())
        }
        .boxed()
    }
}
