use crate::error::LiveStreamError;
use anyhow::Result;
use metrics::{Counter, Gauge, counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{net::SocketAddr, sync::LazyLock};
use tracing::{error, info};

// Global metrics
pub static MESSAGES_RECEIVED_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("donation_stream_messages_received_total"));
pub static DONATION_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("donation_stream_donations_total"));
pub static DUPLICATE_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("donation_stream_duplicates_dropped_total"));
pub static MALFORMED_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("donation_stream_malformed_payloads_total"));
pub static RECONNECT_COUNTER: LazyLock<Counter> =
    LazyLock::new(|| counter!("donation_stream_reconnects_total"));
pub static CONNECTED_GAUGE: LazyLock<Gauge> =
    LazyLock::new(|| gauge!("donation_stream_connected"));

pub async fn setup_metrics(port: u16) -> Result<()> {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", "donation-stream-client")
        .add_global_label("version", env!("CARGO_PKG_VERSION"));

    match builder.install() {
        Ok(()) => {
            info!(
                "Prometheus metrics server started on http://{}/metrics",
                addr
            );

            MESSAGES_RECEIVED_COUNTER.absolute(0);
            DONATION_COUNTER.absolute(0);
            DUPLICATE_COUNTER.absolute(0);
            MALFORMED_COUNTER.absolute(0);
            RECONNECT_COUNTER.absolute(0);
            CONNECTED_GAUGE.set(0.0);

            Ok(())
        }
        Err(e) => {
            error!("Failed to start metrics server: {}", e);
            Err(LiveStreamError::MetricsError(e.to_string()).into())
        }
    }
}
