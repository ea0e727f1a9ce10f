/// file: src/config.rs
/// description: runtime configuration assembled from command-line arguments and environment
use crate::{
    cli::Args,
    reconnect::{MAX_TIMER_DELAY, ReconnectConfig},
    types::Credentials,
};
use anyhow::{Result, bail};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub stream: StreamConfig,
    pub reconnect: ReconnectConfig,
    pub buffer: BufferConfig,
    pub metrics: MetricsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub base_url: Url,
    pub church_id: Option<String>,
    pub token: Option<String>,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct BufferConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: String,
    pub colored: bool,
    pub quiet: bool,
    pub max_donations: u64,
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self> {
        let base_url = Url::parse(&args.api_url)?;
        if base_url.cannot_be_a_base() {
            bail!("API URL must be a hierarchical http(s) address: {}", args.api_url);
        }
        if args.capacity == 0 {
            bail!("--capacity must be at least 1");
        }
        if args.reconnect_base_ms > args.reconnect_max_ms {
            bail!("--reconnect-base-ms must not exceed --reconnect-max-ms");
        }
        if Duration::from_millis(args.reconnect_max_ms) > MAX_TIMER_DELAY {
            bail!(
                "--reconnect-max-ms must not exceed {} ms",
                MAX_TIMER_DELAY.as_millis()
            );
        }

        Ok(Config {
            stream: StreamConfig {
                base_url,
                church_id: args.church_id.clone(),
                token: args.token.clone(),
                connect_timeout: Duration::from_secs(args.connect_timeout),
            },
            reconnect: ReconnectConfig {
                base_delay: Duration::from_millis(args.reconnect_base_ms),
                max_delay: Duration::from_millis(args.reconnect_max_ms),
                max_attempts: args.max_reconnects,
            },
            buffer: BufferConfig {
                capacity: args.capacity,
            },
            metrics: MetricsConfig {
                enabled: args.metrics,
                port: args.metrics_port,
            },
            output: OutputConfig {
                format: args.format.clone(),
                colored: !args.no_color,
                quiet: args.quiet,
                max_donations: args.max_donations,
            },
        })
    }

    /// `None` until both the church id and the token are known.
    pub fn credentials(&self) -> Option<Credentials> {
        let church_id = self.stream.church_id.as_deref()?;
        let token = self.stream.token.as_deref()?;
        Some(Credentials::new(church_id, token)).filter(Credentials::is_complete)
    }
}
