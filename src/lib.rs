#![doc = include_str!("../docs/rustdoc.md")]

/// Bounded, deduplicated donation history.
pub mod buffer;
/// Command-line argument definitions.
pub mod cli;
/// Connection controller and its event loop.
pub mod client;
/// Connection state values and published snapshots.
pub mod client_state;
/// Runtime configuration model.
pub mod config;
/// Error types used across the crate.
pub mod error;
/// Lifecycle event bus and controller commands.
pub mod events;
/// Terminal output formatters.
pub mod formatter;
/// Subscriber-facing live stream surface.
pub mod live;
/// Metrics definitions and exporter setup.
pub mod monitoring;
/// Backoff policy and reconnect timer.
pub mod reconnect;
/// Tracing/logging initialization.
pub mod tracing_setup;
/// Push-channel transport seam and SSE implementation.
pub mod transport;
/// Live donation wire types.
pub mod types;
/// UI controller and presentation loop.
pub mod ui;

/// Primary crate error type.
pub use error::LiveStreamError;
pub use live::{LiveStream, SubscribeOptions, Subscription};
