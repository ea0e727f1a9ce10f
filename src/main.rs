use anyhow::Result;
use clap::Parser;
use rs_donation_stream::{
    LiveStream, SubscribeOptions,
    cli::Args,
    config::Config,
    events::create_event_channel,
    formatter::OutputFormat,
    monitoring::setup_metrics,
    tracing_setup::setup_tracing,
    ui::{UIController, UIOptions},
};
use tokio::time::Instant;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_tracing(&args.log_level, args.json_logs)?;

    info!(
        "Starting live donation stream client v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_args(&args)?;

    if config.metrics.enabled {
        setup_metrics(config.metrics.port).await?;
        info!("Metrics server started on port {}", config.metrics.port);
    }

    let credentials = config.credentials();
    if credentials.is_none() {
        warn!("Church id or token missing; the stream stays disconnected until both are set");
    }

    let stream = LiveStream::from_config(&config)?;
    let (event_sender, event_receiver) = create_event_channel();
    let subscription = stream.subscribe(
        credentials,
        SubscribeOptions::default()
            .with_capacity(config.buffer.capacity)
            .with_events(event_sender),
    );

    let mut ui = UIController::new(
        event_receiver,
        OutputFormat::from(config.output.format.as_str()),
        UIOptions {
            colored: config.output.colored,
            quiet: config.output.quiet,
            max_donations: config.output.max_donations,
        },
    );

    let started = Instant::now();
    info!("Client started. Press Ctrl+C to shutdown...");
    tokio::select! {
        _ = ui.run() => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Shutdown requested");
        }
    }

    let snapshot = subscription.snapshot();
    subscription.unsubscribe().await;

    ui.formatter().print_summary(started.elapsed().as_secs());
    info!(
        buffered = snapshot.events.len(),
        status = %snapshot.status,
        "Client stopped successfully"
    );
    Ok(())
}
