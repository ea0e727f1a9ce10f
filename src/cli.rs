use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "rs-donation-stream",
    about = "live donation feed client over server-sent events with terminal output",
    version
)]
pub struct Args {
    /// Base API address the live channel path is appended to
    #[arg(short = 'u', long, env = "DONATIONS_API_URL", default_value = "http://localhost:3000/api")]
    pub api_url: String,

    /// Church (tenant) whose donations to follow
    #[arg(short, long, env = "DONATIONS_CHURCH_ID")]
    pub church_id: Option<String>,

    /// Bearer token passed as the `token` query parameter
    #[arg(short, long, env = "DONATIONS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Number of recent donations kept in memory
    #[arg(long, default_value = "50")]
    pub capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Output logs in JSON format
    #[arg(long)]
    pub json_logs: bool,

    /// Enable metrics server
    #[arg(long)]
    pub metrics: bool,

    /// Metrics server port
    #[arg(long, default_value = "9090")]
    pub metrics_port: u16,

    /// TCP connect timeout in seconds
    #[arg(long, default_value = "10")]
    pub connect_timeout: u64,

    /// First reconnect delay in milliseconds, doubled per attempt
    #[arg(long, default_value = "1000")]
    pub reconnect_base_ms: u64,

    /// Upper bound on the reconnect delay in milliseconds
    #[arg(long, default_value = "30000")]
    pub reconnect_max_ms: u64,

    /// Automatic reconnection attempts before giving up
    #[arg(long, default_value = "10")]
    pub max_reconnects: u32,

    /// Output format: table, csv, json, minimal
    #[arg(long, default_value = "table")]
    pub format: String,

    /// Disable colored output (useful for piping to files)
    #[arg(long)]
    pub no_color: bool,

    /// Quiet mode - donations only, no status lines
    #[arg(long)]
    pub quiet: bool,

    /// Stop after this many donations (0 for unlimited)
    #[arg(long, default_value = "0")]
    pub max_donations: u64,
}
