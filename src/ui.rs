/// file: src/ui.rs
/// description: terminal presentation layer driven by controller lifecycle events
use crate::{
    events::{ClientEvent, EventReceiver},
    formatter::{Colors, DonationFormatter, OutputFormat},
};
use tracing::debug;

const BANNER_WIDTH: usize = 54;

pub struct UIController {
    event_receiver: EventReceiver,
    formatter: DonationFormatter,
    colored: bool,
    quiet_mode: bool,
    header_printed: bool,
    max_donations: Option<u64>,
}

pub struct UIOptions {
    pub colored: bool,
    pub quiet: bool,
    pub max_donations: u64,
}

impl UIController {
    pub fn new(event_receiver: EventReceiver, format: OutputFormat, options: UIOptions) -> Self {
        Self {
            event_receiver,
            formatter: DonationFormatter::new(format, options.colored, options.quiet),
            colored: options.colored,
            quiet_mode: options.quiet,
            header_printed: false,
            max_donations: (options.max_donations > 0).then_some(options.max_donations),
        }
    }

    pub fn formatter(&self) -> &DonationFormatter {
        &self.formatter
    }

    /// Runs until the controller stops or the donation limit is reached.
    pub async fn run(&mut self) {
        self.print_startup_banner();
        while let Some(event) = self.event_receiver.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }
    }

    fn handle_event(&mut self, event: ClientEvent) -> bool {
        match event {
            ClientEvent::Connecting { url } => {
                self.print_connection_status("CONNECTING", &url);
            }
            ClientEvent::Connected { connection_id } => {
                self.print_connection_status("CONNECTED", &format!("ID: {}", connection_id));
                if !self.header_printed {
                    self.formatter.print_header();
                    self.header_printed = true;
                }
            }
            ClientEvent::ServerGreeting { message } => {
                debug!("Server greeting: {}", message);
                self.print_connection_status("LISTENING", &message);
            }
            ClientEvent::DonationReceived(donation) => {
                if !self.header_printed {
                    self.formatter.print_header();
                    self.header_printed = true;
                }
                self.formatter.print_donation(&donation);

                if let Some(max_donations) = self.max_donations
                    && self.formatter.donation_count() >= max_donations
                {
                    self.print_connection_status(
                        "STOPPING",
                        &format!("Reached configured max donations ({max_donations})"),
                    );
                    return false;
                }
            }
            ClientEvent::Reconnecting { attempt, delay } => {
                self.print_reconnect_info(attempt, delay.as_millis());
            }
            ClientEvent::Failed { error } => {
                self.print_error("CONNECTION FAILED", &error);
            }
            ClientEvent::Disconnected => {
                self.print_connection_status("DISCONNECTED", "Connection closed");
            }
        }

        true
    }

    fn paint(&self, color: &'static str) -> &'static str {
        if self.colored { color } else { "" }
    }

    fn print_startup_banner(&self) {
        if self.quiet_mode {
            return;
        }

        let frame = format!("{}{}", self.paint(Colors::BOLD), self.paint(Colors::BRIGHT_CYAN));
        let reset = self.paint(Colors::RESET);
        println!();
        for line in banner_lines(env!("CARGO_PKG_VERSION")) {
            println!("{frame}{line}{reset}");
        }
        println!();
    }

    fn print_connection_status(&self, status: &str, message: &str) {
        if self.quiet_mode {
            return;
        }

        let (color, symbol) = match status {
            "CONNECTING" => (Colors::BRIGHT_YELLOW, "*"),
            "CONNECTED" => (Colors::BRIGHT_GREEN, "+"),
            "LISTENING" => (Colors::BRIGHT_BLUE, "~"),
            "DISCONNECTED" => (Colors::BRIGHT_RED, "X"),
            "STOPPING" => (Colors::BRIGHT_MAGENTA, "!"),
            _ => (Colors::WHITE, "-"),
        };

        println!(
            "{}{}[{}]{} {} {}",
            self.paint(Colors::BOLD),
            self.paint(color),
            status,
            self.paint(Colors::RESET),
            symbol,
            message,
        );
    }

    fn print_error(&self, error_type: &str, message: &str) {
        eprintln!(
            "{}{}[{}]{} ! {}{}{}",
            self.paint(Colors::BOLD),
            self.paint(Colors::BRIGHT_RED),
            error_type,
            self.paint(Colors::RESET),
            self.paint(Colors::RED),
            message,
            self.paint(Colors::RESET)
        );
    }

    fn print_reconnect_info(&self, attempt: u32, delay_ms: u128) {
        if self.quiet_mode {
            return;
        }

        println!(
            "{}{}[RECONNECTING]{} > Attempt {} in {}ms {}(Connection lost. Reconnecting...){}",
            self.paint(Colors::BOLD),
            self.paint(Colors::BRIGHT_YELLOW),
            self.paint(Colors::RESET),
            attempt,
            delay_ms,
            self.paint(Colors::DIM),
            self.paint(Colors::RESET),
        );
    }
}

fn banner_lines(version: &str) -> [String; 3] {
    let label = format!(" v{version} ");
    let fill = BANNER_WIDTH.saturating_sub(label.chars().count());
    let right = fill.min(5);
    [
        format!("╔{}╗", "═".repeat(BANNER_WIDTH)),
        format!("║{:^width$}║", "LIVE DONATION STREAM CLIENT", width = BANNER_WIDTH),
        format!("╚{}{label}{}╝", "═".repeat(fill - right), "═".repeat(right)),
    ]
}
