use crate::types::LiveEvent;

// ANSI color codes
pub struct Colors;

impl Colors {
    pub const RESET: &'static str = "\x1b[0m";
    pub const BOLD: &'static str = "\x1b[1m";
    pub const DIM: &'static str = "\x1b[2m";

    pub const RED: &'static str = "\x1b[31m";
    pub const WHITE: &'static str = "\x1b[37m";
    pub const GRAY: &'static str = "\x1b[90m";

    pub const BRIGHT_RED: &'static str = "\x1b[91m";
    pub const BRIGHT_GREEN: &'static str = "\x1b[92m";
    pub const BRIGHT_YELLOW: &'static str = "\x1b[93m";
    pub const BRIGHT_BLUE: &'static str = "\x1b[94m";
    pub const BRIGHT_MAGENTA: &'static str = "\x1b[95m";
    pub const BRIGHT_CYAN: &'static str = "\x1b[96m";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
    Minimal,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "csv" => OutputFormat::Csv,
            "json" => OutputFormat::Json,
            "minimal" => OutputFormat::Minimal,
            _ => OutputFormat::Table,
        }
    }
}

const TABLE_RULE_TOP: &str =
    "┌───────┬──────────────┬──────────────────────┬──────────────────┬───────────┬──────────┐";
const TABLE_RULE_MID: &str =
    "├───────┼──────────────┼──────────────────────┼──────────────────┼───────────┼──────────┤";

pub struct DonationFormatter {
    format: OutputFormat,
    colored: bool,
    quiet: bool,
    donation_count: u64,
    total_amount: f64,
}

impl DonationFormatter {
    pub fn new(format: OutputFormat, colored: bool, quiet: bool) -> Self {
        Self {
            format,
            colored,
            quiet,
            donation_count: 0,
            total_amount: 0.0,
        }
    }

    pub fn donation_count(&self) -> u64 {
        self.donation_count
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn print_header(&self) {
        if self.quiet {
            return;
        }

        match self.format {
            OutputFormat::Table => self.print_table_header(),
            OutputFormat::Csv => println!("{}", Self::csv_header()),
            OutputFormat::Json | OutputFormat::Minimal => {}
        }
    }

    pub fn print_donation(&mut self, donation: &LiveEvent) {
        self.donation_count += 1;
        self.total_amount += donation.amount;
        println!("{}", self.render(donation));
    }

    /// Formats one donation as a line in the configured format.
    pub fn render(&self, donation: &LiveEvent) -> String {
        match self.format {
            OutputFormat::Table => self.table_row(donation),
            OutputFormat::Csv => self.csv_row(donation),
            OutputFormat::Json => self.json_row(donation),
            OutputFormat::Minimal => self.minimal_row(donation),
        }
    }

    fn paint(&self, color: &'static str) -> &'static str {
        if self.colored { color } else { "" }
    }

    fn print_table_header(&self) {
        let gray = self.paint(Colors::GRAY);
        let bold = self.paint(Colors::BOLD);
        let reset = self.paint(Colors::RESET);

        println!("{bold}{gray}{TABLE_RULE_TOP}{reset}");
        println!(
            "{gray}│{reset} {:<5} {gray}│{reset} {:>12} {gray}│{reset} {:<20} {gray}│{reset} {:<16} {gray}│{reset} {:<9} {gray}│{reset} {:<8} {gray}│{reset}",
            "COUNT", "AMOUNT", "DONOR", "FUND", "FREQUENCY", "TIME"
        );
        println!("{bold}{gray}{TABLE_RULE_MID}{reset}");
    }

    fn table_row(&self, donation: &LiveEvent) -> String {
        let gray = self.paint(Colors::GRAY);
        let reset = self.paint(Colors::RESET);
        let amount_color = if donation.frequency.is_recurring() {
            self.paint(Colors::BRIGHT_MAGENTA)
        } else {
            self.paint(Colors::BRIGHT_GREEN)
        };

        format!(
            "{gray}│{reset} {:<5} {gray}│{reset} {amount_color}{:>12.2}{reset} {gray}│{reset} {:<20} {gray}│{reset} {:<16} {gray}│{reset} {:<9} {gray}│{reset} {:<8} {gray}│{reset}",
            self.donation_count,
            donation.amount,
            truncate(donation.display_name(), 20),
            truncate(&donation.fund_name, 16),
            donation.frequency.label(),
            donation.timestamp_local().format("%H:%M:%S"),
        )
    }

    pub fn csv_header() -> &'static str {
        "count,id,amount,donor,fund,frequency,church_id,timestamp"
    }

    fn csv_row(&self, donation: &LiveEvent) -> String {
        format!(
            "{},{},{:.2},{},{},{},{},{}",
            self.donation_count,
            csv_field(&donation.id),
            donation.amount,
            csv_field(donation.display_name()),
            csv_field(&donation.fund_name),
            donation.frequency.label(),
            csv_field(&donation.church_id),
            donation.timestamp.to_rfc3339(),
        )
    }

    fn json_row(&self, donation: &LiveEvent) -> String {
        let json_obj = serde_json::json!({
            "count": self.donation_count,
            "id": donation.id,
            "amount": donation.amount,
            "donor": donation.display_name(),
            "anonymous": donation.is_anonymous,
            "fund": donation.fund_name,
            "church_id": donation.church_id,
            "church_name": donation.church_name,
            "frequency": donation.frequency.label(),
            "timestamp": donation.timestamp.to_rfc3339(),
        });
        json_obj.to_string()
    }

    fn minimal_row(&self, donation: &LiveEvent) -> String {
        let symbol = if donation.frequency.is_recurring() { "↻" } else { "+" };
        let color = self.paint(Colors::BRIGHT_GREEN);
        let reset = self.paint(Colors::RESET);

        format!(
            "{} {color}{symbol}{:.2}{reset} {} → {}",
            donation.timestamp_local().format("%H:%M:%S"),
            donation.amount,
            donation.display_name(),
            donation.fund_name
        )
    }

    pub fn print_summary(&self, duration_secs: u64) {
        if self.quiet {
            return;
        }

        let line = format!(
            "Summary: {} donations totalling {:.2} in {}s",
            self.donation_count, self.total_amount, duration_secs
        );
        println!();
        if self.colored {
            println!("{}{}{}{}", Colors::BOLD, Colors::BRIGHT_CYAN, line, Colors::RESET);
        } else {
            println!("{line}");
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
