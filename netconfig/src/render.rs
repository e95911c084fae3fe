//! Text rendering of metrics records and registry views, plus the in-place console
//! [`Renderer`] used by the live monitor.

use crate::{
    allocator,
    error::Result,
    registry::{FileInfo, Registry},
    resolver::MetricsRecord,
};
use chrono::{DateTime, Local};
use crossterm::{
    cursor::MoveUp,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use netconfig_data::Listing;
use std::io::{self, Write};

pub const TABLE_WIDTH: usize = 95;
pub const SUMMARY_TITLE: &str = "Network Interface Status Summary";
pub const MONITOR_TITLE: &str = "Real-time Network Interface Status Monitoring";
pub const MONITOR_HINT: &str = "[Press Ctrl+C to stop]";

const ICON_UP: &str = "🟢";
const ICON_DOWN: &str = "🔴";
const ICON_UNKNOWN: &str = "⚪";

/// Format an integer with `,` thousands separators.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

/// Like [`format_thousands`] but always signed.
pub fn format_signed_thousands(value: i64) -> String {
    if value < 0 {
        format_thousands(value)
    } else {
        format!("+{}", format_thousands(value))
    }
}

/// `+1,200 (+1.23%)`
pub fn format_change(record: &MetricsRecord) -> String {
    format!(
        "{} ({:+.2}%)",
        format_signed_thousands(record.delta),
        record.delta_percent
    )
}

fn column_header() -> String {
    format!(
        "{:<15} {:<13} {:<17} {:<10} {:<10} {:<8} {:<12}",
        "Interface", "Throughput", "Change", "High", "Low", "Status", "Packets"
    )
}

/// One table row for a resolved record.
pub fn status_row(record: &MetricsRecord) -> String {
    let icon = if record.direction.is_up() { ICON_UP } else { ICON_DOWN };
    format!(
        "{:<15} {:>10} Mbps {:<17} {:>9} {:>9} {}{:<7} {:>11}",
        record.identifier,
        format_thousands(record.current_value),
        format_change(record),
        format_thousands(record.period_high),
        format_thousands(record.period_low),
        icon,
        record.direction.as_str(),
        format_thousands(record.volume),
    )
}

/// Placeholder row for an identifier whose status could not be resolved this cycle.
pub fn unavailable_row(identifier: &str) -> String {
    format!(
        "{:<15} {:>10} Mbps {:<17} {:>9} {:>9} {}{:<7} {:>11}",
        identifier, "--", "no data", "--", "--", ICON_UNKNOWN, "N/A", "--"
    )
}

/// Status table: title, rule, column header, rule, one row per identifier, rule, footer.
///
/// Always `results.len() + 6` lines.
pub fn status_table(
    title: &str,
    results: &[(String, Result<MetricsRecord>)],
    updated: DateTime<Local>,
    hint: Option<&str>,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(results.len() + 6);
    lines.push(title.to_string());
    lines.push("=".repeat(TABLE_WIDTH));
    lines.push(column_header());
    lines.push("-".repeat(TABLE_WIDTH));

    for (identifier, result) in results {
        match result {
            Ok(record) => lines.push(status_row(record)),
            Err(_) => lines.push(unavailable_row(identifier)),
        }
    }

    lines.push("-".repeat(TABLE_WIDTH));
    let mut footer = format!(
        "Total Interfaces: {} | Updated: {}",
        results.len(),
        updated.format("%H:%M:%S")
    );
    if let Some(hint) = hint {
        footer.push_str(" | ");
        footer.push_str(hint);
    }
    lines.push(footer);
    lines
}

/// Detail card for one interface.
pub fn detail_card(record: &MetricsRecord) -> Vec<String> {
    vec![
        String::new(),
        format!("=== Network Interface Configuration: {} ===", record.identifier),
        format!("Interface Name: {}", record.display_name),
        format!("Status: {}", record.direction),
        format!("Last Update: {}", record.as_of_date.format("%Y-%m-%d")),
        "--- Traffic Statistics ---".to_string(),
        format!("Current Throughput: {} Mbps", format_thousands(record.current_value)),
        format!(
            "Bandwidth Change: {} Mbps ({:+.2}%)",
            format_signed_thousands(record.delta),
            record.delta_percent
        ),
        format!("Peak Throughput: {} Mbps", format_thousands(record.period_high)),
        format!("Min Throughput: {} Mbps", format_thousands(record.period_low)),
        format!("Range Position: {:.1}% (Low←→High)", record.range_position()),
        format!("Total Packets: {}", format_thousands(record.volume)),
        "--- Configuration Details ---".to_string(),
        format!("Interface ID: {}", record.entity_code),
        "Protocol: TCP/IP v4".to_string(),
        "MTU: 1500 bytes".to_string(),
        "=====================================".to_string(),
    ]
}

/// Registry listing with entity code and category columns.
pub fn registry_list(registry: &Registry) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("Network Interface Configuration ({} total):", registry.len()),
        "=".repeat(70),
        format!(
            "{:<20} {:<25} {:<10} {:<10}",
            "Interface ID", "Description", "Ticker", "Type"
        ),
        "-".repeat(70),
    ];

    for (identifier, name) in registry.iter() {
        let code = allocator::code_segment(identifier).unwrap_or("N/A");
        let kind: String = identifier
            .split('_')
            .next()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_alphabetic())
            .collect::<String>()
            .to_uppercase();
        lines.push(format!("{:<20} {:<25} {:<10} {:<10}", identifier, name, code, kind));
    }

    lines.push("-".repeat(70));
    lines.push(format!("Total configured interfaces: {}", registry.len()));
    lines
}

/// Numbered `NN. identifier` list, optionally with display names.
pub fn numbered_identifiers(registry: &Registry, with_names: bool) -> Vec<String> {
    registry
        .iter()
        .enumerate()
        .map(|(i, (identifier, name))| {
            if with_names {
                format!("{:2}. {} - {}", i + 1, identifier, name)
            } else {
                format!("{:2}. {}", i + 1, identifier)
            }
        })
        .collect()
}

pub fn search_results(listings: &[Listing]) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!("Search Results ({} found):", listings.len()),
        "-".repeat(60),
    ];
    lines.extend(listings.iter().enumerate().map(|(i, listing)| {
        format!(
            "{:2}. {} ({}) - {}",
            i + 1,
            listing.display_name,
            listing.entity_code,
            listing.group_tag
        )
    }));
    lines.push("-".repeat(60));
    lines
}

pub fn routing_table(registry: &Registry) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "Routing Table Information:".to_string(),
        "Destination     Gateway         Interface       Metric".to_string(),
        "-".repeat(55),
    ];
    lines.extend(
        registry
            .identifiers()
            .map(|identifier| format!("192.168.1.0/24  192.168.1.1     {:<15} 1", identifier)),
    );
    lines.push("Default route configuration displayed".to_string());
    lines
}

pub fn interface_configuration(registry: &Registry) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        "Interface Configuration:".to_string(),
        "Current network interface settings:".to_string(),
    ];
    lines.extend(
        registry
            .iter()
            .map(|(identifier, name)| format!("{}: {} - Auto-negotiation enabled", identifier, name)),
    );
    lines
}

pub fn report(registry: &Registry, now: DateTime<Local>) -> Vec<String> {
    vec![
        String::new(),
        "Generating network performance report...".to_string(),
        format!("Report timestamp: {}", now.format("%Y-%m-%d %H:%M:%S%.6f")),
        format!("Monitored interfaces: {}", registry.len()),
        "Network report generated successfully".to_string(),
    ]
}

pub fn system_information(registry: &Registry, hostname: &str, now: DateTime<Local>) -> Vec<String> {
    vec![
        String::new(),
        "System Information:".to_string(),
        format!("Hostname: {}", hostname),
        format!("Network Interfaces: {}", registry.len()),
        format!("System Time: {}", now.format("%Y-%m-%d %H:%M:%S%.6f")),
        "Network stack: TCP/IP v4/v6".to_string(),
    ]
}

pub fn file_information(info: &FileInfo, registry: &Registry) -> Vec<String> {
    vec![
        format!("Configuration file: {}", info.path.display()),
        format!("File size: {} bytes", info.size),
        format!("Last modified: {}", info.modified.format("%Y-%m-%d %H:%M:%S")),
        format!("Total interfaces: {}", registry.len()),
    ]
}

/// Output surface for blocks of lines that may be redrawn in place.
pub trait Renderer {
    /// Print `lines` below the cursor.
    fn render_full(&mut self, lines: &[String]) -> io::Result<()>;

    /// Overwrite the `previous_line_count` lines above the cursor with `lines`.
    fn update_in_place(&mut self, lines: &[String], previous_line_count: usize) -> io::Result<()>;

    /// Print a single message line.
    fn notice(&mut self, line: &str) -> io::Result<()> {
        self.render_full(&[line.to_string()])
    }
}

/// [`Renderer`] over a terminal writer using cursor-up and clear-line sequences.
#[derive(Debug)]
pub struct ConsoleRenderer<W> {
    out: W,
}

impl ConsoleRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn move_up(&mut self, lines: usize) -> io::Result<()> {
        let mut remaining = lines;
        while remaining > 0 {
            let step = remaining.min(u16::MAX as usize);
            queue!(self.out, MoveUp(step as u16))?;
            remaining -= step;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn render_full(&mut self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            queue!(self.out, Print(line), Print("\n"))?;
        }
        self.out.flush()
    }

    fn update_in_place(&mut self, lines: &[String], previous_line_count: usize) -> io::Result<()> {
        self.move_up(previous_line_count)?;
        for line in lines {
            queue!(self.out, Clear(ClearType::CurrentLine), Print(line), Print("\n"))?;
        }

        // Wipe what is left of a taller previous block, then return below the new one
        let leftover = previous_line_count.saturating_sub(lines.len());
        for _ in 0..leftover {
            queue!(self.out, Clear(ClearType::CurrentLine), Print("\n"))?;
        }
        self.move_up(leftover)?;

        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::NetconfigError,
        resolver::{derive_metrics, tests::row},
    };
    use chrono::TimeZone;

    fn record(identifier: &str) -> MetricsRecord {
        let rows = vec![row(14, 70_000.0, 70_000.0), row(15, 70_500.0, 71_200.0)];
        let mut record = derive_metrics(identifier, "삼성전자", &rows).unwrap();
        record.volume = 12_345_678;
        record
    }

    fn updated() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 10, 16, 9, 5, 7).unwrap()
    }

    #[test]
    fn test_format_thousands() {
        struct TestCase {
            input: i64,
            expected: &'static str,
        }

        let tests = vec![
            TestCase { input: 0, expected: "0" },
            TestCase { input: 999, expected: "999" },
            TestCase { input: 1000, expected: "1,000" },
            TestCase { input: 71200, expected: "71,200" },
            TestCase { input: -1234567, expected: "-1,234,567" },
            TestCase { input: i64::MIN, expected: "-9,223,372,036,854,775,808" },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = format_thousands(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }

        assert_eq!(format_signed_thousands(1200), "+1,200");
        assert_eq!(format_signed_thousands(0), "+0");
        assert_eq!(format_signed_thousands(-5), "-5");
    }

    #[test]
    fn test_status_row() {
        let line = status_row(&record("eth0_005930"));

        assert_eq!(
            line,
            "eth0_005930         71,200 Mbps +1,200 (+1.71%)      71,205    70,495 🟢UP       12,345,678"
        );
    }

    #[test]
    fn test_status_table_has_one_row_per_identifier() {
        let results = vec![
            ("eth0_005930".to_string(), Ok(record("eth0_005930"))),
            (
                "eth1_000660".to_string(),
                Err(NetconfigError::NoData("eth1_000660".to_string())),
            ),
        ];

        let lines = status_table(MONITOR_TITLE, &results, updated(), Some(MONITOR_HINT));

        assert_eq!(lines.len(), results.len() + 6);
        assert_eq!(lines[0], MONITOR_TITLE);
        assert!(lines[5].starts_with("eth1_000660"));
        assert!(lines[5].contains("no data"));
        assert_eq!(
            lines[7],
            "Total Interfaces: 2 | Updated: 09:05:07 | [Press Ctrl+C to stop]"
        );
    }

    #[test]
    fn test_status_table_empty_registry() {
        let lines = status_table(SUMMARY_TITLE, &[], updated(), None);

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[5], "Total Interfaces: 0 | Updated: 09:05:07");
    }

    #[test]
    fn test_detail_card() {
        let lines = detail_card(&record("eth0_005930"));

        assert!(lines.contains(&"Bandwidth Change: +1,200 Mbps (+1.71%)".to_string()));
        assert!(lines.contains(&"Interface ID: 005930".to_string()));
        assert!(lines.contains(&"Last Update: 2025-10-15".to_string()));
    }

    #[test]
    fn test_registry_list() {
        let registry: Registry = [
            ("wlan1_006400", "삼성SDI"),
            ("odd", "Odd"),
            ("eth2_005930_x", "Suffixed"),
        ]
        .into_iter()
        .collect();

        let lines = registry_list(&registry);

        assert!(lines[5].starts_with("wlan1_006400"));
        assert!(lines[5].trim_end().ends_with("006400     WLAN"));
        assert!(lines[6].contains("N/A"));
        assert!(lines[7].trim_end().ends_with("005930     ETH"));
        assert_eq!(lines[9], "Total configured interfaces: 3");
    }

    #[test]
    fn test_console_renderer_full_then_in_place() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        let first = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let second = vec!["x".to_string(), "y".to_string(), "z".to_string()];

        renderer.render_full(&first).unwrap();
        renderer.update_in_place(&second, first.len()).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(
            out,
            "a\nb\nc\n\x1b[3A\x1b[2Kx\n\x1b[2Ky\n\x1b[2Kz\n"
        );
    }

    #[test]
    fn test_console_renderer_shrinking_block_clears_leftover() {
        let mut renderer = ConsoleRenderer::new(Vec::new());
        let lines = vec!["x".to_string()];

        renderer.update_in_place(&lines, 3).unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, "\x1b[3A\x1b[2Kx\n\x1b[2K\n\x1b[2K\n\x1b[2A");
    }
}
