//! Interactive console session: the numbered menu driving a [`RegistryStore`] and a
//! [`StatusResolver`].
//!
//! Input is read line by line from any [`AsyncBufRead`] so an interrupt can cancel a
//! pending prompt. Every command failure is reported and the loop continues; the registry
//! is saved on the way out whether the session ends by command, end of input or interrupt.

use crate::{
    allocator,
    config::Config,
    error::{NetconfigError, Result},
    monitor::LiveMonitor,
    registry::RegistryStore,
    render::{self, ConsoleRenderer, SUMMARY_TITLE},
    resolver::StatusResolver,
};
use chrono::Local;
use netconfig_data::{SearchProvider, TimeSeriesProvider};
use std::{io::Write, sync::Arc};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::Notify,
};
use tracing::{debug, error, info};

pub const PROMPT: &str = "netconfig@server:~$ ";
pub const INVALID_COMMAND: &str = "Invalid command. Please select 0-13";
pub const DEFAULT_HOSTNAME: &str = "SERVER-01";

/// Commands that wait for Enter before the menu is shown again.
const PAUSING_COMMANDS: [&str; 4] = ["1", "2", "3", "6"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

fn invalid(message: &str) -> NetconfigError {
    NetconfigError::InvalidInput(message.to_string())
}

/// Parse a 1-based menu selection into an index below `len`.
pub fn parse_selection(raw: &str, len: usize) -> Result<usize> {
    let number: i64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("Please enter a valid number"))?;

    match usize::try_from(number) {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(invalid("Invalid selection")),
    }
}

/// Host name shown by the system information view.
pub fn hostname<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["COMPUTERNAME", "HOSTNAME"]
        .into_iter()
        .find_map(|key| lookup(key).filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_HOSTNAME.to_string())
}

pub fn banner(interfaces: usize) -> Vec<String> {
    vec![
        format!("Network Configuration Utility v{}", env!("CARGO_PKG_VERSION")),
        "Enterprise Network Management System".to_string(),
        "Copyright (c) 2025 NetworkSolutions Corp.".to_string(),
        String::new(),
        "Initializing network interface scanner...".to_string(),
        format!("Detected {} network interfaces", interfaces),
        "Network configuration utility ready".to_string(),
        String::new(),
    ]
}

pub fn menu() -> Vec<String> {
    [
        "",
        "============================================================",
        "Network Configuration Utility",
        "============================================================",
        "[1] Show all interface status",
        "[2] Check specific interface",
        "[3] Network diagnostics",
        "[4] Routing table",
        "[5] Interface configuration",
        "[6] Traffic monitoring",
        "[7] Generate network report",
        "[8] System information",
        "[9] Add network interface",
        "[10] Remove network interface",
        "[11] List all interfaces",
        "[12] Reset to default configuration",
        "[13] Backup/Restore configuration",
        "[0] Exit utility",
        "------------------------------------------------------------",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// One interactive session over a loaded registry.
pub struct Session<P, I, W> {
    store: RegistryStore,
    resolver: StatusResolver<P>,
    config: Config,
    input: I,
    out: W,
    interrupt: Arc<Notify>,
    interrupted: bool,
}

impl<P, I, W> Session<P, I, W>
where
    P: TimeSeriesProvider + SearchProvider,
    I: AsyncBufRead + Unpin,
    W: Write,
{
    /// `interrupt` is notified once per Ctrl+C: it stops the live monitor when one is
    /// running and ends the session otherwise.
    pub fn new(
        store: RegistryStore,
        resolver: StatusResolver<P>,
        config: Config,
        input: I,
        out: W,
        interrupt: Arc<Notify>,
    ) -> Self {
        Self {
            store,
            resolver,
            config,
            input,
            out,
            interrupt,
            interrupted: false,
        }
    }

    pub fn store(&self) -> &RegistryStore {
        &self.store
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run the menu loop until exit, end of input or interrupt, then save.
    pub async fn run(&mut self) -> Result<()> {
        let banner = banner(self.store.registry().len());
        self.print_lines(&banner)?;

        loop {
            self.print_lines(&menu())?;
            let Some(choice) = self.prompt(PROMPT).await? else {
                break;
            };
            let choice = choice.trim().to_string();
            debug!(%choice, "menu command");

            match self.dispatch(&choice).await {
                Ok(Flow::Exit) => return self.shutdown(),
                Ok(Flow::Continue) => {}
                Err(e) => self.report_error(&e)?,
            }

            if self.interrupted {
                break;
            }
            if PAUSING_COMMANDS.contains(&choice.as_str())
                && self.prompt("\nPress Enter to continue...").await?.is_none()
            {
                break;
            }
        }

        if self.interrupted {
            self.print("\nNetwork utility interrupted")?;
        }
        self.shutdown()
    }

    async fn dispatch(&mut self, choice: &str) -> Result<Flow> {
        match choice {
            "1" => self.show_summary().await?,
            "2" => self.show_detail().await?,
            "3" => self.run_diagnostics().await?,
            "4" => {
                let lines = render::routing_table(self.store.registry());
                self.print_lines(&lines)?;
            }
            "5" => {
                let lines = render::interface_configuration(self.store.registry());
                self.print_lines(&lines)?;
            }
            "6" => self.start_monitor().await?,
            "7" => {
                let lines = render::report(self.store.registry(), Local::now());
                self.print_lines(&lines)?;
            }
            "8" => {
                let host = hostname(|key| std::env::var(key).ok());
                let lines = render::system_information(self.store.registry(), &host, Local::now());
                self.print_lines(&lines)?;
            }
            "9" => self.add_interface().await?,
            "10" => self.remove_interface().await?,
            "11" => self.list_interfaces()?,
            "12" => self.reset().await?,
            "13" => self.manage_backups().await?,
            "0" => return Ok(Flow::Exit),
            _ => self.print(INVALID_COMMAND)?,
        }
        Ok(Flow::Continue)
    }

    async fn show_summary(&mut self) -> Result<()> {
        let results = self.resolver.resolve_all(self.store.registry()).await;
        let mut lines = vec![String::new()];
        lines.extend(render::status_table(SUMMARY_TITLE, &results, Local::now(), None));
        self.print_lines(&lines)
    }

    async fn show_detail(&mut self) -> Result<()> {
        self.print("\nAvailable interfaces:")?;
        let lines = render::numbered_identifiers(self.store.registry(), false);
        self.print_lines(&lines)?;

        let Some(raw) = self.prompt("Select interface number: ").await? else {
            return Ok(());
        };
        let index = parse_selection(&raw, self.store.registry().len())?;
        let entry = self
            .store
            .registry()
            .entry_at(index)
            .ok_or_else(|| invalid("Invalid selection"))?;

        let record = self
            .resolver
            .resolve_registered(self.store.registry(), &entry.identifier)
            .await?;
        self.print_lines(&render::detail_card(&record))
    }

    async fn run_diagnostics(&mut self) -> Result<()> {
        self.print("\nRunning network diagnostics...")?;
        self.print("Checking interface connectivity...")?;
        self.show_summary().await?;
        self.print("Network diagnostics completed")
    }

    async fn start_monitor(&mut self) -> Result<()> {
        self.print("\nStarting real-time traffic monitoring...")?;
        self.print("Press Ctrl+C to stop monitoring\n")?;

        let interrupt = Arc::clone(&self.interrupt);
        let outcome = {
            let mut monitor =
                LiveMonitor::new(&self.resolver, ConsoleRenderer::new(&mut self.out))
                    .with_interval(self.config.refresh_interval);
            monitor
                .run(self.store.registry(), interrupt.notified())
                .await
        };

        if let Err(e) = outcome {
            error!("Monitoring error: {}", e);
            self.print(&format!("Monitoring error: {}", e))?;
        }
        Ok(())
    }

    async fn add_interface(&mut self) -> Result<()> {
        self.print("\n=== Add Network Interface ===")?;
        self.print("[1] Search by stock name")?;
        self.print("[2] Add by ticker code")?;

        let Some(method) = self.prompt("Select method: ").await? else {
            return Ok(());
        };
        match method.trim() {
            "1" => self.add_by_search().await,
            "2" => self.add_by_code().await,
            _ => Err(invalid("Invalid selection")),
        }
    }

    async fn add_by_search(&mut self) -> Result<()> {
        let Some(term) = self.prompt("Enter stock name to search: ").await? else {
            return Ok(());
        };
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        self.print(&format!("\nSearching for '{}'...", term))?;
        let listings = match self.resolver.provider().search(term).await {
            Ok(listings) => listings,
            Err(e) => {
                error!("Stock search failed: {}", e);
                return Err(e.into());
            }
        };
        if listings.is_empty() {
            return self.print(&format!("No results found for '{}'", term));
        }
        self.print_lines(&render::search_results(&listings))?;

        let Some(raw) = self.prompt("Select stock number to add: ").await? else {
            return Ok(());
        };
        let listing = &listings[parse_selection(&raw, listings.len())?];
        let entry = self
            .store
            .add(&listing.entity_code, Some(&listing.display_name));
        self.print(&format!(
            "[INFO] Network interface {} ({}) added successfully",
            entry.identifier, entry.display_name
        ))
    }

    async fn add_by_code(&mut self) -> Result<()> {
        let Some(code) = self
            .prompt("Enter ticker code (6 digits, e.g., 005930): ")
            .await?
        else {
            return Ok(());
        };
        let code = code.trim().to_string();
        if !allocator::is_valid_entity_code(&code) {
            return Err(invalid("Invalid ticker format. Use 6-digit code."));
        }

        let name = self
            .prompt("Enter display name (optional): ")
            .await?
            .unwrap_or_default();
        let name = name.trim();
        let entry = self
            .store
            .add(&code, (!name.is_empty()).then_some(name));
        self.print(&format!(
            "[INFO] Network interface {} ({}) added successfully",
            entry.identifier, entry.display_name
        ))
    }

    async fn remove_interface(&mut self) -> Result<()> {
        self.print("\nCurrent Network Interfaces:")?;
        if self.store.registry().is_empty() {
            return self.print("No interfaces configured");
        }
        let lines = render::numbered_identifiers(self.store.registry(), true);
        self.print_lines(&lines)?;

        let Some(raw) = self.prompt("Select interface number to remove: ").await? else {
            return Ok(());
        };
        let index = parse_selection(&raw, self.store.registry().len())?;
        let entry = self
            .store
            .registry()
            .entry_at(index)
            .ok_or_else(|| invalid("Invalid selection"))?;

        let name = self.store.remove(&entry.identifier)?;
        self.print(&format!(
            "[INFO] Network interface {} ({}) removed successfully",
            entry.identifier, name
        ))
    }

    fn list_interfaces(&mut self) -> Result<()> {
        if self.store.registry().is_empty() {
            return self.print("No network interfaces configured");
        }
        let lines = render::registry_list(self.store.registry());
        self.print_lines(&lines)
    }

    async fn reset(&mut self) -> Result<()> {
        self.print("\n=== Reset Network Configuration ===")?;
        self.print("This will reset all network interfaces to default configuration.")?;

        let confirm = self
            .prompt("Are you sure? (y/N): ")
            .await?
            .unwrap_or_default();
        if !confirm.trim().eq_ignore_ascii_case("y") {
            return self.print("Reset cancelled");
        }

        if self.store.reset_to_defaults() {
            self.print("[SUCCESS] Network configuration reset to defaults")
        } else {
            self.print("[ERROR] Failed to save default configuration")
        }
    }

    async fn manage_backups(&mut self) -> Result<()> {
        self.print("\n=== Configuration Management ===")?;
        self.print("[1] Create backup")?;
        self.print("[2] Restore from backup")?;
        self.print("[3] Show current config file")?;

        let Some(option) = self.prompt("Select option: ").await? else {
            return Ok(());
        };
        match option.trim() {
            "1" => match self.store.backup(Local::now()) {
                Ok(path) => self.print(&format!(
                    "[SUCCESS] Configuration backed up to: {}",
                    path.display()
                )),
                Err(e) => self.print(&format!("[ERROR] Backup failed: {}", e)),
            },
            "2" => self.restore_backup().await,
            "3" => match self.store.file_info() {
                Ok(info) => {
                    let lines = render::file_information(&info, self.store.registry());
                    self.print_lines(&lines)
                }
                Err(_) => self.print("Configuration file not found"),
            },
            _ => Err(invalid("Invalid selection")),
        }
    }

    async fn restore_backup(&mut self) -> Result<()> {
        let backups = self.store.list_backups()?;
        if backups.is_empty() {
            return self.print("No backup files found");
        }

        self.print("Available backup files:")?;
        let lines: Vec<String> = backups
            .iter()
            .enumerate()
            .map(|(i, path)| {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{:2}. {}", i + 1, name)
            })
            .collect();
        self.print_lines(&lines)?;

        let Some(raw) = self.prompt("Select backup file number: ").await? else {
            return Ok(());
        };
        let backup = &backups[parse_selection(&raw, backups.len())?];
        match self.store.restore(backup) {
            Ok(()) => self.print(&format!(
                "[SUCCESS] Configuration restored from: {}",
                backup.display()
            )),
            Err(e) => self.print(&format!("[ERROR] Restore failed: {}", e)),
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        self.print("Shutting down network configuration utility...")?;
        self.print("Saving network settings...")?;
        if !self.store.save() {
            self.print("[ERROR] Failed to save network settings")?;
        }
        info!(interfaces = self.store.registry().len(), "session ended");
        self.print("Network utility terminated")
    }

    /// Print `prompt` and read one line. `None` on end of input or interrupt.
    async fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let interrupt = Arc::clone(&self.interrupt);
        let mut line = String::new();
        let read = tokio::select! {
            biased;
            read = self.input.read_line(&mut line) => Some(read?),
            _ = interrupt.notified() => None,
        };

        match read {
            None => {
                self.interrupted = true;
                Ok(None)
            }
            Some(0) => {
                debug!("end of input");
                Ok(None)
            }
            Some(_) => Ok(Some(line.trim_end_matches(['\r', '\n']).to_string())),
        }
    }

    fn report_error(&mut self, e: &NetconfigError) -> Result<()> {
        match e {
            NetconfigError::InvalidInput(message) => self.print(&format!("[ERROR] {}", message)),
            NetconfigError::Io(_) => self.print(&format!("Network utility error: {}", e)),
            _ => self.print(&format!("[ERROR] {}", e)),
        }
    }

    fn print(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line)?;
        Ok(())
    }

    fn print_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        self.out.flush()?;
        Ok(())
    }
}
