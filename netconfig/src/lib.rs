//! Netconfig - console registry of tracked entities dressed as network interfaces
//!
//! The library covers:
//! - Registry persistence and identifier allocation
//! - Status resolution over a trailing window of daily rows
//! - Table rendering and the in-place live monitor
//! - The interactive menu session used by the `netconfig` binary
pub mod allocator;
pub mod config;
pub mod error;
pub mod monitor;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod session;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{NetconfigError, Result};
pub use monitor::{LiveMonitor, MonitorState};
pub use registry::{Registry, RegistryEntry, RegistryStore};
pub use render::{ConsoleRenderer, Renderer};
pub use resolver::{Direction, MetricsRecord, StatusResolver, derive_metrics};
pub use session::Session;
