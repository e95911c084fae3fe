//! Registry of tracked interfaces and its JSON file store.
//!
//! The file is a single JSON object mapping identifier -> display name, written with
//! two-space indentation and rewritten wholesale on every save.

use crate::{
    allocator,
    error::{NetconfigError, Result},
};
use chrono::{DateTime, Local};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, error, info};

/// Registry shipped as the reset target.
pub const DEFAULT_ENTRIES: [(&str, &str); 9] = [
    ("eth0_005930", "삼성전자"),
    ("eth1_000660", "SK하이닉스"),
    ("eth2_035420", "NAVER"),
    ("eth3_035720", "카카오"),
    ("eth4_373220", "LG에너지솔루션"),
    ("wlan0_207940", "삼성바이오로직스"),
    ("wlan1_006400", "삼성SDI"),
    ("br0_051910", "LG화학"),
    ("lo_068270", "셀트리온"),
];

/// Display-name prefix used when an entity is added by code without a name.
pub const DEFAULT_NAME_PREFIX: &str = "종목_";

/// One registered interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub identifier: String,
    pub display_name: String,
}

/// Ordered identifier -> display name mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    entries: IndexMap<String, String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults() -> Self {
        DEFAULT_ENTRIES.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn display_name(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(String::as_str)
    }

    /// Identifiers in insertion order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(identifier, display name)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(identifier, name)| (identifier.as_str(), name.as_str()))
    }

    /// Entry at a zero-based display position.
    pub fn entry_at(&self, index: usize) -> Option<RegistryEntry> {
        self.entries
            .get_index(index)
            .map(|(identifier, display_name)| RegistryEntry {
                identifier: identifier.clone(),
                display_name: display_name.clone(),
            })
    }

    /// Allocate an identifier for `entity_code` and append it.
    pub fn add(&mut self, entity_code: &str, display_name: Option<&str>) -> RegistryEntry {
        let identifier = allocator::allocate(self.identifiers(), entity_code);
        let display_name = match display_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}{}", DEFAULT_NAME_PREFIX, entity_code),
        };

        self.entries.insert(identifier.clone(), display_name.clone());
        RegistryEntry {
            identifier,
            display_name,
        }
    }

    /// Remove an entry, keeping the order of the remaining ones.
    pub fn remove(&mut self, identifier: &str) -> Option<String> {
        self.entries.shift_remove(identifier)
    }
}

impl<K, V> FromIterator<(K, V)> for Registry
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Metadata about the registry file.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub modified: DateTime<Local>,
}

/// Owns the in-memory [`Registry`] for a session and persists it to `path`.
#[derive(Debug)]
pub struct RegistryStore {
    path: PathBuf,
    registry: Registry,
}

impl RegistryStore {
    /// Load the registry at `path`. A missing file is not created implicitly.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let registry = Self::load(&path)?;
        info!("Loaded {} network interfaces from configuration", registry.len());
        Ok(Self { path, registry })
    }

    /// Store with an in-memory registry that has not been loaded from `path`.
    pub fn with_registry(path: impl Into<PathBuf>, registry: Registry) -> Self {
        Self {
            path: path.into(),
            registry,
        }
    }

    pub fn load(path: &Path) -> Result<Registry> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => NetconfigError::ConfigMissing(path.to_path_buf()),
            _ => NetconfigError::ConfigCorrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        serde_json::from_str(&content).map_err(|e| NetconfigError::ConfigCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Write the whole registry, replacing the file atomically.
    pub fn try_save(&self) -> Result<()> {
        let mut json = serde_json::to_string_pretty(&self.registry)
            .map_err(|e| NetconfigError::Io(std::io::Error::other(e)))?;
        json.push('\n');

        let tmp = self.tmp_path();
        fs::write(&tmp, json)?;
        if let Err(e) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Save and report the outcome; failures are logged, never propagated.
    pub fn save(&self) -> bool {
        match self.try_save() {
            Ok(()) => {
                info!("Network configuration saved ({} interfaces)", self.registry.len());
                true
            }
            Err(e) => {
                error!("Failed to save configuration: {}", e);
                false
            }
        }
    }

    /// Allocate, insert and persist a new entry.
    pub fn add(&mut self, entity_code: &str, display_name: Option<&str>) -> RegistryEntry {
        let entry = self.registry.add(entity_code, display_name);
        self.save();
        debug!(identifier = %entry.identifier, name = %entry.display_name, "interface added");
        entry
    }

    /// Remove and persist. Returns the removed display name.
    pub fn remove(&mut self, identifier: &str) -> Result<String> {
        let name = self
            .registry
            .remove(identifier)
            .ok_or_else(|| NetconfigError::InvalidInput(format!("interface {} not found", identifier)))?;
        self.save();
        debug!(identifier, name = %name, "interface removed");
        Ok(name)
    }

    /// Replace the whole registry and persist it.
    pub fn replace(&mut self, registry: Registry) -> bool {
        self.registry = registry;
        self.save()
    }

    pub fn reset_to_defaults(&mut self) -> bool {
        self.replace(Registry::defaults())
    }

    /// Re-read the file into memory.
    pub fn reload(&mut self) -> Result<()> {
        self.registry = Self::load(&self.path)?;
        info!("Loaded {} network interfaces from configuration", self.registry.len());
        Ok(())
    }

    /// Copy the file byte-for-byte to a timestamped sibling.
    pub fn backup(&self, at: DateTime<Local>) -> Result<PathBuf> {
        let target = self
            .directory()
            .join(format!("{}{}.json", self.backup_prefix(), at.format("%Y%m%d_%H%M%S")));
        fs::copy(&self.path, &target)?;
        info!("Configuration backed up to {}", target.display());
        Ok(target)
    }

    /// Backups next to the registry file, sorted by name (oldest first).
    pub fn list_backups(&self) -> Result<Vec<PathBuf>> {
        let prefix = self.backup_prefix();
        let backups = fs::read_dir(self.directory())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".json"))
            })
            .sorted()
            .collect();
        Ok(backups)
    }

    /// Copy `backup` over the registry file and reload it.
    pub fn restore(&mut self, backup: &Path) -> Result<()> {
        fs::copy(backup, &self.path)?;
        self.reload()?;
        info!("Configuration restored from {}", backup.display());
        Ok(())
    }

    pub fn file_info(&self) -> Result<FileInfo> {
        let metadata = fs::metadata(&self.path)?;
        Ok(FileInfo {
            path: self.path.clone(),
            size: metadata.len(),
            modified: metadata.modified()?.into(),
        })
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "network_interfaces".to_string())
    }

    fn backup_prefix(&self) -> String {
        format!("{}_backup_", self.file_stem())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "network_interfaces.json".to_string());
        self.directory().join(format!(".{}.tmp", name))
    }
}
