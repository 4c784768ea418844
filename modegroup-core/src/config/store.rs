//! ConfigStore - owns the mode table and swaps it atomically on reload

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::parser::ModeTableBuilder;
use super::smc;
use super::types::{Mode, ModeTable};
use crate::error::ConfigError;

/// The mode table loaded from one config file
///
/// Readers get an `Arc` snapshot from [`ConfigStore::table`]; a reload builds
/// a fresh table and swaps the `Arc`, so snapshots already handed out never
/// change underneath their holder.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    root_section: String,
    table: Arc<ModeTable>,
}

impl ConfigStore {
    /// Parse `path` into a new store
    pub fn load(path: impl Into<PathBuf>, root_section: &str) -> Result<Self, ConfigError> {
        let path = path.into();
        let table = Self::parse_file(&path, root_section)?;
        tracing::info!(path = %path.display(), modes = table.len(), "Loaded mode groups");
        Ok(Self {
            path,
            root_section: root_section.to_string(),
            table: Arc::new(table),
        })
    }

    /// Build a store around an already parsed table
    pub fn from_table(path: impl Into<PathBuf>, root_section: &str, table: ModeTable) -> Self {
        Self {
            path: path.into(),
            root_section: root_section.to_string(),
            table: Arc::new(table),
        }
    }

    /// Parse config text into a mode table
    pub fn parse_str(text: &str, root_section: &str) -> Result<ModeTable, ConfigError> {
        let mut builder = ModeTableBuilder::new(root_section);
        smc::parse_str(text, &mut builder)?;
        builder.finish()
    }

    /// Read and parse a config file into a mode table
    pub fn parse_file(path: &Path, root_section: &str) -> Result<ModeTable, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text, root_section)
    }

    /// Re-read the config file. On failure the current table is kept.
    ///
    /// Returns the number of modes in the new table.
    pub fn reload(&mut self) -> Result<usize, ConfigError> {
        match Self::parse_file(&self.path, &self.root_section) {
            Ok(table) => {
                let count = table.len();
                self.table = Arc::new(table);
                tracing::info!(path = %self.path.display(), modes = count, "Configuration reloaded");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to reload configuration, keeping previous mode table"
                );
                Err(e)
            }
        }
    }

    /// Snapshot of the current table
    pub fn table(&self) -> Arc<ModeTable> {
        Arc::clone(&self.table)
    }

    pub fn lookup(&self, name: &str) -> Option<&Mode> {
        self.table.get(name)
    }

    /// Mode names in sorted order
    pub fn mode_names(&self) -> Vec<String> {
        self.table.names().map(str::to_string).collect()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
