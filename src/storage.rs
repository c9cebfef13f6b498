//! Persistence layer.
//!
//! Saves and loads the table layout to/from a JSON record. The record
//! is rewritten after every mutation (write-through, no batching), so
//! the on-disk state is never more than one edit behind the session.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::layout::TableLayout;
use crate::types::{Role, ScreenRect};

/// Default layout record path.
const DEFAULT_LAYOUT_FILE: &str = "table_layout.json";

/// Save a table layout to a JSON record.
pub fn save_layout(layout: &TableLayout, path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_LAYOUT_FILE);
    let json = serde_json::to_string_pretty(layout)
        .context("Failed to serialise table layout")?;

    std::fs::write(path, &json)
        .context(format!("Failed to write layout to {path}"))?;

    debug!(path, version = layout.version(), "Layout saved");
    Ok(())
}

/// Load a table layout from a JSON record.
/// Returns None if the file doesn't exist (fresh table).
pub fn load_layout(path: Option<&str>) -> Result<Option<TableLayout>> {
    let path = path.unwrap_or(DEFAULT_LAYOUT_FILE);

    if !Path::new(path).exists() {
        info!(path, "No layout record found, starting fresh");
        return Ok(None);
    }

    let json = std::fs::read_to_string(path)
        .context(format!("Failed to read layout from {path}"))?;

    let layout: TableLayout = serde_json::from_str(&json)
        .context(format!("Failed to parse layout from {path}"))?;

    info!(
        path,
        version = layout.version(),
        chips = layout.chips().len(),
        complete = layout.is_complete(),
        "Layout loaded from disk"
    );

    Ok(Some(layout))
}

/// Delete the layout record (for testing or reset).
pub fn delete_layout(path: Option<&str>) -> Result<()> {
    let path = path.unwrap_or(DEFAULT_LAYOUT_FILE);
    if Path::new(path).exists() {
        std::fs::remove_file(path)
            .context(format!("Failed to delete layout record {path}"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// LayoutStore
// ---------------------------------------------------------------------------

/// A table layout coupled to its on-disk record.
///
/// Opening the store loads the record (or seeds a fresh default tray)
/// and every mutation is persisted immediately. The executor reads the
/// current snapshot via [`LayoutStore::layout`]; it never goes through
/// the raw record.
#[derive(Debug)]
pub struct LayoutStore {
    path: String,
    layout: TableLayout,
}

impl LayoutStore {
    /// Open the record at `path`, creating a seeded default if absent.
    /// An existing record is topped up with any standard denominations
    /// missing from its tray, matching what the recording UI expects.
    pub fn open(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let layout = match load_layout(Some(&path))? {
            Some(mut layout) => {
                let added = layout.ensure_default_chips();
                if added > 0 {
                    save_layout(&layout, Some(&path))?;
                    info!(added, "Seeded missing default chip slots");
                }
                layout
            }
            None => {
                let layout = TableLayout::with_default_chips();
                save_layout(&layout, Some(&path))?;
                layout
            }
        };
        Ok(Self { path, layout })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The current layout snapshot.
    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    /// Re-read the record from disk, picking up external edits (e.g. a
    /// recording UI writing the same file). A vanished record keeps the
    /// in-memory layout.
    pub fn reload(&mut self) -> Result<()> {
        match load_layout(Some(&self.path))? {
            Some(layout) => {
                self.layout = layout;
                Ok(())
            }
            None => {
                warn!(path = %self.path, "Layout record missing on reload, keeping in-memory layout");
                Ok(())
            }
        }
    }

    /// Record a role rectangle and persist.
    pub fn set_role(&mut self, role: Role, rect: ScreenRect) -> Result<()> {
        self.layout.set_role(role, rect);
        self.persist()
    }

    /// Record a chip rectangle and persist.
    pub fn set_chip(&mut self, denomination: u64, rect: ScreenRect) -> Result<()> {
        self.layout.set_chip(denomination, rect)?;
        self.persist()
    }

    /// Remove a chip slot and persist. Returns whether anything changed.
    pub fn remove_chip(&mut self, denomination: u64) -> Result<bool> {
        if !self.layout.remove_chip(denomination) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        save_layout(&self.layout, Some(&self.path))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
