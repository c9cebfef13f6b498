//! Table layout: the recorded click targets for one casino table.
//!
//! A layout is a versioned snapshot of the three role rectangles
//! (player area, banker area, cancel button) plus the chip slots. The
//! executor reads layouts through the accessors here and never mutates
//! them; mutation belongs to the configuration surface (the layout
//! store and the interactive commands), which persists write-through.

use crate::types::{ChipSlot, Role, ScreenRect};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chip denominations every fresh layout is seeded with, matching the
/// standard chip tray of the target tables.
pub const DEFAULT_CHIP_VALUES: &[u64] = &[
    1_000, 25_000, 125_000, 500_000, 1_250_000, 2_500_000, 5_000_000, 50_000_000,
];

// ---------------------------------------------------------------------------
// TableLayout
// ---------------------------------------------------------------------------

/// The recorded click targets for one table, plus a version counter.
///
/// The counter increments on every mutation, so callers holding a
/// snapshot can tell exactly which table state a click sequence acted
/// on. Within a session, equal versions mean identical content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    version: u64,
    player_area: Option<ScreenRect>,
    banker_area: Option<ScreenRect>,
    cancel_button: Option<ScreenRect>,
    chips: Vec<ChipSlot>,
}

impl TableLayout {
    /// An empty, unversioned layout with no targets recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh layout pre-seeded with the standard chip denominations,
    /// all waiting to be recorded.
    pub fn with_default_chips() -> Self {
        let mut layout = Self::default();
        layout.ensure_default_chips();
        layout
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// The rectangle recorded for a table role, if any.
    pub fn role(&self, role: Role) -> Option<&ScreenRect> {
        match role {
            Role::PlayerArea => self.player_area.as_ref(),
            Role::BankerArea => self.banker_area.as_ref(),
            Role::CancelButton => self.cancel_button.as_ref(),
        }
    }

    /// The chip slot for an exact denomination, recorded or not.
    pub fn chip(&self, denomination: u64) -> Option<&ChipSlot> {
        self.chips.iter().find(|c| c.denomination == denomination)
    }

    /// All chip slots in tray order.
    pub fn chips(&self) -> &[ChipSlot] {
        &self.chips
    }

    /// Denominations whose slots are actually clickable.
    pub fn usable_denominations(&self) -> Vec<u64> {
        self.chips
            .iter()
            .filter(|c| c.is_usable())
            .map(|c| c.denomination)
            .collect()
    }

    /// Number of chip slots with a recorded rectangle.
    pub fn usable_chip_count(&self) -> usize {
        self.chips.iter().filter(|c| c.is_usable()).count()
    }

    /// Betting requires all three roles; there is no partial mode.
    pub fn is_complete(&self) -> bool {
        Role::ALL.iter().all(|r| self.role(*r).is_some())
    }

    /// Roles still waiting to be recorded.
    pub fn missing_roles(&self) -> Vec<Role> {
        Role::ALL
            .iter()
            .copied()
            .filter(|r| self.role(*r).is_none())
            .collect()
    }

    /// Record a role rectangle, replacing any previous one wholesale.
    pub fn set_role(&mut self, role: Role, rect: ScreenRect) {
        let slot = match role {
            Role::PlayerArea => &mut self.player_area,
            Role::BankerArea => &mut self.banker_area,
            Role::CancelButton => &mut self.cancel_button,
        };
        *slot = Some(rect);
        self.version += 1;
        debug!(role = %role, version = self.version, "role rectangle recorded");
    }

    /// Record a chip rectangle. An existing denomination has its
    /// rectangle replaced; a new one is appended to the tray. A second
    /// slot for the same denomination is never created.
    pub fn set_chip(&mut self, denomination: u64, rect: ScreenRect) -> Result<()> {
        if denomination == 0 {
            bail!("Chip denomination must be positive");
        }
        match self.chips.iter_mut().find(|c| c.denomination == denomination) {
            Some(slot) => slot.rect = rect,
            None => self.chips.push(ChipSlot { denomination, rect }),
        }
        self.version += 1;
        debug!(denomination, version = self.version, "chip rectangle recorded");
        Ok(())
    }

    /// Drop a chip slot entirely. Returns whether anything was removed.
    pub fn remove_chip(&mut self, denomination: u64) -> bool {
        let before = self.chips.len();
        self.chips.retain(|c| c.denomination != denomination);
        if self.chips.len() == before {
            return false;
        }
        self.version += 1;
        debug!(denomination, version = self.version, "chip slot removed");
        true
    }

    /// Add placeholder slots for any standard denominations missing
    /// from the tray. Returns how many were added; existing slots are
    /// left untouched.
    pub fn ensure_default_chips(&mut self) -> usize {
        let mut added = 0;
        for &denomination in DEFAULT_CHIP_VALUES {
            if self.chip(denomination).is_none() {
                self.chips.push(ChipSlot::placeholder(denomination));
                added += 1;
            }
        }
        if added > 0 {
            self.version += 1;
            debug!(added, version = self.version, "seeded default chip slots");
        }
        added
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
