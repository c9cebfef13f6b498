//! Shared types for the CROUPIER agent.
//!
//! These types form the data model used across all modules: screen
//! geometry, bet sides and table roles, chip slots, and the error
//! taxonomy returned by the bet executor. They are designed to be
//! stable so that layout, storage, and executor modules can depend on
//! them without circular references.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Screen geometry
// ---------------------------------------------------------------------------

/// A point in absolute screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A recorded screen rectangle associated with a clickable target.
///
/// Coordinates are absolute screen pixels; negative values are legal on
/// multi-monitor setups. A rectangle is immutable once recorded — a new
/// selection replaces the old value wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Human-readable label, e.g. "player_area" or "chip_25000".
    pub name: String,
}

impl ScreenRect {
    /// Default edge length for placeholder rectangles.
    pub const PLACEHOLDER_SIZE: i32 = 50;

    pub fn new(x: i32, y: i32, width: i32, height: i32, name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            name: name.into(),
        }
    }

    /// A rectangle at the screen origin, marking a target that has been
    /// declared but never recorded.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(
            0,
            0,
            Self::PLACEHOLDER_SIZE,
            Self::PLACEHOLDER_SIZE,
            name,
        )
    }

    /// Whether this rectangle is the unrecorded placeholder.
    pub fn is_origin_placeholder(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// The click target: the rectangle's center `(x + w/2, y + h/2)`.
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2,
            y: self.y + self.height / 2,
        }
    }

    /// Helper to build a recorded test rectangle.
    #[cfg(test)]
    pub fn sample(name: &str) -> Self {
        Self::new(120, 240, 50, 50, name)
    }
}

impl fmt::Display for ScreenRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ ({}, {}) {}x{}",
            self.name, self.x, self.y, self.width, self.height,
        )
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The side of the table a bet is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BetSide {
    Player,
    Banker,
}

impl BetSide {
    /// The opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            BetSide::Player => BetSide::Banker,
            BetSide::Banker => BetSide::Player,
        }
    }

    /// The table role holding this side's betting area rectangle.
    pub fn role(&self) -> Role {
        match self {
            BetSide::Player => Role::PlayerArea,
            BetSide::Banker => Role::BankerArea,
        }
    }
}

impl fmt::Display for BetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetSide::Player => write!(f, "Player"),
            BetSide::Banker => write!(f, "Banker"),
        }
    }
}

/// Attempt to parse a string into a BetSide (case-insensitive).
/// Exactly two sides are recognized; anything else is `invalid_side`.
impl std::str::FromStr for BetSide {
    type Err = BetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player" | "p" => Ok(BetSide::Player),
            "banker" | "b" => Ok(BetSide::Banker),
            _ => Err(BetError::InvalidSide {
                input: s.to_string(),
            }),
        }
    }
}

/// The three required rectangle purposes on a configured table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PlayerArea,
    BankerArea,
    CancelButton,
}

impl Role {
    /// All required roles (useful for completeness checks and status output).
    pub const ALL: &'static [Role] = &[Role::PlayerArea, Role::BankerArea, Role::CancelButton];

    /// Stable snake_case name, matching the persisted record keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlayerArea => "player_area",
            Role::BankerArea => "banker_area",
            Role::CancelButton => "cancel_button",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attempt to parse a persisted/typed role name.
impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "player_area" | "player" => Ok(Role::PlayerArea),
            "banker_area" | "banker" => Ok(Role::BankerArea),
            "cancel_button" | "cancel" => Ok(Role::CancelButton),
            _ => Err(anyhow::anyhow!("Unknown table role: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Chip slots
// ---------------------------------------------------------------------------

/// A chip denomination and the screen rectangle recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipSlot {
    /// Chip value; always positive, unique within a layout.
    pub denomination: u64,
    pub rect: ScreenRect,
}

impl ChipSlot {
    /// A declared-but-unrecorded slot for the given denomination.
    pub fn placeholder(denomination: u64) -> Self {
        Self {
            rect: ScreenRect::placeholder(format!("chip_{denomination}")),
            denomination,
        }
    }

    /// Whether the slot can actually be clicked. Slots keep their
    /// placeholder rectangle until the operator records a real one.
    pub fn is_usable(&self) -> bool {
        !self.rect.is_origin_placeholder()
    }
}

impl fmt::Display for ChipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_usable() {
            write!(
                f,
                "{} chip @ {}",
                format_amount(self.denomination),
                self.rect.center(),
            )
        } else {
            write!(f, "{} chip (not recorded)", format_amount(self.denomination))
        }
    }
}

/// Humanize a chip amount the way the table UI labels chips:
/// `500 → "500"`, `25000 → "25K"`, `1250000 → "1.25M"`.
///
/// The K form floors to whole thousands; chips are round values in
/// practice so nothing is lost.
pub fn format_amount(amount: u64) -> String {
    if amount >= 1_000_000 {
        let formatted = format!("{:.2}", amount as f64 / 1_000_000.0);
        let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
        format!("{trimmed}M")
    } else if amount >= 1_000 {
        format!("{}K", amount / 1_000)
    } else {
        amount.to_string()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Named failure reasons for bet placement and cancellation.
///
/// Every engine operation reports failures as values of this enum; none
/// of them are fatal to the process. Variants up to `ChipNotFound` are
/// the logical taxonomy and guarantee zero clicks were issued, except
/// `ChipNotFound`, which may leave earlier clicks of a chip path
/// standing. `Pointer` is a transport failure from the click driver.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BetError {
    #[error("Invalid bet side: {input}")]
    InvalidSide { input: String },

    #[error("Invalid bet amount: {amount}")]
    InvalidAmount { amount: u64 },

    #[error("Table positions not configured")]
    NotConfigured,

    #[error("Bet area position not found for {side}")]
    BetAreaNotFound { side: BetSide },

    #[error("Cannot compose amount {amount} with available chips")]
    CannotComposeAmount { amount: u64 },

    #[error("Chip position not found for denomination {denomination}")]
    ChipNotFound { denomination: u64 },

    #[error("Cancel button position not configured")]
    CancelButtonNotConfigured,

    #[error("Pointer driver failure: {message}")]
    Pointer { message: String },
}

impl BetError {
    /// Stable snake_case reason code, as reported to operators and logs.
    pub fn code(&self) -> &'static str {
        match self {
            BetError::InvalidSide { .. } => "invalid_side",
            BetError::InvalidAmount { .. } => "invalid_amount",
            BetError::NotConfigured => "not_configured",
            BetError::BetAreaNotFound { .. } => "bet_area_not_found",
            BetError::CannotComposeAmount { .. } => "cannot_compose_amount",
            BetError::ChipNotFound { .. } => "chip_not_found",
            BetError::CancelButtonNotConfigured => "cancel_button_not_configured",
            BetError::Pointer { .. } => "pointer",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
