//! Bet execution.
//!
//! Turns bet requests into ordered click sequences against a table
//! layout snapshot: Validate → Resolve → Compose → Execute. Owns the
//! inter-click delays, the brute-force cancellation loop, and the
//! at-most-one-in-flight guarantee. Every decision is mirrored to an
//! injected log sink so an operator surface can show the exact story
//! of a placement.

use crate::compose::compose;
use crate::layout::TableLayout;
use crate::pointer::PointerDriver;
use crate::types::{format_amount, BetError, BetSide, Role, ScreenRect};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing and bounds for the click protocol.
///
/// The delays are empirical: they pace the clicks so the target table
/// UI registers each one. All of them are overridable per deployment.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Pause between clicking a chip and clicking the bet area.
    pub chip_to_area_delay: Duration,
    /// Pause between consecutive denominations of a composed bet.
    pub between_chips_delay: Duration,
    /// Pause between consecutive cancel-button presses.
    pub cancel_click_delay: Duration,
    /// How many times the cancel button is pressed per cancellation.
    pub cancel_presses: u32,
    /// Largest single bet accepted by Validate.
    pub max_bet: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            chip_to_area_delay: Duration::from_millis(200),
            between_chips_delay: Duration::from_millis(150),
            cancel_click_delay: Duration::from_millis(250),
            cancel_presses: 20,
            max_bet: 100_000_000, // covers the largest standard chip
        }
    }
}

// ---------------------------------------------------------------------------
// Receipts
// ---------------------------------------------------------------------------

/// Receipt returned after a bet's click sequence completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetReceipt {
    pub id: String,
    pub side: BetSide,
    pub amount: u64,
    /// Denominations clicked, in click order.
    pub path: Vec<u64>,
    pub clicks_issued: u32,
    /// Version of the layout snapshot the sequence acted on.
    pub layout_version: u64,
    pub placed_at: DateTime<Utc>,
}

impl fmt::Display for BetReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} via {} ({} clicks, layout v{})",
            self.id,
            self.side,
            format_amount(self.amount),
            describe_path(&self.path),
            self.clicks_issued,
            self.layout_version,
        )
    }
}

/// Receipt returned after a cancellation's click loop completes.
///
/// Completion only means the presses were issued; the target surface
/// never acknowledges, so an actually-cancelled bet and a no-op target
/// are indistinguishable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelReceipt {
    pub id: String,
    pub clicks_issued: u32,
    pub layout_version: u64,
    pub cancelled_at: DateTime<Utc>,
}

impl fmt::Display for CancelReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] cancel ({} presses, layout v{})",
            self.id, self.clicks_issued, self.layout_version,
        )
    }
}

fn describe_path(path: &[u64]) -> String {
    let parts: Vec<String> = path.iter().map(|d| format_amount(*d)).collect();
    format!("[{}]", parts.join(", "))
}

// ---------------------------------------------------------------------------
// BetExecutor
// ---------------------------------------------------------------------------

/// Decision-log sink injected by the operator surface.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Executes bet placements and cancellations against layout snapshots.
///
/// The layout is passed by reference per call, so a reconfiguration
/// between calls is a new snapshot rather than a race. An internal
/// async mutex admits at most one in-flight click sequence at a time;
/// interleaved sequences would corrupt the click ordering the table
/// expects.
pub struct BetExecutor {
    pointer: Arc<dyn PointerDriver>,
    config: ExecutorConfig,
    sink: Option<LogSink>,
    in_flight: Mutex<()>,
}

impl BetExecutor {
    pub fn new(pointer: Arc<dyn PointerDriver>, config: ExecutorConfig) -> Self {
        Self {
            pointer,
            config,
            sink: None,
            in_flight: Mutex::new(()),
        }
    }

    /// Attach a decision-log sink. Without one the decision log is
    /// silently discarded; tracing events are emitted either way.
    pub fn with_logger(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Place `amount` on `side` using the given layout snapshot.
    ///
    /// Phases: Validate (amount bounds, layout completeness) → Resolve
    /// (bet area) → Compose (exact chip slot, else first-fit-descending
    /// decomposition over usable denominations) → Execute (chip click,
    /// pause, area click per denomination). Failures are reported as
    /// [`BetError`] values; all of them guarantee zero clicks except
    /// `chip_not_found` and `pointer`, which abort where they stand.
    pub async fn place(
        &self,
        layout: &TableLayout,
        amount: u64,
        side: BetSide,
    ) -> Result<BetReceipt, BetError> {
        let _guard = self.in_flight.lock().await;

        info!(
            amount,
            side = %side,
            layout_version = layout.version(),
            "Placing bet"
        );
        self.note(&format!(
            "Placing bet: {} on {} (layout v{})",
            format_amount(amount),
            side,
            layout.version(),
        ));

        // Validate
        if amount == 0 || amount > self.config.max_bet {
            return Err(self.reject(BetError::InvalidAmount { amount }));
        }
        if !layout.is_complete() {
            return Err(self.reject(BetError::NotConfigured));
        }

        // Resolve area. Completeness already guarantees the lookup;
        // kept as a guard so a miss can never slip into Execute.
        let area = match layout.role(side.role()) {
            Some(rect) => rect,
            None => return Err(self.reject(BetError::BetAreaNotFound { side })),
        };

        // Resolve chip path. An exact slot wins even while unrecorded;
        // Execute rejects it there rather than silently recomposing.
        let path = if layout.chip(amount).is_some() {
            debug!(amount, "Exact chip slot available");
            self.note(&format!("Exact chip available for {}", format_amount(amount)));
            vec![amount]
        } else {
            let available = layout.usable_denominations();
            match compose(amount, &available) {
                Some(path) => {
                    self.note(&format!(
                        "Composed {} as {}",
                        format_amount(amount),
                        describe_path(&path),
                    ));
                    path
                }
                None => return Err(self.reject(BetError::CannotComposeAmount { amount })),
            }
        };

        // Execute
        let mut clicks_issued = 0u32;
        for (index, &denomination) in path.iter().enumerate() {
            let slot = match layout.chip(denomination) {
                Some(slot) if slot.is_usable() => slot,
                _ => return Err(self.reject(BetError::ChipNotFound { denomination })),
            };
            if index > 0 {
                tokio::time::sleep(self.config.between_chips_delay).await;
            }
            self.note(&format!(
                "Clicking {} [{}/{}]",
                slot,
                index + 1,
                path.len(),
            ));
            self.click(&slot.rect).await?;
            clicks_issued += 1;

            tokio::time::sleep(self.config.chip_to_area_delay).await;
            self.click(area).await?;
            clicks_issued += 1;
        }

        let receipt = BetReceipt {
            id: format!("bet-{}", Uuid::new_v4()),
            side,
            amount,
            path,
            clicks_issued,
            layout_version: layout.version(),
            placed_at: Utc::now(),
        };
        info!(receipt = %receipt, "Bet placed");
        self.note(&format!("Click sequence completed ({clicks_issued} clicks)"));
        Ok(receipt)
    }

    /// Press the cancel button a fixed number of times.
    ///
    /// The target surface never acknowledges a cancel, so redundant
    /// repetition is the only reliability strategy; extra presses on an
    /// already-cancelled bet are harmless. Always returns a receipt
    /// once the loop completes.
    pub async fn cancel(&self, layout: &TableLayout) -> Result<CancelReceipt, BetError> {
        let _guard = self.in_flight.lock().await;

        info!(layout_version = layout.version(), "Cancelling bet");
        self.note(&format!("Cancelling bet (layout v{})", layout.version()));

        let button = match layout.role(Role::CancelButton) {
            Some(rect) => rect,
            None => return Err(self.reject(BetError::CancelButtonNotConfigured)),
        };

        for press in 0..self.config.cancel_presses {
            if press > 0 {
                tokio::time::sleep(self.config.cancel_click_delay).await;
            }
            self.click(button).await?;
        }

        let receipt = CancelReceipt {
            id: format!("cancel-{}", Uuid::new_v4()),
            clicks_issued: self.config.cancel_presses,
            layout_version: layout.version(),
            cancelled_at: Utc::now(),
        };
        info!(receipt = %receipt, "Cancel sequence completed");
        self.note(&format!(
            "Cancel complete ({} presses)",
            self.config.cancel_presses,
        ));
        Ok(receipt)
    }

    /// Click a single recorded chip once, so an operator can verify a
    /// coordinate without touching a bet area. No delays are involved.
    pub async fn rehearse_chip(
        &self,
        layout: &TableLayout,
        denomination: u64,
    ) -> Result<(), BetError> {
        let _guard = self.in_flight.lock().await;

        let slot = match layout.chip(denomination) {
            Some(slot) if slot.is_usable() => slot,
            _ => return Err(self.reject(BetError::ChipNotFound { denomination })),
        };
        self.note(&format!("Rehearsing {slot}"));
        info!(denomination, "Rehearsing chip click");
        self.click(&slot.rect).await?;
        Ok(())
    }

    async fn click(&self, target: &ScreenRect) -> Result<(), BetError> {
        self.pointer.click(target).await.map_err(|e| {
            self.reject(BetError::Pointer {
                message: e.to_string(),
            })
        })
    }

    fn note(&self, message: &str) {
        if let Some(sink) = &self.sink {
            sink(message);
        }
    }

    fn reject(&self, err: BetError) -> BetError {
        warn!(reason = err.code(), "{err}");
        self.note(&format!("Error: {}", err.code()));
        err
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
