//! Pointer seam: the single-click primitive.
//!
//! The executor never talks to an OS pointer directly; it goes through
//! [`PointerDriver`], which clicks the center of a recorded rectangle.
//! A real OS-backed driver is a drop-in implementation of this trait.
//! The crate ships two non-OS drivers: [`SilentPointer`] for dry
//! sessions and [`RecordingPointer`] for tests and rehearsal tooling.

use crate::types::{Point, ScreenRect};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Trait implemented by anything that can issue a pointer click.
///
/// The click lands at the rectangle's center `(x + w/2, y + h/2)`. An
/// `Err` means the OS call itself failed; the engine treats that as a
/// transport failure, distinct from its logical rejection reasons.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PointerDriver: Send + Sync {
    /// Short driver identifier for logs.
    fn name(&self) -> &str;

    /// Issue one simulated click at the rectangle's center.
    async fn click(&self, target: &ScreenRect) -> Result<()>;
}

// ---------------------------------------------------------------------------
// SilentPointer
// ---------------------------------------------------------------------------

/// A driver that computes the click and performs nothing.
///
/// Keeps a session completely safe when no OS pointer should be
/// touched; every click is traced so the sequence stays observable.
#[derive(Debug, Default)]
pub struct SilentPointer;

#[async_trait]
impl PointerDriver for SilentPointer {
    fn name(&self) -> &str {
        "silent"
    }

    async fn click(&self, target: &ScreenRect) -> Result<()> {
        let at = target.center();
        debug!(target = %target.name, at = %at, "Simulated click (no OS pointer attached)");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RecordingPointer
// ---------------------------------------------------------------------------

/// A click captured by [`RecordingPointer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedClick {
    /// The rectangle's label, e.g. "chip_25000".
    pub target: String,
    /// Where the click landed.
    pub at: Point,
}

/// A driver that records every click instead of performing it.
///
/// Clones share their internals, so a clone can be handed to the
/// executor while the original stays behind for assertions.
/// `set_error` makes subsequent clicks fail until cleared, for
/// exercising the transport-failure path.
#[derive(Debug, Clone, Default)]
pub struct RecordingPointer {
    clicks: Arc<Mutex<Vec<RecordedClick>>>,
    force_error: Arc<Mutex<Option<String>>>,
}

impl RecordingPointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything clicked so far, in click order.
    pub fn clicks(&self) -> Vec<RecordedClick> {
        self.lock_clicks().clone()
    }

    /// Just the rectangle labels, in click order.
    pub fn click_targets(&self) -> Vec<String> {
        self.lock_clicks().iter().map(|c| c.target.clone()).collect()
    }

    pub fn click_count(&self) -> usize {
        self.lock_clicks().len()
    }

    /// Forget recorded clicks (between scenarios).
    pub fn clear(&self) {
        self.lock_clicks().clear();
    }

    /// Make every subsequent click fail with this message.
    pub fn set_error(&self, message: &str) {
        *self
            .force_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_string());
    }

    /// Clear a forced error.
    pub fn clear_error(&self) {
        *self
            .force_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn lock_clicks(&self) -> std::sync::MutexGuard<'_, Vec<RecordedClick>> {
        self.clicks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PointerDriver for RecordingPointer {
    fn name(&self) -> &str {
        "recording"
    }

    async fn click(&self, target: &ScreenRect) -> Result<()> {
        let forced = self
            .force_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(message) = forced {
            return Err(anyhow::anyhow!("{message}"));
        }

        self.lock_clicks().push(RecordedClick {
            target: target.name.clone(),
            at: target.center(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
