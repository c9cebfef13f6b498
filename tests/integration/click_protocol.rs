//! Click-protocol guarantees: rejection side effects, pacing, the
//! at-most-one-in-flight rule, and mid-sequence driver failure.

use anyhow::{bail, Result};
use async_trait::async_trait;
use croupier::executor::{BetExecutor, ExecutorConfig};
use croupier::layout::TableLayout;
use croupier::pointer::{PointerDriver, RecordingPointer};
use croupier::types::{BetSide, Role, ScreenRect};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Complete table: roles recorded, 1K/25K/125K chips recorded, and a
/// 500K slot left at its placeholder.
fn rigged_layout() -> TableLayout {
    let mut layout = TableLayout::new();
    layout.set_role(
        Role::PlayerArea,
        ScreenRect::new(100, 600, 80, 40, "player_area"),
    );
    layout.set_role(
        Role::BankerArea,
        ScreenRect::new(300, 600, 80, 40, "banker_area"),
    );
    layout.set_role(
        Role::CancelButton,
        ScreenRect::new(500, 700, 60, 30, "cancel_button"),
    );
    for (denomination, x) in [(1_000, 200), (25_000, 260), (125_000, 320)] {
        layout
            .set_chip(
                denomination,
                ScreenRect::new(x, 400, 50, 50, format!("chip_{denomination}")),
            )
            .unwrap();
    }
    layout
        .set_chip(500_000, ScreenRect::placeholder("chip_500000"))
        .unwrap();
    layout
}

/// Zero delays so sequences complete instantly under test.
fn fast_config() -> ExecutorConfig {
    ExecutorConfig {
        chip_to_area_delay: Duration::ZERO,
        between_chips_delay: Duration::ZERO,
        cancel_click_delay: Duration::ZERO,
        ..ExecutorConfig::default()
    }
}

#[tokio::test]
async fn test_rejections_issue_zero_clicks() {
    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), fast_config());
    let complete = rigged_layout();

    // invalid_side never reaches the executor: the side type rejects it
    let err = "tie".parse::<BetSide>().unwrap_err();
    assert_eq!(err.code(), "invalid_side");

    let err = executor
        .place(&complete, 0, BetSide::Player)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_amount");

    let err = executor
        .place(&complete, 100_000_001, BetSide::Player)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_amount");

    // same table minus the banker area
    let mut incomplete = TableLayout::new();
    incomplete.set_role(
        Role::PlayerArea,
        ScreenRect::new(100, 600, 80, 40, "player_area"),
    );
    incomplete.set_role(
        Role::CancelButton,
        ScreenRect::new(500, 700, 60, 30, "cancel_button"),
    );
    incomplete
        .set_chip(1_000, ScreenRect::new(200, 400, 50, 50, "chip_1000"))
        .unwrap();
    let err = executor
        .place(&incomplete, 1_000, BetSide::Banker)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "not_configured");

    let err = executor
        .place(&complete, 777, BetSide::Player)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "cannot_compose_amount");

    // exact slot exists but was never recorded
    let err = executor
        .place(&complete, 500_000, BetSide::Player)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "chip_not_found");

    let err = executor.cancel(&TableLayout::new()).await.unwrap_err();
    assert_eq!(err.code(), "cancel_button_not_configured");

    assert_eq!(recorder.click_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_composed_place_paces_clicks() {
    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), ExecutorConfig::default());
    let layout = rigged_layout();

    let start = tokio::time::Instant::now();
    let receipt = executor
        .place(&layout, 175_000, BetSide::Player)
        .await
        .unwrap();

    // 3 chip→area pauses of 200 ms plus 2 between-chip pauses of
    // 150 ms, with no trailing delay after the last denomination
    assert_eq!(start.elapsed(), Duration::from_millis(900));
    assert_eq!(receipt.clicks_issued, 6);
    assert_eq!(recorder.click_count(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_paces_presses() {
    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), ExecutorConfig::default());
    let layout = rigged_layout();

    let start = tokio::time::Instant::now();
    let receipt = executor.cancel(&layout).await.unwrap();

    // 20 presses separated by 19 pauses of 250 ms, none trailing
    assert_eq!(start.elapsed(), Duration::from_millis(4_750));
    assert_eq!(receipt.clicks_issued, 20);
    assert_eq!(recorder.click_count(), 20);
}

#[tokio::test]
async fn test_concurrent_placements_never_interleave() {
    let recorder = RecordingPointer::new();
    let config = ExecutorConfig {
        chip_to_area_delay: Duration::from_millis(5),
        between_chips_delay: Duration::from_millis(5),
        ..ExecutorConfig::default()
    };
    let executor = BetExecutor::new(Arc::new(recorder.clone()), config);
    let layout = rigged_layout();

    let (a, b) = tokio::join!(
        executor.place(&layout, 1_000, BetSide::Player),
        executor.place(&layout, 25_000, BetSide::Banker),
    );
    a.unwrap();
    b.unwrap();

    // whichever sequence starts must finish before the other begins
    let targets = recorder.click_targets();
    assert_eq!(targets.len(), 4);
    let player_first = targets == vec!["chip_1000", "player_area", "chip_25000", "banker_area"];
    let banker_first = targets == vec!["chip_25000", "banker_area", "chip_1000", "player_area"];
    assert!(player_first || banker_first, "interleaved clicks: {targets:?}");
}

#[tokio::test]
async fn test_decision_log_orders_the_story() {
    let recorder = RecordingPointer::new();
    let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = lines.clone();
    let executor = BetExecutor::new(Arc::new(recorder), fast_config())
        .with_logger(move |m| sink.lock().unwrap().push(m.to_string()));

    let layout = rigged_layout();
    executor
        .place(&layout, 175_000, BetSide::Player)
        .await
        .unwrap();

    let lines = lines.lock().unwrap();
    let position = |needle: &str| {
        lines
            .iter()
            .position(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("missing log line: {needle}"))
    };
    assert!(position("Placing bet: 175K on Player") < position("Composed 175K as [125K, 25K, 25K]"));
    assert!(position("[1/3]") < position("[2/3]"));
    assert!(position("[2/3]") < position("[3/3]"));
    assert!(lines
        .last()
        .unwrap()
        .contains("Click sequence completed (6 clicks)"));
}

/// Succeeds for a fixed number of clicks, then fails like a driver
/// whose display connection died mid-sequence.
#[derive(Clone)]
struct DyingPointer {
    recorder: RecordingPointer,
    good_clicks: usize,
}

#[async_trait]
impl PointerDriver for DyingPointer {
    fn name(&self) -> &str {
        "dying"
    }

    async fn click(&self, target: &ScreenRect) -> Result<()> {
        if self.recorder.click_count() >= self.good_clicks {
            bail!("display connection lost");
        }
        self.recorder.click(target).await
    }
}

#[tokio::test]
async fn test_driver_failure_aborts_where_it_stands() {
    let recorder = RecordingPointer::new();
    let pointer = DyingPointer {
        recorder: recorder.clone(),
        good_clicks: 3,
    };
    let executor = BetExecutor::new(Arc::new(pointer), fast_config());
    let layout = rigged_layout();

    let err = executor
        .place(&layout, 175_000, BetSide::Banker)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "pointer");

    // the three clicks already issued stand; nothing is rolled back
    assert_eq!(
        recorder.click_targets(),
        vec!["chip_125000", "banker_area", "chip_25000"]
    );
}
