//! Full-session scenarios over a persisted layout record.
//!
//! Each test drives the same flow an operator would: open the store,
//! record targets, then place or cancel against the loaded snapshot
//! while a recording driver captures the exact click sequence.

use croupier::executor::{BetExecutor, ExecutorConfig};
use croupier::pointer::RecordingPointer;
use croupier::storage::{delete_layout, save_layout, LayoutStore};
use croupier::types::{BetError, BetSide, Point, Role, ScreenRect};
use std::sync::Arc;
use std::time::Duration;

fn temp_path() -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("croupier_it_layout_{}.json", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

fn rect(name: &str, x: i32, y: i32) -> ScreenRect {
    ScreenRect::new(x, y, 50, 50, name)
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

/// Record all three roles plus the 1K/25K/125K chips, write-through.
fn configure_table(store: &mut LayoutStore) {
    store
        .set_role(Role::PlayerArea, rect("player_area", 100, 600))
        .unwrap();
    store
        .set_role(Role::BankerArea, rect("banker_area", 300, 600))
        .unwrap();
    store
        .set_role(Role::CancelButton, rect("cancel_button", 500, 700))
        .unwrap();
    store.set_chip(1_000, rect("chip_1000", 200, 400)).unwrap();
    store.set_chip(25_000, rect("chip_25000", 260, 400)).unwrap();
    store
        .set_chip(125_000, rect("chip_125000", 320, 400))
        .unwrap();
}

#[tokio::test]
async fn test_configured_session_places_composed_bet() {
    let path = temp_path();
    {
        let mut store = LayoutStore::open(&path).unwrap();
        configure_table(&mut store);
    } // every mutation was already written through

    let store = LayoutStore::open(&path).unwrap();
    assert!(store.layout().is_complete());

    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), fast_config());

    let receipt = executor
        .place(store.layout(), 175_000, BetSide::Banker)
        .await
        .unwrap();
    assert_eq!(receipt.path, vec![125_000, 25_000, 25_000]);
    assert_eq!(receipt.clicks_issued, 6);

    let clicks = recorder.clicks();
    assert_eq!(clicks.len(), 6);
    // clicks land at rectangle centers
    assert_eq!(clicks[0].target, "chip_125000");
    assert_eq!(clicks[0].at, Point { x: 345, y: 425 });
    assert_eq!(clicks[1].target, "banker_area");
    assert_eq!(clicks[1].at, Point { x: 325, y: 625 });
    // each denomination alternates with the bet area
    assert_eq!(
        recorder.click_targets(),
        vec![
            "chip_125000",
            "banker_area",
            "chip_25000",
            "banker_area",
            "chip_25000",
            "banker_area",
        ]
    );

    delete_layout(Some(&path)).unwrap();
}

#[tokio::test]
async fn test_recording_workflow_completes_table() {
    let path = temp_path();
    let mut store = LayoutStore::open(&path).unwrap();

    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), fast_config());

    // nothing recorded yet: betting rejected before any click
    let err = executor
        .place(store.layout(), 1_000, BetSide::Player)
        .await
        .unwrap_err();
    assert_eq!(err, BetError::NotConfigured);

    store
        .set_role(Role::PlayerArea, rect("player_area", 100, 600))
        .unwrap();
    store
        .set_role(Role::BankerArea, rect("banker_area", 300, 600))
        .unwrap();
    assert!(!store.layout().is_complete());

    store
        .set_role(Role::CancelButton, rect("cancel_button", 500, 700))
        .unwrap();
    assert!(store.layout().is_complete());

    // the seeded 1K slot exists but is still a placeholder
    let err = executor
        .place(store.layout(), 1_000, BetSide::Player)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        BetError::ChipNotFound {
            denomination: 1_000
        }
    );
    assert_eq!(recorder.click_count(), 0);

    store.set_chip(1_000, rect("chip_1000", 200, 400)).unwrap();
    let receipt = executor
        .place(store.layout(), 1_000, BetSide::Player)
        .await
        .unwrap();
    assert_eq!(receipt.clicks_issued, 2);
    assert_eq!(
        recorder.click_targets(),
        vec!["chip_1000", "player_area"]
    );

    delete_layout(Some(&path)).unwrap();
}

#[tokio::test]
async fn test_recorded_exact_slot_wins_over_composition() {
    let path = temp_path();
    let mut store = LayoutStore::open(&path).unwrap();
    configure_table(&mut store);
    store
        .set_chip(175_000, rect("chip_175000", 380, 400))
        .unwrap();

    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), fast_config());

    let receipt = executor
        .place(store.layout(), 175_000, BetSide::Player)
        .await
        .unwrap();
    assert_eq!(receipt.path, vec![175_000]);
    assert_eq!(
        recorder.click_targets(),
        vec!["chip_175000", "player_area"]
    );

    delete_layout(Some(&path)).unwrap();
}

#[tokio::test]
async fn test_removing_chip_changes_composition() {
    let path = temp_path();
    let mut store = LayoutStore::open(&path).unwrap();
    configure_table(&mut store);

    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), fast_config());

    let receipt = executor
        .place(store.layout(), 26_000, BetSide::Player)
        .await
        .unwrap();
    assert_eq!(receipt.path, vec![25_000, 1_000]);

    // with the 25K slot gone the same amount decomposes into 1K chips
    assert!(store.remove_chip(25_000).unwrap());
    recorder.clear();

    let receipt = executor
        .place(store.layout(), 26_000, BetSide::Player)
        .await
        .unwrap();
    assert_eq!(receipt.path, vec![1_000; 26]);
    assert_eq!(receipt.path.iter().sum::<u64>(), 26_000);
    assert_eq!(receipt.clicks_issued, 52);

    delete_layout(Some(&path)).unwrap();
}

#[tokio::test]
async fn test_click_sequence_deterministic_across_reopen() {
    let path = temp_path();
    let mut store = LayoutStore::open(&path).unwrap();
    configure_table(&mut store);

    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), fast_config());

    executor
        .place(store.layout(), 175_000, BetSide::Player)
        .await
        .unwrap();
    let first = recorder.clicks();
    recorder.clear();

    // a new session over the same record replays the identical sequence
    let store = LayoutStore::open(&path).unwrap();
    executor
        .place(store.layout(), 175_000, BetSide::Player)
        .await
        .unwrap();
    assert_eq!(recorder.clicks(), first);

    delete_layout(Some(&path)).unwrap();
}

#[tokio::test]
async fn test_reload_sees_external_recorder_edits() {
    let path = temp_path();
    let mut store = LayoutStore::open(&path).unwrap();
    configure_table(&mut store);

    // an external recording UI rewrites the same record
    let mut external = store.layout().clone();
    external.set_role(Role::BankerArea, rect("banker_area", 301, 601));
    save_layout(&external, Some(&path)).unwrap();

    store.reload().unwrap();
    assert_eq!(store.layout().role(Role::BankerArea).unwrap().x, 301);

    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), fast_config());
    executor
        .place(store.layout(), 25_000, BetSide::Banker)
        .await
        .unwrap();
    assert_eq!(recorder.clicks()[1].at, Point { x: 326, y: 626 });

    delete_layout(Some(&path)).unwrap();
}

#[tokio::test]
async fn test_cancel_only_needs_cancel_button() {
    let path = temp_path();
    {
        let mut store = LayoutStore::open(&path).unwrap();
        store
            .set_role(Role::CancelButton, rect("cancel_button", 500, 700))
            .unwrap();
    }

    let store = LayoutStore::open(&path).unwrap();
    assert!(!store.layout().is_complete());

    let recorder = RecordingPointer::new();
    let executor = BetExecutor::new(Arc::new(recorder.clone()), fast_config());

    let receipt = executor.cancel(store.layout()).await.unwrap();
    assert_eq!(receipt.clicks_issued, 20);
    assert_eq!(recorder.click_count(), 20);
    assert!(recorder.click_targets().iter().all(|t| t == "cancel_button"));

    delete_layout(Some(&path)).unwrap();
}
