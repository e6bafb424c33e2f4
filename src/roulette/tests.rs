//! Unit tests for the Roulette orchestrator and spinner.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::core::Roulette;
use super::tasks::SpinOutcome;
use super::tasks::Spinner;
use crate::config::BaseConfig;
use crate::store::MockRosterStore;
use crate::store::RosterStoreVariant;
use crate::types::Member;
use crate::types::Roster;
use crate::types::BASE_WEIGHT;
use crate::types::SELECTED_WEIGHT;

// ==================== TEST HELPERS ====================

fn test_config() -> BaseConfig {
    BaseConfig {
        spin_millis: 0,
        ..BaseConfig::default()
    }
}

async fn test_roulette(store: &MockRosterStore) -> Roulette {
    let roulette = Roulette::new(RosterStoreVariant::Mock(store.clone()), test_config())
        .with_rng(StdRng::seed_from_u64(42));
    roulette.refresh().await;
    roulette
}

fn names(roster: &Roster) -> Vec<String> {
    roster.iter().map(|m| m.name.clone()).collect()
}

// ==================== TESTS: refresh ====================

#[tokio::test]
async fn test_refresh_loads_store_roster() {
    let store = MockRosterStore::with_roster(Roster::new(vec![Member::new("z", "Zoe")]));
    let roulette = test_roulette(&store).await;

    assert_eq!(names(&roulette.roster().await), vec!["Zoe"]);
    assert!(roulette.notice().await.is_none());
}

#[tokio::test]
async fn test_failed_first_load_falls_back_to_seeded() {
    let store = MockRosterStore::with_roster(Roster::new(vec![Member::new("z", "Zoe")]));
    store.set_fail_load(true);
    let roulette = test_roulette(&store).await;

    assert_eq!(roulette.roster().await, Roster::seeded());
    assert!(roulette.notice().await.unwrap().contains("load"));
}

#[tokio::test]
async fn test_failed_reload_keeps_last_known_roster() {
    let store = MockRosterStore::with_roster(Roster::new(vec![Member::new("z", "Zoe")]));
    let roulette = test_roulette(&store).await;

    store.set_fail_load(true);
    roulette.refresh().await;
    assert_eq!(names(&roulette.roster().await), vec!["Zoe"]);
    assert!(roulette.notice().await.is_some());

    // Retry succeeds once the store is back.
    store.set_fail_load(false);
    roulette.refresh().await;
    assert!(roulette.notice().await.is_none());
}

#[tokio::test]
async fn test_load_notice_survives_successful_saves() {
    let store = MockRosterStore::with_roster(Roster::new(vec![Member::new("z", "Zoe")]));
    store.set_fail_load(true);
    let roulette = test_roulette(&store).await;

    roulette.add_member("Eve").await;
    roulette.select().await;
    assert_eq!(store.save_count(), 2);
    assert!(roulette.notice().await.unwrap().contains("load"));

    // A failing save does not hide the load failure either.
    store.set_fail_save(true);
    roulette.remove_member("1").await;
    assert!(roulette.notice().await.unwrap().contains("load"));

    store.set_fail_load(false);
    roulette.refresh().await;
    assert!(roulette.notice().await.is_none());
}

#[tokio::test]
async fn test_successful_save_clears_save_notice() {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;

    store.set_fail_save(true);
    roulette.add_member("Eve").await;
    assert!(roulette.notice().await.unwrap().contains("save"));

    store.set_fail_save(false);
    roulette.add_member("Frank").await;
    assert!(roulette.notice().await.is_none());
    assert_eq!(store.stored().await.len(), 6);
}

// ==================== TESTS: mutations ====================

#[tokio::test]
async fn test_add_member_persists() {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;

    let roster = roulette.add_member("Eve").await;
    assert_eq!(roster.len(), 5);
    assert_eq!(store.stored().await, roster);
    assert_eq!(store.save_count(), 1);
}

#[tokio::test]
async fn test_blank_add_skips_store() {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;

    let roster = roulette.add_member("   ").await;
    assert_eq!(roster, Roster::seeded());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_remove_member_persists() {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;

    let roster = roulette.remove_member("2").await;
    assert_eq!(names(&roster), vec!["Alice", "Charlie", "Diana"]);
    assert_eq!(store.stored().await, roster);
}

#[tokio::test]
async fn test_remove_unknown_skips_store() {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;

    roulette.remove_member("missing").await;
    assert_eq!(store.save_count(), 0);
}

// ==================== TESTS: select ====================

#[tokio::test]
async fn test_select_reweights_and_persists() {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;

    let selected = roulette.select().await.expect("roster is not empty");
    let roster = roulette.roster().await;

    for member in &roster {
        if member.id == selected.id {
            assert_eq!(member.weight, SELECTED_WEIGHT);
        } else {
            assert_eq!(member.weight, BASE_WEIGHT + 1.0);
        }
    }
    assert_eq!(store.stored().await, roster);
}

#[tokio::test]
async fn test_select_empty_roster_is_none() {
    let store = MockRosterStore::with_roster(Roster::default());
    let roulette = test_roulette(&store).await;

    assert!(roulette.select().await.is_none());
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn test_save_failure_keeps_selection_in_memory() {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;
    store.set_fail_save(true);

    let selected = roulette.select().await.expect("roster is not empty");
    let roster = roulette.roster().await;
    assert_eq!(roster.get(&selected.id).unwrap().weight, SELECTED_WEIGHT);

    // Store still holds the stale copy, the notice tells the user.
    assert_eq!(store.stored().await, Roster::seeded());
    assert!(roulette.notice().await.unwrap().contains("save"));

    roulette.dismiss_notice().await;
    assert!(roulette.notice().await.is_none());
}

#[tokio::test]
async fn test_concurrent_selects_are_serialized() -> Result<()> {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let roulette = roulette.clone();
        handles.push(tokio::spawn(async move { roulette.select().await }));
    }
    for handle in handles {
        assert!(handle.await?.is_some());
    }

    // Every selection saved, and the last save matches memory.
    let roster = roulette.roster().await;
    assert_eq!(store.save_count(), 20);
    assert_eq!(store.stored().await, roster);
    Ok(())
}

// ==================== TESTS: spinner ====================

#[tokio::test]
async fn test_spin_reveals_and_emits_frames() -> Result<()> {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;
    let spinner = Spinner::new(roulette.clone(), Duration::from_millis(60))
        .with_frame(Duration::from_millis(5));

    let frames = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&frames);
    let outcome = spinner
        .spin(move |name: &str| sink.lock().unwrap().push(name.to_string()))
        .await?;

    match outcome {
        SpinOutcome::Revealed(Some(member)) => {
            assert_eq!(
                roulette.roster().await.get(&member.id).unwrap().weight,
                SELECTED_WEIGHT
            );
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    let frames = frames.lock().unwrap();
    assert!(!frames.is_empty());
    let seeded = names(&Roster::seeded());
    assert!(frames.iter().all(|f| seeded.contains(f)));
    Ok(())
}

#[tokio::test]
async fn test_newer_spin_supersedes_older() -> Result<()> {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;
    let spinner = Spinner::new(roulette.clone(), Duration::from_millis(50))
        .with_frame(Duration::from_millis(5));

    let first = spinner.start(|_: &str| {}).await;
    let second = spinner.start(|_: &str| {}).await;
    assert!(second.generation() > first.generation());

    assert_eq!(first.finish().await?, SpinOutcome::Superseded);
    assert!(matches!(
        second.finish().await?,
        SpinOutcome::Revealed(Some(_))
    ));

    // Only the latest spin selected.
    assert_eq!(store.save_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_cancelled_spin_selects_nothing() -> Result<()> {
    let store = MockRosterStore::new();
    let roulette = test_roulette(&store).await;
    let spinner = Spinner::new(roulette, Duration::from_secs(5));

    let handle = spinner.start(|_: &str| {}).await;
    handle.cancel();
    assert_eq!(handle.finish().await?, SpinOutcome::Superseded);
    assert_eq!(store.save_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_spin_on_empty_roster() -> Result<()> {
    let store = MockRosterStore::with_roster(Roster::default());
    let roulette = test_roulette(&store).await;
    let spinner = Spinner::new(roulette, Duration::from_millis(10));

    assert_eq!(
        spinner.spin(|_: &str| {}).await?,
        SpinOutcome::Revealed(None)
    );
    Ok(())
}
