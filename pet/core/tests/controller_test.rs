//! End-to-end controller scenarios driven by a manual clock

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use sekitoritchi_core::{
    Action, Background, JsonFileStore, ManualClock, MemoryStore, MoodCode, PetConfig,
    PetController, PetRecord, PetSnapshot, Rejection, SurfaceGone, RANDOM_OUTCOMES,
};
use tempfile::TempDir;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn setup(record: PetRecord, seed: u64) -> (PetController, ManualClock, MemoryStore) {
    let clock = ManualClock::new();
    let store = MemoryStore::with_record(record);
    let pet = PetController::new(PetConfig::default().with_seed(seed), store.clone())
        .with_clock(clock.clone());
    (pet, clock, store)
}

fn step(pet: &PetController, clock: &ManualClock, by: Duration) {
    clock.advance(by);
    pet.poll_timers();
}

#[test]
fn test_feed_animates_then_returns_to_idle() {
    let (pet, clock, store) = setup(PetRecord::default(), 1);

    pet.feed().unwrap();
    let snap = pet.snapshot();
    let delta = snap.weight - 250;
    assert!((3..=5).contains(&delta));
    assert_eq!(snap.health, 100);
    assert_eq!(snap.poop_level, delta);
    assert_eq!(snap.action, Action::Eat);
    assert!(matches!(
        snap.secondary_action,
        Some(Action::Oniguri | Action::Dessert)
    ));
    assert!(snap.animating);
    assert_eq!(store.record().map(|r| r.weight), Some(snap.weight));

    // A second action while the first is playing changes nothing
    assert_eq!(pet.feed(), Err(Rejection::Animating));
    assert_eq!(pet.sleep(), Err(Rejection::Animating));
    assert_eq!(pet.snapshot(), snap);

    step(&pet, &clock, secs(3));
    assert!(pet.is_animating());
    step(&pet, &clock, secs(1));
    let snap = pet.snapshot();
    assert!(!snap.animating);
    assert_eq!(snap.action, Action::Happy);
    assert_eq!(snap.secondary_action, None);

    assert!(pet.dance().is_ok());
}

#[test]
fn test_sleep_shows_night_scene_until_idle() {
    let record = PetRecord {
        background: Background::Outside.index(),
        ..PetRecord::default()
    };
    let (pet, clock, _store) = setup(record, 2);

    pet.sleep().unwrap();
    let snap = pet.snapshot();
    assert_eq!(snap.action, Action::Sleep);
    assert_eq!(snap.background, Background::Outside);
    assert_eq!(snap.scene, Background::NightOutside);

    step(&pet, &clock, secs(6));
    let snap = pet.snapshot();
    assert_eq!(snap.scene, Background::Outside);
    assert_eq!(snap.action, snap.mood.idle_action());
}

#[test]
fn test_decay_kills_overweight_pet() {
    let record = PetRecord {
        health: 1,
        weight: 400,
        ..PetRecord::default()
    };
    let (pet, clock, store) = setup(record, 3);
    pet.start();

    step(&pet, &clock, secs(14));
    assert!(pet.snapshot().is_alive);

    step(&pet, &clock, secs(1));
    let snap = pet.snapshot();
    assert!(!snap.is_alive);
    assert_eq!(snap.health, 0);
    assert_eq!(snap.mood, MoodCode::Dead);
    assert_eq!(snap.action, Action::Dead);
    assert_eq!(store.record().map(|r| r.is_alive), Some(false));

    assert_eq!(pet.feed(), Err(Rejection::Dead));
    assert_eq!(pet.random_event(), Err(Rejection::Dead));

    // Further ticks leave a dead pet untouched and tell nobody
    let published = Rc::new(std::cell::Cell::new(0));
    let seen = Rc::clone(&published);
    pet.subscribe(Rc::new(move |_: &PetSnapshot| -> Result<(), SurfaceGone> {
        seen.set(seen.get() + 1);
        Ok(())
    }));
    step(&pet, &clock, secs(60));
    assert_eq!(pet.snapshot().age, snap.age);
    assert_eq!(published.get(), 0);
}

#[test]
fn test_random_events_stay_within_table() {
    let (pet, clock, _store) = setup(PetRecord::default(), 7);
    let mut seen = HashSet::new();

    for _ in 0..1000 {
        let before = pet.snapshot();
        match pet.random_event() {
            Ok(outcome) => {
                assert!(RANDOM_OUTCOMES.contains(&outcome));
                seen.insert(outcome.action);

                let after = pet.snapshot();
                assert_eq!(after.background, before.background.next());
                let expected = (before.health + outcome.health_delta).clamp(0, 100);
                assert_eq!(after.health, expected);
                assert!((0..=100).contains(&after.health));
            }
            Err(Rejection::Dead) => pet.reset_game(),
            Err(other) => panic!("unexpected rejection: {other}"),
        }
        step(&pet, &clock, secs(5));
        assert!(!pet.is_animating());
    }

    assert_eq!(seen.len(), RANDOM_OUTCOMES.len());
}

#[test]
fn test_background_wraps_after_last() {
    let record = PetRecord {
        background: Background::NightOutside.index(),
        ..PetRecord::default()
    };
    let (pet, _clock, _store) = setup(record, 4);
    pet.random_event().unwrap();
    assert_eq!(pet.snapshot().background, Background::Morning);
}

#[test]
fn test_decay_waits_for_animation() {
    let (pet, clock, _store) = setup(PetRecord::default(), 5);
    pet.start();

    step(&pet, &clock, secs(12));
    pet.feed().unwrap();

    // The 15s slot falls inside the 4s feed window
    step(&pet, &clock, secs(3));
    assert_eq!(pet.snapshot().age, 1);
    assert_eq!(pet.snapshot().action, Action::Eat);

    step(&pet, &clock, secs(1));
    let snap = pet.snapshot();
    assert_eq!(snap.age, 2);
    assert!(!snap.animating);

    // The grid is unaffected: next tick at 30s
    step(&pet, &clock, secs(13));
    assert_eq!(pet.snapshot().age, 2);
    step(&pet, &clock, secs(1));
    assert_eq!(pet.snapshot().age, 3);
}

#[test]
fn test_poop_event_from_decay() {
    let record = PetRecord {
        poop_level: 72,
        ..PetRecord::default()
    };
    let (pet, clock, _store) = setup(record, 6);
    pet.start();

    step(&pet, &clock, secs(15));
    let snap = pet.snapshot();
    assert!(snap.poop_visible);
    assert_eq!(snap.poop_level, 0);
    assert_eq!(snap.action, Action::Pooping);
    assert_eq!(snap.secondary_action, Some(Action::Poop));
    assert!(snap.health <= 97);

    step(&pet, &clock, secs(3));
    let snap = pet.snapshot();
    assert!(!snap.animating);
    assert_eq!(snap.overlay(), Some(Action::Poop));

    assert!(pet.clean_poop());
    assert!(!pet.snapshot().poop_visible);
    assert!(!pet.clean_poop());
}

#[test]
fn test_visible_poop_survives_save_and_load() {
    let record = PetRecord {
        poop_level: 72,
        ..PetRecord::default()
    };
    let (pet, clock, store) = setup(record, 6);
    pet.start();

    // Poop event, its animation, then one more decay tick with poop on screen
    step(&pet, &clock, secs(15));
    step(&pet, &clock, secs(3));
    step(&pet, &clock, secs(12));
    let live = pet.snapshot();
    assert_eq!(live.age, 3);
    assert!(live.poop_visible);
    assert_eq!(live.poop_level, 0);

    pet.feed().unwrap();
    assert_eq!(pet.snapshot().poop_level, 0);
    step(&pet, &clock, secs(4));
    let live = pet.snapshot();

    assert!(pet.save_game());
    pet.load_game();
    let reloaded = pet.snapshot();
    assert_eq!(reloaded.poop_visible, live.poop_visible);
    assert_eq!(reloaded.poop_level, live.poop_level);
    assert_eq!(store.record().map(|r| r.poop_level), Some(0));
}

#[test]
fn test_reentrant_decay_from_observer_is_rejected() {
    let clock = ManualClock::new();
    let pet = Rc::new(
        PetController::new(PetConfig::default().with_seed(8), MemoryStore::new())
            .with_clock(clock),
    );
    let inner: Rc<RefCell<Vec<(bool, Rejection, Rejection)>>> = Rc::new(RefCell::new(Vec::new()));

    let weak = Rc::downgrade(&pet);
    let log = Rc::clone(&inner);
    pet.subscribe(Rc::new(move |_: &PetSnapshot| -> Result<(), SurfaceGone> {
        let Some(pet) = weak.upgrade() else {
            return Err(SurfaceGone);
        };
        let decay = pet.apply_decay_tick().err();
        let feed = pet.feed().err();
        if let (Some(decay), Some(feed)) = (decay, feed) {
            log.borrow_mut().push((pet.is_updating(), decay, feed));
        }
        Ok(())
    }));

    let report = pet.apply_decay_tick().unwrap();
    assert!(!report.died);
    assert_eq!(pet.snapshot().age, 2);
    assert_eq!(
        *inner.borrow(),
        vec![(true, Rejection::Updating, Rejection::Updating)]
    );
    assert!(!pet.is_updating());
}

#[test]
fn test_json_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("save.json");
    let clock = ManualClock::new();

    let first = PetController::new(
        PetConfig::default().with_seed(9),
        JsonFileStore::new(&path),
    )
    .with_clock(clock.clone());
    first.set_name("  Chiyonofuji ").unwrap();
    first.dance().unwrap();
    clock.advance(secs(4));
    first.poll_timers();
    assert!(first.save_game());
    let saved = first.snapshot();
    assert!(saved.last_saved.is_some());

    let second = PetController::new(PetConfig::default(), JsonFileStore::new(&path));
    assert_eq!(second.snapshot(), saved);
    assert_eq!(second.snapshot().name, "Chiyonofuji");

    assert_eq!(second.set_name("   "), Err(Rejection::EmptyName));
}

#[test]
fn test_load_and_reset_game() {
    let (pet, _clock, store) = setup(PetRecord::default(), 10);
    pet.feed().unwrap();

    pet.reset_game();
    let snap = pet.snapshot();
    assert!(!snap.animating);
    assert_eq!(snap.weight, 250);
    assert_eq!(store.record().map(|r| r.weight), Some(250));

    let record = PetRecord {
        name: "Hakuho".to_string(),
        age: 33,
        health: 45,
        ..PetRecord::default()
    };
    assert!(sekitoritchi_core::PersistenceStore::save(&store, &record));
    pet.load_game();
    let snap = pet.snapshot();
    assert_eq!(snap.name, "Hakuho");
    assert_eq!(snap.age, 33);
    assert_eq!(snap.mood, MoodCode::Angry);
    assert_eq!(snap.action, Action::Angry);
}

#[test]
fn test_dead_pet_can_still_be_cleaned() {
    let record = PetRecord {
        health: 0,
        is_alive: false,
        poop_visible: true,
        ..PetRecord::default()
    };
    let (pet, _clock, _store) = setup(record, 11);
    assert_eq!(pet.dance(), Err(Rejection::Dead));
    assert!(pet.clean_poop());
    assert!(!pet.snapshot().is_alive);
}
