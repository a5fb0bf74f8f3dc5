//! Pet Controller
//!
//! The single owner of the live pet. It mediates player actions, runs the
//! decay cycle when the scheduler says so, persists after every visible
//! change and publishes snapshots to observers.
//!
//! # Phases
//!
//! ```text
//!            feed / dance / sleep / random / (poop)
//!   ┌──────┐ ─────────────────────────────────────▶ ┌───────────┐
//!   │ Idle │                                        │ Animating │──┐ any action
//!   └──────┘ ◀───────────────────────────────────── └───────────┘◀─┘ → Rejection
//!              return-to-idle timer fires
//!              (idle action, chosen scene, pending decay)
//! ```
//!
//! A second guard, the `updating` flag, is held for the whole decay tick
//! including its observer notification. Anything an observer triggers from
//! inside that callback sees the flag and is rejected instead of
//! interleaving with the tick.
//!
//! # Driving
//!
//! The controller never sleeps. Whoever owns the event loop asks for
//! [`PetController::next_deadline`], waits until then, and calls
//! [`PetController::poll_timers`]. [`crate::runtime::drive`] does exactly
//! that on tokio; the terminal UI folds it into its own `select!`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tokio::time::Instant;

use crate::action::Action;
use crate::config::PetConfig;
use crate::guard::ReentrancyFlag;
use crate::observer::{ObserverHandle, ObserverHub};
use crate::persistence::PersistenceStore;
use crate::scheduler::{Cadence, Clock, TimerId, TimerQueue, TokioClock};
use crate::state::{DecayReport, PetSnapshot, PetState};

// =============================================================================
// Outcomes
// =============================================================================

/// Why an action was not applied
///
/// None of these are failures of the program; they are the defined outcome
/// of asking a busy, dead or misaddressed pet to do something.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Another action's animation is still playing
    #[error("an animation is already playing")]
    Animating,

    /// A decay tick is in progress
    #[error("the pet is being updated")]
    Updating,

    /// Dead pets do not take actions
    #[error("the pet is no longer alive")]
    Dead,

    /// Names must contain something other than whitespace
    #[error("name must not be empty")]
    EmptyName,
}

/// Whether an action animation is in flight
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// Accepting actions
    #[default]
    Idle,
    /// Playing an action; new actions are rejected
    Animating,
}

/// One possible random event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomOutcome {
    /// Animation played
    pub action: Action,
    /// Health change applied
    pub health_delta: i32,
}

/// Every outcome a random event can roll, with equal weight
pub const RANDOM_OUTCOMES: [RandomOutcome; 4] = [
    RandomOutcome {
        action: Action::Frustrated,
        health_delta: -5,
    },
    RandomOutcome {
        action: Action::Attention,
        health_delta: -3,
    },
    RandomOutcome {
        action: Action::Look,
        health_delta: 3,
    },
    RandomOutcome {
        action: Action::DanceReverse,
        health_delta: 5,
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerKind {
    ReturnToIdle,
    PoopRetry,
}

// =============================================================================
// Controller
// =============================================================================

/// Owner of the live pet and its timers
pub struct PetController {
    config: PetConfig,
    clock: Rc<dyn Clock>,
    store: Box<dyn PersistenceStore>,
    state: RefCell<PetState>,
    rng: RefCell<StdRng>,
    hub: ObserverHub,

    updating: ReentrancyFlag,
    phase: Cell<Phase>,

    timers: RefCell<TimerQueue<TimerKind>>,
    /// Present while the decay loop runs
    cadence: RefCell<Option<Cadence>>,
    /// A decay slot came due during an animation
    decay_pending: Cell<bool>,
    /// Poop became visible and its animation has not played yet
    poop_pending: Cell<bool>,
    poop_retry: Cell<Option<TimerId>>,
}

impl PetController {
    /// Hydrate a pet from `store`
    ///
    /// The decay loop is not running until [`start`](Self::start).
    pub fn new(config: PetConfig, store: impl PersistenceStore + 'static) -> Self {
        let record = store.load();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let state = PetState::from_record(&record);
        tracing::info!(
            name = %state.name(),
            age = state.age(),
            alive = state.is_alive(),
            "Pet hydrated"
        );

        Self {
            config,
            clock: Rc::new(TokioClock),
            store: Box::new(store),
            state: RefCell::new(state),
            rng: RefCell::new(rng),
            hub: ObserverHub::new(),
            updating: ReentrancyFlag::new(),
            phase: Cell::new(Phase::Idle),
            timers: RefCell::new(TimerQueue::new()),
            cadence: RefCell::new(None),
            decay_pending: Cell::new(false),
            poop_pending: Cell::new(false),
            poop_retry: Cell::new(None),
        }
    }

    /// Use a different clock (call before [`start`](Self::start))
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Rc::new(clock);
        self
    }

    // =========================================================================
    // Read Side
    // =========================================================================

    /// Configuration this controller was built with
    pub fn config(&self) -> &PetConfig {
        &self.config
    }

    /// Flattened read-only view of the pet
    pub fn snapshot(&self) -> PetSnapshot {
        self.state.borrow().snapshot(self.is_animating())
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Whether an action animation is in flight
    pub fn is_animating(&self) -> bool {
        self.phase.get() == Phase::Animating
    }

    /// Whether a decay tick holds the update guard
    pub fn is_updating(&self) -> bool {
        self.updating.is_held()
    }

    /// Whether the decay loop is running
    pub fn is_running(&self) -> bool {
        self.cadence.borrow().is_some()
    }

    /// Observer registry
    pub fn hub(&self) -> &ObserverHub {
        &self.hub
    }

    /// Register an observer (idempotent)
    pub fn subscribe(&self, observer: ObserverHandle) -> bool {
        self.hub.subscribe(observer)
    }

    /// Remove an observer (idempotent)
    pub fn unsubscribe(&self, observer: &ObserverHandle) -> bool {
        self.hub.unsubscribe(observer)
    }

    // =========================================================================
    // Loop Control
    // =========================================================================

    /// Start the decay loop; the first tick is one interval from now
    pub fn start(&self) {
        let now = self.clock.now();
        *self.cadence.borrow_mut() = Some(Cadence::starting_at(
            now,
            self.config.timing.decay_interval,
        ));
        tracing::info!(
            interval_ms = self.config.timing.decay_interval.as_millis() as u64,
            "Decay loop started"
        );
    }

    /// Stop the decay loop, cancel pending timers and save one last time
    pub fn stop(&self) {
        self.cadence.borrow_mut().take();
        let was_animating = self.is_animating();
        self.cancel_activity();
        if was_animating {
            self.state.borrow_mut().return_to_idle();
        }
        self.persist();
        self.publish();
        tracing::info!("Decay loop stopped");
    }

    /// Earliest instant at which [`poll_timers`](Self::poll_timers) has work
    pub fn next_deadline(&self) -> Option<Instant> {
        let timer = self.timers.borrow().next_deadline();
        let cadence = self.cadence.borrow().as_ref().map(Cadence::next_fire);
        match (timer, cadence) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Fire everything that is due, earliest first; returns how many fired
    ///
    /// When a one-shot timer and a decay slot share a deadline, the one-shot
    /// fires first.
    pub fn poll_timers(&self) -> usize {
        let mut fired = 0;
        loop {
            let now = self.clock.now();
            let timer_due = self
                .timers
                .borrow()
                .next_deadline()
                .filter(|d| *d <= now);
            let decay_due = self
                .cadence
                .borrow()
                .as_ref()
                .map(Cadence::next_fire)
                .filter(|d| *d <= now);

            match (timer_due, decay_due) {
                (None, None) => break,
                (None, Some(_)) => self.fire_cadence(now),
                (Some(t), Some(d)) if d < t => self.fire_cadence(now),
                _ => {
                    let popped = self.timers.borrow_mut().pop_due(now);
                    if let Some((id, kind)) = popped {
                        self.fire_timer(id, kind);
                    }
                }
            }
            fired += 1;
        }
        fired
    }

    fn fire_cadence(&self, now: Instant) {
        let due = self
            .cadence
            .borrow_mut()
            .as_mut()
            .is_some_and(|c| c.poll(now));
        if due {
            self.on_decay_due();
        }
    }

    fn fire_timer(&self, id: TimerId, kind: TimerKind) {
        tracing::debug!(?kind, "Timer fired");
        match kind {
            TimerKind::ReturnToIdle => self.finish_animation(),
            TimerKind::PoopRetry => {
                if self.poop_retry.get() == Some(id) {
                    self.poop_retry.set(None);
                }
                let _ = self.make_poop();
            }
        }
    }

    fn on_decay_due(&self) {
        if !self.state.borrow().is_alive() {
            tracing::debug!("Decay skipped: pet is dead");
            return;
        }
        if self.is_animating() {
            tracing::debug!("Decay deferred until the animation ends");
            self.decay_pending.set(true);
            return;
        }
        self.run_decay_cycle();
    }

    fn run_decay_cycle(&self) {
        if self.apply_decay_tick().is_ok() {
            self.check_poop_event();
        }
    }

    // =========================================================================
    // Decay
    // =========================================================================

    /// Apply one decay tick, persist and notify
    ///
    /// A no-op returning [`Rejection::Updating`] while another tick holds the
    /// guard, and [`Rejection::Dead`] for a dead pet. The guard stays held
    /// through persistence and notification and is released on every path.
    pub fn apply_decay_tick(&self) -> Result<DecayReport, Rejection> {
        let Some(_guard) = self.updating.try_acquire() else {
            return Err(Rejection::Updating);
        };
        if !self.state.borrow().is_alive() {
            return Err(Rejection::Dead);
        }

        let report = {
            let mut rng = self.rng.borrow_mut();
            let mut pet = self.state.borrow_mut();
            let report = pet.apply_decay(&self.config.decay, &mut *rng);
            if self.phase.get() == Phase::Idle {
                pet.return_to_idle();
            }
            tracing::debug!(
                age = pet.age(),
                health = pet.health(),
                weight = pet.weight(),
                poop = pet.poop_level(),
                branch = ?report.branch,
                "Decay tick"
            );
            report
        };
        if report.died {
            tracing::info!("Pet died during decay");
        }

        self.persist();
        self.publish();
        Ok(report)
    }

    fn check_poop_event(&self) {
        if self.poop_pending.get() {
            return;
        }
        let triggered = self
            .state
            .borrow_mut()
            .should_trigger_poop_event(&self.config.decay);
        if !triggered {
            return;
        }

        tracing::info!("Poop event");
        if self.state.borrow().is_alive() {
            self.poop_pending.set(true);
            let _ = self.make_poop();
        } else {
            // The penalty was fatal; no animation, just leave the poop behind
            self.state.borrow_mut().poop_level = 0;
            self.persist();
            self.publish();
        }
    }

    /// Play the poop animation and empty the gauge
    ///
    /// Retries after the configured delay instead of failing when an update
    /// or another animation is in the way.
    pub(crate) fn make_poop(&self) -> Result<(), Rejection> {
        if !self.state.borrow().is_alive() {
            self.poop_pending.set(false);
            return Err(Rejection::Dead);
        }
        let blocked = if self.updating.is_held() {
            Some(Rejection::Updating)
        } else if self.is_animating() {
            Some(Rejection::Animating)
        } else {
            None
        };
        if let Some(reason) = blocked {
            self.schedule_poop_retry();
            return Err(reason);
        }

        self.poop_pending.set(false);
        self.perform(self.config.timing.pooping, |pet| {
            pet.poop_level = 0;
            pet.action = Action::Pooping;
            pet.secondary = Some(Action::Poop);
        });
        Ok(())
    }

    fn schedule_poop_retry(&self) {
        if self.poop_retry.get().is_some() {
            return;
        }
        let delay = self.config.timing.poop_retry.max(Duration::from_millis(1));
        let id = self
            .timers
            .borrow_mut()
            .schedule(self.clock.now() + delay, TimerKind::PoopRetry);
        self.poop_retry.set(Some(id));
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Poop event blocked, retrying");
    }

    // =========================================================================
    // Player Actions
    // =========================================================================

    fn check_ready(&self) -> Result<(), Rejection> {
        if self.is_animating() {
            return Err(Rejection::Animating);
        }
        if self.updating.is_held() {
            return Err(Rejection::Updating);
        }
        if !self.state.borrow().is_alive() {
            return Err(Rejection::Dead);
        }
        Ok(())
    }

    fn roll_care(&self) -> i32 {
        let care = &self.config.care;
        self.rng.borrow_mut().gen_range(care.delta_min..=care.delta_max)
    }

    fn coin_flip<T>(&self, heads: T, tails: T) -> T {
        if self.rng.borrow_mut().gen_bool(0.5) {
            heads
        } else {
            tails
        }
    }

    /// Feed: weight, health and poop up by the same roll; plays "eat"
    pub fn feed(&self) -> Result<(), Rejection> {
        self.check_ready()?;
        let delta = self.roll_care();
        let food = self.coin_flip(Action::Oniguri, Action::Dessert);

        self.perform(self.config.timing.feed, |pet| {
            pet.set_weight(pet.weight + delta);
            pet.set_health(pet.health + delta);
            pet.set_poop_level(pet.poop_level + delta);
            pet.action = Action::Eat;
            pet.secondary = Some(food);
        });
        tracing::debug!(delta, %food, "Fed");
        Ok(())
    }

    /// Dance: health up, poop down
    pub fn dance(&self) -> Result<(), Rejection> {
        self.check_ready()?;
        let delta = self.roll_care();
        let moves = self.coin_flip(Action::Dance, Action::DanceReverse);

        self.perform(self.config.timing.dance, |pet| {
            pet.set_health(pet.health + delta);
            pet.set_poop_level(pet.poop_level - delta);
            pet.action = moves;
        });
        tracing::debug!(delta, %moves, "Danced");
        Ok(())
    }

    /// Sleep: weight down, health and poop up, in front of a night scene
    pub fn sleep(&self) -> Result<(), Rejection> {
        self.check_ready()?;
        let delta = self.roll_care();

        self.perform(self.config.timing.sleep, |pet| {
            pet.set_weight(pet.weight - delta);
            pet.set_health(pet.health + delta);
            pet.set_poop_level(pet.poop_level + delta);
            pet.scene_override = Some(pet.background.night_variant());
            pet.action = Action::Sleep;
        });
        tracing::debug!(delta, "Slept");
        Ok(())
    }

    /// Advance the chosen background and roll one of [`RANDOM_OUTCOMES`]
    pub fn random_event(&self) -> Result<RandomOutcome, Rejection> {
        self.check_ready()?;
        let outcome = {
            let idx = self.rng.borrow_mut().gen_range(0..RANDOM_OUTCOMES.len());
            RANDOM_OUTCOMES[idx]
        };
        let duration = if outcome.action == Action::Frustrated {
            self.config.timing.frustrated
        } else {
            self.config.timing.random_event
        };

        self.perform(duration, |pet| {
            pet.background = pet.background.next();
            pet.scene_override = None;
            pet.set_health(pet.health + outcome.health_delta);
            pet.action = outcome.action;
        });
        tracing::debug!(action = %outcome.action, delta = outcome.health_delta, "Random event");
        Ok(outcome)
    }

    /// Clean up visible poop; `false` if there was nothing to clean
    pub fn clean_poop(&self) -> bool {
        let cleaned = self.state.borrow_mut().clean_poop();
        if !cleaned {
            return false;
        }
        if let Some(id) = self.poop_retry.take() {
            self.timers.borrow_mut().cancel(id);
        }
        self.poop_pending.set(false);
        tracing::info!("Poop cleaned");
        self.persist();
        self.publish();
        true
    }

    /// Rename the pet (surrounding whitespace is trimmed)
    pub fn set_name(&self, name: &str) -> Result<(), Rejection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Rejection::EmptyName);
        }
        self.state.borrow_mut().name = name.to_string();
        self.persist();
        self.publish();
        Ok(())
    }

    /// Apply an action's stat changes and enter `Animating`
    ///
    /// If the changes kill the pet, the death is shown instead and no
    /// animation is scheduled.
    fn perform(&self, duration: Duration, apply: impl FnOnce(&mut PetState)) {
        let died = {
            let mut pet = self.state.borrow_mut();
            apply(&mut *pet);
            pet.settle()
        };

        if died {
            tracing::info!("Pet died during an action");
        } else {
            self.phase.set(Phase::Animating);
            self.timers
                .borrow_mut()
                .schedule(self.clock.now() + duration, TimerKind::ReturnToIdle);
        }
        self.persist();
        self.publish();
    }

    fn finish_animation(&self) {
        if !self.is_animating() {
            return;
        }
        self.state.borrow_mut().return_to_idle();
        self.phase.set(Phase::Idle);
        self.persist();
        self.publish();

        if self.decay_pending.replace(false) && self.is_running() {
            tracing::debug!("Running decay deferred by the animation");
            self.run_decay_cycle();
        }
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write the current pet to the store
    pub fn save_game(&self) -> bool {
        self.persist()
    }

    /// Replace the live pet with whatever the store holds
    ///
    /// Any animation in flight is abandoned.
    pub fn load_game(&self) {
        self.cancel_activity();
        let record = self.store.load();
        *self.state.borrow_mut() = PetState::from_record(&record);
        tracing::info!(name = %record.name, "Game loaded");
        self.publish();
    }

    /// Overwrite the stored record and the live pet with the defaults
    pub fn reset_game(&self) {
        self.cancel_activity();
        self.store.reset();
        *self.state.borrow_mut() = PetState::default();
        if self.is_running() {
            self.start();
        }
        tracing::info!("Game reset");
        self.publish();
    }

    fn cancel_activity(&self) {
        self.timers.borrow_mut().clear();
        self.poop_retry.set(None);
        self.poop_pending.set(false);
        self.decay_pending.set(false);
        self.phase.set(Phase::Idle);
    }

    fn persist(&self) -> bool {
        let stamp = Utc::now();
        let mut record = self.state.borrow().to_record();
        record.last_saved = Some(stamp);
        let saved = self.store.save(&record);
        if saved {
            self.state.borrow_mut().last_saved = Some(stamp);
        }
        saved
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.hub.publish(&snapshot);
    }
}

impl std::fmt::Debug for PetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PetController")
            .field("state", &self.state)
            .field("phase", &self.phase.get())
            .field("updating", &self.updating.is_held())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
