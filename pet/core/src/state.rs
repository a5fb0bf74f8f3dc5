//! Pet State
//!
//! The data model: every stat, the flags, what is playing and where. All
//! writes funnel through methods that keep the invariants intact:
//!
//! - health stays within `0..=100`
//! - weight and poop never go negative, poop never exceeds 100
//! - once dead, always dead (mood `Dead`, action `dead`)
//! - mood always matches health and liveness
//!
//! Three shapes of the same data exist:
//!
//! ```text
//!   PetRecord  ──from_record──▶  PetState  ──snapshot──▶  PetSnapshot
//!   (save file)  ◀──to_record──  (mutable)                (read-only view)
//! ```

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::action::{Action, Background};
use crate::config::DecayTuning;
use crate::mood::MoodCode;

/// Default pet name
pub const DEFAULT_NAME: &str = "Sekitoritchi";

/// Upper bound of the poop gauge
pub const MAX_POOP: i32 = 100;

/// Clamp a health value into `0..=100`
#[must_use]
pub fn clamp_health(health: i32) -> i32 {
    health.clamp(0, 100)
}

fn clamp_poop(level: i32) -> i32 {
    level.clamp(0, MAX_POOP)
}

// =============================================================================
// Persisted Record
// =============================================================================

/// The persisted key/value document
///
/// Missing fields fall back to the defaults, so a partially written or older
/// save file still loads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetRecord {
    /// Pet name
    pub name: String,
    /// Age in decay ticks
    pub age: u32,
    /// Weight
    pub weight: i32,
    /// Mood code (see [`MoodCode::code`])
    pub mood: u8,
    /// Health
    pub health: i32,
    /// Poop gauge
    pub poop_level: i32,
    /// Liveness
    pub is_alive: bool,
    /// Whether uncleaned poop is on screen
    pub poop_visible: bool,
    /// Action name at save time
    pub action: String,
    /// Chosen background index
    pub background: usize,
    /// When this record was last written by the game
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_saved: Option<DateTime<Utc>>,
}

impl Default for PetRecord {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            age: 1,
            weight: 250,
            mood: MoodCode::Happy.code(),
            health: 100,
            poop_level: 0,
            is_alive: true,
            poop_visible: false,
            action: Action::Happy.as_str().to_string(),
            background: 0,
            last_saved: None,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Flattened read-only view of the pet for display
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetSnapshot {
    /// Pet name
    pub name: String,
    /// Age in decay ticks
    pub age: u32,
    /// Weight
    pub weight: i32,
    /// Health
    pub health: i32,
    /// Derived mood
    pub mood: MoodCode,
    /// Liveness
    pub is_alive: bool,
    /// Poop gauge
    pub poop_level: i32,
    /// Whether uncleaned poop is on screen
    pub poop_visible: bool,
    /// Primary animation
    pub action: Action,
    /// Secondary item animation
    pub secondary_action: Option<Action>,
    /// Background the player chose
    pub background: Background,
    /// Background currently on screen (differs while sleeping)
    pub scene: Background,
    /// Whether an action animation is in flight
    pub animating: bool,
    /// Last successful save
    pub last_saved: Option<DateTime<Utc>>,
}

impl PetSnapshot {
    /// Secondary sprite to draw: the playing item, else uncleaned poop
    #[must_use]
    pub fn overlay(&self) -> Option<Action> {
        self.secondary_action
            .or(self.poop_visible.then_some(Action::Poop))
    }
}

// =============================================================================
// Decay Report
// =============================================================================

/// Which decay branch a tick took
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecayBranch {
    /// Weight above the overweight threshold
    Overweight,
    /// Age above the elder threshold
    Elder,
    /// Neither
    Normal,
}

/// What a single decay tick did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecayReport {
    /// Rolled base decrease
    pub base: i32,
    /// Branch taken
    pub branch: DecayBranch,
    /// Whether the pet died on this tick
    pub died: bool,
}

// =============================================================================
// Pet State
// =============================================================================

/// The live pet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PetState {
    pub(crate) name: String,
    pub(crate) age: u32,
    pub(crate) weight: i32,
    pub(crate) health: i32,
    pub(crate) mood: MoodCode,
    pub(crate) alive: bool,
    pub(crate) poop_level: i32,
    pub(crate) poop_visible: bool,
    pub(crate) action: Action,
    pub(crate) secondary: Option<Action>,
    pub(crate) background: Background,
    pub(crate) scene_override: Option<Background>,
    pub(crate) last_saved: Option<DateTime<Utc>>,
}

impl Default for PetState {
    fn default() -> Self {
        Self::from_record(&PetRecord::default())
    }
}

impl PetState {
    /// Hydrate from a persisted record, normalising it into the invariants
    #[must_use]
    pub fn from_record(record: &PetRecord) -> Self {
        let name = if record.name.trim().is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            record.name.clone()
        };

        let background = Background::from_index(record.background).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Saved background invalid, using default");
            Background::default()
        });

        if let Err(e) = record.action.parse::<Action>() {
            tracing::warn!(error = %e, "Saved action invalid, deriving from mood");
        }

        let health = clamp_health(record.health);
        let weight = record.weight.max(0);
        let alive = record.is_alive && health > 0 && weight > 0;

        let mut state = Self {
            name,
            age: record.age,
            weight,
            health,
            mood: MoodCode::Happy,
            alive,
            poop_level: clamp_poop(record.poop_level),
            poop_visible: record.poop_visible,
            action: Action::Happy,
            secondary: None,
            background,
            scene_override: None,
            last_saved: record.last_saved,
        };
        if state.poop_visible {
            state.poop_level = 0;
        }
        state.settle();
        state.action = state.mood.idle_action();
        state
    }

    /// Build the persisted record for this state
    #[must_use]
    pub fn to_record(&self) -> PetRecord {
        PetRecord {
            name: self.name.clone(),
            age: self.age,
            weight: self.weight,
            mood: self.mood.code(),
            health: self.health,
            poop_level: self.poop_level,
            is_alive: self.alive,
            poop_visible: self.poop_visible,
            action: self.action.as_str().to_string(),
            background: self.background.index(),
            last_saved: self.last_saved,
        }
    }

    /// Flattened view for display
    #[must_use]
    pub fn snapshot(&self, animating: bool) -> PetSnapshot {
        PetSnapshot {
            name: self.name.clone(),
            age: self.age,
            weight: self.weight,
            health: self.health,
            mood: self.mood,
            is_alive: self.alive,
            poop_level: self.poop_level,
            poop_visible: self.poop_visible,
            action: self.action,
            secondary_action: self.secondary,
            background: self.background,
            scene: self.scene(),
            animating,
            last_saved: self.last_saved,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Pet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Age in ticks
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Weight
    pub fn weight(&self) -> i32 {
        self.weight
    }

    /// Health
    pub fn health(&self) -> i32 {
        self.health
    }

    /// Derived mood
    pub fn mood(&self) -> MoodCode {
        self.mood
    }

    /// Liveness
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Poop gauge
    pub fn poop_level(&self) -> i32 {
        self.poop_level
    }

    /// Whether uncleaned poop is on screen
    pub fn poop_visible(&self) -> bool {
        self.poop_visible
    }

    /// Primary animation
    pub fn action(&self) -> Action {
        self.action
    }

    /// Background currently on screen
    pub fn scene(&self) -> Background {
        self.scene_override.unwrap_or(self.background)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Write health through the clamp
    pub fn set_health(&mut self, health: i32) {
        self.health = clamp_health(health);
    }

    /// Write weight, floored at zero
    pub fn set_weight(&mut self, weight: i32) {
        self.weight = weight.max(0);
    }

    /// Write the poop gauge, clamped to `0..=100`
    ///
    /// The gauge stays at zero while poop is visible; it only starts filling
    /// again once the poop has been cleaned.
    pub fn set_poop_level(&mut self, level: i32) {
        self.poop_level = if self.poop_visible {
            0
        } else {
            clamp_poop(level)
        };
    }

    /// Re-derive liveness and mood after stats changed
    ///
    /// Returns `true` only on the call that kills the pet.
    pub fn settle(&mut self) -> bool {
        let died = self.alive && (self.health <= 0 || self.weight <= 0);
        if died {
            self.alive = false;
        }
        self.mood = MoodCode::derive(self.health, self.alive);
        if !self.alive {
            self.action = Action::Dead;
            self.secondary = None;
            self.scene_override = None;
        }
        died
    }

    /// Show the mood's idle animation in front of the chosen background
    pub fn return_to_idle(&mut self) {
        self.secondary = None;
        self.scene_override = None;
        self.settle();
        self.action = self.mood.idle_action();
    }

    /// One periodic application of time-based decay
    ///
    /// Callers are responsible for the re-entrancy guard, for skipping dead
    /// pets and for refreshing the idle action; this does the arithmetic and
    /// re-derives mood and liveness.
    pub fn apply_decay<R: Rng>(&mut self, tuning: &DecayTuning, rng: &mut R) -> DecayReport {
        self.age = self.age.saturating_add(1);
        self.set_poop_level(self.poop_level + tuning.poop_increment);

        let base = rng.gen_range(tuning.base_decrease_min..=tuning.base_decrease_max);

        let (branch, health_loss, weight_loss) = if self.weight > tuning.overweight_threshold {
            (DecayBranch::Overweight, base, base / 2)
        } else if self.age > tuning.elder_age {
            (DecayBranch::Elder, base, base / 3)
        } else {
            (DecayBranch::Normal, base / 2, base / 4)
        };
        self.set_health(self.health - health_loss);
        self.set_weight(self.weight - weight_loss);

        if self.poop_visible {
            self.set_health(self.health - tuning.poop_penalty);
        }

        let died = self.settle();
        DecayReport { base, branch, died }
    }

    /// Check the poop gauge and, when it is full enough, make the poop visible
    ///
    /// Returns `true` iff the level is at or above the threshold. A `true`
    /// result also applies the health penalty. The level itself is left for
    /// the poop animation to reset.
    pub fn should_trigger_poop_event(&mut self, tuning: &DecayTuning) -> bool {
        if self.poop_level < tuning.poop_threshold {
            return false;
        }
        self.poop_visible = true;
        self.set_health(self.health - tuning.poop_penalty);
        self.settle();
        true
    }

    /// Remove visible poop; `false` if there was none
    pub fn clean_poop(&mut self) -> bool {
        if !self.poop_visible {
            return false;
        }
        self.poop_visible = false;
        self.poop_level = 0;
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn tuning() -> DecayTuning {
        DecayTuning::default()
    }

    #[test]
    fn test_default_record_values() {
        let record = PetRecord::default();
        assert_eq!(record.name, "Sekitoritchi");
        assert_eq!(record.age, 1);
        assert_eq!(record.weight, 250);
        assert_eq!(record.mood, 0);
        assert_eq!(record.health, 100);
        assert_eq!(record.poop_level, 0);
        assert!(record.is_alive);
        assert!(!record.poop_visible);
        assert_eq!(record.action, "happy");
        assert_eq!(record.background, 0);
    }

    #[test]
    fn test_default_state_round_trips_to_default_record() {
        assert_eq!(PetState::default().to_record(), PetRecord::default());
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let json = serde_json::to_value(PetRecord::default()).unwrap();
        assert!(json.get("poopLevel").is_some());
        assert!(json.get("isAlive").is_some());
        assert!(json.get("poopVisible").is_some());
        assert!(json.get("lastSaved").is_none());
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let record: PetRecord = serde_json::from_str(r#"{"name":"Taro","health":40}"#).unwrap();
        assert_eq!(record.name, "Taro");
        assert_eq!(record.health, 40);
        assert_eq!(record.weight, 250);
    }

    #[test]
    fn test_from_record_normalises() {
        let record = PetRecord {
            name: "   ".to_string(),
            health: 180,
            weight: -4,
            poop_level: 400,
            poop_visible: true,
            action: "moonwalk".to_string(),
            background: 99,
            ..PetRecord::default()
        };
        let state = PetState::from_record(&record);
        assert_eq!(state.name(), DEFAULT_NAME);
        assert_eq!(state.health(), 100);
        assert_eq!(state.weight(), 0);
        assert_eq!(state.poop_level(), 0);
        assert!(!state.is_alive());
        assert_eq!(state.action(), Action::Dead);
        assert_eq!(state.mood(), MoodCode::Dead);
        assert_eq!(state.background, Background::Morning);
    }

    #[test]
    fn test_from_record_rederives_idle_action() {
        let record = PetRecord {
            health: 30,
            action: "dance".to_string(),
            ..PetRecord::default()
        };
        let state = PetState::from_record(&record);
        assert_eq!(state.mood(), MoodCode::Angry);
        assert_eq!(state.action(), Action::Angry);
    }

    #[test]
    fn test_decay_increments_age_and_poop() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = PetState::default();
        state.apply_decay(&tuning(), &mut rng);
        assert_eq!(state.age(), 2);
        assert_eq!(state.poop_level(), 5);
    }

    #[test]
    fn test_decay_poop_caps_at_max() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = PetState::default();
        state.set_poop_level(98);
        state.apply_decay(&tuning(), &mut rng);
        assert_eq!(state.poop_level(), MAX_POOP);
    }

    #[test]
    fn test_decay_branches() {
        let mut rng = StdRng::seed_from_u64(3);

        let mut heavy = PetState::default();
        heavy.set_weight(400);
        let report = heavy.apply_decay(&tuning(), &mut rng);
        assert_eq!(report.branch, DecayBranch::Overweight);
        assert_eq!(heavy.health(), 100 - report.base);
        assert_eq!(heavy.weight(), 400 - report.base / 2);

        let mut elder = PetState::default();
        elder.age = 500;
        let report = elder.apply_decay(&tuning(), &mut rng);
        assert_eq!(report.branch, DecayBranch::Elder);
        assert_eq!(elder.health(), 100 - report.base);
        assert_eq!(elder.weight(), 250 - report.base / 3);

        let mut normal = PetState::default();
        let report = normal.apply_decay(&tuning(), &mut rng);
        assert_eq!(report.branch, DecayBranch::Normal);
        assert_eq!(normal.health(), 100 - report.base / 2);
        assert_eq!(normal.weight(), 250 - report.base / 4);
    }

    #[test]
    fn test_visible_poop_penalty_during_decay() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = PetState::default();
        state.poop_visible = true;
        let report = state.apply_decay(&tuning(), &mut rng);
        assert_eq!(state.health(), 100 - report.base / 2 - 3);
    }

    #[test]
    fn test_gauge_frozen_while_poop_visible() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut state = PetState::default();
        state.poop_visible = true;
        state.apply_decay(&tuning(), &mut rng);
        assert_eq!(state.poop_level(), 0);

        state.set_poop_level(30);
        assert_eq!(state.poop_level(), 0);

        assert!(state.clean_poop());
        state.set_poop_level(30);
        assert_eq!(state.poop_level(), 30);
    }

    #[test]
    fn test_decay_kills_at_zero_health() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut state = PetState::default();
        state.set_health(1);
        state.set_weight(400);
        let report = state.apply_decay(&tuning(), &mut rng);
        assert!(report.died);
        assert!(!state.is_alive());
        assert_eq!(state.action(), Action::Dead);
        assert_eq!(state.mood(), MoodCode::Dead);
    }

    #[test]
    fn test_death_is_terminal() {
        let mut state = PetState::default();
        state.set_health(0);
        assert!(state.settle());
        state.set_health(100);
        assert!(!state.settle());
        assert!(!state.is_alive());
        state.return_to_idle();
        assert_eq!(state.action(), Action::Dead);
    }

    #[test]
    fn test_poop_trigger_does_not_reset_level() {
        let mut state = PetState::default();
        state.set_poop_level(74);
        assert!(!state.should_trigger_poop_event(&tuning()));
        assert!(!state.poop_visible());
        assert_eq!(state.health(), 100);

        state.set_poop_level(75);
        assert!(state.should_trigger_poop_event(&tuning()));
        assert!(state.poop_visible());
        assert_eq!(state.poop_level(), 75);
        assert_eq!(state.health(), 97);
    }

    #[test]
    fn test_clean_poop() {
        let mut state = PetState::default();
        state.set_poop_level(40);
        assert!(!state.clean_poop());
        assert_eq!(state.poop_level(), 40);

        state.poop_visible = true;
        assert!(state.clean_poop());
        assert!(!state.poop_visible());
        assert_eq!(state.poop_level(), 0);
    }

    #[test]
    fn test_snapshot_overlay_shows_uncleaned_poop() {
        let mut state = PetState::default();
        assert_eq!(state.snapshot(false).overlay(), None);

        state.poop_visible = true;
        assert_eq!(state.snapshot(false).overlay(), Some(Action::Poop));

        state.secondary = Some(Action::Dessert);
        assert_eq!(state.snapshot(true).overlay(), Some(Action::Dessert));
    }

    #[test]
    fn test_scene_override() {
        let mut state = PetState::default();
        state.background = Background::Outside;
        state.scene_override = Some(Background::NightOutside);
        let snap = state.snapshot(true);
        assert_eq!(snap.background, Background::Outside);
        assert_eq!(snap.scene, Background::NightOutside);
        state.return_to_idle();
        assert_eq!(state.scene(), Background::Outside);
    }

    proptest! {
        #[test]
        fn prop_clamp_health_in_range(h in any::<i32>()) {
            let c = clamp_health(h);
            prop_assert!((0..=100).contains(&c));
        }

        #[test]
        fn prop_clamp_health_monotonic(a in any::<i32>(), b in any::<i32>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(clamp_health(lo) <= clamp_health(hi));
        }

        #[test]
        fn prop_decay_age_and_poop(seed in any::<u64>(), poop in 0i32..=100, health in 1i32..=100, weight in 1i32..=600) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = PetState::default();
            state.set_poop_level(poop);
            state.set_health(health);
            state.set_weight(weight);
            let age = state.age();
            state.apply_decay(&tuning(), &mut rng);
            prop_assert_eq!(state.age(), age + 1);
            prop_assert!(state.poop_level() >= poop);
            prop_assert!(state.poop_level() <= MAX_POOP);
            prop_assert!((0..=100).contains(&state.health()));
        }
    }
}
