//! Sekitoritchi Core - Headless Virtual Pet Simulation
//!
//! This crate holds everything about the pet that is not drawing it: the
//! stats and how they decay, the player actions and their animations, the
//! timers that sequence them, persistence, and the observer hub that tells a
//! view when to redraw. It can drive the terminal UI, run headless, or be
//! stepped by hand in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         View Surface                          │
//! │        (terminal UI, headless runner, test harness)           │
//! │   implements Renderer, subscribes observers, sends actions    │
//! └───────────────┬──────────────────────────────▲───────────────┘
//!                 │ feed / dance / sleep / ...   │ PetSnapshot
//!                 │ poll_timers()                │
//! ┌───────────────▼──────────────────────────────┴───────────────┐
//! │                        PetController                          │
//! │  ┌───────────┐  ┌──────────────┐  ┌───────────┐  ┌─────────┐  │
//! │  │ PetState  │  │ TimerQueue + │  │ Observer  │  │ Persist │  │
//! │  │ (decay,   │  │ Cadence      │  │ Hub       │  │ Store   │  │
//! │  │  mood)    │  │ (scheduler)  │  │           │  │ (JSON)  │  │
//! │  └───────────┘  └──────────────┘  └───────────┘  └─────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`PetController`]: owner of the live pet; every mutation goes through it
//! - [`PetState`]: stats plus the decay and poop rules
//! - [`PetSnapshot`]: what observers and renderers see
//! - [`ObserverHub`]: synchronous publish/subscribe with a terminal
//!   "surface gone" state
//! - [`PersistenceStore`]: load/save/reset, with [`JsonFileStore`] on disk
//! - [`PetConfig`]: every tunable, loaded from CLI, env, TOML and defaults
//!
//! # Quick Start
//!
//! ```ignore
//! use sekitoritchi_core::{load_config, runtime, JsonFileStore, PetController};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let store = JsonFileStore::new(config.resolved_save_path());
//!     let pet = PetController::new(config, store);
//!
//!     pet.subscribe(std::rc::Rc::new(|snap: &sekitoritchi_core::PetSnapshot| {
//!         println!("{} is {}", snap.name, snap.mood.label());
//!         Ok(())
//!     }));
//!
//!     runtime::drive(&pet, async { let _ = tokio::signal::ctrl_c().await; }).await;
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`action`]: the fixed action and background tables
//! - [`mood`]: mood codes derived from health
//! - [`state`]: the pet record, live state, decay and snapshots
//! - [`controller`]: actions, phases, decay scheduling
//! - [`scheduler`]: clocks, one-shot timers, the drift-free cadence
//! - [`observer`]: the observer hub
//! - [`persistence`]: stores
//! - [`guard`]: scoped re-entrancy flag
//! - [`render`]: the renderer seam a view implements
//! - [`runtime`]: the async headless driver
//! - [`config`]: configuration loading
//!
//! # Single-threaded
//!
//! Nothing here is `Send`. The controller lives on one thread and is driven
//! cooperatively; re-entrancy, not concurrency, is what the guards protect
//! against.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod controller;
pub mod guard;
pub mod mood;
pub mod observer;
pub mod persistence;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod state;

// Re-exports for convenience
pub use action::{Action, ActionParseError, Background, BackgroundIndexError, SpriteRegion};
pub use controller::{Phase, PetController, RandomOutcome, Rejection, RANDOM_OUTCOMES};
pub use guard::{FlagGuard, ReentrancyFlag};
pub use mood::MoodCode;
pub use observer::{ObserverHandle, ObserverHub, PetObserver, SurfaceGone};
pub use persistence::{JsonFileStore, MemoryStore, PersistenceError, PersistenceStore};
pub use render::Renderer;
pub use scheduler::{Cadence, Clock, ManualClock, TimerId, TimerQueue, TokioClock};
pub use state::{
    clamp_health, DecayBranch, DecayReport, PetRecord, PetSnapshot, PetState, DEFAULT_NAME,
    MAX_POOP,
};

// Config exports
pub use config::{
    default_config_path, default_save_path, load_config, load_config_from_path,
    load_config_with_env, CareTuning, ConfigError, ConfigOverrides, ConfigSource, DecayTuning,
    PetConfig, PetToml, TimingConfig,
};
