//! Sekitoritchi TUI - Terminal interface for the pet
//!
//! This crate draws the wrestler from `sekitoritchi-core` in a full-screen
//! terminal UI. The core owns every rule; this crate only listens and paints.
//!
//! # Architecture
//!
//! - **Compositor**: Layered rendering with z-ordering (status, scene, toasts)
//! - **Avatar**: Sprite sheet, scene painter and frame animation
//! - **Display**: Observer-fed state the UI renders from
//! - **App**: Event loop tying keys, pet timers and frames together

pub mod app;
pub mod avatar;
pub mod cli;
pub mod compositor;
pub mod display;
pub mod renderer;
pub mod theme;

pub use app::App;
