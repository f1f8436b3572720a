//! Stopwatch widget with lap splits and a persistent session history.
//!
//! State lives in [`app::StopwatchApp`], which is headless: timing, laps and
//! history are driven through the [`clock::Clock`], [`pump::Pump`],
//! [`storage::KeyValueStore`] and [`ui::View`] seams. The browser build wires
//! those to `performance.now()`, `setInterval`, `localStorage` and the DOM.

pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod pump;
pub mod session;
pub mod stopwatch;
pub mod storage;
pub mod ui;

#[cfg(target_arch = "wasm32")]
mod browser;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod web;

pub use app::StopwatchApp;
pub use config::StopwatchConfig;
pub use error::StoreError;
pub use timer_core::format_clock;
