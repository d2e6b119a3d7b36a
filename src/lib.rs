//! Note-timing and scoring engine for a virtual drum kit.
//!
//! A [`play::GameSession`] takes a [`model::BeatMap`], accepts drum triggers
//! from the host and, once per frame, reports which notes are visible, which
//! inputs hit and which notes were missed.

pub mod config;
pub mod input;
pub mod model;
pub mod play;
pub mod traits;
pub mod util;
