//! Drum input handling.
//!
//! This module provides:
//! - [`KeyBindings`]: key-to-drum mapping with save/load
//! - [`InputRouter`]: routes key presses and pad clicks to the sampler and session
//! - [`InputQueue`]: inputs buffered between frames

mod key_bindings;
mod queue;
mod router;

pub use key_bindings::KeyBindings;
pub use queue::{DrumTrigger, InputQueue};
pub use router::{InputRouter, RawKeyEvent};
