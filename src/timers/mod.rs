//! Nested wall-clock timers for solver phases.

#![allow(clippy::module_inception)]
mod timers;
pub use timers::*;
