//! Module for anything related to rendering.
//!
//! This module contains the clock renderer and the geometry it draws.

pub mod clock;

pub use clock::ClockRenderer;
