//! Walksim character core library
//!
//! Headless first/third person character simulation: ground probing,
//! stamina-gated sprint and jump, variant hot-swap, procedural and
//! clip-based animation, and the camera rig, driven by a fixed-step loop.

pub mod config;
pub mod game;
