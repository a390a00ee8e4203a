//! Skyisle library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive the dialogue, map and scene systems without a window or GPU.

pub mod shared;
pub mod input;
pub mod data;
pub mod world;
pub mod player;
pub mod npcs;
pub mod editor;
pub mod ui;
