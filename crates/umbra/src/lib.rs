//! The gnomon shadow geometry engine.
//!
//! Turns compass heading, geoposition, wall-clock time and surface size into
//! renderable 2D primitives: a north indicator, a sun indicator and a fan of
//! shadow ellipses. The engine emits geometry only; drawing, sensor wiring
//! and persistence live in the `gnomon` application crate.

pub mod engine;
pub mod geometry;
pub mod sample;
pub mod scene;
pub mod solar;
