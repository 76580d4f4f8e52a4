//! # SWARM Shared
//!
//! Small fixed-size math types used by the particle store and its consumers.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - `rayon`
//! - `swarm_core`
//! - Any linear-algebra library
//!
//! If you need matrices, they belong in a consumer crate.

#![deny(missing_docs)]

pub mod math;

pub use math::{Vec2, Vec3, Vector};
