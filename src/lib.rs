//! Catapult: a slingshot-and-ragdoll physics toy.
//!
//! A pivoted launcher is dragged back and released to fling a projectile over
//! an obstacle.  Shortly after release the projectile turns into an
//! articulated ragdoll; landing a segment in the goal sensor wins the throw,
//! hitting the obstacle fails it after a short grace delay.

pub mod config;
pub mod constants;
pub mod error;
pub mod graphics;
pub mod launcher;
pub mod outcome;
pub mod ragdoll;
pub mod rendering;
pub mod scene;
pub mod session;
pub mod simulation;
pub mod trajectory;
