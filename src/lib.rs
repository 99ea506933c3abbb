//! Virtual MRT
//!
//! Estimates a room's mean radiant temperature from air temperature, outdoor
//! weather, optional irradiance and sun position, and derives the operative
//! temperature from it. Every room reacts to state changes in its own task.

pub mod api;
pub mod config;
pub mod controls;
pub mod domain;
pub mod estimator;
pub mod host;
pub mod rooms;
pub mod telemetry;
