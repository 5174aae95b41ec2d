//! Verdant - Plant monitoring and auto-watering companion backend.
//!
//! This crate implements the billing subsystem (gateway checkout, verified
//! payment callbacks, subscription activation) and the rule-based watering
//! advisor behind the Verdant companion app.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
