//! Presence detection controller library.
//!
//! Fuses two PIR zones, an IR thermometer and an ultrasonic range finder
//! into a weighted detection score and drives a five-state controller
//! (standby, calibrating, monitoring, alert, error) from a cooperative
//! tick.  All hardware sits behind the port traits in [`app::ports`]; the
//! host binary wires in the simulated adapters from [`adapters`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod calibration;
pub mod config;
pub mod console;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod fusion;
pub mod sensors;
pub mod stats;
