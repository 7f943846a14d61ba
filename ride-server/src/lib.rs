//! Ride booking server.
//!
//! Users request a ride with optional stops and a return leg, get a
//! distance-based fare, pay through a payment processor, and then see
//! their confirmation and live journey pages.

pub mod booking;
pub mod config;
pub mod domain;
pub mod fare;
pub mod maps;
pub mod payment;
pub mod session;
pub mod store;
pub mod web;
