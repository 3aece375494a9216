//! FleetFlow Billing - Seat-Based Subscription Billing Core
//!
//! This crate implements organization subscription management for the
//! FleetFlow platform: the plan catalog, seat-based pricing, the seat
//! ledger, and the subscription lifecycle against the Square payment
//! provider.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
