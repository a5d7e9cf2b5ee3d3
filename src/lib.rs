//! Medboard - clinic administration dashboard core.
//!
//! The dashboard views themselves are thin and live in the frontends; the
//! one subsystem with real state is the multi-step staff-onboarding wizard,
//! which this crate implements: draft ownership, step validation, durable
//! draft persistence, location-derived navigation, and the submission
//! pipeline with typed server-error recovery.

pub mod config;
pub mod logging;
pub mod notifications;
pub mod wizard;
