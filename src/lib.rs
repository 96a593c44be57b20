//! Incident Router Library
//!
//! This library provides the event orchestration core of the city incident
//! pipeline: the envelope protocol, the workflow stage resolver, the
//! connection registry and router, and the report generation adapters.

pub mod agents;
pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
