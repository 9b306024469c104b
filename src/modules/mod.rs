//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for external services. The record store is the only
//! one: a path-addressed document store with live snapshot subscriptions.

pub mod store;
