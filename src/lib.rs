//! OCCI backends - provider adapter layer and fixture cache for an OCCI server
//!
//! The request layer hands parsed OCCI entities to [`api::BackendApi`], which
//! validates them and dispatches to the adapter set of the configured
//! provider (OpenNebula, Azure classic or Azure Resource Manager). Adapters
//! serve seed data from a fixture store kept in a shared key-value cache.

pub mod api;
pub mod backends;
pub mod cache;
pub mod config;
pub mod errors;
pub mod fixtures;
pub mod metrics;
pub mod occi;
