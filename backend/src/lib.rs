//! Domain-invariant layer for a content publishing backend.
//!
//! The crate keeps three rules true regardless of transport: the category
//! hierarchy is a forest, comment replies stay attached to comments on the
//! same content item, and a user likes a content item at most once. The
//! services in [`domain`] implement the driving ports; [`outbound`] provides
//! PostgreSQL and in-memory adapters for the driven ports.

pub mod config;
pub mod domain;
pub mod outbound;
pub mod services;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
