//! Core Kernel - Foundational types shared by the claims service crates
//!
//! This crate provides the building blocks used across the workspace:
//! - Strongly-typed identifiers
//! - The port error type returned by persistence adapters
//! - The label-based metrics capability injected into request handlers

pub mod identifiers;
pub mod ports;
pub mod metrics;
pub mod error;

pub use identifiers::ClaimId;
pub use ports::{DomainPort, PortError};
pub use metrics::{MetricLabels, MetricsRecorder};
pub use error::CoreError;

#[cfg(any(test, feature = "mock"))]
pub use metrics::mock::InMemoryRecorder;
