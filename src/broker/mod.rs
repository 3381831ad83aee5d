//! RabbitMQ management API access
//!
//! Reads queue depths over HTTP with bounded retry on transient failures.

pub mod client;
pub mod endpoint;
pub mod retry;

pub use client::{BrokerClient, BrokerError, QueueDepthSource};
pub use endpoint::{BrokerEndpoint, Credentials, DEFAULT_MANAGEMENT_PORT};
pub use retry::RetryPolicy;
