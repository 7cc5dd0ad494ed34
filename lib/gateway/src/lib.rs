//! HTTP backend gateway for deal-desk.
//!
//! This crate provides the production implementation of
//! [`WorkflowBackend`](deal_desk_workflow::WorkflowBackend): authenticated
//! JSON requests against the investigation backend's `/workflow` routes.

pub mod client;
pub mod config;

pub use client::HttpBackend;
pub use config::GatewayConfig;
