//! Clients - HTTP Clients for External APIs
//!
//! This module contains the HTTP client for the fleet backend.

pub mod api_client;

pub use api_client::{segment, ApiClient};
