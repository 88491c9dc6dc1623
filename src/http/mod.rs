//! HTTP transport layer for the gateway
//!
//! Provides the external API routing, including the `/mcp` listener and the
//! metadata endpoints.

pub mod client_ip;
pub mod handlers;
