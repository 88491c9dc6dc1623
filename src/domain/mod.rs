//! Route table and lookup handlers
//!
//! Provides the weather, forecast, headlines and web search tools and the
//! registry that dispatches call URIs to them.

pub mod registry;
pub mod tools;
pub mod utils;
