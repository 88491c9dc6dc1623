//! JSON-RPC gateway protocol
//!
//! Envelope validation, call URI parsing and the request pipeline that ties
//! rate limiting, caching and dispatch together.

pub mod rpc;
pub mod server;
pub mod uri;
