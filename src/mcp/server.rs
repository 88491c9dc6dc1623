//! The gateway pipeline behind `POST /mcp`
//!
//! envelope validation -> per-client rate limit -> URI parse -> cache lookup
//! -> dispatch -> cache store -> response envelope. Validation failures and
//! rate-limit rejections happen before any handler or upstream work.

use std::net::IpAddr;

use tracing::info;

use crate::{
    cache::ResultCache,
    domain::registry::HandlerRegistry,
    errors::GatewayError,
    mcp::{
        rpc::{validate_envelope, RpcRequest, RpcResponse},
        uri::parse_call_uri,
    },
    rate_limit::ClientRateLimiter,
};

pub struct Gateway {
    registry: HandlerRegistry,
    cache: ResultCache,
    limiter: ClientRateLimiter,
}

impl Gateway {
    pub fn new(registry: HandlerRegistry, cache: ResultCache, limiter: ClientRateLimiter) -> Self {
        Self {
            registry,
            cache,
            limiter,
        }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn limiter(&self) -> &ClientRateLimiter {
        &self.limiter
    }

    pub async fn handle_call(
        &self,
        client: IpAddr,
        request: RpcRequest,
    ) -> Result<RpcResponse, GatewayError> {
        let uri = validate_envelope(&request)?;
        self.limiter.check(client)?;
        let call = parse_call_uri(uri)?;

        if let Some(text) = self.cache.lookup(uri) {
            info!(
                client = %client,
                service = %call.service,
                action = %call.action,
                cache = "hit",
                outcome = "success",
                "mcp call audited"
            );
            return Ok(RpcResponse::text(request.id, text));
        }

        let outcome = self.registry.dispatch(&call).await;
        info!(
            client = %client,
            service = %call.service,
            action = %call.action,
            cache = "miss",
            outcome = if outcome.is_ok() { "success" } else { "failure" },
            "mcp call audited"
        );

        // Only complete results are cached; a dropped or failed call leaves
        // the cache untouched.
        let text = outcome?;
        self.cache.store(uri, text.clone());
        Ok(RpcResponse::text(request.id, text))
    }
}
