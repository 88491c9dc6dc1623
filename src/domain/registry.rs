//! Route table mapping `(service, action)` to a handler
//!
//! Each handler declares its positional parameters. The registry extracts and
//! coerces the call arguments against that declaration before invoking the
//! handler, so handlers never see a missing required argument or an integer
//! that failed to parse. Extra trailing arguments are ignored.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;

use crate::{errors::GatewayError, mcp::uri::CallDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Text,
    Integer,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, default: Option<&'static str>) -> Self {
        Self {
            name,
            kind,
            required: false,
            default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Text(String),
    Integer(i64),
}

/// Arguments after positional extraction and coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolArgs {
    values: HashMap<&'static str, ArgValue>,
}

impl ToolArgs {
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn require_text(&self, name: &str) -> Result<&str, GatewayError> {
        self.text(name)
            .ok_or_else(|| GatewayError::invalid_argument(name, format!("'{name}' is required")))
    }

    pub fn require_integer(&self, name: &str) -> Result<i64, GatewayError> {
        self.integer(name)
            .ok_or_else(|| GatewayError::invalid_argument(name, format!("'{name}' is required")))
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn params(&self) -> &'static [ParamSpec];

    async fn call(&self, args: ToolArgs) -> Result<String, GatewayError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub service: String,
    pub action: String,
    pub params: &'static [ParamSpec],
}

#[derive(Default, Clone)]
pub struct HandlerRegistry {
    routes: HashMap<String, HashMap<String, Arc<dyn ToolHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any previous one for the same route.
    pub fn register(
        &mut self,
        service: impl Into<String>,
        action: impl Into<String>,
        handler: Arc<dyn ToolHandler>,
    ) -> &mut Self {
        self.routes
            .entry(service.into())
            .or_default()
            .insert(action.into(), handler);
        self
    }

    pub fn resolve(&self, service: &str, action: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.routes.get(service).and_then(|actions| actions.get(action))
    }

    pub async fn dispatch(&self, call: &CallDescriptor) -> Result<String, GatewayError> {
        let handler =
            self.resolve(&call.service, &call.action)
                .ok_or_else(|| GatewayError::UnknownRoute {
                    service: call.service.clone(),
                    action: call.action.clone(),
                })?;

        let args = bind_args(handler.params(), &call.args)?;
        handler.call(args).await
    }

    /// Registered routes sorted by service then action.
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut routes: Vec<RouteInfo> = self
            .routes
            .iter()
            .flat_map(|(service, actions)| {
                actions.iter().map(move |(action, handler)| RouteInfo {
                    service: service.clone(),
                    action: action.clone(),
                    params: handler.params(),
                })
            })
            .collect();
        routes.sort_by(|left, right| {
            (left.service.as_str(), left.action.as_str())
                .cmp(&(right.service.as_str(), right.action.as_str()))
        });
        routes
    }
}

/// Matches positional `raw` arguments against `params`.
///
/// An empty segment in an optional position counts as absent, which lets
/// callers skip an optional argument and still pass the ones after it.
pub fn bind_args(params: &[ParamSpec], raw: &[String]) -> Result<ToolArgs, GatewayError> {
    let mut values = HashMap::with_capacity(params.len());

    for (index, param) in params.iter().enumerate() {
        let supplied = raw
            .get(index)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty());

        let Some(value) = supplied.or(param.default) else {
            if param.required {
                return Err(GatewayError::invalid_argument(
                    param.name,
                    format!("missing required argument '{}'", param.name),
                ));
            }
            continue;
        };

        let coerced = match param.kind {
            ParamKind::Text => ArgValue::Text(value.to_string()),
            ParamKind::Integer => ArgValue::Integer(value.parse::<i64>().map_err(|_| {
                GatewayError::invalid_argument(
                    param.name,
                    format!("'{}' must be an integer, got '{value}'", param.name),
                )
            })?),
        };
        values.insert(param.name, coerced);
    }

    Ok(ToolArgs { values })
}
