//! JSON-RPC envelope carried by `POST /mcp`

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::GatewayError;

pub const JSONRPC_VERSION: &str = "2.0";
pub const CALL_TOOL_METHOD: &str = "call_tool";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TextContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<TextContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Option<i64>,
    pub result: CallToolResult,
}

impl RpcResponse {
    pub fn text(id: Option<i64>, text: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: CallToolResult {
                content: vec![TextContent::text(text)],
            },
        }
    }
}

pub fn decode_request(body: &[u8]) -> Result<RpcRequest, GatewayError> {
    serde_json::from_slice(body)
        .map_err(|err| GatewayError::InvalidEnvelope(format!("malformed request body: {err}")))
}

/// Checks the envelope and returns the call URI it carries.
pub fn validate_envelope(request: &RpcRequest) -> Result<&str, GatewayError> {
    if request.jsonrpc != JSONRPC_VERSION {
        return Err(GatewayError::InvalidEnvelope(format!(
            "jsonrpc must be \"{JSONRPC_VERSION}\""
        )));
    }

    if !request.method.eq_ignore_ascii_case(CALL_TOOL_METHOD) {
        return Err(GatewayError::InvalidEnvelope(format!(
            "unsupported method '{}'",
            request.method
        )));
    }

    request
        .params
        .get("uri")
        .and_then(Value::as_str)
        .filter(|uri| !uri.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidEnvelope("missing 'uri' in params".to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(value: Value) -> RpcRequest {
        serde_json::from_value(value).expect("request shape")
    }

    #[test]
    fn accepts_call_tool_case_insensitively() {
        let rpc = request(json!({
            "jsonrpc": "2.0",
            "method": "CALL_TOOL",
            "params": {"uri": "mcp://weather/current/Paris"},
            "id": 7
        }));
        assert_eq!(
            validate_envelope(&rpc).expect("valid envelope"),
            "mcp://weather/current/Paris"
        );
    }

    #[test]
    fn rejects_wrong_version_method_or_missing_uri() {
        for value in [
            json!({"jsonrpc": "1.0", "method": "call_tool", "params": {"uri": "mcp://a/b"}}),
            json!({"jsonrpc": "2.0", "method": "tools/call", "params": {"uri": "mcp://a/b"}}),
            json!({"jsonrpc": "2.0", "method": "call_tool", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "call_tool", "params": {"uri": "  "}}),
            json!({"jsonrpc": "2.0", "method": "call_tool", "params": {"uri": 5}}),
        ] {
            let err = validate_envelope(&request(value)).expect_err("invalid envelope");
            assert!(matches!(err, GatewayError::InvalidEnvelope(_)));
        }
    }

    #[test]
    fn malformed_body_is_invalid_envelope() {
        let bodies: [&[u8]; 3] = [
            b"not json",
            br#"{"jsonrpc":"2.0"}"#,
            br#"{"jsonrpc":"2.0","method":"call_tool","id":"abc"}"#,
        ];
        for body in bodies {
            let err = decode_request(body).expect_err("decode must fail");
            assert!(matches!(err, GatewayError::InvalidEnvelope(_)));
        }
    }

    #[test]
    fn response_serializes_wire_shape() {
        let value = serde_json::to_value(RpcResponse::text(None, "ok")).expect("serialize");
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "result": {"content": [{"type": "text", "text": "ok"}]}
            })
        );
    }
}
