//! Parsing of `mcp://<service>/<action>/<arg>/...` call URIs

use url::Url;

use crate::errors::GatewayError;

pub const CALL_URI_SCHEME: &str = "mcp";

/// A parsed call URI. Argument count and content are not checked here; each
/// route validates its own arguments at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    pub service: String,
    pub action: String,
    pub args: Vec<String>,
}

/// Parses a call URI. `url` validates the scheme and authority; path
/// segments are taken verbatim from the raw text, without percent-decoding
/// or re-encoding.
pub fn parse_call_uri(raw: &str) -> Result<CallDescriptor, GatewayError> {
    let raw = raw.trim();
    let url = Url::parse(raw)
        .map_err(|err| GatewayError::InvalidUri(format!("malformed uri: {err}")))?;

    if !url.scheme().eq_ignore_ascii_case(CALL_URI_SCHEME) {
        return Err(GatewayError::InvalidUri(
            "uri must start with mcp://".to_string(),
        ));
    }

    let service = url
        .host_str()
        .filter(|service| !service.is_empty())
        .ok_or_else(|| GatewayError::InvalidUri("uri is missing a service".to_string()))?
        .to_string();

    let path = raw_path(raw).trim_matches('/');
    let mut segments: Vec<String> = if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').map(str::to_string).collect()
    };

    if segments.first().map_or(true, String::is_empty) {
        return Err(GatewayError::InvalidUri(
            "uri is missing an action".to_string(),
        ));
    }
    let action = segments.remove(0);

    Ok(CallDescriptor {
        service,
        action,
        args: segments,
    })
}

/// Path component of `scheme://authority/path?query#fragment` as written.
fn raw_path(raw: &str) -> &str {
    let after_scheme = raw.split_once("://").map_or("", |(_, rest)| rest);
    let hierarchical = after_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    hierarchical
        .find('/')
        .map_or("", |start| &hierarchical[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_action_and_args() {
        let call = parse_call_uri("mcp://weather/current/London/metric").expect("valid uri");
        assert_eq!(
            call,
            CallDescriptor {
                service: "weather".to_string(),
                action: "current".to_string(),
                args: vec!["London".to_string(), "metric".to_string()],
            }
        );
    }

    #[test]
    fn ignores_leading_and_trailing_slashes() {
        let call = parse_call_uri("mcp://news/headlines/technology/us/5/").expect("valid uri");
        assert_eq!(call.action, "headlines");
        assert_eq!(call.args, vec!["technology", "us", "5"]);
    }

    #[test]
    fn keeps_inner_empty_segments_in_position() {
        let call = parse_call_uri("mcp://news/headlines/technology//5").expect("valid uri");
        assert_eq!(call.args, vec!["technology", "", "5"]);
    }

    #[test]
    fn action_without_args_yields_empty_args() {
        let call = parse_call_uri("mcp://weather/current").expect("valid uri");
        assert_eq!(call.action, "current");
        assert!(call.args.is_empty());
    }

    #[test]
    fn scheme_comparison_is_case_insensitive() {
        let call = parse_call_uri("MCP://weather/current/Paris").expect("valid uri");
        assert_eq!(call.service, "weather");
    }

    #[test]
    fn segments_are_passed_through_verbatim() {
        let call = parse_call_uri("mcp://news/search/100%25/3").expect("valid uri");
        assert_eq!(call.args, vec!["100%25", "3"]);

        let call = parse_call_uri("mcp://news/search/rust async/3").expect("valid uri");
        assert_eq!(call.args, vec!["rust async", "3"]);

        let call = parse_call_uri("mcp://weather/current/São Paulo").expect("valid uri");
        assert_eq!(call.args, vec!["São Paulo"]);
    }

    #[test]
    fn query_and_fragment_are_not_path_segments() {
        let call = parse_call_uri("mcp://news/search/what?/3").expect("valid uri");
        assert_eq!(call.args, vec!["what"]);

        let call = parse_call_uri("mcp://weather/current/Paris#now").expect("valid uri");
        assert_eq!(call.args, vec!["Paris"]);
    }

    #[test]
    fn rejects_other_schemes() {
        for uri in [
            "http://weather/current/London",
            "mcpx://weather/current/London",
            "weather/current/London",
        ] {
            let err = parse_call_uri(uri).expect_err("scheme must be rejected");
            assert!(matches!(err, GatewayError::InvalidUri(_)), "{uri}");
        }
    }

    #[test]
    fn rejects_missing_service_or_action() {
        for uri in ["mcp:///current/London", "mcp://weather", "mcp://weather/", "mcp:weather"] {
            let err = parse_call_uri(uri).expect_err("uri must be rejected");
            assert!(matches!(err, GatewayError::InvalidUri(_)), "{uri}");
        }
    }
}
