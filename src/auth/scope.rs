//! Registry scope-request parsing
//!
//! The authorization endpoint receives the registry's token-request body as
//! raw bytes: a form-encoded payload carrying the `account` of the principal
//! and one or more `scope` entries of the form `type:name:action[,action...]`
//! (for example `repository:library/alpine:pull,push`). Resource names may
//! themselves contain `:`, so the first segment is the type and the last
//! segment is the action list.

use url::form_urlencoded;

use crate::models::ParsedScope;

/// Decoded token-request body, before scope-entry parsing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    /// Principal the decision is made for
    pub account: Option<String>,

    /// Raw scope entries, in request order
    pub scopes: Vec<String>,
}

/// Decode the form-encoded token-request body
///
/// Unknown keys are ignored; a repeated `account` keeps the last value. The
/// payload itself cannot fail to decode: an empty or garbled body simply
/// yields no account and no scopes, which the authorizer denies.
pub fn parse_token_request(raw: &[u8]) -> TokenRequest {
    let mut request = TokenRequest::default();

    for (key, value) in form_urlencoded::parse(raw) {
        match key.as_ref() {
            "account" if !value.is_empty() => request.account = Some(value.into_owned()),
            "scope" if !value.is_empty() => request.scopes.push(value.into_owned()),
            _ => {}
        }
    }

    request
}

/// Parse one scope entry of the registry grammar
///
/// Returns `None` for anything malformed: fewer than three segments, an
/// empty type or name, or an empty action list. The authorizer treats a
/// malformed entry as unresolvable and denies the whole request.
pub fn parse_scope_entry(entry: &str) -> Option<ParsedScope> {
    let segments: Vec<&str> = entry.split(':').collect();
    if segments.len() < 3 {
        return None;
    }

    let resource_type = segments[0];
    let resource_name = segments[1..segments.len() - 1].join(":");
    let actions: std::collections::HashSet<String> = segments[segments.len() - 1]
        .split(',')
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();

    if resource_type.is_empty() || resource_name.is_empty() || actions.is_empty() {
        return None;
    }

    Some(ParsedScope {
        resource_type: resource_type.to_string(),
        resource_name,
        actions,
    })
}
