//! HTTP header name constants.
//!
//! Header names the proxy server writes or strips when relaying an upstream
//! response.

/// CORS header set on every proxy server response
pub const HEADER_ACCESS_CONTROL_ALLOW_ORIGIN: &str = "access-control-allow-origin";

/// Hop-by-hop headers (RFC 9110 section 7.6.1).
///
/// These describe a single connection and are dropped when relaying an
/// upstream response in pass-through mode; hyper sets its own framing.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Returns true if `name` is a hop-by-hop header (case-insensitive).
pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|hop| hop.eq_ignore_ascii_case(name))
}
