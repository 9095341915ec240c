use std::net::SocketAddr;

use axum::http::HeaderMap;

use super::auth::USER_ID_HEADER;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// First match wins: user identity header, first hop of the forwarded-for
/// chain, peer address, then the literal `unknown`.
pub fn resolve_client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(user_id) = header_value(headers, USER_ID_HEADER) {
        return format!("user:{}", user_id);
    }

    let first_hop = header_value(headers, FORWARDED_FOR_HEADER)
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());
    if let Some(ip) = first_hop {
        return format!("ip:{}", ip);
    }

    match peer {
        Some(addr) => format!("ip:{}", addr.ip()),
        None => "ip:unknown".to_string(),
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
