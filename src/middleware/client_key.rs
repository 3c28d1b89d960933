// ABOUTME: Derives the rate-limit client key from forwarding headers or the connection peer
// ABOUTME: Falls back to a shared sentinel bucket when no address can be determined
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use std::net::{IpAddr, SocketAddr};

use coach_core::constants::rate_limits::UNKNOWN_CLIENT_KEY;
use http::HeaderMap;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Parse a header value as an IP address
fn header_ip(headers: &HeaderMap, name: &str, first_entry: bool) -> Option<IpAddr> {
    let value = headers.get(name)?.to_str().ok()?;
    let candidate = if first_entry {
        value.split(',').next()?
    } else {
        value
    };
    candidate.trim().parse().ok()
}

/// Client identity used for rate limiting
///
/// With `trust_forwarded` set, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Header values that are not IP addresses are ignored. Without
/// a usable header the peer address is used, and without a peer every caller
/// shares the `unknown` bucket.
#[must_use]
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    let forwarded = trust_forwarded
        .then(|| {
            header_ip(headers, X_FORWARDED_FOR, true)
                .or_else(|| header_ip(headers, X_REAL_IP, false))
        })
        .flatten();

    forwarded
        .or_else(|| peer.map(|addr| addr.ip()))
        .map_or_else(|| UNKNOWN_CLIENT_KEY.to_owned(), |ip| ip.to_string())
}

/// Whether a key is the shared fallback bucket
#[must_use]
pub fn is_unknown(key: &str) -> bool {
    key == UNKNOWN_CLIENT_KEY
}
