//! BSD `netstat` format, shared by FreeBSD, OpenBSD, NetBSD and macOS.
//!
//! Local addresses are written `host.port`. The host may itself contain dots,
//! so the port is whatever follows the last one.

/// Lists all IPv4 sockets in every state, numeric.
pub const COMMAND: &str = "netstat -an -f inet";

/// Splits a `host.port` token on its last `.`.
pub fn split_local_address(token: &str) -> Option<(String, u16)> {
    let (host, port) = token.rsplit_once('.')?;
    let port = port.parse().ok()?;
    let address = match host {
        "" | "*" => "0.0.0.0",
        other => other,
    };
    Some((address.to_string(), port))
}
