//! GNU net-tools `netstat` format, as found on Linux.
//!
//! Local addresses are written `host:port`, with `*` for the wildcard host.

/// Lists TCP and UDP sockets, numeric, listening only.
pub const COMMAND: &str = "netstat -tunl";

/// Splits a `host:port` token on its last `:`.
pub fn split_local_address(token: &str) -> Option<(String, u16)> {
    let (host, port) = token.rsplit_once(':')?;
    let port = port.parse().ok()?;
    let address = match host {
        "*" => "0.0.0.0",
        other => other,
    };
    Some((address.to_string(), port))
}
