//! Outbound connection policy for tool calls that must never resolve names.
//!
//! The HTTP agent hands every connection attempt's `host:port` to
//! [`LiteralAddressResolver`]. Literal IPv4/IPv6 hosts are returned as-is;
//! anything else is refused before a DNS query can be issued. The check runs
//! per attempt, so an answer that changes between validation and use can
//! never redirect the call.

use crate::shared::EventLog;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EgressError {
    #[error("hostname lookup blocked: connection attempt to '{host}' is prohibited")]
    HostnameBlocked { host: String },
    #[error("egress target `{target}` is invalid: {reason}")]
    InvalidTarget { target: String, reason: String },
}

/// Splits `host:port`, accepting bracketed IPv6 hosts (`[::1]:443`).
pub fn split_host_port(target: &str) -> Result<(&str, u16), EgressError> {
    let invalid = |reason: &str| EgressError::InvalidTarget {
        target: target.to_string(),
        reason: reason.to_string(),
    };

    let (host, port) = if let Some(rest) = target.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| invalid("unterminated `[` in host"))?;
        let port = after
            .strip_prefix(':')
            .ok_or_else(|| invalid("missing port"))?;
        (host, port)
    } else {
        let (host, port) = target
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?;
        if host.contains(':') {
            return Err(invalid("IPv6 hosts must be bracketed"));
        }
        (host, port)
    };

    if host.is_empty() {
        return Err(invalid("empty host"));
    }
    let port = port
        .parse::<u16>()
        .map_err(|_| invalid("port is not a number in 0-65535"))?;
    Ok((host, port))
}

/// Resolves `target` without consulting DNS.
pub fn literal_socket_addr(target: &str) -> Result<SocketAddr, EgressError> {
    let (host, port) = split_host_port(target)?;
    match host.parse::<IpAddr>() {
        Ok(ip) => Ok(SocketAddr::new(ip, port)),
        Err(_) => Err(EgressError::HostnameBlocked {
            host: host.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Default)]
pub struct LiteralAddressResolver {
    log: EventLog,
}

impl LiteralAddressResolver {
    pub fn new(log: EventLog) -> Self {
        Self { log }
    }
}

impl ureq::Resolver for LiteralAddressResolver {
    fn resolve(&self, netloc: &str) -> io::Result<Vec<SocketAddr>> {
        match literal_socket_addr(netloc) {
            Ok(addr) => Ok(vec![addr]),
            Err(err) => {
                self.log.warn("egress.blocked", &err.to_string());
                Err(io::Error::new(io::ErrorKind::PermissionDenied, err))
            }
        }
    }
}

/// HTTP agent whose every connection goes through [`LiteralAddressResolver`].
pub fn egress_safe_agent(
    timeout: Duration,
    connect_timeout: Duration,
    log: EventLog,
) -> ureq::Agent {
    // ureq 2 has no TCP keepalive setting; reuse comes from the agent's connection pool.
    ureq::AgentBuilder::new()
        .resolver(LiteralAddressResolver::new(log))
        .timeout_connect(connect_timeout)
        .timeout(timeout)
        .build()
}

/// Finds an egress refusal anywhere in an HTTP error's source chain.
pub fn egress_refusal(err: &(dyn std::error::Error + 'static)) -> Option<EgressError> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(refusal) = err.downcast_ref::<EgressError>() {
            return Some(refusal.clone());
        }
        if let Some(refusal) = err
            .downcast_ref::<io::Error>()
            .and_then(|io_err| io_err.get_ref())
            .and_then(|inner| inner.downcast_ref::<EgressError>())
        {
            return Some(refusal.clone());
        }
        current = err.source();
    }
    None
}
