//! Immutable, validated run parameters (C1 in the design).
//!
//! A [`Config`] is built once from parsed command-line arguments and a split
//! target URL, then shared read-only by every connection for the lifetime of
//! a run.

use std::fmt;

use crate::error::Result;

/// Hard cap on concurrent clients, matching the source's `MAX_CONNECTIONS`.
pub const MAX_CONNECTIONS: usize = 1000;

/// Fixed upper bound on the synthesised request, matching the source's
/// request buffer size.
pub const MAX_REQUEST_BYTES: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Options,
    Trace,
}

impl Method {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HttpVersion {
    V0_9,
    V1_0,
    V1_1,
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpVersion::V0_9 => write!(f, "HTTP/0.9"),
            HttpVersion::V1_0 => write!(f, "HTTP/1.0"),
            HttpVersion::V1_1 => write!(f, "HTTP/1.1"),
        }
    }
}

/// A proxy endpoint, present iff `-p`/`--proxy` was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
}

/// Immutable, validated run parameters (§3 Data Model).
#[derive(Debug, Clone)]
pub struct Config {
    pub target_host: String,
    pub target_port: u16,
    pub protocol: Protocol,
    pub proxy: Option<ProxyEndpoint>,
    pub method: Method,
    pub http_version: HttpVersion,
    /// The full URL as originally supplied, used verbatim as the
    /// request-URI when a proxy is configured.
    pub url: String,
    pub clients: usize,
    pub duration_seconds: u64,
    pub force: bool,
    pub reload: bool,
}

impl Config {
    /// True when the proxy is used as an opaque TCP tunnel (HTTPS through a
    /// proxy), rather than spoken to as a plain HTTP forward proxy.
    pub fn needs_proxy_tunnel(&self) -> bool {
        self.proxy.is_some() && self.protocol == Protocol::Https
    }

    pub fn has_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// Applies the §4.1 version-upgrade rules, in order. Idempotent:
    /// applying twice is the same as applying once, since each rule's
    /// guard condition is no longer true once the upgrade it implies has
    /// been made.
    pub(crate) fn apply_version_upgrades(&mut self) {
        if self.reload && self.has_proxy() && self.http_version == HttpVersion::V0_9 {
            self.http_version = HttpVersion::V1_0;
        }
        if self.method == Method::Head && self.http_version == HttpVersion::V0_9 {
            self.http_version = HttpVersion::V1_0;
        }
        if matches!(self.method, Method::Options | Method::Trace)
            && self.http_version != HttpVersion::V1_1
        {
            self.http_version = HttpVersion::V1_1;
        }
    }

    /// The only setup-time validation the source performs beyond parsing:
    /// the method must be one of the four supported tokens. Given this
    /// crate's closed `Method` enum this can never fail, but the check is
    /// kept so the error path (§7 setup errors) stays reachable and tested.
    pub(crate) fn validate(&self) -> Result<()> {
        match self.method {
            Method::Get | Method::Head | Method::Options | Method::Trace => Ok(()),
        }
    }

    pub fn clamped_clients(&self) -> usize {
        self.clients.min(MAX_CONNECTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            target_host: "example.com".into(),
            target_port: 80,
            protocol: Protocol::Http,
            proxy: None,
            method: Method::Get,
            http_version: HttpVersion::V0_9,
            url: "http://example.com/".into(),
            clients: 1,
            duration_seconds: 30,
            force: false,
            reload: false,
        }
    }

    #[test]
    fn head_on_http09_upgrades_to_http10() {
        let mut cfg = base();
        cfg.method = Method::Head;
        cfg.apply_version_upgrades();
        assert_eq!(cfg.http_version, HttpVersion::V1_0);
    }

    #[test]
    fn options_forces_http11_regardless_of_requested_version() {
        let mut cfg = base();
        cfg.method = Method::Options;
        cfg.http_version = HttpVersion::V1_0;
        cfg.apply_version_upgrades();
        assert_eq!(cfg.http_version, HttpVersion::V1_1);
    }

    #[test]
    fn trace_forces_http11() {
        let mut cfg = base();
        cfg.method = Method::Trace;
        cfg.apply_version_upgrades();
        assert_eq!(cfg.http_version, HttpVersion::V1_1);
    }

    #[test]
    fn reload_with_proxy_on_http09_upgrades_to_http10() {
        let mut cfg = base();
        cfg.reload = true;
        cfg.proxy = Some(ProxyEndpoint {
            host: "127.0.0.1".into(),
            port: 8080,
        });
        cfg.apply_version_upgrades();
        assert_eq!(cfg.http_version, HttpVersion::V1_0);
    }

    #[test]
    fn reload_without_proxy_on_http09_stays_http09() {
        let mut cfg = base();
        cfg.reload = true;
        cfg.apply_version_upgrades();
        assert_eq!(cfg.http_version, HttpVersion::V0_9);
    }

    #[test]
    fn version_upgrade_is_idempotent() {
        let mut once = base();
        once.method = Method::Options;
        once.apply_version_upgrades();

        let mut twice = once.clone();
        twice.apply_version_upgrades();

        assert_eq!(once.http_version, twice.http_version);
    }

    #[test]
    fn validate_accepts_all_four_supported_methods() {
        for method in [Method::Get, Method::Head, Method::Options, Method::Trace] {
            let mut cfg = base();
            cfg.method = method;
            assert!(cfg.validate().is_ok());
        }
    }

    #[test]
    fn clients_are_clamped_to_max_connections() {
        let mut cfg = base();
        cfg.clients = MAX_CONNECTIONS + 500;
        assert_eq!(cfg.clamped_clients(), MAX_CONNECTIONS);
    }
}
