//! Target URL and proxy-string parsing (§6 "URL parsing contract" /
//! "Proxy string `H:P` parsing").
//!
//! These are deliberately not delegated wholesale to the `url` crate: the
//! source's grammar is narrower (only `http`/`https`, IPv4-or-DNS-name host,
//! mandatory trailing slash, a 1500-byte cap) and its defaulting rules
//! (missing port, missing proxy host) are bespoke. `url::Url` is still used
//! as the scheme/authority splitter underneath, matching how the teacher
//! crate leans on it in `src/into_url.rs`.

use crate::config::Protocol;
use crate::error::{Error, Result};

pub const MAX_URL_LEN: usize = 1500;

/// The pieces of a target URL relevant to [`Config`](crate::config::Config).
pub struct ParsedUrl {
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    /// The URL as it should be stored on `Config::url`: normalised with a
    /// trailing slash, otherwise verbatim.
    pub normalised: String,
}

/// Parses `http://host[:port]/path` or `https://host[:port]/path`.
///
/// Any other scheme is rejected (§6: "unsupported URL scheme ... require
/// routing via `--proxy`" is a caller-side concern; this function only
/// accepts the two supported schemes).
pub fn parse_target_url(raw: &str) -> Result<ParsedUrl> {
    if raw.len() > MAX_URL_LEN {
        return Err(Error::url_parse(format!(
            "url is too long ({} bytes, max {MAX_URL_LEN})",
            raw.len()
        )));
    }

    let normalised = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let parsed = url::Url::parse(&normalised)
        .map_err(|e| Error::url_parse(format!("{raw}: {e}")))?;

    let protocol = match parsed.scheme() {
        "http" => Protocol::Http,
        "https" => Protocol::Https,
        other => {
            return Err(Error::url_parse(format!(
                "unsupported scheme '{other}': only http:// and https:// are accepted, \
                 set --proxy for others"
            )))
        }
    };

    let host = parsed
        .host_str()
        .ok_or_else(|| Error::url_parse(format!("{raw}: missing host")))?
        .to_string();

    let port = parsed.port().unwrap_or(match protocol {
        Protocol::Http => 80,
        Protocol::Https => 443,
    });

    Ok(ParsedUrl {
        protocol,
        host,
        port,
        normalised,
    })
}

/// Parses a `-p`/`--proxy` value of the form `[host][:port]`.
///
/// - empty host (or no colon at all is *not* empty host; see below) → `127.0.0.1`
/// - empty or missing port → `80`
/// - a non-empty, non-numeric port → error
///
/// Mirrors `set_arguments_values`'s `'p'` case in the original source:
/// the *last* colon splits host from port (so a bare `host` with no colon
/// keeps the whole string as host and defaults the port), a trailing colon
/// (`"host:"`) defaults the port without erroring, and a leading colon
/// (`":7899"`) defaults the host to `127.0.0.1`.
pub fn parse_proxy(raw: &str) -> Result<(String, u16)> {
    match raw.rfind(':') {
        None => {
            let host = if raw.is_empty() { "127.0.0.1".to_string() } else { raw.to_string() };
            Ok((host, 80))
        }
        Some(idx) => {
            let (host_part, port_part) = (&raw[..idx], &raw[idx + 1..]);
            let host = if host_part.is_empty() {
                "127.0.0.1".to_string()
            } else {
                host_part.to_string()
            };
            if port_part.is_empty() {
                Ok((host, 80))
            } else {
                let port: u16 = port_part
                    .parse()
                    .map_err(|_| Error::proxy_parse(format!("illegal port number '{port_part}'")))?;
                if port == 0 {
                    return Err(Error::proxy_parse(format!("illegal port number '{port_part}'")));
                }
                Ok((host, port))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_trailing_slash_when_missing() {
        let parsed = parse_target_url("http://example.com").unwrap();
        assert_eq!(parsed.normalised, "http://example.com/");
    }

    #[test]
    fn leaves_trailing_slash_alone() {
        let parsed = parse_target_url("http://example.com/path/").unwrap();
        assert_eq!(parsed.normalised, "http://example.com/path/");
    }

    #[test]
    fn defaults_http_port_to_80() {
        let parsed = parse_target_url("http://example.com/").unwrap();
        assert_eq!(parsed.port, 80);
        assert!(matches!(parsed.protocol, Protocol::Http));
    }

    #[test]
    fn defaults_https_port_to_443() {
        let parsed = parse_target_url("https://example.com/").unwrap();
        assert_eq!(parsed.port, 443);
        assert!(matches!(parsed.protocol, Protocol::Https));
    }

    #[test]
    fn explicit_port_is_honoured() {
        let parsed = parse_target_url("https://example.com:12345/").unwrap();
        assert_eq!(parsed.port, 12345);
        assert_eq!(parsed.host, "example.com");
    }

    #[test]
    fn rejects_unsupported_scheme() {
        assert!(parse_target_url("ftp://example.com/").is_err());
    }

    #[test]
    fn rejects_urls_over_1500_bytes() {
        let long = format!("http://example.com/{}", "a".repeat(1500));
        assert!(parse_target_url(&long).is_err());
    }

    #[test]
    fn round_trips_host_port_protocol() {
        for raw in [
            "http://example.com/",
            "https://example.com:8443/",
            "http://127.0.0.1:9000/",
        ] {
            let first = parse_target_url(raw).unwrap();
            let second = parse_target_url(&first.normalised).unwrap();
            assert_eq!(first.host, second.host);
            assert_eq!(first.port, second.port);
            assert_eq!(first.protocol, second.protocol);
        }
    }

    #[test]
    fn proxy_host_and_port() {
        assert_eq!(parse_proxy("localhost:7891").unwrap(), ("localhost".into(), 7891));
    }

    #[test]
    fn proxy_no_colon_defaults_port_80() {
        assert_eq!(parse_proxy("localhost").unwrap(), ("localhost".into(), 80));
    }

    #[test]
    fn proxy_trailing_colon_defaults_port_80() {
        assert_eq!(parse_proxy("localhost:").unwrap(), ("localhost".into(), 80));
    }

    #[test]
    fn proxy_leading_colon_defaults_host() {
        assert_eq!(parse_proxy(":7899").unwrap(), ("127.0.0.1".into(), 7899));
    }

    #[test]
    fn proxy_malformed_port_fails() {
        assert!(parse_proxy("localhost:notaport").is_err());
    }
}
