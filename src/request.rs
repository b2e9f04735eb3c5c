//! RequestBuilder (C2, §4.1): synthesises the exact wire bytes for one
//! request, given a (possibly version-upgraded) [`Config`].

use crate::config::{Config, HttpVersion, Method, MAX_REQUEST_BYTES};
use crate::error::{Error, Result};

/// An immutable, ready-to-send request.
#[derive(Debug, Clone)]
pub struct Request {
    /// The `Host` header value (== `Config::target_host`), kept alongside
    /// the bytes since the TLS handshake needs it for SNI independent of
    /// whether a `Host` header was actually emitted (HTTP/0.9, or proxied).
    pub host: String,
    pub bytes: Vec<u8>,
}

/// Applies the §4.1 version-upgrade rules to `config`, then composes the
/// request line and headers.
///
/// The only failure mode is an unsupported method, which `Config::method`'s
/// closed enum makes unreachable in practice; the check is kept so the
/// error path stays real rather than `unreachable!()`.
pub fn build_request(config: &mut Config) -> Result<Request> {
    config.apply_version_upgrades();
    config.validate()?;

    let mut body = String::new();
    body.push_str(config.method.as_str());
    body.push(' ');

    if config.has_proxy() {
        body.push_str(&config.url);
    } else {
        body.push('/');
    }

    match config.http_version {
        HttpVersion::V0_9 => {
            body.push_str("\r\n");
        }
        HttpVersion::V1_0 | HttpVersion::V1_1 => {
            body.push_str(if config.http_version == HttpVersion::V1_0 {
                " HTTP/1.0\r\n"
            } else {
                " HTTP/1.1\r\n"
            });

            body.push_str("User-Agent: WebBench 2\r\n");

            if !config.has_proxy() {
                body.push_str(&format!(
                    "Host: {}:{}\r\n",
                    config.target_host, config.target_port
                ));
            }

            // Unconditional on `reload` — see SPEC_FULL §4.1 / DESIGN.md
            // Open Question resolution #1.
            if config.has_proxy() {
                body.push_str(match config.http_version {
                    HttpVersion::V1_0 => "Pragma: no-cache\r\n",
                    HttpVersion::V1_1 => "Cache-Control: no-cache\r\n",
                    HttpVersion::V0_9 => unreachable!(),
                });
            }

            if config.http_version == HttpVersion::V1_1 {
                body.push_str("Connection: close\r\n");
            }

            body.push_str("\r\n");
        }
    }

    if body.len() > MAX_REQUEST_BYTES {
        return Err(Error::argument(format!(
            "synthesised request exceeds {MAX_REQUEST_BYTES} bytes"
        )));
    }

    Ok(Request {
        host: config.target_host.clone(),
        bytes: body.into_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Protocol, MAX_CONNECTIONS};

    fn base() -> Config {
        Config {
            target_host: "www.baidu.com".into(),
            target_port: 12345,
            protocol: Protocol::Https,
            proxy: None,
            method: Method::Options,
            http_version: HttpVersion::V1_1,
            url: "https://www.baidu.com:12345/".into(),
            clients: 1,
            duration_seconds: 30,
            force: false,
            reload: false,
        }
    }

    #[test]
    fn worked_example_no_proxy() {
        let mut cfg = base();
        let req = build_request(&mut cfg).unwrap();
        assert_eq!(
            String::from_utf8(req.bytes).unwrap(),
            "OPTIONS / HTTP/1.1\r\n\
             User-Agent: WebBench 2\r\n\
             Host: www.baidu.com:12345\r\n\
             Connection: close\r\n\r\n"
        );
    }

    #[test]
    fn worked_example_with_proxy() {
        let mut cfg = base();
        cfg.proxy = Some(crate::config::ProxyEndpoint {
            host: "localhost".into(),
            port: 7891,
        });
        let req = build_request(&mut cfg).unwrap();
        assert_eq!(
            String::from_utf8(req.bytes).unwrap(),
            "OPTIONS https://www.baidu.com:12345/ HTTP/1.1\r\n\
             User-Agent: WebBench 2\r\n\
             Cache-Control: no-cache\r\n\
             Connection: close\r\n\r\n"
        );
    }

    #[test]
    fn http09_has_no_headers() {
        let mut cfg = base();
        cfg.method = Method::Get;
        cfg.http_version = HttpVersion::V0_9;
        let req = build_request(&mut cfg).unwrap();
        assert_eq!(String::from_utf8(req.bytes).unwrap(), "GET /\r\n");
    }

    #[test]
    fn http10_with_proxy_uses_pragma_no_cache() {
        let mut cfg = base();
        cfg.method = Method::Get;
        cfg.http_version = HttpVersion::V1_0;
        cfg.proxy = Some(crate::config::ProxyEndpoint {
            host: "proxy".into(),
            port: 80,
        });
        let req = build_request(&mut cfg).unwrap();
        let text = String::from_utf8(req.bytes).unwrap();
        assert!(text.contains("Pragma: no-cache\r\n"));
        assert!(!text.contains("Connection: close"));
    }

    #[test]
    fn build_request_is_deterministic() {
        let mut a = base();
        let mut b = base();
        assert_eq!(build_request(&mut a).unwrap().bytes, build_request(&mut b).unwrap().bytes);
    }

    #[test]
    fn host_field_matches_target_host_even_when_proxied() {
        let mut cfg = base();
        cfg.proxy = Some(crate::config::ProxyEndpoint {
            host: "proxy".into(),
            port: 80,
        });
        let req = build_request(&mut cfg).unwrap();
        assert_eq!(req.host, "www.baidu.com");
    }

    #[test]
    fn clients_field_unrelated_to_request_bytes_sanity() {
        // Guards against accidentally threading unrelated Config fields
        // into the synthesised bytes.
        let mut cfg = base();
        cfg.clients = MAX_CONNECTIONS;
        let req = build_request(&mut cfg).unwrap();
        assert!(!String::from_utf8(req.bytes).unwrap().contains("1000"));
    }
}
