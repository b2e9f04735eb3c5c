//! Command-line surface (§6). The teacher crate has no binary of its own;
//! this is grounded in the pack's `clap` derive-based binaries (SPEC_FULL
//! §10.2), mapping the flag table directly onto [`Config`].

use clap::Parser;

use crate::config::{Config, HttpVersion, Method, Protocol};
use crate::error::{Error, Result};
use crate::url::{parse_proxy, parse_target_url};

const DEFAULT_DURATION_SECONDS: u64 = 30;
const DEFAULT_CLIENTS: usize = 1;

/// A concurrent HTTP/HTTPS load-generation client.
///
/// `-h`/`-?`/`--help` and `-V`/`--version` are handled by hand rather than
/// left to clap's built-ins (§6: help must exit non-zero, version must print
/// the bare `2.0` the original's `case 'V': printf("2.0\n");` emits), so both
/// are plain booleans here and the url positional is optional: a bare
/// `loadbench -h` must not be rejected for a missing URL before help runs.
#[derive(Debug, Parser)]
#[command(name = "loadbench", disable_help_flag = true, disable_version_flag = true, about, long_about = None)]
pub struct Cli {
    /// Target URL, e.g. `http://example.com/` or `https://example.com:8443/path`.
    pub url: Option<String>,

    /// Do not wait for a response.
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Send a cache-suppression header.
    #[arg(short = 'r', long)]
    pub reload: bool,

    /// Benchmark duration in seconds.
    #[arg(short = 't', long = "time", default_value_t = DEFAULT_DURATION_SECONDS)]
    pub time: u64,

    /// Proxy server as `host:port`.
    #[arg(short = 'p', long)]
    pub proxy: Option<String>,

    /// Number of concurrent clients.
    #[arg(short = 'c', long, default_value_t = DEFAULT_CLIENTS)]
    pub clients: usize,

    /// Use HTTP/0.9.
    #[arg(short = '9', long = "http09", conflicts_with_all = ["http10", "http11"])]
    pub http09: bool,

    /// Use HTTP/1.0.
    #[arg(short = '1', long = "http10", conflicts_with_all = ["http09", "http11"])]
    pub http10: bool,

    /// Use HTTP/1.1.
    #[arg(short = '2', long = "http11", conflicts_with_all = ["http09", "http10"])]
    pub http11: bool,

    /// Send a GET request (the default method).
    #[arg(long, conflicts_with_all = ["head", "options", "trace"])]
    pub get: bool,

    /// Send a HEAD request.
    #[arg(long, conflicts_with_all = ["get", "options", "trace"])]
    pub head: bool,

    /// Send an OPTIONS request.
    #[arg(long, conflicts_with_all = ["get", "head", "trace"])]
    pub options: bool,

    /// Send a TRACE request.
    #[arg(long, conflicts_with_all = ["get", "head", "options"])]
    pub trace: bool,

    /// Use the thread-per-client alternative driver instead of the core engine.
    #[arg(long)]
    pub threaded: bool,

    /// Raise log verbosity (repeatable).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print usage and exit non-zero.
    #[arg(short = 'h', long = "help", visible_short_alias = '?', action = clap::ArgAction::SetTrue)]
    pub help: bool,

    /// Print the version number and exit.
    #[arg(short = 'V', long = "version", action = clap::ArgAction::SetTrue)]
    pub version: bool,
}

impl Cli {
    /// Parses this CLI into a validated [`Config`], resolving the target
    /// URL and optional proxy string per §6.
    pub fn into_config(self) -> Result<Config> {
        let url = self.url.ok_or_else(|| Error::argument("missing URL"))?;
        let parsed = parse_target_url(&url)?;

        let proxy = match self.proxy {
            Some(raw) => {
                let (host, port) = parse_proxy(&raw)?;
                Some(crate::config::ProxyEndpoint { host, port })
            }
            None => None,
        };

        let method = if self.head {
            Method::Head
        } else if self.options {
            Method::Options
        } else if self.trace {
            Method::Trace
        } else {
            Method::Get
        };

        // The original source's `create_default_arguments` zero-initialises
        // its `http10` version field, which the `0/1/2` encoding maps to
        // HTTP/0.9 — so that, not HTTP/1.1, is the unflagged default here.
        let http_version = if self.http10 {
            HttpVersion::V1_0
        } else if self.http11 {
            HttpVersion::V1_1
        } else {
            HttpVersion::V0_9
        };

        if self.time == 0 {
            return Err(Error::argument("--time must be greater than zero"));
        }

        let protocol = match parsed.protocol {
            Protocol::Http => Protocol::Http,
            Protocol::Https => Protocol::Https,
        };

        Ok(Config {
            target_host: parsed.host,
            target_port: parsed.port,
            protocol,
            proxy,
            method,
            http_version,
            url: parsed.normalised,
            clients: self.clients,
            duration_seconds: self.time,
            force: self.force,
            reload: self.reload,
        })
    }

    /// Log level implied by `-v` repetitions (§10.1): 0 warn, 1 info, 2
    /// debug, 3+ trace.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("loadbench").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_to_get_and_http09() {
        let cli = parse(&["http://example.com/"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.method, Method::Get);
        assert_eq!(config.http_version, HttpVersion::V0_9);
        assert_eq!(config.clients, DEFAULT_CLIENTS);
        assert_eq!(config.duration_seconds, DEFAULT_DURATION_SECONDS);
    }

    #[test]
    fn explicit_http11_flag_is_honoured() {
        let cli = parse(&["--http11", "http://example.com/"]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.http_version, HttpVersion::V1_1);
    }

    #[test]
    fn options_with_proxy_resolves_both() {
        let cli = parse(&[
            "--options",
            "--proxy",
            "localhost:7891",
            "https://www.baidu.com:12345/",
        ]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.method, Method::Options);
        assert_eq!(config.protocol, Protocol::Https);
        let proxy = config.proxy.unwrap();
        assert_eq!(proxy.host, "localhost");
        assert_eq!(proxy.port, 7891);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let cli = parse(&["-t", "0", "http://example.com/"]);
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn verbosity_maps_to_log_levels() {
        assert_eq!(parse(&["http://e/"]).log_level(), log::LevelFilter::Warn);
        assert_eq!(parse(&["-v", "http://e/"]).log_level(), log::LevelFilter::Info);
        assert_eq!(parse(&["-vv", "http://e/"]).log_level(), log::LevelFilter::Debug);
        assert_eq!(parse(&["-vvv", "http://e/"]).log_level(), log::LevelFilter::Trace);
    }

    #[test]
    fn missing_url_is_a_setup_error_not_a_parse_panic() {
        let cli = parse(&[]);
        assert!(cli.url.is_none());
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn help_flag_and_its_question_mark_alias_both_parse() {
        assert!(parse(&["-h"]).help);
        assert!(parse(&["--help"]).help);
        assert!(parse(&["-?"]).help);
    }

    #[test]
    fn version_flag_parses() {
        assert!(parse(&["-V"]).version);
        assert!(parse(&["--version"]).version);
    }
}
