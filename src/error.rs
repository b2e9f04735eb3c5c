use std::error::Error as StdError;
use std::fmt;
use std::io;

/// A `Result` alias where the `Err` case is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) type BoxError = Box<dyn StdError + Send + Sync>;

/// The error type returned by setup and per-cycle operations.
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

#[derive(Debug)]
pub(crate) enum Kind {
    /// The supplied URL did not match the accepted `http(s)://host[:port]/path` grammar.
    UrlParse,
    /// A `-p`/`--proxy` value did not match `[host][:port]`.
    ProxyParse,
    /// Argument validation failed (unsupported method, URL too long, missing URL, ...).
    Argument,
    /// DNS resolution or socket connect failed.
    Connect,
    /// A TLS handshake or I/O error.
    Tls,
    /// A plain socket read/write error.
    Io,
    /// The proxy refused or mangled the CONNECT tunnel.
    Proxy,
}

impl Error {
    pub(crate) fn new<E>(kind: Kind, source: Option<E>) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            inner: Box::new(Inner {
                kind,
                source: source.map(Into::into),
            }),
        }
    }

    pub(crate) fn url_parse(msg: impl Into<String>) -> Error {
        Error::new(Kind::UrlParse, Some(msg.into()))
    }

    pub(crate) fn proxy_parse(msg: impl Into<String>) -> Error {
        Error::new(Kind::ProxyParse, Some(msg.into()))
    }

    pub(crate) fn argument(msg: impl Into<String>) -> Error {
        Error::new(Kind::Argument, Some(msg.into()))
    }

    pub(crate) fn connect<E: Into<BoxError>>(e: E) -> Error {
        Error::new(Kind::Connect, Some(e))
    }

    pub(crate) fn tls<E: Into<BoxError>>(e: E) -> Error {
        Error::new(Kind::Tls, Some(e))
    }

    pub(crate) fn io(e: io::Error) -> Error {
        Error::new(Kind::Io, Some(e))
    }

    pub(crate) fn proxy(msg: impl Into<String>) -> Error {
        Error::new(Kind::Proxy, Some(msg.into()))
    }

    pub(crate) fn kind(&self) -> &Kind {
        &self.inner.kind
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("loadbench::Error");
        builder.field("kind", &self.inner.kind);
        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::UrlParse => write!(f, "invalid url")?,
            Kind::ProxyParse => write!(f, "invalid proxy")?,
            Kind::Argument => write!(f, "invalid argument")?,
            Kind::Connect => write!(f, "connect failed")?,
            Kind::Tls => write!(f, "tls error")?,
            Kind::Io => write!(f, "io error")?,
            Kind::Proxy => write!(f, "proxy tunnel failed")?,
        }
        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as &(dyn StdError + 'static))
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::io(e)
    }
}
