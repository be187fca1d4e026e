//! Runtime configuration.
//!
//! Both configs are static for the lifetime of a process. They are built from
//! defaults, `with_*` builders, or the environment:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `BATCH_TIMEOUT` | Collection window per cycle, in seconds (fractional allowed) | `0.05` |
//! | `BATCH_SIZE_MAX` | Maximum texts per classifier call | `8` |
//! | `CLASSIFY_HOST` | HTTP bind host | `0.0.0.0` |
//! | `CLASSIFY_PORT` | HTTP bind port | `8000` |
//! | `SEGMENT_LENGTH` | Characters per document segment | `300` |
//! | `CLASSIFIER_URL` | Inference server endpoint (see `RemoteClassifierConfig`) | `http://127.0.0.1:8080/classify` |
//! | `CLASSIFIER_TIMEOUT_SECS` | Inference request timeout (see `RemoteClassifierConfig`) | `60` |
//!
//! Values that are present but unparseable are configuration errors rather
//! than silently falling back to defaults.

use crate::{Error, ErrorContext, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SEGMENT_LENGTH: usize = 300;

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Upper bound on the number of texts handed to one classifier call.
    pub max_batch_size: usize,
    /// Length of one collection cycle, measured from the start of the cycle.
    pub max_wait_time: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 8,
            max_wait_time: Duration::from_millis(50),
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_batch_size(mut self, s: usize) -> Self {
        self.max_batch_size = s;
        self
    }

    pub fn with_max_wait_time(mut self, d: Duration) -> Self {
        self.max_wait_time = d;
        self
    }

    /// Read `BATCH_TIMEOUT` / `BATCH_SIZE_MAX` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(secs) = parse_var::<f64, _>(&lookup, "BATCH_TIMEOUT", "batch_config")? {
            cfg.max_wait_time = Duration::try_from_secs_f64(secs).map_err(|e| {
                Error::configuration_with_context(
                    "batch timeout is not a valid duration",
                    ErrorContext::new()
                        .with_field_path("BATCH_TIMEOUT")
                        .with_details(e.to_string())
                        .with_source("batch_config"),
                )
            })?;
        }
        if let Some(size) = parse_var::<usize, _>(&lookup, "BATCH_SIZE_MAX", "batch_config")? {
            cfg.max_batch_size = size;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_batch_size == 0 {
            return Err(Error::configuration_with_context(
                "batch size must be at least 1",
                ErrorContext::new()
                    .with_field_path("BATCH_SIZE_MAX")
                    .with_source("batch_config"),
            ));
        }
        // A zero window would spin the aggregator without ever waiting for arrivals.
        if self.max_wait_time.is_zero() {
            return Err(Error::configuration_with_context(
                "batch timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("BATCH_TIMEOUT")
                    .with_source("batch_config"),
            ));
        }
        Ok(())
    }
}

/// HTTP surface configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Characters per document segment; each segment is one classifier input.
    pub segment_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            segment_length: DEFAULT_SEGMENT_LENGTH,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_segment_length(mut self, len: usize) -> Self {
        self.segment_length = len;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(host) = lookup("CLASSIFY_HOST") {
            cfg.host = host;
        }
        if let Some(port) = parse_var::<u16, _>(&lookup, "CLASSIFY_PORT", "server_config")? {
            cfg.port = port;
        }
        if let Some(len) = parse_var::<usize, _>(&lookup, "SEGMENT_LENGTH", "server_config")? {
            cfg.segment_length = len;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.segment_length == 0 {
            return Err(Error::configuration_with_context(
                "segment length must be at least 1",
                ErrorContext::new()
                    .with_field_path("SEGMENT_LENGTH")
                    .with_source("server_config"),
            ));
        }
        if self.host.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "bind host must not be empty",
                ErrorContext::new()
                    .with_field_path("CLASSIFY_HOST")
                    .with_source("server_config"),
            ));
        }
        Ok(())
    }
}

/// Parse an optional variable, turning a malformed value into a configuration error.
pub(crate) fn parse_var<T, F>(lookup: &F, key: &str, source: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim().parse::<T>().map(Some).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid value {raw:?}"),
            ErrorContext::new()
                .with_field_path(key)
                .with_details(e.to_string())
                .with_source(source),
        )
    })
}
