use super::{Classification, Classifier};
use crate::config::parse_var;
use crate::{Error, ErrorContext, Result};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Where and how to reach the inference server.
///
/// Env: `CLASSIFIER_URL` (default `http://127.0.0.1:8080/classify`),
/// `CLASSIFIER_TIMEOUT_SECS` (default 60).
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteClassifierConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for RemoteClassifierConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080/classify".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl RemoteClassifierConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(url) = lookup("CLASSIFIER_URL") {
            cfg.url = url;
        }
        if let Some(secs) =
            parse_var::<u64, _>(&lookup, "CLASSIFIER_TIMEOUT_SECS", "remote_classifier")?
        {
            cfg.timeout = Duration::from_secs(secs.max(1));
        }
        Ok(cfg)
    }
}

#[derive(Serialize)]
struct ClassifyBody<'a> {
    inputs: &'a [String],
}

/// Classifier backed by an HTTP inference server.
///
/// Each batch becomes one `POST {"inputs": [...]}` expecting a JSON array of
/// `{"label", "score"}` objects in input order. The blocking client is built
/// on first use, which happens on the aggregator's blocking-pool thread.
#[derive(Debug)]
pub struct RemoteClassifier {
    endpoint: Url,
    timeout: Duration,
    client: OnceCell<reqwest::blocking::Client>,
}

impl RemoteClassifier {
    pub fn new(config: RemoteClassifierConfig) -> Result<Self> {
        let endpoint = Url::parse(&config.url).map_err(|e| {
            Error::configuration_with_context(
                "invalid classifier url",
                ErrorContext::new()
                    .with_field_path("CLASSIFIER_URL")
                    .with_details(e.to_string())
                    .with_source("remote_classifier"),
            )
        })?;
        Ok(Self {
            endpoint,
            timeout: config.timeout,
            client: OnceCell::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn client(&self) -> Result<&reqwest::blocking::Client> {
        self.client.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(Error::from)
        })
    }
}

impl Classifier for RemoteClassifier {
    fn classify(&self, texts: &[String]) -> Result<Vec<Classification>> {
        let response = self
            .client()?
            .post(self.endpoint.clone())
            .json(&ClassifyBody { inputs: texts })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::runtime_with_context(
                format!("inference server returned HTTP {}", status.as_u16()),
                ErrorContext::new()
                    .with_details(body)
                    .with_source("remote_classifier"),
            ));
        }
        let body = response.text()?;
        Ok(serde_json::from_str::<Vec<Classification>>(&body)?)
    }
}
