//! HTTP client for the messaging gateway sidecar.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::models::{PairingCode, SessionId};
use crate::transport::ChatTransport;
use crate::{Error, Result};

/// `ChatTransport` over the gateway's HTTP API.
#[derive(Clone)]
pub struct HttpGatewayTransport {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct PairRequest<'a> {
    number: &'a str,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    body: &'a str,
}

impl HttpGatewayTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn session_url(&self, session: &SessionId, suffix: &str) -> String {
        format!("{}/sessions/{}{}", self.base_url, session.as_str(), suffix)
    }
}

#[async_trait]
impl ChatTransport for HttpGatewayTransport {
    async fn connect(&self, session: &SessionId) -> Result<()> {
        self.http
            .post(self.session_url(session, "/connect"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn disconnect(&self, session: &SessionId) -> Result<()> {
        self.http
            .post(self.session_url(session, "/disconnect"))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_session(&self, session: &SessionId) -> Result<()> {
        self.http
            .delete(self.session_url(session, ""))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn begin_pairing(&self, number: &str) -> Result<PairingCode> {
        let response = self
            .http
            .post(format!("{}/pair", self.base_url))
            .json(&PairRequest { number })
            .send()
            .await?
            .error_for_status()?;

        let code: PairingCode = response.json().await?;
        if code.code.is_empty() {
            return Err(Error::Transport(
                "Gateway returned an empty pairing code".to_string(),
            ));
        }
        Ok(code)
    }

    async fn is_logged_in(&self, session: &SessionId) -> Result<bool> {
        let response = self
            .http
            .get(self.session_url(session, ""))
            .send()
            .await?
            .error_for_status()?;

        let status: Value = response.json().await?;
        Ok(status
            .get("logged_in")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    async fn send_text(&self, session: &SessionId, to: &str, body: &str) -> Result<()> {
        self.http
            .post(self.session_url(session, "/messages"))
            .json(&SendRequest { to, body })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
