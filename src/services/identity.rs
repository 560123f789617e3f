//! Login-code exchange with the mini-program platform.
//!
//! Clients obtain a short-lived login code on the device and post it to
//! `/api/user/getOpenId`; the server trades it for the stable open id.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::IdentityConfig;

/// Identifier returned by a successful exchange. `open_id` is never blank.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenIdentity {
    pub open_id: String,
    pub union_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Login code rejected ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("Identity service unavailable: {0}")]
    Unavailable(String),

    #[error("Identity service returned no open id")]
    MissingIdentifier,

    #[error("Identity exchange is not configured")]
    NotConfigured,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<OpenIdentity, IdentityError>;
}

/// `jscode2session` response. Errors arrive with HTTP 200 and a non-zero `errcode`.
#[derive(Debug, Deserialize)]
struct SessionResponse {
    openid: Option<String>,
    unionid: Option<String>,
    errcode: Option<i64>,
    errmsg: Option<String>,
}

pub struct WeChatIdentityProvider {
    client: reqwest::Client,
    config: IdentityConfig,
}

impl WeChatIdentityProvider {
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn session_url(&self) -> String {
        format!("{}/sns/jscode2session", self.config.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl IdentityProvider for WeChatIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<OpenIdentity, IdentityError> {
        if !self.config.is_configured() {
            return Err(IdentityError::NotConfigured);
        }

        let response = self
            .client
            .get(self.session_url())
            .query(&[
                ("appid", self.config.app_id.as_str()),
                ("secret", self.config.app_secret.as_str()),
                ("js_code", code),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!("Identity exchange request failed: {}", e);
                IdentityError::Unavailable(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(IdentityError::Unavailable(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        parse_session(body)
    }
}

fn parse_session(body: serde_json::Value) -> Result<OpenIdentity, IdentityError> {
    let session: SessionResponse =
        serde_json::from_value(body).map_err(|e| IdentityError::Unavailable(e.to_string()))?;

    if let Some(code) = session.errcode.filter(|c| *c != 0) {
        let message = session.errmsg.unwrap_or_default();
        debug!("Login code rejected: {} {}", code, message);
        return Err(IdentityError::Rejected { code, message });
    }

    match session.openid.map(|id| id.trim().to_string()) {
        Some(open_id) if !open_id.is_empty() => Ok(OpenIdentity {
            open_id,
            union_id: session.unionid,
        }),
        _ => Err(IdentityError::MissingIdentifier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn successful_session_yields_open_id() {
        let identity = parse_session(json!({
            "openid": "oAbc123",
            "session_key": "secret-key"
        }))
        .unwrap();
        assert_eq!(identity.open_id, "oAbc123");
        assert_eq!(identity.union_id, None);
    }

    #[test]
    fn errcode_is_a_rejection() {
        let err = parse_session(json!({ "errcode": 40029, "errmsg": "invalid code" })).unwrap_err();
        assert!(matches!(err, IdentityError::Rejected { code: 40029, .. }));
    }

    #[test]
    fn zero_errcode_is_success() {
        let identity = parse_session(json!({ "errcode": 0, "openid": "o1", "unionid": "un1" })).unwrap();
        assert_eq!(identity.open_id, "o1");
        assert_eq!(identity.union_id.as_deref(), Some("un1"));
    }

    #[test]
    fn blank_open_id_is_never_returned() {
        assert!(matches!(
            parse_session(json!({ "openid": "  " })),
            Err(IdentityError::MissingIdentifier)
        ));
        assert!(matches!(
            parse_session(json!({})),
            Err(IdentityError::MissingIdentifier)
        ));
    }

    #[tokio::test]
    async fn unconfigured_provider_refuses_to_call_out() {
        let provider = WeChatIdentityProvider::new(IdentityConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            app_id: String::new(),
            app_secret: String::new(),
            timeout_secs: 1,
        })
        .unwrap();
        assert!(matches!(
            provider.exchange_code("code").await,
            Err(IdentityError::NotConfigured)
        ));
    }
}
