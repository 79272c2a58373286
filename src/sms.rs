use anyhow::Context;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::{collections::HashMap, time::Duration};

use crate::{
    config::SmsConfig,
    constants::{REQUEST_TIMEOUT_SECS, SMS_SENDING_TYPE},
    utils::mask_phone,
};

#[cfg(test)]
use mockall::automock;

/// Delivers a verification code to a phone
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, recipient: &str, code: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize, PartialEq)]
struct PatternSmsReq<'a> {
    sending_type: &'a str,
    from_number: &'a str,
    code: &'a str,
    recipients: Vec<&'a str>,
    params: HashMap<&'static str, JsonValue>,
}

/// Client for the pattern based SMS gateway
pub struct HttpSmsSender {
    client: Client,
    config: SmsConfig,
}

impl HttpSmsSender {
    pub fn new(config: SmsConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, config })
    }

    fn build_body<'a>(&'a self, recipient: &'a str, code: &str) -> anyhow::Result<PatternSmsReq<'a>> {
        // the gateway expects the code as a number inside the pattern params
        let code_num = code
            .parse::<u64>()
            .context("Verification code must be numeric")?;
        let mut params = HashMap::new();
        params.insert("verification-code", JsonValue::from(code_num));
        let body = PatternSmsReq {
            sending_type: SMS_SENDING_TYPE,
            from_number: &self.config.sender_number,
            code: &self.config.pattern_code,
            recipients: vec![recipient],
            params,
        };
        Ok(body)
    }
}

#[async_trait]
impl SmsSender for HttpSmsSender {
    async fn send(&self, recipient: &str, code: &str) -> anyhow::Result<()> {
        let body = self.build_body(recipient, code)?;
        let res = self
            .client
            .post(&self.config.api_url)
            .header(header::AUTHORIZATION, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("Request to SMS gateway failed")?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            tracing::error!("SMS gateway error ({status}): {text}");
            return Err(anyhow::anyhow!("SMS gateway returned status {status}"));
        }
        tracing::info!("SMS sent to {}. Status: {status}", mask_phone(recipient));
        Ok(())
    }
}

/// Sender for `SMS_DRY_RUN` deployments, nothing leaves the process
///
/// The code is dropped and the recipient is logged masked.
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, recipient: &str, _code: &str) -> anyhow::Result<()> {
        tracing::warn!("SMS dry run, code for {} was not delivered", mask_phone(recipient));
        Ok(())
    }
}
