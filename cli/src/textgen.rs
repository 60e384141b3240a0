use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use personalfit_core::meal_plan::{GenerateError, RetryPolicy, accept_generated};

/// Client for the remote meal-plan text generator.
pub struct TextGenClient {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    text: String,
}

impl TextGenClient {
    pub fn new(url: &str, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "personalfit-cli/{} (nutrition tracker)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
            api_key,
        })
    }

    /// One request, no retries.
    pub async fn generate_once(&self, prompt: &str) -> Result<String, GenerateError> {
        let mut request = self.client.post(&self.url).json(&GenerateRequest { prompt });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| GenerateError::Transient(e.to_string()))?;
        let status = resp.status();
        tracing::debug!(%status, "text generation response");
        if !status.is_success() {
            return Err(GenerateError::from_status(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| GenerateError::Transient(e.to_string()))?;
        accept_generated(&extract_text(&body))
    }

    pub async fn generate(
        &self,
        prompt: &str,
        policy: &RetryPolicy,
    ) -> Result<String, GenerateError> {
        retry_generate(policy, move |_| self.generate_once(prompt)).await
    }
}

/// Pull `text` out of a JSON reply, or take the body as-is.
fn extract_text(body: &str) -> String {
    match serde_json::from_str::<GenerateResponse>(body) {
        Ok(parsed) => parsed.text,
        Err(_) => body.to_string(),
    }
}

/// Run `op` until it succeeds, fails permanently, or runs out of attempts.
/// `op` receives the 1-based attempt number.
pub async fn retry_generate<F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<String, GenerateError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<String, GenerateError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "text generation failed ({e}) - retry {attempt}/{max_attempts} after {}ms",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
