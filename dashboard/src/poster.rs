//! # poster: one-shot POST of a user action to the market server

use anyhow::{bail, Context};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Config;

/// POST `body` to `/api/{endpoint}`. Succeeds only when the server answers
/// with `"success": true`; the response body is returned for display.
pub async fn post_action(
    client: &reqwest::Client,
    config: &Config,
    endpoint: &str,
    body: &Value,
) -> anyhow::Result<Value> {
    let url = config.endpoint(endpoint);
    debug!(url = %url, body = %body, "Posting action...");

    let mut req = client.post(&url).json(body).timeout(config.request_timeout);
    if let Some(key) = &config.api_key {
        req = req.header("X-API-Key", key);
    }

    let resp = req.send().await.context("Market server unreachable")?;
    let status = resp.status();
    let reply: Value = resp.json().await.unwrap_or_default();

    if !accepted(&reply) {
        let reason = reply.get("error").and_then(Value::as_str).unwrap_or("no reason given");
        bail!("server rejected {endpoint}: HTTP {status}: {reason}");
    }

    info!(endpoint, response = %reply, "Action accepted ✅");
    Ok(reply)
}

fn accepted(reply: &Value) -> bool {
    reply.get("success").and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_explicit_success_is_accepted() {
        assert!(accepted(&json!({ "success": true, "amount_out": 9.9 })));
        assert!(!accepted(&json!({ "success": false, "error": "nope" })));
        assert!(!accepted(&json!({ "amount_out": 9.9 })));
        assert!(!accepted(&Value::Null));
    }
}
