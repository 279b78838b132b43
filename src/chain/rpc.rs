use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
    chain::{Address, TokenSource, abi},
    foundation::error::{CitizenError, CitizenResult},
};

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcError>,
}

/// `eth_call` over JSON-RPC (HTTP).
#[derive(Clone, Debug)]
pub struct RpcTokenSource {
    http: reqwest::Client,
    endpoint: String,
}

impl RpcTokenSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn eth_call(&self, to: Address, data: String) -> CitizenResult<String> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": [{ "to": to.to_string(), "data": data }, "latest"],
        });

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| CitizenError::chain(format!("rpc request: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(CitizenError::chain(format!("rpc status {status}: {text}")));
        }

        let parsed: RpcResponse = resp
            .json()
            .await
            .map_err(|e| CitizenError::chain(format!("rpc response: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(CitizenError::chain(format!(
                "rpc error {}: {}",
                err.code, err.message
            )));
        }
        parsed
            .result
            .ok_or_else(|| CitizenError::chain("rpc response has no result"))
    }
}

#[async_trait]
impl TokenSource for RpcTokenSource {
    async fn token_uri(&self, contract: Address, id: u64) -> CitizenResult<String> {
        debug!(%contract, id, "eth_call tokenURI");
        let result = self
            .eth_call(contract, abi::encode_token_uri_call(id))
            .await?;
        abi::decode_string_return(&result)
    }
}
