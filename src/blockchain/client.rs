// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stacks chain client for the Hiro public API.

use reqwest::{header::CONTENT_TYPE, Client};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transaction::StacksTransaction;
use super::types::*;

/// Read/broadcast client for a Stacks node or Hiro API instance.
#[derive(Debug, Clone)]
pub struct HiroClient {
    base_url: String,
    http: Client,
}

impl HiroClient {
    /// Create a client against an explicit API base URL.
    pub fn new(base_url: &str, http: Client) -> Result<Self, StacksError> {
        let url: url::Url = base_url
            .parse()
            .map_err(|e: url::ParseError| StacksError::InvalidApiUrl(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StacksError::InvalidApiUrl(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Client for a network's default Hiro endpoint, unless overridden.
    pub fn for_network(
        network: Network,
        override_url: Option<&str>,
        http: Client,
    ) -> Result<Self, StacksError> {
        Self::new(override_url.unwrap_or(network.config().api_url), http)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Spendable STX balance in microSTX.
    pub async fn get_balance(&self, address: &str) -> Result<u64, StacksError> {
        let response: Value = self
            .get_json(&format!(
                "/extended/v1/address/{address}/balances?unanchored=true"
            ))
            .await?;
        let raw = response
            .pointer("/stx/balance")
            .and_then(Value::as_str)
            .or_else(|| response.get("balance").and_then(Value::as_str))
            .ok_or_else(|| {
                StacksError::InvalidResponse("Balance field missing in response".to_string())
            })?;
        raw.parse::<u64>()
            .map_err(|e| StacksError::InvalidResponse(format!("invalid balance `{raw}`: {e}")))
    }

    /// Next nonce for the account.
    pub async fn get_nonce(&self, address: &str) -> Result<u64, StacksError> {
        let account: AccountInfo = self.get_json(&format!("/v2/accounts/{address}")).await?;
        Ok(account.nonce)
    }

    /// Transaction history, as returned by the API.
    pub async fn get_transactions(&self, address: &str) -> Result<Vec<Value>, StacksError> {
        let response: Value = self
            .get_json(&format!("/extended/v2/addresses/{address}/transactions"))
            .await?;
        match response.get("results") {
            Some(Value::Array(results)) => Ok(results.clone()),
            _ => Err(StacksError::InvalidResponse(
                "Transactions field missing or invalid in response".to_string(),
            )),
        }
    }

    /// Network fee rate in microSTX per byte.
    pub async fn get_fee_rate(&self) -> Result<u64, StacksError> {
        let response: Value = self.get_json("/v2/fees/transfer").await?;
        let fee_rate = match &response {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        fee_rate
            .ok_or_else(|| StacksError::InvalidResponse(format!("invalid fee rate `{response}`")))
    }

    /// Submit a signed transaction.
    pub async fn broadcast(&self, tx: &StacksTransaction) -> Result<BroadcastResult, StacksError> {
        let response = self
            .http
            .post(format!("{}/v2/transactions", self.base_url))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(tx.serialize())
            .send()
            .await
            .map_err(|e| StacksError::Request(format!("POST /v2/transactions failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        parse_broadcast_response(status.is_success(), status.as_u16(), &body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StacksError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(|e| StacksError::Request(format!("GET {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StacksError::Request(format!(
                "HTTP error! status: {}, message: {body}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StacksError::InvalidResponse(format!("GET {path} invalid JSON: {e}")))
    }
}

fn parse_broadcast_response(
    success: bool,
    status: u16,
    body: &str,
) -> Result<BroadcastResult, StacksError> {
    let value: Option<Value> = serde_json::from_str(body).ok();

    if success {
        let txid = match &value {
            Some(Value::String(txid)) => txid.clone(),
            // some node versions answer with the bare txid
            None if !body.trim().is_empty() => body.trim().trim_matches('"').to_string(),
            _ => {
                return Err(StacksError::InvalidResponse(format!(
                    "unexpected broadcast response: {body}"
                )))
            }
        };
        return Ok(BroadcastResult::Accepted {
            txid: normalize_txid(&txid),
        });
    }

    match value {
        Some(Value::Object(map)) if map.contains_key("error") => Ok(BroadcastResult::Rejected {
            txid: map.get("txid").and_then(Value::as_str).map(normalize_txid),
            error: map
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("transaction rejected")
                .to_string(),
            reason: map.get("reason").and_then(Value::as_str).map(str::to_string),
            reason_data: map.get("reason_data").cloned(),
        }),
        _ => Err(StacksError::Request(format!(
            "HTTP error! status: {status}, message: {body}"
        ))),
    }
}

fn normalize_txid(txid: &str) -> String {
    if txid.starts_with("0x") {
        txid.to_string()
    } else {
        format!("0x{txid}")
    }
}

/// Errors that can occur during Stacks operations.
#[derive(Debug, thiserror::Error)]
pub enum StacksError {
    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid Clarity value: {0}")]
    InvalidClarityValue(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signature does not recover to the sender public key")]
    SignatureMismatch,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> HiroClient {
        HiroClient::new(&server.uri(), Client::new()).unwrap()
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(HiroClient::new("ftp://example.com", Client::new()).is_err());
        assert!(HiroClient::new("not a url", Client::new()).is_err());
    }

    #[test]
    fn network_default_url_is_used_without_override() {
        let client = HiroClient::for_network(Network::Mainnet, None, Client::new()).unwrap();
        assert_eq!(client.base_url(), "https://api.mainnet.hiro.so");

        let client =
            HiroClient::for_network(Network::Mainnet, Some("http://localhost:3999/"), Client::new())
                .unwrap();
        assert_eq!(client.base_url(), "http://localhost:3999");
    }

    #[tokio::test]
    async fn balance_reads_stx_then_top_level() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/extended/v1/address/ST1/balances"))
            .and(query_param("unanchored", "true"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "stx": { "balance": "1000" } })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/extended/v1/address/ST2/balances"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "balance": "77" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.get_balance("ST1").await.unwrap(), 1000);
        assert_eq!(client.get_balance("ST2").await.unwrap(), 77);
    }

    #[tokio::test]
    async fn missing_balance_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_balance("ST1").await.unwrap_err();
        assert!(err.to_string().contains("Balance field missing"));
    }

    #[tokio::test]
    async fn nonce_accepts_number_or_string() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/accounts/ST1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "nonce": 4, "balance": "0x0" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/accounts/ST2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "nonce": "9" })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.get_nonce("ST1").await.unwrap(), 4);
        assert_eq!(client.get_nonce("ST2").await.unwrap(), 9);
    }

    #[tokio::test]
    async fn http_errors_carry_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_fee_rate().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Request failed: HTTP error! status: 503, message: down"
        );
    }

    #[tokio::test]
    async fn fee_rate_and_transactions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/fees/transfer"))
            .respond_with(ResponseTemplate::new(200).set_body_string("2"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/extended/v2/addresses/ST1/transactions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "results": [{ "tx": { "tx_id": "0x01" } }], "total": 1 }),
            ))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.get_fee_rate().await.unwrap(), 2);
        let txs = client.get_transactions("ST1").await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0]["tx"]["tx_id"], "0x01");
    }

    #[tokio::test]
    async fn broadcast_posts_octet_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/transactions"))
            .and(header("content-type", "application/octet-stream"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("abcd")))
            .expect(1)
            .mount(&server)
            .await;

        let public_key = {
            use k256::elliptic_curve::sec1::ToEncodedPoint;
            let public = k256::SecretKey::from_slice(&[1u8; 32]).unwrap().public_key();
            hex::encode(public.to_encoded_point(true).as_bytes())
        };
        let tx = StacksTransaction::unsigned_token_transfer(
            crate::blockchain::transaction::TokenTransferOptions {
                recipient: "ST2J6ZY48GV1EZ5V2V5RB9MP66SW86PYKKQYAC0RQ",
                amount: 1,
                memo: None,
                public_key: &public_key,
                nonce: 0,
                fee: 0,
                network: Network::Testnet,
            },
        )
        .unwrap();

        let result = client_for(&server).await.broadcast(&tx).await.unwrap();
        assert_eq!(
            result,
            BroadcastResult::Accepted {
                txid: "0xabcd".to_string()
            }
        );
    }

    #[test]
    fn rejected_broadcast_is_parsed() {
        let body = r#"{"error":"transaction rejected","reason":"NotEnoughFunds","reason_data":{"expected":"0x10"},"txid":"ff"}"#;
        let result = parse_broadcast_response(false, 400, body).unwrap();
        match result {
            BroadcastResult::Rejected {
                txid,
                reason,
                reason_data,
                ..
            } => {
                assert_eq!(txid.as_deref(), Some("0xff"));
                assert_eq!(reason.as_deref(), Some("NotEnoughFunds"));
                assert!(reason_data.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unstructured_failure_is_an_error() {
        assert!(parse_broadcast_response(false, 500, "boom").is_err());
    }
}
