//! JSON-RPC access to a Solana cluster.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, WalletError};
use crate::transaction::{Hash, Pubkey};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Confirmation depth requested from the cluster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
    /// Legacy alias of `Confirmed`.
    SingleGossip,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
            Self::SingleGossip => "singleGossip",
        }
    }

    /// Name sent on the wire. Current nodes reject the legacy aliases.
    fn rpc_name(&self) -> &'static str {
        match self {
            Self::SingleGossip => "confirmed",
            other => other.as_str(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Processed => 0,
            Self::Confirmed | Self::SingleGossip => 1,
            Self::Finalized => 2,
        }
    }

    /// Whether a reported `confirmationStatus` satisfies this level.
    pub fn is_reached_by(&self, confirmation_status: &str) -> bool {
        let reached = match confirmation_status {
            "processed" => 0,
            "confirmed" => 1,
            "finalized" => 2,
            _ => return false,
        };
        reached >= self.rank()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub slot: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmations: Option<u64>,
    pub err: Option<Value>,
    pub confirmation_status: Option<String>,
}

impl SignatureStatus {
    fn reaches(&self, commitment: Commitment) -> bool {
        match self.confirmation_status.as_deref() {
            Some(status) => commitment.is_reached_by(status),
            // Older nodes omit the status; no confirmation count means rooted.
            None => self.confirmations.is_none() || commitment == Commitment::Processed,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Balance in lamports.
    async fn get_balance(&self, address: &Pubkey) -> Result<u64>;

    async fn get_latest_blockhash(&self) -> Result<Hash>;

    /// Submit signed wire bytes; returns the transaction signature.
    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<String>;

    /// Wait until `signature` reaches `commitment`.
    async fn confirm_transaction(
        &self,
        signature: &str,
        commitment: Commitment,
    ) -> Result<Confirmation>;
}

pub struct HttpRpcClient {
    http: reqwest::Client,
    url: String,
    commitment: Commitment,
    confirm_timeout: Duration,
    next_request_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(url: impl Into<String>, confirm_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            commitment: Commitment::Confirmed,
            confirm_timeout,
            next_request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method, id, "rpc request");

        let text = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_response(&text)
    }

    async fn get_signature_status(&self, signature: &str) -> Result<Option<SignatureStatus>> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .call("getSignatureStatuses", json!([[signature]]))
            .await?;
        Ok(statuses.value.into_iter().next().flatten())
    }
}

#[async_trait]
impl RpcClient for HttpRpcClient {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        let balance: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), { "commitment": self.commitment.rpc_name() }]),
            )
            .await?;
        Ok(balance.value)
    }

    async fn get_latest_blockhash(&self) -> Result<Hash> {
        let latest: WithContext<BlockhashValue> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.rpc_name() }]),
            )
            .await?;
        debug!(
            blockhash = %latest.value.blockhash,
            last_valid_block_height = latest.value.last_valid_block_height,
            "fetched blockhash"
        );
        latest.value.blockhash.parse()
    }

    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<String> {
        self.call(
            "sendTransaction",
            json!([
                B64.encode(wire),
                { "encoding": "base64", "preflightCommitment": self.commitment.rpc_name() }
            ]),
        )
        .await
    }

    async fn confirm_transaction(
        &self,
        signature: &str,
        commitment: Commitment,
    ) -> Result<Confirmation> {
        let deadline = tokio::time::Instant::now() + self.confirm_timeout;
        while tokio::time::Instant::now() < deadline {
            tokio::time::sleep(POLL_INTERVAL).await;

            let Some(status) = self.get_signature_status(signature).await? else {
                continue;
            };
            if let Some(err) = status.err.as_ref().filter(|e| !e.is_null()) {
                return Err(WalletError::TransactionFailed(err.to_string()));
            }
            if status.reaches(commitment) {
                return Ok(Confirmation {
                    slot: Some(status.slot),
                });
            }
        }
        Err(WalletError::ConfirmationTimeout(signature.to_string()))
    }
}

#[derive(Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
    last_valid_block_height: u64,
}

fn parse_response<T: DeserializeOwned>(json: &str) -> Result<T> {
    let envelope: RpcEnvelope<T> = serde_json::from_str(json)?;
    if let Some(err) = envelope.error {
        return Err(WalletError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    envelope
        .result
        .ok_or_else(|| WalletError::JsonParse("missing result".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_balance_response() {
        let json = r#"{"jsonrpc":"2.0","result":{"context":{"slot":1},"value":2500000000},"id":1}"#;
        let balance: WithContext<u64> = parse_response(json).unwrap();
        assert_eq!(balance.value, 2_500_000_000);
    }

    #[test]
    fn parses_blockhash_response() {
        let json = r#"{"jsonrpc":"2.0","result":{"context":{"slot":2792},"value":{"blockhash":"EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N","lastValidBlockHeight":3090}},"id":1}"#;
        let latest: WithContext<BlockhashValue> = parse_response(json).unwrap();
        assert_eq!(latest.value.last_valid_block_height, 3090);
        assert!(latest.value.blockhash.parse::<Hash>().is_ok());
    }

    #[test]
    fn surfaces_rpc_errors() {
        let json = r#"{"jsonrpc":"2.0","error":{"code":-32002,"message":"Transaction simulation failed"},"id":1}"#;
        let err = parse_response::<String>(json).unwrap_err();
        match err {
            WalletError::Rpc { code, message } => {
                assert_eq!(code, -32002);
                assert_eq!(message, "Transaction simulation failed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_result_is_a_parse_error() {
        let err = parse_response::<String>(r#"{"jsonrpc":"2.0","id":1}"#).unwrap_err();
        assert!(matches!(err, WalletError::JsonParse(_)));
        let err = parse_response::<String>("not json").unwrap_err();
        assert!(matches!(err, WalletError::JsonParse(_)));
    }

    #[test]
    fn parses_signature_statuses() {
        let json = r#"{"jsonrpc":"2.0","result":{"context":{"slot":82},"value":[{"slot":72,"confirmations":10,"err":null,"status":{"Ok":null},"confirmationStatus":"confirmed"},null]},"id":1}"#;
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = parse_response(json).unwrap();
        let first = statuses.value[0].as_ref().unwrap();
        assert_eq!(first.slot, 72);
        assert!(first.err.is_none());
        assert!(first.reaches(Commitment::SingleGossip));
        assert!(!first.reaches(Commitment::Finalized));
        assert!(statuses.value[1].is_none());
    }

    #[test]
    fn single_gossip_is_confirmed() {
        assert_eq!(Commitment::SingleGossip.rpc_name(), "confirmed");
        assert!(!Commitment::SingleGossip.is_reached_by("processed"));
        assert!(Commitment::SingleGossip.is_reached_by("confirmed"));
        assert!(Commitment::SingleGossip.is_reached_by("finalized"));
        assert!(!Commitment::SingleGossip.is_reached_by("unknown"));
    }

    #[test]
    fn status_without_confirmation_status_falls_back_to_count() {
        let rooted = SignatureStatus {
            slot: 5,
            confirmations: None,
            err: None,
            confirmation_status: None,
        };
        assert!(rooted.reaches(Commitment::Finalized));

        let pending = SignatureStatus {
            confirmations: Some(1),
            ..rooted
        };
        assert!(!pending.reaches(Commitment::Confirmed));
        assert!(pending.reaches(Commitment::Processed));
    }
}
