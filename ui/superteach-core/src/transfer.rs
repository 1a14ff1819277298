//! SOL transfer: balance check, build, sign, submit, confirm.

use std::sync::Arc;

use tracing::{info, warn};

use crate::balance::{sol_to_lamports, BalanceQuery};
use crate::config::Cluster;
use crate::error::{Result, WalletError};
use crate::provider::WalletProvider;
use crate::rpc::{Commitment, RpcClient};
use crate::transaction::{Pubkey, Transaction};

const EXPLORER_BASE: &str = "https://explorer.solana.com";

#[derive(Clone, Debug, PartialEq)]
pub struct TransferRequest {
    pub destination: String,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferResult {
    pub signature: String,
    pub slot: Option<u64>,
    pub explorer_link: String,
}

/// A confirmed transfer plus the balance read right after it.
#[derive(Debug)]
pub struct TransferOutcome {
    pub result: TransferResult,
    pub balance: Result<f64>,
    /// The pre-send balance read failed and the check used the last known value.
    pub checked_stale_balance: bool,
}

pub fn explorer_link(signature: &str, cluster: Cluster) -> String {
    match cluster {
        Cluster::MainnetBeta => format!("{EXPLORER_BASE}/tx/{signature}"),
        other => format!("{EXPLORER_BASE}/tx/{signature}?cluster={other}"),
    }
}

pub struct TransferExecutor {
    rpc: Arc<dyn RpcClient>,
    wallet: Arc<dyn WalletProvider>,
    balance: BalanceQuery,
    cluster: Cluster,
    commitment: Commitment,
}

impl TransferExecutor {
    pub fn new(rpc: Arc<dyn RpcClient>, wallet: Arc<dyn WalletProvider>, cluster: Cluster) -> Self {
        Self {
            balance: BalanceQuery::new(rpc.clone()),
            rpc,
            wallet,
            cluster,
            commitment: Commitment::SingleGossip,
        }
    }

    /// Send `request.amount` SOL from `owner` to `request.destination`.
    ///
    /// The balance check is advisory: it uses a fresh read when one can be
    /// made (`last_known` otherwise) and is not atomic with the submission.
    pub async fn execute(
        &self,
        owner: &str,
        request: &TransferRequest,
        last_known: f64,
    ) -> Result<TransferOutcome> {
        let (available, checked_stale_balance) = match self.balance.fetch(owner).await {
            Ok(balance) => (balance, false),
            Err(e) => {
                warn!(error = %e, last_known, "balance refresh failed, using last known balance");
                (last_known, true)
            }
        };
        if request.amount > available {
            return Err(WalletError::InsufficientBalance {
                requested: request.amount,
                available,
            });
        }

        let lamports = sol_to_lamports(request.amount)?;
        let from: Pubkey = owner.parse()?;
        let to: Pubkey = request.destination.parse()?;

        let blockhash = self.rpc.get_latest_blockhash().await?;
        let tx = Transaction::transfer(&from, &to, lamports, &blockhash);

        let signed = self.wallet.sign_transaction(tx).await?;
        let signature = self.rpc.send_raw_transaction(&signed.serialize()?).await?;
        info!(%signature, lamports, %to, "transaction submitted");

        let confirmation = self
            .rpc
            .confirm_transaction(&signature, self.commitment)
            .await?;
        info!(%signature, slot = ?confirmation.slot, "transaction confirmed");

        let balance = self.balance.fetch(owner).await;
        if let Err(e) = &balance {
            warn!(error = %e, "balance refresh after transfer failed");
        }

        Ok(TransferOutcome {
            result: TransferResult {
                explorer_link: explorer_link(&signature, self.cluster),
                signature,
                slot: confirmation.slot,
            },
            balance,
            checked_stale_balance,
        })
    }
}
