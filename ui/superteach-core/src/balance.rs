use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, WalletError};
use crate::rpc::RpcClient;
use crate::transaction::Pubkey;

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Convert a SOL amount from the form into lamports, rounding to the
/// nearest lamport.
pub fn sol_to_lamports(sol: f64) -> Result<u64> {
    if !sol.is_finite() || sol <= 0.0 {
        return Err(WalletError::InvalidAmount(sol.to_string()));
    }
    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if lamports < 1.0 || lamports > u64::MAX as f64 {
        return Err(WalletError::InvalidAmount(sol.to_string()));
    }
    Ok(lamports as u64)
}

pub struct BalanceQuery {
    rpc: Arc<dyn RpcClient>,
}

impl BalanceQuery {
    pub fn new(rpc: Arc<dyn RpcClient>) -> Self {
        Self { rpc }
    }

    /// Confirmed balance of `address`, in SOL.
    pub async fn fetch(&self, address: &str) -> Result<f64> {
        let pubkey: Pubkey = address.parse()?;
        let lamports = self.rpc.get_balance(&pubkey).await?;
        debug!(%pubkey, lamports, "fetched balance");
        Ok(lamports_to_sol(lamports))
    }
}
