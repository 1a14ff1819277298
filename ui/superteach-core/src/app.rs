//! The services behind the page, wired from configuration.

use std::sync::Arc;

use tracing::info;

use crate::balance::BalanceQuery;
use crate::config::AppConfig;
use crate::error::Result;
use crate::provider::{KeypairWallet, WalletProvider};
use crate::rpc::{HttpRpcClient, RpcClient};
use crate::session::{Session, SessionManager};
use crate::storage::{FileSessionStore, SessionStore};
use crate::transfer::{TransferExecutor, TransferOutcome, TransferRequest};
use crate::upload::{HttpFetcher, ResourceFetcher, StorageUploader, ThirdwebStorage, UploadExecutor, UploadResult};

pub struct Starter {
    config: AppConfig,
    session: SessionManager,
    balance: BalanceQuery,
    transfer: TransferExecutor,
    upload: UploadExecutor,
}

impl Starter {
    pub fn from_config(config: AppConfig) -> Self {
        info!(
            cluster = %config.cluster,
            rpc_url = %config.rpc_url,
            keypair = %config.keypair_path.display(),
            "starting services"
        );
        let wallet = Arc::new(KeypairWallet::new(&config.keypair_path));
        let rpc = Arc::new(HttpRpcClient::new(&config.rpc_url, config.confirm_timeout));
        let store = Arc::new(FileSessionStore::new(&config.storage_path));
        let fetcher = Arc::new(HttpFetcher::new());
        let uploader = Arc::new(ThirdwebStorage::new(
            &config.upload_endpoint,
            config.thirdweb_client_id.clone(),
            &config.ipfs_gateway,
        ));
        Self::with_services(config, wallet, rpc, store, fetcher, uploader)
    }

    pub fn with_services(
        config: AppConfig,
        wallet: Arc<dyn WalletProvider>,
        rpc: Arc<dyn RpcClient>,
        store: Arc<dyn SessionStore>,
        fetcher: Arc<dyn ResourceFetcher>,
        uploader: Arc<dyn StorageUploader>,
    ) -> Self {
        Self {
            session: SessionManager::new(wallet.clone(), store),
            balance: BalanceQuery::new(rpc.clone()),
            transfer: TransferExecutor::new(rpc, wallet, config.cluster),
            upload: UploadExecutor::new(fetcher, uploader),
            config,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn connect(&self) -> Result<Session> {
        self.session.connect().await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.session.disconnect().await
    }

    pub fn restore_session(&self) -> Result<Option<Session>> {
        self.session.restore_session()
    }

    pub async fn get_balance(&self, address: &str) -> Result<f64> {
        self.balance.fetch(address).await
    }

    pub async fn send_transaction(
        &self,
        owner: &str,
        request: &TransferRequest,
        last_known: f64,
    ) -> Result<TransferOutcome> {
        self.transfer.execute(owner, request, last_known).await
    }

    pub async fn upload_from_url(&self, source_url: &str) -> Result<UploadResult> {
        self.upload.execute(source_url).await
    }
}
