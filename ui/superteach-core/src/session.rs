//! Wallet session: connect, disconnect, and restore from local storage.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Result, WalletError};
use crate::provider::WalletProvider;
use crate::storage::SessionStore;

/// Local storage key holding the connected address.
pub const SESSION_KEY: &str = "publicKey";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub address: String,
}

/// Opens external URLs, e.g. the wallet installation page.
pub trait Launcher: Send + Sync {
    fn open(&self, url: &str);
}

pub struct SessionManager {
    wallet: Arc<dyn WalletProvider>,
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(wallet: Arc<dyn WalletProvider>, store: Arc<dyn SessionStore>) -> Self {
        Self { wallet, store }
    }

    pub async fn connect(&self) -> Result<Session> {
        if !self.wallet.is_available() {
            warn!("wallet provider not available");
            return Err(WalletError::ProviderUnavailable);
        }
        let address = self.wallet.connect().await?.to_string();
        self.store.set(SESSION_KEY, &address)?;
        info!(%address, "session started");
        Ok(Session { address })
    }

    pub async fn disconnect(&self) -> Result<()> {
        if !self.wallet.is_available() {
            warn!("wallet provider not available");
            return Err(WalletError::ProviderUnavailable);
        }
        self.wallet.disconnect().await?;
        self.store.remove(SESSION_KEY)?;
        info!("session ended");
        Ok(())
    }

    /// Persisted session from a previous run, if any.
    pub fn restore_session(&self) -> Result<Option<Session>> {
        Ok(self
            .store
            .get(SESSION_KEY)?
            .filter(|address| !address.is_empty())
            .map(|address| Session { address }))
    }
}

/// Wait `delay`, then send the user to the installation page.
pub async fn install_redirect(launcher: Arc<dyn Launcher>, url: String, delay: Duration) {
    tokio::time::sleep(delay).await;
    info!(%url, "opening wallet installation page");
    launcher.open(&url);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockWalletProvider;
    use crate::storage::MemorySessionStore;
    use crate::transaction::Pubkey;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLauncher {
        opened: Mutex<Vec<String>>,
    }

    impl Launcher for RecordingLauncher {
        fn open(&self, url: &str) {
            self.opened.lock().unwrap().push(url.to_string());
        }
    }

    fn connected_wallet() -> MockWalletProvider {
        let mut wallet = MockWalletProvider::new();
        wallet.expect_is_available().return_const(true);
        wallet
            .expect_connect()
            .returning(|| Ok(Pubkey::new_from_array([1; 32])));
        wallet.expect_disconnect().returning(|| Ok(()));
        wallet
    }

    #[tokio::test]
    async fn connect_persists_address() {
        let store = Arc::new(MemorySessionStore::new());
        let manager = SessionManager::new(Arc::new(connected_wallet()), store.clone());

        let session = manager.connect().await.unwrap();
        assert_eq!(session.address, Pubkey::new_from_array([1; 32]).to_string());
        assert_eq!(
            store.get(SESSION_KEY).unwrap().as_deref(),
            Some(session.address.as_str())
        );
    }

    #[tokio::test]
    async fn restore_then_disconnect_clears_storage() {
        let store = Arc::new(MemorySessionStore::new());
        store.set(SESSION_KEY, "SomeAddress").unwrap();
        let manager = SessionManager::new(Arc::new(connected_wallet()), store.clone());

        let restored = manager.restore_session().unwrap();
        assert_eq!(
            restored,
            Some(Session {
                address: "SomeAddress".into()
            })
        );

        manager.disconnect().await.unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn restore_without_persisted_address_is_empty() {
        let manager = SessionManager::new(
            Arc::new(MockWalletProvider::new()),
            Arc::new(MemorySessionStore::new()),
        );
        assert_eq!(manager.restore_session().unwrap(), None);
    }

    #[tokio::test]
    async fn absent_provider_never_touches_storage() {
        let mut wallet = MockWalletProvider::new();
        wallet.expect_is_available().return_const(false);
        wallet.expect_connect().never();
        wallet.expect_disconnect().never();
        let store = Arc::new(MemorySessionStore::new());
        let manager = SessionManager::new(Arc::new(wallet), store.clone());

        assert!(matches!(
            manager.connect().await,
            Err(WalletError::ProviderUnavailable)
        ));
        assert!(matches!(
            manager.disconnect().await,
            Err(WalletError::ProviderUnavailable)
        ));
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn install_redirect_waits_before_opening() {
        let launcher = Arc::new(RecordingLauncher::default());
        let task = tokio::spawn(install_redirect(
            launcher.clone(),
            "https://example.com/install".into(),
            Duration::from_secs(2),
        ));

        tokio::time::sleep(Duration::from_millis(1_900)).await;
        assert!(launcher.opened.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        task.await.unwrap();
        assert_eq!(
            *launcher.opened.lock().unwrap(),
            vec!["https://example.com/install".to_string()]
        );
    }
}
