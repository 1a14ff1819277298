//! Wallet provider capability: connection and transaction signing.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use tracing::{debug, info};

use crate::error::{Result, WalletError};
use crate::transaction::{Pubkey, Transaction};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Whether the capability exists in this environment at all.
    fn is_available(&self) -> bool;

    async fn connect(&self) -> Result<Pubkey>;

    async fn disconnect(&self) -> Result<()>;

    /// Sign `tx` as its fee payer and hand it back.
    async fn sign_transaction(&self, tx: Transaction) -> Result<Transaction>;
}

/// Provider backed by a Solana CLI keypair file (a JSON array of 64 bytes).
pub struct KeypairWallet {
    path: PathBuf,
    signer: Mutex<Option<SigningKey>>,
}

impl KeypairWallet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            signer: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_signer<T>(&self, f: impl FnOnce(&mut Option<SigningKey>) -> T) -> Result<T> {
        let mut guard = self
            .signer
            .lock()
            .map_err(|_| WalletError::Signing("signer lock poisoned".into()))?;
        Ok(f(&mut guard))
    }
}

#[async_trait]
impl WalletProvider for KeypairWallet {
    fn is_available(&self) -> bool {
        self.path.is_file()
    }

    async fn connect(&self) -> Result<Pubkey> {
        if !self.is_available() {
            return Err(WalletError::ProviderUnavailable);
        }
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let signer = parse_keypair(&contents)?;
        let pubkey = Pubkey::new_from_array(signer.verifying_key().to_bytes());

        self.with_signer(|slot| *slot = Some(signer))?;
        info!(%pubkey, path = %self.path.display(), "keypair wallet connected");
        Ok(pubkey)
    }

    async fn disconnect(&self) -> Result<()> {
        self.with_signer(|slot| slot.take())?;
        debug!("keypair wallet disconnected");
        Ok(())
    }

    async fn sign_transaction(&self, mut tx: Transaction) -> Result<Transaction> {
        let (pubkey, signature) = self
            .with_signer(|slot| {
                slot.as_ref().map(|signer| {
                    (
                        Pubkey::new_from_array(signer.verifying_key().to_bytes()),
                        signer.sign(tx.message_data()).to_bytes(),
                    )
                })
            })?
            .ok_or(WalletError::NotConnected)?;

        tx.add_signature(&pubkey, signature)?;
        Ok(tx)
    }
}

fn parse_keypair(json: &str) -> Result<SigningKey> {
    let bytes: Vec<u8> = serde_json::from_str(json)?;
    let bytes: [u8; 64] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| WalletError::Signing(format!("keypair must be 64 bytes, got {}", b.len())))?;
    SigningKey::from_keypair_bytes(&bytes).map_err(|e| WalletError::Signing(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Hash;
    use ed25519_dalek::{Signature, Verifier};
    use std::io::Write;

    fn write_keypair(dir: &tempfile::TempDir, signer: &SigningKey) -> PathBuf {
        let path = dir.path().join("id.json");
        let bytes = signer.to_keypair_bytes().to_vec();
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(serde_json::to_string(&bytes).unwrap().as_bytes())
            .unwrap();
        path
    }

    #[tokio::test]
    async fn missing_keypair_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = KeypairWallet::new(dir.path().join("absent.json"));
        assert!(!wallet.is_available());
        assert!(matches!(
            wallet.connect().await,
            Err(WalletError::ProviderUnavailable)
        ));
    }

    #[tokio::test]
    async fn connect_then_sign_produces_valid_signature() {
        let dir = tempfile::tempdir().unwrap();
        let signer = SigningKey::from_bytes(&[7u8; 32]);
        let wallet = KeypairWallet::new(write_keypair(&dir, &signer));

        let pubkey = wallet.connect().await.unwrap();
        assert_eq!(pubkey.to_bytes(), signer.verifying_key().to_bytes());

        let to = Pubkey::new_from_array([2; 32]);
        let tx = Transaction::transfer(&pubkey, &to, 42, &Hash::new_from_array([1; 32]));
        let signed = wallet.sign_transaction(tx).await.unwrap();
        assert!(signed.is_signed());

        let wire = signed.serialize().unwrap();
        let signature = Signature::from_bytes(&wire[1..65].try_into().unwrap());
        signer
            .verifying_key()
            .verify(signed.message_data(), &signature)
            .unwrap();
    }

    #[tokio::test]
    async fn signing_requires_connection() {
        let dir = tempfile::tempdir().unwrap();
        let signer = SigningKey::from_bytes(&[9u8; 32]);
        let wallet = KeypairWallet::new(write_keypair(&dir, &signer));
        let from = Pubkey::new_from_array(signer.verifying_key().to_bytes());
        let tx = Transaction::transfer(&from, &from, 1, &Hash::new_from_array([0; 32]));

        assert!(matches!(
            wallet.sign_transaction(tx.clone()).await,
            Err(WalletError::NotConnected)
        ));

        wallet.connect().await.unwrap();
        wallet.disconnect().await.unwrap();
        assert!(matches!(
            wallet.sign_transaction(tx).await,
            Err(WalletError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn refuses_to_sign_for_another_payer() {
        let dir = tempfile::tempdir().unwrap();
        let signer = SigningKey::from_bytes(&[3u8; 32]);
        let wallet = KeypairWallet::new(write_keypair(&dir, &signer));
        wallet.connect().await.unwrap();

        let other = Pubkey::new_from_array([4; 32]);
        let tx = Transaction::transfer(&other, &other, 1, &Hash::new_from_array([0; 32]));
        assert!(matches!(
            wallet.sign_transaction(tx).await,
            Err(WalletError::Signing(_))
        ));
    }

    #[test]
    fn rejects_short_keypair() {
        let err = parse_keypair("[1,2,3]").unwrap_err();
        assert!(matches!(err, WalletError::Signing(_)));
        assert!(matches!(parse_keypair("{}"), Err(WalletError::JsonParse(_))));
    }
}
