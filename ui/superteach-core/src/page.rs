//! View state of the single page and the transitions each flow result
//! applies to it. Every transition is where errors stop: the detail is
//! logged and a generic notice comes back for the toaster.

use tracing::error;

use crate::balance::lamports_to_sol;
use crate::error::{Result, WalletError};
use crate::session::Session;
use crate::transfer::{TransferOutcome, TransferRequest, TransferResult};
use crate::upload::UploadResult;

pub const UPLOADING_STATUS: &str = "Uploading to IPFS...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

fn balance_failure() -> Notice {
    Notice::error("Something went wrong getting the balance")
}

#[derive(Clone, Debug, PartialEq)]
pub struct PageState {
    pub session: Option<Session>,
    /// Balance in SOL; kept as-is when a refresh fails.
    pub balance: f64,
    pub destination: String,
    pub amount: f64,
    pub last_transfer: Option<TransferResult>,
    pub explorer_link: Option<String>,
    pub upload_url: Option<String>,
    pub status_text: String,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            session: None,
            balance: lamports_to_sol(0),
            destination: String::new(),
            amount: 0.0,
            last_transfer: None,
            explorer_link: None,
            upload_url: None,
            status_text: String::new(),
        }
    }
}

impl PageState {
    pub fn address(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.address.as_str())
    }

    pub fn transfer_request(&self) -> TransferRequest {
        TransferRequest {
            destination: self.destination.clone(),
            amount: self.amount,
        }
    }

    /// Balance as shown on the page.
    pub fn balance_display(&self) -> String {
        format!("{}", self.balance)
    }

    /// Returns whether a session was restored and needs its balance.
    pub fn apply_restore(&mut self, restored: Result<Option<Session>>) -> bool {
        match restored {
            Ok(Some(session)) => {
                self.session = Some(session);
                self.explorer_link = None;
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!(error = %e, "restoring session failed");
                false
            }
        }
    }

    pub fn apply_connect(&mut self, connected: Result<Session>) -> Notice {
        match connected {
            Ok(session) => {
                self.session = Some(session);
                Notice::success("Connected to wallet")
            }
            Err(WalletError::ProviderUnavailable) => Notice::error("Wallet provider is not installed"),
            Err(e) => {
                error!(error = %e, "connect failed");
                Notice::error("Something went wrong connecting the wallet")
            }
        }
    }

    pub fn apply_disconnect(&mut self, disconnected: Result<()>) -> Notice {
        match disconnected {
            Ok(()) => {
                *self = Self::default();
                Notice::success("Disconnected from wallet")
            }
            Err(WalletError::ProviderUnavailable) => Notice::error("Wallet provider is not installed"),
            Err(e) => {
                error!(error = %e, "disconnect failed");
                Notice::error("Something went wrong disconnecting the wallet")
            }
        }
    }

    /// Successful refreshes are silent.
    pub fn apply_balance(&mut self, balance: Result<f64>) -> Option<Notice> {
        match balance {
            Ok(sol) => {
                self.balance = sol;
                None
            }
            Err(e) => {
                error!(error = %e, "get balance failed");
                Some(balance_failure())
            }
        }
    }

    /// Notices in display order: the transfer result first, then a balance
    /// failure if any read made during the transfer failed.
    pub fn apply_transfer(&mut self, outcome: Result<TransferOutcome>) -> Vec<Notice> {
        match outcome {
            Ok(TransferOutcome {
                result,
                balance,
                checked_stale_balance,
            }) => {
                let mut notices = vec![match result.slot {
                    Some(slot) => Notice::success(format!("Transaction sent successfully in slot {slot}")),
                    None => Notice::success("Transaction sent successfully"),
                }];
                self.explorer_link = Some(result.explorer_link.clone());
                self.last_transfer = Some(result);
                self.amount = 0.0;
                self.destination.clear();

                let refreshed = self.apply_balance(balance);
                match refreshed {
                    Some(notice) => notices.push(notice),
                    None if checked_stale_balance => notices.push(balance_failure()),
                    None => {}
                }
                notices
            }
            Err(WalletError::InsufficientBalance { requested, available }) => {
                error!(requested, available, "insufficient balance");
                vec![Notice::error("You don't have enough SOL to send")]
            }
            Err(e) => {
                error!(error = %e, "send transaction failed");
                vec![Notice::error("Something went wrong sending the transaction")]
            }
        }
    }

    pub fn begin_upload(&mut self) {
        self.status_text = UPLOADING_STATUS.to_string();
    }

    pub fn apply_upload(&mut self, uploaded: Result<UploadResult>) -> Option<Notice> {
        match uploaded {
            Ok(UploadResult { content_url }) => {
                self.status_text = format!("Your file URL is: {content_url}");
                self.upload_url = Some(content_url);
                None
            }
            Err(e) => {
                error!(error = %e, "upload to IPFS failed");
                self.status_text.clear();
                Some(Notice::error("Something went wrong uploading to IPFS"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> PageState {
        PageState {
            session: Some(Session {
                address: "Owner111".into(),
            }),
            balance: 10.0,
            destination: "Dest111".into(),
            amount: 1.0,
            ..PageState::default()
        }
    }

    fn outcome(slot: Option<u64>, balance: Result<f64>) -> TransferOutcome {
        TransferOutcome {
            result: TransferResult {
                signature: "5Sig".into(),
                slot,
                explorer_link: "https://explorer.solana.com/tx/5Sig?cluster=devnet".into(),
            },
            balance,
            checked_stale_balance: false,
        }
    }

    #[test]
    fn zero_balance_displays_zero() {
        assert_eq!(PageState::default().balance_display(), "0");
        let page = PageState {
            balance: lamports_to_sol(1_500_000_000),
            ..PageState::default()
        };
        assert_eq!(page.balance_display(), "1.5");
    }

    #[test]
    fn successful_transfer_resets_form_and_refreshes_balance() {
        let mut page = connected();
        let notices = page.apply_transfer(Ok(outcome(Some(77), Ok(9.0))));

        assert_eq!(notices, vec![Notice::success("Transaction sent successfully in slot 77")]);
        assert_eq!(page.amount, 0.0);
        assert_eq!(page.destination, "");
        assert_eq!(page.balance, 9.0);
        assert_eq!(
            page.explorer_link.as_deref(),
            Some("https://explorer.solana.com/tx/5Sig?cluster=devnet")
        );
        assert_eq!(page.last_transfer.as_ref().unwrap().signature, "5Sig");
    }

    #[test]
    fn failed_transfer_leaves_state_untouched() {
        let mut page = connected();
        let before = page.clone();

        let notices = page.apply_transfer(Err(WalletError::InsufficientBalance {
            requested: 5.0,
            available: 2.0,
        }));
        assert_eq!(notices, vec![Notice::error("You don't have enough SOL to send")]);
        assert_eq!(page, before);

        let notices = page.apply_transfer(Err(WalletError::Signing("rejected".into())));
        assert_eq!(
            notices,
            vec![Notice::error("Something went wrong sending the transaction")]
        );
        assert_eq!(page, before);
    }

    #[test]
    fn transfer_with_failed_refresh_reports_both() {
        let mut page = connected();
        let notices = page.apply_transfer(Ok(outcome(
            Some(3),
            Err(WalletError::Rpc {
                code: -32005,
                message: "node is behind".into(),
            }),
        )));

        assert_eq!(
            notices,
            vec![
                Notice::success("Transaction sent successfully in slot 3"),
                Notice::error("Something went wrong getting the balance"),
            ]
        );
        assert_eq!(page.balance, 10.0);
        assert_eq!(page.amount, 0.0);
        assert!(page.explorer_link.is_some());
    }

    #[test]
    fn transfer_checked_against_stale_balance_reports_it() {
        let mut page = connected();
        let mut sent = outcome(Some(3), Ok(9.0));
        sent.checked_stale_balance = true;

        let notices = page.apply_transfer(Ok(sent));
        assert_eq!(notices.len(), 2);
        assert!(!notices[0].is_error());
        assert_eq!(notices[1], Notice::error("Something went wrong getting the balance"));
        assert_eq!(page.balance, 9.0);
    }

    #[test]
    fn failed_balance_refresh_keeps_previous_value() {
        let mut page = connected();
        assert!(page.apply_balance(Ok(4.25)).is_none());
        assert_eq!(page.balance, 4.25);

        let notice = page
            .apply_balance(Err(WalletError::JsonParse("bad".into())))
            .unwrap();
        assert!(notice.is_error());
        assert_eq!(page.balance, 4.25);
    }

    #[test]
    fn absent_provider_does_not_mutate_state() {
        let mut page = PageState::default();
        let notice = page.apply_connect(Err(WalletError::ProviderUnavailable));
        assert_eq!(notice, Notice::error("Wallet provider is not installed"));
        assert_eq!(page, PageState::default());
    }

    #[test]
    fn connect_and_disconnect_toggle_session() {
        let mut page = PageState::default();
        let notice = page.apply_connect(Ok(Session {
            address: "Owner111".into(),
        }));
        assert!(!notice.is_error());
        assert_eq!(page.address(), Some("Owner111"));

        let notice = page.apply_disconnect(Ok(()));
        assert!(!notice.is_error());
        assert!(page.session.is_none());
    }

    #[test]
    fn disconnect_clears_previous_wallet_results() {
        let mut page = connected();
        page.apply_transfer(Ok(outcome(Some(77), Ok(9.0))));
        page.begin_upload();
        page.apply_upload(Ok(UploadResult {
            content_url: "https://ipfs.io/ipfs/QmCid".into(),
        }));

        page.apply_disconnect(Ok(()));
        assert_eq!(page, PageState::default());

        let mut still_connected = connected();
        let before = still_connected.clone();
        still_connected.apply_disconnect(Err(WalletError::ProviderUnavailable));
        assert_eq!(still_connected, before);
    }

    #[test]
    fn restore_clears_stale_explorer_link() {
        let mut page = PageState {
            explorer_link: Some("https://explorer.solana.com/tx/old?cluster=devnet".into()),
            ..PageState::default()
        };
        assert!(page.apply_restore(Ok(Some(Session {
            address: "Owner111".into(),
        }))));
        assert_eq!(page.address(), Some("Owner111"));
        assert!(page.explorer_link.is_none());

        let mut empty = PageState::default();
        assert!(!empty.apply_restore(Ok(None)));
        assert_eq!(empty, PageState::default());
    }

    #[test]
    fn upload_failure_leaves_url_unset() {
        let mut page = connected();
        page.begin_upload();
        assert_eq!(page.status_text, UPLOADING_STATUS);

        let notice = page
            .apply_upload(Err(WalletError::Upload("fetch failed".into())))
            .unwrap();
        assert_eq!(notice, Notice::error("Something went wrong uploading to IPFS"));
        assert!(page.upload_url.is_none());
        assert!(page.status_text.is_empty());
    }

    #[test]
    fn upload_success_records_content_url() {
        let mut page = connected();
        page.begin_upload();
        assert!(page
            .apply_upload(Ok(UploadResult {
                content_url: "https://ipfs.io/ipfs/QmCid".into(),
            }))
            .is_none());
        assert_eq!(page.upload_url.as_deref(), Some("https://ipfs.io/ipfs/QmCid"));
        assert_eq!(page.status_text, "Your file URL is: https://ipfs.io/ipfs/QmCid");
    }
}
