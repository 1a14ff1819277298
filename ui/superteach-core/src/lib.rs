//! Core of the Superteach starter page: wallet session, balance lookup,
//! SOL transfer and IPFS upload against a Solana cluster.
//!
//! External collaborators (wallet, RPC, storage upload, local storage) sit
//! behind traits so the flows can run against real services or mocks.

pub mod app;
pub mod balance;
pub mod config;
pub mod error;
pub mod logging;
pub mod page;
pub mod provider;
pub mod rpc;
pub mod session;
pub mod storage;
pub mod transaction;
pub mod transfer;
pub mod upload;

pub use app::Starter;
pub use config::{AppConfig, Cluster};
pub use error::{Result, WalletError};
pub use logging::init_logging;
pub use page::{Notice, NoticeKind, PageState};
pub use session::{install_redirect, Launcher, Session};
