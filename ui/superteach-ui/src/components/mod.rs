pub mod balance;
pub mod connection_status;
pub mod ipfs_upload;
pub mod layout;
pub mod send_sol;
pub mod toaster;
