//! Chain-facing plumbing: address format validation, a retrying
//! JSON-RPC client, and the [`backend::ChainBackend`] trait with a
//! Tron and a BNB Smart Chain implementation behind it.

pub mod address;
pub mod backend;
pub mod bsc;
pub mod error;
pub mod rpc;
pub mod tron;

pub use address::validate_address;
pub use backend::{ChainBackend, TransferEvent};
pub use bsc::BscBackend;
pub use error::ChainError;
pub use rpc::RpcClient;
pub use tron::TronBackend;
