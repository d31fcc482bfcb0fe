//! Redis-backed coordination shared by the coordinator, watcher, and
//! signer processes: nonce replay, payout rate limits, per-chain scan
//! cursors, and the UX double-tap confirmation gates.
//!
//! Every function here takes a borrowed `&mut ConnectionManager`
//! rather than owning a client, so callers can share one reconnecting
//! connection across the life of a process.

pub mod cursor;
pub mod error;
pub mod gates;
pub mod limits;
pub mod nonce;

pub use error::KvError;

/// Opens a reconnecting Redis connection manager against `redis_url`.
pub async fn connect(redis_url: &str) -> Result<redis::aio::ConnectionManager, KvError> {
    let client = redis::Client::open(redis_url)?;
    let manager = client.get_connection_manager().await?;
    Ok(manager)
}
