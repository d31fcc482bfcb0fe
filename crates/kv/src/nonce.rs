use redis::AsyncCommands;

use crate::error::KvError;

/// Replay TTL for a consumed nonce, per `spec.md` §4.7.
pub const NONCE_TTL_SECONDS: u64 = trustora_core::security::NONCE_TTL_SECONDS;

/// Claims `nonce` for single use: `SETNX nonce:{nonce} 1` followed by
/// an `EXPIRE`, matching `original_source`'s `verify_nonce`. Returns
/// [`KvError::ReplayDetected`] if the nonce was already claimed.
pub async fn claim_nonce(
    conn: &mut redis::aio::ConnectionManager,
    nonce: &str,
) -> Result<(), KvError> {
    let key = format!("nonce:{nonce}");
    let claimed: bool = conn.set_nx(&key, "1").await?;
    if !claimed {
        return Err(KvError::ReplayDetected);
    }
    let _: () = conn.expire(&key, NONCE_TTL_SECONDS as i64).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn ttl_matches_core_constant() {
        assert_eq!(super::NONCE_TTL_SECONDS, 120);
    }
}
