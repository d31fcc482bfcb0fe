use redis::AsyncCommands;
use trustora_core::Chain;

use crate::error::KvError;

/// 500-block overlap tail applied to every regular scan, so a log that
/// straddles the previous scan's boundary is never missed
/// (`spec.md` §4.4).
pub const SCAN_OVERLAP_BLOCKS: u64 = 500;

/// Block depth re-scanned from scratch every [`RESCAN_INTERVAL_SECONDS`],
/// as a defense against an RPC provider silently skipping logs.
pub const DEEP_RESCAN_BLOCKS: u64 = 5000;

/// How often the deep rescan runs.
pub const RESCAN_INTERVAL_SECONDS: i64 = 300;

/// The `[from_block, to_block]` range one scan pass should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    pub from_block: u64,
    pub to_block: u64,
    pub is_deep_rescan: bool,
}

/// Computes the next scan range for `chain` and, if it's a deep
/// rescan, stamps `last_rescan`. Mirrors `original_source`'s
/// `scan_once` cursor arithmetic.
pub async fn next_scan_range(
    conn: &mut redis::aio::ConnectionManager,
    chain: Chain,
    latest_block: u64,
    now_unix: i64,
) -> Result<ScanRange, KvError> {
    let slug = chain.kv_slug();
    let last_block: u64 = conn
        .get::<_, Option<u64>>(format!("{slug}:last_block"))
        .await?
        .unwrap_or(0);
    let last_rescan: i64 = conn
        .get::<_, Option<i64>>(format!("{slug}:last_rescan"))
        .await?
        .unwrap_or(0);

    let is_deep_rescan = now_unix - last_rescan >= RESCAN_INTERVAL_SECONDS;
    let from_block = if is_deep_rescan {
        let _: () = conn.set(format!("{slug}:last_rescan"), now_unix).await?;
        latest_block.saturating_sub(DEEP_RESCAN_BLOCKS)
    } else {
        latest_block
            .saturating_sub(SCAN_OVERLAP_BLOCKS)
            .max(last_block + 1)
    };

    Ok(ScanRange { from_block, to_block: latest_block, is_deep_rescan })
}

/// Advances the persisted cursor after a scan pass completes.
pub async fn advance_cursor(
    conn: &mut redis::aio::ConnectionManager,
    chain: Chain,
    to_block: u64,
) -> Result<(), KvError> {
    let _: () = conn.set(format!("{}:last_block", chain.kv_slug()), to_block).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_match_spec() {
        assert_eq!(SCAN_OVERLAP_BLOCKS, 500);
        assert_eq!(DEEP_RESCAN_BLOCKS, 5000);
        assert_eq!(RESCAN_INTERVAL_SECONDS, 300);
    }
}
