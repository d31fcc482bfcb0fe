use chrono::Utc;
use trustora_chain::ChainBackend;
use trustora_core::deposit::deposit_status_sequence;
use trustora_core::idempotency::can_record_deposit;
use trustora_core::{amount, Chain};
use trustora_db::PgPool;

use crate::settings::ChainSettings;

/// One scan pass: computes the block range to cover, loads every open
/// escrow on `chain`, matches observed transfer events against their
/// deposit addresses, and reconciles confirmed ones. Mirrors
/// `original_source`'s `scan_once`.
pub async fn scan_once(
    chain: Chain,
    settings: &ChainSettings,
    pool: &PgPool,
    redis: &mut redis::aio::ConnectionManager,
    backend: &dyn ChainBackend,
) -> anyhow::Result<()> {
    let latest_block = backend.latest_block().await?;
    let range = trustora_kv::cursor::next_scan_range(redis, chain, latest_block, Utc::now().timestamp())
        .await?;

    let mut conn = pool.acquire().await?;
    let escrows = trustora_db::repo::escrow::list_awaiting_deposit(&mut conn, chain).await?;
    drop(conn);

    if escrows.is_empty() {
        trustora_kv::cursor::advance_cursor(redis, chain, range.to_block).await?;
        return Ok(());
    }

    let events =
        backend.transfer_events(&settings.usdt_contract, range.from_block, range.to_block).await?;

    for event in events {
        let Some(escrow) = escrows.iter().find(|e| e.deposit_address == event.to_address) else {
            continue;
        };
        let confirmations = latest_block.saturating_sub(event.block_number);
        if confirmations < settings.confirmations_required {
            continue;
        }
        let received = amount::from_micro_units(event.amount_micro_units);
        reconcile_deposit(
            pool,
            escrow.id,
            &event.tx_hash,
            received,
            confirmations as i32,
        )
        .await?;
    }

    trustora_kv::cursor::advance_cursor(redis, chain, range.to_block).await?;
    Ok(())
}

/// Records a reconciled deposit and drives the escrow through
/// `DEPOSIT_SEEN` then `FUNDS_LOCKED`/`UNDERPAID`/`OVERPAID_REVIEW`,
/// under one row-locked transaction, mirroring `original_source`'s
/// `update_escrow`.
async fn reconcile_deposit(
    pool: &PgPool,
    escrow_id: uuid::Uuid,
    tx_hash: &str,
    amount_received: rust_decimal::Decimal,
    confirmations: i32,
) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    let mut escrow = trustora_db::repo::escrow::get_escrow_for_update(&mut tx, escrow_id).await?;
    if !can_record_deposit(&escrow, tx_hash) {
        tx.commit().await?;
        return Ok(());
    }
    trustora_db::repo::escrow::record_deposit(&mut tx, escrow_id, tx_hash, amount_received, confirmations)
        .await?;
    for status in deposit_status_sequence(amount_received, escrow.amount_expected) {
        trustora_db::repo::escrow::transition_escrow(&mut tx, &mut escrow, status).await?;
    }
    tx.commit().await?;
    tracing::info!(%escrow_id, %tx_hash, status = %escrow.status, "deposit reconciled");
    Ok(())
}
