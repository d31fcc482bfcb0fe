use chrono::Utc;
use sqlx::{PgConnection, Postgres, Transaction};
use trustora_core::{validate_transition, EscrowStatus};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::Escrow;

/// Loads an escrow row and locks it for the remainder of the
/// transaction, mirroring `original_source`'s
/// `get_escrow_for_update` (`SELECT ... FOR UPDATE`). Every
/// state-changing operation on an escrow must start here.
pub async fn get_escrow_for_update(
    tx: &mut PgConnection,
    escrow_id: Uuid,
) -> Result<Escrow, DbError> {
    sqlx::query_as::<_, Escrow>("SELECT * FROM escrows WHERE id = $1 FOR UPDATE")
        .bind(escrow_id)
        .fetch_optional(tx)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("escrow {escrow_id}")))
}

/// Loads an escrow by id without locking (read-only display paths).
pub async fn get_escrow(tx: &mut PgConnection, escrow_id: Uuid) -> Result<Escrow, DbError> {
    sqlx::query_as::<_, Escrow>("SELECT * FROM escrows WHERE id = $1")
        .bind(escrow_id)
        .fetch_optional(tx)
        .await?
        .ok_or_else(|| DbError::NotFound(format!("escrow {escrow_id}")))
}

/// Inserts a freshly created escrow row, already in [`EscrowStatus::Created`].
pub async fn insert_escrow(
    tx: &mut Transaction<'_, Postgres>,
    escrow: &Escrow,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        INSERT INTO escrows (
            id, room_code, buyer_tg_id, seller_tg_id, chain, token,
            amount_expected, amount_received, fee_snapshot_json, fee_amount,
            net_amount, deposit_address, deposit_tx_hash, deposit_confirmations,
            payout_address, payout_tx_hash, payout_confirmations, fee_tx_hash,
            status, chat_frozen, created_at, updated_at
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
            $15, $16, $17, $18, $19, $20, $21, $22
        )
        "#,
    )
    .bind(escrow.id)
    .bind(&escrow.room_code)
    .bind(escrow.buyer_tg_id)
    .bind(escrow.seller_tg_id)
    .bind(escrow.chain)
    .bind(escrow.token)
    .bind(escrow.amount_expected)
    .bind(escrow.amount_received)
    .bind(&escrow.fee_snapshot_json)
    .bind(escrow.fee_amount)
    .bind(escrow.net_amount)
    .bind(&escrow.deposit_address)
    .bind(&escrow.deposit_tx_hash)
    .bind(escrow.deposit_confirmations)
    .bind(&escrow.payout_address)
    .bind(&escrow.payout_tx_hash)
    .bind(escrow.payout_confirmations)
    .bind(&escrow.fee_tx_hash)
    .bind(escrow.status)
    .bind(escrow.chat_frozen)
    .bind(escrow.created_at)
    .bind(escrow.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(|err| {
        if matches!(&err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
        {
            DbError::Conflict(format!("escrow conflict: {err}"))
        } else {
            DbError::Sql(err)
        }
    })?;
    Ok(())
}

/// Validates `new_status` against `escrow.status` and, if allowed,
/// persists the transition plus `updated_at`. Mirrors
/// `original_source`'s `transition_escrow`.
pub async fn transition_escrow(
    tx: &mut PgConnection,
    escrow: &mut Escrow,
    new_status: EscrowStatus,
) -> Result<(), DbError> {
    validate_transition(escrow.status, new_status)?;
    let now = Utc::now();
    sqlx::query("UPDATE escrows SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(new_status)
        .bind(now)
        .bind(escrow.id)
        .execute(tx)
        .await?;
    escrow.status = new_status;
    escrow.updated_at = now;
    Ok(())
}

/// Records a reconciled deposit's hash, received amount, and
/// confirmation depth in one statement (called under the row lock
/// from [`get_escrow_for_update`]).
pub async fn record_deposit(
    tx: &mut PgConnection,
    escrow_id: Uuid,
    tx_hash: &str,
    amount_received: rust_decimal::Decimal,
    confirmations: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE escrows SET deposit_tx_hash = $1, amount_received = $2, \
         deposit_confirmations = $3, updated_at = now() WHERE id = $4",
    )
    .bind(tx_hash)
    .bind(amount_received)
    .bind(confirmations)
    .bind(escrow_id)
    .execute(tx)
    .await
    .map_err(|err| {
        if matches!(&err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
        {
            DbError::Conflict(format!("deposit tx hash already recorded: {err}"))
        } else {
            DbError::Sql(err)
        }
    })?;
    Ok(())
}

/// Records a broadcast payout's transaction hashes (seller transfer
/// and fee transfer) and confirmation depth.
pub async fn record_payout(
    tx: &mut PgConnection,
    escrow_id: Uuid,
    payout_address: &str,
    payout_tx_hash: &str,
    fee_tx_hash: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE escrows SET payout_address = $1, payout_tx_hash = $2, fee_tx_hash = $3, \
         updated_at = now() WHERE id = $4",
    )
    .bind(payout_address)
    .bind(payout_tx_hash)
    .bind(fee_tx_hash)
    .bind(escrow_id)
    .execute(tx)
    .await?;
    Ok(())
}

/// Finds the escrow with the given deposit address, if any — used by
/// the chain watcher to map an observed transfer back to a deal.
pub async fn find_by_deposit_address(
    tx: &mut PgConnection,
    chain: trustora_core::Chain,
    deposit_address: &str,
) -> Result<Option<Escrow>, DbError> {
    sqlx::query_as::<_, Escrow>("SELECT * FROM escrows WHERE chain = $1 AND deposit_address = $2")
        .bind(chain)
        .bind(deposit_address)
        .fetch_optional(tx)
        .await
        .map_err(DbError::Sql)
}

/// Escrows still waiting on or short of their deposit, on one chain —
/// the watcher's scan target set (`original_source`'s `scan_once`
/// query over `AWAITING_DEPOSIT`/`UNDERPAID`).
pub async fn list_awaiting_deposit(
    tx: &mut PgConnection,
    chain: trustora_core::Chain,
) -> Result<Vec<Escrow>, DbError> {
    sqlx::query_as::<_, Escrow>(
        "SELECT * FROM escrows WHERE chain = $1 AND status IN ($2, $3)",
    )
    .bind(chain)
    .bind(EscrowStatus::AwaitingDeposit)
    .bind(EscrowStatus::Underpaid)
    .fetch_all(tx)
    .await
    .map_err(DbError::Sql)
}

/// All deposit addresses already assigned on one chain — used to pick
/// the next unused address out of a signer's key pool.
pub async fn list_deposit_addresses(
    tx: &mut PgConnection,
    chain: trustora_core::Chain,
) -> Result<Vec<String>, DbError> {
    sqlx::query_scalar::<_, String>("SELECT deposit_address FROM escrows WHERE chain = $1")
        .bind(chain)
        .fetch_all(tx)
        .await
        .map_err(DbError::Sql)
}
