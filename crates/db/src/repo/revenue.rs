use rust_decimal::Decimal;
use sqlx::PgConnection;
use trustora_core::Chain;
use uuid::Uuid;

use crate::error::DbError;

/// Appends one fee-revenue ledger entry. Called in the same
/// transaction that records a payout, so revenue and payout hashes
/// never diverge (`spec.md` §5).
pub async fn record_revenue(
    tx: &mut PgConnection,
    escrow_id: Uuid,
    chain: Chain,
    fee_amount: Decimal,
) -> Result<(), DbError> {
    sqlx::query("INSERT INTO revenue (escrow_id, chain, fee_amount, created_at) VALUES ($1, $2, $3, now())")
        .bind(escrow_id)
        .bind(chain)
        .bind(fee_amount)
        .execute(tx)
        .await?;
    Ok(())
}

/// Sums recorded fee revenue for a chain over all time — used by
/// admin reporting.
pub async fn total_revenue(tx: &mut PgConnection, chain: Chain) -> Result<Decimal, DbError> {
    let total: Option<Decimal> =
        sqlx::query_scalar("SELECT sum(fee_amount) FROM revenue WHERE chain = $1")
            .bind(chain)
            .fetch_one(tx)
            .await?;
    Ok(total.unwrap_or(Decimal::ZERO))
}
