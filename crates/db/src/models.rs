use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use uuid::Uuid;

use trustora_core::{Chain, EscrowStatus, FeeSnapshot, Token};

/// A Telegram-identified participant. `tg_id` is the natural key
/// (`spec.md` §3).
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub tg_id: i64,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
    pub terms_accepted_at: Option<DateTime<Utc>>,
    pub broadcast_opt_in: bool,
    pub is_blocked: bool,
    pub risk_score: i32,
    pub risk_reasons_json: Json,
    pub public_hash: String,
}

/// The central escrow row. `fee_snapshot_json` carries an immutable
/// copy of the fee terms in force at creation time (`spec.md` §4.2) so
/// later config changes never alter an in-flight deal's fee.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Escrow {
    pub id: Uuid,
    pub room_code: String,
    pub buyer_tg_id: i64,
    pub seller_tg_id: i64,
    pub chain: Chain,
    pub token: Token,
    pub amount_expected: Decimal,
    pub amount_received: Option<Decimal>,
    pub fee_snapshot_json: Json,
    pub fee_amount: Decimal,
    pub net_amount: Decimal,
    pub deposit_address: String,
    pub deposit_tx_hash: Option<String>,
    pub deposit_confirmations: Option<i32>,
    pub payout_address: Option<String>,
    pub payout_tx_hash: Option<String>,
    pub payout_confirmations: Option<i32>,
    pub fee_tx_hash: Option<String>,
    pub status: EscrowStatus,
    pub chat_frozen: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Escrow {
    /// Decodes the immutable fee snapshot captured at creation time.
    pub fn fee_snapshot(&self) -> Result<FeeSnapshot, serde_json::Error> {
        serde_json::from_value(self.fee_snapshot_json.clone())
    }
}

impl trustora_core::idempotency::EscrowHashes for Escrow {
    fn deposit_tx_hash(&self) -> Option<&str> {
        self.deposit_tx_hash.as_deref()
    }

    fn payout_tx_hash(&self) -> Option<&str> {
        self.payout_tx_hash.as_deref()
    }
}

/// Sender role on a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "messagerole", rename_all = "lowercase")]
pub enum MessageRole {
    Buyer,
    Seller,
    System,
}

/// Content kind of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "messagetype", rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
}

/// A relayed chat message between buyer and seller (`spec.md` §4.1's
/// chat relay sub-component).
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub escrow_id: Uuid,
    pub sender_tg_id: i64,
    pub role: MessageRole,
    pub r#type: MessageType,
    pub body_or_file_id: String,
    pub created_at: DateTime<Utc>,
}

/// Whether a dispute is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type, Serialize, Deserialize)]
#[sqlx(type_name = "disputestatus", rename_all = "UPPERCASE")]
pub enum DisputeStatus {
    Open,
    Resolved,
}

/// A raised dispute on an escrow.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Dispute {
    pub id: i64,
    pub escrow_id: Uuid,
    pub opened_by_tg_id: i64,
    pub reason: String,
    pub status: DisputeStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// A post-completion review left by one counterparty about the other.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub escrow_id: Uuid,
    pub reviewer_tg_id: i64,
    pub counterparty_tg_id: i64,
    pub rating: i32,
    pub comment: String,
    pub posted_channel_msg_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// One fee-revenue ledger entry, recorded alongside a completed payout.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Revenue {
    pub id: i64,
    pub escrow_id: Uuid,
    pub chain: Chain,
    pub fee_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

/// An append-only record of a privileged or state-changing action.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub escrow_id: Option<Uuid>,
    pub actor_tg_id: Option<i64>,
    pub action: String,
    pub metadata_json: Json,
    pub created_at: DateTime<Utc>,
}

/// The single live row of runtime-tunable configuration.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Config {
    pub id: i32,
    pub json: Json,
}

/// One audited edit of [`Config`].
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ConfigHistoryEntry {
    pub id: i64,
    pub changed_by: Option<i64>,
    pub old_json: Json,
    pub new_json: Json,
    pub created_at: DateTime<Utc>,
}
