use redis::AsyncCommands;

use crate::error::KvError;

/// Generic double-tap TTL for confirm-again gates (`spec.md` §4.5,
/// §6: release, admin-approve, admin-freeze, admin-block,
/// admin-broadcast, admin-kill, fee-edit).
const CONFIRM_TTL_SECONDS: i64 = 120;

/// TTL for the longer-lived session-style gates (chat activation,
/// review prompt, admin session, admin action window).
const SESSION_TTL_SECONDS: i64 = 600;

/// Per-deal, per-user chat throughput window.
const CHAT_RATE_TTL_SECONDS: i64 = 60;

/// Max chat messages a single user may send into one deal per minute.
pub const CHAT_RATE_LIMIT: i64 = 10;

/// Arms or consumes a single-use confirmation flag at `key`: the first
/// call sets the flag (TTL `ttl_seconds`) and returns `false` ("not
/// confirmed yet, tap again"); a second call within the TTL finds and
/// deletes the flag, returning `true` ("confirmed"). This is the
/// primitive behind every "tap twice to confirm" action in the system.
async fn arm_or_consume(
    conn: &mut redis::aio::ConnectionManager,
    key: &str,
    ttl_seconds: i64,
) -> Result<bool, KvError> {
    let existed: Option<String> = conn.get_del(key).await?;
    if existed.is_some() {
        return Ok(true);
    }
    let _: () = conn.set_ex(key, "1", ttl_seconds as u64).await?;
    Ok(false)
}

/// The buyer's "release funds" double-tap gate, keyed by escrow so two
/// different deals never share a flag.
pub async fn confirm_release(
    conn: &mut redis::aio::ConnectionManager,
    user_tg_id: i64,
    escrow_id: uuid::Uuid,
) -> Result<bool, KvError> {
    let key = format!("release_confirm:{user_tg_id}:{escrow_id}");
    arm_or_consume(conn, &key, CONFIRM_TTL_SECONDS).await
}

/// One of the admin double-tap confirmations named in `spec.md` §4.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Approve,
    Freeze,
    Block,
    Broadcast,
    Kill,
    FeeEdit,
}

impl AdminAction {
    fn slug(self) -> &'static str {
        match self {
            Self::Approve => "admin-approve",
            Self::Freeze => "admin-freeze",
            Self::Block => "admin-block",
            Self::Broadcast => "admin-broadcast",
            Self::Kill => "admin-kill",
            Self::FeeEdit => "fee-edit",
        }
    }
}

/// Double-tap gate for a privileged admin action. `scope` disambiguates
/// actions that target a specific escrow/user/etc — passed through
/// verbatim into the key's trailing segment.
pub async fn confirm_admin_action(
    conn: &mut redis::aio::ConnectionManager,
    action: AdminAction,
    admin_tg_id: i64,
    scope: &str,
) -> Result<bool, KvError> {
    let key = format!("confirm:{}:{admin_tg_id}:{scope}", action.slug());
    arm_or_consume(conn, &key, CONFIRM_TTL_SECONDS).await
}

/// Marks a chat session active for `user_tg_id` (the `chat:{user}`
/// gate), refreshing the 600 s window on every message.
pub async fn touch_chat_session(
    conn: &mut redis::aio::ConnectionManager,
    user_tg_id: i64,
) -> Result<(), KvError> {
    let _: () =
        conn.set_ex(format!("chat:{user_tg_id}"), "1", SESSION_TTL_SECONDS as u64).await?;
    Ok(())
}

/// Increments the per-deal, per-user chat counter and reports whether
/// the sender is still within [`CHAT_RATE_LIMIT`] messages/minute.
pub async fn check_chat_rate(
    conn: &mut redis::aio::ConnectionManager,
    escrow_id: uuid::Uuid,
    user_tg_id: i64,
) -> Result<bool, KvError> {
    let key = format!("chat_rate:{escrow_id}:{user_tg_id}");
    let count: i64 = conn.incr(&key, 1).await?;
    if count == 1 {
        let _: () = conn.expire(&key, CHAT_RATE_TTL_SECONDS).await?;
    }
    Ok(count <= CHAT_RATE_LIMIT)
}

/// True the first time a user is prompted for a review within the
/// 600 s `review:{user}` window (prevents duplicate prompts from a
/// retried notification).
pub async fn claim_review_prompt(
    conn: &mut redis::aio::ConnectionManager,
    user_tg_id: i64,
) -> Result<bool, KvError> {
    let claimed: bool =
        conn.set_options(
            format!("review:{user_tg_id}"),
            "1",
            redis::SetOptions::default()
                .with_expiration(redis::SetExpiry::EX(SESSION_TTL_SECONDS as usize))
                .conditional_set(redis::ExistenceCheck::NX),
        )
        .await?;
    Ok(claimed)
}

/// Marks an admin session active (`admin:{user}`, 600 s), set once on
/// successful admin authentication.
pub async fn start_admin_session(
    conn: &mut redis::aio::ConnectionManager,
    admin_tg_id: i64,
) -> Result<(), KvError> {
    let _: () =
        conn.set_ex(format!("admin:{admin_tg_id}"), "1", SESSION_TTL_SECONDS as u64).await?;
    Ok(())
}

/// True while an admin session is live.
pub async fn has_admin_session(
    conn: &mut redis::aio::ConnectionManager,
    admin_tg_id: i64,
) -> Result<bool, KvError> {
    Ok(conn.exists(format!("admin:{admin_tg_id}")).await?)
}

/// Opens the 600 s window (`admin_action:{user}`) inside which a
/// previously-armed admin double-tap must be completed.
pub async fn start_admin_action_window(
    conn: &mut redis::aio::ConnectionManager,
    admin_tg_id: i64,
) -> Result<(), KvError> {
    let _: () = conn
        .set_ex(format!("admin_action:{admin_tg_id}"), "1", SESSION_TTL_SECONDS as u64)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_action_slugs_match_spec_names() {
        assert_eq!(AdminAction::Approve.slug(), "admin-approve");
        assert_eq!(AdminAction::FeeEdit.slug(), "fee-edit");
    }

    #[test]
    fn chat_rate_limit_matches_spec() {
        assert_eq!(CHAT_RATE_LIMIT, 10);
    }
}
