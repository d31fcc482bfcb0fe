//! One module per table, each a thin set of free functions over a
//! borrowed `&mut PgConnection` (or, for inserts that need the
//! surrounding transaction's lifetime, a `Transaction<'_, Postgres>`)
//! rather than a trait object — the same style as the teacher's
//! `RocksTransaction` free-function table accessors.

pub mod audit_log;
pub mod config;
pub mod dispute;
pub mod escrow;
pub mod message;
pub mod review;
pub mod revenue;
pub mod user;
