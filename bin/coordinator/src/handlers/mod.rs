pub mod admin;
pub mod dispute;
pub mod escrow;
pub mod release;
pub mod review;

pub async fn healthz() -> &'static str {
    "ok"
}
