pub mod address;
pub mod payout;

pub async fn healthz() -> &'static str {
    "ok"
}
