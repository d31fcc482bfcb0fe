use regex::Regex;
use std::sync::OnceLock;

use trustora_core::Chain;

fn tron_address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^T[a-zA-Z0-9]{33}$").expect("valid regex"))
}

fn bsc_address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid regex"))
}

/// Checks `address` against the given chain's format, per `spec.md`
/// §4.6 / `original_source`'s `trustora.chains.validate_address`.
pub fn validate_address(chain: Chain, address: &str) -> bool {
    match chain {
        Chain::Trc20 => tron_address_re().is_match(address),
        Chain::Bep20 => bsc_address_re().is_match(address),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_tron_address() {
        assert!(validate_address(Chain::Trc20, "T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb"));
    }

    #[test]
    fn rejects_bsc_address_on_tron_chain() {
        assert!(!validate_address(
            Chain::Trc20,
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        ));
    }

    #[test]
    fn accepts_well_formed_bsc_address() {
        assert!(validate_address(Chain::Bep20, "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn rejects_short_address() {
        assert!(!validate_address(Chain::Bep20, "0x1234"));
    }
}
