use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// One of the two chains this system escrows USDT on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Chain {
    /// Tron, TRC20 USDT.
    Trc20,
    /// BNB Smart Chain, BEP20 USDT.
    Bep20,
}

impl Chain {
    /// The confirmation depth required before a deposit on this chain
    /// is accepted (`spec.md` §4.4).
    pub const fn required_confirmations(self) -> u64 {
        match self {
            Self::Trc20 => 20,
            Self::Bep20 => 12,
        }
    }

    /// Short lowercase slug used for key-value coordination keys
    /// (`tron`/`bsc`), matching `original_source`'s cursor key names.
    pub const fn kv_slug(self) -> &'static str {
        match self {
            Self::Trc20 => "tron",
            Self::Bep20 => "bsc",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trc20 => "TRC20",
            Self::Bep20 => "BEP20",
        })
    }
}

impl FromStr for Chain {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRC20" => Ok(Self::Trc20),
            "BEP20" => Ok(Self::Bep20),
            other => Err(CoreError::UnsupportedChain(other.to_owned())),
        }
    }
}

/// The only token this system moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Token {
    /// Tether USD.
    Usdt,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("USDT")
    }
}

#[cfg(feature = "db")]
mod sqlx_impl {
    use super::{Chain, Token};
    use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
    use sqlx::Type;

    impl Type<sqlx::Postgres> for Chain {
        fn type_info() -> PgTypeInfo {
            PgTypeInfo::with_name("chain")
        }
    }

    impl PgHasArrayType for Chain {
        fn array_type_info() -> PgTypeInfo {
            PgTypeInfo::with_name("_chain")
        }
    }

    impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Chain {
        fn decode(
            value: sqlx::postgres::PgValueRef<'r>,
        ) -> Result<Self, sqlx::error::BoxDynError> {
            let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
            Ok(s.parse()?)
        }
    }

    impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Chain {
        fn encode_by_ref(
            &self,
            buf: &mut sqlx::postgres::PgArgumentBuffer,
        ) -> sqlx::encode::IsNull {
            <String as sqlx::Encode<sqlx::Postgres>>::encode(self.to_string(), buf)
        }
    }

    impl Type<sqlx::Postgres> for Token {
        fn type_info() -> PgTypeInfo {
            PgTypeInfo::with_name("token")
        }
    }

    impl PgHasArrayType for Token {
        fn array_type_info() -> PgTypeInfo {
            PgTypeInfo::with_name("_token")
        }
    }

    impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Token {
        fn decode(
            value: sqlx::postgres::PgValueRef<'r>,
        ) -> Result<Self, sqlx::error::BoxDynError> {
            let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
            match s {
                "USDT" => Ok(Token::Usdt),
                other => Err(format!("unknown token: {other}").into()),
            }
        }
    }

    impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Token {
        fn encode_by_ref(
            &self,
            buf: &mut sqlx::postgres::PgArgumentBuffer,
        ) -> sqlx::encode::IsNull {
            <String as sqlx::Encode<sqlx::Postgres>>::encode("USDT".to_owned(), buf)
        }
    }
}
