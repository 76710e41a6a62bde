use std::{fmt, str::FromStr};

/// Energy markets known to the service. The canonical form is lower-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MarketCode {
    Caiso,
    Spp,
    Ercot,
    Ieso,
    Aeso,
    Nyiso,
    Pjm,
    Miso,
    Isone,
}

impl MarketCode {
    pub const ALL: [MarketCode; 9] = [
        MarketCode::Caiso,
        MarketCode::Spp,
        MarketCode::Ercot,
        MarketCode::Ieso,
        MarketCode::Aeso,
        MarketCode::Nyiso,
        MarketCode::Pjm,
        MarketCode::Miso,
        MarketCode::Isone,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            MarketCode::Caiso => "caiso",
            MarketCode::Spp => "spp",
            MarketCode::Ercot => "ercot",
            MarketCode::Ieso => "ieso",
            MarketCode::Aeso => "aeso",
            MarketCode::Nyiso => "nyiso",
            MarketCode::Pjm => "pjm",
            MarketCode::Miso => "miso",
            MarketCode::Isone => "isone",
        }
    }
}

impl fmt::Display for MarketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown market '{0}'")]
pub struct UnknownMarket(pub String);

impl FromStr for MarketCode {
    type Err = UnknownMarket;

    /// Case-insensitive; surrounding whitespace is not accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarketCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMarket(s.to_string()))
    }
}

/// A row of the market reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketRecord {
    pub id: i64,
    pub name: MarketCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_code_in_any_case() {
        for code in MarketCode::ALL {
            assert_eq!(code.as_str().parse::<MarketCode>(), Ok(code));
            assert_eq!(code.as_str().to_uppercase().parse::<MarketCode>(), Ok(code));
        }
        assert_eq!("IsoNe".parse::<MarketCode>(), Ok(MarketCode::Isone));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            "invalid_market".parse::<MarketCode>(),
            Err(UnknownMarket("invalid_market".to_string()))
        );
        assert!("".parse::<MarketCode>().is_err());
        assert!(" spp".parse::<MarketCode>().is_err());
    }

    #[test]
    fn display_is_canonical_lower_case() {
        assert_eq!(MarketCode::Nyiso.to_string(), "nyiso");
    }
}
