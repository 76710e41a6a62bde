use usage_client::MarketCode;

/// Terminal failures of a peak query. None of them are retried internally.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PeakError {
    #[error("invalid market name '{0}'")]
    InvalidMarketName(String),
    #[error("no usage data for market '{0}'")]
    MarketNotFound(MarketCode),
    #[error("malformed timestamp '{value}' in usage row {row}")]
    MalformedTimestamp { value: String, row: usize },
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    InvalidMarketName,
    MarketNotFound,
    MalformedTimestamp,
    DataUnavailable,
}

impl ErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::InvalidMarketName => "InvalidMarketName",
            ErrorCategory::MarketNotFound => "MarketNotFound",
            ErrorCategory::MalformedTimestamp => "MalformedTimestamp",
            ErrorCategory::DataUnavailable => "DataUnavailable",
        }
    }
}

impl PeakError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PeakError::InvalidMarketName(_) => ErrorCategory::InvalidMarketName,
            PeakError::MarketNotFound(_) => ErrorCategory::MarketNotFound,
            PeakError::MalformedTimestamp { .. } => ErrorCategory::MalformedTimestamp,
            PeakError::DataUnavailable(_) => ErrorCategory::DataUnavailable,
        }
    }

    pub(crate) fn unavailable(context: &str, err: impl std::fmt::Display) -> Self {
        PeakError::DataUnavailable(format!("{context}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_identify_the_offending_value() {
        let err = PeakError::MalformedTimestamp {
            value: "not-a-date".to_string(),
            row: 4,
        };
        assert_eq!(err.to_string(), "malformed timestamp 'not-a-date' in usage row 4");
        assert_eq!(err.category().as_str(), "MalformedTimestamp");

        let err = PeakError::MarketNotFound(MarketCode::Ieso);
        assert_eq!(err.to_string(), "no usage data for market 'ieso'");
    }
}
