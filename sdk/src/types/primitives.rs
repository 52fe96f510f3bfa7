//! Primitive types shared across the SDK.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy order, rests on the bids side.
    Buy,
    /// Sell order, rests on the asks side.
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl From<Side> for u32 {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Buy.to_string(), "buy");
        assert_eq!(Side::Sell.to_string(), "sell");
    }

    #[test]
    fn test_side_wire_value() {
        assert_eq!(u32::from(Side::Buy), 0);
        assert_eq!(u32::from(Side::Sell), 1);
    }

    #[test]
    fn test_side_serde() {
        let json = serde_json::to_string(&Side::Sell).expect("serialize");
        assert_eq!(json, "\"sell\"");

        let parsed: Side = serde_json::from_str("\"buy\"").expect("deserialize");
        assert_eq!(parsed, Side::Buy);
    }
}
