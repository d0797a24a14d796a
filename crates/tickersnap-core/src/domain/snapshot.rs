use serde::{Deserialize, Serialize};

use crate::{Symbol, ValidationError};

/// Literal substituted on the wire for any field the provider did not supply.
pub const NOT_AVAILABLE: &str = "N/A";

/// Typed per-symbol record as returned by a provider adapter.
///
/// Every field other than the symbol is optional; absence is a normal
/// provider outcome and maps to [`NOT_AVAILABLE`] only when the record is
/// rendered into a [`StockSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolProfile {
    pub symbol: Symbol,
    pub short_name: Option<String>,
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub sector: Option<String>,
}

impl SymbolProfile {
    pub fn new(
        symbol: Symbol,
        short_name: Option<String>,
        current_price: Option<f64>,
        previous_close: Option<f64>,
        sector: Option<String>,
    ) -> Result<Self, ValidationError> {
        validate_optional_price("current_price", current_price)?;
        validate_optional_price("previous_close", previous_close)?;

        Ok(Self {
            symbol,
            short_name,
            current_price,
            previous_close,
            sector,
        })
    }
}

/// Price-or-sentinel wire value: a number when the provider supplied one,
/// the [`NOT_AVAILABLE`] string otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    Number(f64),
    Sentinel(String),
}

impl PriceField {
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(value) => Self::Number(value),
            None => Self::Sentinel(NOT_AVAILABLE.to_owned()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Sentinel(_) => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel(_))
    }
}

/// Serialized snapshot returned by the HTTP surface.
///
/// Field names follow the wire contract (`currentPrice`, `previousClose`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub symbol: Symbol,
    pub name: String,
    pub current_price: PriceField,
    pub previous_close: PriceField,
    pub sector: String,
}

impl StockSnapshot {
    /// Render a provider profile to wire form, substituting [`NOT_AVAILABLE`]
    /// for each missing field.
    pub fn from_profile(profile: SymbolProfile) -> Self {
        Self {
            symbol: profile.symbol,
            name: profile
                .short_name
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            current_price: PriceField::from_option(profile.current_price),
            previous_close: PriceField::from_option(profile.previous_close),
            sector: profile.sector.unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
        }
    }
}

fn validate_optional_price(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field });
        }
        if value < 0.0 {
            return Err(ValidationError::NegativeValue { field });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("valid symbol")
    }

    #[test]
    fn rejects_negative_price() {
        let err = SymbolProfile::new(symbol("AAPL"), None, Some(-1.0), None, None)
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::NegativeValue { .. }));
    }

    #[test]
    fn renders_missing_fields_as_sentinel() {
        let profile = SymbolProfile::new(symbol("TSLA"), None, Some(245.3), None, None)
            .expect("valid profile");
        let snapshot = StockSnapshot::from_profile(profile);

        assert_eq!(snapshot.name, NOT_AVAILABLE);
        assert_eq!(snapshot.sector, NOT_AVAILABLE);
        assert_eq!(snapshot.current_price.as_number(), Some(245.3));
        assert!(snapshot.previous_close.is_sentinel());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let profile = SymbolProfile::new(
            symbol("AAPL"),
            Some(String::from("Apple Inc.")),
            Some(189.5),
            Some(188.0),
            Some(String::from("Technology")),
        )
        .expect("valid profile");

        let value =
            serde_json::to_value(StockSnapshot::from_profile(profile)).expect("serialize");
        assert_eq!(value["symbol"], "AAPL");
        assert_eq!(value["name"], "Apple Inc.");
        assert_eq!(value["currentPrice"], 189.5);
        assert_eq!(value["previousClose"], 188.0);
        assert_eq!(value["sector"], "Technology");
    }

    #[test]
    fn sentinel_serializes_as_string_not_null() {
        let profile =
            SymbolProfile::new(symbol("AMZN"), None, None, None, None).expect("valid profile");
        let value =
            serde_json::to_value(StockSnapshot::from_profile(profile)).expect("serialize");

        assert_eq!(value["currentPrice"], "N/A");
        assert_eq!(value["previousClose"], "N/A");
        assert!(!value["currentPrice"].is_null());
    }
}
