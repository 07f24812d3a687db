//! Common types used across the position simulator
//!
//! This module provides the position record and the instrument
//! classification that drives its price model.

use serde::{Deserialize, Serialize};

/// Position side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy position
    Buy,
    /// Sell position
    Sell,
}

impl Side {
    /// Wire form stored in the `type` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instrument category, derived from the symbol name.
///
/// The category fixes the price range, the drift applied to produce the
/// current price, the decimal precision and the contract size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Currency pair quoted against USD (EURUSD, GBPUSD, ...)
    Fx,
    /// Everything else, gold included (XAUUSD)
    Metal,
}

impl Category {
    /// Classify a symbol: contains "USD" but not "XAU" is FX, anything else is Metal.
    pub fn from_symbol(symbol: &str) -> Self {
        if symbol.contains("USD") && !symbol.contains("XAU") {
            Category::Fx
        } else {
            Category::Metal
        }
    }

    /// Decimal places used for open and current prices
    pub fn price_decimals(&self) -> u32 {
        match self {
            Category::Fx => 5,
            Category::Metal => 1,
        }
    }

    /// Inclusive range the open price is sampled from
    pub fn price_range(&self) -> (f64, f64) {
        match self {
            Category::Fx => (1.05, 1.30),
            Category::Metal => (1900.0, 2000.0),
        }
    }

    /// Inclusive range of the drift added to the open price
    pub fn drift_range(&self) -> (f64, f64) {
        match self {
            Category::Fx => (-0.005, 0.005),
            Category::Metal => (-5.0, 5.0),
        }
    }

    /// Multiplier converting price movement into profit
    pub fn contract_size(&self) -> f64 {
        match self {
            Category::Fx => 100_000.0,
            Category::Metal => 100.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fx => "fx",
            Category::Metal => "metal",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bound of the sampled volume
pub const MIN_VOLUME: f64 = 0.01;
/// Upper bound of the sampled volume
pub const MAX_VOLUME: f64 = 0.05;
/// Decimal places for volume and profit
pub const AMOUNT_DECIMALS: u32 = 2;

/// Round half away from zero to `decimals` places.
///
/// A negative zero result is normalized to `0.0` so it never renders as `-0.00`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Profit of a position, rounded once to two decimals and negated for sells.
pub fn compute_profit(
    category: Category,
    side: Side,
    price_open: f64,
    price_current: f64,
    volume: f64,
) -> f64 {
    let profit = round_to(
        (price_current - price_open) * volume * category.contract_size(),
        AMOUNT_DECIMALS,
    );
    match side {
        Side::Buy => profit,
        Side::Sell => round_to(-profit, AMOUNT_DECIMALS),
    }
}

/// A synthetic trading position.
///
/// Built once by the generator and consumed by a single send attempt. The
/// `ticket` is a probabilistic identifier: two positions may share one.
/// The ingestion timestamp is not part of the record, it is captured by the
/// client at send time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub ticket: i64,
    pub side: Side,
    pub category: Category,
    pub volume: f64,
    pub price_open: f64,
    pub price_current: f64,
    pub profit: f64,
}

impl Position {
    /// Build a position, rounding prices and volume and deriving profit.
    pub fn new(
        symbol: impl Into<String>,
        ticket: i64,
        side: Side,
        volume: f64,
        price_open: f64,
        price_current: f64,
    ) -> Self {
        let symbol = symbol.into();
        let category = Category::from_symbol(&symbol);
        let decimals = category.price_decimals();
        let volume = round_to(volume, AMOUNT_DECIMALS);
        let price_open = round_to(price_open, decimals);
        let price_current = round_to(price_current, decimals);
        let profit = compute_profit(category, side, price_open, price_current, volume);

        Self {
            symbol,
            ticket,
            side,
            category,
            volume,
            price_open,
            price_current,
            profit,
        }
    }

    /// Price movement from open to current
    pub fn price_change(&self) -> f64 {
        self.price_current - self.price_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_wire_form() {
        assert_eq!(Side::Buy.as_str(), "buy");
        assert_eq!(Side::Buy.to_string(), "buy");
        assert_eq!(Side::Sell.to_string(), "sell");
    }

    #[test]
    fn test_category_from_symbol() {
        assert_eq!(Category::from_symbol("EURUSD"), Category::Fx);
        assert_eq!(Category::from_symbol("GBPUSD"), Category::Fx);
        assert_eq!(Category::from_symbol("XAUUSD"), Category::Metal);
        assert_eq!(Category::from_symbol("XAGEUR"), Category::Metal);
        assert_eq!(Category::from_symbol("usdjpy"), Category::Metal);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.234567, 5), 1.23457);
        assert_eq!(round_to(1955.04, 1), 1955.0);
        assert_eq!(round_to(0.025, 2), 0.03);
        assert!(round_to(-0.001, 2).is_sign_positive());
    }

    #[test]
    fn test_fx_profit_example() {
        let buy = compute_profit(Category::Fx, Side::Buy, 1.10000, 1.10100, 0.02);
        let sell = compute_profit(Category::Fx, Side::Sell, 1.10000, 1.10100, 0.02);
        assert_eq!(buy, 2.00);
        assert_eq!(sell, -2.00);
    }

    #[test]
    fn test_metal_profit_example() {
        let buy = compute_profit(Category::Metal, Side::Buy, 1950.0, 1955.0, 0.03);
        let sell = compute_profit(Category::Metal, Side::Sell, 1950.0, 1955.0, 0.03);
        assert_eq!(buy, 15.00);
        assert_eq!(sell, -15.00);
    }

    #[test]
    fn test_position_new_rounds_and_derives_profit() {
        let position = Position::new("XAUUSD", 42, Side::Buy, 0.031, 1950.04, 1945.01);
        assert_eq!(position.category, Category::Metal);
        assert_eq!(position.volume, 0.03);
        assert_eq!(position.price_open, 1950.0);
        assert_eq!(position.price_current, 1945.0);
        assert_eq!(position.profit, -15.0);
    }

    #[test]
    fn test_flat_sell_profit_is_not_negative_zero() {
        let position = Position::new("EURUSD", 1, Side::Sell, 0.02, 1.1, 1.1);
        assert_eq!(position.profit, 0.0);
        assert!(position.profit.is_sign_positive());
    }
}
