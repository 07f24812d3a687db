//! Position serialization strategies
//!
//! The store accepts one write request per position. How that request is
//! spelled is a property of the store's ingestion API, so it sits behind
//! the [`QuerySerializer`] trait.

use chrono::{DateTime, SecondsFormat, Utc};
use common::{Position, AMOUNT_DECIMALS};

/// Column list of the `positions` table, in insert order
pub const POSITION_COLUMNS: [&str; 8] = [
    "symbol",
    "ticket",
    "type",
    "volume",
    "price_open",
    "price_current",
    "profit",
    "timestamp",
];

/// Turns a position into the payload of a single write request.
///
/// Implementations must be pure: the same position and timestamp always
/// produce byte-identical output.
pub trait QuerySerializer: Send + Sync {
    fn serialize(&self, position: &Position, timestamp: DateTime<Utc>) -> String;
}

/// ISO-8601 UTC with six fractional digits and a literal `Z`,
/// e.g. `2024-03-01T12:00:00.123456Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// `INSERT INTO <table>(...) VALUES(...)` statement for a SQL query endpoint.
#[derive(Debug, Clone)]
pub struct SqlInsertSerializer {
    table: String,
}

impl SqlInsertSerializer {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }
}

impl Default for SqlInsertSerializer {
    fn default() -> Self {
        Self::new("positions")
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl QuerySerializer for SqlInsertSerializer {
    fn serialize(&self, position: &Position, timestamp: DateTime<Utc>) -> String {
        let price_decimals = position.category.price_decimals() as usize;
        let amount_decimals = AMOUNT_DECIMALS as usize;

        format!(
            "INSERT INTO {}({}) VALUES({}, {}, {}, {:.amt$}, {:.px$}, {:.px$}, {:.amt$}, {})",
            self.table,
            POSITION_COLUMNS.join(", "),
            quote(&position.symbol),
            position.ticket,
            quote(position.side.as_str()),
            position.volume,
            position.price_open,
            position.price_current,
            position.profit,
            quote(&format_timestamp(timestamp)),
            amt = amount_decimals,
            px = price_decimals,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::Side;

    fn fixed_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
            + chrono::Duration::microseconds(123_456)
    }

    #[test]
    fn test_format_timestamp_has_micros_and_z() {
        assert_eq!(
            format_timestamp(fixed_timestamp()),
            "2024-03-01T12:00:00.123456Z"
        );

        let whole_second = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(format_timestamp(whole_second), "2024-03-01T12:00:00.000000Z");
        assert!(!format_timestamp(Utc::now()).contains("+00:00"));
    }

    #[test]
    fn test_timestamp_round_trip_within_a_microsecond() {
        let now = Utc::now();
        let parsed = DateTime::parse_from_rfc3339(&format_timestamp(now))
            .unwrap()
            .with_timezone(&Utc);
        let drift = (now - parsed).num_nanoseconds().unwrap().abs();
        assert!(drift < 1_000, "drift {}ns", drift);
    }

    #[test]
    fn test_fx_insert_statement() {
        let position = Position::new("EURUSD", 12345, Side::Buy, 0.02, 1.1, 1.101);
        let sql = SqlInsertSerializer::default().serialize(&position, fixed_timestamp());
        assert_eq!(
            sql,
            "INSERT INTO positions(symbol, ticket, type, volume, price_open, price_current, profit, timestamp) \
             VALUES('EURUSD', 12345, 'buy', 0.02, 1.10000, 1.10100, 2.00, '2024-03-01T12:00:00.123456Z')"
        );
    }

    #[test]
    fn test_metal_insert_statement_uses_one_decimal() {
        let position = Position::new("XAUUSD", 7, Side::Sell, 0.03, 1950.0, 1955.0);
        let sql = SqlInsertSerializer::new("positions_test").serialize(&position, fixed_timestamp());
        assert!(sql.starts_with("INSERT INTO positions_test("));
        assert!(sql.contains("VALUES('XAUUSD', 7, 'sell', 0.03, 1950.0, 1955.0, -15.00, "));
    }

    #[test]
    fn test_serialization_is_pure() {
        let serializer = SqlInsertSerializer::default();
        let position = Position::new("GBPUSD", 99, Side::Sell, 0.05, 1.25, 1.2475);
        let ts = fixed_timestamp();
        assert_eq!(
            serializer.serialize(&position, ts),
            serializer.serialize(&position, ts)
        );
    }

    #[test]
    fn test_quotes_are_escaped() {
        let position = Position::new("O'USD", 1, Side::Buy, 0.01, 1.1, 1.1);
        let sql = SqlInsertSerializer::default().serialize(&position, fixed_timestamp());
        assert!(sql.contains("VALUES('O''USD', "));
    }
}
