//! Synthetic position generation.
//!
//! Every random draw comes from the generator's own RNG, so a generator
//! seeded with a fixed value produces a reproducible sequence and two
//! workers never share state.

use chrono::Utc;
use common::{round_to, Category, Position, Side, AMOUNT_DECIMALS, MAX_VOLUME, MIN_VOLUME};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Tickets are `(epoch millis mod TICKET_MODULUS) + [1, 999]`
const TICKET_MODULUS: i64 = 100_000;

pub struct PositionGenerator<R = StdRng> {
    rng: R,
}

impl PositionGenerator<StdRng> {
    /// Deterministic generator
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> PositionGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a position, deriving the ticket from the current time.
    pub fn generate(&mut self, symbol: &str, side: Side) -> Position {
        self.generate_at(symbol, side, Utc::now().timestamp_millis())
    }

    /// Generate a position with the ticket derived from `epoch_millis`.
    ///
    /// The ticket is only probabilistically unique: two calls within the
    /// same 100 s window can draw the same value.
    pub fn generate_at(&mut self, symbol: &str, side: Side, epoch_millis: i64) -> Position {
        let category = Category::from_symbol(symbol);
        let decimals = category.price_decimals();

        let ticket = epoch_millis.rem_euclid(TICKET_MODULUS) + self.rng.gen_range(1..=999);
        let volume = round_to(self.rng.gen_range(MIN_VOLUME..=MAX_VOLUME), AMOUNT_DECIMALS);

        let (low, high) = category.price_range();
        let price_open = round_to(self.rng.gen_range(low..=high), decimals);

        let (drift_low, drift_high) = category.drift_range();
        let drift = self.rng.gen_range(drift_low..=drift_high);
        let price_current = round_to(price_open + drift, decimals);

        Position::new(symbol, ticket, side, volume, price_open, price_current)
    }
}
