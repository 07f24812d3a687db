//! The schedule a bot follows each round.
//!
//! A round is `positions_per_round` buy/sell pairs, each send followed by
//! the trade pause, then the round pause. The plan is built once from
//! configuration and replayed by the worker until it is cancelled.

use common::Side;
use config::{BotConfig, CadenceConfig};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Generate and deliver one position
    Send(Side),
    /// Suspend the worker
    Pause(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundPlan {
    steps: Vec<Step>,
}

impl RoundPlan {
    /// Zero-length pauses are left out of the plan.
    pub fn new(positions_per_round: u32, trade_pause: Duration, round_pause: Duration) -> Self {
        let mut steps = Vec::with_capacity(positions_per_round as usize * 4 + 1);

        for _ in 0..positions_per_round {
            for side in [Side::Buy, Side::Sell] {
                steps.push(Step::Send(side));
                if !trade_pause.is_zero() {
                    steps.push(Step::Pause(trade_pause));
                }
            }
        }

        if !round_pause.is_zero() {
            steps.push(Step::Pause(round_pause));
        }

        Self { steps }
    }

    pub fn from_config(bot: &BotConfig, cadence: &CadenceConfig) -> Self {
        Self::new(
            bot.positions_per_round,
            cadence.trade_pause(),
            cadence.round_pause(),
        )
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Sends per round
    pub fn sends(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, Step::Send(_)))
            .count()
    }

    /// Time spent pausing per round, excluding request time
    pub fn pause_time(&self) -> Duration {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Pause(duration) => *duration,
                Step::Send(_) => Duration::ZERO,
            })
            .sum()
    }
}

/// Sleep for `duration` unless `token` is cancelled first.
///
/// Returns `false` if the pause was cut short by cancellation.
pub async fn pause(token: &CancellationToken, duration: Duration) -> bool {
    if token.is_cancelled() {
        return false;
    }

    tokio::select! {
        _ = tokio::time::sleep(duration) => true,
        _ = token.cancelled() => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRADE: Duration = Duration::from_millis(500);
    const ROUND: Duration = Duration::from_millis(2000);

    #[test]
    fn test_single_pair_plan() {
        let plan = RoundPlan::new(1, TRADE, ROUND);
        assert_eq!(
            plan.steps(),
            &[
                Step::Send(Side::Buy),
                Step::Pause(TRADE),
                Step::Send(Side::Sell),
                Step::Pause(TRADE),
                Step::Pause(ROUND),
            ]
        );
        assert_eq!(plan.sends(), 2);
        assert_eq!(plan.pause_time(), Duration::from_millis(3000));
    }

    #[test]
    fn test_buy_always_precedes_sell() {
        let plan = RoundPlan::new(3, TRADE, ROUND);
        let sides: Vec<Side> = plan
            .steps()
            .iter()
            .filter_map(|step| match step {
                Step::Send(side) => Some(*side),
                Step::Pause(_) => None,
            })
            .collect();
        assert_eq!(
            sides,
            vec![Side::Buy, Side::Sell, Side::Buy, Side::Sell, Side::Buy, Side::Sell]
        );
        assert_eq!(plan.steps().last(), Some(&Step::Pause(ROUND)));
    }

    #[test]
    fn test_zero_pauses_are_dropped() {
        let plan = RoundPlan::new(2, Duration::ZERO, Duration::ZERO);
        assert_eq!(plan.steps().len(), 4);
        assert_eq!(plan.pause_time(), Duration::ZERO);
    }

    #[test]
    fn test_from_config() {
        let bot = BotConfig {
            positions_per_round: 2,
            ..Default::default()
        };
        let plan = RoundPlan::from_config(&bot, &CadenceConfig::default());
        assert_eq!(plan.sends(), 4);
        assert_eq!(plan.pause_time(), Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_completes() {
        let token = CancellationToken::new();
        let start = tokio::time::Instant::now();
        assert!(pause(&token, TRADE).await);
        assert!(start.elapsed() >= TRADE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_cut_short() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let start = tokio::time::Instant::now();
        assert!(!pause(&token, ROUND).await);
        assert!(start.elapsed() < ROUND);
        assert!(!pause(&token, ROUND).await);
    }
}
