//! Tiered prize fund sizing.
//!
//! The jackpot always has one winner. The lower tiers scale with the ticket
//! population (one winner per 1000, 100 and 10 tickets) but never drop below
//! one winner, even with no tickets at all.

use crate::round::{RoundConfig, Tier};
use crate::Error;

const LEVEL1_TICKETS_PER_WINNER: u32 = 1_000;
const LEVEL2_TICKETS_PER_WINNER: u32 = 100;
const LEVEL3_TICKETS_PER_WINNER: u32 = 10;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TierWinners {
    pub jackpot: u32,
    pub level1: u32,
    pub level2: u32,
    pub level3: u32,
}

impl TierWinners {
    pub fn for_tickets(tickets: u32) -> Self {
        TierWinners {
            jackpot: 1,
            level1: (tickets / LEVEL1_TICKETS_PER_WINNER).max(1),
            level2: (tickets / LEVEL2_TICKETS_PER_WINNER).max(1),
            level3: (tickets / LEVEL3_TICKETS_PER_WINNER).max(1),
        }
    }

    pub fn count(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Jackpot => self.jackpot,
            Tier::Level1 => self.level1,
            Tier::Level2 => self.level2,
            Tier::Level3 => self.level3,
        }
    }
}

/// Total prize fund for `tickets` outstanding tickets under `config`.
pub fn pool_size(tickets: u32, config: &RoundConfig) -> Result<i128, Error> {
    let winners = TierWinners::for_tickets(tickets);

    let mut total: i128 = 0;
    for tier in Tier::DRAW_ORDER {
        let tier_total = i128::from(winners.count(tier))
            .checked_mul(config.reward(tier))
            .ok_or(Error::Overflow)?;
        total = total.checked_add(tier_total).ok_or(Error::Overflow)?;
    }
    Ok(total)
}
