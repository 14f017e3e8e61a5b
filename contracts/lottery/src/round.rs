//! The round value object.
//!
//! Everything that belongs to the round in flight lives in one [`Round`]
//! stored under a single key. Every entry point loads it, checks its phase,
//! mutates it and writes it back, so phase and membership invariants are
//! enforced in one place.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::Error;

/// Lifecycle phase of the engine. Exactly one is live at a time.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RoundState {
    NotActive = 0,
    Active = 1,
    Ready = 2,
    DrawOver = 3,
    Closed = 4,
}

/// Reward bracket of the draw.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Tier {
    Jackpot = 0,
    Level1 = 1,
    Level2 = 2,
    Level3 = 3,
}

impl Tier {
    /// Order in which tiers are drawn.
    pub const DRAW_ORDER: [Tier; 4] = [Tier::Jackpot, Tier::Level1, Tier::Level2, Tier::Level3];
}

/// Per-winner reward amounts, fixed at `start_round`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoundConfig {
    pub jackpot: i128,
    pub level1: i128,
    pub level2: i128,
    pub level3: i128,
    /// Instant reward for redeeming a ticket; paid outside the prize fund.
    pub burn_reward: i128,
}

impl RoundConfig {
    pub fn empty() -> Self {
        RoundConfig {
            jackpot: 0,
            level1: 0,
            level2: 0,
            level3: 0,
            burn_reward: 0,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.jackpot < 0
            || self.level1 < 0
            || self.level2 < 0
            || self.level3 < 0
            || self.burn_reward < 0
        {
            return Err(Error::InvalidAmount);
        }
        Ok(())
    }

    /// Amount paid to each winner of `tier`.
    pub fn reward(&self, tier: Tier) -> i128 {
        match tier {
            Tier::Jackpot => self.jackpot,
            Tier::Level1 => self.level1,
            Tier::Level2 => self.level2,
            Tier::Level3 => self.level3,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WinnerPayout {
    pub recipient: Address,
    pub amount: i128,
}

/// A collection as captured by `freeze_round`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrozenCollection {
    pub collection: Address,
    /// Outstanding tickets at the freeze.
    pub tickets: u32,
    /// Minted count at the freeze. Ticket ids at or above it were minted
    /// afterwards and never take part in the draw.
    pub minted: u32,
    /// Whether the engine paused the collection (and so must unpause it).
    pub paused_by_engine: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Round {
    pub state: RoundState,
    /// Incremented by every `start_round`; tags events and payouts.
    pub draw_number: u64,
    pub config: RoundConfig,
    /// Collections participating in this round. Unordered, no duplicates.
    pub collections: Vec<Address>,
    /// Snapshot taken at `freeze_round`; empty before `Ready`.
    pub frozen: Vec<FrozenCollection>,
    /// Populated by `run_draw`, cleared by `clean_round`.
    pub payouts: Vec<WinnerPayout>,
}

impl Round {
    pub fn new(env: &Env) -> Self {
        Round {
            state: RoundState::NotActive,
            draw_number: 0,
            config: RoundConfig::empty(),
            collections: Vec::new(env),
            frozen: Vec::new(env),
            payouts: Vec::new(env),
        }
    }

    /// Fail with `InvalidPhase` unless the round is in `state`.
    pub fn require(&self, state: RoundState) -> Result<(), Error> {
        if self.state != state {
            return Err(Error::InvalidPhase);
        }
        Ok(())
    }

    /// Whether the ticket universe is fixed (`Ready` and later).
    pub fn is_frozen(&self) -> bool {
        matches!(
            self.state,
            RoundState::Ready | RoundState::DrawOver | RoundState::Closed
        )
    }

    pub fn has_collection(&self, collection: &Address) -> bool {
        self.collections.contains(collection)
    }

    /// Remove `collection` by moving the last member into its slot.
    pub fn swap_remove_collection(&mut self, collection: &Address) -> Result<(), Error> {
        let index = self
            .collections
            .first_index_of(collection)
            .ok_or(Error::CollectionNotActive)?;
        let last = self
            .collections
            .pop_back()
            .ok_or(Error::CollectionNotActive)?;
        if index < self.collections.len() {
            self.collections.set(index, last);
        }
        Ok(())
    }

    pub fn frozen_tickets(&self) -> Result<u32, Error> {
        let mut total: u32 = 0;
        for entry in self.frozen.iter() {
            total = total.checked_add(entry.tickets).ok_or(Error::Overflow)?;
        }
        Ok(total)
    }

    pub fn total_owed(&self) -> Result<i128, Error> {
        let mut total: i128 = 0;
        for payout in self.payouts.iter() {
            total = total.checked_add(payout.amount).ok_or(Error::Overflow)?;
        }
        Ok(total)
    }
}
