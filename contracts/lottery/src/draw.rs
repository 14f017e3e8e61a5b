//! Tiered draw without replacement.
//!
//! The ticket universe is the virtual concatenation of every frozen
//! collection's enumeration index: global index `i` maps to the collection
//! whose range contains it and to the local position inside that range.
//! Nothing is materialised up front.
//!
//! Sampling is a partial Fisher-Yates shuffle over `[0, remaining)` kept in a
//! sparse swap map, so each draw is O(1) storage and a ticket drawn for one
//! tier is gone for every later tier.
//!
//! A collection owner can lift the pause after the freeze. Burns only move
//! tickets towards lower indices, so every frozen ticket still alive sits
//! below `min(frozen, live)`. Tickets minted after the freeze can land in that
//! range too; their ids are at or above the frozen minted count, and a slot
//! resolving to one is discarded and drawn again.

use soroban_sdk::{Address, Env, Map, Vec};
use stellarcade_shared::TicketCollectionClient;

use crate::events::{DrawFinished, DrawStarted};
use crate::prize_fund::TierWinners;
use crate::round::{FrozenCollection, Round, Tier, WinnerPayout};
use crate::Error;

struct TicketUniverse {
    /// Collection, number of enumeration slots in the draw, and the minted
    /// count at the freeze.
    segments: Vec<(Address, u32, u32)>,
    remaining: u32,
    /// Positions displaced by earlier draws; absent keys map to themselves.
    swaps: Map<u32, u32>,
}

impl TicketUniverse {
    /// Build the universe from the freeze snapshot. A collection never
    /// contributes more tickets than it had at the freeze, nor more than it
    /// can still enumerate.
    fn new(env: &Env, frozen: &Vec<FrozenCollection>) -> Result<Self, Error> {
        let mut segments = Vec::new(env);
        let mut remaining: u32 = 0;

        for entry in frozen.iter() {
            let live = TicketCollectionClient::new(env, &entry.collection).total_supply();
            let eligible = live.min(entry.tickets);
            remaining = remaining.checked_add(eligible).ok_or(Error::Overflow)?;
            segments.push_back((entry.collection, eligible, entry.minted));
        }

        Ok(TicketUniverse {
            segments,
            remaining,
            swaps: Map::new(env),
        })
    }

    /// Take one not-yet-drawn global index uniformly at random.
    fn draw(&mut self, env: &Env) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let last = self.remaining - 1;
        let pick = env.prng().gen_range::<u64>(0..=u64::from(last)) as u32;

        let drawn = self.swaps.get(pick).unwrap_or(pick);
        let tail = self.swaps.get(last).unwrap_or(last);
        self.swaps.set(pick, tail);
        self.swaps.remove(last);
        self.remaining = last;

        Some(drawn)
    }

    /// Resolve a global index to the ticket's current owner, or `None` when
    /// the slot now holds a ticket minted after the freeze.
    fn owner_at(&self, env: &Env, index: u32) -> Result<Option<Address>, Error> {
        let mut offset = index;
        for (collection, tickets, minted) in self.segments.iter() {
            if offset < tickets {
                let client = TicketCollectionClient::new(env, &collection);
                let token_id = client.token_by_index(&offset);
                if token_id >= minted {
                    return Ok(None);
                }
                return Ok(Some(client.owner_of(&token_id)));
            }
            offset -= tickets;
        }
        Err(Error::IndexOutOfRange)
    }

    /// Draw until a frozen ticket comes up. `None` once the universe is spent.
    fn draw_winner(&mut self, env: &Env) -> Result<Option<Address>, Error> {
        while let Some(index) = self.draw(env) {
            if let Some(owner) = self.owner_at(env, index)? {
                return Ok(Some(owner));
            }
        }
        Ok(None)
    }
}

/// Draw every tier for `round` and return the ordered payout list.
///
/// Winner counts come from the frozen ticket total. When the universe runs
/// out, the remaining slots of the current and later tiers stay unfilled.
pub(crate) fn draw_winners(env: &Env, round: &Round) -> Result<Vec<WinnerPayout>, Error> {
    let mut universe = TicketUniverse::new(env, &round.frozen)?;
    let winners = TierWinners::for_tickets(round.frozen_tickets()?);
    let mut payouts = Vec::new(env);

    for tier in Tier::DRAW_ORDER {
        DrawStarted {
            round: round.draw_number,
            tier,
        }
        .publish(env);

        let amount = round.config.reward(tier);
        for _ in 0..winners.count(tier) {
            let Some(recipient) = universe.draw_winner(env)? else {
                break;
            };
            payouts.push_back(WinnerPayout { recipient, amount });
        }

        DrawFinished {
            round: round.draw_number,
            tier,
        }
        .publish(env);
    }

    Ok(payouts)
}
