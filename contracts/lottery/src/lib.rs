//! Stellarcade Lottery Contract
//!
//! A prize-pool lottery over externally owned ticket collections. Tickets are
//! NFTs minted by independent collection contracts; the engine admits
//! collections into a round, sizes a tiered prize fund from the live ticket
//! count, draws winners without replacement and pays them from its SEP-41
//! reward balance. Holders may burn a ticket at any time while the round is
//! open for a fixed instant reward.
//!
//! ## Round Lifecycle
//! ```text
//! NotActive --start_round--> Active --freeze_round--> Ready
//!     ^                       |  ^                      |
//!     |          add/remove_collection                run_draw
//!     |                                                 v
//!  clean_round <-- Closed <------pay_rewards------- DrawOver
//! ```
//! Every operation called outside its phase fails with `InvalidPhase` and
//! leaves state untouched.
//!
//! ## Lifetime participation
//! A collection that is part of a round when it freezes is recorded as used
//! and can never be admitted again. Removing a collection before the freeze
//! leaves no trace.
//!
//! ## Randomness
//! The draw uses the host PRNG. Callers cannot predict it before the draw
//! transaction is applied, but validators can derive it.
#![no_std]
#![allow(unexpected_cfgs)]

mod draw;
pub mod events;
pub mod prize_fund;
pub mod round;
mod storage;

use soroban_sdk::{contract, contracterror, contractimpl, token::TokenClient, Address, Env, Vec};
use stellarcade_shared::{TicketCollectionClient, LOTTERY_REQUIRED_ROLES};

use events::{
    AdminChanged, CollectionAdded, CollectionRemoved, DrawCompleted, RewardTokenChanged,
    RewardsFunded, RewardsWithdrawn, RoundCleaned, RoundClosed, RoundFrozen, RoundStarted,
    TicketRedeemed, TransferReward,
};
pub use round::{FrozenCollection, Round, RoundConfig, RoundState, Tier, WinnerPayout};
pub use storage::PERSISTENT_BUMP_LEDGERS;

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized            = 1,
    NotInitialized                = 2,
    /// Caller is not the engine admin.
    Unauthorized                  = 3,
    /// Operation attempted outside its required round phase.
    InvalidPhase                  = 4,
    InvalidAmount                 = 5,
    CollectionAlreadyActive       = 6,
    CollectionNotActive           = 7,
    /// Collection was frozen into an earlier round.
    CollectionAlreadyParticipated = 8,
    /// Collection has not granted the engine burn and pause authority.
    InsufficientCollectionRights  = 9,
    /// Redemption against a collection outside the current round.
    UnknownCollection             = 10,
    NotTicketOwner                = 11,
    InsufficientRewardBalance     = 12,
    IndexOutOfRange               = 13,
    Overflow                      = 14,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct Lottery;

#[contractimpl]
impl Lottery {
    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// Initialize the engine. May only be called once.
    ///
    /// `reward_token` is the SEP-41 contract every prize, redemption reward
    /// and withdrawal is paid in.
    pub fn init(env: Env, admin: Address, reward_token: Address) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        storage::set_admin(&env, &admin);
        storage::set_reward_token(&env, &reward_token);
        storage::save_round(&env, &Round::new(&env));

        Ok(())
    }

    pub fn set_admin(env: Env, admin: Address, new_admin: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;

        storage::set_admin(&env, &new_admin);
        AdminChanged {
            previous: admin,
            admin: new_admin,
        }
        .publish(&env);
        Ok(())
    }

    /// Swap the reward token. Only between rounds.
    pub fn set_reward_token(env: Env, admin: Address, token: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        storage::load_round(&env)?.require(RoundState::NotActive)?;

        storage::set_reward_token(&env, &token);
        RewardTokenChanged { token }.publish(&env);
        Ok(())
    }

    /// Move `amount` reward tokens from `from` into the engine.
    pub fn fund(env: Env, from: Address, amount: i128) -> Result<(), Error> {
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        from.require_auth();

        let token = storage::get_reward_token(&env)?;
        TokenClient::new(&env, &token).transfer(&from, env.current_contract_address(), &amount);

        RewardsFunded { from, amount }.publish(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Round lifecycle
    // -----------------------------------------------------------------------

    /// `NotActive -> Active`. Fixes the round's reward amounts and bumps the
    /// draw number.
    pub fn start_round(env: Env, admin: Address, config: RoundConfig) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        let mut round = storage::load_round(&env)?;
        round.require(RoundState::NotActive)?;
        config.validate()?;

        round.draw_number = round.draw_number.checked_add(1).ok_or(Error::Overflow)?;
        round.config = config.clone();
        round.state = RoundState::Active;
        storage::save_round(&env, &round);

        RoundStarted {
            round: round.draw_number,
            config,
        }
        .publish(&env);
        Ok(())
    }

    /// Admit a collection into the active round.
    ///
    /// The collection must not already be in the round, must never have been
    /// frozen into an earlier round, and must have granted the engine both
    /// `Burner` and `Pauser` roles.
    pub fn add_collection(env: Env, admin: Address, collection: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        let mut round = storage::load_round(&env)?;
        round.require(RoundState::Active)?;

        if round.has_collection(&collection) {
            return Err(Error::CollectionAlreadyActive);
        }
        if storage::is_used(&env, &collection) {
            return Err(Error::CollectionAlreadyParticipated);
        }

        let engine = env.current_contract_address();
        let client = TicketCollectionClient::new(&env, &collection);
        for role in LOTTERY_REQUIRED_ROLES {
            if !client.has_role(&role, &engine) {
                return Err(Error::InsufficientCollectionRights);
            }
        }

        round.collections.push_back(collection.clone());
        storage::save_round(&env, &round);

        CollectionAdded {
            round: round.draw_number,
            collection,
        }
        .publish(&env);
        Ok(())
    }

    /// Drop a collection from the active round. It is not marked as used and
    /// may be added again.
    pub fn remove_collection(env: Env, admin: Address, collection: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        let mut round = storage::load_round(&env)?;
        round.require(RoundState::Active)?;

        round.swap_remove_collection(&collection)?;
        storage::save_round(&env, &round);

        CollectionRemoved {
            round: round.draw_number,
            collection,
        }
        .publish(&env);
        Ok(())
    }

    /// `Active -> Ready`. Snapshots each member's outstanding tickets, marks
    /// every member as used for good and pauses the collections so the
    /// ticket universe cannot move before the draw.
    pub fn freeze_round(env: Env, admin: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        let mut round = storage::load_round(&env)?;
        round.require(RoundState::Active)?;

        let mut frozen = Vec::new(&env);
        for collection in round.collections.iter() {
            let client = TicketCollectionClient::new(&env, &collection);
            frozen.push_back(FrozenCollection {
                tickets: client.total_supply(),
                minted: client.total_minted(),
                paused_by_engine: !client.is_paused(),
                collection,
            });
        }

        round.frozen = frozen;
        round.state = RoundState::Ready;
        let tickets = round.frozen_tickets()?;
        for entry in round.frozen.iter() {
            storage::mark_used(&env, &entry.collection);
        }
        storage::save_round(&env, &round);

        let engine = env.current_contract_address();
        for entry in round.frozen.iter() {
            if entry.paused_by_engine {
                TicketCollectionClient::new(&env, &entry.collection).pause(&engine);
            }
        }

        RoundFrozen {
            round: round.draw_number,
            collections: round.frozen.len(),
            tickets,
        }
        .publish(&env);
        Ok(())
    }

    /// `Ready -> DrawOver`. Draws Jackpot, Level1, Level2 and Level3 in that
    /// order and records the payout list.
    pub fn run_draw(env: Env, admin: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        let mut round = storage::load_round(&env)?;
        round.require(RoundState::Ready)?;

        round.payouts = draw::draw_winners(&env, &round)?;
        round.state = RoundState::DrawOver;
        release_lifted_pauses(&env, &mut round);
        let total = round.total_owed()?;
        storage::save_round(&env, &round);

        DrawCompleted {
            round: round.draw_number,
            winners: round.payouts.len(),
            total,
        }
        .publish(&env);
        Ok(())
    }

    /// `DrawOver -> Closed`. Pays every winner. Fails without paying anyone
    /// if the reward balance cannot cover the whole list.
    pub fn pay_rewards(env: Env, admin: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        let mut round = storage::load_round(&env)?;
        round.require(RoundState::DrawOver)?;

        let total = round.total_owed()?;
        if total > storage::reward_balance(&env)? {
            return Err(Error::InsufficientRewardBalance);
        }

        // State is committed before any token transfer.
        round.state = RoundState::Closed;
        release_lifted_pauses(&env, &mut round);
        storage::save_round(&env, &round);

        let token = TokenClient::new(&env, &storage::get_reward_token(&env)?);
        let engine = env.current_contract_address();
        for payout in round.payouts.iter() {
            if payout.amount > 0 {
                token.transfer(&engine, &payout.recipient, &payout.amount);
            }
            TransferReward {
                round: round.draw_number,
                recipient: payout.recipient,
                amount: payout.amount,
            }
            .publish(&env);
        }

        RoundClosed {
            round: round.draw_number,
            paid: total,
        }
        .publish(&env);
        Ok(())
    }

    /// `Closed -> NotActive`. Clears the payout list and the round's
    /// collection set and unpauses the collections the engine paused. A
    /// collection whose owner lifted that pause at any phase check since the
    /// freeze is left as the owner set it. Used collections stay used.
    pub fn clean_round(env: Env, admin: Address) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        let mut round = storage::load_round(&env)?;
        round.require(RoundState::Closed)?;

        let frozen = round.frozen.clone();
        round.payouts = Vec::new(&env);
        round.collections = Vec::new(&env);
        round.frozen = Vec::new(&env);
        round.state = RoundState::NotActive;
        storage::save_round(&env, &round);

        let engine = env.current_contract_address();
        for entry in frozen.iter() {
            if !entry.paused_by_engine {
                continue;
            }
            let client = TicketCollectionClient::new(&env, &entry.collection);
            // The collection owner may have lifted the pause already.
            if client.is_paused() {
                client.unpause(&engine);
            }
        }

        RoundCleaned {
            round: round.draw_number,
        }
        .publish(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Burn-to-redeem
    // -----------------------------------------------------------------------

    /// Burn `token_id` of `collection` and pay its owner the round's
    /// `burn_reward`. Only while the round is `Active` and only for a member
    /// collection. The holder must have approved the engine for the ticket;
    /// otherwise the collection rejects the burn.
    pub fn redeem_ticket(
        env: Env,
        holder: Address,
        collection: Address,
        token_id: u32,
    ) -> Result<(), Error> {
        holder.require_auth();
        let round = storage::load_round(&env)?;
        round.require(RoundState::Active)?;

        if !round.has_collection(&collection) {
            return Err(Error::UnknownCollection);
        }

        let client = TicketCollectionClient::new(&env, &collection);
        if client.owner_of(&token_id) != holder {
            return Err(Error::NotTicketOwner);
        }

        let reward = round.config.burn_reward;
        if reward > storage::reward_balance(&env)? {
            return Err(Error::InsufficientRewardBalance);
        }

        let engine = env.current_contract_address();
        client.burn(&engine, &token_id);

        if reward > 0 {
            let token = storage::get_reward_token(&env)?;
            TokenClient::new(&env, &token).transfer(&engine, &holder, &reward);
        }

        TicketRedeemed {
            round: round.draw_number,
            holder,
            collection,
            token_id,
            reward,
        }
        .publish(&env);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Withdrawals
    // -----------------------------------------------------------------------

    /// Send `amount` reward tokens to `to`. Admin only, any phase.
    pub fn withdraw_reward_tokens(
        env: Env,
        admin: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        withdraw(&env, &to, amount)
    }

    /// Send `amount` reward tokens to the admin.
    pub fn withdraw_reward_tokens_to_admin(
        env: Env,
        admin: Address,
        amount: i128,
    ) -> Result<(), Error> {
        require_admin(&env, &admin)?;
        withdraw(&env, &admin, amount)
    }

    /// Send the whole reward balance to the admin. Returns the amount sent.
    pub fn withdraw_all_reward_tokens(env: Env, admin: Address) -> Result<i128, Error> {
        require_admin(&env, &admin)?;

        let balance = storage::reward_balance(&env)?;
        if balance > 0 {
            withdraw(&env, &admin, balance)?;
        }
        Ok(balance)
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn current_state(env: Env) -> Result<RoundState, Error> {
        Ok(storage::load_round(&env)?.state)
    }

    pub fn draw_number(env: Env) -> Result<u64, Error> {
        Ok(storage::load_round(&env)?.draw_number)
    }

    pub fn round_config(env: Env) -> Result<RoundConfig, Error> {
        Ok(storage::load_round(&env)?.config)
    }

    pub fn active_collection(env: Env, index: u32) -> Result<Address, Error> {
        storage::load_round(&env)?
            .collections
            .get(index)
            .ok_or(Error::IndexOutOfRange)
    }

    pub fn active_collections(env: Env) -> Result<Vec<Address>, Error> {
        Ok(storage::load_round(&env)?.collections)
    }

    pub fn is_collection_used(env: Env, collection: Address) -> bool {
        storage::is_used(&env, &collection)
    }

    /// Live outstanding tickets across the round's collections.
    pub fn outstanding_ticket_count(env: Env) -> Result<u32, Error> {
        let round = storage::load_round(&env)?;
        live_ticket_count(&env, &round.collections)
    }

    /// Prize fund for the current round.
    ///
    /// Before the freeze this follows the live ticket count, so every
    /// redemption shows up on the next read. From `Ready` on it is computed
    /// from the frozen snapshot and no longer moves.
    pub fn get_prize_fund_volume(env: Env) -> Result<i128, Error> {
        let round = storage::load_round(&env)?;
        let tickets = if round.is_frozen() {
            round.frozen_tickets()?
        } else {
            live_ticket_count(&env, &round.collections)?
        };
        prize_fund::pool_size(tickets, &round.config)
    }

    pub fn get_winner_payout_list(env: Env) -> Result<Vec<WinnerPayout>, Error> {
        Ok(storage::load_round(&env)?.payouts)
    }

    pub fn reward_balance(env: Env) -> Result<i128, Error> {
        storage::reward_balance(&env)
    }

    pub fn admin(env: Env) -> Result<Address, Error> {
        storage::get_admin(&env)
    }

    pub fn reward_token(env: Env) -> Result<Address, Error> {
        storage::get_reward_token(&env)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Verify that `caller` is the stored admin and has signed the invocation.
fn require_admin(env: &Env, caller: &Address) -> Result<(), Error> {
    let admin = storage::get_admin(env)?;
    caller.require_auth();
    if caller != &admin {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

/// Forget the engine's pause on collections whose owner has since unpaused
/// them, so a pause the owner sets again is left in place by `clean_round`.
fn release_lifted_pauses(env: &Env, round: &mut Round) {
    let mut frozen = Vec::new(env);
    for mut entry in round.frozen.iter() {
        if entry.paused_by_engine
            && !TicketCollectionClient::new(env, &entry.collection).is_paused()
        {
            entry.paused_by_engine = false;
        }
        frozen.push_back(entry);
    }
    round.frozen = frozen;
}

fn live_ticket_count(env: &Env, collections: &Vec<Address>) -> Result<u32, Error> {
    let mut total: u32 = 0;
    for collection in collections.iter() {
        let tickets = TicketCollectionClient::new(env, &collection).total_supply();
        total = total.checked_add(tickets).ok_or(Error::Overflow)?;
    }
    Ok(total)
}

fn withdraw(env: &Env, to: &Address, amount: i128) -> Result<(), Error> {
    if amount <= 0 {
        return Err(Error::InvalidAmount);
    }
    if amount > storage::reward_balance(env)? {
        return Err(Error::InsufficientRewardBalance);
    }

    let token = storage::get_reward_token(env)?;
    TokenClient::new(env, &token).transfer(&env.current_contract_address(), to, &amount);

    RewardsWithdrawn {
        to: to.clone(),
        amount,
    }
    .publish(env);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
