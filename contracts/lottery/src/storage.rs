//! Storage layout.
//!
//! - `instance()`: Admin, RewardToken. Fixed deployment config.
//! - `persistent()`: the single `Round` entry and one `UsedCollection` flag per
//!   collection that ever reached a freeze. Both TTL-bumped on every write.

use soroban_sdk::{contracttype, token::TokenClient, Address, Env};

use crate::round::Round;
use crate::Error;

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() ---
    Admin,
    RewardToken,
    // --- persistent() ---
    Round,
    /// Presence flag: the collection was frozen into a past or current round
    /// and can never be admitted again.
    UsedCollection(Address),
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

pub fn get_admin(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn get_reward_token(env: &Env) -> Result<Address, Error> {
    env.storage()
        .instance()
        .get(&DataKey::RewardToken)
        .ok_or(Error::NotInitialized)
}

pub fn set_reward_token(env: &Env, token: &Address) {
    env.storage().instance().set(&DataKey::RewardToken, token);
}

pub fn load_round(env: &Env) -> Result<Round, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Round)
        .ok_or(Error::NotInitialized)
}

pub fn save_round(env: &Env, round: &Round) {
    let key = DataKey::Round;
    env.storage().persistent().set(&key, round);
    extend_persistent_ttl(env, &key);
}

pub fn is_used(env: &Env, collection: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::UsedCollection(collection.clone()))
}

pub fn mark_used(env: &Env, collection: &Address) {
    let key = DataKey::UsedCollection(collection.clone());
    env.storage().persistent().set(&key, &());
    extend_persistent_ttl(env, &key);
}

/// Reward tokens currently held by the engine.
pub fn reward_balance(env: &Env) -> Result<i128, Error> {
    let token = get_reward_token(env)?;
    Ok(TokenClient::new(env, &token).balance(&env.current_contract_address()))
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}
