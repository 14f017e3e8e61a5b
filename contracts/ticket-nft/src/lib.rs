//! Stellarcade Ticket NFT Contract
//!
//! A role-gated non-fungible ticket collection. Each ticket is one entry in a
//! lottery round once the collection is admitted by the lottery engine.
//!
//! ## Roles
//! - `Admin`: grants and revokes every role.
//! - `Minter`: issues new tickets.
//! - `Burner`: destroys tickets it owns or has been approved for.
//! - `Pauser`: freezes minting, burning and transfers.
//!
//! ## Enumeration
//! Outstanding tickets are kept in a dense index `[0, total_supply)`:
//! `TokenAt(index) -> token_id` and `IndexOf(token_id) -> index`. A burn moves
//! the last entry into the freed slot, so the index never has holes and the
//! lottery can address tickets by position without reading the whole set.
//!
//! ## Storage Strategy
//! - `instance()`: Admin, Paused, NextTokenId, Supply.
//! - `persistent()`: role grants, owners, approvals, balances and the
//!   enumeration index, each TTL-bumped on write.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{
    contract, contracterror, contractevent, contractimpl, contracttype, Address, Env,
};
use stellarcade_shared::Role;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Persistent storage TTL in ledgers (~30 days at 5 s/ledger).
pub const PERSISTENT_BUMP_LEDGERS: u32 = 518_400;

// ---------------------------------------------------------------------------
// Error Types
// ---------------------------------------------------------------------------

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized   = 1,
    NotInitialized       = 2,
    /// Caller does not hold the role the operation requires.
    MissingRole          = 3,
    /// Operation is blocked while the collection is paused.
    EnforcedPause        = 4,
    /// `unpause` called on a collection that is not paused.
    ExpectedPause        = 5,
    NonexistentToken     = 6,
    /// Burner is neither the owner of nor approved for the ticket.
    InsufficientApproval = 7,
    IncorrectOwner       = 8,
    IndexOutOfRange      = 9,
    Overflow             = 10,
}

// ---------------------------------------------------------------------------
// Storage Types
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    // --- instance() ---
    Admin,
    Paused,
    NextTokenId,
    Supply,
    // --- persistent() ---
    RoleGrant(Role, Address),
    Owner(u32),
    Approved(u32),
    Balance(Address),
    TokenAt(u32),
    IndexOf(u32),
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[contractevent]
pub struct Minted {
    #[topic]
    pub to: Address,
    pub token_id: u32,
}

#[contractevent]
pub struct Burned {
    #[topic]
    pub owner: Address,
    pub token_id: u32,
}

#[contractevent]
pub struct Approved {
    #[topic]
    pub owner: Address,
    pub spender: Address,
    pub token_id: u32,
}

#[contractevent]
pub struct Transferred {
    #[topic]
    pub from: Address,
    #[topic]
    pub to: Address,
    pub token_id: u32,
}

#[contractevent]
pub struct RoleGranted {
    #[topic]
    pub role: Role,
    pub account: Address,
}

#[contractevent]
pub struct RoleRevoked {
    #[topic]
    pub role: Role,
    pub account: Address,
}

#[contractevent]
pub struct PauseChanged {
    pub paused: bool,
    pub by: Address,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[contract]
pub struct TicketNft;

#[contractimpl]
impl TicketNft {
    /// Initialize the collection and grant `Role::Admin` to `admin`.
    pub fn init(env: Env, admin: Address) -> Result<(), Error> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(Error::AlreadyInitialized);
        }

        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Paused, &false);
        env.storage().instance().set(&DataKey::NextTokenId, &0u32);
        env.storage().instance().set(&DataKey::Supply, &0u32);

        set_role(&env, Role::Admin, &admin, true);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Roles
    // -----------------------------------------------------------------------

    pub fn grant_role(env: Env, admin: Address, role: Role, account: Address) -> Result<(), Error> {
        require_initialized(&env)?;
        require_role(&env, Role::Admin, &admin)?;

        set_role(&env, role, &account, true);
        RoleGranted { role, account }.publish(&env);
        Ok(())
    }

    pub fn revoke_role(env: Env, admin: Address, role: Role, account: Address) -> Result<(), Error> {
        require_initialized(&env)?;
        require_role(&env, Role::Admin, &admin)?;

        set_role(&env, role, &account, false);
        RoleRevoked { role, account }.publish(&env);
        Ok(())
    }

    pub fn has_role(env: Env, role: Role, account: Address) -> bool {
        has_role_internal(&env, role, &account)
    }

    // -----------------------------------------------------------------------
    // Supply
    // -----------------------------------------------------------------------

    /// Issue the next ticket id to `to`. Minter only; blocked while paused.
    pub fn mint(env: Env, minter: Address, to: Address) -> Result<u32, Error> {
        require_initialized(&env)?;
        require_role(&env, Role::Minter, &minter)?;
        require_not_paused(&env)?;

        let token_id = get_u32(&env, DataKey::NextTokenId);
        let next = token_id.checked_add(1).ok_or(Error::Overflow)?;
        env.storage().instance().set(&DataKey::NextTokenId, &next);

        set_persistent(&env, DataKey::Owner(token_id), &to);
        add_balance(&env, &to, 1)?;
        push_index(&env, token_id)?;

        Minted { to, token_id }.publish(&env);

        Ok(token_id)
    }

    /// Destroy `token_id`. The burner needs `Role::Burner` and must own the
    /// ticket or be its approved spender.
    pub fn burn(env: Env, burner: Address, token_id: u32) -> Result<(), Error> {
        require_initialized(&env)?;
        require_role(&env, Role::Burner, &burner)?;
        require_not_paused(&env)?;

        let owner = get_owner(&env, token_id)?;
        if burner != owner && get_approved_internal(&env, token_id).as_ref() != Some(&burner) {
            return Err(Error::InsufficientApproval);
        }

        env.storage().persistent().remove(&DataKey::Owner(token_id));
        env.storage().persistent().remove(&DataKey::Approved(token_id));
        sub_balance(&env, &owner, 1)?;
        swap_remove_index(&env, token_id)?;

        Burned { owner, token_id }.publish(&env);

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pause
    // -----------------------------------------------------------------------

    pub fn pause(env: Env, pauser: Address) -> Result<(), Error> {
        require_initialized(&env)?;
        require_role(&env, Role::Pauser, &pauser)?;
        require_not_paused(&env)?;

        env.storage().instance().set(&DataKey::Paused, &true);
        PauseChanged { paused: true, by: pauser }.publish(&env);
        Ok(())
    }

    pub fn unpause(env: Env, pauser: Address) -> Result<(), Error> {
        require_initialized(&env)?;
        require_role(&env, Role::Pauser, &pauser)?;
        if !is_paused_internal(&env) {
            return Err(Error::ExpectedPause);
        }

        env.storage().instance().set(&DataKey::Paused, &false);
        PauseChanged { paused: false, by: pauser }.publish(&env);
        Ok(())
    }

    pub fn is_paused(env: Env) -> bool {
        is_paused_internal(&env)
    }

    // -----------------------------------------------------------------------
    // Ownership
    // -----------------------------------------------------------------------

    /// Approve `spender` to act on `token_id`. Allowed while paused.
    pub fn approve(env: Env, owner: Address, spender: Address, token_id: u32) -> Result<(), Error> {
        require_initialized(&env)?;
        owner.require_auth();

        if get_owner(&env, token_id)? != owner {
            return Err(Error::IncorrectOwner);
        }

        set_persistent(&env, DataKey::Approved(token_id), &spender);
        Approved { owner, spender, token_id }.publish(&env);
        Ok(())
    }

    pub fn transfer(env: Env, from: Address, to: Address, token_id: u32) -> Result<(), Error> {
        require_initialized(&env)?;
        from.require_auth();
        require_not_paused(&env)?;

        if get_owner(&env, token_id)? != from {
            return Err(Error::IncorrectOwner);
        }

        env.storage().persistent().remove(&DataKey::Approved(token_id));
        set_persistent(&env, DataKey::Owner(token_id), &to);
        sub_balance(&env, &from, 1)?;
        add_balance(&env, &to, 1)?;

        Transferred { from, to, token_id }.publish(&env);
        Ok(())
    }

    pub fn owner_of(env: Env, token_id: u32) -> Result<Address, Error> {
        get_owner(&env, token_id)
    }

    pub fn get_approved(env: Env, token_id: u32) -> Option<Address> {
        get_approved_internal(&env, token_id)
    }

    pub fn balance_of(env: Env, owner: Address) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::Balance(owner))
            .unwrap_or(0)
    }

    // -----------------------------------------------------------------------
    // Enumeration
    // -----------------------------------------------------------------------

    /// Outstanding tickets: minted minus burned.
    pub fn total_supply(env: Env) -> u32 {
        get_u32(&env, DataKey::Supply)
    }

    /// Every ticket id ever issued, burned or not.
    pub fn total_minted(env: Env) -> u32 {
        get_u32(&env, DataKey::NextTokenId)
    }

    pub fn token_by_index(env: Env, index: u32) -> Result<u32, Error> {
        env.storage()
            .persistent()
            .get(&DataKey::TokenAt(index))
            .ok_or(Error::IndexOutOfRange)
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn require_initialized(env: &Env) -> Result<(), Error> {
    if !env.storage().instance().has(&DataKey::Admin) {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

fn require_role(env: &Env, role: Role, caller: &Address) -> Result<(), Error> {
    caller.require_auth();
    if !has_role_internal(env, role, caller) {
        return Err(Error::MissingRole);
    }
    Ok(())
}

fn require_not_paused(env: &Env) -> Result<(), Error> {
    if is_paused_internal(env) {
        return Err(Error::EnforcedPause);
    }
    Ok(())
}

fn has_role_internal(env: &Env, role: Role, account: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::RoleGrant(role, account.clone()))
}

fn set_role(env: &Env, role: Role, account: &Address, granted: bool) {
    let key = DataKey::RoleGrant(role, account.clone());
    if granted {
        set_persistent(env, key, &());
    } else {
        env.storage().persistent().remove(&key);
    }
}

fn is_paused_internal(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

fn get_owner(env: &Env, token_id: u32) -> Result<Address, Error> {
    env.storage()
        .persistent()
        .get(&DataKey::Owner(token_id))
        .ok_or(Error::NonexistentToken)
}

fn get_approved_internal(env: &Env, token_id: u32) -> Option<Address> {
    env.storage().persistent().get(&DataKey::Approved(token_id))
}

fn get_u32(env: &Env, key: DataKey) -> u32 {
    env.storage().instance().get(&key).unwrap_or(0)
}

fn add_balance(env: &Env, owner: &Address, amount: u32) -> Result<(), Error> {
    let key = DataKey::Balance(owner.clone());
    let balance: u32 = env.storage().persistent().get(&key).unwrap_or(0);
    let balance = balance.checked_add(amount).ok_or(Error::Overflow)?;
    set_persistent(env, key, &balance);
    Ok(())
}

fn sub_balance(env: &Env, owner: &Address, amount: u32) -> Result<(), Error> {
    let key = DataKey::Balance(owner.clone());
    let balance: u32 = env.storage().persistent().get(&key).unwrap_or(0);
    let balance = balance.checked_sub(amount).ok_or(Error::Overflow)?;
    if balance == 0 {
        env.storage().persistent().remove(&key);
    } else {
        set_persistent(env, key, &balance);
    }
    Ok(())
}

/// Append `token_id` at the end of the dense enumeration index.
fn push_index(env: &Env, token_id: u32) -> Result<(), Error> {
    let supply = get_u32(env, DataKey::Supply);
    set_persistent(env, DataKey::TokenAt(supply), &token_id);
    set_persistent(env, DataKey::IndexOf(token_id), &supply);

    let supply = supply.checked_add(1).ok_or(Error::Overflow)?;
    env.storage().instance().set(&DataKey::Supply, &supply);
    Ok(())
}

/// Remove `token_id` from the enumeration index, moving the last entry into
/// its slot.
fn swap_remove_index(env: &Env, token_id: u32) -> Result<(), Error> {
    let supply = get_u32(env, DataKey::Supply);
    let last = supply.checked_sub(1).ok_or(Error::Overflow)?;
    let index: u32 = env
        .storage()
        .persistent()
        .get(&DataKey::IndexOf(token_id))
        .ok_or(Error::NonexistentToken)?;

    if index != last {
        let moved: u32 = env
            .storage()
            .persistent()
            .get(&DataKey::TokenAt(last))
            .ok_or(Error::IndexOutOfRange)?;
        set_persistent(env, DataKey::TokenAt(index), &moved);
        set_persistent(env, DataKey::IndexOf(moved), &index);
    }

    env.storage().persistent().remove(&DataKey::TokenAt(last));
    env.storage().persistent().remove(&DataKey::IndexOf(token_id));
    env.storage().instance().set(&DataKey::Supply, &last);
    Ok(())
}

fn set_persistent<V>(env: &Env, key: DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(&key, value);
    env.storage()
        .persistent()
        .extend_ttl(&key, PERSISTENT_BUMP_LEDGERS, PERSISTENT_BUMP_LEDGERS);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test;
