//! Shared interfaces for Stellarcade lottery contracts.
//!
//! The lottery engine never links against a concrete ticket collection.
//! It talks to any contract exposing [`TicketCollectionInterface`] through the
//! generated [`TicketCollectionClient`].
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::{contractclient, contracttype, Address, Env};

/// Capability roles a ticket collection can grant to an account.
///
/// The lottery needs `Burner` (burn-to-redeem) and `Pauser` (freezing the
/// ticket supply at draw time) on every collection it admits.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Role {
    Admin = 0,
    Minter = 1,
    Burner = 2,
    Pauser = 3,
}

/// Capability surface the lottery engine requires from a ticket collection.
#[contractclient(name = "TicketCollectionClient")]
pub trait TicketCollectionInterface {
    /// Mint a fresh ticket to `to`. Returns the new ticket id.
    fn mint(env: Env, minter: Address, to: Address) -> u32;

    /// Destroy `token_id`. `burner` must hold `Role::Burner` and be the owner
    /// of, or approved for, the ticket.
    fn burn(env: Env, burner: Address, token_id: u32);

    fn pause(env: Env, pauser: Address);

    fn unpause(env: Env, pauser: Address);

    fn is_paused(env: Env) -> bool;

    fn owner_of(env: Env, token_id: u32) -> Address;

    fn get_approved(env: Env, token_id: u32) -> Option<Address>;

    /// Outstanding tickets: minted minus burned.
    fn total_supply(env: Env) -> u32;

    /// Tickets ever minted. Ids are assigned sequentially from 0, so every
    /// ticket minted later has an id at or above this value.
    fn total_minted(env: Env) -> u32;

    /// Ticket id at `index` in `[0, total_supply())`.
    fn token_by_index(env: Env, index: u32) -> u32;

    fn has_role(env: Env, role: Role, account: Address) -> bool;
}

/// Roles a collection must grant the lottery before it can be admitted.
pub const LOTTERY_REQUIRED_ROLES: [Role; 2] = [Role::Burner, Role::Pauser];
