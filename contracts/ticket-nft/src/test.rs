//! Unit tests for the Ticket NFT contract.
use super::*;
use soroban_sdk::{testutils::Address as _, Address, Env};

struct Setup<'a> {
    client: TicketNftClient<'a>,
    admin: Address,
    minter: Address,
    burner: Address,
}

fn setup(env: &Env) -> Setup<'_> {
    let admin = Address::generate(env);
    let minter = Address::generate(env);
    let burner = Address::generate(env);

    let contract_id = env.register(TicketNft, ());
    let client = TicketNftClient::new(env, &contract_id);

    env.mock_all_auths();
    client.init(&admin);
    client.grant_role(&admin, &Role::Minter, &minter);
    client.grant_role(&admin, &Role::Burner, &burner);
    client.grant_role(&admin, &Role::Pauser, &admin);

    Setup { client, admin, minter, burner }
}

#[test]
fn test_init_rejects_reinit() {
    let env = Env::default();
    let s = setup(&env);

    let result = s.client.try_init(&s.admin);
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_mint_assigns_sequential_ids_and_counts() {
    let env = Env::default();
    let s = setup(&env);
    let holder = Address::generate(&env);

    assert_eq!(s.client.mint(&s.minter, &holder), 0);
    assert_eq!(s.client.mint(&s.minter, &holder), 1);

    assert_eq!(s.client.owner_of(&1), holder);
    assert_eq!(s.client.balance_of(&holder), 2);
    assert_eq!(s.client.total_supply(), 2);
    assert_eq!(s.client.total_minted(), 2);
}

#[test]
fn test_mint_requires_minter_role() {
    let env = Env::default();
    let s = setup(&env);
    let outsider = Address::generate(&env);

    let result = s.client.try_mint(&outsider, &outsider);
    assert_eq!(result, Err(Ok(Error::MissingRole)));
}

#[test]
fn test_burn_requires_approval_of_burner() {
    let env = Env::default();
    let s = setup(&env);
    let holder = Address::generate(&env);
    let id = s.client.mint(&s.minter, &holder);

    let result = s.client.try_burn(&s.burner, &id);
    assert_eq!(result, Err(Ok(Error::InsufficientApproval)));

    s.client.approve(&holder, &s.burner, &id);
    s.client.burn(&s.burner, &id);

    assert_eq!(s.client.total_supply(), 0);
    assert_eq!(s.client.total_minted(), 1);
    assert_eq!(s.client.balance_of(&holder), 0);
    assert_eq!(s.client.try_owner_of(&id), Err(Ok(Error::NonexistentToken)));
}

#[test]
fn test_burn_requires_burner_role_even_for_owner() {
    let env = Env::default();
    let s = setup(&env);
    let holder = Address::generate(&env);
    let id = s.client.mint(&s.minter, &holder);

    let result = s.client.try_burn(&holder, &id);
    assert_eq!(result, Err(Ok(Error::MissingRole)));
}

#[test]
fn test_burn_keeps_enumeration_dense() {
    let env = Env::default();
    let s = setup(&env);
    let holder = Address::generate(&env);
    for _ in 0..4 {
        s.client.mint(&s.minter, &holder);
    }

    s.client.approve(&holder, &s.burner, &1);
    s.client.burn(&s.burner, &1);

    // Last ticket (3) fills the slot freed by ticket 1.
    assert_eq!(s.client.total_supply(), 3);
    assert_eq!(s.client.token_by_index(&0), 0);
    assert_eq!(s.client.token_by_index(&1), 3);
    assert_eq!(s.client.token_by_index(&2), 2);
    assert_eq!(s.client.try_token_by_index(&3), Err(Ok(Error::IndexOutOfRange)));

    // Burning the entry at the tail needs no move.
    s.client.approve(&holder, &s.burner, &2);
    s.client.burn(&s.burner, &2);
    assert_eq!(s.client.total_supply(), 2);
    assert_eq!(s.client.token_by_index(&1), 3);
}

#[test]
fn test_pause_blocks_mint_burn_transfer_but_not_approve() {
    let env = Env::default();
    let s = setup(&env);
    let holder = Address::generate(&env);
    let other = Address::generate(&env);
    let id = s.client.mint(&s.minter, &holder);

    s.client.pause(&s.admin);
    assert!(s.client.is_paused());

    assert_eq!(s.client.try_mint(&s.minter, &holder), Err(Ok(Error::EnforcedPause)));
    assert_eq!(s.client.try_transfer(&holder, &other, &id), Err(Ok(Error::EnforcedPause)));

    s.client.approve(&holder, &s.burner, &id);
    assert_eq!(s.client.try_burn(&s.burner, &id), Err(Ok(Error::EnforcedPause)));

    assert_eq!(s.client.try_pause(&s.admin), Err(Ok(Error::EnforcedPause)));

    s.client.unpause(&s.admin);
    assert_eq!(s.client.try_unpause(&s.admin), Err(Ok(Error::ExpectedPause)));
    s.client.burn(&s.burner, &id);
    assert_eq!(s.client.total_supply(), 0);
}

#[test]
fn test_transfer_moves_ownership_and_clears_approval() {
    let env = Env::default();
    let s = setup(&env);
    let holder = Address::generate(&env);
    let other = Address::generate(&env);
    let id = s.client.mint(&s.minter, &holder);

    s.client.approve(&holder, &s.burner, &id);
    s.client.transfer(&holder, &other, &id);

    assert_eq!(s.client.owner_of(&id), other);
    assert_eq!(s.client.get_approved(&id), None);
    assert_eq!(s.client.balance_of(&holder), 0);
    assert_eq!(s.client.balance_of(&other), 1);

    let result = s.client.try_transfer(&holder, &other, &id);
    assert_eq!(result, Err(Ok(Error::IncorrectOwner)));
}

#[test]
fn test_grant_and_revoke_role() {
    let env = Env::default();
    let s = setup(&env);
    let account = Address::generate(&env);

    assert!(!s.client.has_role(&Role::Pauser, &account));
    s.client.grant_role(&s.admin, &Role::Pauser, &account);
    assert!(s.client.has_role(&Role::Pauser, &account));
    s.client.revoke_role(&s.admin, &Role::Pauser, &account);
    assert!(!s.client.has_role(&Role::Pauser, &account));

    let result = s.client.try_grant_role(&account, &Role::Minter, &account);
    assert_eq!(result, Err(Ok(Error::MissingRole)));
}
