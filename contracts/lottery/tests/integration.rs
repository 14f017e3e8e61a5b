use soroban_sdk::{
    testutils::Address as _,
    token::{StellarAssetClient, TokenClient},
    Address, Env, Vec,
};

use stellarcade_lottery::{prize_fund, Error, Lottery, LotteryClient, RoundConfig, RoundState};
use stellarcade_shared::Role;
use stellarcade_ticket_nft::{TicketNft, TicketNftClient};

const TICKETS_PER_COLLECTION: [u32; 5] = [24, 31, 17, 40, 22];

fn rewards(level3: i128) -> RoundConfig {
    RoundConfig {
        jackpot: 1_000,
        level1: 100,
        level2: 10,
        level3,
        burn_reward: 1,
    }
}

fn create_collection<'a>(
    env: &'a Env,
    lottery: &Address,
    tickets: u32,
) -> (TicketNftClient<'a>, Vec<Address>) {
    let owner = Address::generate(env);
    let client = TicketNftClient::new(env, &env.register(TicketNft, ()));
    client.init(&owner);
    client.grant_role(&owner, &Role::Minter, &owner);
    client.grant_role(&owner, &Role::Burner, lottery);
    client.grant_role(&owner, &Role::Pauser, lottery);

    let mut holders = Vec::new(env);
    for _ in 0..tickets {
        let holder = Address::generate(env);
        client.mint(&owner, &holder);
        holders.push_back(holder);
    }
    (client, holders)
}

#[test]
fn test_two_rounds_with_lifetime_participation() {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let token_admin = Address::generate(&env);
    let token_addr = env
        .register_stellar_asset_contract_v2(token_admin)
        .address();
    let token = TokenClient::new(&env, &token_addr);

    let lottery_id = env.register(Lottery, ());
    let lottery = LotteryClient::new(&env, &lottery_id);
    lottery.init(&admin, &token_addr);
    StellarAssetClient::new(&env, &token_addr).mint(&lottery_id, &50_000i128);

    let mut collections = Vec::new(&env);
    let mut clients = std::vec::Vec::new();
    for tickets in TICKETS_PER_COLLECTION {
        let (client, holders) = create_collection(&env, &lottery_id, tickets);
        collections.push_back(client.address.clone());
        clients.push((client, holders));
    }

    // Round 1: first three collections; the first is drained by half and
    // then withdrawn before the freeze.
    lottery.start_round(&admin, &rewards(10));
    for i in 0..3u32 {
        lottery.add_collection(&admin, &collections.get(i).unwrap());
    }

    let burned = TICKETS_PER_COLLECTION[0] / 2;
    {
        let (first, holders) = &clients[0];
        for token_id in 0..burned {
            let holder = holders.get(token_id).unwrap();
            first.approve(&holder, &lottery_id, &token_id);
            lottery.redeem_ticket(&holder, &first.address, &token_id);
            assert_eq!(token.balance(&holder), 1);
        }
    }
    lottery.remove_collection(&admin, &collections.get(0).unwrap());

    lottery.freeze_round(&admin);
    let round_one_tickets = TICKETS_PER_COLLECTION[1] + TICKETS_PER_COLLECTION[2];
    assert_eq!(
        lottery.get_prize_fund_volume(),
        prize_fund::pool_size(round_one_tickets, &rewards(10)).unwrap()
    );
    lottery.run_draw(&admin);
    lottery.pay_rewards(&admin);
    assert_eq!(lottery.current_state(), RoundState::Closed);
    lottery.clean_round(&admin);
    assert_eq!(lottery.current_state(), RoundState::NotActive);
    assert_eq!(lottery.get_winner_payout_list().len(), 0);

    // Round 2: the frozen collections are barred for good, the withdrawn one
    // comes back with its burned tickets gone.
    lottery.start_round(&admin, &rewards(1));
    assert_eq!(lottery.draw_number(), 2);
    lottery.add_collection(&admin, &collections.get(3).unwrap());
    lottery.add_collection(&admin, &collections.get(4).unwrap());

    for i in 1..3u32 {
        let result = lottery.try_add_collection(&admin, &collections.get(i).unwrap());
        assert_eq!(result, Err(Ok(Error::CollectionAlreadyParticipated)));
    }
    lottery.add_collection(&admin, &collections.get(0).unwrap());

    lottery.freeze_round(&admin);
    let round_two_tickets = TICKETS_PER_COLLECTION[0] - burned
        + TICKETS_PER_COLLECTION[3]
        + TICKETS_PER_COLLECTION[4];
    let volume = lottery.get_prize_fund_volume();
    assert_eq!(
        volume,
        prize_fund::pool_size(round_two_tickets, &rewards(1)).unwrap()
    );

    lottery.run_draw(&admin);
    let payouts = lottery.get_winner_payout_list();
    let total: i128 = payouts.iter().map(|p| p.amount).sum();
    assert_eq!(total, volume);

    let before = lottery.reward_balance();
    lottery.pay_rewards(&admin);
    assert_eq!(lottery.reward_balance(), before - volume);
}
