//! Events published by the lottery. Round number and subject are topics.

use soroban_sdk::{contractevent, Address};

use crate::round::{RoundConfig, Tier};

#[contractevent]
pub struct RoundStarted {
    #[topic]
    pub round: u64,
    pub config: RoundConfig,
}

#[contractevent]
pub struct CollectionAdded {
    #[topic]
    pub round: u64,
    #[topic]
    pub collection: Address,
}

#[contractevent]
pub struct CollectionRemoved {
    #[topic]
    pub round: u64,
    #[topic]
    pub collection: Address,
}

#[contractevent]
pub struct RoundFrozen {
    #[topic]
    pub round: u64,
    pub collections: u32,
    pub tickets: u32,
}

#[contractevent]
pub struct DrawStarted {
    #[topic]
    pub round: u64,
    #[topic]
    pub tier: Tier,
}

#[contractevent]
pub struct DrawFinished {
    #[topic]
    pub round: u64,
    #[topic]
    pub tier: Tier,
}

#[contractevent]
pub struct DrawCompleted {
    #[topic]
    pub round: u64,
    pub winners: u32,
    pub total: i128,
}

#[contractevent]
pub struct TransferReward {
    #[topic]
    pub round: u64,
    #[topic]
    pub recipient: Address,
    pub amount: i128,
}

#[contractevent]
pub struct RoundClosed {
    #[topic]
    pub round: u64,
    pub paid: i128,
}

#[contractevent]
pub struct RoundCleaned {
    #[topic]
    pub round: u64,
}

/// Burn-to-redeem payout; not part of the tiered prize fund.
#[contractevent]
pub struct TicketRedeemed {
    #[topic]
    pub round: u64,
    #[topic]
    pub holder: Address,
    pub collection: Address,
    pub token_id: u32,
    pub reward: i128,
}

#[contractevent]
pub struct RewardsFunded {
    #[topic]
    pub from: Address,
    pub amount: i128,
}

#[contractevent]
pub struct RewardsWithdrawn {
    #[topic]
    pub to: Address,
    pub amount: i128,
}

#[contractevent]
pub struct AdminChanged {
    pub previous: Address,
    pub admin: Address,
}

#[contractevent]
pub struct RewardTokenChanged {
    pub token: Address,
}
