#![cfg(test)]

use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env, String, Vec,
};

use crate::{OracleMarketContract, OracleMarketContractClient, OracleSettings, ThresholdPolicy};

/// A Stellar asset deployed for a test, with an admin able to mint.
pub struct TokenTestContext {
    pub token_address: Address,
    pub token: token::Client<'static>,
    pub admin_client: token::StellarAssetClient<'static>,
}

impl TokenTestContext {
    pub fn deploy(env: &Env, admin: &Address) -> Self {
        let sac = env.register_stellar_asset_contract_v2(admin.clone());
        let token_address = sac.address();
        TokenTestContext {
            token: token::Client::new(env, &token_address),
            admin_client: token::StellarAssetClient::new(env, &token_address),
            token_address,
        }
    }

    pub fn mint(&self, to: &Address, amount: i128) {
        self.admin_client.mint(to, &amount);
    }

    /// Lets `spender` pull up to `amount` from `from`.
    pub fn approve(&self, from: &Address, spender: &Address, amount: i128) {
        self.token.approve(from, spender, &amount, &100_000u32);
    }

    pub fn balance(&self, who: &Address) -> i128 {
        self.token.balance(who)
    }
}

pub const DISPUTE_WINDOW: u64 = 3_600;
pub const ARBITRATION_WINDOW: u64 = 7_200;
pub const INITIAL_THRESHOLD: i128 = 100;

pub fn default_settings() -> OracleSettings {
    OracleSettings {
        initial_threshold: INITIAL_THRESHOLD,
        threshold_policy: ThresholdPolicy::Additive(100),
        dispute_window: DISPUTE_WINDOW,
        arbitration_window: ARBITRATION_WINDOW,
        max_rounds: 5,
    }
}

/// A deployed, initialized contract with separate bet and vote assets.
pub struct MarketTestContext {
    pub env: Env,
    pub client: OracleMarketContractClient<'static>,
    pub admin: Address,
    pub bet: TokenTestContext,
    pub vote: TokenTestContext,
}

impl MarketTestContext {
    pub fn setup() -> Self {
        Self::setup_with(default_settings())
    }

    pub fn setup_with(settings: OracleSettings) -> Self {
        let env = Env::default();
        env.mock_all_auths();

        let admin = Address::generate(&env);
        let bet = TokenTestContext::deploy(&env, &admin);
        let vote = TokenTestContext::deploy(&env, &admin);

        let contract_id = env.register(OracleMarketContract, ());
        let client = OracleMarketContractClient::new(&env, &contract_id);
        client.init(&admin, &bet.token_address, &vote.token_address, &settings);

        MarketTestContext {
            env,
            client,
            admin,
            bet,
            vote,
        }
    }

    pub fn contract(&self) -> Address {
        self.client.address.clone()
    }

    pub fn set_time(&self, timestamp: u64) {
        self.env.ledger().with_mut(|li| li.timestamp = timestamp);
    }

    pub fn outcomes(&self, names: &[&str]) -> Vec<String> {
        let mut out = Vec::new(&self.env);
        for name in names {
            out.push_back(String::from_str(&self.env, name));
        }
        out
    }

    /// Creates an event with betting over `[0, 1000)` and reporting over
    /// `[1000, 2000)`. Clock is left at 0.
    pub fn create_event(&self, oracle: &Address, names: &[&str]) -> u64 {
        let creator = Address::generate(&self.env);
        self.client
            .create_event(&creator, oracle, &self.outcomes(names), &0, &1000, &2000)
    }

    pub fn funded_user(&self, bet_amount: i128, vote_amount: i128) -> Address {
        let user = Address::generate(&self.env);
        if bet_amount > 0 {
            self.bet.mint(&user, bet_amount);
        }
        if vote_amount > 0 {
            self.vote.mint(&user, vote_amount);
        }
        user
    }

    pub fn stake_dispute(&self, who: &Address, round_id: u64, outcome: u32, amount: i128) {
        self.vote.approve(who, &self.contract(), amount);
        self.client.dispute(who, &round_id, &outcome, &amount);
    }

    pub fn cast_vote(&self, who: &Address, round_id: u64, outcome: u32, amount: i128) {
        self.vote.approve(who, &self.contract(), amount);
        self.client.vote_result(who, &round_id, &outcome, &amount);
    }
}
