//! Scenario files: a starting state plus an ordered list of steps.
//!
//! ```toml
//! start_time = 1000
//! validators = ["val1"]
//!
//! [params]
//! reward_start_delay_secs = 0
//!
//! [[balances]]
//! account = "user1"
//! coins = ["1000000ualpha"]
//!
//! [[steps]]
//! kind = "register"
//! asset = { denom = "ualpha", reward_weight = "2" }
//!
//! [[steps]]
//! kind = "delegate"
//! delegator = "user1"
//! validator = "val1"
//! coin = "1000000ualpha"
//! ```

use anyhow::Context;
use plexus_nullables::{NullClock, NullLedger, NullPowerStore};
use plexus_rewards::{AssetParams, RewardEngine, WeightChange};
use plexus_types::{AccountAddress, Coin, Coins, RewardParams, ValidatorId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

type Engine = RewardEngine<NullLedger, NullPowerStore>;

#[derive(Clone, Debug, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub params: RewardParams,
    #[serde(default)]
    pub start_time: u64,
    /// Assets registered at `start_time` without a governance call.
    #[serde(default)]
    pub genesis: Vec<AssetParams>,
    pub validators: Vec<String>,
    #[serde(default)]
    pub balances: Vec<Balance>,
    pub steps: Vec<Step>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Balance {
    pub account: String,
    /// Coins as `"<amount><denom>"`.
    pub coins: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    Register {
        caller: Option<String>,
        asset: AssetParams,
    },
    Update {
        caller: Option<String>,
        asset: AssetParams,
    },
    Delegate {
        delegator: String,
        validator: String,
        coin: String,
    },
    Undelegate {
        delegator: String,
        validator: String,
        coin: String,
    },
    Fund {
        source: String,
        validator: String,
        coins: Vec<String>,
    },
    Advance {
        secs: u64,
    },
    Tick {
        denoms: Option<Vec<String>>,
    },
    Claim {
        delegator: String,
        validator: String,
        denom: String,
    },
}

impl Step {
    fn kind(&self) -> &'static str {
        match self {
            Step::Register { .. } => "register",
            Step::Update { .. } => "update",
            Step::Delegate { .. } => "delegate",
            Step::Undelegate { .. } => "undelegate",
            Step::Fund { .. } => "fund",
            Step::Advance { .. } => "advance",
            Step::Tick { .. } => "tick",
            Step::Claim { .. } => "claim",
        }
    }
}

/// A reward payout observed while replaying.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Payout {
    pub step: usize,
    /// `claim`, or the position change that settled pending rewards.
    pub via: &'static str,
    pub delegator: String,
    pub validator: String,
    pub denom: String,
    pub coins: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub payouts: Vec<Payout>,
    pub weight_changes: Vec<WeightChange>,
    /// Final balances of every seeded account and both pools.
    pub balances: BTreeMap<String, String>,
    pub final_time: u64,
    pub state_hash: String,
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

/// Replay `scenario` from scratch. The first failing step aborts the run.
pub fn run(scenario: &Scenario) -> anyhow::Result<Report> {
    let clock = NullClock::new(scenario.start_time);
    let mut ledger = NullLedger::new();
    for balance in &scenario.balances {
        let account = AccountAddress::new(balance.account.as_str());
        for coin in &balance.coins {
            ledger.mint(&account, parse_coin(coin)?);
        }
    }
    let power = NullPowerStore::with_validators(scenario.validators.iter().map(String::as_str));
    let mut engine = RewardEngine::new(scenario.params.clone(), ledger, power);
    engine
        .init_genesis(scenario.genesis.clone(), clock.now())
        .context("genesis")?;

    let mut report = Report {
        payouts: Vec::new(),
        weight_changes: Vec::new(),
        balances: BTreeMap::new(),
        final_time: 0,
        state_hash: String::new(),
    };
    for (index, step) in scenario.steps.iter().enumerate() {
        apply(&mut engine, &clock, index, step, &mut report)
            .with_context(|| format!("step {index} ({})", step.kind()))?;
    }

    let mut accounts: Vec<AccountAddress> = scenario
        .balances
        .iter()
        .map(|b| AccountAddress::new(b.account.as_str()))
        .collect();
    accounts.push(engine.params().reward_pool_account.clone());
    accounts.push(engine.params().stake_pool_account.clone());
    for account in accounts {
        let held = engine.ledger().balances_of(&account);
        report.balances.insert(account.to_string(), held.to_string());
    }
    report.final_time = clock.now().as_secs();
    report.state_hash = hex::encode(engine.state_hash()?);
    Ok(report)
}

fn apply(
    engine: &mut Engine,
    clock: &NullClock,
    index: usize,
    step: &Step,
    report: &mut Report,
) -> anyhow::Result<()> {
    let authority = engine.params().authority.clone();
    match step {
        Step::Register { caller, asset } => {
            let caller = caller.as_deref().map(AccountAddress::new).unwrap_or_else(|| authority.clone());
            engine.register_asset(&caller, asset.clone(), clock.now())?;
        }
        Step::Update { caller, asset } => {
            let caller = caller.as_deref().map(AccountAddress::new).unwrap_or_else(|| authority.clone());
            engine.update_asset(&caller, asset.clone())?;
        }
        Step::Delegate {
            delegator,
            validator,
            coin,
        } => {
            let coin = parse_coin(coin)?;
            let denom = coin.denom.clone();
            let settled = engine.delegate(
                &AccountAddress::new(delegator.as_str()),
                &ValidatorId::new(validator.as_str()),
                coin,
            )?;
            record_payout(report, index, "delegate", delegator, validator, &denom, &settled, false);
        }
        Step::Undelegate {
            delegator,
            validator,
            coin,
        } => {
            let coin = parse_coin(coin)?;
            let denom = coin.denom.clone();
            let settled = engine.undelegate(
                &AccountAddress::new(delegator.as_str()),
                &ValidatorId::new(validator.as_str()),
                coin,
            )?;
            record_payout(report, index, "undelegate", delegator, validator, &denom, &settled, false);
        }
        Step::Fund {
            source,
            validator,
            coins,
        } => {
            let parsed = coins.iter().map(|c| parse_coin(c)).collect::<anyhow::Result<Vec<_>>>()?;
            let coins = Coins::try_from_coins(parsed)?;
            engine.add_to_reward_pool(
                &AccountAddress::new(source.as_str()),
                &ValidatorId::new(validator.as_str()),
                &coins,
            )?;
        }
        Step::Advance { secs } => {
            let now = clock.advance(*secs);
            tracing::debug!(by = *secs, now = %now, "clock advanced");
        }
        Step::Tick { denoms } => {
            let changes = match denoms {
                Some(denoms) => engine.tick_assets(denoms, clock.now())?,
                None => engine.tick(clock.now())?,
            };
            report.weight_changes.extend(changes);
        }
        Step::Claim {
            delegator,
            validator,
            denom,
        } => {
            let paid = engine.claim(
                &AccountAddress::new(delegator.as_str()),
                &ValidatorId::new(validator.as_str()),
                denom,
            )?;
            record_payout(report, index, "claim", delegator, validator, denom, &paid, true);
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn record_payout(
    report: &mut Report,
    step: usize,
    via: &'static str,
    delegator: &str,
    validator: &str,
    denom: &str,
    coins: &Coins,
    keep_empty: bool,
) {
    if coins.is_empty() && !keep_empty {
        return;
    }
    report.payouts.push(Payout {
        step,
        via,
        delegator: delegator.to_string(),
        validator: validator.to_string(),
        denom: denom.to_string(),
        coins: coins.to_string(),
    });
}

fn parse_coin(text: &str) -> anyhow::Result<Coin> {
    text.parse::<Coin>()
        .with_context(|| format!("bad coin {text:?}"))
}
