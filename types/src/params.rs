//! Reward parameters delivered to the accounting core by governance.
//!
//! Loaded from TOML at startup (every field has a default) and replaceable
//! at runtime through the governance path.

use crate::address::AccountAddress;
use crate::error::PlexusError;
use serde::{Deserialize, Serialize};

/// Parameters consumed by the reward-accounting core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardParams {
    /// Grace period (seconds) after an asset is registered before it carries
    /// power, accrues rewards, or starts decaying.
    #[serde(default)]
    pub reward_start_delay_secs: u64,

    /// Whether a claim whose payout truncates to zero in every denom still
    /// moves the delegation's local index and snapshot pointer forward.
    ///
    /// `true` forgives the sub-unit remainder; `false` leaves the delegation
    /// behind so the remainder keeps accruing until it is worth a whole unit.
    #[serde(default = "default_true")]
    pub forgive_truncated_claims: bool,

    /// The only account allowed to register or update assets and change
    /// these parameters.
    #[serde(default = "default_authority")]
    pub authority: AccountAddress,

    /// Account holding funded rewards until they are claimed.
    #[serde(default = "default_reward_pool")]
    pub reward_pool_account: AccountAddress,

    /// Account holding delegated asset tokens.
    #[serde(default = "default_stake_pool")]
    pub stake_pool_account: AccountAddress,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_true() -> bool {
    true
}

fn default_authority() -> AccountAddress {
    AccountAddress::new("plexus_gov")
}

fn default_reward_pool() -> AccountAddress {
    AccountAddress::new("plexus_reward_pool")
}

fn default_stake_pool() -> AccountAddress {
    AccountAddress::new("plexus_stake_pool")
}

// ── Impl ───────────────────────────────────────────────────────────────

impl RewardParams {
    /// Load parameters from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, PlexusError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PlexusError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse parameters from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, PlexusError> {
        toml::from_str(s).map_err(|e| PlexusError::Config(e.to_string()))
    }

    /// Serialize the parameters to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, PlexusError> {
        toml::to_string_pretty(self).map_err(|e| PlexusError::Config(e.to_string()))
    }
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            reward_start_delay_secs: 0,
            forgive_truncated_claims: default_true(),
            authority: default_authority(),
            reward_pool_account: default_reward_pool(),
            stake_pool_account: default_stake_pool(),
        }
    }
}
