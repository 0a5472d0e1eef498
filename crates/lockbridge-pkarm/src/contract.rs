//! Source-chain lock contract model
//!
//! Mirrors the lock contract's bookkeeping so deposits can be replayed and
//! checked off-chain:
//! - a challenge binds to its first depositor; other addresses are rejected
//! - repeated locks by the same (address, challenge) accumulate
//! - only the operator can withdraw, bounded by the contract balance

use std::collections::HashMap;

use alloy_primitives::{Address, B256, U256};
use lockbridge_primitives::{is_valid_lock_value, DepositRecord, MIN_LOCK_UNIT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PkarmError, PkarmResult};

/// Lock contract parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockParams {
    /// Lock values must be a whole multiple of this (wei)
    pub min_lock_unit: U256,

    /// Only address allowed to withdraw
    pub operator: Address,
}

impl Default for LockParams {
    fn default() -> Self {
        Self {
            min_lock_unit: U256::from(MIN_LOCK_UNIT),
            operator: Address::ZERO,
        }
    }
}

/// Emitted on every accepted lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockEvent {
    pub address: Address,
    pub code_challenge: B256,
    /// Value added by this lock (not the running total)
    pub value: U256,
    pub timestamp: u64,
}

/// In-memory model of the lock contract
#[derive(Debug, Clone, Default)]
pub struct LockContract {
    params: LockParams,
    locked: HashMap<(Address, B256), U256>,
    challenge_owner: HashMap<B256, Address>,
    balance: U256,
    events: Vec<LockEvent>,
}

impl LockContract {
    pub fn new(params: LockParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn params(&self) -> &LockParams {
        &self.params
    }

    /// Lock `value` for `address` under `challenge`.
    ///
    /// Returns the new accumulated total for (address, challenge).
    pub fn lock(
        &mut self,
        address: Address,
        challenge: B256,
        value: U256,
        timestamp: u64,
    ) -> PkarmResult<U256> {
        if !is_valid_lock_value(value, self.params.min_lock_unit) {
            return Err(PkarmError::InvalidLockValue {
                value: value.to_string(),
                unit: self.params.min_lock_unit.to_string(),
            });
        }

        if let Some(owner) = self.challenge_owner.get(&challenge).copied() {
            if owner != address {
                debug!(%challenge, %owner, depositor = %address, "rejecting lock under foreign challenge");
                return Err(PkarmError::IdentityConflict {
                    challenge: challenge.to_string(),
                    owner: owner.to_string(),
                    depositor: address.to_string(),
                });
            }
        }

        let overflow = || PkarmError::LockOverflow {
            value: value.to_string(),
        };
        let total = self
            .locked(address, challenge)
            .checked_add(value)
            .ok_or_else(overflow)?;
        let balance = self.balance.checked_add(value).ok_or_else(overflow)?;

        self.challenge_owner.entry(challenge).or_insert(address);
        self.locked.insert((address, challenge), total);
        self.balance = balance;

        self.events.push(LockEvent {
            address,
            code_challenge: challenge,
            value,
            timestamp,
        });
        info!(%address, %challenge, %value, %total, "lock accepted");
        Ok(total)
    }

    /// Operator withdrawal of locked funds
    pub fn withdraw(&mut self, caller: Address, amount: U256) -> PkarmResult<U256> {
        if caller != self.params.operator {
            return Err(PkarmError::NotOperator(caller.to_string()));
        }
        if amount > self.balance {
            return Err(PkarmError::InsufficientBalance {
                requested: amount.to_string(),
                available: self.balance.to_string(),
            });
        }
        self.balance -= amount;
        info!(%amount, remaining = %self.balance, "operator withdrawal");
        Ok(self.balance)
    }

    /// Accumulated value for (address, challenge), zero if never locked
    pub fn locked(&self, address: Address, challenge: B256) -> U256 {
        self.locked
            .get(&(address, challenge))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Deposit record view, if anything was locked
    pub fn record(&self, address: Address, challenge: B256) -> Option<DepositRecord> {
        self.locked
            .get(&(address, challenge))
            .map(|value| DepositRecord::new(address, challenge, *value))
    }

    /// All deposit records, sorted by (address, challenge)
    pub fn records(&self) -> Vec<DepositRecord> {
        let mut records: Vec<DepositRecord> = self
            .locked
            .iter()
            .map(|((address, challenge), value)| DepositRecord::new(*address, *challenge, *value))
            .collect();
        records.sort_by_key(|r| (r.source_address, r.attestation_hash));
        records
    }

    pub fn challenge_owner(&self, challenge: B256) -> Option<Address> {
        self.challenge_owner.get(&challenge).copied()
    }

    pub fn balance(&self) -> U256 {
        self.balance
    }

    pub fn events(&self) -> &[LockEvent] {
        &self.events
    }
}
