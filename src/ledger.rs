// Copyright (c) 2025 Billfold Authors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Balance-ledger engine.
//!
//! Invariant owned here: at any quiescent point an account's cached balance
//! equals `opening_balance + Σ signed amounts of the transactions that name
//! it`. The engine is stateless: every operation works on a caller-supplied
//! snapshot and the caller persists the result.
//!
//! Operations never abort for business-rule reasons; the only conditions a
//! caller can see are the non-fatal [`LedgerIssue`] values returned alongside
//! the mutation.

use crate::models::{Account, Transaction};
use rust_decimal::Decimal;
use thiserror::Error;

/// Non-fatal conditions reported by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerIssue {
    /// A transaction named an account that does not exist. The balance
    /// mutation is skipped; persisting the transaction row is still the
    /// caller's call (historically it proceeds).
    #[error("account '{0}' not found; balance left untouched")]
    AccountNotFound(String),
    /// Recalculation found a cached balance that disagreed with the
    /// recomputed one. Diagnostic only; the recomputed value wins.
    #[error("account '{account}': cached balance {cached} differed from recomputed {computed}")]
    Drift {
        account: String,
        cached: Decimal,
        computed: Decimal,
    },
}

fn account_mut<'a>(accounts: &'a mut [Account], name: &str) -> Option<&'a mut Account> {
    accounts.iter_mut().find(|a| a.name == name)
}

/// Apply a transaction's signed effect to its account.
///
/// Exactly one account changes, by exactly the signed magnitude, once.
pub fn post(tx: &Transaction, accounts: &mut [Account]) -> Vec<LedgerIssue> {
    match account_mut(accounts, &tx.account) {
        Some(account) => {
            account.balance += tx.signed_amount();
            Vec::new()
        }
        None => vec![LedgerIssue::AccountNotFound(tx.account.clone())],
    }
}

/// Exact inverse of [`post`].
pub fn revert(tx: &Transaction, accounts: &mut [Account]) -> Vec<LedgerIssue> {
    match account_mut(accounts, &tx.account) {
        Some(account) => {
            account.balance -= tx.signed_amount();
            Vec::new()
        }
        None => vec![LedgerIssue::AccountNotFound(tx.account.clone())],
    }
}

/// Revert the old transaction, then post the new one; always two phases, in
/// that order. Old and new may name different accounts, so fusing them into
/// one net delta against a single account would be wrong.
pub fn update(old: &Transaction, new: &Transaction, accounts: &mut [Account]) -> Vec<LedgerIssue> {
    let mut issues = revert(old, accounts);
    issues.extend(post(new, accounts));
    issues
}

/// Undo a transaction's effect ahead of removing its row (row removal is the
/// store's job).
pub fn delete(tx: &Transaction, accounts: &mut [Account]) -> Vec<LedgerIssue> {
    revert(tx, accounts)
}

/// Reconciliation: recompute every balance from the full transaction set.
///
/// Authoritative and idempotent. An account with no matching transactions
/// ends at its opening balance. Each account whose cached balance disagreed
/// gets a [`LedgerIssue::Drift`] entry.
pub fn recalculate(accounts: &mut [Account], transactions: &[Transaction]) -> Vec<LedgerIssue> {
    let mut issues = Vec::new();
    for account in accounts.iter_mut() {
        let total: Decimal = transactions
            .iter()
            .filter(|t| t.account == account.name)
            .map(|t| t.signed_amount())
            .sum();
        let computed = account.opening_balance + total;
        if account.balance != computed {
            issues.push(LedgerIssue::Drift {
                account: account.name.clone(),
                cached: account.balance,
                computed,
            });
        }
        account.balance = computed;
    }
    issues
}
