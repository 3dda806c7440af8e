use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

use crate::constants::PERCENTAGE_TOLERANCE;
use crate::core::errors::LedgerError;
use crate::core::models::{Allocation, MemberId, SplitKind};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PercentageShare {
    pub member_id: MemberId,
    pub percentage: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CustomAmount {
    pub member_id: MemberId,
    pub amount: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct WeightedShare {
    pub member_id: MemberId,
    pub shares: u32,
}

/// How an expense is divided. Entry order is significant: rounding
/// remainders are handed out in this order.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitRequest {
    Equal { members: Vec<MemberId> },
    Percentage { shares: Vec<PercentageShare> },
    Custom { amounts: Vec<CustomAmount> },
    Shares { shares: Vec<WeightedShare> },
}

impl SplitRequest {
    pub fn kind(&self) -> SplitKind {
        match self {
            SplitRequest::Equal { .. } => SplitKind::Equal,
            SplitRequest::Percentage { .. } => SplitKind::Percentage,
            SplitRequest::Custom { .. } => SplitKind::Custom,
            SplitRequest::Shares { .. } => SplitKind::Shares,
        }
    }

    pub fn members(&self) -> Vec<&str> {
        match self {
            SplitRequest::Equal { members } => members.iter().map(String::as_str).collect(),
            SplitRequest::Percentage { shares } => shares.iter().map(|s| s.member_id.as_str()).collect(),
            SplitRequest::Custom { amounts } => amounts.iter().map(|a| a.member_id.as_str()).collect(),
            SplitRequest::Shares { shares } => shares.iter().map(|s| s.member_id.as_str()).collect(),
        }
    }
}

/// Turns a split request into allocations that add up to `amount` exactly.
///
/// Allocations come back in the order the members were named. Identical
/// input always yields identical output.
pub fn validate_allocations(amount: i64, split: &SplitRequest) -> Result<Vec<Allocation>, LedgerError> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }

    let members = split.members();
    if members.is_empty() {
        return Err(LedgerError::EmptySplit);
    }
    ensure_unique(&members)?;

    let amounts = match split {
        SplitRequest::Equal { members } => equal_amounts(amount, members.len()),
        SplitRequest::Percentage { shares } => percentage_amounts(amount, shares)?,
        SplitRequest::Custom { amounts } => custom_amounts(amount, amounts)?,
        SplitRequest::Shares { shares } => weighted_amounts(amount, shares)?,
    };

    let actual = checked_total(&amounts).unwrap_or(i64::MAX);
    if actual != amount {
        return Err(LedgerError::AllocationMismatch {
            expected: amount,
            actual,
        });
    }

    Ok(members
        .into_iter()
        .zip(amounts)
        .map(|(member_id, amount)| Allocation::new(member_id, amount))
        .collect())
}

fn ensure_unique(members: &[&str]) -> Result<(), LedgerError> {
    let mut seen = HashSet::with_capacity(members.len());
    for &member_id in members {
        if !seen.insert(member_id) {
            return Err(LedgerError::DuplicateMember(member_id.to_string()));
        }
    }
    Ok(())
}

fn equal_amounts(amount: i64, count: usize) -> Vec<i64> {
    let count = count as i64;
    let mut amounts = vec![amount / count; count as usize];
    let eligible = vec![true; amounts.len()];
    distribute_remainder(&mut amounts, &eligible, amount % count);
    amounts
}

fn percentage_amounts(amount: i64, shares: &[PercentageShare]) -> Result<Vec<i64>, LedgerError> {
    if let Some(bad) = shares
        .iter()
        .find(|s| !s.percentage.is_finite() || s.percentage < 0.0)
    {
        return Err(LedgerError::InvalidPercentage(format!(
            "{} has percentage {}",
            bad.member_id, bad.percentage
        )));
    }

    let total: f64 = shares.iter().map(|s| s.percentage).sum();
    if (total - 100.0).abs() > PERCENTAGE_TOLERANCE {
        return Err(LedgerError::InvalidPercentage(format!(
            "percentages sum to {}, expected 100",
            total
        )));
    }

    let mut amounts: Vec<i64> = shares
        .iter()
        .map(|s| (amount as f64 * s.percentage / 100.0).round() as i64)
        .collect();
    let eligible: Vec<bool> = shares.iter().map(|s| s.percentage > 0.0).collect();
    // Rounded shares of amounts near i64::MAX can sum past it.
    let rounded: i128 = amounts.iter().map(|&a| a as i128).sum();
    let remainder = i64::try_from(amount as i128 - rounded).map_err(|_| {
        LedgerError::InvalidPercentage(format!("shares of {} cannot be reconciled", amount))
    })?;
    distribute_remainder(&mut amounts, &eligible, remainder);
    Ok(amounts)
}

fn checked_total(amounts: &[i64]) -> Option<i64> {
    amounts.iter().try_fold(0i64, |acc, &a| acc.checked_add(a))
}

fn custom_amounts(amount: i64, entries: &[CustomAmount]) -> Result<Vec<i64>, LedgerError> {
    if let Some(bad) = entries.iter().find(|e| e.amount < 0) {
        return Err(LedgerError::InvalidAmount(bad.amount));
    }

    let amounts: Vec<i64> = entries.iter().map(|e| e.amount).collect();
    let actual = checked_total(&amounts).unwrap_or(i64::MAX);
    if actual != amount {
        return Err(LedgerError::AllocationMismatch {
            expected: amount,
            actual,
        });
    }
    Ok(amounts)
}

fn weighted_amounts(amount: i64, shares: &[WeightedShare]) -> Result<Vec<i64>, LedgerError> {
    let total: i128 = shares.iter().map(|s| s.shares as i128).sum();
    if total == 0 {
        return Err(LedgerError::InvalidShares);
    }

    let mut amounts: Vec<i64> = shares
        .iter()
        .map(|s| (amount as i128 * s.shares as i128 / total) as i64)
        .collect();
    let eligible: Vec<bool> = shares.iter().map(|s| s.shares > 0).collect();
    let remainder = amount - amounts.iter().sum::<i64>();
    distribute_remainder(&mut amounts, &eligible, remainder);
    Ok(amounts)
}

/// Hands out `remainder` one minor unit at a time over the eligible slots,
/// in slot order. A negative remainder takes units back, never pushing a
/// slot below zero.
fn distribute_remainder(amounts: &mut [i64], eligible: &[bool], mut remainder: i64) {
    let step = remainder.signum();
    while remainder != 0 {
        let mut moved = false;
        for (slot, &ok) in amounts.iter_mut().zip(eligible) {
            if remainder == 0 {
                break;
            }
            if !ok || (step < 0 && *slot <= 0) {
                continue;
            }
            *slot += step;
            remainder -= step;
            moved = true;
        }
        if !moved {
            break;
        }
    }
}
