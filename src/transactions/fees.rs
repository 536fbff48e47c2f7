// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fee-aware transfer sizing.
//!
//! A Stacks fee is `fee_rate * serialized_size`. When a requested transfer
//! plus that fee exceeds the balance, the transfer flow can shrink the amount
//! to what the balance covers after reserving the fee.

/// Fee sizing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeeError {
    #[error("Balance too low to cover the fee: balance {balance}, estimated fee {estimated_fee}")]
    InsufficientFunds { balance: u64, estimated_fee: u128 },
}

/// `fee_rate * estimated_size`, computed without overflow.
pub fn estimate_fee(fee_rate: u64, estimated_size: usize) -> u128 {
    u128::from(fee_rate) * estimated_size as u128
}

/// Largest amount that can be sent while the balance still covers the fee.
///
/// Fails with [`FeeError::InsufficientFunds`] when `balance <= fee_rate *
/// estimated_size`: a balance equal to the fee leaves nothing to send.
pub fn compute_sendable_amount(
    balance: u64,
    fee_rate: u64,
    estimated_size: usize,
) -> Result<u64, FeeError> {
    let estimated_fee = estimate_fee(fee_rate, estimated_size);
    if u128::from(balance) <= estimated_fee {
        return Err(FeeError::InsufficientFunds {
            balance,
            estimated_fee,
        });
    }
    // estimated_fee < balance <= u64::MAX, so the narrowing is lossless
    Ok(balance - estimated_fee as u64)
}

/// What a transfer does when `amount + fee` exceeds the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferPolicy {
    /// Send `balance - fee` instead of the requested amount.
    #[default]
    AdjustToBalance,
    /// Fail the transfer with `InsufficientFunds`.
    Reject,
}

impl std::str::FromStr for TransferPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adjust" | "adjust_to_balance" => Ok(TransferPolicy::AdjustToBalance),
            "reject" => Ok(TransferPolicy::Reject),
            other => Err(format!(
                "unknown transfer policy `{other}` (expected `adjust` or `reject`)"
            )),
        }
    }
}

/// Outcome of sizing a requested transfer against the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizedTransfer {
    pub amount: u64,
    pub fee: u64,
    /// True when `amount` was reduced from the requested value.
    pub adjusted: bool,
}

/// Apply `policy` to a requested amount.
///
/// Only when `requested + fee > balance` does the policy matter; otherwise
/// the requested amount is kept as is.
pub fn size_transfer(
    requested: u64,
    balance: u64,
    fee_rate: u64,
    estimated_size: usize,
    policy: TransferPolicy,
) -> Result<SizedTransfer, FeeError> {
    let estimated_fee = estimate_fee(fee_rate, estimated_size);
    let insufficient = || FeeError::InsufficientFunds {
        balance,
        estimated_fee,
    };
    // a fee that does not fit in u64 can never be paid
    let fee = u64::try_from(estimated_fee).map_err(|_| insufficient())?;

    if u128::from(requested) + estimated_fee <= u128::from(balance) {
        return Ok(SizedTransfer {
            amount: requested,
            fee,
            adjusted: false,
        });
    }

    match policy {
        TransferPolicy::AdjustToBalance => Ok(SizedTransfer {
            amount: compute_sendable_amount(balance, fee_rate, estimated_size)?,
            fee,
            adjusted: true,
        }),
        TransferPolicy::Reject => Err(insufficient()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtracts_fee_from_balance() {
        assert_eq!(compute_sendable_amount(1000, 2, 180), Ok(640));
    }

    #[test]
    fn balance_below_fee_is_insufficient() {
        assert_eq!(
            compute_sendable_amount(300, 2, 180),
            Err(FeeError::InsufficientFunds {
                balance: 300,
                estimated_fee: 360
            })
        );
    }

    #[test]
    fn balance_equal_to_fee_is_insufficient() {
        assert!(compute_sendable_amount(360, 2, 180).is_err());
    }

    #[test]
    fn one_above_fee_sends_one() {
        assert_eq!(compute_sendable_amount(361, 2, 180), Ok(1));
    }

    #[test]
    fn zero_fee_sends_everything_but_zero_balance_fails() {
        assert_eq!(compute_sendable_amount(5, 0, 180), Ok(5));
        assert_eq!(compute_sendable_amount(5, 3, 0), Ok(5));
        assert!(compute_sendable_amount(0, 0, 0).is_err());
    }

    #[test]
    fn huge_fee_does_not_overflow() {
        let err = compute_sendable_amount(u64::MAX, u64::MAX, usize::MAX).unwrap_err();
        let FeeError::InsufficientFunds { estimated_fee, .. } = err;
        assert_eq!(estimated_fee, u128::from(u64::MAX) * usize::MAX as u128);
    }

    #[test]
    fn size_transfer_keeps_affordable_amount() {
        let sized = size_transfer(500, 1000, 2, 180, TransferPolicy::AdjustToBalance).unwrap();
        assert_eq!(
            sized,
            SizedTransfer {
                amount: 500,
                fee: 360,
                adjusted: false
            }
        );
        // exactly affordable is not adjusted
        let sized = size_transfer(640, 1000, 2, 180, TransferPolicy::Reject).unwrap();
        assert!(!sized.adjusted);
    }

    #[test]
    fn size_transfer_adjusts_on_shortfall() {
        let sized = size_transfer(900, 1000, 2, 180, TransferPolicy::AdjustToBalance).unwrap();
        assert_eq!(sized.amount, 640);
        assert_eq!(sized.fee, 360);
        assert!(sized.adjusted);
    }

    #[test]
    fn size_transfer_rejects_on_shortfall_when_asked() {
        let err = size_transfer(900, 1000, 2, 180, TransferPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            FeeError::InsufficientFunds {
                balance: 1000,
                estimated_fee: 360
            }
        );
    }

    #[test]
    fn size_transfer_fails_when_fee_alone_is_unaffordable() {
        assert!(size_transfer(1, 300, 2, 180, TransferPolicy::AdjustToBalance).is_err());
    }

    #[test]
    fn policy_parses_from_text() {
        assert_eq!("adjust".parse(), Ok(TransferPolicy::AdjustToBalance));
        assert_eq!("REJECT".parse(), Ok(TransferPolicy::Reject));
        assert!("maybe".parse::<TransferPolicy>().is_err());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_result_is_balance_minus_fee(
                balance in any::<u64>(),
                fee_rate in 0u64..10_000,
                size in 0usize..100_000,
            ) {
                let fee = u128::from(fee_rate) * size as u128;
                match compute_sendable_amount(balance, fee_rate, size) {
                    Ok(amount) => {
                        prop_assert!(u128::from(balance) > fee);
                        prop_assert_eq!(u128::from(amount), u128::from(balance) - fee);
                    }
                    Err(FeeError::InsufficientFunds { .. }) => {
                        prop_assert!(u128::from(balance) <= fee);
                    }
                }
            }
        }

        proptest! {
            #[test]
            fn prop_monotonic_in_fee_rate_and_size(
                balance in any::<u64>(),
                fee_rate in 0u64..10_000,
                size in 0usize..100_000,
                rate_bump in 0u64..1_000,
                size_bump in 0usize..1_000,
            ) {
                let base = compute_sendable_amount(balance, fee_rate, size).unwrap_or(0);
                let higher_rate =
                    compute_sendable_amount(balance, fee_rate + rate_bump, size).unwrap_or(0);
                let bigger =
                    compute_sendable_amount(balance, fee_rate, size + size_bump).unwrap_or(0);
                prop_assert!(higher_rate <= base);
                prop_assert!(bigger <= base);
            }
        }
    }
}
