//! Custom Test Assertions
//!
//! Ledger invariants as assertions with readable failure messages.

use core_kernel::{Amount, BillingMonth};
use domain_billing::{AllocationResult, PeriodStatus, Settlement};

/// Asserts the applied amounts add up to what was paid
pub fn assert_conserved(results: &[AllocationResult], paid: Amount) {
    let applied: Amount = results.iter().map(|r| r.applied).sum();
    assert_eq!(
        applied, paid,
        "Allocations sum to {} but {} was paid: {:?}",
        applied, paid, results
    );
}

/// Asserts results are strictly chronological and every month but the last
/// was left settled
pub fn assert_chronological(results: &[AllocationResult]) {
    let months: Vec<BillingMonth> = results
        .iter()
        .map(|r| BillingMonth::new(r.year, r.month).expect("allocation result month is valid"))
        .collect();

    for (i, pair) in months.windows(2).enumerate() {
        assert!(pair[0] < pair[1], "Allocation {} ({}) is not before {}", i, pair[0], pair[1]);
        assert_eq!(
            results[i].status,
            PeriodStatus::Paid,
            "Allocation moved past {} while it still owed {}",
            pair[0],
            results[i].balance
        );
    }
}

/// Asserts a settlement's status agrees with its amounts
pub fn assert_settlement_consistent(settlement: &Settlement) {
    let expected = if settlement.paid >= settlement.amount_due {
        PeriodStatus::Paid
    } else if settlement.paid.is_positive() {
        PeriodStatus::PartiallyPaid
    } else {
        PeriodStatus::Pending
    };
    assert_eq!(settlement.status, expected, "Inconsistent settlement: {:?}", settlement);
    assert_eq!(
        settlement.balance,
        settlement.amount_due.balance_after(settlement.paid),
        "Wrong balance: {:?}",
        settlement
    );
}

/// Asserts one allocation result matches (year, month, applied, status, balance)
pub fn assert_allocation(result: &AllocationResult, expected: (i32, u32, i64, PeriodStatus, i64)) {
    let actual = (
        result.year,
        result.month,
        result.applied.value(),
        result.status,
        result.balance.value(),
    );
    assert_eq!(actual, expected, "Unexpected allocation for period {}", result.period_id);
}
