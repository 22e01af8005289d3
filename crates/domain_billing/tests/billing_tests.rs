//! Allocation scenarios and invariants for domain_billing

use chrono::NaiveDate;
use std::sync::Arc;

use core_kernel::{Amount, BillingMonth};
use domain_property::PropertyPort;

use domain_billing::{
    AllocationResult, BillingConfig, BillingError, BillingPeriodRegistry, PaymentStore, PeriodStatus, PeriodStore,
    SettlementCalculator,
};
use test_utils::{
    assert_allocation, assert_chronological, assert_conserved, assert_settlement_consistent,
    billing_month_strategy, payment_plan_strategy, rent_strategy, AllocationRequestBuilder, LedgerFixture,
    MonthFixtures, TenantBuilder, BEDSITTER_RENT,
};

async fn pay(f: &LedgerFixture, amount: i64, start: BillingMonth) -> Result<Vec<AllocationResult>, BillingError> {
    let request = AllocationRequestBuilder::new(f.unit.id, f.tenant.id)
        .amount(amount)
        .start(start.year(), start.month())
        .build();
    f.allocator.allocate(request).await
}

// ============================================================================
// Scenarios
// ============================================================================

mod scenario_tests {
    use super::*;

    #[tokio::test]
    async fn test_exact_month() {
        let f = LedgerFixture::new().await;
        let results = pay(&f, 3500, MonthFixtures::jan_2024()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_allocation(&results[0], (2024, 1, 3500, PeriodStatus::Paid, 0));
    }

    #[tokio::test]
    async fn test_partial_payment() {
        let f = LedgerFixture::new().await;
        let results = pay(&f, 2000, MonthFixtures::feb_2024()).await.unwrap();
        assert_allocation(&results[0], (2024, 2, 2000, PeriodStatus::PartiallyPaid, 1500));
    }

    #[tokio::test]
    async fn test_completing_partial_payment() {
        let f = LedgerFixture::new().await;
        pay(&f, 2000, MonthFixtures::feb_2024()).await.unwrap();
        let results = pay(&f, 1500, MonthFixtures::feb_2024()).await.unwrap();
        assert_allocation(&results[0], (2024, 2, 1500, PeriodStatus::Paid, 0));
    }

    #[tokio::test]
    async fn test_settled_month_is_skipped() {
        let f = LedgerFixture::new().await;
        pay(&f, 3500, MonthFixtures::jan_2024()).await.unwrap();

        let results = pay(&f, 7000, MonthFixtures::jan_2024()).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_allocation(&results[0], (2024, 2, 3500, PeriodStatus::Paid, 0));
        assert_allocation(&results[1], (2024, 3, 3500, PeriodStatus::Paid, 0));
        assert_chronological(&results);
    }

    #[tokio::test]
    async fn test_december_rolls_into_next_year() {
        let f = LedgerFixture::new().await;
        let results = pay(&f, 5000, MonthFixtures::dec_2024()).await.unwrap();

        assert_allocation(&results[0], (2024, 12, 3500, PeriodStatus::Paid, 0));
        assert_allocation(&results[1], (2025, 1, 1500, PeriodStatus::PartiallyPaid, 2000));
        assert_conserved(&results, Amount::new(5000));
    }

    #[tokio::test]
    async fn test_unassigned_payer_rejected_without_side_effects() {
        let f = LedgerFixture::new().await;
        let stranger = TenantBuilder::new().name("Not A Tenant").phone("+254700000001").build();
        let stranger_id = stranger.id;
        f.ledger.property.insert_tenant(stranger).await;

        let request = AllocationRequestBuilder::new(f.unit.id, stranger_id).build();
        let err = f.allocator.allocate(request).await.unwrap_err();

        assert!(matches!(err, BillingError::PayerNotAssigned { .. }));
        assert!(err.is_validation());
        assert_eq!(f.ledger.store.period_count().await, 0);
        assert!(f.ledger.store.all_payments().await.is_empty());
        assert!(f.ledger.notifications.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_ended_occupancy_rejected() {
        let f = LedgerFixture::new().await;
        f.ledger
            .property
            .end_occupancy(f.unit.id, f.tenant.id, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
            .await
            .unwrap();

        let err = pay(&f, 3500, MonthFixtures::feb_2024()).await.unwrap_err();
        assert!(matches!(err, BillingError::PayerNotAssigned { .. }));
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let f = LedgerFixture::new().await;
        let err = pay(&f, -100, MonthFixtures::jan_2024()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(f.ledger.store.period_count().await, 0);
    }

    #[tokio::test]
    async fn test_amount_beyond_ceiling_leaves_no_trace() {
        let ledger = domain_billing::ports::mock::MockLedger::new();
        let f = LedgerFixture::with(ledger, BillingConfig::default().with_max_months_advance(12)).await;

        let err = pay(&f, 13 * BEDSITTER_RENT, MonthFixtures::jan_2024()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(f.ledger.store.period_count().await, 0);
        assert!(f.ledger.store.all_payments().await.is_empty());
        assert!(f.ledger.notifications.sent().await.is_empty());

        let results = pay(&f, 12 * BEDSITTER_RENT, MonthFixtures::jan_2024()).await.unwrap();
        assert_eq!(results.len(), 12);
        assert_chronological(&results);
    }

    #[tokio::test]
    async fn test_leap_february_period() {
        let f = LedgerFixture::new().await;
        let results = pay(&f, 3500, MonthFixtures::feb_2024()).await.unwrap();

        let period = f.ledger.store.get_period(results[0].period_id).await.unwrap();
        assert_eq!(period.period_end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[tokio::test]
    async fn test_reversal_then_reallocation() {
        let f = LedgerFixture::new().await;
        let results = pay(&f, 3500, MonthFixtures::jan_2024()).await.unwrap();
        let payment = f.ledger.store.list_confirmed(results[0].period_id).await.unwrap()[0].clone();

        let outcome = f.allocator.reverse(payment.id, "bounced").await.unwrap();
        assert_eq!(outcome.period.status, PeriodStatus::Pending);
        assert_settlement_consistent(&outcome.settlement);

        let results = pay(&f, 3500, MonthFixtures::jan_2024()).await.unwrap();
        assert_allocation(&results[0], (2024, 1, 3500, PeriodStatus::Paid, 0));
    }
}

// ============================================================================
// Invariants
// ============================================================================

mod invariant_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        /// Applied amounts add up to what was paid and never exceed a period's due
        #[test]
        fn prop_conservation_and_order(plan in payment_plan_strategy(2024)) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let f = LedgerFixture::new().await;
                let mut total_paid = Amount::zero();

                for (amount, start) in plan {
                    let results = pay(&f, amount.value(), start).await.unwrap();
                    total_paid += amount;

                    assert_conserved(&results, amount);
                    assert_chronological(&results);
                    for r in &results {
                        prop_assert!(r.applied.is_positive());
                        prop_assert!(r.applied.value() <= BEDSITTER_RENT);
                    }
                }

                let received = f.reporter.total_received(f.unit.id).await.unwrap();
                prop_assert_eq!(received, total_paid);
                Ok(())
            })?;
        }

        /// Stored status always matches the confirmed sum
        #[test]
        fn prop_status_matches_payments(plan in payment_plan_strategy(2024)) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let f = LedgerFixture::new().await;
                let settlement = SettlementCalculator::new(
                    Arc::new(f.ledger.store.clone()),
                    Arc::new(f.ledger.store.clone()),
                );
                let mut balances = std::collections::HashMap::new();

                for (amount, start) in plan {
                    for r in pay(&f, amount.value(), start).await.unwrap() {
                        let period = f.ledger.store.get_period(r.period_id).await.unwrap();
                        let current = settlement.settlement(&period).await.unwrap();

                        assert_settlement_consistent(&current);
                        prop_assert_eq!(period.status, current.status);
                        prop_assert!(current.paid <= period.amount_due);

                        // balance of a period never increases without a reversal
                        if let Some(previous) = balances.insert(r.period_id, r.balance) {
                            prop_assert!(r.balance <= previous);
                        }
                    }
                }
                Ok(())
            })?;
        }

        /// Repeated lookups of the same month never add periods
        #[test]
        fn prop_period_creation_idempotent(months in prop::collection::vec(billing_month_strategy(), 1..20)) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let f = LedgerFixture::new().await;
                let registry = BillingPeriodRegistry::new(
                    Arc::new(f.ledger.store.clone()),
                    Arc::new(f.ledger.property.clone()),
                    5,
                );

                let mut distinct = std::collections::HashSet::new();
                for month in months {
                    let first = registry.get_or_create(f.unit.id, month).await.unwrap();
                    let second = registry.get_or_create(f.unit.id, month).await.unwrap();
                    prop_assert_eq!(first.id, second.id);
                    distinct.insert(month);
                }
                prop_assert_eq!(f.ledger.store.period_count().await, distinct.len());
                Ok(())
            })?;
        }

        /// A rent change reaches only the months billed after it
        #[test]
        fn prop_rent_change_spares_billed_months(first in rent_strategy(), second in rent_strategy()) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let f = LedgerFixture::new().await;
                f.ledger.property.set_rent(f.unit.id, first).await.unwrap();
                let january = pay(&f, first.value(), MonthFixtures::jan_2024()).await.unwrap();

                f.ledger.property.set_rent(f.unit.id, second).await.unwrap();
                let february = pay(&f, second.value(), MonthFixtures::feb_2024()).await.unwrap();

                let jan = f.ledger.store.get_period(january[0].period_id).await.unwrap();
                let feb = f.ledger.store.get_period(february[0].period_id).await.unwrap();
                prop_assert_eq!(jan.amount_due, first);
                prop_assert_eq!(feb.amount_due, second);
                prop_assert_eq!(jan.status, PeriodStatus::Paid);
                prop_assert_eq!(feb.status, PeriodStatus::Paid);
                Ok(())
            })?;
        }
    }
}

// ============================================================================
// Ledger report
// ============================================================================

mod report_tests {
    use super::*;
    use domain_billing::MonthState;

    #[tokio::test]
    async fn test_report_after_scenarios() {
        let f = LedgerFixture::new().await;
        pay(&f, 3500, MonthFixtures::jan_2024()).await.unwrap();
        pay(&f, 2000, MonthFixtures::feb_2024()).await.unwrap();

        let report = f.reporter.unit_year(f.unit.id, 2024).await.unwrap();
        assert_eq!(report.unit_number, 1);
        assert_eq!(report.months[0].state, MonthState::Paid);
        assert_eq!(report.months[1].state, MonthState::PartiallyPaid);
        assert_eq!(report.months[1].balance, Amount::new(1500));
        assert_eq!(report.months[2].state, MonthState::NotPaid);
        assert_eq!(report.total_paid, Amount::new(5500));
        assert_eq!(report.total_due, Amount::new(12 * BEDSITTER_RENT));
        assert_eq!(report.total_balance, Amount::new(12 * BEDSITTER_RENT - 5500));
    }

    #[tokio::test]
    async fn test_report_skips_reversed_payments() {
        let f = LedgerFixture::new().await;
        let results = pay(&f, 3500, MonthFixtures::month(2024, 5)).await.unwrap();
        let payment = f.ledger.store.list_confirmed(results[0].period_id).await.unwrap()[0].clone();
        f.allocator.reverse(payment.id, "duplicate").await.unwrap();

        let report = f.reporter.unit_year(f.unit.id, 2024).await.unwrap();
        let may = &report.months[4];
        assert_eq!(may.state, MonthState::Pending);
        assert!(may.payments.is_empty());
        assert_eq!(may.balance, Amount::new(BEDSITTER_RENT));
    }

    #[tokio::test]
    async fn test_transactions_span_units() {
        let f = LedgerFixture::new().await;
        let second = test_utils::UnitBuilder::new().number(2).rent(3000).build();
        let second_id = second.id;
        f.ledger.property.insert_unit(second).await;
        f.ledger
            .property
            .assign_tenant(second_id, f.tenant.id, MonthFixtures::move_in())
            .await
            .unwrap();

        pay(&f, 3500, MonthFixtures::jan_2024()).await.unwrap();
        f.allocator
            .allocate(AllocationRequestBuilder::new(second_id, f.tenant.id).amount(3000).mpesa("QXY98ZT").build())
            .await
            .unwrap();

        let entries = f.reporter.transactions(50).await.unwrap();
        let mut numbers: Vec<Option<i32>> = entries.iter().map(|e| e.unit_number).collect();
        numbers.sort();
        assert_eq!(numbers, vec![Some(1), Some(2)]);
        assert!(entries.iter().all(|e| e.payer_name.as_deref() == Some("Jane Wanjiku")));
    }

    #[tokio::test]
    async fn test_tenants_listed_for_unit() {
        let f = LedgerFixture::new().await;
        let tenants = f.ledger.property.active_tenants(f.unit.id).await.unwrap();
        assert_eq!(tenants.len(), 1);
        assert_eq!(tenants[0].phone, "+254712345678");
    }
}
