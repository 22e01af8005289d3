//! Receipt text sent to the payer after an allocation

use crate::allocator::AllocationResult;

/// Everything printed on a payment receipt
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    pub sender: &'a str,
    pub currency_label: &'a str,
    pub unit_number: i32,
    pub payer_name: &'a str,
    pub allocations: &'a [AllocationResult],
    pub tx_ref: Option<&'a str>,
    /// Local `YYYY-MM-DD HH:MM:SS`
    pub issued_at: &'a str,
}

impl Receipt<'_> {
    /// Renders the receipt as a multi-line SMS body
    pub fn render(&self) -> String {
        let allocations = self
            .allocations
            .iter()
            .map(|a| {
                format!(
                    "{:04}-{:02}: {}",
                    a.year,
                    a.month,
                    a.applied.display_with(self.currency_label)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{}: Payment for Unit {}.\nPayer: {}\nAllocations: {}\nRef: {}\nTime: {}",
            self.sender,
            self.unit_number,
            self.payer_name,
            allocations,
            self.tx_ref.unwrap_or("N/A"),
            self.issued_at,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::PeriodStatus;
    use core_kernel::{Amount, BillingPeriodId};

    fn result(year: i32, month: u32, applied: i64) -> AllocationResult {
        AllocationResult {
            year,
            month,
            applied: Amount::new(applied),
            status: PeriodStatus::Paid,
            balance: Amount::zero(),
            period_id: BillingPeriodId::new_v7(),
        }
    }

    #[test]
    fn test_render() {
        let allocations = vec![result(2024, 1, 3500), result(2024, 2, 3500)];
        let receipt = Receipt {
            sender: "Rent Ledger",
            currency_label: "KES",
            unit_number: 4,
            payer_name: "Jane Wanjiku",
            allocations: &allocations,
            tx_ref: Some("QAB12CD34E"),
            issued_at: "2024-01-03 09:15:00",
        };

        assert_eq!(
            receipt.render(),
            "Rent Ledger: Payment for Unit 4.\n\
             Payer: Jane Wanjiku\n\
             Allocations: 2024-01: KES 3500, 2024-02: KES 3500\n\
             Ref: QAB12CD34E\n\
             Time: 2024-01-03 09:15:00"
        );
    }

    #[test]
    fn test_missing_reference() {
        let allocations = vec![result(2024, 12, 1500)];
        let receipt = Receipt {
            sender: "Rent Ledger",
            currency_label: "KES",
            unit_number: 9,
            payer_name: "Otieno",
            allocations: &allocations,
            tx_ref: None,
            issued_at: "2024-12-31 23:59:59",
        };

        let text = receipt.render();
        assert!(text.contains("Allocations: 2024-12: KES 1500\n"));
        assert!(text.contains("Ref: N/A\n"));
    }
}
