//! Greedy pairwise settlement planning.
//!
//! Turns a list of computed balances into the transfers that zero them:
//! creditors (most-owed first) and debtors (most-owing first) are walked with
//! two cursors, each step moving `min(|creditor remaining|, debtor
//! remaining)` from the current debtor to the current creditor. The greedy
//! matching is not globally transaction-count-optimal, but it is
//! deterministic and O(n log n), which is all a roommate-sized group needs.

use serde::Serialize;
use uuid::Uuid;

use crate::{Money, balance::MemberBalance};

/// A planned payment from one member to another. Derived, never persisted:
/// committing a plan means appending ledger entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SettlementTransfer {
    pub from: Uuid,
    pub to: Uuid,
    pub amount: Money,
}

/// Plans the transfers that settle all balances.
///
/// Deterministic: both sides are ordered by balance with member id as the
/// tie-breaker, so identical inputs (in any order) produce identical plans.
/// Amounts within [`Money::TOLERANCE`] of zero are treated as rounding noise
/// and skipped. An empty or fully-settled input yields an empty plan.
pub fn plan_transfers(balances: &[MemberBalance]) -> Vec<SettlementTransfer> {
    // (member id, remaining balance); creditors carry negative remainders.
    let mut creditors: Vec<(Uuid, Money)> = balances
        .iter()
        .filter(|b| b.final_balance < -Money::TOLERANCE)
        .map(|b| (b.member_id, b.final_balance))
        .collect();
    creditors.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let mut debtors: Vec<(Uuid, Money)> = balances
        .iter()
        .filter(|b| b.final_balance > Money::TOLERANCE)
        .map(|b| (b.member_id, b.final_balance))
        .collect();
    debtors.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < creditors.len() && j < debtors.len() {
        let owed = creditors[i].1.abs();
        let owing = debtors[j].1;
        let amount = owed.min(owing);

        if amount > Money::TOLERANCE {
            transfers.push(SettlementTransfer {
                from: debtors[j].0,
                to: creditors[i].0,
                amount,
            });
        }

        creditors[i].1 += amount;
        debtors[j].1 -= amount;

        if creditors[i].1.is_settled() {
            i += 1;
        }
        if debtors[j].1.is_settled() {
            j += 1;
        }
    }

    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::balance::{BalanceStatus, MemberBalance};

    fn balance(id_byte: u8, final_cents: i64) -> MemberBalance {
        let member_id = Uuid::from_bytes([id_byte; 16]);
        MemberBalance {
            member_id,
            email: format!("{id_byte}@x"),
            display_name: format!("m{id_byte}"),
            total_expenses: Money::ZERO,
            total_contributions: Money::ZERO,
            total_settlements: Money::ZERO,
            pending: Money::ZERO,
            equal_share: Money::ZERO,
            final_balance: Money::new(final_cents),
            status: if final_cents > 1 {
                BalanceStatus::Debit
            } else if final_cents < -1 {
                BalanceStatus::Credit
            } else {
                BalanceStatus::Even
            },
        }
    }

    #[test]
    fn empty_input_yields_empty_plan() {
        assert!(plan_transfers(&[]).is_empty());
    }

    #[test]
    fn settled_balances_yield_empty_plan() {
        let balances = vec![balance(1, 0), balance(2, 1), balance(3, -1)];
        assert!(plan_transfers(&balances).is_empty());
    }

    #[test]
    fn two_debtors_pay_one_creditor() {
        let balances = vec![balance(1, -20000), balance(2, 10000), balance(3, 10000)];
        let transfers = plan_transfers(&balances);
        assert_eq!(transfers.len(), 2);
        for transfer in &transfers {
            assert_eq!(transfer.to, Uuid::from_bytes([1; 16]));
            assert_eq!(transfer.amount, Money::new(10000));
        }
    }

    #[test]
    fn one_debtor_pays_two_creditors() {
        let balances = vec![balance(1, -7000), balance(2, -3000), balance(3, 10000)];
        let transfers = plan_transfers(&balances);
        assert_eq!(
            transfers,
            vec![
                SettlementTransfer {
                    from: Uuid::from_bytes([3; 16]),
                    to: Uuid::from_bytes([1; 16]),
                    amount: Money::new(7000),
                },
                SettlementTransfer {
                    from: Uuid::from_bytes([3; 16]),
                    to: Uuid::from_bytes([2; 16]),
                    amount: Money::new(3000),
                },
            ]
        );
    }

    #[test]
    fn plan_is_deterministic_across_input_orders() {
        let balances = vec![
            balance(4, 5000),
            balance(1, -20000),
            balance(3, 10000),
            balance(2, 5000),
        ];
        let mut shuffled = balances.clone();
        shuffled.reverse();
        assert_eq!(plan_transfers(&balances), plan_transfers(&shuffled));
    }

    #[test]
    fn ties_break_by_member_id() {
        let balances = vec![balance(2, 5000), balance(1, 5000), balance(3, -10000)];
        let transfers = plan_transfers(&balances);
        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].from, Uuid::from_bytes([1; 16]));
        assert_eq!(transfers[1].from, Uuid::from_bytes([2; 16]));
    }

    #[test]
    fn applying_the_plan_settles_every_balance() {
        let balances = vec![
            balance(1, -12345),
            balance(2, -655),
            balance(3, 9000),
            balance(4, 4000),
        ];
        let transfers = plan_transfers(&balances);

        let mut remaining: Vec<(Uuid, Money)> = balances
            .iter()
            .map(|b| (b.member_id, b.final_balance))
            .collect();
        for transfer in &transfers {
            for (id, remaining_balance) in &mut remaining {
                if *id == transfer.from {
                    *remaining_balance -= transfer.amount;
                }
                if *id == transfer.to {
                    *remaining_balance += transfer.amount;
                }
            }
        }
        for (_, remaining_balance) in remaining {
            assert!(remaining_balance.is_settled(), "residual {remaining_balance}");
        }
    }

    #[test]
    fn transfer_amounts_are_positive_and_above_tolerance() {
        let balances = vec![balance(1, -5000), balance(2, 2), balance(3, 4998)];
        for transfer in plan_transfers(&balances) {
            assert!(transfer.amount > Money::TOLERANCE);
        }
    }
}
