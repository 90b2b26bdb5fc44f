//! Per-member balance computation.
//!
//! The computation is pure and stateless: it takes a snapshot of the room's
//! members, expenses and ledger entries and recomputes every figure from
//! scratch. Nothing is maintained incrementally, which keeps retroactive
//! voids/edits trivially correct at the cost of rereading the full ledger
//! (fine at roommate scale).
//!
//! For each member:
//!
//! - `total_expenses`: what they fronted (non-voided expenses they paid)
//! - `total_contributions`: sum of their credit entries (positive)
//! - `total_settlements`: sum of their debit entries (negative by convention,
//!   added directly, never subtracted)
//! - `pending = total_expenses + total_settlements`: fronted money not yet
//!   reimbursed
//! - `equal_share = Σ max(pending, 0) / member count`
//! - `final_balance = equal_share − pending − total_contributions`: positive
//!   means the member owes the room, negative means the room owes them
//!
//! A simpler variant (`total_expenses − share-of-all-expenses`) ignores
//! contributions and settlements entirely; the fuller formula implemented
//! here is the canonical one. The two diverge whenever credits or debits
//! exist; see DESIGN.md.

use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::{Expense, LedgerEntry, Member, Money, ledger_entries::EntryKind};

/// Classification of a member's final balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    /// The room owes this member money (`final_balance` < -tolerance).
    Credit,
    /// This member owes the room money (`final_balance` > tolerance).
    Debit,
    /// Settled within tolerance.
    Even,
}

/// A member's computed financial position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberBalance {
    pub member_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub total_expenses: Money,
    pub total_contributions: Money,
    /// Sum of debit entries; zero or negative.
    pub total_settlements: Money,
    /// `total_expenses + total_settlements`: fronted money still outstanding.
    pub pending: Money,
    pub equal_share: Money,
    pub final_balance: Money,
    pub status: BalanceStatus,
}

impl MemberBalance {
    fn status_for(final_balance: Money) -> BalanceStatus {
        if final_balance.is_settled() {
            BalanceStatus::Even
        } else if final_balance.is_negative() {
            BalanceStatus::Credit
        } else {
            BalanceStatus::Debit
        }
    }
}

/// Computes every member's position from a full room snapshot.
///
/// `members` must be the complete active set for the room: the equal-share
/// denominator is the member count, so a partial list produces meaningless
/// shares. Duplicate emails are collapsed to the first occurrence. Voided
/// expenses and rows referencing unknown members are ignored.
///
/// Returns one entry per member, sorted by member id. An empty member list
/// yields an empty result (no division by zero).
pub fn compute_balances(
    members: &[Member],
    expenses: &[Expense],
    entries: &[LedgerEntry],
) -> Vec<MemberBalance> {
    let mut seen_emails: HashSet<&str> = HashSet::with_capacity(members.len());
    let mut deduped: Vec<&Member> = Vec::with_capacity(members.len());
    for member in members {
        if seen_emails.insert(member.email.as_str()) {
            deduped.push(member);
        }
    }

    if deduped.is_empty() {
        return Vec::new();
    }

    let mut balances: Vec<MemberBalance> = deduped
        .iter()
        .map(|member| {
            let total_expenses: Money = expenses
                .iter()
                .filter(|e| !e.is_voided() && e.payer_id == member.id)
                .map(|e| e.amount)
                .sum();
            let total_contributions: Money = entries
                .iter()
                .filter(|e| e.kind == EntryKind::Credit && e.member_id == member.id)
                .map(|e| e.amount)
                .sum();
            // Debit amounts are stored negative, so adding them yields the
            // (negative) total already paid back.
            let total_settlements: Money = entries
                .iter()
                .filter(|e| e.kind == EntryKind::Debit && e.member_id == member.id)
                .map(|e| e.amount)
                .sum();

            let pending = total_expenses + total_settlements;

            MemberBalance {
                member_id: member.id,
                email: member.email.clone(),
                display_name: member.display_name.clone(),
                total_expenses,
                total_contributions,
                total_settlements,
                pending,
                equal_share: Money::ZERO,
                final_balance: Money::ZERO,
                status: BalanceStatus::Even,
            }
        })
        .collect();

    // Over-reimbursed members (negative pending) do not shrink the pool the
    // others must still cover.
    let total_pending: Money = balances
        .iter()
        .map(|b| b.pending.clamp_non_negative())
        .sum();
    let equal_share = total_pending.split_evenly(balances.len());

    for balance in &mut balances {
        balance.equal_share = equal_share;
        balance.final_balance = equal_share - balance.pending - balance.total_contributions;
        balance.status = MemberBalance::status_for(balance.final_balance);
    }

    balances.sort_by(|a, b| a.member_id.cmp(&b.member_id));
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(room: &str, email: &str) -> Member {
        Member::new(
            room.to_string(),
            email.to_string(),
            email.split('@').next().unwrap_or(email).to_string(),
            None,
            false,
        )
    }

    fn expense(room: &str, payer: &Member, cents: i64) -> Expense {
        Expense::new(
            room.to_string(),
            payer.id,
            Money::new(cents),
            None,
            Utc::now(),
            "test".to_string(),
        )
        .unwrap()
    }

    fn debit(room: &str, member: &Member, cents: i64) -> LedgerEntry {
        LedgerEntry::debit(
            room.to_string(),
            member.id,
            Money::new(cents),
            None,
            Utc::now(),
            "test".to_string(),
        )
        .unwrap()
    }

    fn credit(room: &str, member: &Member, cents: i64) -> LedgerEntry {
        LedgerEntry::credit(
            room.to_string(),
            member.id,
            Money::new(cents),
            None,
            Utc::now(),
            "test".to_string(),
        )
        .unwrap()
    }

    fn balance_of<'a>(balances: &'a [MemberBalance], member: &Member) -> &'a MemberBalance {
        balances
            .iter()
            .find(|b| b.member_id == member.id)
            .expect("member missing from balances")
    }

    #[test]
    fn empty_room_yields_empty_result() {
        assert!(compute_balances(&[], &[], &[]).is_empty());
    }

    #[test]
    fn members_without_activity_are_even() {
        let a = member("r", "a@x");
        let b = member("r", "b@x");
        let balances = compute_balances(&[a.clone(), b.clone()], &[], &[]);
        assert_eq!(balances.len(), 2);
        for balance in &balances {
            assert_eq!(balance.final_balance, Money::ZERO);
            assert_eq!(balance.status, BalanceStatus::Even);
        }
    }

    #[test]
    fn single_payer_three_members() {
        // A spent 300; share is 100 each; A is owed 200, B and C owe 100.
        let a = member("r", "a@x");
        let b = member("r", "b@x");
        let c = member("r", "c@x");
        let expenses = vec![expense("r", &a, 30000)];
        let balances = compute_balances(&[a.clone(), b.clone(), c.clone()], &expenses, &[]);

        assert_eq!(balance_of(&balances, &a).equal_share, Money::new(10000));
        assert_eq!(balance_of(&balances, &a).final_balance, Money::new(-20000));
        assert_eq!(balance_of(&balances, &a).status, BalanceStatus::Credit);
        assert_eq!(balance_of(&balances, &b).final_balance, Money::new(10000));
        assert_eq!(balance_of(&balances, &b).status, BalanceStatus::Debit);
        assert_eq!(balance_of(&balances, &c).final_balance, Money::new(10000));
        assert_eq!(balance_of(&balances, &c).status, BalanceStatus::Debit);
    }

    #[test]
    fn prior_settlement_reduces_pending_and_pool() {
        // Same as above, but A was already paid back 150: pending drops to
        // 150, the pool to 150 and the share to 50.
        let a = member("r", "a@x");
        let b = member("r", "b@x");
        let c = member("r", "c@x");
        let expenses = vec![expense("r", &a, 30000)];
        let entries = vec![debit("r", &a, 15000)];
        let balances =
            compute_balances(&[a.clone(), b.clone(), c.clone()], &expenses, &entries);

        let a_bal = balance_of(&balances, &a);
        assert_eq!(a_bal.total_settlements, Money::new(-15000));
        assert_eq!(a_bal.pending, Money::new(15000));
        assert_eq!(a_bal.equal_share, Money::new(5000));
        assert_eq!(a_bal.final_balance, Money::new(-10000));
        assert_eq!(balance_of(&balances, &b).final_balance, Money::new(5000));
        assert_eq!(balance_of(&balances, &c).final_balance, Money::new(5000));
    }

    #[test]
    fn debit_round_trip_decreases_pending_by_exact_amount() {
        let a = member("r", "a@x");
        let b = member("r", "b@x");
        let expenses = vec![expense("r", &a, 10000)];

        let before = compute_balances(&[a.clone(), b.clone()], &expenses, &[]);
        let entries = vec![debit("r", &a, 4000)];
        let after = compute_balances(&[a.clone(), b.clone()], &expenses, &entries);

        let delta = balance_of(&before, &a).pending - balance_of(&after, &a).pending;
        assert_eq!(delta, Money::new(4000));
    }

    #[test]
    fn contributions_reduce_what_a_member_owes() {
        let a = member("r", "a@x");
        let b = member("r", "b@x");
        let expenses = vec![expense("r", &a, 10000)];
        let entries = vec![credit("r", &b, 3000)];
        let balances = compute_balances(&[a.clone(), b.clone()], &expenses, &entries);

        // B's share is 50.00, minus the 30.00 already paid in.
        assert_eq!(balance_of(&balances, &b).final_balance, Money::new(2000));
    }

    #[test]
    fn over_reimbursed_member_does_not_shrink_the_pool() {
        // A fronted 100 and was paid back 150: pending is -50 but the pool
        // still only counts B's outstanding 100.
        let a = member("r", "a@x");
        let b = member("r", "b@x");
        let expenses = vec![expense("r", &a, 10000), expense("r", &b, 10000)];
        let entries = vec![debit("r", &a, 15000)];
        let balances =
            compute_balances(&[a.clone(), b.clone()], &expenses, &entries);

        assert_eq!(balance_of(&balances, &a).pending, Money::new(-5000));
        // Pool = max(-50, 0) + 100 = 100, share = 50.
        assert_eq!(balance_of(&balances, &a).equal_share, Money::new(5000));
        assert_eq!(balance_of(&balances, &a).final_balance, Money::new(10000));
    }

    #[test]
    fn voided_expenses_are_ignored() {
        let a = member("r", "a@x");
        let b = member("r", "b@x");
        let mut voided = expense("r", &a, 30000);
        voided.voided_at = Some(Utc::now());
        voided.voided_by = Some("admin".to_string());
        let balances = compute_balances(&[a.clone(), b.clone()], &[voided], &[]);
        assert_eq!(balance_of(&balances, &a).total_expenses, Money::ZERO);
        assert_eq!(balance_of(&balances, &a).status, BalanceStatus::Even);
    }

    #[test]
    fn duplicate_emails_are_collapsed() {
        let a = member("r", "a@x");
        let dup = member("r", "a@x");
        let b = member("r", "b@x");
        let balances = compute_balances(&[a, dup, b], &[], &[]);
        assert_eq!(balances.len(), 2);
    }

    #[test]
    fn conservation_without_credits() {
        // Sum of final balances is zero (up to share rounding) whenever no
        // credit entries exist and no member is over-reimbursed.
        let a = member("r", "a@x");
        let b = member("r", "b@x");
        let c = member("r", "c@x");
        let d = member("r", "d@x");
        let members = [a.clone(), b.clone(), c.clone(), d.clone()];
        let expenses = vec![
            expense("r", &a, 12345),
            expense("r", &b, 678),
            expense("r", &c, 9999),
            expense("r", &a, 2),
        ];
        let entries = vec![debit("r", &a, 345), debit("r", &c, 999)];
        let balances = compute_balances(&members, &expenses, &entries);

        let total: Money = balances.iter().map(|b| b.final_balance).sum();
        let bound = Money::TOLERANCE.cents() * balances.len() as i64;
        assert!(
            total.cents().abs() <= bound,
            "conservation violated: {total}"
        );
    }

    #[test]
    fn output_is_sorted_by_member_id() {
        let members: Vec<Member> = (0..5).map(|i| member("r", &format!("{i}@x"))).collect();
        let balances = compute_balances(&members, &[], &[]);
        let mut ids: Vec<Uuid> = balances.iter().map(|b| b.member_id).collect();
        let sorted = ids.clone();
        ids.sort();
        assert_eq!(ids, sorted);
    }
}
