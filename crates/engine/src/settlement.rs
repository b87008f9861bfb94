//! Debt settlement.
//!
//! Balances are computed from the full expense history (`paid - owed` per
//! participant) and reduced to a short list of directed payments with a
//! greedy largest-debtor / largest-creditor matching.
//!
//! The matching is not guaranteed to reach the global minimum number of
//! transfers (that problem is NP-hard), but it is optimal or close for small
//! groups and fully deterministic: among equal amounts the participant
//! observed first wins.

use std::{cmp::Reverse, collections::HashMap};

use serde::{Deserialize, Serialize};

use crate::{EngineError, ExpenseId, MoneyCents, ParticipantId, ResultEngine};

/// An expense as seen by the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub total: MoneyCents,
    pub payer: ParticipantId,
}

/// One participant's owed amount on one expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub expense_id: ExpenseId,
    pub participant: ParticipantId,
    pub amount_owed: MoneyCents,
}

/// Net position of a participant: positive is owed money, negative owes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub participant: ParticipantId,
    pub net: MoneyCents,
}

/// A payment that moves `amount` from `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstruction {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: MoneyCents,
}

/// Net balance of every participant that appears in the roster, as a payer or
/// in a split.
///
/// The result is ordered by first observation: roster first, then payers in
/// expense order, then split participants in split order. A net position that
/// leaves the cents range is an [`EngineError::InvalidAmount`].
pub fn balances(
    participants: &[ParticipantId],
    expenses: &[Expense],
    splits: &[Split],
) -> ResultEngine<Vec<Balance>> {
    let mut out: Vec<Balance> = Vec::new();
    let mut index: HashMap<ParticipantId, usize> = HashMap::new();
    let mut slot = |participant: ParticipantId, out: &mut Vec<Balance>| -> usize {
        *index.entry(participant).or_insert_with(|| {
            out.push(Balance {
                participant,
                net: MoneyCents::ZERO,
            });
            out.len() - 1
        })
    };

    for participant in participants {
        slot(*participant, &mut out);
    }
    let overflow = |participant: ParticipantId| {
        EngineError::InvalidAmount(format!("balance of {participant} is out of range"))
    };
    for expense in expenses {
        let i = slot(expense.payer, &mut out);
        out[i].net = out[i]
            .net
            .checked_add(expense.total)
            .ok_or_else(|| overflow(expense.payer))?;
    }
    for split in splits {
        let i = slot(split.participant, &mut out);
        out[i].net = out[i]
            .net
            .checked_sub(split.amount_owed)
            .ok_or_else(|| overflow(split.participant))?;
    }
    Ok(out)
}

/// Computes balances and the payments that zero them out.
pub fn settle(
    participants: &[ParticipantId],
    expenses: &[Expense],
    splits: &[Split],
) -> ResultEngine<Vec<PaymentInstruction>> {
    settle_balances(&balances(participants, expenses, splits)?)
}

#[derive(Debug)]
struct Position {
    order: usize,
    participant: ParticipantId,
    outstanding: MoneyCents,
}

/// Reduces precomputed balances to payments.
///
/// The slice order is the tie-break order. Fails with
/// [`EngineError::ImbalancedLedger`] when the balances do not sum to zero, and
/// with [`EngineError::InvalidAmount`] when summing them overflows.
pub fn settle_balances(balances: &[Balance]) -> ResultEngine<Vec<PaymentInstruction>> {
    let out_of_range = || EngineError::InvalidAmount("balances are out of range".to_string());
    let net = MoneyCents::checked_sum(balances.iter().map(|b| b.net)).ok_or_else(out_of_range)?;
    if !net.is_zero() {
        return Err(EngineError::ImbalancedLedger { net });
    }

    let mut debtors = Vec::new();
    let mut creditors = Vec::new();
    for (order, balance) in balances.iter().enumerate() {
        let side = if balance.net.is_negative() {
            &mut debtors
        } else if balance.net.is_positive() {
            &mut creditors
        } else {
            continue;
        };
        side.push(Position {
            order,
            participant: balance.participant,
            outstanding: balance.net.checked_abs().ok_or_else(out_of_range)?,
        });
    }

    let mut payments = Vec::new();
    while let (Some(d), Some(c)) = (largest(&debtors), largest(&creditors)) {
        let amount = debtors[d].outstanding.min(creditors[c].outstanding);
        payments.push(PaymentInstruction {
            from: debtors[d].participant,
            to: creditors[c].participant,
            amount,
        });
        debtors[d].outstanding -= amount;
        creditors[c].outstanding -= amount;
        if debtors[d].outstanding.is_zero() {
            debtors.remove(d);
        }
        if creditors[c].outstanding.is_zero() {
            creditors.remove(c);
        }
    }

    Ok(payments)
}

fn largest(side: &[Position]) -> Option<usize> {
    side.iter()
        .enumerate()
        .min_by_key(|(_, p)| (Reverse(p.outstanding), p.order))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: i64) -> ParticipantId {
        ParticipantId(id)
    }

    fn expense(id: i64, total: i64, payer: i64) -> Expense {
        Expense {
            id: ExpenseId(id),
            total: MoneyCents::new(total),
            payer: p(payer),
        }
    }

    fn split(expense_id: i64, participant: i64, owed: i64) -> Split {
        Split {
            expense_id: ExpenseId(expense_id),
            participant: p(participant),
            amount_owed: MoneyCents::new(owed),
        }
    }

    fn bal(participant: i64, net: i64) -> Balance {
        Balance {
            participant: p(participant),
            net: MoneyCents::new(net),
        }
    }

    fn pay(from: i64, to: i64, amount: i64) -> PaymentInstruction {
        PaymentInstruction {
            from: p(from),
            to: p(to),
            amount: MoneyCents::new(amount),
        }
    }

    #[test]
    fn one_meal_three_people() {
        let roster = [p(1), p(2), p(3)];
        let expenses = [expense(1, 3000, 1)];
        let splits = [split(1, 1, 1000), split(1, 2, 1000), split(1, 3, 1000)];

        let payments = settle(&roster, &expenses, &splits).unwrap();
        assert_eq!(payments, vec![pay(2, 1, 1000), pay(3, 1, 1000)]);
    }

    #[test]
    fn no_expenses_means_nothing_to_pay() {
        let roster = [p(1), p(2), p(3)];
        assert!(settle(&roster, &[], &[]).unwrap().is_empty());
        assert!(settle(&[], &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn mismatched_split_is_an_imbalanced_ledger() {
        let roster = [p(1), p(2), p(3)];
        let expenses = [expense(1, 3000, 1)];
        let splits = [split(1, 1, 1000), split(1, 2, 1000), split(1, 3, 900)];

        assert_eq!(
            settle(&roster, &expenses, &splits),
            Err(EngineError::ImbalancedLedger {
                net: MoneyCents::new(100)
            })
        );
    }

    #[test]
    fn overflowing_balances_are_an_error() {
        assert!(matches!(
            settle_balances(&[bal(1, i64::MAX), bal(2, 1)]),
            Err(EngineError::InvalidAmount(_))
        ));
        // Sums to zero, but the debtor's position cannot be negated.
        assert!(matches!(
            settle_balances(&[bal(1, i64::MIN), bal(2, i64::MAX), bal(3, 1)]),
            Err(EngineError::InvalidAmount(_))
        ));

        let expenses = [expense(1, i64::MAX, 1), expense(2, 1, 1)];
        assert!(matches!(
            balances(&[], &expenses, &[]),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn balances_include_participants_outside_the_roster() {
        let expenses = [expense(1, 500, 7)];
        let splits = [split(1, 8, 500)];
        let balances = balances(&[p(1)], &expenses, &splits).unwrap();
        assert_eq!(
            balances,
            vec![
                bal(1, 0),
                bal(7, 500),
                bal(8, -500),
            ]
        );
    }

    #[test]
    fn largest_debtor_pays_largest_creditor_first() {
        // 1: +5000, 2: +1000, 3: -4000, 4: -2000
        let balances = [
            bal(1, 5000),
            bal(2, 1000),
            bal(3, -4000),
            bal(4, -2000),
        ];
        assert_eq!(
            settle_balances(&balances).unwrap(),
            vec![pay(3, 1, 4000), pay(4, 1, 1000), pay(4, 2, 1000)]
        );
    }

    #[test]
    fn ties_go_to_the_participant_observed_first() {
        let balances = [
            bal(9, -300),
            bal(4, 300),
            bal(2, -300),
            bal(5, 300),
        ];
        assert_eq!(
            settle_balances(&balances).unwrap(),
            vec![pay(9, 4, 300), pay(2, 5, 300)]
        );
    }

    #[test]
    fn largest_positions_are_picked_again_after_each_payment() {
        // After 1 pays 4 500, 4 is still owed 100 and 3 (owed 200) becomes the
        // largest creditor.
        let balances = [
            bal(1, -500),
            bal(2, -300),
            bal(3, 200),
            bal(4, 600),
        ];
        assert_eq!(
            settle_balances(&balances).unwrap(),
            vec![pay(1, 4, 500), pay(2, 3, 200), pay(2, 4, 100)]
        );
    }

    #[test]
    fn payments_cancel_every_balance() {
        let roster = [p(1), p(2), p(3), p(4)];
        let expenses = [expense(1, 1200, 1), expense(2, 900, 2), expense(3, 101, 4)];
        let splits = [
            split(1, 1, 400),
            split(1, 2, 400),
            split(1, 3, 400),
            split(2, 3, 450),
            split(2, 4, 450),
            split(3, 1, 51),
            split(3, 2, 50),
        ];

        let balances = balances(&roster, &expenses, &splits).unwrap();
        let payments = settle_balances(&balances).unwrap();
        for balance in &balances {
            let sent: MoneyCents = payments
                .iter()
                .filter(|x| x.from == balance.participant)
                .map(|x| x.amount)
                .sum();
            let received: MoneyCents = payments
                .iter()
                .filter(|x| x.to == balance.participant)
                .map(|x| x.amount)
                .sum();
            assert_eq!(sent - received, -balance.net);
        }
        assert!(payments.iter().all(|x| x.amount.is_positive()));
    }
}
