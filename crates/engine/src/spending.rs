//! Per-participant spending statistics for the roster.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Expense, MoneyCents, ParticipantId, ResultEngine, Split};

fn out_of_range(what: &str) -> EngineError {
    EngineError::InvalidAmount(format!("{what} is out of range"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSpending {
    pub participant: ParticipantId,
    /// Sum of everything this participant owes across all expenses.
    pub total_share: MoneyCents,
    /// Sum of the totals this participant paid up front.
    pub paid_total: MoneyCents,
    /// Number of expenses this participant paid.
    pub paid_count: usize,
}

/// Spending per roster participant, highest share first.
///
/// Only roster participants are reported. Ties keep roster order.
pub fn spending_summary(
    participants: &[ParticipantId],
    expenses: &[Expense],
    splits: &[Split],
) -> ResultEngine<Vec<ParticipantSpending>> {
    let mut summary: Vec<ParticipantSpending> = participants
        .iter()
        .map(|participant| ParticipantSpending {
            participant: *participant,
            total_share: MoneyCents::ZERO,
            paid_total: MoneyCents::ZERO,
            paid_count: 0,
        })
        .collect();

    for entry in &mut summary {
        let paid: Vec<MoneyCents> = expenses
            .iter()
            .filter(|e| e.payer == entry.participant)
            .map(|e| e.total)
            .collect();
        entry.paid_count = paid.len();
        entry.paid_total =
            MoneyCents::checked_sum(paid).ok_or_else(|| out_of_range("amount paid"))?;
        entry.total_share = MoneyCents::checked_sum(
            splits
                .iter()
                .filter(|s| s.participant == entry.participant)
                .map(|s| s.amount_owed),
        )
        .ok_or_else(|| out_of_range("share"))?;
    }

    summary.sort_by(|a, b| b.total_share.cmp(&a.total_share));
    Ok(summary)
}

/// What the group spent in total, as the sum of every reported share.
pub fn group_total(summary: &[ParticipantSpending]) -> ResultEngine<MoneyCents> {
    MoneyCents::checked_sum(summary.iter().map(|entry| entry.total_share))
        .ok_or_else(|| out_of_range("group total"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExpenseId;

    #[test]
    fn ranks_by_share_and_counts_payments() {
        let roster = [ParticipantId(1), ParticipantId(2), ParticipantId(3)];
        let expenses = [
            Expense {
                id: ExpenseId(1),
                total: MoneyCents::new(3000),
                payer: ParticipantId(1),
            },
            Expense {
                id: ExpenseId(2),
                total: MoneyCents::new(1000),
                payer: ParticipantId(1),
            },
        ];
        let splits = [
            (1, 1, 1000),
            (1, 2, 1000),
            (1, 3, 1000),
            (2, 3, 1000),
        ]
        .map(|(expense, participant, owed)| Split {
            expense_id: ExpenseId(expense),
            participant: ParticipantId(participant),
            amount_owed: MoneyCents::new(owed),
        });

        let summary = spending_summary(&roster, &expenses, &splits).unwrap();
        let ranking: Vec<_> = summary
            .iter()
            .map(|s| (s.participant.0, s.total_share.cents(), s.paid_count))
            .collect();
        assert_eq!(ranking, vec![(3, 2000, 0), (1, 1000, 2), (2, 1000, 0)]);
        assert_eq!(summary[1].paid_total, MoneyCents::new(4000));
        assert_eq!(group_total(&summary).unwrap(), MoneyCents::new(4000));
    }

    #[test]
    fn empty_history_reports_zeroes_for_roster() {
        let summary = spending_summary(&[ParticipantId(4)], &[], &[]).unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].total_share, MoneyCents::ZERO);
        assert_eq!(summary[0].paid_count, 0);
    }
}
