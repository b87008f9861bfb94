//! Allocation policies keyed by participant.
//!
//! A [`SplitPolicy`] carries its per-participant input as an ordered list, so
//! the order a caller lists participants in is the order the remainder
//! distributor favours.

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ItemizedBill, MoneyCents, ParticipantId, Percent, ResultEngine,
    allocate_by_percent, allocate_by_shares, allocate_equal, allocate_exact,
};

/// One participant's owed amount on an expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub participant: ParticipantId,
    pub amount: MoneyCents,
}

/// Owed amounts for one expense. `shares` always sums to `total`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub total: MoneyCents,
    pub shares: Vec<Share>,
}

impl Allocation {
    fn from_parts(
        total: MoneyCents,
        participants: &[ParticipantId],
        amounts: Vec<MoneyCents>,
    ) -> Self {
        let shares = participants
            .iter()
            .zip(amounts)
            .map(|(participant, amount)| Share {
                participant: *participant,
                amount,
            })
            .collect();
        Self { total, shares }
    }

    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.shares.iter().map(|share| share.participant)
    }
}

/// How a single total is divided.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "participants", rename_all = "snake_case")]
pub enum SplitPolicy {
    Equal(Vec<ParticipantId>),
    Exact(Vec<(ParticipantId, MoneyCents)>),
    Percent(Vec<(ParticipantId, Percent)>),
    Shares(Vec<(ParticipantId, u64)>),
}

impl SplitPolicy {
    /// Participants in the order the policy lists them.
    #[must_use]
    pub fn participants(&self) -> Vec<ParticipantId> {
        match self {
            Self::Equal(ids) => ids.clone(),
            Self::Exact(entries) => entries.iter().map(|(id, _)| *id).collect(),
            Self::Percent(entries) => entries.iter().map(|(id, _)| *id).collect(),
            Self::Shares(entries) => entries.iter().map(|(id, _)| *id).collect(),
        }
    }

    pub fn allocate(&self, total: MoneyCents) -> ResultEngine<Allocation> {
        let participants = self.participants();
        ensure_distinct(&participants)?;

        let amounts = match self {
            Self::Equal(ids) => allocate_equal(total, ids.len()),
            Self::Exact(entries) => {
                let amounts: Vec<MoneyCents> = entries.iter().map(|(_, a)| *a).collect();
                allocate_exact(total, &amounts)?;
                amounts
            }
            Self::Percent(entries) => {
                let percentages: Vec<Percent> = entries.iter().map(|(_, p)| *p).collect();
                allocate_by_percent(total, &percentages)?
            }
            Self::Shares(entries) => {
                let shares: Vec<u64> = entries.iter().map(|(_, s)| *s).collect();
                allocate_by_shares(total, &shares)?
            }
        };

        Ok(Allocation::from_parts(total, &participants, amounts))
    }
}

fn ensure_distinct(participants: &[ParticipantId]) -> ResultEngine<()> {
    for (i, participant) in participants.iter().enumerate() {
        if participants[..i].contains(participant) {
            return Err(EngineError::DuplicateParticipant(*participant));
        }
    }
    Ok(())
}

/// Everything needed to turn an expense into owed amounts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Charge {
    /// A known total divided by a policy.
    Split {
        total: MoneyCents,
        policy: SplitPolicy,
    },
    /// A bill whose total is derived from its items and surcharges.
    Itemized(ItemizedBill),
}

impl Charge {
    pub fn allocate(&self) -> ResultEngine<Allocation> {
        match self {
            Self::Split { total, policy } => policy.allocate(*total),
            Self::Itemized(bill) => {
                let itemized = bill.allocate()?;
                let shares = itemized
                    .per_participant()
                    .map(|(participant, amount)| Share {
                        participant,
                        amount,
                    })
                    .collect();
                Ok(Allocation {
                    total: itemized.total(),
                    shares,
                })
            }
        }
    }

    /// Line items to keep alongside the expense, if any.
    #[must_use]
    pub fn items(&self) -> &[crate::LineItem] {
        match self {
            Self::Split { .. } => &[],
            Self::Itemized(bill) => &bill.items,
        }
    }
}
