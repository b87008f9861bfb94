//! Itemized bills: line items shared by the people who had them, plus tax and
//! service charge spread in proportion to what each person ordered.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    EngineError, MoneyCents, ParticipantId, Percent, ResultEngine, allocate_by_shares,
    allocate_equal,
};

/// One priced line of a bill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub amount: MoneyCents,
    /// Who shares this item. Listing order decides who absorbs leftover cents.
    #[serde(default)]
    pub assigned: Vec<ParticipantId>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, amount: MoneyCents, assigned: Vec<ParticipantId>) -> Self {
        Self {
            name: name.into(),
            amount,
            assigned,
        }
    }

    /// Assignees with repeats removed, first occurrence wins.
    fn assignees(&self) -> Vec<ParticipantId> {
        let mut seen = Vec::with_capacity(self.assigned.len());
        for participant in &self.assigned {
            if !seen.contains(participant) {
                seen.push(*participant);
            }
        }
        seen
    }
}

/// A bill whose items have been confirmed and assigned by a person.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedBill {
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub tax_rate: Percent,
    #[serde(default)]
    pub service_rate: Percent,
}

impl ItemizedBill {
    pub fn allocate(&self) -> ResultEngine<ItemizedAllocation> {
        allocate_itemized(&self.items, self.tax_rate, self.service_rate)
    }
}

/// What one participant owes on an itemized bill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedShare {
    pub participant: ParticipantId,
    pub items: MoneyCents,
    pub tax: MoneyCents,
    pub service: MoneyCents,
}

impl ItemizedShare {
    #[must_use]
    pub fn total(&self) -> MoneyCents {
        self.items + self.tax + self.service
    }
}

/// Result of [`allocate_itemized`].
///
/// `shares` follows the order in which participants first appear across the
/// items. Each column (items, tax, service) sums exactly to its bill-level
/// counterpart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedAllocation {
    pub shares: Vec<ItemizedShare>,
    pub subtotal: MoneyCents,
    pub tax: MoneyCents,
    pub service: MoneyCents,
}

impl ItemizedAllocation {
    /// Grand total: items plus surcharges.
    #[must_use]
    pub fn total(&self) -> MoneyCents {
        self.subtotal + self.tax + self.service
    }

    pub fn per_participant(&self) -> impl Iterator<Item = (ParticipantId, MoneyCents)> + '_ {
        self.shares.iter().map(|share| (share.participant, share.total()))
    }
}

/// Splits each item evenly across its assignees, then spreads tax and service
/// charge proportionally to each participant's item subtotal.
///
/// Tax and service are computed on the bill subtotal and rounded half away
/// from zero. A bill with no items, or with only zero-priced items, yields an
/// empty allocation with a zero total; rejecting it is up to the caller.
pub fn allocate_itemized(
    items: &[LineItem],
    tax_rate: Percent,
    service_rate: Percent,
) -> ResultEngine<ItemizedAllocation> {
    for (label, rate) in [("tax", tax_rate), ("service", service_rate)] {
        if rate.is_negative() {
            return Err(EngineError::InvalidPercentage(format!(
                "{label} rate must be >= 0, got {rate}"
            )));
        }
    }

    let mut order: Vec<ParticipantId> = Vec::new();
    let mut subtotals: HashMap<ParticipantId, MoneyCents> = HashMap::new();
    let mut subtotal = MoneyCents::ZERO;

    for item in items {
        if item.amount.is_negative() {
            return Err(EngineError::InvalidAmount(format!(
                "item \"{}\" has a negative amount",
                item.name
            )));
        }
        let assignees = item.assignees();
        if assignees.is_empty() {
            if item.amount.is_positive() {
                return Err(EngineError::UnassignedItem(item.name.clone()));
            }
            continue;
        }

        // Every per-participant subtotal is bounded by the bill subtotal.
        subtotal = subtotal
            .checked_add(item.amount)
            .ok_or_else(|| EngineError::InvalidAmount("bill subtotal overflows".to_string()))?;
        let parts = allocate_equal(item.amount, assignees.len());
        for (participant, part) in assignees.into_iter().zip(parts) {
            *subtotals.entry(participant).or_insert_with(|| {
                order.push(participant);
                MoneyCents::ZERO
            }) += part;
        }
    }

    if subtotal.is_zero() {
        return Ok(ItemizedAllocation::default());
    }

    let out_of_range = || EngineError::InvalidAmount("bill total overflows".to_string());
    let tax = tax_rate.rounded_of(subtotal).ok_or_else(out_of_range)?;
    let service = service_rate.rounded_of(subtotal).ok_or_else(out_of_range)?;
    MoneyCents::checked_sum([subtotal, tax, service]).ok_or_else(out_of_range)?;

    let item_parts: Vec<MoneyCents> = order
        .iter()
        .map(|p| subtotals.get(p).copied().unwrap_or_default())
        .collect();
    // Item parts are sums of non-negative equal splits.
    let weights: Vec<u64> = item_parts.iter().map(|c| c.cents().unsigned_abs()).collect();
    let tax_parts = allocate_by_shares(tax, &weights)?;
    let service_parts = allocate_by_shares(service, &weights)?;

    let shares = order
        .into_iter()
        .zip(item_parts)
        .zip(tax_parts.into_iter().zip(service_parts))
        .map(|((participant, items), (tax, service))| ItemizedShare {
            participant,
            items,
            tax,
            service,
        })
        .collect();

    Ok(ItemizedAllocation {
        shares,
        subtotal,
        tax,
        service,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: ParticipantId = ParticipantId(1);
    const BOB: ParticipantId = ParticipantId(2);
    const CAROL: ParticipantId = ParticipantId(3);

    fn item(name: &str, cents: i64, assigned: &[ParticipantId]) -> LineItem {
        LineItem::new(name, MoneyCents::new(cents), assigned.to_vec())
    }

    #[test]
    fn shared_item_with_tax() {
        let items = [item("Pizza", 1000, &[ALICE, BOB])];
        let allocation = allocate_itemized(&items, Percent::whole(10), Percent::ZERO).unwrap();

        assert_eq!(allocation.subtotal, MoneyCents::new(1000));
        assert_eq!(allocation.tax, MoneyCents::new(100));
        assert_eq!(allocation.total(), MoneyCents::new(1100));
        let totals: Vec<_> = allocation.per_participant().collect();
        assert_eq!(
            totals,
            vec![(ALICE, MoneyCents::new(550)), (BOB, MoneyCents::new(550))]
        );
    }

    #[test]
    fn surcharges_follow_item_subtotals() {
        let items = [
            item("Steak", 3000, &[ALICE]),
            item("Salad", 1000, &[BOB]),
            item("Wine", 2000, &[ALICE, BOB]),
        ];
        let allocation =
            allocate_itemized(&items, Percent::whole(6), Percent::whole(10)).unwrap();

        assert_eq!(allocation.subtotal, MoneyCents::new(6000));
        assert_eq!(allocation.tax, MoneyCents::new(360));
        assert_eq!(allocation.service, MoneyCents::new(600));
        assert_eq!(
            allocation.shares,
            vec![
                ItemizedShare {
                    participant: ALICE,
                    items: MoneyCents::new(4000),
                    tax: MoneyCents::new(240),
                    service: MoneyCents::new(400),
                },
                ItemizedShare {
                    participant: BOB,
                    items: MoneyCents::new(2000),
                    tax: MoneyCents::new(120),
                    service: MoneyCents::new(200),
                },
            ]
        );
    }

    #[test]
    fn leftover_cents_go_to_first_listed_assignee() {
        let items = [item("Fries", 100, &[CAROL, ALICE, BOB])];
        let allocation = allocate_itemized(&items, Percent::ZERO, Percent::ZERO).unwrap();
        let totals: Vec<_> = allocation.per_participant().collect();
        assert_eq!(
            totals,
            vec![
                (CAROL, MoneyCents::new(34)),
                (ALICE, MoneyCents::new(33)),
                (BOB, MoneyCents::new(33)),
            ]
        );
    }

    #[test]
    fn repeated_assignee_counts_once() {
        let items = [item("Soda", 300, &[ALICE, ALICE, BOB])];
        let allocation = allocate_itemized(&items, Percent::ZERO, Percent::ZERO).unwrap();
        let totals: Vec<_> = allocation.per_participant().collect();
        assert_eq!(
            totals,
            vec![(ALICE, MoneyCents::new(150)), (BOB, MoneyCents::new(150))]
        );
    }

    #[test]
    fn unassigned_priced_item_is_rejected() {
        let items = [item("Pizza", 1000, &[ALICE]), item("Mystery", 250, &[])];
        assert_eq!(
            allocate_itemized(&items, Percent::ZERO, Percent::ZERO),
            Err(EngineError::UnassignedItem("Mystery".to_string()))
        );
    }

    #[test]
    fn zero_priced_unassigned_item_is_ignored() {
        let items = [item("Water", 0, &[]), item("Tea", 500, &[BOB])];
        let allocation = allocate_itemized(&items, Percent::ZERO, Percent::ZERO).unwrap();
        assert_eq!(allocation.total(), MoneyCents::new(500));
        assert_eq!(allocation.shares.len(), 1);
    }

    #[test]
    fn empty_or_free_bill_allocates_nothing() {
        let empty = allocate_itemized(&[], Percent::whole(10), Percent::whole(5)).unwrap();
        assert!(empty.shares.is_empty());
        assert_eq!(empty.total(), MoneyCents::ZERO);

        let free = allocate_itemized(&[item("Water", 0, &[ALICE])], Percent::whole(10), Percent::ZERO)
            .unwrap();
        assert!(free.shares.is_empty());
        assert_eq!(free.total(), MoneyCents::ZERO);
    }

    #[test]
    fn negative_inputs_are_rejected() {
        assert!(matches!(
            allocate_itemized(&[item("Refund", -100, &[ALICE])], Percent::ZERO, Percent::ZERO),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(matches!(
            allocate_itemized(&[item("Tea", 100, &[ALICE])], Percent::whole(-1), Percent::ZERO),
            Err(EngineError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn bills_beyond_cents_are_rejected() {
        let items = [
            item("Yacht", i64::MAX, &[ALICE]),
            item("Fuel", 1, &[BOB]),
        ];
        assert!(matches!(
            allocate_itemized(&items, Percent::ZERO, Percent::ZERO),
            Err(EngineError::InvalidAmount(_))
        ));
        let items = [item("Yacht", i64::MAX, &[ALICE])];
        assert!(matches!(
            allocate_itemized(&items, Percent::whole(10), Percent::ZERO),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn bill_deserializes_from_json() {
        let bill: ItemizedBill = serde_json::from_str(
            r#"{
                "items": [
                    { "name": "Nasi lemak", "amount": 1250, "assigned": [1, 2] },
                    { "name": "Teh tarik", "amount": 350, "assigned": [2] }
                ],
                "tax_rate": 6,
                "service_rate": "10"
            }"#,
        )
        .unwrap();
        assert_eq!(bill.items.len(), 2);
        assert_eq!(bill.tax_rate, Percent::whole(6));
        assert_eq!(bill.service_rate, Percent::whole(10));

        let allocation = bill.allocate().unwrap();
        assert_eq!(allocation.subtotal, MoneyCents::new(1600));
        assert_eq!(allocation.tax, MoneyCents::new(96));
        assert_eq!(allocation.service, MoneyCents::new(160));
        assert_eq!(allocation.total(), MoneyCents::new(1856));
    }
}
