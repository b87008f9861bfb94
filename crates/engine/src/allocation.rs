//! Money-splitting primitives.
//!
//! Every function here turns a total into per-participant amounts that sum to
//! the total exactly. Rounding is deterministic and biased towards the
//! participants listed first, so the order of the input slice is part of the
//! result.

use crate::{EngineError, MoneyCents, Percent, ResultEngine};

/// Splits `total` evenly across `count` participants.
///
/// The first `total mod count` participants receive one extra cent. Returns an
/// empty vector when `count` is 0.
///
/// ```rust
/// use engine::{MoneyCents, allocate_equal};
///
/// let split = allocate_equal(MoneyCents::new(1000), 3);
/// assert_eq!(split, vec![MoneyCents::new(334), MoneyCents::new(333), MoneyCents::new(333)]);
/// ```
#[must_use]
pub fn allocate_equal(total: MoneyCents, count: usize) -> Vec<MoneyCents> {
    if count == 0 {
        return Vec::new();
    }
    let n = count as i64;
    let base = total.cents().div_euclid(n);
    let extra = total.cents().rem_euclid(n) as usize;
    (0..count)
        .map(|i| MoneyCents::new(if i < extra { base + 1 } else { base }))
        .collect()
}

/// Validates caller-supplied exact amounts against `total`.
///
/// Nothing is redistributed: the amounts either add up or the split is
/// rejected.
pub fn allocate_exact(total: MoneyCents, amounts: &[MoneyCents]) -> ResultEngine<()> {
    if let Some(amount) = amounts.iter().find(|a| a.is_negative()) {
        return Err(EngineError::InvalidAmount(format!(
            "owed amount must be >= 0, got {amount}"
        )));
    }
    let sum = MoneyCents::checked_sum(amounts.iter().copied())
        .ok_or_else(|| EngineError::InvalidAmount("owed amounts overflow".to_string()))?;
    if sum != total {
        return Err(EngineError::AmountMismatch { total, sum });
    }
    Ok(())
}

/// Splits `total` by percentage.
///
/// Each participant first gets `floor(total * p / 100)`, then the remainder
/// distributor absorbs the leftover. Percentages do not need to add up to 100;
/// only a non-positive sum is rejected.
pub fn allocate_by_percent(
    total: MoneyCents,
    percentages: &[Percent],
) -> ResultEngine<Vec<MoneyCents>> {
    if let Some(p) = percentages.iter().find(|p| p.is_negative()) {
        return Err(EngineError::InvalidPercentage(format!(
            "percentage must be >= 0, got {p}"
        )));
    }
    let sum: i64 = percentages.iter().map(|p| p.basis_points()).sum();
    if sum <= 0 {
        return Err(EngineError::InvalidPercentage(
            "percentages must sum to more than 0".to_string(),
        ));
    }
    let raw = percentages
        .iter()
        .map(|p| {
            p.floor_of(total).ok_or_else(|| {
                EngineError::InvalidPercentage(format!("{p}% of {total} is out of range"))
            })
        })
        .collect::<ResultEngine<Vec<_>>>()?;
    distribute_remainder(raw, total)
}

/// Splits `total` proportionally to integer weights.
pub fn allocate_by_shares(total: MoneyCents, shares: &[u64]) -> ResultEngine<Vec<MoneyCents>> {
    let sum: u128 = shares.iter().map(|s| u128::from(*s)).sum();
    if sum == 0 {
        return Err(EngineError::InvalidShares(
            "shares must sum to more than 0".to_string(),
        ));
    }
    let sum = i128::try_from(sum)
        .map_err(|_| EngineError::InvalidShares("shares too large".to_string()))?;
    let raw = shares
        .iter()
        .map(|share| {
            let scaled = i128::from(total.cents()) * i128::from(*share);
            // |total * share / sum| <= |total|, so this always fits.
            MoneyCents::new(scaled.div_euclid(sum) as i64)
        })
        .collect();
    distribute_remainder(raw, total)
}

/// Forces `raw` to sum to `total`.
///
/// The difference is handed out one cent at a time, round-robin from index 0,
/// adding when the allocation is short and subtracting when it is over.
/// An empty input is returned unchanged. The correction is computed in `i128`;
/// a corrected element that no longer fits in cents is an
/// [`EngineError::InvalidAmount`].
pub fn distribute_remainder(
    raw: Vec<MoneyCents>,
    total: MoneyCents,
) -> ResultEngine<Vec<MoneyCents>> {
    if raw.is_empty() {
        return Ok(raw);
    }
    let len = raw.len() as i128;
    let sum: i128 = raw.iter().map(|amount| i128::from(amount.cents())).sum();
    let diff = i128::from(total.cents()) - sum;
    let step = diff.signum();
    let full_passes = diff.abs() / len;
    let partial = (diff.abs() % len) as usize;

    raw.into_iter()
        .enumerate()
        .map(|(i, amount)| {
            let passes = full_passes + i128::from(i < partial);
            let corrected = i128::from(amount.cents()) + step * passes;
            i64::try_from(corrected).map(MoneyCents::new).map_err(|_| {
                EngineError::InvalidAmount(format!("corrected share {corrected} is out of range"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(values: &[i64]) -> Vec<MoneyCents> {
        values.iter().copied().map(MoneyCents::new).collect()
    }

    #[test]
    fn equal_split_gives_extra_cents_to_first_participants() {
        assert_eq!(allocate_equal(MoneyCents::new(1001), 3), cents(&[334, 334, 333]));
        assert_eq!(allocate_equal(MoneyCents::new(900), 3), cents(&[300, 300, 300]));
        assert_eq!(allocate_equal(MoneyCents::new(2), 5), cents(&[1, 1, 0, 0, 0]));
        assert_eq!(allocate_equal(MoneyCents::ZERO, 2), cents(&[0, 0]));
    }

    #[test]
    fn equal_split_of_nobody_is_empty() {
        assert!(allocate_equal(MoneyCents::new(500), 0).is_empty());
    }

    #[test]
    fn equal_split_keeps_sum_for_negative_totals() {
        let split = allocate_equal(MoneyCents::new(-10), 3);
        assert_eq!(split, cents(&[-3, -3, -4]));
        assert_eq!(split.iter().sum::<MoneyCents>(), MoneyCents::new(-10));
    }

    #[test]
    fn exact_split_reports_mismatch() {
        assert_eq!(allocate_exact(MoneyCents::new(3000), &cents(&[1000, 2000])), Ok(()));
        assert_eq!(
            allocate_exact(MoneyCents::new(3000), &cents(&[1000, 1999])),
            Err(EngineError::AmountMismatch {
                total: MoneyCents::new(3000),
                sum: MoneyCents::new(2999),
            })
        );
    }

    #[test]
    fn exact_split_overflow_is_an_error() {
        let err = allocate_exact(MoneyCents::new(100), &cents(&[i64::MAX, 1])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn exact_split_rejects_negative_amounts() {
        let err = allocate_exact(MoneyCents::new(1000), &cents(&[1500, -500])).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn percent_split_matches_floor_then_distribute() {
        let p = [Percent::whole(33), Percent::whole(33), Percent::whole(34)];
        assert_eq!(
            allocate_by_percent(MoneyCents::new(1000), &p).unwrap(),
            cents(&[330, 330, 340])
        );

        let thirds = [Percent::whole(33), Percent::whole(33), Percent::whole(33)];
        // 3 * 33 = 99 cents, the leftover cent lands on the first participant.
        assert_eq!(
            allocate_by_percent(MoneyCents::new(100), &thirds).unwrap(),
            cents(&[34, 33, 33])
        );
    }

    #[test]
    fn percent_split_absorbs_sums_other_than_hundred() {
        let over = [Percent::whole(90), Percent::whole(90)];
        assert_eq!(
            allocate_by_percent(MoneyCents::new(1000), &over).unwrap(),
            cents(&[500, 500])
        );

        let under = [Percent::whole(10), Percent::whole(20)];
        assert_eq!(
            allocate_by_percent(MoneyCents::new(1000), &under).unwrap(),
            cents(&[450, 550])
        );
    }

    #[test]
    fn percent_split_rejects_non_positive_sums() {
        let zero = [Percent::ZERO, Percent::ZERO];
        assert!(matches!(
            allocate_by_percent(MoneyCents::new(1000), &zero),
            Err(EngineError::InvalidPercentage(_))
        ));
        assert!(matches!(
            allocate_by_percent(MoneyCents::new(1000), &[]),
            Err(EngineError::InvalidPercentage(_))
        ));
        assert!(matches!(
            allocate_by_percent(MoneyCents::new(1000), &[Percent::whole(150), Percent::whole(-50)]),
            Err(EngineError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn share_split_is_proportional() {
        assert_eq!(
            allocate_by_shares(MoneyCents::new(1000), &[2, 1, 1]).unwrap(),
            cents(&[500, 250, 250])
        );
        assert_eq!(
            allocate_by_shares(MoneyCents::new(100), &[1, 1, 1]).unwrap(),
            cents(&[34, 33, 33])
        );
        assert_eq!(
            allocate_by_shares(MoneyCents::new(100), &[0, 3]).unwrap(),
            cents(&[0, 100])
        );
    }

    #[test]
    fn share_split_rejects_zero_sum() {
        assert!(matches!(
            allocate_by_shares(MoneyCents::new(100), &[0, 0]),
            Err(EngineError::InvalidShares(_))
        ));
    }

    #[test]
    fn remainder_goes_round_robin_in_both_directions() {
        assert_eq!(
            distribute_remainder(cents(&[0, 0, 0]), MoneyCents::new(7)).unwrap(),
            cents(&[3, 2, 2])
        );
        assert_eq!(
            distribute_remainder(cents(&[5, 5, 5]), MoneyCents::new(13)).unwrap(),
            cents(&[4, 4, 5])
        );
        assert_eq!(
            distribute_remainder(cents(&[1, 2]), MoneyCents::new(3)).unwrap(),
            cents(&[1, 2])
        );
    }

    #[test]
    fn remainder_on_empty_input_is_empty() {
        assert!(distribute_remainder(Vec::new(), MoneyCents::new(10)).unwrap().is_empty());
    }

    #[test]
    fn remainder_survives_raw_sums_beyond_cents() {
        let raw = cents(&[i64::MAX, i64::MAX]);
        assert_eq!(
            distribute_remainder(raw, MoneyCents::new(i64::MAX)).unwrap(),
            cents(&[i64::MAX / 2, i64::MAX / 2 + 1])
        );
        assert!(matches!(
            distribute_remainder(cents(&[i64::MIN, i64::MAX]), MoneyCents::new(i64::MAX)),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn percent_split_out_of_range_is_an_error() {
        assert!(matches!(
            allocate_by_percent(MoneyCents::new(i64::MAX), &[Percent::whole(300)]),
            Err(EngineError::InvalidPercentage(_))
        ));
    }
}
