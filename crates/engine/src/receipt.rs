//! Receipt data produced by an OCR service.
//!
//! Everything in a [`ReceiptDraft`] is text-derived and unverified. It is only
//! used to prefill an [`ItemizedBill`] that a person still has to check and
//! assign before the bill can be allocated.

use std::fmt;

use serde::{Deserialize, Deserializer, de};

use crate::{ItemizedBill, LineItem, MoneyCents, Percent};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ReceiptLine {
    pub description: String,
    #[serde(deserialize_with = "major_units")]
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDraft {
    #[serde(default)]
    pub items: Vec<ReceiptLine>,
    #[serde(default, deserialize_with = "major_units")]
    pub total: MoneyCents,
    #[serde(default, deserialize_with = "major_units")]
    pub tax: MoneyCents,
    /// Service charge or tip.
    #[serde(default, deserialize_with = "major_units")]
    pub tip: MoneyCents,
    #[serde(default)]
    pub tax_percent: Option<Percent>,
    #[serde(default)]
    pub tip_percent: Option<Percent>,
    #[serde(default)]
    pub merchant: String,
}

impl ReceiptDraft {
    /// Sum of the recognised item lines.
    #[must_use]
    pub fn items_total(&self) -> MoneyCents {
        self.items.iter().map(|line| line.amount).sum()
    }

    /// Builds a bill to be reviewed: every positive line becomes an item with
    /// nobody assigned yet.
    ///
    /// Rates come from the printed percentages when the OCR found any (a zero
    /// percentage counts as missing), otherwise they are derived from the tax
    /// and tip amounts relative to the item total.
    #[must_use]
    pub fn to_bill(&self) -> ItemizedBill {
        let items = self
            .items
            .iter()
            .filter(|line| line.amount.is_positive())
            .map(|line| LineItem::new(line.description.trim(), line.amount, Vec::new()))
            .collect();
        let subtotal = self.items_total();
        ItemizedBill {
            items,
            tax_rate: suggested_rate(self.tax_percent, self.tax, subtotal),
            service_rate: suggested_rate(self.tip_percent, self.tip, subtotal),
        }
    }

    /// `total - (items + tax + tip)`.
    ///
    /// Anything other than zero means the OCR missed or misread a line.
    #[must_use]
    pub fn unexplained_amount(&self) -> MoneyCents {
        self.total - (self.items_total() + self.tax + self.tip)
    }
}

fn suggested_rate(printed: Option<Percent>, amount: MoneyCents, subtotal: MoneyCents) -> Percent {
    match printed {
        Some(rate) if rate.basis_points() > 0 => rate,
        _ => Percent::ratio(amount, subtotal)
            .filter(|rate| !rate.is_negative())
            .unwrap_or(Percent::ZERO),
    }
}

/// Reads an amount in major units (`12.5`, `"12.50"`, `12`) into cents by
/// parsing its decimal text.
fn major_units<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MoneyCents, D::Error> {
    deserializer.deserialize_any(MajorUnitsVisitor)
}

struct MajorUnitsVisitor;

impl de::Visitor<'_> for MajorUnitsVisitor {
    type Value = MoneyCents;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an amount in major units")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<MoneyCents, E> {
        v.checked_mul(100)
            .map(MoneyCents::new)
            .ok_or_else(|| E::custom("amount too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<MoneyCents, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("amount too large"))?;
        self.visit_i64(v)
    }

    // OCR sometimes reports more than two decimals; those are rejected rather
    // than rounded.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<MoneyCents, E> {
        v.to_string().parse().map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<MoneyCents, E> {
        v.parse().map_err(E::custom)
    }
}
