use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::line::{
    checked_add, compute_discount_line, compute_line, DiscountLine, Line, LineGroup, TaxRate,
};
use crate::error::Result;

/// One entry of a collection, kept in display order
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Task(Line),
    Group(LineGroup),
    Discount(DiscountLine),
}

impl Entry {
    /// Pre-tax amount and tax grouped by rate for this entry
    fn contributions(&self) -> Result<Vec<(TaxRate, Decimal, Decimal)>> {
        match self {
            Entry::Task(line) => {
                let a = compute_line(line)?;
                Ok(vec![(line.tax_rate(), a.ht, a.tax)])
            }
            Entry::Group(group) => Ok(group
                .line_amounts()?
                .into_iter()
                .map(|(rate, a)| (rate, a.ht, a.tax))
                .collect()),
            Entry::Discount(discount) => {
                let a = compute_discount_line(discount)?;
                Ok(vec![(discount.tax_rate(), a.ht, a.tax)])
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineCollection {
    entries: Vec<Entry>,
}

impl LineCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    pub fn push_line(&mut self, line: Line) {
        self.entries.push(Entry::Task(line));
    }

    pub fn push_group(&mut self, group: LineGroup) {
        self.entries.push(Entry::Group(group));
    }

    pub fn push_discount(&mut self, discount: DiscountLine) {
        self.entries.push(Entry::Discount(discount));
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// HT of task lines and groups, before any discount
    pub fn tasks_ht(&self) -> Result<Decimal> {
        let mut ht = Decimal::ZERO;
        for entry in self.entries.iter().filter(|e| !matches!(e, Entry::Discount(_))) {
            for (_, line_ht, _) in entry.contributions()? {
                ht = checked_add(ht, line_ht)?;
            }
        }
        Ok(ht)
    }

    pub fn totals(&self) -> Result<Totals> {
        aggregate(self)
    }
}

impl FromIterator<Entry> for LineCollection {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Aggregated amounts of a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub ht: Decimal,
    pub tax_by_rate: BTreeMap<TaxRate, Decimal>,
    pub ttc: Decimal,
}

impl Totals {
    pub fn tax(&self) -> Result<Decimal> {
        self.tax_by_rate
            .values()
            .try_fold(Decimal::ZERO, |acc, tax| checked_add(acc, *tax))
    }

    /// Add a pre-tax amount taxed at `rate`, keeping ttc = ht + tax
    pub fn add(&mut self, rate: TaxRate, ht: Decimal, tax: Decimal) -> Result<()> {
        self.ht = checked_add(self.ht, ht)?;
        let rate_tax = self.tax_by_rate.entry(rate).or_insert(Decimal::ZERO);
        *rate_tax = checked_add(*rate_tax, tax)?;
        self.ttc = checked_add(self.ht, self.tax()?)?;
        Ok(())
    }
}

/// Sum every entry into ht, tax per rate and ttc.
///
/// ttc is derived as ht + total tax, so discounts reach it only through their
/// (negative) ht and tax.
pub fn aggregate(collection: &LineCollection) -> Result<Totals> {
    let mut totals = Totals::default();
    for entry in &collection.entries {
        for (rate, ht, tax) in entry.contributions()? {
            totals.add(rate, ht, tax)?;
        }
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use rust_decimal_macros::dec;

    fn two_lines() -> LineCollection {
        let mut collection = LineCollection::new();
        collection.push_line(Line::new(dec!(100.25), dec!(1.25), TaxRate(1960)).unwrap());
        collection.push_line(Line::new(dec!(100), dec!(1), TaxRate(500)).unwrap());
        collection
    }

    #[test]
    fn test_aggregate_two_lines() {
        let collection = two_lines();
        assert_eq!(collection.len(), 2);

        let totals = aggregate(&collection).unwrap();
        assert_eq!(totals.ht, dec!(225.3125));
        assert_eq!(totals.ttc, dec!(254.87375));
        assert_eq!(totals.tax_by_rate.len(), 2);
        assert_eq!(totals.tax_by_rate[&TaxRate(1960)], dec!(24.56125));
        assert_eq!(totals.tax_by_rate[&TaxRate(500)], dec!(5));
    }

    #[test]
    fn test_aggregate_with_discount() {
        let mut collection = two_lines();
        collection.push_discount(DiscountLine::new(dec!(100), TaxRate(1960)));

        let totals = collection.totals().unwrap();
        assert_eq!(collection.tasks_ht().unwrap(), dec!(225.3125));
        assert_eq!(totals.ht, dec!(125.3125));
        assert_eq!(totals.tax_by_rate[&TaxRate(1960)], dec!(4.96125));
        assert_eq!(totals.tax().unwrap(), dec!(9.96125));
        assert_eq!(totals.ttc, dec!(135.27375));
    }

    #[test]
    fn test_rate_only_on_discount_is_a_key() {
        let mut collection = two_lines();
        collection.push_discount(DiscountLine::new(dec!(10), TaxRate(2000)));

        let totals = aggregate(&collection).unwrap();
        assert_eq!(totals.tax_by_rate[&TaxRate(2000)], dec!(-2));
        assert_eq!(totals.tax_by_rate.len(), 3);
    }

    #[test]
    fn test_groups_count_like_lines() {
        let mut flat = LineCollection::new();
        flat.push_line(Line::new(dec!(10), dec!(3), TaxRate(1960)).unwrap());
        flat.push_line(Line::new(dec!(7.5), dec!(2), TaxRate(500)).unwrap());

        let grouped: LineCollection = vec![Entry::Group(
            LineGroup::new(
                "Ouvrage",
                dec!(1),
                vec![
                    Line::new(dec!(10), dec!(3), TaxRate(1960)).unwrap(),
                    Line::new(dec!(7.5), dec!(2), TaxRate(500)).unwrap(),
                ],
            )
            .unwrap(),
        )]
        .into_iter()
        .collect();

        assert_eq!(aggregate(&flat).unwrap(), aggregate(&grouped).unwrap());
    }

    #[test]
    fn test_group_quantity_counts_in_totals() {
        let mut collection = LineCollection::new();
        collection.push_group(
            LineGroup::new(
                "Ouvrage",
                dec!(3),
                vec![Line::new(dec!(10), dec!(2), TaxRate(500)).unwrap()],
            )
            .unwrap(),
        );

        let totals = aggregate(&collection).unwrap();
        assert_eq!(collection.tasks_ht().unwrap(), dec!(60));
        assert_eq!(totals.ht, dec!(60));
        assert_eq!(totals.tax_by_rate[&TaxRate(500)], dec!(3));
        assert_eq!(totals.ttc, dec!(63));
    }

    #[test]
    fn test_aggregate_overflow_is_an_error() {
        let mut collection = LineCollection::new();
        collection.push_line(Line::new(Decimal::MAX, dec!(1), TaxRate(0)).unwrap());
        collection.push_line(Line::new(Decimal::MAX, dec!(1), TaxRate(0)).unwrap());
        assert!(matches!(
            aggregate(&collection),
            Err(CalcError::AmountOverflow)
        ));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let collection = two_lines();
        assert_eq!(aggregate(&collection).unwrap(), aggregate(&collection).unwrap());
    }

    #[test]
    fn test_empty_collection() {
        let totals = aggregate(&LineCollection::new()).unwrap();
        assert_eq!(totals.ht, Decimal::ZERO);
        assert_eq!(totals.ttc, Decimal::ZERO);
        assert!(totals.tax_by_rate.is_empty());
    }

    #[test]
    fn test_totals_add_keeps_ttc_consistent() {
        let mut totals = aggregate(&two_lines()).unwrap();
        totals.add(TaxRate(2000), dec!(50), dec!(10)).unwrap();
        assert_eq!(totals.ht, dec!(275.3125));
        assert_eq!(totals.ttc, dec!(314.87375));
    }
}
