use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CalcError, Result};
use crate::format::format_percent;

pub(crate) fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b).ok_or(CalcError::AmountOverflow)
}

pub(crate) fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b).ok_or(CalcError::AmountOverflow)
}

pub(crate) fn checked_sub(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_sub(b).ok_or(CalcError::AmountOverflow)
}

fn ensure_not_negative(field: &'static str, value: Decimal) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CalcError::NegativeValue {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// A TVA rate in basis points (1960 = 19.60%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(pub u32);

impl TaxRate {
    pub fn basis_points(self) -> u32 {
        self.0
    }

    /// Multiplier applied to a pre-tax amount (1960 -> 0.1960)
    pub fn fraction(self) -> Decimal {
        Decimal::new(i64::from(self.0), 4)
    }

    pub fn tax_on(self, ht: Decimal) -> Result<Decimal> {
        checked_mul(ht, self.fraction())
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_percent(self.0))
    }
}

/// A task line: unit cost times quantity, taxed at one rate
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    cost: Decimal,
    quantity: Decimal,
    tax_rate: TaxRate,
}

impl Line {
    pub fn new(cost: Decimal, quantity: Decimal, tax_rate: TaxRate) -> Result<Self> {
        ensure_not_negative("cost", cost)?;
        ensure_not_negative("quantity", quantity)?;
        Ok(Self {
            cost,
            quantity,
            tax_rate,
        })
    }

    pub fn cost(&self) -> Decimal {
        self.cost
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn amounts(&self) -> Result<LineAmounts> {
        compute_line(self)
    }
}

/// A discount: a negative pre-tax amount taxed at one rate
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountLine {
    amount: Decimal,
    tax_rate: TaxRate,
}

impl DiscountLine {
    /// Build from the amount as entered. The sign is dropped and the stored
    /// amount is always negative (or zero).
    pub fn new(amount: Decimal, tax_rate: TaxRate) -> Self {
        Self {
            amount: -amount.abs(),
            tax_rate,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn amounts(&self) -> Result<DiscountAmounts> {
        compute_discount_line(self)
    }
}

/// A titled group of task lines ("ouvrage") ordered `quantity` times
#[derive(Debug, Clone, PartialEq)]
pub struct LineGroup {
    pub title: String,
    pub description: String,
    quantity: Decimal,
    pub lines: Vec<Line>,
}

impl LineGroup {
    pub fn new(title: impl Into<String>, quantity: Decimal, lines: Vec<Line>) -> Result<Self> {
        ensure_not_negative("group quantity", quantity)?;
        Ok(Self {
            title: title.into(),
            description: String::new(),
            quantity,
            lines,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Amounts of each line once scaled by the group quantity
    pub fn line_amounts(&self) -> Result<Vec<(TaxRate, LineAmounts)>> {
        self.lines
            .iter()
            .map(|line| {
                let ht = checked_mul(compute_line(line)?.ht, self.quantity)?;
                let tax = line.tax_rate.tax_on(ht)?;
                let amounts = LineAmounts {
                    ht,
                    tax,
                    ttc: checked_add(ht, tax)?,
                };
                Ok((line.tax_rate, amounts))
            })
            .collect()
    }

    pub fn amounts(&self) -> Result<LineAmounts> {
        self.line_amounts()?
            .into_iter()
            .try_fold(LineAmounts::default(), |acc, (_, a)| {
                Ok(LineAmounts {
                    ht: checked_add(acc.ht, a.ht)?,
                    tax: checked_add(acc.tax, a.tax)?,
                    ttc: checked_add(acc.ttc, a.ttc)?,
                })
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct LineAmounts {
    pub ht: Decimal,
    pub tax: Decimal,
    pub ttc: Decimal,
}

/// Discount lines carry no ttc of their own
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DiscountAmounts {
    pub ht: Decimal,
    pub tax: Decimal,
}

/// ht = cost × quantity, tax = ht × rate, ttc = ht + tax.
/// Fails with `AmountOverflow` when a result exceeds the decimal range.
pub fn compute_line(line: &Line) -> Result<LineAmounts> {
    let ht = checked_mul(line.cost, line.quantity)?;
    let tax = line.tax_rate.tax_on(ht)?;
    Ok(LineAmounts {
        ht,
        tax,
        ttc: checked_add(ht, tax)?,
    })
}

pub fn compute_discount_line(line: &DiscountLine) -> Result<DiscountAmounts> {
    let ht = line.amount;
    Ok(DiscountAmounts {
        ht,
        tax: line.tax_rate.tax_on(ht)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::parse_decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compute_line() {
        let line = Line::new(dec!(100.25), dec!(1.25), TaxRate(1960)).unwrap();
        let amounts = compute_line(&line).unwrap();
        assert_eq!(line.tax_rate().basis_points(), 1960);
        assert_eq!(amounts.ht, dec!(125.3125));
        assert_eq!(amounts.tax, dec!(24.56125));
        assert_eq!(amounts.ttc, dec!(149.87375));
    }

    #[test]
    fn test_compute_line_overflow_is_an_error() {
        let line = Line::new(
            parse_decimal("79228162514264337593543950335"),
            parse_decimal("2"),
            TaxRate(1960),
        )
        .unwrap();
        assert!(matches!(
            compute_line(&line),
            Err(CalcError::AmountOverflow)
        ));
    }

    #[test]
    fn test_compute_discount_line() {
        let discount = DiscountLine::new(dec!(100), TaxRate(1960));
        let amounts = discount.amounts().unwrap();
        assert_eq!(discount.amount(), dec!(-100));
        assert_eq!(amounts.ht, dec!(-100));
        assert_eq!(amounts.tax, dec!(-19.6));
    }

    #[test]
    fn test_discount_amount_is_always_negative() {
        let discount = DiscountLine::new(dec!(-42.5), TaxRate(500));
        assert_eq!(discount.amount(), dec!(-42.5));
    }

    #[test]
    fn test_line_rejects_negative_values() {
        assert!(matches!(
            Line::new(dec!(-1), dec!(1), TaxRate(1960)),
            Err(CalcError::NegativeValue { field: "cost", .. })
        ));
        assert!(matches!(
            Line::new(dec!(1), dec!(-0.5), TaxRate(1960)),
            Err(CalcError::NegativeValue {
                field: "quantity",
                ..
            })
        ));
        assert!(Line::new(dec!(0), dec!(0), TaxRate(0)).is_ok());
    }

    fn group(quantity: Decimal) -> LineGroup {
        LineGroup::new(
            "Ouvrage",
            quantity,
            vec![
                Line::new(dec!(10), dec!(2), TaxRate(500)).unwrap(),
                Line::new(dec!(5), dec!(1), TaxRate(2000)).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_group_sums_its_lines() {
        let amounts = group(dec!(1)).amounts().unwrap();
        assert_eq!(amounts.ht, dec!(25));
        assert_eq!(amounts.tax, dec!(2));
        assert_eq!(amounts.ttc, dec!(27));
    }

    #[test]
    fn test_group_quantity_scales_lines() {
        let amounts = group(dec!(2)).amounts().unwrap();
        assert_eq!(amounts.ht, dec!(50));
        assert_eq!(amounts.tax, dec!(4));
        assert_eq!(amounts.ttc, dec!(54));

        let lines = group(dec!(2)).line_amounts().unwrap();
        assert_eq!(lines[0], (TaxRate(500), LineAmounts {
            ht: dec!(40),
            tax: dec!(2),
            ttc: dec!(42),
        }));
    }

    #[test]
    fn test_group_rejects_negative_quantity() {
        assert!(matches!(
            LineGroup::new("Ouvrage", dec!(-1), Vec::new()),
            Err(CalcError::NegativeValue { .. })
        ));
    }

    #[test]
    fn test_tax_rate_display() {
        assert_eq!(TaxRate(1960).to_string(), "19,6\u{a0}%");
        assert_eq!(TaxRate(550).fraction(), dec!(0.055));
    }
}
