use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::debug;

use super::collection::Totals;
use super::line::{checked_add, checked_mul, checked_sub, TaxRate};
use crate::error::{CalcError, Result};
use crate::format::truncate_cents;

/// A payment already invoiced against the document (deposit, instalment)
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentLine {
    pub description: String,
    /// Pre-tax amount
    pub amount: Decimal,
    pub tax_rate: TaxRate,
    pub date: Option<NaiveDate>,
}

impl PaymentLine {
    pub fn new(description: impl Into<String>, amount: Decimal, tax_rate: TaxRate) -> Self {
        Self {
            description: description.into(),
            amount,
            tax_rate,
            date: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn ttc(&self) -> Result<Decimal> {
        checked_add(self.amount, self.tax_rate.tax_on(self.amount)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceTotals {
    pub remaining_ht: Decimal,
    pub remaining_ttc: Decimal,
    /// remaining_ttc cut to cents
    pub grand_total: Decimal,
}

/// What is left to pay once `payments` are taken off the document totals
pub fn compute_balance_totals(totals: &Totals, payments: &[PaymentLine]) -> Result<BalanceTotals> {
    let mut paid_ht = Decimal::ZERO;
    let mut paid_ttc = Decimal::ZERO;
    for payment in payments {
        paid_ht = checked_add(paid_ht, payment.amount)?;
        paid_ttc = checked_add(paid_ttc, payment.ttc()?)?;
    }

    let remaining_ttc = checked_sub(totals.ttc, paid_ttc)?;
    Ok(BalanceTotals {
        remaining_ht: checked_sub(totals.ht, paid_ht)?,
        remaining_ttc,
        grand_total: truncate_cents(remaining_ttc),
    })
}

/// Deposit percentages offered at order time
pub const DEPOSIT_PERCENTS: [u32; 12] = [0, 5, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// Number of payments the balance may be split into
pub const PAYMENT_TIMES: RangeInclusive<u32> = 1..=11;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSchedule {
    pub deposit: Decimal,
    pub instalments: Vec<Decimal>,
}

impl PaymentSchedule {
    pub fn total(&self) -> Decimal {
        self.deposit + self.instalments.iter().copied().sum::<Decimal>()
    }
}

/// Split `total` into a deposit of `deposit_percent` and `times` payments.
///
/// Every amount is cut to cents; the last payment takes whatever is left so
/// the schedule always sums to `total`.
pub fn payment_schedule(total: Decimal, deposit_percent: u32, times: u32) -> Result<PaymentSchedule> {
    if !DEPOSIT_PERCENTS.contains(&deposit_percent) {
        return Err(CalcError::InvalidDeposit(deposit_percent));
    }
    if !PAYMENT_TIMES.contains(&times) {
        return Err(CalcError::InvalidPaymentTimes(times));
    }

    let percent = Decimal::new(i64::from(deposit_percent), 2);
    let deposit = truncate_cents(checked_mul(total, percent)?);
    let rest = checked_sub(total, deposit)?;
    let part = truncate_cents(rest / Decimal::from(times));

    let mut instalments = vec![part; times as usize - 1];
    instalments.push(checked_sub(rest, checked_mul(part, Decimal::from(times - 1))?)?);

    debug!(%total, %deposit, times, "computed payment schedule");

    Ok(PaymentSchedule {
        deposit,
        instalments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{DiscountLine, Line, LineCollection};
    use rust_decimal_macros::dec;

    fn document_totals() -> Totals {
        let mut collection = LineCollection::new();
        collection.push_line(Line::new(dec!(100.25), dec!(1.25), TaxRate(1960)).unwrap());
        collection.push_line(Line::new(dec!(100), dec!(1), TaxRate(500)).unwrap());
        collection.push_discount(DiscountLine::new(dec!(100), TaxRate(1960)));
        collection.totals().unwrap()
    }

    #[test]
    fn test_balance_without_payments() {
        let balance = compute_balance_totals(&document_totals(), &[]).unwrap();
        assert_eq!(balance.remaining_ht, dec!(125.3125));
        assert_eq!(balance.remaining_ttc, dec!(135.27375));
        assert_eq!(balance.grand_total, dec!(135.27));
    }

    #[test]
    fn test_balance_with_payments() {
        let payments = vec![
            PaymentLine::new("Acompte", dec!(50), TaxRate(1960)),
            PaymentLine::new("Paiement", dec!(20), TaxRate(500)),
        ];
        let balance = compute_balance_totals(&document_totals(), &payments).unwrap();
        assert_eq!(balance.remaining_ht, dec!(55.3125));
        // 135.27375 - 59.8 - 21
        assert_eq!(balance.remaining_ttc, dec!(54.47375));
        assert_eq!(balance.grand_total, dec!(54.47));
    }

    #[test]
    fn test_balance_overflow_is_an_error() {
        let payments = vec![
            PaymentLine::new("Acompte", Decimal::MAX, TaxRate(0)),
            PaymentLine::new("Solde", Decimal::MAX, TaxRate(0)),
        ];
        assert!(matches!(
            compute_balance_totals(&document_totals(), &payments),
            Err(CalcError::AmountOverflow)
        ));
    }

    #[test]
    fn test_payment_schedule_last_absorbs_remainder() {
        let schedule = payment_schedule(dec!(135.27), 10, 3).unwrap();
        assert_eq!(schedule.deposit, dec!(13.52));
        assert_eq!(schedule.instalments, vec![dec!(40.58), dec!(40.58), dec!(40.59)]);
        assert_eq!(schedule.total(), dec!(135.27));
    }

    #[test]
    fn test_payment_schedule_single_payment() {
        let schedule = payment_schedule(dec!(100), 0, 1).unwrap();
        assert_eq!(schedule.deposit, dec!(0));
        assert_eq!(schedule.instalments, vec![dec!(100)]);
    }

    #[test]
    fn test_payment_schedule_eleven_payments() {
        let schedule = payment_schedule(dec!(110), 0, 11).unwrap();
        assert_eq!(schedule.instalments.len(), 11);
        assert_eq!(schedule.total(), dec!(110));
    }

    #[test]
    fn test_payment_schedule_rejects_bad_input() {
        assert!(matches!(
            payment_schedule(dec!(100), 15, 2),
            Err(CalcError::InvalidDeposit(15))
        ));
        assert!(matches!(
            payment_schedule(dec!(100), 10, 0),
            Err(CalcError::InvalidPaymentTimes(0))
        ));
        assert!(matches!(
            payment_schedule(dec!(100), 10, 12),
            Err(CalcError::InvalidPaymentTimes(12))
        ));
        assert!(matches!(
            payment_schedule(dec!(100), 10, u32::MAX),
            Err(CalcError::InvalidPaymentTimes(u32::MAX))
        ));
    }
}
