use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::config::TaxRateSet;
use crate::error::{CalcError, Result};
use crate::format::{parse_decimal, parse_iso_date, parse_optional_decimal};
use crate::lines::{
    compute_balance_totals, BalanceTotals, DiscountLine, Entry, Line, LineCollection, LineGroup,
    PaymentLine, TaxRate, Totals,
};

/// A task line as entered in the form: every amount is a raw string
#[derive(Debug, Deserialize, Default)]
pub struct RawLine {
    #[serde(default)]
    pub description: String,
    pub cost: Option<String>,
    pub quantity: Option<String>,
    pub tva: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawGroup {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Times the whole group is ordered, 1 when missing
    pub quantity: Option<String>,
    #[serde(default)]
    pub lines: Vec<RawLine>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawDiscount {
    #[serde(default)]
    pub description: String,
    pub amount: Option<String>,
    pub tva: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawPayment {
    #[serde(default = "default_payment_description")]
    pub description: String,
    pub amount: Option<String>,
    pub tva: Option<u32>,
    pub date: Option<String>,
}

fn default_payment_description() -> String {
    "Solde".to_string()
}

/// Document file contents (TOML)
#[derive(Debug, Deserialize, Default)]
pub struct RawDocument {
    pub default_tva: Option<u32>,
    pub expenses_ht: Option<String>,
    #[serde(default)]
    pub lines: Vec<RawLine>,
    #[serde(default)]
    pub groups: Vec<RawGroup>,
    #[serde(default)]
    pub discounts: Vec<RawDiscount>,
    #[serde(default)]
    pub payments: Vec<RawPayment>,
}

/// A collection entry with the text shown next to it
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentItem {
    pub label: String,
    pub entry: Entry,
    /// Descriptions of a group's lines, in order
    pub line_labels: Vec<String>,
}

/// An invoice or estimation body: lines, flat expenses and payments
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub items: Vec<DocumentItem>,
    pub expenses_ht: Decimal,
    pub default_rate: TaxRate,
    pub payments: Vec<PaymentLine>,
}

impl Document {
    /// Validate and convert raw form values. Amounts are parsed leniently,
    /// tax rates must belong to `rates`.
    pub fn from_raw(raw: RawDocument, rates: &TaxRateSet) -> Result<Self> {
        let default_rate = match raw.default_tva {
            Some(bp) => rates.validate(bp)?,
            None => rates.default,
        };
        let rate_or_default = |tva: Option<u32>| match tva {
            Some(bp) => rates.validate(bp),
            None => Ok(default_rate),
        };

        let mut items = Vec::new();

        for line in &raw.lines {
            items.push(DocumentItem {
                label: line.description.clone(),
                entry: Entry::Task(build_line(line, rate_or_default(line.tva)?)?),
                line_labels: Vec::new(),
            });
        }

        for group in &raw.groups {
            let lines = group
                .lines
                .iter()
                .map(|line| build_line(line, rate_or_default(line.tva)?))
                .collect::<Result<Vec<_>>>()?;
            let quantity = group
                .quantity
                .as_deref()
                .map_or(Decimal::ONE, parse_decimal);
            let entry = LineGroup::new(group.title.clone(), quantity, lines)?
                .with_description(group.description.clone());
            items.push(DocumentItem {
                label: group.title.clone(),
                entry: Entry::Group(entry),
                line_labels: group.lines.iter().map(|l| l.description.clone()).collect(),
            });
        }

        for discount in &raw.discounts {
            let amount = parse_optional_decimal(discount.amount.as_deref());
            items.push(DocumentItem {
                label: discount.description.clone(),
                entry: Entry::Discount(DiscountLine::new(amount, rate_or_default(discount.tva)?)),
                line_labels: Vec::new(),
            });
        }

        let expenses_ht = parse_optional_decimal(raw.expenses_ht.as_deref());
        if expenses_ht.is_sign_negative() && !expenses_ht.is_zero() {
            return Err(CalcError::NegativeValue {
                field: "expenses_ht",
                value: expenses_ht.to_string(),
            });
        }

        let payments = raw
            .payments
            .iter()
            .map(|payment| -> Result<PaymentLine> {
                let mut line = PaymentLine::new(
                    payment.description.clone(),
                    parse_optional_decimal(payment.amount.as_deref()),
                    rate_or_default(payment.tva)?,
                );
                if let Some(date) = payment.date.as_deref() {
                    let parsed = parse_iso_date(date)?;
                    let date = parsed
                        .to_naive_date()
                        .ok_or_else(|| CalcError::InvalidDate(date.to_string()))?;
                    line = line.with_date(date);
                }
                Ok(line)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            items = items.len(),
            payments = payments.len(),
            "built document"
        );

        Ok(Self {
            items,
            expenses_ht,
            default_rate,
            payments,
        })
    }

    pub fn collection(&self) -> LineCollection {
        self.items.iter().map(|item| item.entry.clone()).collect()
    }

    /// Collection totals plus flat expenses taxed at the default rate
    pub fn totals(&self) -> Result<Totals> {
        let mut totals = self.collection().totals()?;
        if !self.expenses_ht.is_zero() {
            let tax = self.default_rate.tax_on(self.expenses_ht)?;
            totals.add(self.default_rate, self.expenses_ht, tax)?;
        }
        Ok(totals)
    }

    pub fn balance(&self) -> Result<BalanceTotals> {
        compute_balance_totals(&self.totals()?, &self.payments)
    }
}

fn build_line(raw: &RawLine, rate: TaxRate) -> Result<Line> {
    Line::new(
        parse_optional_decimal(raw.cost.as_deref()),
        parse_optional_decimal(raw.quantity.as_deref()),
        rate,
    )
}

/// Read and validate a document file
pub fn load_document(path: &Path, rates: &TaxRateSet) -> Result<Document> {
    let content = fs::read_to_string(path)?;
    let raw: RawDocument = toml::from_str(&content).map_err(|e| CalcError::DocumentParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    info!(path = %path.display(), "loaded document");
    Document::from_raw(raw, rates)
}
