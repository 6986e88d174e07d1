use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::Config;
use crate::format::{format_currency, format_price};
use crate::error::Result;
use crate::invoice::Document;
use crate::lines::{compute_discount_line, compute_line, Entry, PaymentSchedule};

/// One displayed line of the document body
#[derive(Debug, Serialize)]
pub struct ReportLine {
    pub kind: &'static str,
    pub description: String,
    pub cost: String,
    pub quantity: String,
    pub tva: String,
    pub total: String,
}

/// TVA total for one rate
#[derive(Debug, Serialize)]
pub struct ReportTax {
    pub rate: u32,
    pub label: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
pub struct ReportPayment {
    pub description: String,
    pub date: Option<String>,
    pub amount: String,
}

/// Everything needed to display a computed document
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub lines: Vec<ReportLine>,
    pub tasks_ht: String,
    pub total_ht: String,
    pub taxes: Vec<ReportTax>,
    pub total_ttc: String,
    pub payments: Vec<ReportPayment>,
    pub remaining_ht: String,
    pub total: String,
    pub grand_total: Decimal,
}

impl ReportData {
    pub fn build(document: &Document, config: &Config) -> Result<Self> {
        let symbol = config.currency.symbol.as_str();
        let precise = |value: Decimal| format_currency(value, false, symbol);
        let cents = |value: Decimal| format_currency(value, true, symbol);

        let mut lines = Vec::new();
        for item in &document.items {
            match &item.entry {
                Entry::Task(line) => lines.push(ReportLine {
                    kind: "line",
                    description: item.label.clone(),
                    cost: precise(line.cost()),
                    quantity: format_price(line.quantity(), false),
                    tva: config.tax.label(line.tax_rate()),
                    total: precise(compute_line(line)?.ht),
                }),
                Entry::Group(group) => {
                    lines.push(ReportLine {
                        kind: "group",
                        description: item.label.clone(),
                        cost: String::new(),
                        quantity: format_price(group.quantity(), false),
                        tva: String::new(),
                        total: precise(group.amounts()?.ht),
                    });
                    for (idx, line) in group.lines.iter().enumerate() {
                        let label = item.line_labels.get(idx).cloned().unwrap_or_default();
                        lines.push(ReportLine {
                            kind: "group-line",
                            description: format!("  {label}"),
                            cost: precise(line.cost()),
                            quantity: format_price(line.quantity(), false),
                            tva: config.tax.label(line.tax_rate()),
                            total: precise(compute_line(line)?.ht),
                        });
                    }
                }
                Entry::Discount(discount) => lines.push(ReportLine {
                    kind: "discount",
                    description: item.label.clone(),
                    cost: String::new(),
                    quantity: String::new(),
                    tva: config.tax.label(discount.tax_rate()),
                    total: precise(compute_discount_line(discount)?.ht),
                }),
            }
        }

        let totals = document.totals()?;
        let balance = document.balance()?;

        // Highest rate first
        let taxes = totals
            .tax_by_rate
            .iter()
            .rev()
            .map(|(rate, amount)| ReportTax {
                rate: rate.basis_points(),
                label: config.tax.label(*rate),
                amount: cents(*amount),
            })
            .collect();

        let payments = document
            .payments
            .iter()
            .map(|p| -> Result<ReportPayment> {
                Ok(ReportPayment {
                    description: p.description.clone(),
                    date: p.date.map(|d| d.format("%d/%m/%Y").to_string()),
                    amount: cents(p.ttc()?),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            lines,
            tasks_ht: precise(document.collection().tasks_ht()?),
            total_ht: cents(totals.ht),
            taxes,
            total_ttc: cents(totals.ttc),
            payments,
            remaining_ht: cents(balance.remaining_ht),
            total: cents(balance.remaining_ttc),
            grand_total: balance.grand_total,
        })
    }
}

/// A payment schedule ready for display
#[derive(Debug, Serialize)]
pub struct ScheduleData {
    pub total: String,
    pub deposit_percent: u32,
    pub deposit: String,
    pub instalments: Vec<String>,
}

impl ScheduleData {
    pub fn build(schedule: &PaymentSchedule, deposit_percent: u32, config: &Config) -> Self {
        let symbol = config.currency.symbol.as_str();
        Self {
            total: format_currency(schedule.total(), true, symbol),
            deposit_percent,
            deposit: format_currency(schedule.deposit, true, symbol),
            instalments: schedule
                .instalments
                .iter()
                .map(|amount| format_currency(*amount, true, symbol))
                .collect(),
        }
    }
}
