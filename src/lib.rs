pub mod config;
pub mod error;
pub mod format;
pub mod invoice;
pub mod lines;

pub use config::{Config, TaxRateEntry, TaxRateSet};
pub use error::{CalcError, Result};
pub use invoice::{load_document, Document, ReportData, ScheduleData};
pub use lines::{
    aggregate, compute_balance_totals, compute_discount_line, compute_line, payment_schedule,
    DiscountLine, Line, LineCollection, PaymentLine, TaxRate, Totals,
};
