mod balance;
mod collection;
mod line;

pub use balance::{
    compute_balance_totals, payment_schedule, BalanceTotals, PaymentLine, PaymentSchedule,
    DEPOSIT_PERCENTS, PAYMENT_TIMES,
};
pub use collection::{aggregate, Entry, LineCollection, Totals};
pub use line::{
    compute_discount_line, compute_line, DiscountAmounts, DiscountLine, Line, LineAmounts,
    LineGroup, TaxRate,
};
