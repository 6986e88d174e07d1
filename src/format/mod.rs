mod ids;
mod number;

pub use ids::{extract_trailing_index, parse_iso_date, IsoDate};
pub use number::{
    format_amount, format_currency, format_line_amount, format_percent, format_price,
    is_formattable_currency, parse_decimal, parse_optional_decimal, trailing_zeros,
    truncate_cents, EURO, NBSP,
};
