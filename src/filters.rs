//! Custom askama filters used by the expense templates.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::ExpenseStatus;

/// `$1,234.50`
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

pub fn currency(amount: &Decimal) -> askama::Result<String> {
    Ok(format_currency(*amount))
}

pub fn badge(status: &ExpenseStatus) -> askama::Result<&'static str> {
    Ok(match status {
        ExpenseStatus::Pending => "bg-warning",
        ExpenseStatus::Approved => "bg-success",
        ExpenseStatus::Rejected => "bg-danger",
    })
}

/// `Jan 15, 2024`
pub fn short_date(date: &NaiveDate) -> askama::Result<String> {
    Ok(date.format("%b %-d, %Y").to_string())
}

pub fn timestamp(at: &DateTime<Utc>) -> askama::Result<String> {
    Ok(at.format("%b %-d, %Y at %H:%M UTC").to_string())
}
