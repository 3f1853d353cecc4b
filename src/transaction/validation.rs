//! Validation of user input for new transactions.
//!
//! This is the single place where the sign convention is enforced: expenses
//! are stored as negative amounts and income as positive amounts.

use serde::Deserialize;
use time::{Date, macros::format_description};

use crate::transaction::core::{NewTransaction, TransactionType};

/// The raw input for a new transaction, as submitted by the user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionInput {
    /// The amount of money in dollars as typed, expected to be a positive magnitude.
    #[serde(default)]
    pub amount: String,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type_")]
    pub type_: TransactionType,
    /// The category name.
    #[serde(default)]
    pub category: String,
    /// Optional text detailing the transaction.
    #[serde(default)]
    pub description: String,
    /// The date in the format `YYYY-MM-DD`.
    #[serde(default)]
    pub date: String,
}

/// The largest amount accepted for a single transaction, in dollars.
///
/// Keeps totals in cents far from the limits of `i64`.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

/// The ways transaction input can be invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The amount was empty, not a number, or less than one cent once rounded.
    #[error("Enter an amount greater than zero")]
    AmountRequired,
    /// The amount was more than [MAX_AMOUNT].
    #[error("Enter an amount no more than $1,000,000,000,000")]
    AmountTooLarge,
    /// The category was empty.
    #[error("Select a category")]
    CategoryRequired,
    /// The date was empty or not a valid calendar date.
    #[error("Enter a valid date")]
    DateRequired,
}

/// Check `input`, round its amount to whole cents and normalize its sign.
///
/// # Errors
/// Returns the first problem found, checking the amount, then the category,
/// then the date.
pub fn validate_input(input: &TransactionInput) -> Result<NewTransaction, ValidationError> {
    let amount = parse_amount(&input.amount)?;

    let category = input.category.trim();
    if category.is_empty() {
        return Err(ValidationError::CategoryRequired);
    }

    if !input.type_.is_known_category(category) {
        tracing::warn!(
            "Accepting category \"{category}\" which is not a suggested {} category",
            input.type_.as_str()
        );
    }

    let date = parse_date(&input.date).ok_or(ValidationError::DateRequired)?;

    Ok(NewTransaction {
        amount: normalize_sign(amount, input.type_),
        type_: input.type_,
        category: category.to_owned(),
        description: input.description.trim().to_owned(),
        date,
    })
}

/// Give `amount` the sign used for storing `type_`.
pub fn normalize_sign(amount: f64, type_: TransactionType) -> f64 {
    match type_ {
        TransactionType::Expense => -amount.abs(),
        TransactionType::Income => amount.abs(),
    }
}

fn parse_amount(raw_amount: &str) -> Result<f64, ValidationError> {
    let amount: f64 = raw_amount
        .trim()
        .parse()
        .map_err(|_| ValidationError::AmountRequired)?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::AmountRequired);
    }

    if amount > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge);
    }

    let amount = (amount * 100.0).round() / 100.0;

    if amount < 0.01 {
        return Err(ValidationError::AmountRequired);
    }

    Ok(amount)
}

fn parse_date(raw_date: &str) -> Option<Date> {
    let raw_date = raw_date.trim();

    if raw_date.is_empty() {
        return None;
    }

    Date::parse(raw_date, format_description!("[year]-[month]-[day]")).ok()
}
