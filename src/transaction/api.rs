//! A JSON listing of the logged in user's transactions.

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use crate::{
    AppState,
    auth::UserID,
    database_id::TransactionId,
    transaction::{Transaction, TransactionRepository, TransactionType, repository::Listing},
};

/// The state needed for the transactions API.
#[derive(Debug, Clone)]
pub struct TransactionsApiState {
    /// Lists the transactions of the logged in user.
    pub transactions: TransactionRepository,
}

impl FromRef<AppState> for TransactionsApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transactions: state.transactions.clone(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
enum ListingStatus {
    Loaded,
    Empty,
    Failed,
}

#[derive(Debug, Serialize)]
struct TransactionJson {
    id: TransactionId,
    created_at: String,
    amount: f64,
    #[serde(rename = "type")]
    type_: TransactionType,
    category: String,
    description: String,
    date: String,
    user_id: Option<UserID>,
}

impl From<Transaction> for TransactionJson {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            created_at: transaction
                .created_at
                .format(&Rfc3339)
                .unwrap_or_else(|_| transaction.created_at.to_string()),
            amount: transaction.amount,
            type_: transaction.type_,
            category: transaction.category,
            description: transaction.description,
            date: transaction.date.to_string(),
            user_id: transaction.owner_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct ListingJson {
    status: ListingStatus,
    transactions: Vec<TransactionJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// List the logged in user's transactions as JSON, newest first.
///
/// A listing that could not be read is answered with status "failed" and a 500.
pub async fn get_transactions_json(
    State(state): State<TransactionsApiState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let (status_code, body) = match state.transactions.list_transactions(Some(user_id)) {
        Listing::Loaded(transactions) => (
            StatusCode::OK,
            ListingJson {
                status: ListingStatus::Loaded,
                transactions: transactions.into_iter().map(TransactionJson::from).collect(),
                error: None,
            },
        ),
        Listing::Empty => (
            StatusCode::OK,
            ListingJson {
                status: ListingStatus::Empty,
                transactions: Vec::new(),
                error: None,
            },
        ),
        Listing::Failed(reason) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ListingJson {
                status: ListingStatus::Failed,
                transactions: Vec::new(),
                error: Some(reason),
            },
        ),
    };

    (status_code, Json(body)).into_response()
}
