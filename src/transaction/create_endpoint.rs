//! Defines the endpoint for creating a new transaction.

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    AppState,
    auth::UserID,
    endpoints,
    transaction::{TransactionRepository, validation::TransactionInput},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// Stores the transaction for the logged in user.
    pub transactions: TransactionRepository,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transactions: state.transactions.clone(),
        }
    }
}

/// A route handler for creating a new transaction, redirects to transactions view on success.
///
/// Invalid input and store failures are answered with an alert.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(input): Form<TransactionInput>,
) -> Response {
    match state.transactions.create_transaction(Some(user_id), input) {
        Ok(transaction) => {
            tracing::info!("User {user_id} created transaction {}", transaction.id);

            (
                HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::debug!("could not create transaction for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}
