//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    AppState, alert::Alert, auth::UserID, database_id::TransactionId,
    transaction::TransactionRepository,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// Deletes transactions on behalf of the logged in user.
    pub transactions: TransactionRepository,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transactions: state.transactions.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// On success the table row is replaced with nothing and a confirmation is
/// swapped into the alert container out of band.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    match state
        .transactions
        .delete_transaction(Some(user_id), transaction_id)
    {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => html! {
            div hx-swap-oob="innerHTML:#alert-container"
            {
                (Alert::success("Transaction deleted", "").into_html())
            }
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
