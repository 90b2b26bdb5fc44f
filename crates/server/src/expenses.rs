//! Expense endpoints: record, list, void.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use api_types::expense::{
    ExpenseCreated, ExpenseList, ExpenseNew, ExpenseView, ExpenseVoid, ExpensesResponse,
};
use engine::Money;

use crate::{ServerError, server::ServerState, user};

pub async fn expense_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseCreated>), ServerError> {
    let id = state
        .engine
        .record_expense(
            &payload.room_id,
            payload.payer_id,
            Money::new(payload.amount_minor),
            payload.description.as_deref(),
            payload.occurred_at,
            &user.username,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ExpenseCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseList>,
) -> Result<Json<ExpensesResponse>, ServerError> {
    let expenses = state
        .engine
        .list_expenses(
            &payload.room_id,
            &user.username,
            payload.include_voided.unwrap_or(false),
        )
        .await?
        .into_iter()
        .map(|expense| ExpenseView {
            id: expense.id,
            payer_id: expense.payer_id,
            amount_minor: expense.amount.cents(),
            description: expense.description,
            occurred_at: expense.occurred_at,
            voided: expense.voided_at.is_some(),
        })
        .collect();

    Ok(Json(ExpensesResponse { expenses }))
}

pub async fn void_expense(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(expense_id): Path<Uuid>,
    Json(payload): Json<ExpenseVoid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .void_expense(&payload.room_id, expense_id, &user.username, payload.voided_at)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
