use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use swachh_sdk::{EmailIdentity, IdentitySession, SwachhError};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub name: Option<String>,
}

/// POST /api/login  `{"email": "...", "name": "..."}`
///
/// Signs in with an email identity, creating the user on first login.
/// Returns the user and their point balance.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let (user, balance) = state
        .sdk
        .run(move |s| {
            let users = s.users();
            let mut session = IdentitySession::new(EmailIdentity::new(req.email, req.name));
            session.init(&users);
            if !session.login(&users) {
                return Err(SwachhError::Auth(
                    session.error().unwrap_or("login failed").to_string(),
                ));
            }
            let user = session
                .user()
                .cloned()
                .ok_or_else(|| SwachhError::Auth("identity carries no email".into()))?;
            Ok((user, session.balance()))
        })
        .await?;

    Ok(Json(json!({ "user": user, "balance": balance })))
}

/// GET /api/users/:id/balance
pub async fn balance(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let balance = state
        .sdk
        .run(move |s| {
            s.users()
                .get(id)?
                .ok_or_else(|| SwachhError::NotFound(format!("user {}", id)))?;
            s.users().balance(id)
        })
        .await?;

    Ok(Json(json!({ "userId": id, "balance": balance })))
}
