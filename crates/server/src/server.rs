use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use std::sync::Arc;

use crate::{balances, expenses, ledger, members, room, user};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
}

async fn auth(
    auth_header: TypedHeader<Authorization<Basic>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user: Option<user::Model> = user::Entity::find()
        .filter(user::Column::Username.eq(auth_header.username()))
        .filter(user::Column::Password.eq(auth_header.password()))
        .one(&state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let Some(user) = user else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/room", post(room::room_new).get(room::get))
        .route("/rooms", get(room::list))
        .route(
            "/room/{room_id}/members",
            get(members::list).post(members::add),
        )
        .route(
            "/room/{room_id}/members/{member_id}",
            axum::routing::delete(members::remove).patch(members::set_role),
        )
        .route("/expense", post(expenses::expense_new))
        .route("/expenses", get(expenses::list))
        .route("/expenses/{id}/void", post(expenses::void_expense))
        .route("/contribution", post(ledger::contribution_new))
        .route("/ledger", get(ledger::list))
        .route("/settlement/payout", post(ledger::payout_new))
        .route("/settlement/collection", post(ledger::collection_new))
        .route("/balances", get(balances::get_balances))
        .route("/settlement/plan", get(balances::get_plan))
        .route("/settlement/settle-all", post(balances::settle_all))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

pub async fn run(engine: Engine, db: DatabaseConnection) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, db, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        db,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    db: DatabaseConnection,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, db, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode, header};
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::{ConnectionTrait, Statement};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn state_with_users(usernames: &[&str]) -> ServerState {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let backend = db.get_database_backend();
        for username in usernames {
            db.execute(Statement::from_sql_and_values(
                backend,
                "INSERT INTO users (username, password) VALUES (?, ?)",
                vec![(*username).into(), "password".into()],
            ))
            .await
            .unwrap();
        }
        let engine = Engine::builder()
            .database(db.clone())
            .build()
            .await
            .unwrap();
        ServerState {
            engine: Arc::new(engine),
            db,
        }
    }

    fn request(method: &str, uri: &str, auth: Option<(&str, &str)>, body: Option<Value>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().method(method).uri(uri);
        if let Some((username, password)) = auth {
            let token = STANDARD.encode(format!("{username}:{password}"));
            builder = builder.header(header::AUTHORIZATION, format!("Basic {token}"));
        }
        match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn requests_without_credentials_are_rejected() {
        let state = state_with_users(&["alice"]).await;
        let app = router(state);

        let res = app
            .clone()
            .oneshot(request("GET", "/rooms", None, None))
            .await
            .unwrap();
        // Missing Authorization header is rejected before any handler runs.
        assert!(res.status().is_client_error());

        let res = app
            .oneshot(request("GET", "/rooms", Some(("alice", "wrong")), None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn room_lifecycle_over_http() {
        let state = state_with_users(&["alice"]).await;
        let app = router(state);
        let auth = Some(("alice", "password"));

        let res = app
            .clone()
            .oneshot(request("POST", "/room", auth, Some(json!({"name": "Flat 3"}))))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let room: Value = json_body(res).await;
        let room_id = room["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/room/{room_id}/members"),
                auth,
                Some(json!({"email": "bob@example.com", "display_name": "Bob"})),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let member: Value = json_body(res).await;
        let bob_id = member["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(request(
                "POST",
                "/expense",
                auth,
                Some(json!({
                    "room_id": room_id,
                    "payer_id": bob_id,
                    "amount_minor": 10_000,
                    "description": "groceries",
                    "occurred_at": "2026-03-01T12:00:00Z",
                })),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app
            .clone()
            .oneshot(request(
                "GET",
                "/balances",
                auth,
                Some(json!({"room_id": room_id})),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let balances: Value = json_body(res).await;
        let entries = balances["balances"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        let bob = entries
            .iter()
            .find(|b| b["member_id"].as_str() == Some(bob_id.as_str()))
            .unwrap();
        assert_eq!(bob["final_balance_minor"].as_i64(), Some(-5_000));
        assert_eq!(bob["status"].as_str(), Some("credit"));

        let res = app
            .clone()
            .oneshot(request(
                "GET",
                "/settlement/plan",
                auth,
                Some(json!({"room_id": room_id})),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let plan: Value = json_body(res).await;
        assert_eq!(plan["transfers"].as_array().unwrap().len(), 1);
        assert_eq!(plan["transfers"][0]["amount_minor"].as_i64(), Some(5_000));
    }

    #[tokio::test]
    async fn stale_settlement_maps_to_conflict() {
        let state = state_with_users(&["alice"]).await;
        let app = router(state);
        let auth = Some(("alice", "password"));

        let res = app
            .clone()
            .oneshot(request("POST", "/room", auth, Some(json!({"name": "Flat 3"}))))
            .await
            .unwrap();
        let room: Value = json_body(res).await;
        let room_id = room["id"].as_str().unwrap().to_string();

        let res = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/room/{room_id}/members"),
                auth,
                Some(json!({"email": "bob@example.com", "display_name": "Bob"})),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app
            .clone()
            .oneshot(request(
                "POST",
                "/expense",
                auth,
                Some(json!({
                    "room_id": room_id,
                    "amount_minor": 10_000,
                    "occurred_at": "2026-03-01T12:00:00Z",
                })),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        // The payer now has pending 10_000, but the confirmation covers
        // nobody; the fresh recomputation disagrees.
        let res = app
            .oneshot(request(
                "POST",
                "/settlement/settle-all",
                auth,
                Some(json!({
                    "room_id": room_id,
                    "expected": [],
                    "created_at": "2026-03-01T13:00:00Z",
                })),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }
}
