use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::{
    http::{ErrorResponse, Identity, LoginRequest, LoginResponse, SessionToken},
    Lobby, LobbyError,
};

use crate::{auth::AuthError, AppState};

#[derive(Debug)]
pub struct ApiError(pub LobbyError);

impl From<LobbyError> for ApiError {
    fn from(value: LobbyError) -> Self {
        Self(value)
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        Self(value.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LobbyError::Unauthenticated => StatusCode::UNAUTHORIZED,
            LobbyError::SignIn(_) | LobbyError::Protocol(_) => StatusCode::BAD_REQUEST,
            LobbyError::InvalidName(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LobbyError::NotFound => StatusCode::NOT_FOUND,
            LobbyError::Full { .. } | LobbyError::Conflict(_) => StatusCode::CONFLICT,
            LobbyError::Write(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(ErrorResponse { error: self.0 })).into_response()
    }
}

fn bearer(headers: &HeaderMap) -> Result<SessionToken, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| token.trim().parse().ok())
        .ok_or(ApiError(LobbyError::Unauthenticated))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (session, identity) = state.sessions.sign_in(request).await?;
    Ok(Json(LoginResponse { session, identity }))
}

pub async fn session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Identity>, ApiError> {
    let token = bearer(&headers)?;
    match state.sessions.resolve(token).await {
        Some(identity) => Ok(Json(identity)),
        None => Err(ApiError(LobbyError::Unauthenticated)),
    }
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = bearer(&headers)?;
    state.sessions.sign_out(token).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn lobbies(State(state): State<Arc<AppState>>) -> Json<Vec<Lobby>> {
    Json(state.store.list().await)
}

pub async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::{auth::GuestIdentityProvider, config::Config};

    fn state() -> Arc<AppState> {
        let config = <Config as clap::Parser>::parse_from(["backend"]);
        Arc::new(AppState::new(&config, GuestIdentityProvider))
    }

    fn authorization(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(token).unwrap());
        headers
    }

    fn login_request(display_name: &str) -> LoginRequest {
        LoginRequest {
            display_name: display_name.to_string(),
            email: None,
            avatar_url: None,
        }
    }

    #[tokio::test]
    async fn login_then_resolve_then_logout() {
        let state = state();
        let Json(response) = login(State(state.clone()), Json(login_request("alice")))
            .await
            .unwrap();
        let headers = authorization(&format!("Bearer {}", response.session));

        let Json(identity) = session(State(state.clone()), headers.clone()).await.unwrap();
        assert_eq!(identity, response.identity);

        assert_eq!(
            logout(State(state.clone()), headers.clone()).await.unwrap(),
            StatusCode::NO_CONTENT
        );
        let err = session(State(state), headers).await.unwrap_err();
        assert_eq!(err.0, LobbyError::Unauthenticated);
    }

    #[tokio::test]
    async fn failed_login_is_a_bad_request() {
        let err = login(State(state()), Json(login_request(""))).await.unwrap_err();
        assert!(matches!(err.0, LobbyError::SignIn(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_tokens_are_unauthorized() {
        for value in ["", "Bearer", "Bearer nope", "Basic abc"] {
            let err = session(State(state()), authorization(value)).await.unwrap_err();
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
        let err = session(State(state()), HeaderMap::new()).await.unwrap_err();
        assert_eq!(err.0, LobbyError::Unauthenticated);
    }

    #[test]
    fn capacity_errors_are_conflicts() {
        let response = ApiError(LobbyError::Full { max_players: 6 }).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn refused_writes_are_unavailable() {
        let response = ApiError(LobbyError::Write("no room".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
