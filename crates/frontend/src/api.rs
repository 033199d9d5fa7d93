use common::{
    http::{ErrorResponse, Identity, LoginRequest, LoginResponse, SessionToken},
    LobbyError,
};
use reqwasm::http::{Request, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Anything that can go wrong talking to the lobby server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    #[error("network error: {0}")]
    Network(String),

    #[error("unhandled status code {0} ({1})")]
    Status(u16, String),

    #[error("invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn title(&self) -> &'static str {
        match self {
            ClientError::Lobby(err) => err.title(),
            ClientError::Network(_) => "Connection problem",
            ClientError::Status(..) | ClientError::Decode(_) => "Server error",
        }
    }
}

fn network(err: reqwasm::Error) -> ClientError {
    ClientError::Network(err.to_string())
}

fn bearer(token: SessionToken) -> String {
    format!("Bearer {token}")
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    match response.status() {
        200 => response
            .json()
            .await
            .map_err(|err| ClientError::Decode(err.to_string())),
        status => match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse { error }) => Err(error.into()),
            Err(_) => Err(ClientError::Status(status, response.status_text())),
        },
    }
}

pub async fn login(request: &LoginRequest) -> Result<LoginResponse, ClientError> {
    let body = serde_json::to_string(request).map_err(|err| ClientError::Decode(err.to_string()))?;
    let response = Request::post("/api/login")
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .map_err(network)?;
    read(response).await
}

/// `Ok(None)` if the server no longer knows the token.
pub async fn resolve_session(token: SessionToken) -> Result<Option<Identity>, ClientError> {
    let response = Request::get("/api/session")
        .header("Authorization", &bearer(token))
        .send()
        .await
        .map_err(network)?;
    match read(response).await {
        Ok(identity) => Ok(Some(identity)),
        Err(ClientError::Lobby(LobbyError::Unauthenticated)) => Ok(None),
        Err(err) => Err(err),
    }
}

pub async fn logout(token: SessionToken) -> Result<(), ClientError> {
    let response = Request::post("/api/logout")
        .header("Authorization", &bearer(token))
        .send()
        .await
        .map_err(network)?;
    match response.status() {
        204 | 401 => Ok(()),
        status => Err(ClientError::Status(status, response.status_text())),
    }
}
