use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::engine::ChessError;

/// Failure of a REST call. Rendered as `{"error": {"code", "message"}}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Game not found: {0}")]
    GameNotFound(String),

    /// A rule or input violation reported by the engine.
    #[error(transparent)]
    Rules(#[from] ChessError),

    #[error("Game limit of {0} reached")]
    TooManyGames(usize),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::GameNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyGames(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Rules(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable machine-readable code clients can switch on.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::GameNotFound(_) => "GAME_NOT_FOUND",
            ApiError::TooManyGames(_) => "TOO_MANY_GAMES",
            ApiError::Rules(err) => match err {
                ChessError::IllegalMove(_) | ChessError::MalformedMoveRequest(_) => "ILLEGAL_MOVE",
                ChessError::InvalidFen(_) => "INVALID_FEN",
                ChessError::InvalidSquare(_) => "INVALID_REQUEST",
                ChessError::GameOver(_) => "GAME_OVER",
                ChessError::NothingToUndo => "NOTHING_TO_UNDO",
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unknown_game_is_404() {
        let (status, json) = render(ApiError::GameNotFound("abc".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "GAME_NOT_FOUND");
        assert_eq!(json["error"]["message"], "Game not found: abc");
    }

    #[tokio::test]
    async fn capacity_is_503() {
        let (status, json) = render(ApiError::TooManyGames(2)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"]["code"], "TOO_MANY_GAMES");
        assert_eq!(json["error"]["message"], "Game limit of 2 reached");
    }

    #[tokio::test]
    async fn engine_errors_are_400_with_their_own_code() {
        let cases = [
            (ChessError::IllegalMove("e2e5".into()), "ILLEGAL_MOVE"),
            (ChessError::MalformedMoveRequest("e2e5 is not a legal move".into()), "ILLEGAL_MOVE"),
            (ChessError::InvalidFen("bad fen".into()), "INVALID_FEN"),
            (ChessError::InvalidSquare("x0".into()), "INVALID_REQUEST"),
            (ChessError::GameOver("checkmate".into()), "GAME_OVER"),
            (ChessError::NothingToUndo, "NOTHING_TO_UNDO"),
        ];
        for (err, code) in cases {
            let message = err.to_string();
            let (status, json) = render(err.into()).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"]["code"], code);
            assert_eq!(json["error"]["message"], message);
        }
    }
}
