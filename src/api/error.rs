use serde::Deserialize;
use thiserror::Error;

/// Synthetic status for requests that never produced an HTTP response.
pub(crate) const STATUS_NETWORK_ERROR: u16 = 0;
/// Synthetic status for responses whose body could not be decoded.
pub(crate) const STATUS_PARSE_ERROR: u16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Network,
    Parse,
    Unauthorized,
    NotFound,
    /// 412: the server copy moved ahead of our last-known modification time.
    Conflict,
    Http,
}

impl ApiErrorKind {
    fn from_status(status: u16) -> Self {
        match status {
            STATUS_NETWORK_ERROR => Self::Network,
            STATUS_PARSE_ERROR => Self::Parse,
            401 => Self::Unauthorized,
            404 => Self::NotFound,
            412 => Self::Conflict,
            _ => Self::Http,
        }
    }
}

/// `application/problem+json` body.
#[derive(Deserialize, Clone, Debug, Default)]
pub(crate) struct ProblemDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Clone, Debug, Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub status: u16,
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn network(e: reqwest::Error) -> Self {
        Self {
            status: STATUS_NETWORK_ERROR,
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            status: STATUS_PARSE_ERROR,
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    /// Build from a non-success response, preferring the problem+json detail.
    pub fn from_response(status: u16, body: &str) -> Self {
        let problem = serde_json::from_str::<ProblemDetails>(body).unwrap_or_default();
        let message = problem
            .detail
            .filter(|d| !d.trim().is_empty())
            .or(problem.title.filter(|t| !t.trim().is_empty()))
            .or_else(|| {
                let body = body.trim();
                (!body.is_empty()).then(|| body.to_string())
            })
            .unwrap_or_else(|| format!("request failed with status {status}"));

        Self {
            status,
            kind: ApiErrorKind::from_status(status),
            message,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// User-facing summary of what went wrong while doing `context`.
    pub fn describe(&self, context: &str) -> String {
        match self.kind {
            ApiErrorKind::Network => format!("network error while {context}"),
            ApiErrorKind::Parse => format!("unexpected server response while {context}"),
            ApiErrorKind::Unauthorized => format!("not authorised while {context}, please login again"),
            ApiErrorKind::NotFound => format!("not found while {context}"),
            ApiErrorKind::Conflict => format!(
                "possible write conflict while {context}: the server copy has changed, reload before saving"
            ),
            ApiErrorKind::Http => format!("{} while {context}", self.message),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn problem_detail_wins_over_raw_body() {
        let body = r#"{"title":"Bad Request","status":400,"detail":"slug already taken"}"#;
        let e = ApiError::from_response(400, body);
        assert_eq!(e.kind, ApiErrorKind::Http);
        assert_eq!(e.message, "slug already taken");
        assert_eq!(e.describe("creating book"), "slug already taken while creating book");
    }

    #[test]
    fn precondition_failed_is_a_conflict() {
        let e = ApiError::from_response(412, r#"{"title":"Precondition Failed","status":412}"#);
        assert_eq!(e.kind, ApiErrorKind::Conflict);
        assert_eq!(e.message, "Precondition Failed");
        assert!(e.describe("saving note").starts_with("possible write conflict"));
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        let e = ApiError::from_response(401, "");
        assert!(e.is_unauthorized());
        assert_eq!(e.message, "request failed with status 401");
    }

    #[test]
    fn parse_errors_use_synthetic_status() {
        let e = ApiError::parse("expected value at line 1");
        assert_eq!(e.status, STATUS_PARSE_ERROR);
        assert_eq!(e.kind, ApiErrorKind::Parse);
    }
}
