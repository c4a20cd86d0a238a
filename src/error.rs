use std::fmt;

use reqwest::StatusCode;

/// Category of a failed invocation, as reported in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Dispatch,
    RemoteOperation,
    Extraction,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::Authentication => "AuthenticationError",
            ErrorKind::Dispatch => "DispatchError",
            ErrorKind::RemoteOperation => "RemoteOperationError",
            ErrorKind::Extraction => "ExtractionError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required parameter is missing or a parameter could not be parsed.
    #[error("{0}")]
    Validation(String),
    /// Credentials are missing, could not be stored, or were rejected.
    #[error("{0}")]
    Authentication(String),
    /// The command/subcommand pair does not name an operation.
    #[error("{0}")]
    Dispatch(String),
    /// The client failed while performing the operation.
    #[error("{0:#}")]
    Remote(anyhow::Error),
    /// An archive does not have the expected nested layout.
    #[error("{0}")]
    Extraction(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Dispatch(_) => ErrorKind::Dispatch,
            Error::Remote(_) => ErrorKind::RemoteOperation,
            Error::Extraction(_) => ErrorKind::Extraction,
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        Error::Validation(format!("must specify {field}"))
    }

    /// Classifies a client failure. A 401 from the API means the stored
    /// credentials were rejected; everything else is a remote failure.
    pub(crate) fn remote(err: anyhow::Error) -> Self {
        let rejected = err
            .chain()
            .filter_map(|cause| cause.downcast_ref::<ApiError>())
            .any(ApiError::is_auth_failure);
        if rejected {
            return Error::Authentication(format!("{err:#}"));
        }
        Error::Remote(err)
    }
}

/// Non-success HTTP reply from the Kaggle API.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub url: String,
    pub message: String,
}

impl ApiError {
    pub fn is_auth_failure(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }
}

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct KaggleErrorResponse {
    #[serde(default)]
    pub(crate) code: Option<u16>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    // Upload and create endpoints answer {"error": ...}
    #[serde(default)]
    pub(crate) error: Option<String>,
}

pub(crate) fn format_api_error(status: StatusCode, url: &str, body: &str) -> ApiError {
    let parsed = serde_json::from_str::<KaggleErrorResponse>(body).unwrap_or_default();
    let server = parsed
        .message
        .as_deref()
        .or(parsed.error.as_deref())
        .unwrap_or(body.trim());
    let code = parsed.code.unwrap_or(status.as_u16());

    let message = if status == StatusCode::UNAUTHORIZED {
        format!(
            "Kaggle rejected the credentials (HTTP {}).\n- Check the username and key in kaggle.json (create a new API token under https://www.kaggle.com/settings)\n- Tokens are revoked when a new one is generated\n\nServer message: {}\nrequest: {}",
            code, server, url
        )
    } else if status == StatusCode::FORBIDDEN {
        // Competition downloads and submissions require accepting the rules first.
        format!(
            "Kaggle refused the request (HTTP {}).\n- For competitions, open the competition page and accept its rules\n- For private datasets and kernels, check that the account has access\n\nServer message: {}\nrequest: {}",
            code, server, url
        )
    } else if status == StatusCode::NOT_FOUND {
        format!(
            "Kaggle resource not found (HTTP 404).\n- Check the competition, dataset or kernel reference\n- Check KAGGLE_API_URL if it is set\n\nServer message: {}\nrequest: {}",
            server, url
        )
    } else {
        format!(
            "API request failed: HTTP {} for url ({})\n{}",
            code, url, server
        )
    };

    ApiError {
        status,
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn unauthorized_replies_classify_as_authentication() {
        let api = format_api_error(
            StatusCode::UNAUTHORIZED,
            "https://www.kaggle.com/api/v1/competitions/list",
            r#"{"code":401,"message":"Unauthenticated"}"#,
        );
        let err = Error::remote(anyhow::Error::new(api).context("failed to list competitions"));
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(err.to_string().contains("Unauthenticated"));
    }

    #[test]
    fn other_statuses_stay_remote_failures() {
        let api = format_api_error(StatusCode::FORBIDDEN, "u", "{\"message\":\"rules\"}");
        let err = Error::remote(anyhow::Error::new(api));
        assert_eq!(err.kind(), ErrorKind::RemoteOperation);

        let err = Error::remote(
            Err::<(), _>(std::io::Error::other("disk full"))
                .context("failed to write")
                .unwrap_err(),
        );
        assert_eq!(err.kind(), ErrorKind::RemoteOperation);
        assert_eq!(err.to_string(), "failed to write: disk full");
    }

    #[test]
    fn non_json_bodies_are_quoted_verbatim() {
        let api = format_api_error(StatusCode::BAD_GATEWAY, "u", "  upstream down \n");
        assert!(api.message.ends_with("upstream down"));
        assert!(api.message.contains("HTTP 502"));
    }
}
