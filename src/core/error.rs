use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationMissingArgument,
    ValidationInvalidArgument,
    ValidationInvalidJson,

    RoleNotFound,
    RepositoryNotFound,
    ConnectionNotFound,

    AwsServiceError,
    AwsTimeout,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::RoleNotFound => "role.not_found",
            ErrorCode::RepositoryNotFound => "repository.not_found",
            ErrorCode::ConnectionNotFound => "connection.not_found",

            ErrorCode::AwsServiceError => "aws.service_error",
            ErrorCode::AwsTimeout => "aws.timeout",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundDetails {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingArgumentDetails {
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tried: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsServiceErrorDetails {
    pub service: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aws_code: Option<String>,
    pub error: String,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_missing_argument(args: Vec<String>) -> Self {
        let details = serde_json::to_value(MissingArgumentDetails { args })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(
            ErrorCode::ValidationMissingArgument,
            "Missing required argument",
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
        tried: Option<Vec<String>>,
    ) -> Self {
        let problem = problem.into();
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.clone(),
            id,
            tried,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            format!("Invalid argument: {}", problem),
            details,
        )
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn role_not_found(id: impl Into<String>, scope: Option<String>) -> Self {
        Self::not_found(ErrorCode::RoleNotFound, "IAM role not found", id, scope)
    }

    pub fn repository_not_found(project_id: impl Into<String>, domain_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        let domain_id = domain_id.into();
        Self::not_found(
            ErrorCode::RepositoryNotFound,
            &format!(
                "Code repository not found for project {} in domain {}",
                project_id, domain_id
            ),
            project_id,
            Some(domain_id),
        )
        .with_hint("The project must have a 'Tooling' environment that provisions a code repository")
    }

    pub fn connection_not_found(kind: impl Into<String>, project_id: impl Into<String>) -> Self {
        let kind = kind.into();
        Self::not_found(
            ErrorCode::ConnectionNotFound,
            &format!("No {} connection found in project", kind),
            project_id,
            Some(kind.clone()),
        )
    }

    fn not_found(code: ErrorCode, message: &str, id: impl Into<String>, scope: Option<String>) -> Self {
        let details = serde_json::to_value(NotFoundDetails {
            id: id.into(),
            scope,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(code, message, details)
    }

    /// Error returned by an AWS API. `aws_code` is the provider's error code
    /// (e.g. `ResourceNotFoundException`) when the response carried one.
    pub fn aws_service(
        service: impl Into<String>,
        operation: impl Into<String>,
        aws_code: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        let service = service.into();
        let operation = operation.into();
        let error = error.into();
        let message = match &aws_code {
            Some(code) => format!("{} {} failed ({}): {}", service, operation, code, error),
            None => format!("{} {} failed: {}", service, operation, error),
        };
        let details = serde_json::to_value(AwsServiceErrorDetails {
            service,
            operation,
            aws_code,
            error,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::AwsServiceError, message, details)
    }

    pub fn aws_timeout(message: impl Into<String>, attempts: u32) -> Self {
        let mut err = Self::new(
            ErrorCode::AwsTimeout,
            message,
            serde_json::json!({ "attempts": attempts }),
        );
        err.retryable = Some(true);
        err
    }

    /// Provider error code of an AWS service error, if any.
    pub fn aws_code(&self) -> Option<&str> {
        if self.code != ErrorCode::AwsServiceError {
            return None;
        }
        self.details.get("awsCode").and_then(Value::as_str)
    }

    pub fn is_aws_code(&self, code: &str) -> bool {
        self.aws_code() == Some(code)
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = serde_json::json!({
            "path": path.into(),
            "error": err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = serde_json::to_value(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalIoErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = serde_json::to_value(InternalJsonErrorDetails {
            error: error.into(),
            context,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aws_code_is_exposed_for_service_errors() {
        let err = Error::aws_service(
            "datazone",
            "GetSubscriptionGrant",
            Some("ResourceNotFoundException".to_string()),
            "grant gone",
        );
        assert_eq!(err.aws_code(), Some("ResourceNotFoundException"));
        assert!(err.is_aws_code("ResourceNotFoundException"));
        assert!(err.message.contains("GetSubscriptionGrant"));
    }

    #[test]
    fn aws_code_is_absent_for_other_errors() {
        let err = Error::internal_unexpected("boom");
        assert_eq!(err.aws_code(), None);
    }

    #[test]
    fn timeout_is_retryable() {
        let err = Error::aws_timeout("did not finish", 30);
        assert_eq!(err.code.as_str(), "aws.timeout");
        assert_eq!(err.retryable, Some(true));
        assert_eq!(err.details["attempts"], 30);
    }
}
