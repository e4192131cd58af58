//! JSON envelope printed on stdout and the exit code for each error class.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use smus_migrate::error::Hint;
use smus_migrate::{Error, ErrorCode, Result};

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorBody<'a>>,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'static str,
    message: &'a str,
    details: &'a Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hints: &'a Vec<Hint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retryable: Option<bool>,
}

impl<'a> Envelope<'a> {
    fn new(result: &'a Result<Value>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(err) => Self {
                success: false,
                data: None,
                error: Some(ErrorBody {
                    code: err.code.as_str(),
                    message: &err.message,
                    details: &err.details,
                    hints: &err.hints,
                    retryable: err.retryable,
                }),
            },
        }
    }
}

/// Serialize a command's output, mapping failures to their exit code.
pub fn map_cmd_result_to_json<T: Serialize>(result: Result<(T, i32)>) -> (Result<Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(err.to_string(), Some("serialize response".to_string()))),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationMissingArgument
        | ErrorCode::ValidationInvalidArgument
        | ErrorCode::ValidationInvalidJson => 2,

        ErrorCode::RoleNotFound | ErrorCode::RepositoryNotFound | ErrorCode::ConnectionNotFound => 4,

        ErrorCode::AwsServiceError | ErrorCode::AwsTimeout => 20,

        ErrorCode::InternalIoError | ErrorCode::InternalJsonError | ErrorCode::InternalUnexpected => 1,
    }
}

pub fn print_json_result(result: Result<Value>) -> Result<()> {
    let payload = serde_json::to_string_pretty(&Envelope::new(&result))
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize response".to_string())))?;

    let mut stdout = io::stdout().lock();
    match writeln!(stdout, "{}", payload) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Err(e) => Err(Error::internal_io(e.to_string(), Some("write stdout".to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aws_failures_exit_with_remote_code() {
        let err = Error::aws_service("iam", "GetRole", Some("NoSuchEntity".to_string()), "missing");
        let (result, code) = map_cmd_result_to_json::<()>(Err(err));
        assert!(result.is_err());
        assert_eq!(code, 20);
    }

    #[test]
    fn not_found_and_validation_codes() {
        assert_eq!(exit_code_for_error(ErrorCode::RoleNotFound), 4);
        assert_eq!(exit_code_for_error(ErrorCode::ValidationInvalidArgument), 2);
        assert_eq!(exit_code_for_error(ErrorCode::AwsTimeout), 20);
        assert_eq!(exit_code_for_error(ErrorCode::InternalUnexpected), 1);
    }

    #[test]
    fn error_envelope_omits_empty_hints() {
        let result = Err(Error::validation_missing_argument(vec!["repo".to_string()]));
        let value = serde_json::to_value(Envelope::new(&result)).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["code"], "validation.missing_argument");
        assert!(value["error"].get("hints").is_none());
        assert!(value.get("data").is_none());
    }

    #[test]
    fn hints_are_listed_when_present() {
        let result = Err(Error::internal_unexpected("boom").with_hint("retry later"));
        let value = serde_json::to_value(Envelope::new(&result)).unwrap();
        assert_eq!(value["error"]["hints"][0]["message"], "retry later");
    }

    #[test]
    fn success_envelope_wraps_data() {
        let (result, code) = map_cmd_result_to_json(Ok((serde_json::json!({"command": "config.path"}), 0)));
        let value = serde_json::to_value(Envelope::new(&result)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["command"], "config.path");
        assert_eq!(code, 0);
    }
}
