// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error taxonomy and error value for the Skygear client SDK.
//!
//! Every failure reported by the Skygear server carries a numeric code.  This
//! crate maps that code onto a closed [`ErrorCode`] taxonomy (falling back to
//! [`ErrorCode::UnexpectedError`] for codes the client does not know yet) and
//! wraps it, together with the server-supplied name, detail message and info
//! map, in an immutable [`SkygearError`].
//!
//! ```
//! use skygear_error::{ErrorCode, SkygearError};
//!
//! let err = SkygearError::with_code(110, "Not found");
//! assert_eq!(err.code(), ErrorCode::ResourceNotFound);
//! assert_eq!(err.display_message(), "The requested resource is not found.");
//!
//! // Codes introduced by a newer server are kept verbatim.
//! let err = SkygearError::with_code(999, "from the future");
//! assert_eq!(err.code_value(), 999);
//! assert_eq!(err.code(), ErrorCode::UnexpectedError);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Structured key-value metadata attached to an error by the server.
pub type Info = BTreeMap<String, serde_json::Value>;

/// Boxed underlying failure wrapped by a [`SkygearError`].
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// `Result` alias whose error arm defaults to [`SkygearError`].
pub type Result<T, E = SkygearError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Closed set of error classifications understood by the client.
///
/// Each variant is bound to the integer the server uses on the wire.  The
/// serde representation is that integer, and deserialization is total: any
/// unknown number becomes [`ErrorCode::UnexpectedError`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "i32", into = "i32")]
#[repr(i32)]
pub enum ErrorCode {
    /// The request requires an authenticated user.
    NotAuthenticated = 101,
    /// The user may not perform the operation.
    PermissionDenied = 102,
    /// The API key was rejected.
    AccessKeyNotAccepted = 103,
    /// The access token was rejected.
    AccessTokenNotAccepted = 104,
    /// Login credentials are wrong.
    InvalidCredentials = 105,
    /// Request signature did not verify.
    InvalidSignature = 106,
    /// The request is malformed.
    BadRequest = 107,
    /// An argument in the request is invalid.
    InvalidArgument = 108,
    /// The resource already exists.
    Duplicated = 109,
    /// The resource does not exist.
    ResourceNotFound = 110,
    /// The operation is not supported.
    NotSupported = 111,
    /// The operation is not implemented.
    NotImplemented = 112,
    /// A database constraint was violated.
    ConstraintViolated = 113,
    /// The record does not match the schema.
    IncompatibleSchema = 114,
    /// An atomic operation was rolled back.
    AtomicOperationFailure = 115,
    /// Only part of a batch operation succeeded.
    PartialOperationFailure = 116,
    /// The requested action is not registered on the server.
    UndefinedOperation = 117,
    /// A server plugin is unavailable.
    PluginUnavailable = 118,
    /// A server plugin timed out.
    PluginTimeout = 119,
    /// A record query could not be evaluated.
    RecordQueryInvalid = 120,
    /// A server plugin is still starting up.
    PluginInitializing = 121,
    /// Fallback for anything the client cannot classify.
    UnexpectedError = 10000,
}

impl ErrorCode {
    /// Every variant, in ascending identifier order.
    pub const ALL: &'static [ErrorCode] = &[
        Self::NotAuthenticated,
        Self::PermissionDenied,
        Self::AccessKeyNotAccepted,
        Self::AccessTokenNotAccepted,
        Self::InvalidCredentials,
        Self::InvalidSignature,
        Self::BadRequest,
        Self::InvalidArgument,
        Self::Duplicated,
        Self::ResourceNotFound,
        Self::NotSupported,
        Self::NotImplemented,
        Self::ConstraintViolated,
        Self::IncompatibleSchema,
        Self::AtomicOperationFailure,
        Self::PartialOperationFailure,
        Self::UndefinedOperation,
        Self::PluginUnavailable,
        Self::PluginTimeout,
        Self::RecordQueryInvalid,
        Self::PluginInitializing,
        Self::UnexpectedError,
    ];

    /// Resolve a raw code value.
    ///
    /// Never fails: values that match no variant resolve to
    /// [`ErrorCode::UnexpectedError`].
    pub fn from_value(value: i32) -> Self {
        match value {
            101 => Self::NotAuthenticated,
            102 => Self::PermissionDenied,
            103 => Self::AccessKeyNotAccepted,
            104 => Self::AccessTokenNotAccepted,
            105 => Self::InvalidCredentials,
            106 => Self::InvalidSignature,
            107 => Self::BadRequest,
            108 => Self::InvalidArgument,
            109 => Self::Duplicated,
            110 => Self::ResourceNotFound,
            111 => Self::NotSupported,
            112 => Self::NotImplemented,
            113 => Self::ConstraintViolated,
            114 => Self::IncompatibleSchema,
            115 => Self::AtomicOperationFailure,
            116 => Self::PartialOperationFailure,
            117 => Self::UndefinedOperation,
            118 => Self::PluginUnavailable,
            119 => Self::PluginTimeout,
            120 => Self::RecordQueryInvalid,
            121 => Self::PluginInitializing,
            _ => Self::UnexpectedError,
        }
    }

    /// Integer identifier used on the wire.
    pub fn value(&self) -> i32 {
        *self as i32
    }

    /// Whether this is the fallback variant.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::UnexpectedError)
    }

    /// User-facing message for this code.
    ///
    /// Several codes share the same text; the wording is deliberately coarser
    /// than the protocol-level classification.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "You have to be authenticated to perform this operation.",
            Self::PermissionDenied | Self::AccessKeyNotAccepted | Self::AccessTokenNotAccepted => {
                "You are not allowed to perform this operation."
            }
            Self::InvalidCredentials => {
                "You are not allowed to log in because the credentials you provided are not valid."
            }
            Self::InvalidSignature | Self::BadRequest => {
                "The server is unable to process the request."
            }
            Self::InvalidArgument => "The server is unable to process the data.",
            Self::Duplicated => {
                "This request contains duplicate of an existing resource on the server."
            }
            Self::ResourceNotFound => "The requested resource is not found.",
            Self::NotSupported => "This operation is not supported.",
            Self::NotImplemented => "This operation is not implemented.",
            Self::ConstraintViolated
            | Self::IncompatibleSchema
            | Self::AtomicOperationFailure
            | Self::PartialOperationFailure
            | Self::RecordQueryInvalid => "A problem occurred while processing this request.",
            Self::UndefinedOperation => "The requested operation is not available.",
            Self::PluginUnavailable | Self::PluginInitializing => "The server is not ready yet.",
            Self::PluginTimeout => "The server took too long to process.",
            Self::UnexpectedError => "An unexpected error has occurred.",
        }
    }

    /// Stable `&'static str` name of the code (e.g. `"RESOURCE_NOT_FOUND"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::AccessKeyNotAccepted => "ACCESS_KEY_NOT_ACCEPTED",
            Self::AccessTokenNotAccepted => "ACCESS_TOKEN_NOT_ACCEPTED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Duplicated => "DUPLICATED",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::NotSupported => "NOT_SUPPORTED",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::ConstraintViolated => "CONSTRAINT_VIOLATED",
            Self::IncompatibleSchema => "INCOMPATIBLE_SCHEMA",
            Self::AtomicOperationFailure => "ATOMIC_OPERATION_FAILURE",
            Self::PartialOperationFailure => "PARTIAL_OPERATION_FAILURE",
            Self::UndefinedOperation => "UNDEFINED_OPERATION",
            Self::PluginUnavailable => "PLUGIN_UNAVAILABLE",
            Self::PluginTimeout => "PLUGIN_TIMEOUT",
            Self::RecordQueryInvalid => "RECORD_QUERY_INVALID",
            Self::PluginInitializing => "PLUGIN_INITIALIZING",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }

    /// Look a code up by its [`as_str`](Self::as_str) name.
    ///
    /// Unlike [`from_value`](Self::from_value) this does not fall back.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.as_str() == name)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<i32> for ErrorCode {
    fn from(value: i32) -> Self {
        Self::from_value(value)
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.value()
    }
}

// ---------------------------------------------------------------------------
// SkygearError
// ---------------------------------------------------------------------------

/// Failure reported by (or on behalf of) the Skygear server.
///
/// The raw `code_value` is stored exactly as supplied; [`code`](Self::code)
/// resolves it against the taxonomy on every call.  Once built the value is
/// read-only.
pub struct SkygearError {
    code_value: i32,
    name: Option<String>,
    detail_message: Option<String>,
    info: Option<Info>,
    cause: Option<Cause>,
}

impl SkygearError {
    /// An [`ErrorCode::UnexpectedError`] with only a detail message.
    pub fn new(detail_message: impl Into<String>) -> Self {
        Self::from_parts(
            ErrorCode::UnexpectedError.value(),
            None,
            Some(detail_message.into()),
            None,
            None,
        )
    }

    /// An [`ErrorCode::UnexpectedError`] wrapping an underlying failure.
    pub fn with_cause(detail_message: impl Into<String>, cause: impl Into<Cause>) -> Self {
        Self::from_parts(
            ErrorCode::UnexpectedError.value(),
            None,
            Some(detail_message.into()),
            None,
            Some(cause.into()),
        )
    }

    /// An error with an explicit code value and detail message.
    pub fn with_code(code_value: i32, detail_message: impl Into<String>) -> Self {
        Self::from_parts(code_value, None, Some(detail_message.into()), None, None)
    }

    /// Build the full record.  Any field other than `code_value` may be absent.
    pub fn from_parts(
        code_value: i32,
        name: Option<String>,
        detail_message: Option<String>,
        info: Option<Info>,
        cause: Option<Cause>,
    ) -> Self {
        Self {
            code_value,
            name,
            detail_message,
            info,
            cause,
        }
    }

    /// Raw code value, untouched.
    pub fn code_value(&self) -> i32 {
        self.code_value
    }

    /// Resolved classification of [`code_value`](Self::code_value).
    pub fn code(&self) -> ErrorCode {
        ErrorCode::from_value(self.code_value)
    }

    /// Whether the raw code value names a known variant.
    pub fn is_recognized(&self) -> bool {
        self.code().value() == self.code_value
    }

    /// Server-supplied short identifier, e.g. `"ResourceNotFound"`.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Developer-facing description.
    pub fn detail_message(&self) -> Option<&str> {
        self.detail_message.as_deref()
    }

    /// Structured metadata from the server.
    pub fn info(&self) -> Option<&Info> {
        self.info.as_ref()
    }

    /// Wrapped underlying failure.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Shorthand for `self.code().message()`.
    pub fn display_message(&self) -> &'static str {
        self.code().message()
    }
}

impl From<ErrorCode> for SkygearError {
    fn from(code: ErrorCode) -> Self {
        Self::from_parts(code.value(), None, None, None, None)
    }
}

impl fmt::Debug for SkygearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("SkygearError");
        d.field("code_value", &self.code_value);
        d.field("code", &self.code());
        if let Some(ref name) = self.name {
            d.field("name", name);
        }
        if let Some(ref msg) = self.detail_message {
            d.field("detail_message", msg);
        }
        if let Some(ref info) = self.info {
            d.field("info", info);
        }
        if let Some(ref cause) = self.cause {
            d.field("cause", &cause.to_string());
        }
        d.finish()
    }
}

impl fmt::Display for SkygearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_message())?;
        if let Some(ref msg) = self.detail_message {
            write!(f, " ({msg})")?;
        }
        Ok(())
    }
}

impl std::error::Error for SkygearError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// Serialization support
// ---------------------------------------------------------------------------

fn fallback_code_value() -> i32 {
    ErrorCode::UnexpectedError.value()
}

/// Serialisable snapshot of a [`SkygearError`].
///
/// Field names follow the server's error object.  The cause, being opaque,
/// travels as its rendered message only.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ErrorPayload {
    /// Raw code value.  Missing codes default to `10000`.
    #[serde(default = "fallback_code_value")]
    pub code: i32,
    /// Server-supplied short identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Detail message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Structured metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Info>,
    /// String representation of the cause, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause_message: Option<String>,
}

impl From<&SkygearError> for ErrorPayload {
    fn from(err: &SkygearError) -> Self {
        Self {
            code: err.code_value,
            name: err.name.clone(),
            message: err.detail_message.clone(),
            info: err.info.clone(),
            cause_message: err.cause.as_ref().map(|c| c.to_string()),
        }
    }
}

impl From<ErrorPayload> for SkygearError {
    fn from(payload: ErrorPayload) -> Self {
        let err = Self::from_parts(
            payload.code,
            payload.name,
            payload.message,
            payload.info,
            payload.cause_message.map(Cause::from),
        );
        if !err.is_recognized() {
            debug!(
                target: "skygear.error",
                code_value = err.code_value,
                error_name = err.name(),
                "unrecognized error code, resolving to UNEXPECTED_ERROR"
            );
        }
        err
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use std::io;

    // -- Taxonomy -------------------------------------------------------

    #[test]
    fn from_value_resolves_every_known_identifier() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::from_value(code.value()), *code);
        }
    }

    #[test]
    fn from_value_falls_back_for_unknown() {
        for v in [0, -1, 100, 122, 500, 999, 9999, 10001, i32::MIN, i32::MAX] {
            assert_eq!(ErrorCode::from_value(v), ErrorCode::UnexpectedError, "{v}");
        }
    }

    #[test]
    fn identifiers_are_unique_and_ascending() {
        let values: Vec<i32> = ErrorCode::ALL.iter().map(ErrorCode::value).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(values, sorted);
        assert_eq!(ErrorCode::ALL.len(), 22);
    }

    #[test]
    fn fallback_identifier_is_10000() {
        assert_eq!(ErrorCode::UnexpectedError.value(), 10000);
        assert!(ErrorCode::UnexpectedError.is_fallback());
        assert!(!ErrorCode::BadRequest.is_fallback());
    }

    #[test]
    fn every_message_is_non_empty() {
        for code in ErrorCode::ALL {
            assert!(!code.message().is_empty(), "{code}");
        }
    }

    #[test]
    fn shared_messages_group_codes() {
        let denied = "You are not allowed to perform this operation.";
        assert_eq!(ErrorCode::PermissionDenied.message(), denied);
        assert_eq!(ErrorCode::AccessKeyNotAccepted.message(), denied);
        assert_eq!(ErrorCode::AccessTokenNotAccepted.message(), denied);
        assert_eq!(
            ErrorCode::RecordQueryInvalid.message(),
            ErrorCode::ConstraintViolated.message()
        );
        assert_eq!(
            ErrorCode::PluginInitializing.message(),
            ErrorCode::PluginUnavailable.message()
        );
    }

    #[test]
    fn as_str_is_unique_and_matches_display() {
        let mut seen = HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.as_str()), "duplicate {}", code.as_str());
            assert_eq!(code.to_string(), code.as_str());
        }
    }

    #[test]
    fn from_name_inverts_as_str() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::from_name(code.as_str()), Some(*code));
        }
        assert_eq!(ErrorCode::from_name("resource_not_found"), None);
        assert_eq!(ErrorCode::from_name(""), None);
    }

    #[test]
    fn error_code_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&ErrorCode::Duplicated).unwrap(), "109");
        let code: ErrorCode = serde_json::from_str("110").unwrap();
        assert_eq!(code, ErrorCode::ResourceNotFound);
    }

    #[test]
    fn error_code_deserializes_unknown_to_fallback() {
        let code: ErrorCode = serde_json::from_str("4242").unwrap();
        assert_eq!(code, ErrorCode::UnexpectedError);
    }

    // -- Construction ---------------------------------------------------

    #[test]
    fn detail_only_defaults_to_unexpected() {
        let err = SkygearError::new("oops");
        assert_eq!(err.code_value(), 10000);
        assert_eq!(err.code(), ErrorCode::UnexpectedError);
        assert_eq!(err.detail_message(), Some("oops"));
        assert!(err.name().is_none());
        assert!(err.info().is_none());
        assert!(err.cause().is_none());
    }

    #[test]
    fn with_cause_keeps_default_code() {
        let src = io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer");
        let err = SkygearError::with_cause("request failed", src);
        assert_eq!(err.code(), ErrorCode::UnexpectedError);
        assert_eq!(err.cause().unwrap().to_string(), "reset by peer");
    }

    #[test]
    fn with_code_resolves_known_code() {
        let err = SkygearError::with_code(110, "Not found");
        assert_eq!(err.code_value(), 110);
        assert_eq!(err.code(), ErrorCode::ResourceNotFound);
        assert_eq!(err.display_message(), "The requested resource is not found.");
        assert!(err.is_recognized());
    }

    #[test]
    fn unknown_code_is_preserved_verbatim() {
        let err = SkygearError::with_code(999, "later");
        assert_eq!(err.code_value(), 999);
        assert_eq!(err.code(), ErrorCode::UnexpectedError);
        assert!(!err.is_recognized());
    }

    #[test]
    fn full_record_keeps_info() {
        let mut info = Info::new();
        info.insert("arguments".into(), json!(["email"]));
        let err = SkygearError::from_parts(
            500,
            Some("x".into()),
            Some("msg".into()),
            Some(info.clone()),
            None,
        );
        assert_eq!(err.code_value(), 500);
        assert_eq!(err.code(), ErrorCode::UnexpectedError);
        assert_eq!(err.name(), Some("x"));
        assert_eq!(err.info(), Some(&info));
    }

    #[test]
    fn all_optional_fields_absent() {
        let err = SkygearError::from_parts(0, None, None, None, None);
        assert_eq!(err.code(), ErrorCode::UnexpectedError);
        assert_eq!(err.to_string(), "An unexpected error has occurred.");
    }

    #[test]
    fn from_error_code() {
        let err = SkygearError::from(ErrorCode::PluginTimeout);
        assert_eq!(err.code_value(), 119);
        assert!(err.detail_message().is_none());
    }

    // -- Display / Debug / source ---------------------------------------

    #[test]
    fn display_appends_detail() {
        let err = SkygearError::with_code(105, "wrong password");
        assert_eq!(
            err.to_string(),
            "You are not allowed to log in because the credentials you provided are not valid. (wrong password)"
        );
    }

    #[test]
    fn debug_shows_raw_and_resolved_code() {
        let err = SkygearError::with_code(777, "x");
        let dbg = format!("{err:?}");
        assert!(dbg.contains("777"));
        assert!(dbg.contains("UnexpectedError"));
    }

    #[test]
    fn std_error_source_chain() {
        let inner = io::Error::new(io::ErrorKind::NotFound, "no route");
        let err = SkygearError::with_cause("transport", inner);
        let src = std::error::Error::source(&err).unwrap();
        assert_eq!(src.to_string(), "no route");
    }

    #[test]
    fn std_error_source_none_by_default() {
        let err = SkygearError::new("x");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn skygear_error_can_wrap_another() {
        let inner = SkygearError::with_code(119, "plugin slow");
        let outer = SkygearError::with_cause("save failed", inner);
        let src = std::error::Error::source(&outer).unwrap();
        assert_eq!(
            src.to_string(),
            "The server took too long to process. (plugin slow)"
        );
    }

    // -- Payload --------------------------------------------------------

    #[test]
    fn payload_keeps_unknown_code() {
        let err = SkygearError::with_code(4321, "new");
        let payload = ErrorPayload::from(&err);
        assert_eq!(payload.code, 4321);
        let back = SkygearError::from(payload);
        assert_eq!(back.code_value(), 4321);
        assert_eq!(back.code(), ErrorCode::UnexpectedError);
    }

    #[test]
    fn payload_omits_absent_fields() {
        let payload = ErrorPayload::from(&SkygearError::with_code(108, "bad"));
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v, json!({"code": 108, "message": "bad"}));
    }

    #[test]
    fn payload_missing_code_defaults_to_fallback() {
        let payload: ErrorPayload = serde_json::from_str(r#"{"message":"?"}"#).unwrap();
        assert_eq!(payload.code, 10000);
    }

    #[test]
    fn payload_cause_becomes_message_only_cause() {
        let src = io::Error::other("disk full");
        let payload = ErrorPayload::from(&SkygearError::with_cause("write", src));
        assert_eq!(payload.cause_message.as_deref(), Some("disk full"));
        let back = SkygearError::from(payload);
        assert_eq!(back.cause().unwrap().to_string(), "disk full");
    }
}
