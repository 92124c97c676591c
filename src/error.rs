//! Errors this crate can emit.
use crate::client::UploadId;
use crate::client::part::{CompletedParts, PartNumber};
use crate::uri::ObjectUri;

use aws_sdk_s3::error::SdkError;
use std::fmt::{self, Display, Formatter};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A specialized `Result` type for this crate.
pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// The value returned in this crate when an error occurs.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(pub(crate) ErrorRepr);

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self.0 {
            ErrorRepr::Missing(_, _) | ErrorRepr::Invalid { .. } => ErrorKind::Validation,
            ErrorRepr::NotFound(_) => ErrorKind::NotFound,
            ErrorRepr::Exists(_) => ErrorKind::Conflict,
            ErrorRepr::Create { .. }
            | ErrorRepr::UploadPart { .. }
            | ErrorRepr::Complete { .. }
            | ErrorRepr::Abort { .. }
            | ErrorRepr::Put { .. }
            | ErrorRepr::Delete { .. }
            | ErrorRepr::Head { .. }
            | ErrorRepr::Manifest { .. } => ErrorKind::Upstream,
            ErrorRepr::MalformedKey { .. } | ErrorRepr::Presign { .. } => ErrorKind::Signing,
            ErrorRepr::Config(_) => ErrorKind::Config,
            ErrorRepr::StdDyn(_) => ErrorKind::Unknown,
            ErrorRepr::Any { kind, .. } => kind,
        }
    }

    /// Wrap an arbitrary error.
    pub fn from_dyn<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let err = Box::new(e);
        Self(ErrorRepr::StdDyn(err))
    }

    /// Create an error of the given kind with a message.
    pub fn from_kind<T: Into<String>>(kind: ErrorKind, msg: T) -> Self {
        Self(ErrorRepr::Any {
            kind,
            msg: msg.into(),
        })
    }

    /// Shorthand for a `Validation` error.
    pub fn invalid<T: Into<String>>(field: &'static str, msg: T) -> Self {
        Self(ErrorRepr::Invalid {
            field,
            msg: msg.into(),
        })
    }
}

impl From<ErrorRepr> for Error {
    fn from(value: ErrorRepr) -> Self {
        Self(value)
    }
}

/// The category of the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// A referenced object does not exist.
    NotFound,
    /// A conditional write found the object already present.
    Conflict,
    /// The object store rejected or failed a request.
    Upstream,
    /// A pre-signed URL could not be produced.
    Signing,
    /// Configuration is missing or unparseable.
    Config,
    /// Any other failure.
    Unknown,
}

impl ErrorKind {
    /// HTTP status code a route should answer with for this kind of error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Upstream | Self::Signing | Self::Config | Self::Unknown => 500,
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::NotFound => write!(f, "not found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Upstream => write!(f, "upstream"),
            Self::Signing => write!(f, "signing"),
            Self::Config => write!(f, "config"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Internal error type that we are free to change at will.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ErrorRepr {
    #[error("{0} missing required field: {1}")]
    Missing(&'static str, &'static str),
    #[error("invalid {field}: {msg}")]
    Invalid { field: &'static str, msg: String },
    #[error("object {0} does not exist")]
    NotFound(ObjectUri),
    #[error("object {0} already exists")]
    Exists(ObjectUri),
    #[error("malformed object key {key:?}: {msg}")]
    MalformedKey { key: String, msg: &'static str },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("creating multipart upload for {uri} failed: {source}")]
    Create { uri: ObjectUri, source: BoxError },
    #[error("uploading {part} to upload {id} failed: {source}")]
    UploadPart {
        id: UploadId,
        uri: ObjectUri,
        part: PartNumber,
        source: BoxError,
    },
    #[error("completing upload {id} failed: {source}")]
    Complete {
        id: UploadId,
        uri: ObjectUri,
        parts: CompletedParts,
        source: BoxError,
    },
    #[error("aborting upload {id} failed: {source}")]
    Abort {
        id: UploadId,
        uri: ObjectUri,
        source: BoxError,
    },
    #[error("manifest for upload {id} does not match its plan: {msg}")]
    Manifest { id: UploadId, msg: String },
    #[error("putting object {uri} failed: {source}")]
    Put { uri: ObjectUri, source: BoxError },
    #[error("deleting {count} objects from {bucket} failed: {source}")]
    Delete {
        bucket: String,
        count: usize,
        source: BoxError,
    },
    #[error("reading metadata of {uri} failed: {source}")]
    Head { uri: ObjectUri, source: BoxError },
    #[error("signing url for {uri} failed: {source}")]
    Presign { uri: ObjectUri, source: BoxError },
    #[error("{kind} error: {msg}")]
    Any { kind: ErrorKind, msg: String },
    #[error(transparent)]
    StdDyn(BoxError),
}

impl ErrorRepr {
    pub(crate) fn from_create_err<E, R>(uri: &ObjectUri) -> impl FnOnce(SdkError<E, R>) -> Self
    where
        SdkError<E, R>: std::error::Error + Send + Sync + 'static,
    {
        move |e| Self::Create {
            uri: uri.clone(),
            source: Box::new(e),
        }
    }

    pub(crate) fn from_upload_err<E, R>(
        id: &UploadId,
        uri: &ObjectUri,
        part: PartNumber,
    ) -> impl FnOnce(SdkError<E, R>) -> Self
    where
        SdkError<E, R>: std::error::Error + Send + Sync + 'static,
    {
        move |e| Self::UploadPart {
            id: id.clone(),
            uri: uri.clone(),
            part,
            source: Box::new(e),
        }
    }

    pub(crate) fn from_complete_err<E, R>(
        id: &UploadId,
        uri: &ObjectUri,
        parts: &CompletedParts,
    ) -> impl FnOnce(SdkError<E, R>) -> Self
    where
        SdkError<E, R>: std::error::Error + Send + Sync + 'static,
    {
        move |e| Self::Complete {
            id: id.clone(),
            uri: uri.clone(),
            parts: parts.clone(),
            source: Box::new(e),
        }
    }

    pub(crate) fn from_abort_err<E, R>(
        id: &UploadId,
        uri: &ObjectUri,
    ) -> impl FnOnce(SdkError<E, R>) -> Self
    where
        SdkError<E, R>: std::error::Error + Send + Sync + 'static,
    {
        move |e| Self::Abort {
            id: id.clone(),
            uri: uri.clone(),
            source: Box::new(e),
        }
    }

    pub(crate) fn from_presign_err<E>(uri: &ObjectUri) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |e| Self::Presign {
            uri: uri.clone(),
            source: Box::new(e),
        }
    }
}
