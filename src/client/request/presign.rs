use super::{GetRequestBuilder, PutRequestBuilder};
use crate::error::{ErrorRepr, Result};
use crate::uri::ObjectUri;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// What a pre-signed URL lets its holder do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `GET` the object.
    Read,
    /// `PUT` the object.
    Write,
}

impl Operation {
    /// The HTTP method the URL must be used with.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Read => "GET",
            Self::Write => "PUT",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Response headers a read-signed URL asks the store to send back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseOverrides {
    /// Value of the `Content-Disposition` response header.
    pub content_disposition: Option<String>,
    /// Value of the `Content-Type` response header.
    pub content_type: Option<String>,
}

impl ResponseOverrides {
    /// Serve the object as a download named `file_name`.
    pub fn attachment(file_name: &str, content_type: Option<String>) -> Self {
        let name = file_name.replace(['"', '\\'], "_");
        Self {
            content_disposition: Some(format!("attachment; filename=\"{name}\"")),
            content_type,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.content_disposition.is_none() && self.content_type.is_none()
    }
}

/// Request object for producing a pre-signed URL.
#[derive(Debug, Clone)]
pub struct PresignRequest {
    pub(crate) uri: ObjectUri,
    pub(crate) operation: Operation,
    pub(crate) expires_in: Duration,
    pub(crate) content_type: Option<String>,
    pub(crate) range: Option<String>,
    pub(crate) overrides: ResponseOverrides,
}

impl PresignRequest {
    /// Create a new `PresignRequest` from the minimum required.
    pub fn new(uri: ObjectUri, operation: Operation, expires_in: Duration) -> Self {
        Self {
            uri,
            operation,
            expires_in,
            content_type: None,
            range: None,
            overrides: ResponseOverrides::default(),
        }
    }

    /// Constrain the content type a write-signed URL accepts.
    pub fn content_type<T: Into<String>>(self, content_type: Option<T>) -> Self {
        Self {
            content_type: content_type.map(Into::into),
            ..self
        }
    }

    /// Scope a read-signed URL to an HTTP `Range`, e.g. `bytes=0-99`.
    pub fn range<T: Into<String>>(self, range: Option<T>) -> Self {
        Self {
            range: range.map(Into::into),
            ..self
        }
    }

    /// Set the response headers of a read-signed URL.
    pub fn overrides(self, overrides: ResponseOverrides) -> Self {
        Self { overrides, ..self }
    }

    /// Set the required properties on the SDK `GetObject` builder.
    pub fn with_get_builder(&self, builder: GetRequestBuilder) -> GetRequestBuilder {
        builder
            .bucket(&*self.uri.bucket)
            .key(&*self.uri.key)
            .set_range(self.range.clone())
            .set_response_content_disposition(self.overrides.content_disposition.clone())
            .set_response_content_type(self.overrides.content_type.clone())
    }

    /// Set the required properties on the SDK `PutObject` builder.
    pub fn with_put_builder(&self, builder: PutRequestBuilder) -> PutRequestBuilder {
        builder
            .bucket(&*self.uri.bucket)
            .key(&*self.uri.key)
            .set_content_type(self.content_type.clone())
    }

    /// Returns a reference to the `ObjectUri` for this request.
    pub fn uri(&self) -> &ObjectUri {
        &self.uri
    }

    /// Returns the operation the URL grants.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns how long the URL stays valid.
    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Returns the byte range a read is scoped to, if any.
    pub fn get_range(&self) -> Option<&str> {
        self.range.as_deref()
    }

    /// Returns the content type constraint of a write, if any.
    pub fn get_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the response overrides of a read.
    pub fn get_overrides(&self) -> &ResponseOverrides {
        &self.overrides
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.uri.bucket.is_empty() {
            return Err(ErrorRepr::Missing("PresignRequest", "bucket").into());
        }
        self.uri.key.validate()?;
        if self.operation == Operation::Write && (self.range.is_some() || !self.overrides.is_empty())
        {
            return Err(ErrorRepr::Invalid {
                field: "operation",
                msg: "range and response overrides only apply to reads".into(),
            }
            .into());
        }
        Ok(())
    }
}

/// A pre-signed URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUrl {
    /// The URL itself.
    pub url: String,
    /// The HTTP method to use with the URL.
    pub method: &'static str,
    /// Seconds the URL stays valid after it was issued.
    pub expires_in: u64,
}

impl PresignedUrl {
    /// Create a new `PresignedUrl`.
    pub fn new<T: Into<String>>(url: T, operation: Operation, expires_in: Duration) -> Self {
        Self {
            url: url.into(),
            method: operation.method(),
            expires_in: expires_in.as_secs(),
        }
    }
}

impl Display for PresignedUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.url.fmt(f)
    }
}
