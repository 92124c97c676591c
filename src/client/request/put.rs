use super::PutRequestBuilder;
use crate::client::part::PartBody;
use crate::error::{ErrorRepr, Result};
use crate::uri::ObjectUri;

/// Request object for a single-shot object put.
#[derive(Debug, Clone)]
pub struct PutRequest {
    pub(crate) uri: ObjectUri,
    pub(crate) body: PartBody,
    pub(crate) content_type: Option<String>,
    pub(crate) if_absent: bool,
}

impl PutRequest {
    /// Create a new `PutRequest` from the minimum required.
    pub fn new(uri: ObjectUri, body: PartBody) -> Self {
        Self {
            uri,
            body,
            content_type: None,
            if_absent: false,
        }
    }

    /// Set the content type the object will be served with.
    pub fn content_type<T: Into<String>>(self, content_type: Option<T>) -> Self {
        Self {
            content_type: content_type.map(Into::into),
            ..self
        }
    }

    /// Only write the object if nothing exists at the key yet.
    ///
    /// A put that finds the key taken fails with a `Conflict` error.
    pub fn if_absent(self) -> Self {
        Self {
            if_absent: true,
            ..self
        }
    }

    /// Set the required properties on the SDK request builder for the operation.
    pub fn with_builder(&self, builder: PutRequestBuilder) -> PutRequestBuilder {
        let builder = builder
            .bucket(&*self.uri.bucket)
            .key(&*self.uri.key)
            .content_length(self.body.size() as i64)
            .set_content_type(self.content_type.clone())
            .body(self.body.as_sdk_body());

        if self.if_absent {
            builder.if_none_match("*")
        } else {
            builder
        }
    }

    /// Returns a reference to the `ObjectUri` for this request.
    pub fn uri(&self) -> &ObjectUri {
        &self.uri
    }

    /// Returns a reference to the `PartBody` for this request.
    pub fn body(&self) -> &PartBody {
        &self.body
    }

    /// Returns the content type of the object, if one was set.
    pub fn get_content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Whether this put must not overwrite an existing object.
    pub fn is_conditional(&self) -> bool {
        self.if_absent
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.uri.is_empty() {
            return Err(ErrorRepr::Missing("PutRequest", "empty object uri").into());
        }
        Ok(())
    }
}
