use super::HeadRequestBuilder;
use crate::client::part::EntityTag;
use crate::error::{ErrorRepr, Result};
use crate::uri::ObjectUri;

/// Request object for reading the metadata of an object.
#[derive(Debug, Clone)]
pub struct HeadRequest {
    pub(crate) uri: ObjectUri,
}

impl HeadRequest {
    /// Create a new `HeadRequest`.
    pub fn new(uri: ObjectUri) -> Self {
        Self { uri }
    }

    /// Set the required properties on the SDK request builder for the operation.
    pub fn with_builder(&self, builder: HeadRequestBuilder) -> HeadRequestBuilder {
        builder.bucket(&*self.uri.bucket).key(&*self.uri.key)
    }

    /// Returns a reference to the `ObjectUri` for this request.
    pub fn uri(&self) -> &ObjectUri {
        &self.uri
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.uri.is_empty() {
            return Err(ErrorRepr::Missing("HeadRequest", "empty object uri").into());
        }
        Ok(())
    }
}

/// Metadata of a stored object.
#[derive(Debug, Clone, Default)]
pub struct ObjectHead {
    /// The URI of the object.
    pub uri: ObjectUri,
    /// Size of the object in bytes.
    pub size: u64,
    /// Content type the object is served with.
    pub content_type: Option<String>,
    /// Entity tag of the object.
    pub etag: Option<EntityTag>,
}
