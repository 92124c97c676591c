use super::DeleteRequestBuilder;
use crate::error::{Error, ErrorRepr, Result};
use crate::uri::{Bucket, Key};

use aws_sdk_s3::types::{Delete, ObjectIdentifier};

// https://docs.aws.amazon.com/AmazonS3/latest/API/API_DeleteObjects.html
const MAX_DELETE_KEYS: usize = 1000;

/// Request object for deleting a batch of objects from one bucket.
#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub(crate) bucket: Bucket,
    pub(crate) keys: Vec<Key>,
}

impl DeleteRequest {
    /// Create a new `DeleteRequest`.
    pub fn new<I, K>(bucket: Bucket, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Key>,
    {
        Self {
            bucket,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Set the required properties on the SDK request builder for the operation.
    pub fn with_builder(&self, builder: DeleteRequestBuilder) -> Result<DeleteRequestBuilder> {
        let objects = self
            .keys
            .iter()
            .map(|k| ObjectIdentifier::builder().key(&**k).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::from_dyn)?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(Error::from_dyn)?;

        Ok(builder.bucket(&*self.bucket).delete(delete))
    }

    /// Returns a reference to the bucket objects are deleted from.
    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    /// Returns the keys to delete.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(ErrorRepr::Missing("DeleteRequest", "bucket").into());
        }
        if self.keys.is_empty() {
            return Err(ErrorRepr::Missing("DeleteRequest", "keys").into());
        }
        if self.keys.len() > MAX_DELETE_KEYS {
            return Err(Error::invalid(
                "keys",
                format!("at most {MAX_DELETE_KEYS} keys per request"),
            ));
        }
        self.keys
            .iter()
            .try_for_each(Key::validate)
            .map_err(|e| Error::invalid("keys", e.to_string()))
    }
}
