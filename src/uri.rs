//! Addresses of objects in the store.
//!
//! An [`ObjectUri`] is a [`Bucket`] and a [`Key`]. Keys for uploaded media
//! are usually built from a [`KeyPrefix`]:
//!
//! ```rust
//! use media_transfer::uri::{KeyPrefix, ObjectUri};
//!
//! let prefix = KeyPrefix::from("/video/");
//! let key = prefix.to_key("clip.mp4");
//! let uri = ObjectUri::from(("media-bucket", key));
//!
//! assert_eq!(uri.to_string(), "s3://media-bucket/video/clip.mp4");
//! ```
use crate::error::{ErrorRepr, Result};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{self, Formatter};
use std::ops::Deref;

// https://docs.aws.amazon.com/AmazonS3/latest/userguide/object-keys.html
const MAX_KEY_BYTES: usize = 1024;

/// The address of an object in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectUri {
    /// The bucket holding the object.
    ///
    /// This should be the plain bucket name, e.g., "my-media-bucket".
    pub bucket: Bucket,
    /// The full key of this object within the bucket.
    pub key: Key,
}

impl ObjectUri {
    /// Create a new `ObjectUri` from bucket and object key.
    pub fn new(bucket: Bucket, key: Key) -> Self {
        Self { bucket, key }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bucket.is_empty() || self.key.is_empty()
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", &self.bucket, &self.key)
    }
}

impl<T: Into<Bucket>, U: Into<Key>> From<(T, U)> for ObjectUri {
    fn from((b, k): (T, U)) -> Self {
        ObjectUri::new(b.into(), k.into())
    }
}

/// A bucket in the object store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Bucket(Cow<'static, str>);

impl Bucket {
    /// Create a new `Bucket`.
    pub fn new<T: Into<Cow<'static, str>>>(bucket: T) -> Self {
        let bucket: Cow<'static, str> = bucket.into();
        match bucket.strip_suffix("/") {
            Some(v) => Self(Cow::Owned(v.to_string())),
            _ => Self(bucket),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Bucket {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Bucket {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for Bucket {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Bucket> for String {
    fn from(value: Bucket) -> Self {
        value.0.into_owned()
    }
}

/// The key of an object within its bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Key(Cow<'static, str>);

impl Key {
    /// Create a new object `Key`.
    pub fn new<T: Into<Cow<'static, str>>>(key: T) -> Self {
        Self(key.into())
    }

    /// The last `/`-separated segment of the key.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// Check that the key can be addressed in a request.
    ///
    /// A key must be non-empty, at most 1024 bytes, must not start with `/`,
    /// and must not contain control characters.
    pub fn validate(&self) -> Result<()> {
        let msg = if self.0.is_empty() {
            "empty key"
        } else if self.0.len() > MAX_KEY_BYTES {
            "longer than 1024 bytes"
        } else if self.0.starts_with('/') {
            "leading '/'"
        } else if self.0.chars().any(char::is_control) {
            "contains control characters"
        } else {
            return Ok(());
        };
        Err(ErrorRepr::MalformedKey {
            key: self.0.to_string(),
            msg,
        }
        .into())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Key {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl From<Key> for String {
    fn from(value: Key) -> Self {
        value.0.into_owned()
    }
}

/// A prefix of object keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPrefix(Cow<'static, str>);

impl KeyPrefix {
    /// Create a new object key prefix.
    ///
    /// Normalized to end with a single `'/'` and have no leading `'/'`.
    pub fn new<T: Into<Cow<'static, str>>>(prefix: T) -> Self {
        let raw: Cow<'static, str> = prefix.into();
        let trimmed = raw.trim_matches('/');
        Self(format!("{trimmed}/").into())
    }

    /// Create an object [`Key`] with this prefix and the given suffix.
    pub fn to_key(&self, suffix: &str) -> Key {
        format!("{self}{suffix}").into()
    }

    /// Whether `key` lives under this prefix.
    pub fn contains(&self, key: &str) -> bool {
        key.len() > self.0.len() && key.starts_with(&*self.0)
    }
}

impl Deref for KeyPrefix {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for KeyPrefix {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for KeyPrefix {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
