#![allow(dead_code)]

pub mod client;
pub use self::client::{Calls, TestClient};

use media_transfer::{ByteSize, Config, MediaService, UploadBuilder};
use std::sync::{Arc, LazyLock};
use tracing_subscriber::EnvFilter;

pub const BUCKET: &str = "test-media";

pub static TRACER: LazyLock<()> = LazyLock::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
});

/// Deterministic, non-repeating-looking bytes for round trips.
pub fn body(len: usize) -> bytes::Bytes {
    (0..len).map(|i| (i * 31 % 251) as u8).collect::<Vec<_>>().into()
}

/// A service over `client` whose uploads use parts of at least `min_part`
/// bytes, below what a normalized `Config` allows.
pub fn service(client: &Arc<TestClient>, min_part: u64) -> MediaService {
    let uploader = UploadBuilder::new(Arc::clone(client))
        .min_part_size(ByteSize::b(min_part))
        .overwrite(false)
        .build();
    MediaService::new(Arc::clone(client), Config::new(BUCKET)).with_uploader(uploader)
}
