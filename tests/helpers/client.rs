use media_transfer::error::{Error, ErrorKind, Result};
use media_transfer::request::*;
use media_transfer::{ObjectUri, SendRequest};

use bytes::{Bytes, BytesMut};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::time::Duration;

/// Number of calls the client received per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Calls {
    pub create: usize,
    pub part: usize,
    pub complete: usize,
    pub abort: usize,
    pub put: usize,
    pub delete: usize,
    pub head: usize,
    pub presign: usize,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Default)]
struct OpenUpload {
    uri: ObjectUri,
    content_type: Option<String>,
    parts: BTreeMap<i32, Bytes>,
}

#[derive(Debug, Default)]
struct State {
    objects: HashMap<(String, String), StoredObject>,
    uploads: HashMap<String, OpenUpload>,
    next_id: usize,
    calls: Calls,
    manifest: Option<Vec<i32>>,
}

#[derive(Debug, Default)]
struct Faults {
    create: bool,
    part: Option<i32>,
    complete: bool,
    abort: bool,
    sign: bool,
    bogus_part: bool,
    short_part: bool,
}

/// For testing, an object store held in memory.
///
/// Failures of individual operations can be injected, and every call is
/// counted. Pre-signed URLs have the form `memory://bucket/key?...` and can be
/// resolved against the store with [`TestClient::fetch`].
#[derive(Debug, Default)]
pub struct TestClient {
    state: Mutex<State>,
    faults: Faults,
    // Lower part numbers take longer, so parts finish in reverse order.
    stagger: Option<Duration>,
}

impl TestClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(mut self) -> Self {
        self.faults.create = true;
        self
    }

    pub fn fail_part(mut self, n: i32) -> Self {
        self.faults.part = Some(n);
        self
    }

    pub fn fail_complete(mut self) -> Self {
        self.faults.complete = true;
        self
    }

    pub fn fail_abort(mut self) -> Self {
        self.faults.abort = true;
        self
    }

    pub fn fail_sign(mut self) -> Self {
        self.faults.sign = true;
        self
    }

    /// Part uploads answer with part number 1 every time.
    pub fn bogus_part_numbers(mut self) -> Self {
        self.faults.bogus_part = true;
        self
    }

    /// Part uploads report one byte less than they received.
    pub fn short_part_sizes(mut self) -> Self {
        self.faults.short_part = true;
        self
    }

    pub fn finish_out_of_order(mut self, step: Duration) -> Self {
        self.stagger = Some(step);
        self
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls
    }

    /// Part numbers of the last complete request, in the order sent.
    pub fn manifest(&self) -> Option<Vec<i32>> {
        self.state.lock().unwrap().manifest.clone()
    }

    pub fn object_count(&self) -> usize {
        self.state.lock().unwrap().objects.len()
    }

    pub fn open_uploads(&self) -> usize {
        self.state.lock().unwrap().uploads.len()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn insert(&self, bucket: &str, key: &str, body: Bytes, content_type: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        state.objects.insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body,
                content_type: content_type.map(String::from),
            },
        );
    }

    /// Resolve a read-signed URL issued by this client, honoring its range.
    pub fn fetch(&self, url: &str) -> Option<Bytes> {
        let parsed = ParsedUrl::parse(url)?;
        if parsed.param("op") != Some("read") {
            return None;
        }
        let obj = self.object(&parsed.bucket, &parsed.key)?;
        match parsed.param("range") {
            None => Some(obj.body),
            Some(range) => {
                let (start, end) = range.strip_prefix("bytes=")?.split_once('-')?;
                let start: usize = start.parse().ok()?;
                let end: usize = end.parse().ok()?;
                let end = (end + 1).min(obj.body.len());
                (start < end).then(|| obj.body.slice(start..end))
            }
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }
}

fn upstream(msg: impl Into<String>) -> Error {
    Error::from_kind(ErrorKind::Upstream, msg)
}

fn object_key(uri: &ObjectUri) -> (String, String) {
    (uri.bucket.to_string(), uri.key.to_string())
}

impl SendRequest for TestClient {
    async fn send_create_upload_request(&self, req: CreateRequest) -> Result<UploadData> {
        let id = self.with_state(|state| {
            state.calls.create += 1;
            if self.faults.create {
                return Err(upstream("create refused"));
            }
            state.next_id += 1;
            let id = format!("upload-{}", state.next_id);
            state.uploads.insert(
                id.clone(),
                OpenUpload {
                    uri: req.uri().clone(),
                    content_type: req.get_content_type().map(String::from),
                    parts: BTreeMap::new(),
                },
            );
            Ok(id)
        })?;

        Ok(UploadData::new(id, req.uri().clone()))
    }

    async fn send_new_part_upload_request(&self, req: UploadPartRequest) -> Result<CompletedPart> {
        let n = *req.part_number();
        self.with_state(|state| state.calls.part += 1);

        if let Some(step) = self.stagger {
            let wait = step * (20u32.saturating_sub(n as u32));
            tokio::time::sleep(wait).await;
        }
        if self.faults.part == Some(n) {
            return Err(upstream(format!("part {n} refused")));
        }

        self.with_state(|state| {
            let upload = state
                .uploads
                .get_mut(&**req.id())
                .ok_or_else(|| upstream(format!("no upload {}", req.id())))?;
            upload.parts.insert(n, req.body().clone().into_inner());
            Ok::<_, Error>(())
        })?;

        let number = if self.faults.bogus_part {
            PartNumber::new(1)
        } else {
            req.part_number()
        };
        let size = if self.faults.short_part {
            req.body().size() - 1
        } else {
            req.body().size()
        };
        Ok(CompletedPart::new(
            req.id().clone(),
            EntityTag::from(format!("etag-{n}")),
            number,
            size,
        ))
    }

    async fn send_complete_upload_request(&self, req: CompleteRequest) -> Result<CompletedUpload> {
        self.with_state(|state| {
            state.calls.complete += 1;
            let numbers: Vec<i32> = req.completed_parts().iter().map(|p| *p.part_number).collect();
            state.manifest = Some(numbers.clone());
            if self.faults.complete {
                return Err(upstream("complete refused"));
            }
            if req.is_conditional() && state.objects.contains_key(&object_key(req.uri())) {
                return Err(Error::from_kind(
                    ErrorKind::Conflict,
                    format!("{} already exists", req.uri()),
                ));
            }

            let upload = state
                .uploads
                .remove(&**req.id())
                .ok_or_else(|| upstream(format!("no upload {}", req.id())))?;
            let mut body = BytesMut::new();
            for n in &numbers {
                let part = upload
                    .parts
                    .get(n)
                    .ok_or_else(|| upstream(format!("part {n} was never uploaded")))?;
                body.extend_from_slice(part);
            }
            state.objects.insert(
                object_key(&upload.uri),
                StoredObject {
                    body: body.freeze(),
                    content_type: upload.content_type,
                },
            );

            let uri = req.uri().clone();
            let location = format!("memory://{}/{}", uri.bucket, uri.key);
            Ok(CompletedUpload::new(uri, EntityTag::from("etag-complete")).with_location(Some(location)))
        })
    }

    async fn send_abort_upload_request(&self, req: AbortRequest) -> Result<()> {
        self.with_state(|state| {
            state.calls.abort += 1;
            if self.faults.abort {
                return Err(upstream("abort refused"));
            }
            state.uploads.remove(&**req.id());
            Ok(())
        })
    }

    async fn send_put_object_request(&self, req: PutRequest) -> Result<CompletedUpload> {
        self.with_state(|state| {
            state.calls.put += 1;
            let key = object_key(req.uri());
            if req.is_conditional() && state.objects.contains_key(&key) {
                return Err(Error::from_kind(
                    ErrorKind::Conflict,
                    format!("{} already exists", req.uri()),
                ));
            }
            state.objects.insert(
                key,
                StoredObject {
                    body: req.body().clone().into_inner(),
                    content_type: req.get_content_type().map(String::from),
                },
            );
            Ok(CompletedUpload::new(req.uri().clone(), EntityTag::from("etag-put")))
        })
    }

    async fn send_delete_objects_request(&self, req: DeleteRequest) -> Result<()> {
        self.with_state(|state| {
            state.calls.delete += 1;
            for key in req.keys() {
                state
                    .objects
                    .remove(&(req.bucket().to_string(), key.to_string()));
            }
            Ok(())
        })
    }

    async fn send_head_object_request(&self, req: HeadRequest) -> Result<ObjectHead> {
        self.with_state(|state| {
            state.calls.head += 1;
            let obj = state.objects.get(&object_key(req.uri())).ok_or_else(|| {
                Error::from_kind(ErrorKind::NotFound, format!("{} does not exist", req.uri()))
            })?;
            Ok(ObjectHead {
                uri: req.uri().clone(),
                size: obj.body.len() as u64,
                content_type: obj.content_type.clone(),
                etag: None,
            })
        })
    }

    async fn send_presign_request(&self, req: PresignRequest) -> Result<PresignedUrl> {
        self.with_state(|state| state.calls.presign += 1);
        if self.faults.sign {
            return Err(Error::from_kind(ErrorKind::Signing, "no credentials"));
        }

        let uri = req.uri();
        let mut url = format!(
            "memory://{}/{}?op={}&expires={}",
            uri.bucket,
            uri.key,
            req.operation(),
            req.expires_in().as_secs(),
        );
        if let Some(range) = req.get_range() {
            url.push_str(&format!("&range={range}"));
        }
        if let Some(ct) = req.get_content_type() {
            url.push_str(&format!("&content-type={ct}"));
        }
        let overrides = req.get_overrides();
        if let Some(cd) = &overrides.content_disposition {
            url.push_str(&format!("&response-content-disposition={cd}"));
        }
        if let Some(ct) = &overrides.content_type {
            url.push_str(&format!("&response-content-type={ct}"));
        }

        Ok(PresignedUrl::new(url, req.operation(), req.expires_in()))
    }
}

/// The parts of a URL issued by [`TestClient`].
#[derive(Debug)]
pub struct ParsedUrl {
    pub bucket: String,
    pub key: String,
    pub params: Vec<(String, String)>,
}

impl ParsedUrl {
    pub fn parse(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("memory://")?;
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (bucket, key) = path.split_once('/')?;
        let params = query
            .split('&')
            .filter_map(|kv| kv.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Some(Self {
            bucket: bucket.to_string(),
            key: key.to_string(),
            params,
        })
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
