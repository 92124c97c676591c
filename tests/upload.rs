pub mod helpers;
use self::helpers::{BUCKET, Calls, TRACER, TestClient, body};

use media_transfer::error::ErrorKind;
use media_transfer::{ApiResponse, ByteSize, UploadBuilder};

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

fn uploader(client: &Arc<TestClient>, min_part: u64) -> media_transfer::Uploader {
    UploadBuilder::new(Arc::clone(client))
        .min_part_size(ByteSize::b(min_part))
        .build()
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_in_parts() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    let data = body(250);
    let res = uploader(&client, 100)
        .upload((BUCKET, "audio/a/track.mp3"), data.clone(), Some("audio/mpeg"))
        .await
        .unwrap();

    assert_eq!(res.uri.to_string(), "s3://test-media/audio/a/track.mp3");
    assert_eq!(res.location(), "memory://test-media/audio/a/track.mp3");
    assert_eq!(client.manifest(), Some(vec![1, 2, 3]));
    assert_eq!(
        client.calls(),
        Calls {
            create: 1,
            part: 3,
            complete: 1,
            ..Default::default()
        }
    );

    let stored = client.object(BUCKET, "audio/a/track.mp3").unwrap();
    assert_eq!(stored.body, data);
    assert_eq!(stored.content_type.as_deref(), Some("audio/mpeg"));
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_empty_body_is_single_put() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    uploader(&client, 100)
        .upload((BUCKET, "crash-log/a/empty.txt"), Bytes::new(), None)
        .await
        .unwrap();

    let calls = client.calls();
    assert_eq!(calls.put, 1);
    assert_eq!(calls.create, 0);
    assert!(client.object(BUCKET, "crash-log/a/empty.txt").unwrap().body.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn part_failure_aborts_once() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new().fail_part(2));
    let err = uploader(&client, 100)
        .upload((BUCKET, "video/a/clip.mp4"), body(250), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("part 2"));

    let calls = client.calls();
    assert_eq!(calls.abort, 1);
    assert_eq!(calls.complete, 0);
    assert_eq!(client.open_uploads(), 0);
    assert!(client.object(BUCKET, "video/a/clip.mp4").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn complete_failure_aborts() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new().fail_complete());
    let err = uploader(&client, 100)
        .upload((BUCKET, "video/a/clip.mp4"), body(250), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("complete refused"));

    let calls = client.calls();
    assert_eq!(calls.complete, 1);
    assert_eq!(calls.abort, 1);
    assert_eq!(client.open_uploads(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn abort_failure_keeps_original_error() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new().fail_part(1).fail_abort());
    let err = uploader(&client, 100)
        .upload((BUCKET, "image/a/cat.png"), body(250), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("part 1 refused"));
    assert_eq!(client.calls().abort, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_failure_has_nothing_to_abort() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new().fail_create());
    let err = uploader(&client, 100)
        .upload((BUCKET, "image/a/cat.png"), body(250), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    let calls = client.calls();
    assert_eq!(calls.part, 0);
    assert_eq!(calls.abort, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn manifest_sorted_when_parts_finish_out_of_order() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new().finish_out_of_order(Duration::from_millis(5)));
    let data = body(1_000);
    uploader(&client, 100)
        .upload((BUCKET, "audio/a/long.flac"), data.clone(), None)
        .await
        .unwrap();

    assert_eq!(client.manifest(), Some((1..=10).collect()));
    assert_eq!(client.object(BUCKET, "audio/a/long.flac").unwrap().body, data);
}

#[tokio::test(flavor = "multi_thread")]
async fn bounded_concurrency_uploads_every_part() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new().finish_out_of_order(Duration::from_millis(1)));
    let data = body(1_000);
    UploadBuilder::new(Arc::clone(&client))
        .min_part_size(ByteSize::b(50))
        .max_active_tasks(2)
        .build()
        .upload((BUCKET, "audio/a/bounded.flac"), data.clone(), None)
        .await
        .unwrap();

    assert_eq!(client.calls().part, 20);
    assert_eq!(client.manifest(), Some((1..=20).collect()));
    assert_eq!(client.object(BUCKET, "audio/a/bounded.flac").unwrap().body, data);
}

#[tokio::test(flavor = "multi_thread")]
async fn manifest_mismatch_aborts_without_complete() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new().bogus_part_numbers());
    let err = uploader(&client, 100)
        .upload((BUCKET, "video/a/clip.mp4"), body(250), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    let calls = client.calls();
    assert_eq!(calls.complete, 0);
    assert_eq!(calls.abort, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn part_size_mismatch_aborts_without_complete() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new().short_part_sizes());
    let err = uploader(&client, 100)
        .upload((BUCKET, "video/a/clip.mp4"), body(250), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Upstream);
    assert!(err.to_string().contains("planned 100"), "{err}");
    let calls = client.calls();
    assert_eq!(calls.part, 3);
    assert_eq!(calls.complete, 0);
    assert_eq!(calls.abort, 1);
    assert_eq!(client.open_uploads(), 0);
    assert!(client.object(BUCKET, "video/a/clip.mp4").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn no_overwrite_keeps_existing_object() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    let original = Bytes::from_static(b"first");
    client.insert(BUCKET, "image/a/cat.png", original.clone(), None);
    let up = UploadBuilder::new(Arc::clone(&client))
        .min_part_size(ByteSize::b(100))
        .overwrite(false)
        .build();

    let err = up
        .upload((BUCKET, "image/a/cat.png"), body(250), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let resp = ApiResponse::<()>::from(Err(err));
    assert!(!resp.is_success());
    assert_eq!(resp.status_code(), 409);

    // The failed complete still aborts the upload.
    let calls = client.calls();
    assert_eq!(calls.complete, 1);
    assert_eq!(calls.abort, 1);
    assert_eq!(client.open_uploads(), 0);

    let err = up
        .upload((BUCKET, "image/a/cat.png"), Bytes::new(), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(client.object(BUCKET, "image/a/cat.png").unwrap().body, original);
}

#[tokio::test(flavor = "multi_thread")]
async fn part_count_is_capped() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    let up = UploadBuilder::new(Arc::clone(&client))
        .min_part_size(ByteSize::b(1))
        .max_parts(4)
        .build();

    assert_eq!(up.plan(10).num_parts(), 4);
    up.upload((BUCKET, "image/a/tiny.png"), body(10), None)
        .await
        .unwrap();
    assert_eq!(client.manifest(), Some(vec![1, 2, 3, 4]));
}
