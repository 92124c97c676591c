pub mod helpers;
use self::helpers::client::ParsedUrl;
use self::helpers::{BUCKET, TRACER, TestClient, body, service};

use media_transfer::media::{
    DeleteMediaRequest, MediaKind, PostRequest, PresignDownloadRequest, PresignUploadRequest,
    UploadMediaRequest,
};
use media_transfer::uri::Key;
use media_transfer::{Config, MediaService};

use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;

fn upload_req(kind: MediaKind, file_name: &str, content_type: &str) -> UploadMediaRequest {
    UploadMediaRequest {
        kind,
        file_name: file_name.into(),
        content_type: content_type.into(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_media_derives_key() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    let svc = service(&client, 100);
    let data = body(450);

    let resp = svc
        .upload_media(upload_req(MediaKind::Audio, "Song One.mp3", "audio/mpeg"), data.clone())
        .await;
    assert!(resp.success, "{}", resp.message);
    assert_eq!(resp.status_code(), 200);

    let uploaded = resp.data.unwrap();
    assert!(uploaded.key.starts_with("audio/"));
    assert!(uploaded.key.ends_with("/Song_One.mp3"));
    assert_eq!(uploaded.location, format!("memory://{BUCKET}/{}", uploaded.key));
    assert_eq!(client.object(BUCKET, &uploaded.key).unwrap().body, data);
    assert_eq!(client.calls().part, 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_media_rejects_wrong_content_type() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    let resp = service(&client, 100)
        .upload_media(upload_req(MediaKind::Image, "cat.png", "video/mp4"), body(10))
        .await;

    assert!(!resp.success);
    assert_eq!(resp.status_code(), 400);
    assert!(resp.data.is_none());
    assert_eq!(client.calls().create, 0);

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["success"], false);
    assert!(json.get("data").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_media_rejects_empty_file() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    let resp = service(&client, 100)
        .upload_media(upload_req(MediaKind::CrashLog, "log.txt", "text/plain"), Bytes::new())
        .await;

    assert_eq!(resp.status_code(), 400);
}

#[tokio::test(flavor = "multi_thread")]
async fn upload_failure_is_a_server_error() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new().fail_part(2));
    let resp = service(&client, 100)
        .upload_media(upload_req(MediaKind::Video, "clip.mp4", "video/mp4"), body(250))
        .await;

    assert!(!resp.success);
    assert_eq!(resp.status_code(), 500);
    // Upstream details are not leaked to the caller.
    assert_eq!(resp.message, "upstream error");
    assert_eq!(client.calls().abort, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn presign_upload_issues_write_url() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    let req: PresignUploadRequest = serde_json::from_value(json!({
        "kind": "crash-log",
        "fileName": "crash.json",
        "contentType": "application/json",
        "expiresIn": 600,
    }))
    .unwrap();
    let resp = service(&client, 100).presign_upload(req).await;

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["expiresIn"], 600);
    assert_eq!(json["data"]["method"], "PUT");

    let issued = resp.data.unwrap();
    assert!(issued.key.starts_with("crash-log/"));
    let url = ParsedUrl::parse(&issued.url).unwrap();
    assert_eq!(url.key, *issued.key);
    assert_eq!(url.param("op"), Some("write"));
    assert_eq!(url.param("content-type"), Some("application/json"));
}

#[tokio::test(flavor = "multi_thread")]
async fn presign_download_plans_ranges() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    client.insert(BUCKET, "video/a/clip.mp4", body(25), Some("video/mp4"));
    let svc = service(&client, 100);

    let resp = svc
        .presign_download(PresignDownloadRequest {
            key: "video/a/clip.mp4".into(),
            file_name: Some("my clip.mp4".into()),
            chunk_size: Some(10),
        })
        .await;
    let plan = resp.data.unwrap();
    assert_eq!(plan.num_parts(), 3);
    assert_eq!(plan.parts[2].end_byte, 24);

    let url = ParsedUrl::parse(&plan.parts[0].url).unwrap();
    assert_eq!(
        url.param("response-content-disposition"),
        Some("attachment; filename=\"my_clip.mp4\"")
    );

    let missing = svc
        .presign_download(PresignDownloadRequest {
            key: "video/a/gone.mp4".into(),
            file_name: None,
            chunk_size: None,
        })
        .await;
    assert_eq!(missing.status_code(), 404);

    let outside = svc
        .presign_download(PresignDownloadRequest {
            key: "private/secrets.txt".into(),
            file_name: None,
            chunk_size: None,
        })
        .await;
    assert_eq!(outside.status_code(), 400);

    let zero = svc
        .presign_download(PresignDownloadRequest {
            key: "video/a/clip.mp4".into(),
            file_name: None,
            chunk_size: Some(0),
        })
        .await;
    assert_eq!(zero.status_code(), 400);
}

#[tokio::test(flavor = "multi_thread")]
async fn presign_download_refuses_tiny_chunks() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    client.insert(BUCKET, "video/a/big.mp4", body(10_001), Some("video/mp4"));
    let svc = service(&client, 100);
    assert_eq!(svc.config().max_download_parts, 10_000);

    let resp = svc
        .presign_download(PresignDownloadRequest {
            key: "video/a/big.mp4".into(),
            file_name: None,
            chunk_size: Some(1),
        })
        .await;
    assert_eq!(resp.status_code(), 400);
    assert!(resp.message.contains("chunk_size"), "{}", resp.message);
    assert_eq!(client.calls().presign, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn service_normalizes_deserialized_config() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    let config: Config = serde_json::from_value(json!({
        "bucket": BUCKET,
        "minPartSize": 1,
        "maxDownloadParts": 0,
    }))
    .unwrap();
    let svc = MediaService::new(Arc::clone(&client), config);
    assert_eq!(svc.config().min_part_size, 5 * 1024 * 1024);
    assert_eq!(svc.config().max_download_parts, 1);

    // 250 bytes fit in one 5 MiB part.
    let resp = svc
        .upload_media(upload_req(MediaKind::Image, "cat.png", "image/png"), body(250))
        .await;
    assert!(resp.success, "{}", resp.message);
    assert_eq!(client.calls().part, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_media_batch() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    client.insert(BUCKET, "image/a/1.png", body(1), None);
    client.insert(BUCKET, "image/a/2.png", body(1), None);
    let svc = service(&client, 100);

    let resp = svc
        .delete_media(DeleteMediaRequest {
            keys: vec!["image/a/1.png".into(), "image/a/2.png".into()],
        })
        .await;
    assert_eq!(resp.data.unwrap().deleted, 2);
    assert!(client.object(BUCKET, "image/a/1.png").is_none());

    let none = svc.delete_media(DeleteMediaRequest { keys: vec![] }).await;
    assert_eq!(none.status_code(), 400);

    let too_many = (0..1_001)
        .map(|i| Key::from(format!("image/a/{i}.png")))
        .collect();
    let resp = svc.delete_media(DeleteMediaRequest { keys: too_many }).await;
    assert_eq!(resp.status_code(), 400);
    assert_eq!(client.calls().delete, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn verify_post_checks_media_exist() {
    let _ = &*TRACER;

    let client = Arc::new(TestClient::new());
    client.insert(BUCKET, "audio/a/1.mp3", body(3), Some("audio/mpeg"));
    client.insert(BUCKET, "audio/a/2.mp3", body(4), Some("audio/mpeg"));
    let svc = service(&client, 100);

    let post = PostRequest::from_json(
        &json!({
            "type": "playlist",
            "userId": "u1",
            "title": "mix",
            "tracks": ["audio/a/2.mp3", "audio/a/1.mp3"],
        })
        .to_string(),
    )
    .unwrap();
    let resp = svc.verify_post(post).await;
    let verified = resp.data.unwrap();
    assert_eq!(verified.kind, "playlist");
    let sizes: Vec<_> = verified.media.iter().map(|m| m.size).collect();
    assert_eq!(sizes, vec![4, 3]);

    let dangling = PostRequest::Image {
        user_id: "u1".into(),
        content: Some("look".into()),
        image_key: "image/a/gone.png".into(),
    };
    assert_eq!(svc.verify_post(dangling).await.status_code(), 404);

    let text = PostRequest::Text {
        user_id: "u1".into(),
        content: String::new(),
    };
    let resp = svc.verify_post(text).await;
    assert!(!resp.success);
    assert_eq!(resp.status_code(), 400);
    assert!(resp.message.contains("content"));
}
