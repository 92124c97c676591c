use media_transfer::aws_config as config;
use media_transfer::media::{PresignDownloadRequest, UploadMediaRequest};
use media_transfer::{Config, MediaKind, MediaService, SdkClient};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{fmt, prelude::*};

const BUCKET: &str = "test-bucket-use2";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse("media_transfer=trace")?;

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let app = ExampleApp::default();
    let service = app.service().await?;

    let report = CrashReport::sample(20_000);
    let body = Bytes::from(serde_json::to_vec(&report)?);
    let req = UploadMediaRequest {
        kind: MediaKind::CrashLog,
        file_name: format!("{}.json", report.occurred_at.format("%Y%m%dT%H%M%S")),
        content_type: "application/json".into(),
    };

    let uploaded = service.upload_media(req, body).await;
    println!("{}", uploaded.to_json()?);
    let Some(media) = uploaded.data else {
        anyhow::bail!("upload failed with status {}", uploaded.status_code());
    };

    let plan = service
        .presign_download(PresignDownloadRequest {
            key: media.key,
            file_name: None,
            chunk_size: Some(app.chunk_bytes),
        })
        .await;
    println!("{}", plan.to_json()?);

    Ok(())
}

struct ExampleApp {
    endpoint_url: String,
    chunk_bytes: u64,
}

impl Default for ExampleApp {
    fn default() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:9090".into(),
            chunk_bytes: 1024 * 1024,
        }
    }
}

impl ExampleApp {
    async fn service(&self) -> anyhow::Result<MediaService> {
        let client = self.sdk_client().await?;
        let config = Config::new(BUCKET);
        Ok(MediaService::new(client, config))
    }

    async fn sdk_client(&self) -> anyhow::Result<SdkClient> {
        let loader = config::from_env()
            .region("us-east-2")
            .app_name(config::AppName::new("media-example")?)
            .endpoint_url(&self.endpoint_url);
        Ok(SdkClient::from_config(loader).await)
    }
}

/// A crash report as the apps upload it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CrashReport {
    app_version: String,
    occurred_at: DateTime<Utc>,
    frames: Vec<Frame>,
}

#[derive(Debug, Clone, Serialize)]
struct Frame {
    symbol: String,
    file: String,
    line: u32,
}

impl CrashReport {
    fn sample(depth: u32) -> Self {
        let frames = (0..depth)
            .map(|n| Frame {
                symbol: format!("player::decode::frame_{}", n % 64),
                file: format!("src/decode/{}.rs", n % 7),
                line: 10 + n % 400,
            })
            .collect();
        Self {
            app_version: "4.2.0".into(),
            occurred_at: Utc::now(),
            frames,
        }
    }
}
