//! Wire-contract tests for HttpVaultApi.
//!
//! Each test stands up a local warp server that plays the Jinko API and
//! checks what the client sends and how it reads the reply.

use base64::Engine as _;
use jinko_client::HttpVaultApi;
use jinko_core::{
    ApiError, AssetKind, AuditContext, AuditStatus, FileKey, GenerationRequest, JobId,
    RenderResponse, Tone, VaultApi,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use warp::http::StatusCode;
use warp::Filter;

/// Serve `routes` on an ephemeral port and yield the API base address
macro_rules! serve {
    ($routes:expr) => {{
        let (addr, server) = warp::serve($routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        HttpVaultApi::new(&format!("http://{addr}/api")).unwrap()
    }};
}

type Captured = Arc<Mutex<Vec<Value>>>;

fn captured() -> Captured {
    Arc::new(Mutex::new(Vec::new()))
}

/// Tenet: generation posts the four fields and returns the draft verbatim.
#[tokio::test]
async fn generate_posts_request_fields() {
    let seen = captured();
    let sink = Arc::clone(&seen);
    let routes = warp::post()
        .and(warp::path!("api" / "generate"))
        .and(warp::body::json())
        .map(move |body: Value| {
            sink.lock().unwrap().push(body);
            warp::reply::json(&json!({ "draft": "Welcome to 123 Oak St..." }))
        });
    let api = serve!(routes);

    let request = GenerationRequest::new("123 Oak St", "3bd/2ba", "pool").with_tone(Tone::Modern);
    let draft = api.generate(&request).await.unwrap();

    assert_eq!(draft, "Welcome to 123 Oak St...");
    assert_eq!(
        seen.lock().unwrap()[0],
        json!({
            "address": "123 Oak St",
            "specs": "3bd/2ba",
            "features": "pool",
            "tone": "Modern"
        })
    );
}

/// Tenet: audits carry the context fields and decode violations in order.
#[tokio::test]
async fn audit_sends_context_and_reads_violations() {
    let seen = captured();
    let sink = Arc::clone(&seen);
    let routes = warp::post()
        .and(warp::path!("api" / "audit"))
        .and(warp::body::json())
        .map(move |body: Value| {
            sink.lock().unwrap().push(body);
            warp::reply::json(&json!({
                "status": "FAIL",
                "final_text": "Great for everyone",
                "violations": [
                    { "phrase": "no kids", "reason": "Familial status", "citation": "FHA 3604(c)" },
                    { "phrase": "adults", "reason": "Familial status" }
                ]
            }))
        });
    let api = serve!(routes);

    let result = api
        .audit("Great for adults, no kids allowed", &AuditContext::default())
        .await
        .unwrap();

    assert_eq!(result.status, AuditStatus::Fail);
    assert_eq!(result.final_text, "Great for everyone");
    let phrases: Vec<&str> = result.violations.iter().map(|v| v.phrase.as_str()).collect();
    assert_eq!(phrases, vec!["no kids", "adults"]);
    assert_eq!(result.violations[1].citation, None);
    assert_eq!(
        seen.lock().unwrap()[0],
        json!({
            "text": "Great for adults, no kids allowed",
            "state": "AZ",
            "brokerage": "Jinko Realty",
            "rules": "Standard FHA",
            "is_owner": false
        })
    );
}

/// Tenet: the vault listing keeps server order and maps the wire field names.
#[tokio::test]
async fn vault_listing_decodes_entries() {
    let routes = warp::get().and(warp::path!("api" / "vault")).map(|| {
        warp::reply::json(&json!([
            { "key": "renders/job-7.mp4", "type": "VIDEO", "url": "https://cdn/job-7.mp4", "date": "2026-10-01" },
            { "key": "uploads/1_me.png", "type": "IDENTITY", "url": "https://cdn/1_me.png", "date": "2026-09-30" },
            { "key": "misc/readme.txt", "type": "DOCUMENT", "url": "https://cdn/readme.txt", "date": "2026-09-29" }
        ]))
    });
    let api = serve!(routes);

    let entries = api.list_vault().await.unwrap();
    let kinds: Vec<AssetKind> = entries.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![AssetKind::Video, AssetKind::Identity, AssetKind::Other]);
    assert_eq!(entries[0].created_at, "2026-10-01");
}

/// Tenet: an upload requests a slot, then PUTs raw bytes with the declared type.
#[tokio::test]
async fn upload_slot_then_direct_transfer() {
    let seen = captured();
    let slot_sink = Arc::clone(&seen);
    let put_sink = Arc::clone(&seen);

    let slot = warp::post()
        .and(warp::path!("api" / "upload-url"))
        .and(warp::body::json())
        .and(warp::host::optional())
        .map(move |body: Value, host: Option<warp::host::Authority>| {
            slot_sink.lock().unwrap().push(body);
            let host = host.map(|h| h.to_string()).unwrap_or_default();
            warp::reply::json(&json!({
                "upload_url": format!("http://{host}/bucket/uploads/1_me.png?X-Amz-Signature=abc"),
                "file_key": "uploads/1_me.png"
            }))
        });
    let put = warp::put()
        .and(warp::path!("bucket" / "uploads" / String))
        .and(warp::header::<String>("content-type"))
        .and(warp::body::bytes())
        .map(move |name: String, content_type: String, bytes: warp::hyper::body::Bytes| {
            put_sink.lock().unwrap().push(json!({
                "name": name,
                "content_type": content_type,
                "bytes": bytes.to_vec(),
            }));
            warp::reply()
        });
    let api = serve!(slot.or(put));

    let slot = api.request_upload_slot("me.png", "image/png").await.unwrap();
    assert_eq!(slot.file_key, FileKey::new("uploads/1_me.png"));
    api.transfer(&slot.upload_url, vec![0x89, 0x50, 0x4E, 0x47], "image/png")
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0], json!({ "filename": "me.png", "file_type": "image/png" }));
    assert_eq!(
        seen[1],
        json!({ "name": "1_me.png", "content_type": "image/png", "bytes": [0x89, 0x50, 0x4E, 0x47] })
    );
}

/// Tenet: a refused transfer surfaces the storage status without the signature.
#[tokio::test]
async fn refused_transfer_reports_status() {
    let routes = warp::put()
        .and(warp::path!("bucket" / "uploads" / String))
        .map(|_name: String| warp::reply::with_status(warp::reply(), StatusCode::FORBIDDEN));
    let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    let api = HttpVaultApi::new(&format!("http://{addr}/api")).unwrap();

    let err = api
        .transfer(
            &format!("http://{addr}/bucket/uploads/1_me.png?X-Amz-Signature=abc"),
            vec![1, 2, 3],
            "image/png",
        )
        .await
        .unwrap_err();

    match err {
        ApiError::Status { endpoint, status } => {
            assert_eq!(status, 403);
            assert!(!endpoint.contains("Signature"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

/// Tenet: render sends prompt and key; engine rejections are answers, not failures.
#[tokio::test]
async fn render_started_and_rejected() {
    let seen = captured();
    let sink = Arc::clone(&seen);
    let routes = warp::post()
        .and(warp::path!("api" / "render"))
        .and(warp::body::json())
        .map(move |body: Value| {
            let mut seen = sink.lock().unwrap();
            seen.push(body);
            if seen.len() == 1 {
                warp::reply::json(&json!({ "status": "SUCCESS", "job_id": "job-7" }))
            } else {
                warp::reply::json(&json!({ "status": "ERROR", "msg": "quota exceeded" }))
            }
        });
    let api = serve!(routes);
    let key = FileKey::new("uploads/1_me.png");

    let first = api.render("certified script", &key).await.unwrap();
    assert_eq!(first, RenderResponse::Started(JobId("job-7".to_string())));

    let second = api.render("certified script", &key).await.unwrap();
    assert_eq!(second, RenderResponse::Rejected("quota exceeded".to_string()));

    assert_eq!(
        seen.lock().unwrap()[0],
        json!({ "prompt": "certified script", "image_key": "uploads/1_me.png" })
    );
}

/// Tenet: narration audio arrives base64 encoded and is returned as bytes.
#[tokio::test]
async fn narration_decodes_audio() {
    let routes = warp::post()
        .and(warp::path!("api" / "audio"))
        .and(warp::body::json())
        .map(|body: Value| {
            assert_eq!(body["voice_id"], "Joanna");
            let audio = base64::engine::general_purpose::STANDARD.encode([0xFF_u8, 0xFB, 0x90]);
            warp::reply::json(&json!({ "audio_base64": audio }))
        });
    let api = serve!(routes);

    let narration = api.narrate("Welcome home", "Joanna").await.unwrap();
    assert_eq!(narration.voice_id, "Joanna");
    assert_eq!(narration.audio, vec![0xFF, 0xFB, 0x90]);
}

/// Tenet: the health check is served from the service root, not the API path.
#[tokio::test]
async fn health_reads_service_root() {
    let routes = warp::get()
        .and(warp::path::end())
        .map(|| warp::reply::json(&json!({ "status": "Jinko Brain Active", "version": "4.0" })));
    let api = serve!(routes);

    let health = api.health().await.unwrap();
    assert_eq!(health.status, "Jinko Brain Active");
    assert_eq!(health.version, "4.0");
}

/// Tenet: non-2xx statuses become Status errors, whatever the body says.
#[tokio::test]
async fn server_error_maps_to_status() {
    let routes = warp::post().and(warp::path!("api" / "generate")).map(|| {
        warp::reply::with_status(
            warp::reply::json(&json!({ "draft": "ignored" })),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    });
    let api = serve!(routes);

    let err = api.generate(&GenerationRequest::default()).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            endpoint: "/generate".to_string(),
            status: 500
        }
    );
}

/// Tenet: a 2xx body that does not match the contract is a Decode error.
#[tokio::test]
async fn malformed_body_maps_to_decode() {
    let routes = warp::post()
        .and(warp::path!("api" / "audit"))
        .map(|| warp::reply::json(&json!({ "verdict": "maybe" })));
    let api = serve!(routes);

    let err = api
        .audit("text", &AuditContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }), "got {err:?}");
}

/// Tenet: an unreachable service is a Request error.
#[tokio::test]
async fn unreachable_service_maps_to_request() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpVaultApi::new(&format!("http://{addr}/api")).unwrap();
    let err = api.list_vault().await.unwrap_err();
    assert!(matches!(err, ApiError::Request { .. }), "got {err:?}");
}
