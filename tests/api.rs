use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use cert_registry::registry::{CertificateStore, LocalRegistry};
use cert_registry::services::api_server::{ApiServer, CALLER_HEADER};
use cert_registry::utils::crypto::hash_content;
use serde_json::Value;
use tower::ServiceExt;

const OWNER: &str = "0x00000000000000000000000000000000000000aa";
const BOUNDARY: &str = "cert-registry-test-boundary";

fn app() -> Router {
    app_with_limit(1024 * 1024)
}

fn app_with_limit(max_upload_bytes: usize) -> Router {
    let backend = Arc::new(LocalRegistry::new(Arc::new(CertificateStore::new()), OWNER));
    ApiServer::new(backend, max_upload_bytes).router()
}

fn multipart_body(fields: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        if *name == "certificate" {
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"certificate.pdf\"\r\n\
                     Content-Type: application/pdf\r\n\r\n",
                    name
                )
                .as_bytes(),
            );
        } else {
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            );
        }
        body.extend_from_slice(value);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(uri: &str, caller: Option<&str>, fields: &[(&str, &[u8])]) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );
    if let Some(caller) = caller {
        builder = builder.header(CALLER_HEADER, caller);
    }
    builder.body(Body::from(multipart_body(fields))).unwrap()
}

fn issue_request(caller: Option<&str>, participant: &str, event: &str, file: &[u8]) -> Request<Body> {
    multipart_request(
        "/api/certificates/issue",
        caller,
        &[
            ("participantName", participant.as_bytes()),
            ("eventName", event.as_bytes()),
            ("certificate", file),
        ],
    )
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn revoke_request(id: &str, caller: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/api/certificates/{}/revoke", id));
    if let Some(caller) = caller {
        builder = builder.header(CALLER_HEADER, caller);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_issue_and_verify_by_hash() {
    let app = app();
    let file = b"%PDF-1.7 Alice Contest2024";

    let (status, body) = send(&app, issue_request(Some(OWNER), "Alice", "Contest2024", file)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["certificateId"], 1);
    assert_eq!(body["certificateHash"], hash_content(file));
    assert_eq!(body["participantName"], "Alice");

    let (status, body) = send(&app, get(&format!("/api/certificates/verify/{}", hash_content(file)))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], true);
    assert_eq!(body["isValid"], true);
    assert_eq!(body["certificate"]["id"], 1);
    assert_eq!(body["certificate"]["eventName"], "Contest2024");
}

#[tokio::test]
async fn test_unknown_hash_is_not_an_error() {
    let app = app();

    let (status, body) = send(&app, get("/api/certificates/verify/zzz999")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);
    assert_eq!(body["isValid"], false);
    assert!(body.get("certificate").is_none());
}

#[tokio::test]
async fn test_names_are_trimmed() {
    let app = app();

    let (status, body) = send(&app, issue_request(Some(OWNER), "  Alice ", " Contest2024\n", b"x")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["participantName"], "Alice");
    assert_eq!(body["eventName"], "Contest2024");
}

#[tokio::test]
async fn test_verify_uploaded_file() {
    let app = app();
    let file: &[u8] = b"original certificate";
    send(&app, issue_request(Some(OWNER), "Alice", "Contest2024", file)).await;

    let (status, body) = send(
        &app,
        multipart_request("/api/certificates/verify", None, &[("certificate", file)]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isValid"], true);

    let (_, body) = send(
        &app,
        multipart_request("/api/certificates/verify", None, &[("certificate", "forged".as_bytes())]),
    )
    .await;
    assert_eq!(body["exists"], false);
}

#[tokio::test]
async fn test_duplicate_file_conflict() {
    let app = app();
    let file = b"aaa...111";

    send(&app, issue_request(Some(OWNER), "Alice", "Contest2024", file)).await;
    let (status, body) = send(&app, issue_request(Some(OWNER), "Bob", "Contest2024", file)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_hash");

    let (_, body) = send(&app, get("/api/certificates/total")).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_missing_fields_rejected() {
    let app = app();

    let (status, body) = send(&app, issue_request(Some(OWNER), "", "Contest2024", b"file")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send(
        &app,
        multipart_request(
            "/api/certificates/issue",
            Some(OWNER),
            &[
                ("participantName", "Alice".as_bytes()),
                ("eventName", "Contest2024".as_bytes()),
            ],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get("/api/certificates/total")).await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_unauthorized_issue_and_revoke() {
    let app = app();

    let (status, body) = send(&app, issue_request(None, "Alice", "Contest2024", b"file")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&app, issue_request(Some("0xbad"), "Alice", "Contest2024", b"file")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&app, get("/api/certificates/total")).await;
    assert_eq!(body["total"], 0);

    send(&app, issue_request(Some(OWNER), "Alice", "Contest2024", b"file")).await;
    let (status, _) = send(&app, revoke_request("1", Some("0xbad"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&app, get("/api/certificates/1")).await;
    assert_eq!(body["isValid"], true);
}

#[tokio::test]
async fn test_revocation_flow() {
    let app = app();
    send(&app, issue_request(Some(OWNER), "Alice", "Contest2024", b"file")).await;

    let (status, body) = send(&app, revoke_request("1", Some(OWNER))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["certificateId"], 1);
    assert_eq!(body["revoked"], true);

    let (_, body) = send(&app, get("/api/certificates/1")).await;
    assert_eq!(body["exists"], true);
    assert_eq!(body["isValid"], false);

    let (status, body) = send(&app, revoke_request("1", Some(OWNER))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_revoked");

    let (status, body) = send(&app, revoke_request("7", Some(OWNER))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (_, body) = send(&app, get("/api/certificates/total")).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_lookup_by_id_edges() {
    let app = app();

    let (status, body) = send(&app, get("/api/certificates/0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["exists"], false);

    let (status, body) = send(&app, get("/api/certificates/not-a-number")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_health_reports_backend() {
    let (status, body) = send(&app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
    assert!(body.get("owner").is_none());
}

#[tokio::test]
async fn test_health_does_not_grant_issuance() {
    let app = app();
    let (_, health) = send(&app, get("/health")).await;

    // Nothing the health endpoint returns works as a caller identity.
    for value in health.as_object().unwrap().values() {
        let caller = value.as_str().unwrap();
        let (status, _) = send(&app, issue_request(Some(caller), "Mallory", "Forged", b"forged")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    send(&app, issue_request(Some(OWNER), "Alice", "Contest2024", b"file")).await;
    for value in health.as_object().unwrap().values() {
        let (status, _) = send(&app, revoke_request("1", value.as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (_, body) = send(&app, get("/api/certificates/total")).await;
    assert_eq!(body["total"], 1);
    let (_, body) = send(&app, get("/api/certificates/1")).await;
    assert_eq!(body["isValid"], true);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let app = app_with_limit(64);
    let file = vec![b'x'; 4096];

    let (status, _) = send(&app, issue_request(Some(OWNER), "Alice", "Contest2024", &file)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, _) = send(
        &app,
        multipart_request("/api/certificates/verify", None, &[("certificate", file.as_slice())]),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (_, body) = send(&app, get("/api/certificates/total")).await;
    assert_eq!(body["total"], 0);
}
