//! In-process tests of the HTTP surface with canned detectors

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use brickyard_gateway::{DetectionMethod, GatewayError, ImagePayload, PieceDetector};
use brickyard_pieces::{mock_batch, Piece};
use brickyard_server::{router, AppState, ExecutionMode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const BOUNDARY: &str = "brickyard-test-boundary";

/// Answers with the mock batch and records what it was asked
#[derive(Default)]
struct RecordingDetector {
    calls: Mutex<Vec<(DetectionMethod, String)>>,
}

#[async_trait]
impl PieceDetector for RecordingDetector {
    async fn detect(
        &self,
        method: DetectionMethod,
        image: &ImagePayload,
    ) -> brickyard_gateway::Result<Vec<Piece>> {
        self.calls
            .lock()
            .unwrap()
            .push((method, image.file_name.clone()));
        Ok(mock_batch())
    }
}

struct FailingDetector;

#[async_trait]
impl PieceDetector for FailingDetector {
    async fn detect(
        &self,
        _method: DetectionMethod,
        _image: &ImagePayload,
    ) -> brickyard_gateway::Result<Vec<Piece>> {
        Err(GatewayError::MissingCredential("HUGGINGFACE_API_KEY"))
    }
}

enum Part<'a> {
    File { name: &'a str, file_name: &'a str, bytes: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File {
                name,
                file_name,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn detect_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/detect-pieces")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a];

fn image_part() -> Part<'static> {
    Part::File {
        name: "image",
        file_name: "castle.png",
        bytes: PNG,
    }
}

fn app(detector: Arc<dyn PieceDetector>, mode: ExecutionMode) -> Router {
    router(AppState::new(detector, mode, "brickyard-test"))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_reports_service() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(
        app(Arc::new(RecordingDetector::default()), ExecutionMode::Production),
        request,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "brickyard-test");
}

#[tokio::test]
async fn test_missing_image_is_bad_request() {
    for mode in [ExecutionMode::Production, ExecutionMode::Development] {
        let request = detect_request(&[Part::Text {
            name: "method",
            value: "trellis",
        }]);
        let (status, body) = send(app(Arc::new(RecordingDetector::default()), mode), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{mode}");
        assert_eq!(body["error"], "No image provided");
        assert!(body.get("message").is_none());
    }
}

#[tokio::test]
async fn test_empty_file_counts_as_missing() {
    let request = detect_request(&[Part::File {
        name: "image",
        file_name: "",
        bytes: &[],
    }]);
    let (status, _) = send(
        app(Arc::new(RecordingDetector::default()), ExecutionMode::Production),
        request,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_trellis_request_succeeds() {
    let detector = Arc::new(RecordingDetector::default());
    let request = detect_request(&[
        image_part(),
        Part::Text {
            name: "method",
            value: "trellis",
        },
    ]);
    let (status, body) = send(app(detector.clone(), ExecutionMode::Production), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["method"], "trellis");
    let pieces = body["pieces"].as_array().unwrap();
    assert_eq!(body["count"], pieces.len());
    assert_eq!(pieces.len(), 4);
    assert_eq!(pieces[0]["id"], "trellis_1");

    let calls = detector.calls.lock().unwrap();
    assert_eq!(
        calls.as_slice(),
        [(DetectionMethod::Trellis, "castle.png".to_string())]
    );
}

#[tokio::test]
async fn test_omitted_method_defaults_to_trellis() {
    let detector = Arc::new(RecordingDetector::default());
    let (status, body) = send(
        app(detector.clone(), ExecutionMode::Production),
        detect_request(&[image_part()]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["method"], "trellis");
    assert_eq!(body["count"], body["pieces"].as_array().unwrap().len());
    assert_eq!(detector.calls.lock().unwrap()[0].0, DetectionMethod::Trellis);
}

#[tokio::test]
async fn test_method_is_echoed_and_dispatched() {
    let cases = [
        ("segment-anything", DetectionMethod::SegmentAnything),
        ("yolo-lego", DetectionMethod::YoloLego),
        ("hunyuan", DetectionMethod::Trellis),
    ];
    for (requested, expected) in cases {
        let detector = Arc::new(RecordingDetector::default());
        let request = detect_request(&[
            Part::Text {
                name: "method",
                value: requested,
            },
            image_part(),
        ]);
        let (status, body) = send(app(detector.clone(), ExecutionMode::Production), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["method"], requested);
        assert_eq!(detector.calls.lock().unwrap()[0].0, expected, "{requested}");
    }
}

#[tokio::test]
async fn test_failure_in_production_is_server_error() {
    let request = detect_request(&[
        image_part(),
        Part::Text {
            name: "method",
            value: "yolo-lego",
        },
    ]);
    let (status, body) = send(app(Arc::new(FailingDetector), ExecutionMode::Production), request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Detection failed");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("HUGGINGFACE_API_KEY"));
}

#[tokio::test]
async fn test_failure_in_development_returns_mock_pieces() {
    let request = detect_request(&[
        image_part(),
        Part::Text {
            name: "method",
            value: "segment-anything",
        },
    ]);
    let (status, body) = send(app(Arc::new(FailingDetector), ExecutionMode::Development), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["method"], "mock");
    assert_eq!(body["count"], 3);
    let ids: Vec<&str> = body["pieces"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["mock_1", "mock_2", "mock_3"]);
}

#[tokio::test]
async fn test_non_multipart_body_is_a_detection_failure() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/detect-pieces")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"image":"x"}"#))
        .unwrap();
    let (status, body) = send(
        app(Arc::new(RecordingDetector::default()), ExecutionMode::Production),
        request,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Detection failed");
}
