//! `GET /` and `POST /` tests.

use axum::body::Body;
use http::{Request, StatusCode, header};

use crate::common::{Part, TestHarness, body_bytes, body_text, png, result_url};

#[tokio::test]
async fn test_index_renders_upload_form() {
    let harness = TestHarness::new();
    let resp = harness.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains("multipart/form-data"));
    assert!(html.contains("name=\"file\""));
}

#[tokio::test]
async fn test_upload_returns_diameter_and_result_image() {
    let harness = TestHarness::new();
    let resp = harness.upload("coin.png", png(64, 48, [255, 255, 255])).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains("4.17 cm"), "unexpected page: {html}");

    let url = result_url(&html);
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with("/result.jpg"));

    let image_resp = harness.get(&url).await;
    assert_eq!(image_resp.status(), StatusCode::OK);
    assert_eq!(image_resp.headers()[header::CONTENT_TYPE], "image/jpeg");

    let img = image::load_from_memory(&body_bytes(image_resp).await).unwrap();
    assert_eq!((img.width(), img.height()), (64, 48));
}

#[tokio::test]
async fn test_missing_file_field() {
    let harness = TestHarness::new();
    let resp = harness.post_form(&[Part::text("comment", "hello")]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "No file part");
}

#[tokio::test]
async fn test_non_multipart_post_has_no_file_part() {
    let harness = TestHarness::new();

    let empty = harness
        .send(Request::post("/").body(Body::empty()).unwrap())
        .await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(empty).await, "No file part");

    let urlencoded = harness
        .send(
            Request::post("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("file=coin.png"))
                .unwrap(),
        )
        .await;
    assert_eq!(urlencoded.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(urlencoded).await, "No file part");
    assert!(harness.slot_dirs().is_empty());
}

#[tokio::test]
async fn test_file_field_without_filename_is_not_a_file_part() {
    let harness = TestHarness::new();
    let resp = harness.post_form(&[Part::text("file", "just text")]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "No file part");
}

#[tokio::test]
async fn test_empty_filename_is_rejected_without_processing() {
    // The matrix is malformed: any attempt to measure would fail with a 500.
    let harness = TestHarness::with_matrix("garbage");
    let resp = harness.upload("", png(16, 16, [0, 0, 0])).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "No selected file");
    assert!(harness.slot_dirs().is_empty());
}

#[tokio::test]
async fn test_sequential_uploads_get_separate_results() {
    let harness = TestHarness::new();

    let first = body_text(harness.upload("a.png", png(40, 30, [10, 20, 30])).await).await;
    let second = body_text(harness.upload("a.png", png(90, 70, [200, 100, 0])).await).await;

    let first_url = result_url(&first);
    let second_url = result_url(&second);
    assert_ne!(first_url, second_url);
    assert_eq!(harness.slot_dirs().len(), 2);

    let first_img = image::load_from_memory(&body_bytes(harness.get(&first_url).await).await).unwrap();
    let second_img =
        image::load_from_memory(&body_bytes(harness.get(&second_url).await).await).unwrap();
    assert_eq!((first_img.width(), first_img.height()), (40, 30));
    assert_eq!((second_img.width(), second_img.height()), (90, 70));
}

#[tokio::test]
async fn test_concurrent_uploads_do_not_interfere() {
    let harness = TestHarness::new();
    let sizes = [(20, 20), (33, 17), (64, 64), (100, 12)];

    let pages = upload_concurrently(&harness, &sizes).await;
    for ((w, h), html) in sizes.iter().zip(pages) {
        let url = result_url(&html);
        let img = image::load_from_memory(&body_bytes(harness.get(&url).await).await).unwrap();
        assert_eq!((img.width(), img.height()), (*w, *h));
    }
}

async fn upload_concurrently(harness: &TestHarness, sizes: &[(u32, u32)]) -> Vec<String> {
    let mut handles = Vec::new();
    for &(w, h) in sizes {
        let router = harness.router();
        let (content_type, body) =
            crate::common::multipart_body(&[Part::file("file", "x.png", png(w, h, [1, 2, 3]))]);
        handles.push(tokio::spawn(async move {
            use tower::ServiceExt;
            let req = http::Request::post("/")
                .header(header::CONTENT_TYPE, content_type)
                .body(axum::body::Body::from(body))
                .unwrap();
            let resp = router.oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            body_text(resp).await
        }));
    }
    let mut pages = Vec::new();
    for handle in handles {
        pages.push(handle.await.unwrap());
    }
    pages
}

#[tokio::test]
async fn test_corrupt_image_is_unprocessable_and_cleaned_up() {
    let harness = TestHarness::new();
    let resp = harness.upload("broken.png", b"this is not a png".to_vec()).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_text(resp).await, "Uploaded file is not a readable image");
    assert!(harness.slot_dirs().is_empty());
}

#[tokio::test]
async fn test_malformed_calibration_is_reported() {
    let harness = TestHarness::with_matrix("1000 0 320\n");
    let resp = harness.upload("coin.png", png(32, 32, [0, 0, 0])).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_text(resp).await.starts_with("malformed calibration file"));
}

#[tokio::test]
async fn test_missing_calibration_hides_paths() {
    let mut harness = TestHarness::new();
    harness.config.calibration.camera_matrix = harness.dir.path().join("absent.txt");
    let resp = harness.upload("coin.png", png(32, 32, [0, 0, 0])).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(resp).await, "internal server error");
}

#[tokio::test]
async fn test_traversal_filename_stays_inside_upload_dir() {
    let harness = TestHarness::new();
    let resp = harness
        .upload("../../../escaped.png", png(16, 16, [5, 5, 5]))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(!harness.dir.path().join("escaped.png").exists());
    let slots = harness.slot_dirs();
    assert_eq!(slots.len(), 1);
    assert!(slots[0].join("upload.png").is_file());
    assert!(slots[0].join("result.jpg").is_file());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut harness = TestHarness::new();
    harness.config.server.max_upload_bytes = 1024;
    let resp = harness.upload("big.png", vec![0u8; 8 * 1024]).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(harness.slot_dirs().is_empty());
}

#[tokio::test]
async fn test_unit_label_follows_config() {
    let mut harness = TestHarness::new();
    harness.config.measurement.unit_label = "mm".to_string();
    harness.config.measurement.object_distance = 3200.0;
    let html = body_text(harness.upload("coin.png", png(32, 32, [0, 0, 0])).await).await;
    assert!(html.contains("41.72 mm"), "unexpected page: {html}");
}
