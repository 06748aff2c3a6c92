//! End-to-end tests of the HTTP surface over an in-process router.

mod common;

use axum::http::{header, StatusCode};
use serde_json::json;

use common::{TestFixture, TEST_MAX_FILE_SIZE};

async fn create(fixture: &TestFixture, name: &str, details: &str) -> serde_json::Value {
    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({ "name": name, "details": details }),
        )
        .await;
    assert_status!(response, StatusCode::CREATED);
    response.body
}

// ============================================================================
// Health and config
// ============================================================================

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_exposes_vocabularies() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/config").await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["tags"][0]["id"], "faroqat");
    assert_eq!(response.body["statuses"].as_array().unwrap().len(), 3);
    assert_eq!(response.body["statuses"][1]["id"], "in-progress");
    assert_eq!(response.body["storage"]["max_file_size"], TEST_MAX_FILE_SIZE);
    assert!(response.body.get("supabase").is_none());
}

// ============================================================================
// Tickets
// ============================================================================

#[tokio::test]
async fn test_create_assigns_sequential_numbers() {
    let fixture = TestFixture::new().await;

    let first = create(&fixture, "Acme", "fix the invoice").await;
    let second = create(&fixture, "Globex", "new logo").await;

    assert_eq!(first["ticketNumber"], 1);
    assert_eq!(second["ticketNumber"], 2);
    assert_eq!(first["status"], "pending");
    assert!(!first["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejects_invalid_draft() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/tickets", json!({ "name": "  ", "details": "x" }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Company name is required");

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({ "name": "Acme", "details": "x", "tags": ["urgent"] }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let list = fixture.get("/api/v1/tickets").await;
    assert_eq!(list.body["stats"]["total"], 0);
}

#[tokio::test]
async fn test_get_returns_detail_view() {
    let fixture = TestFixture::new().await;
    let created = create(&fixture, "شركة النور", "Landing page").await;
    let id = created["id"].as_str().unwrap();

    let response = fixture.get(&format!("/api/v1/tickets/{}", id)).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["name"], "شركة النور");
    assert_eq!(response.body["nameDirection"], "rtl");
    assert_eq!(response.body["detailsDirection"], "ltr");
    assert!(response.body["attachmentViews"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_ticket_is_not_found() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/tickets/missing").await;
    assert_status!(response, StatusCode::NOT_FOUND);

    let response = fixture
        .put(
            "/api/v1/tickets/missing",
            json!({ "name": "Acme", "details": "x" }),
        )
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_keeps_number() {
    let fixture = TestFixture::new().await;
    let created = create(&fixture, "Acme", "first pass").await;
    let id = created["id"].as_str().unwrap();

    let response = fixture
        .put(
            &format!("/api/v1/tickets/{}", id),
            json!({
                "name": "Acme Corp",
                "details": "second pass",
                "status": "completed",
                "date": "2024-03-01",
                "tags": ["faroqat"]
            }),
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["ticketNumber"], 1);
    assert_eq!(response.body["name"], "Acme Corp");
    assert_eq!(response.body["status"], "completed");
    assert_eq!(response.body["tags"], json!(["faroqat"]));
}

#[tokio::test]
async fn test_list_filters_and_stats() {
    let fixture = TestFixture::new().await;
    create(&fixture, "Acme", "fix the invoice").await;
    let second = create(&fixture, "Globex", "Invoice totals differ").await;
    create(&fixture, "Initech", "printer").await;

    let id = second["id"].as_str().unwrap();
    fixture
        .put(
            &format!("/api/v1/tickets/{}", id),
            json!({
                "name": "Globex",
                "details": "Invoice totals differ",
                "status": "in-progress",
                "tags": ["faroqat"]
            }),
        )
        .await;

    let response = fixture.get("/api/v1/tickets?search=INVOICE").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["tickets"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["stats"]["total"], 3);
    assert_eq!(response.body["stats"]["in_progress"], 1);
    assert_eq!(response.body["next_ticket_number"], 4);

    let response = fixture.get("/api/v1/tickets?status=in-progress").await;
    assert_eq!(response.body["tickets"].as_array().unwrap().len(), 1);
    assert_eq!(response.body["tickets"][0]["name"], "Globex");

    let response = fixture.get("/api/v1/tickets?tag=faroqat&status=all").await;
    assert_eq!(response.body["tickets"].as_array().unwrap().len(), 1);

    let response = fixture.get("/api/v1/tickets?status=archived").await;
    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let fixture = TestFixture::new().await;
    let created = create(&fixture, "Acme", "x").await;
    let id = created["id"].as_str().unwrap();

    let response = fixture.delete(&format!("/api/v1/tickets/{}", id)).await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture.get(&format!("/api/v1/tickets/{}", id)).await;
    assert_status!(response, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_releases_stored_attachments() {
    let fixture = TestFixture::new().await;

    let upload = fixture
        .post_files("/api/v1/attachments", &[("scan.png", b"png-bytes".as_slice())])
        .await;
    assert_status!(upload, StatusCode::OK);
    let attachment = upload.body["attachments"][0].clone();
    let stored_path = attachment["path"].as_str().unwrap().to_string();

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "name": "Acme",
                "details": "x",
                "attachments": [
                    attachment,
                    { "url": "https://elsewhere.example/a.pdf", "name": "a.pdf" }
                ]
            }),
        )
        .await;
    assert_status!(response, StatusCode::CREATED);
    let id = response.body["id"].as_str().unwrap().to_string();

    let response = fixture
        .delete(&format!("/api/v1/tickets/{}?confirm=true", id))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["removed"], 1);
    assert_eq!(response.body["cleanup"]["removed"], 1);
    assert_eq!(response.body["cleanup"]["skipped"], 1);
    assert_eq!(fixture.objects.deleted_paths().await, vec![stored_path]);

    let response = fixture.get(&format!("/api/v1/tickets/{}", id)).await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_reports_cleanup_failures_as_warnings() {
    let fixture = TestFixture::new().await;
    fixture.objects.fail_delete_of("uploads/stuck.png").await;

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "name": "Acme",
                "details": "x",
                "attachments": [
                    { "url": "mock://uploads/stuck.png", "name": "stuck.png", "path": "uploads/stuck.png" }
                ]
            }),
        )
        .await;
    let id = response.body["id"].as_str().unwrap().to_string();

    let response = fixture
        .delete(&format!("/api/v1/tickets/{}?confirm=true", id))
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["removed"], 1);
    assert_eq!(response.body["cleanup"]["warnings"][0]["path"], "uploads/stuck.png");
}

#[tokio::test]
async fn test_delete_all() {
    let fixture = TestFixture::new().await;
    create(&fixture, "Acme", "x").await;
    create(&fixture, "Globex", "y").await;

    let response = fixture.delete("/api/v1/tickets?confirm=false").await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture.delete("/api/v1/tickets?confirm=true").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["removed"], 2);

    let list = fixture.get("/api/v1/tickets").await;
    assert_eq!(list.body["stats"]["total"], 0);
    assert_eq!(list.body["next_ticket_number"], 1);
}

// ============================================================================
// Attachments
// ============================================================================

#[tokio::test]
async fn test_upload_batch() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_files(
            "/api/v1/attachments",
            &[("a.png", b"first".as_slice()), ("notes.pdf", b"second".as_slice())],
        )
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["attachments"].as_array().unwrap().len(), 2);
    assert_eq!(response.body["attachments"][1]["name"], "notes.pdf");
    assert_eq!(
        fixture.objects.uploaded_names().await,
        vec!["a.png".to_string(), "notes.pdf".to_string()]
    );
}

#[tokio::test]
async fn test_oversized_file_stops_batch() {
    let fixture = TestFixture::new().await;
    let big = vec![0u8; (TEST_MAX_FILE_SIZE + 1) as usize];

    let response = fixture
        .post_files(
            "/api/v1/attachments",
            &[("a.txt", b"small".as_slice()), ("big.zip", big.as_slice()), ("c.txt", b"never".as_slice())],
        )
        .await;

    assert_status!(response, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(response.body["error"]
        .as_str()
        .unwrap()
        .contains("too large"));
    assert_eq!(response.body["uploaded"].as_array().unwrap().len(), 1);
    assert_eq!(fixture.objects.uploaded_names().await, vec!["a.txt".to_string()]);
}

#[tokio::test]
async fn test_backend_failure_is_bad_gateway() {
    let fixture = TestFixture::new().await;
    fixture.objects.fail_upload_of("broken.png").await;

    let response = fixture
        .post_files("/api/v1/attachments", &[("broken.png", b"x".as_slice())])
        .await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert!(response.body.get("uploaded").is_none());
}

#[tokio::test]
async fn test_upload_without_files() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_files("/api/v1/attachments", &[]).await;

    assert_status!(response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remove_attachment() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .delete_with_body(
            "/api/v1/attachments",
            json!({ "url": "mock://uploads/a.png", "name": "a.png", "path": "uploads/a.png" }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["removed"], 1);

    let response = fixture
        .delete_with_body(
            "/api/v1/attachments",
            json!({ "url": "https://elsewhere.example/b.pdf", "name": "b.pdf" }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["skipped"], 1);

    assert_eq!(
        fixture.objects.deleted_paths().await,
        vec!["uploads/a.png".to_string()]
    );
}

#[tokio::test]
async fn test_fs_storage_serves_uploaded_files() {
    let fixture = TestFixture::with_fs_storage().await;

    let response = fixture
        .post_files("/api/v1/attachments", &[("readme.txt", b"hello files".as_slice())])
        .await;
    assert_status!(response, StatusCode::OK);

    let url = response.body["attachments"][0]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/files/uploads/"));
    assert!(url.ends_with(".txt"));

    let response = fixture.get(&url).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.text, "hello files");
}

// ============================================================================
// Import / export
// ============================================================================

#[tokio::test]
async fn test_import_chat_export_numbers_after_existing() {
    let fixture = TestFixture::new().await;
    create(&fixture, "Acme", "x").await;

    let export = json!({
        "messages": [
            { "type": "message", "text": "اسم الشركة: Globex\nhttps://globex.example/brief\nتصميم شعار", "date": "2024-02-03T10:00:00" },
            { "type": "service", "text": "joined" },
            { "type": "message", "text": "" },
            { "type": "message", "text": ["Initech ", { "type": "bold", "text": "printer" }] }
        ]
    });

    let response = fixture
        .post_raw("/api/v1/import", export.to_string().as_bytes())
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["imported"], 2);

    let list = fixture.get("/api/v1/tickets").await;
    let tickets = list.body["tickets"].as_array().unwrap();
    let globex = tickets
        .iter()
        .find(|t| t["name"] == "Globex")
        .expect("imported ticket");
    assert_eq!(globex["link"], "https://globex.example/brief");
    assert_eq!(globex["date"], "2024-02-03");
    assert!(globex["ticketNumber"].as_u64().unwrap() >= 2);
    assert_eq!(list.body["stats"]["total"], 3);
}

#[tokio::test]
async fn test_import_with_nothing_recognizable() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post_raw("/api/v1/import", br#"{"messages": []}"#)
        .await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["imported"], 0);
    assert!(!response.body["notice"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_import_large_chat_export() {
    let fixture = TestFixture::new().await;
    let details = "تفاصيل الطلب ".repeat(40);
    let messages: Vec<serde_json::Value> = (0..3000)
        .map(|i| {
            json!({
                "type": "message",
                "text": format!("اسم الشركة: Client {}\n{}", i, details),
                "date": "2024-02-03T10:00:00"
            })
        })
        .collect();
    let body = json!({ "messages": messages }).to_string();
    assert!(body.len() > 2 * 1024 * 1024);

    let response = fixture.post_raw("/api/v1/import", body.as_bytes()).await;

    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["imported"], 3000);
}

#[tokio::test]
async fn test_import_invalid_json() {
    let fixture = TestFixture::new().await;

    let response = fixture.post_raw("/api/v1/import", b"{not json".as_slice()).await;

    assert_status!(response, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_export_then_import_round_trip() {
    let source = TestFixture::new().await;
    create(&source, "Acme", "fix the invoice").await;
    create(&source, "شركة النور", "تحديث الموقع").await;

    let export = source.get("/api/v1/export").await;
    assert_status!(export, StatusCode::OK);
    let disposition = export.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"tickets-backup-"));
    assert_eq!(export.body.as_array().unwrap().len(), 2);

    let target = TestFixture::new().await;
    let response = target
        .post_raw("/api/v1/import", export.text.as_bytes())
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["imported"], 2);

    let list = target.get("/api/v1/tickets?search=invoice").await;
    assert_eq!(list.body["tickets"][0]["name"], "Acme");
}

// ============================================================================
// Metrics
// ============================================================================

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new().await;
    create(&fixture, "Acme", "x").await;

    let response = fixture.get("/metrics").await;

    assert_status!(response, StatusCode::OK);
    assert!(response.text.contains("ticketdesk_http_requests_total"));
    assert!(response.text.contains("ticketdesk_tickets_by_status"));
}
