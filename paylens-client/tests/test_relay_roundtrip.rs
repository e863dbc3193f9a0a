use actix_web::{web, App, HttpResponse, HttpServer};
use paylens_client::{bind_relay, AnalysisClient, RelayConfig};
use paylens_core::error::NO_TRANSACTIONS_MESSAGE;
use paylens_core::AnalysisError;
use paylens_ingest::UploadCandidate;
use serde_json::json;
use std::net::SocketAddr;

/// Stand-in for the statement parser: accepts the `file` part and answers
/// with a one-transaction analysis, or the no-transactions error for files
/// named `empty*`.
async fn fake_analyze(body: web::Bytes) -> HttpResponse {
    let text = String::from_utf8_lossy(&body);
    if !text.contains("name=\"file\"") {
        return HttpResponse::BadRequest().json(json!({"error": "No file provided"}));
    }
    if text.contains("filename=\"empty") {
        return HttpResponse::InternalServerError().json(json!({"error": "No transactions found"}));
    }
    HttpResponse::Ok().json(json!({
        "transactions": [
            {"date": "2024-03-02", "amount": -120.0, "description": "Paid to METRO", "category": "Transportation"}
        ],
        "summary": {"totalReceived": 0.0, "totalSpent": -120.0, "balance": -120.0,
                    "creditCount": 0, "debitCount": 1, "totalTransactions": 1},
        "categoryBreakdown": {"Transportation": {"amount": 120.0, "percentage": 100.0, "count": 1}},
        "pageCount": 1
    }))
}

fn start_backend() -> SocketAddr {
    let server = HttpServer::new(|| App::new().route("/analyze-statement", web::post().to(fake_analyze)))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    addr
}

fn start_relay(backend: SocketAddr) -> SocketAddr {
    let mut config = RelayConfig::new(format!("http://{backend}"));
    config.port = 0;
    let (server, addr) = bind_relay(&config).unwrap();
    actix_web::rt::spawn(server);
    addr
}

fn client_for(relay: SocketAddr) -> AnalysisClient {
    AnalysisClient::new(&format!("http://{relay}/api/analyze-statement")).unwrap()
}

#[actix_web::test]
async fn test_upload_through_relay_decodes_analysis() {
    let relay = start_relay(start_backend());
    let pdf = UploadCandidate::new("march.pdf", "application/pdf", b"%PDF-1.4 fake".to_vec());

    let result = client_for(relay).post_statement(&pdf).await.unwrap();
    assert_eq!(result.transactions.len(), 1);
    assert_eq!(result.transactions[0].category, "Transportation");
    assert_eq!(result.page_count, 1);
}

#[actix_web::test]
async fn test_backend_error_is_passed_through() {
    let relay = start_relay(start_backend());
    let pdf = UploadCandidate::new("empty.pdf", "application/pdf", b"%PDF-1.4".to_vec());

    let err = client_for(relay).post_statement(&pdf).await.unwrap_err();
    assert_eq!(
        err,
        AnalysisError::Backend {
            status: Some(500),
            message: "No transactions found".into()
        }
    );
    assert_eq!(err.user_message(), NO_TRANSACTIONS_MESSAGE);
}

#[actix_web::test]
async fn test_health_on_running_relay() {
    let relay = start_relay(start_backend());
    let body: serde_json::Value = reqwest::get(format!("http://{relay}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"status": "healthy", "message": "Service is running"}));
}
