//! REST wrapper around the scrape pipeline.
//!
//! Runs the orchestrator as a background task and exposes start/status/
//! download endpoints; no scraping logic lives here.

use crate::commands::ScrapeCommand;
use crate::config::Config;
use crate::progress::ProgressTracker;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

/// Shared server state: config, the progress channel, and a one-run-at-a-
/// time latch.
pub struct ServeState {
    config: Config,
    tracker: ProgressTracker,
    running: AtomicBool,
}

impl ServeState {
    fn new(config: Config) -> Self {
        Self { config, tracker: ProgressTracker::new(), running: AtomicBool::new(false) }
    }
}

const INDEX_HTML: &str = r#"<!doctype html>
<html><head><title>catalog-crawler</title></head>
<body>
<h1>catalog-crawler</h1>
<p>POST /api/scrape to start a run, then poll GET /api/status.</p>
<ul>
  <li><a href="/api/status">status</a></li>
  <li><a href="/api/products">products</a></li>
  <li><a href="/api/download/csv">download CSV</a></li>
  <li><a href="/api/download/json">download JSON</a></li>
</ul>
</body></html>
"#;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(INDEX_HTML)
}

#[post("/api/scrape")]
async fn start_scrape(state: web::Data<ServeState>) -> impl Responder {
    if state.running.swap(true, Ordering::SeqCst) {
        return HttpResponse::Conflict()
            .json(serde_json::json!({"error": "Scrape already in progress"}));
    }

    let task_state = state.clone();
    tokio::spawn(async move {
        let cmd =
            ScrapeCommand::with_progress(task_state.config.clone(), task_state.tracker.clone());
        match cmd.execute().await {
            Ok(summary) => info!("Scrape finished:\n{}", summary),
            Err(e) => error!("Scrape failed: {:#}", e),
        }
        task_state.running.store(false, Ordering::SeqCst);
    });

    HttpResponse::Ok().json(serde_json::json!({"status": "started"}))
}

#[get("/api/status")]
async fn status(state: web::Data<ServeState>) -> impl Responder {
    let snapshot = state.tracker.snapshot();
    HttpResponse::Ok().json(serde_json::json!({
        "is_running": state.running.load(Ordering::SeqCst),
        "progress": snapshot,
    }))
}

#[get("/api/products")]
async fn products(state: web::Data<ServeState>) -> impl Responder {
    let records = std::fs::read_to_string(state.config.json_path())
        .ok()
        .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok())
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));

    HttpResponse::Ok().json(serde_json::json!({ "products": records }))
}

#[get("/api/download/{kind}")]
async fn download(state: web::Data<ServeState>, kind: web::Path<String>) -> impl Responder {
    let (path, content_type) = match kind.as_str() {
        "csv" => (state.config.csv_path(), "text/csv"),
        "json" => (state.config.json_path(), "application/json"),
        _ => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({"error": "Invalid file type, use csv or json"}));
        }
    };

    let filename =
        path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();

    match std::fs::read(&path) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(content_type)
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", filename),
            ))
            .body(bytes),
        Err(_) => HttpResponse::NotFound().json(serde_json::json!({"error": "File not found"})),
    }
}

/// Starts the web UI, blocking until the server shuts down.
pub async fn run(config: Config, bind: &str) -> Result<()> {
    let state = web::Data::new(ServeState::new(config));

    info!("Web UI listening on http://{}", bind);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(index)
            .service(start_scrape)
            .service(status)
            .service(products)
            .service(download)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
