//! Upload & Data Server
//!
//! HTTP API for image uploads, analysis of stored uploads and the debris
//! record catalogue. Every JSON body carries a `success` flag.

pub mod upload;

use actix_web::http::{header, StatusCode};
use actix_web::{middleware, web, App, HttpResponse, HttpServer, ResponseError};
use actix_multipart::Multipart;
use anyhow::{Context, Result};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::overlay::{render_legend, LegendEntry};
use crate::records::{
    RecordCatalogue, RecordStatistics, RecordView, RecordsError, RiskBand, WasteRecord,
};
use crate::risk::{risk_color, LabelStyle, RiskScorer};
use crate::vision::{AnalysisReport, ModelKind, YoloAnalyzer};

pub use upload::{ErrorBody, ImageEntry, StoredImage, UploadError, UploadStore, UPLOAD_FIELD};

/// Form field of the one-step upload and analysis
const ANALYZE_UPLOAD_FIELD: &str = "file";

/// State shared by all handlers
pub struct ServerState {
    pub store: UploadStore,
    pub analyzer: YoloAnalyzer,
    pub records: RecordCatalogue,
    pub label_style: LabelStyle,
    pub scorer: RiskScorer,
}

impl ServerState {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = UploadStore::open(&config.server.upload_dir, config.server.max_upload_bytes)
            .with_context(|| format!("Failed to open upload directory {:?}", config.server.upload_dir))?;

        let records = match &config.records.dataset_path {
            Some(path) => RecordCatalogue::load(path)?,
            None => {
                info!("No record dataset configured, serving an empty catalogue");
                RecordCatalogue::default()
            }
        };

        Ok(Self {
            store,
            analyzer: YoloAnalyzer::new(config.analyzer.clone()),
            records,
            label_style: config.overlay.label_style,
            scorer: RiskScorer::new(),
        })
    }
}

impl ResponseError for RecordsError {
    fn status_code(&self) -> StatusCode {
        match self {
            RecordsError::UnknownRiskLevel(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}

/// Register every route and the static upload directory
pub fn configure(cfg: &mut web::ServiceConfig, state: web::Data<ServerState>) {
    let upload_dir = state.store.dir().to_path_buf();
    cfg.app_data(state)
        .route("/api/upload", web::post().to(upload_image))
        .route("/api/images", web::get().to(list_images))
        .route("/api/images/{filename}/analyze", web::post().to(analyze_image))
        .route("/api/health", web::get().to(health))
        .route("/api/yolo-status", web::get().to(yolo_status))
        .route("/api/home", web::get().to(home))
        .route("/api/waste-data", web::get().to(list_records))
        .route("/api/waste-data/page", web::get().to(page_records))
        .route("/api/waste-data/upload", web::post().to(upload_and_analyze))
        .route("/api/waste-data/filter", web::get().to(filter_records))
        .route("/api/waste-data/labels", web::get().to(record_labels))
        .route("/api/waste-data/statistics", web::get().to(record_statistics))
        .route("/api/markers", web::get().to(map_markers))
        .service(actix_files::Files::new("/uploads", upload_dir));
}

/// Serve until the process is stopped
pub async fn run(config: &AppConfig) -> Result<()> {
    let state = web::Data::new(ServerState::from_config(config)?);
    let bind = (config.server.host.clone(), config.server.port);

    info!("Server listening on http://{}:{}", bind.0, bind.1);
    info!("Upload directory: {:?}", state.store.dir());

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(
                middleware::DefaultHeaders::new()
                    .add((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
                    .add((header::ACCESS_CONTROL_ALLOW_HEADERS, "*")),
            )
            .configure(move |cfg| configure(cfg, state))
    })
    .bind(bind.clone())
    .with_context(|| format!("Failed to bind {}:{}", bind.0, bind.1))?
    .run()
    .await
    .context("HTTP server error")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    success: bool,
    message: &'static str,
    #[serde(flatten)]
    image: StoredImage,
}

/// Store the first file sent under `field_name`
async fn receive_upload(
    state: &ServerState,
    payload: &mut Multipart,
    field_name: &str,
) -> Result<StoredImage, UploadError> {
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(|err| UploadError::Malformed(err.to_string()))?;
        if field.name() != Some(field_name) {
            while let Some(chunk) = field.next().await {
                chunk.map_err(|err| UploadError::Malformed(err.to_string()))?;
            }
            continue;
        }

        let original_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let content_type = field.content_type().map(|mime| mime.essence_str().to_string());
        UploadStore::check_content_type(content_type.as_deref())?;

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|err| UploadError::Malformed(err.to_string()))?;
            data.extend_from_slice(&chunk);
            state.store.check_size(data.len())?;
        }

        let store = state.store.clone();
        return web::block(move || store.save(&original_name, content_type.as_deref(), &data))
            .await
            .map_err(|err| UploadError::Io(std::io::Error::other(err.to_string())))?;
    }

    warn!("Upload request without an '{}' field", field_name);
    Err(UploadError::MissingFile)
}

async fn upload_image(
    state: web::Data<ServerState>,
    mut payload: Multipart,
) -> Result<HttpResponse, UploadError> {
    let image = receive_upload(&state, &mut payload, UPLOAD_FIELD).await?;
    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        message: "이미지가 성공적으로 업로드되었습니다!",
        image,
    }))
}

/// Result of the one-step upload and analysis
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadAnalysisResponse {
    success: bool,
    filename: String,
    detected_label: String,
    risk_score: f64,
    confidence: f64,
    /// Analyzer failure message; the headline fields then hold neutral defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    yolo_error: Option<String>,
    yolo_analysis: AnalysisReport,
    legend: Vec<LegendEntry>,
}

/// Store an upload and analyze it in one request. An analyzer failure still
/// answers with `success: true` and carries the reason in `yoloError`.
async fn upload_and_analyze(
    state: web::Data<ServerState>,
    query: web::Query<AnalyzeQuery>,
    mut payload: Multipart,
) -> Result<HttpResponse, UploadError> {
    let image = receive_upload(&state, &mut payload, ANALYZE_UPLOAD_FIELD).await?;
    let report = state.analyzer.analyze(&image.path, query.model).await;
    let legend = render_legend(
        &report.all_detections,
        &state.scorer,
        &risk_color,
        &|label: &str| state.label_style.apply(label),
    );

    // Failure reports already carry Unknown / 0.0 / 3.0
    Ok(HttpResponse::Ok().json(UploadAnalysisResponse {
        success: true,
        filename: image.filename,
        detected_label: report.detected_label.clone(),
        risk_score: report.risk_score,
        confidence: report.confidence,
        yolo_error: if report.success { None } else { report.error.clone() },
        yolo_analysis: report,
        legend,
    }))
}

#[derive(Debug, Serialize)]
struct ImagesResponse {
    success: bool,
    images: Vec<ImageEntry>,
}

async fn list_images(state: web::Data<ServerState>) -> Result<HttpResponse, UploadError> {
    let images = state.store.list()?;
    Ok(HttpResponse::Ok().json(ImagesResponse {
        success: true,
        images,
    }))
}

#[derive(Debug, Deserialize)]
struct AnalyzeQuery {
    #[serde(default)]
    model: ModelKind,
}

#[derive(Debug, Serialize)]
struct AnalyzeResponse {
    #[serde(flatten)]
    report: AnalysisReport,
    legend: Vec<LegendEntry>,
}

async fn analyze_image(
    state: web::Data<ServerState>,
    filename: web::Path<String>,
    query: web::Query<AnalyzeQuery>,
) -> Result<HttpResponse, UploadError> {
    let image = state.store.resolve(&filename)?;
    let report = state.analyzer.analyze(&image, query.model).await;
    let legend = render_legend(
        &report.all_detections,
        &state.scorer,
        &risk_color,
        &|label: &str| state.label_style.apply(label),
    );
    Ok(HttpResponse::Ok().json(AnalyzeResponse { report, legend }))
}

async fn yolo_status(state: web::Data<ServerState>) -> HttpResponse {
    let status = state.analyzer.status().await;
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "status": status,
    }))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "서버가 정상적으로 실행 중입니다.",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Serialize)]
struct RecordsResponse<'a> {
    success: bool,
    count: usize,
    data: Vec<RecordView<'a>>,
}

impl<'a> RecordsResponse<'a> {
    fn new<I: IntoIterator<Item = &'a WasteRecord>>(records: I) -> Self {
        let data: Vec<RecordView<'a>> = records.into_iter().map(RecordView::from).collect();
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

async fn home() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "title": "🌏 Ocean Clean AI",
        "description": "해양 쓰레기의 위험도를 분석하고 시각화하는 AI 기반 환경 플랫폼입니다.",
        "features": [
            "🚢 선박 항로 및 어업 지역 보호",
            "🐟 해양 생태계 데이터 기반 보호",
            "📷 AI 이미지 분석 + 위험도 지도 시각화",
        ],
        "imagePath": "/assets/image.png",
    }))
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    #[serde(default)]
    page: usize,
    #[serde(default = "default_page_size")]
    size: usize,
}

fn default_page_size() -> usize {
    20
}

async fn page_records(
    state: web::Data<ServerState>,
    query: web::Query<PageQuery>,
) -> HttpResponse {
    HttpResponse::Ok().json(state.records.page(query.page, query.size))
}

async fn list_records(state: web::Data<ServerState>) -> HttpResponse {
    HttpResponse::Ok().json(RecordsResponse::new(state.records.all()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordFilterQuery {
    label: Option<String>,
    risk_level: Option<String>,
}

async fn filter_records(
    state: web::Data<ServerState>,
    query: web::Query<RecordFilterQuery>,
) -> Result<HttpResponse, RecordsError> {
    let band = RiskBand::parse_filter(query.risk_level.as_deref())?;
    let matches = state.records.filter(query.label.as_deref(), band);
    Ok(HttpResponse::Ok().json(RecordsResponse::new(matches)))
}

async fn record_labels(state: web::Data<ServerState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "labels": state.records.distinct_labels(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsResponse {
    success: bool,
    total_count: usize,
    statistics: RecordStatistics,
}

async fn record_statistics(state: web::Data<ServerState>) -> HttpResponse {
    HttpResponse::Ok().json(StatisticsResponse {
        success: true,
        total_count: state.records.len(),
        statistics: state.records.statistics(),
    })
}

async fn map_markers(state: web::Data<ServerState>) -> HttpResponse {
    let (latitude, longitude) = state.records.map_center();
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "center": [latitude, longitude],
        "markers": state.records.markers(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerSettings;
    use actix_web::test;
    use serde_json::Value;
    use tempfile::TempDir;

    const BOUNDARY: &str = "debrisboundary";

    fn record(id: i64, label: &str, risk_score: f64) -> WasteRecord {
        WasteRecord {
            id,
            file_name: String::new(),
            latitude: 35.1,
            longitude: 129.1,
            label: label.to_string(),
            weight: 0.0,
            cluster: 0,
            risk_score,
            location_name: "해운대".to_string(),
            created_at: None,
            image_path: String::new(),
        }
    }

    fn state(dir: &TempDir, analyzer: AnalyzerSettings) -> web::Data<ServerState> {
        web::Data::new(ServerState {
            store: UploadStore::open(dir.path().join("uploads"), 64).unwrap(),
            analyzer: YoloAnalyzer::new(analyzer),
            records: RecordCatalogue::new(vec![
                record(1, "Plastic", 4.1),
                record(2, "Wood", 2.5),
                record(3, "Plastic", 3.2),
            ]),
            label_style: LabelStyle::Localized,
            scorer: RiskScorer::new(),
        })
    }

    #[cfg(unix)]
    fn script_analyzer(dir: &TempDir, script: &str) -> AnalyzerSettings {
        let path = dir.path().join("analyzer.sh");
        std::fs::write(&path, script).unwrap();
        AnalyzerSettings {
            python: "sh".to_string(),
            script_path: path,
            timeout_secs: 10,
            ..AnalyzerSettings::default()
        }
    }

    fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(uri: &str, body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    macro_rules! app {
        ($state:expr) => {{
            let state = $state.clone();
            test::init_service(App::new().configure(move |cfg| configure(cfg, state))).await
        }};
    }

    #[actix_web::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir, AnalyzerSettings::default()));

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[actix_web::test]
    async fn test_upload_then_list_and_serve() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir, AnalyzerSettings::default()));

        let body = multipart_body("image", "shore.png", "image/png", b"not really png");
        let resp = test::call_service(&app, upload_request("/api/upload", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let uploaded: Value = test::read_body_json(resp).await;
        assert_eq!(uploaded["success"], true);
        assert_eq!(uploaded["originalName"], "shore.png");
        assert_eq!(uploaded["size"], 14);
        let filename = uploaded["filename"].as_str().unwrap().to_string();
        assert!(filename.starts_with("image-") && filename.ends_with(".png"));

        let req = test::TestRequest::get().uri("/api/images").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed["images"][0]["filename"], filename.as_str());
        assert_eq!(listed["images"][0]["path"], format!("/uploads/{}", filename));

        let req = test::TestRequest::get()
            .uri(&format!("/uploads/{}", filename))
            .to_request();
        let served = test::call_and_read_body(&app, req).await;
        assert_eq!(&served[..], b"not really png");
    }

    #[actix_web::test]
    async fn test_upload_rejections() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir, AnalyzerSettings::default()));

        let body = multipart_body("image", "doc.txt", "text/plain", b"hello");
        let resp = test::call_service(&app, upload_request("/api/upload", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(resp).await;
        assert_eq!(err["success"], false);
        assert_eq!(err["message"], "이미지 파일만 업로드 가능합니다.");

        let body = multipart_body("image", "huge.png", "image/png", &[0u8; 65]);
        let resp = test::call_service(&app, upload_request("/api/upload", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = multipart_body("avatar", "a.png", "image/png", b"png");
        let resp = test::call_service(&app, upload_request("/api/upload", body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let err: Value = test::read_body_json(resp).await;
        assert_eq!(err["message"], "이미지 파일이 선택되지 않았습니다.");
    }

    #[actix_web::test]
    async fn test_analyze_unknown_upload_is_not_found() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir, AnalyzerSettings::default()));

        let req = test::TestRequest::post()
            .uri("/api/images/missing.jpg/analyze")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[cfg(unix)]
    const GLASS_SCRIPT: &str = "echo 'loading model'\n\
        echo '{\"success\": true, \"detected_label\": \"Glass\", \"confidence\": 1.0, \
        \"all_detections\": [{\"class\": \"Glass\", \"confidence\": 1.0, \
        \"bbox\": {\"x1\": 1, \"y1\": 2, \"x2\": 30, \"y2\": 40}}]}'\n";

    #[cfg(unix)]
    #[actix_web::test]
    async fn test_analyze_stored_upload() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir, script_analyzer(&dir, GLASS_SCRIPT));
        let stored = state.store.save("a.jpg", Some("image/jpeg"), b"jpg").unwrap();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri(&format!("/api/images/{}/analyze?model=floating", stored.filename))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["detectedLabel"], "Glass");
        assert_eq!(body["legend"][0]["text"], "유리 - 100.0%");
        assert_eq!(body["legend"][0]["swatchHex"], "#fd7e14");
    }

    #[cfg(unix)]
    #[actix_web::test]
    async fn test_upload_and_analyze_in_one_step() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir, script_analyzer(&dir, GLASS_SCRIPT)));

        let body = multipart_body("file", "bottle.jpg", "image/jpeg", b"jpg bytes");
        let req = upload_request("/api/waste-data/upload", body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["detectedLabel"], "Glass");
        assert_eq!(body["confidence"], 1.0);
        assert_eq!(body["yoloAnalysis"]["success"], true);
        assert_eq!(body["yoloAnalysis"]["allDetections"][0]["class"], "Glass");
        assert!(body.get("yoloError").is_none());
        let filename = body["filename"].as_str().unwrap();
        assert!(dir.path().join("uploads").join(filename).is_file());
    }

    #[cfg(unix)]
    #[actix_web::test]
    async fn test_upload_and_analyze_reports_analyzer_failure() {
        let dir = TempDir::new().unwrap();
        let failing = script_analyzer(&dir, "echo 'model weights missing' >&2\nexit 1\n");
        let app = app!(state(&dir, failing));

        let body = multipart_body("file", "net.png", "image/png", b"png bytes");
        let req = upload_request("/api/waste-data/upload", body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;

        assert_eq!(body["success"], true);
        assert_eq!(body["detectedLabel"], "Unknown");
        assert_eq!(body["riskScore"], 3.0);
        assert_eq!(body["confidence"], 0.0);
        let error = body["yoloError"].as_str().unwrap();
        assert!(error.contains("Python script execution failed"));
        assert!(error.contains("model weights missing"));
        assert_eq!(body["yoloAnalysis"]["success"], false);

        // The stored file survives a failed analysis
        let filename = body["filename"].as_str().unwrap();
        assert!(dir.path().join("uploads").join(filename).is_file());
    }

    #[actix_web::test]
    async fn test_upload_and_analyze_requires_file_field() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir, AnalyzerSettings::default()));

        let body = multipart_body("image", "a.png", "image/png", b"png");
        let req = upload_request("/api/waste-data/upload", body).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_home() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir, AnalyzerSettings::default()));

        let req = test::TestRequest::get().uri("/api/home").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["title"], "🌏 Ocean Clean AI");
        assert_eq!(body["features"].as_array().unwrap().len(), 3);
        assert_eq!(body["imagePath"], "/assets/image.png");
    }

    #[actix_web::test]
    async fn test_record_page_route() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir, AnalyzerSettings::default()));

        let req = test::TestRequest::get()
            .uri("/api/waste-data/page?page=1&size=2")
            .to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["content"][0]["id"], 3);
        assert_eq!(page["totalElements"], 3);
        assert_eq!(page["totalPages"], 2);
        assert_eq!(page["numberOfElements"], 1);
        assert_eq!(page["last"], true);

        let req = test::TestRequest::get().uri("/api/waste-data/page").to_request();
        let page: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(page["size"], 20);
        assert_eq!(page["content"].as_array().unwrap().len(), 3);
    }

    #[actix_web::test]
    async fn test_record_routes() {
        let dir = TempDir::new().unwrap();
        let app = app!(state(&dir, AnalyzerSettings::default()));

        let req = test::TestRequest::get().uri("/api/waste-data").to_request();
        let all: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(all["count"], 3);
        assert_eq!(all["data"][0]["labelKorean"], "플라스틱");

        let req = test::TestRequest::get()
            .uri("/api/waste-data/filter?label=Plastic&riskLevel=medium")
            .to_request();
        let filtered: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(filtered["count"], 1);
        assert_eq!(filtered["data"][0]["id"], 3);

        let req = test::TestRequest::get()
            .uri("/api/waste-data/filter?riskLevel=extreme")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/waste-data/labels").to_request();
        let labels: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(labels["labels"], serde_json::json!(["Plastic", "Wood"]));

        let req = test::TestRequest::get().uri("/api/waste-data/statistics").to_request();
        let stats: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(stats["totalCount"], 3);
        assert_eq!(stats["statistics"]["maxRiskScore"], 4.1);

        let req = test::TestRequest::get().uri("/api/markers").to_request();
        let markers: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(markers["markers"].as_array().unwrap().len(), 3);
        assert_eq!(markers["markers"][0]["color"], "#dc3545");
    }
}
