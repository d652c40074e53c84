//! Handlers behind the upload page. Each one is a thin shim over
//! `ClientSession`; the page's script only moves bytes and swaps markup

use super::page;
use super::WebError;
use crate::config::Settings;
use crate::selection::FileInput;
use crate::session::ClientSession;
use actix_web::http::header::{ContentType, CONTENT_TYPE};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use anyhow::anyhow;
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

type Result<T> = std::result::Result<T, WebError>;

/// Header carrying the picked file's name
pub const FILE_NAME_HEADER: &str = "x-file-name";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(select)
        .service(analyze)
        .service(results)
        .service(session_state);
}

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

/// The upload page
#[get("/")]
pub async fn index(
    session: web::Data<ClientSession>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page::render(&session.view(), &session.results_html(), &settings))
}

/// Stage a file. The body is the raw file, `Content-Type` its type.
/// Oversized or broken uploads answer with the same `{"errors": [...]}` body
/// as every other rejected selection
#[post("/select")]
pub async fn select(
    req: HttpRequest,
    body: std::result::Result<web::Bytes, actix_web::Error>,
    session: web::Data<ClientSession>,
) -> Result<impl Responder> {
    let body = body.map_err(|err| {
        warn!("rejected upload: {err}");
        let status = err.as_response_error().status_code();
        WebError::new(anyhow!("image upload rejected: {err}"), status)
    })?;
    let content_type = header(&req, CONTENT_TYPE.as_str());
    let name = header(&req, FILE_NAME_HEADER)
        .map(|name| percent_decode_str(&name).decode_utf8_lossy().into_owned())
        .unwrap_or_else(|| "upload".into());
    debug!("select {name} ({content_type:?}, {} bytes)", body.len());

    let input =
        (!body.is_empty()).then(|| FileInput::from_bytes(name, content_type, body.to_vec()));
    session.select_file(input).await?;

    Ok(web::Json(session.view()))
}

/// Analyze the staged image. Failures are rendered into the results, so
/// this always answers with the results fragment
#[post("/analyze")]
pub async fn analyze(session: web::Data<ClientSession>) -> HttpResponse {
    if session.analyze().await.is_none() {
        debug!("analyze requested with nothing staged");
    }

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(session.results_html())
}

#[get("/results")]
pub async fn results(session: web::Data<ClientSession>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(session.results_html())
}

#[get("/state")]
pub async fn session_state(session: web::Data<ClientSession>) -> impl Responder {
    web::Json(session.view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::AnalysisClient;
    use crate::selection::tests::png_bytes;
    use crate::testing::FakeService;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};

    fn settings(endpoint: &str) -> Settings {
        Settings {
            endpoint: endpoint.into(),
            bucket: "test-bucket".into(),
            region: "eu-west-1".into(),
            listen_port: 0,
            log: "debug".into(),
        }
    }

    macro_rules! app {
        ($endpoint:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(ClientSession::new(AnalysisClient::new(
                        $endpoint,
                    ))))
                    .app_data(web::Data::new(settings(&$endpoint)))
                    .app_data(web::PayloadConfig::new(64 * 1024))
                    .configure(configure),
            )
            .await
        };
    }

    fn select_png(bytes: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/select")
            .insert_header((CONTENT_TYPE, "image/png"))
            .insert_header((FILE_NAME_HEADER, "cat.png"))
            .set_payload(bytes)
    }

    #[actix_web::test]
    async fn test_index() {
        let app = app!("http://127.0.0.1:1/analyze".to_string());

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(r#"id="drop-area""#));
        assert!(html.contains(r#"id="analyze-btn" class="btn btn-primary" disabled"#));
        assert!(html.contains("test-bucket"));
    }

    #[actix_web::test]
    async fn test_select_rejects_non_images() {
        let app = app!("http://127.0.0.1:1/analyze".to_string());

        let req = test::TestRequest::post()
            .uri("/select")
            .insert_header((CONTENT_TYPE, "text/plain"))
            .set_payload("hello")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({"errors": ["Please select an image file"]}));

        // An empty body is a missing file
        let req = test::TestRequest::post()
            .uri("/select")
            .insert_header((CONTENT_TYPE, "image/png"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/state").to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["phase"], "Idle");
        assert_eq!(state["trigger_enabled"], false);
    }

    #[actix_web::test]
    async fn test_select_then_analyze() {
        let service = FakeService::spawn(|_| {
            (200, json!({"labels": [{"Name": "Cat", "Confidence": 87.6}]}), 0)
        });
        let app = app!(service.url());

        let req = select_png(png_bytes(2, 2)).to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["phase"], "Previewing");
        assert_eq!(state["file_name"], "cat.png");
        assert_eq!(state["trigger_enabled"], true);
        assert_eq!(state["preview"]["width"], 2);

        let req = test::TestRequest::post().uri("/analyze").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(String::from_utf8_lossy(&body).contains("<strong>Cat</strong> (88%)"));

        let req = test::TestRequest::get().uri("/results").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(String::from_utf8_lossy(&body).contains("width: 88%"));
    }

    #[actix_web::test]
    async fn test_analyze_http_error() {
        let service = FakeService::spawn(|_| (503, json!({}), 0));
        let app = app!(service.url());

        test::call_service(&app, select_png(vec![1, 2, 3]).to_request()).await;

        let req = test::TestRequest::post().uri("/analyze").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("HTTP error! status: 503"));

        let req = test::TestRequest::get().uri("/state").to_request();
        let state: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(state["phase"], "Errored");
        assert_eq!(state["loading"], false);
        assert_eq!(state["trigger_enabled"], true);
    }

    #[actix_web::test]
    async fn test_state_route() {
        let app = app!("http://127.0.0.1:1/analyze".to_string());

        let req = test::TestRequest::get().uri("/state").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let view: Value = test::read_body_json(resp).await;
        assert_eq!(view["phase"], "Idle");
        assert_eq!(view["loading"], false);
    }

    #[actix_web::test]
    async fn test_select_decodes_file_name() {
        let app = app!("http://127.0.0.1:1/analyze".to_string());

        let req = select_png(png_bytes(1, 1))
            .insert_header((FILE_NAME_HEADER, "my%20cat%C3%A9.png"))
            .to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["file_name"], "my caté.png");

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert!(String::from_utf8_lossy(&body).contains("my caté.png"));
    }

    #[actix_web::test]
    async fn test_select_oversized_upload() {
        let app = app!("http://127.0.0.1:1/analyze".to_string());

        let resp = test::call_service(&app, select_png(vec![0; 128 * 1024]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = test::read_body_json(resp).await;
        let message = body["errors"][0].as_str().unwrap();
        assert!(message.starts_with("image upload rejected"), "{message}");

        let req = test::TestRequest::get().uri("/state").to_request();
        let view: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(view["phase"], "Idle");
        assert_eq!(view["trigger_enabled"], false);
    }
}
