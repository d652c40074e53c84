//! A stand-in analysis service for tests

use crate::protocol::AnalysisRequest;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use base64::{engine::general_purpose, Engine as _};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Decides the reply to one request from the decoded image bytes:
/// `(status, body, delay in ms)`
pub type Responder = fn(&[u8]) -> (u16, Value, u64);

/// A request the fake service received
#[derive(Debug, Clone)]
pub struct Recorded {
    pub content_type: String,
    pub image: Vec<u8>,
}

pub struct FakeService {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeService {
    /// Start the service on a free local port. It lives as long as the test
    /// runtime does
    pub fn spawn(responder: Responder) -> FakeService {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        let server = HttpServer::new(move || {
            let recorded = recorded.clone();
            App::new().default_service(web::to(
                move |req: HttpRequest, body: web::Json<AnalysisRequest>| {
                    let recorded = recorded.clone();
                    async move {
                        let image = general_purpose::STANDARD
                            .decode(&body.image)
                            .unwrap_or_default();
                        let content_type = req
                            .headers()
                            .get(CONTENT_TYPE)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        let (status, reply, delay) = responder(&image);
                        recorded.lock().unwrap().push(Recorded {
                            content_type,
                            image,
                        });

                        actix_web::rt::time::sleep(Duration::from_millis(delay)).await;
                        HttpResponse::build(StatusCode::from_u16(status).unwrap()).json(reply)
                    }
                },
            ))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());

        FakeService { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}/analyze", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}
