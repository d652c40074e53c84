//! The UI surface: a small actix-web app serving the upload page and driving
//! the one `ClientSession` from its handlers

use crate::error::ClientError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use std::collections::HashMap;

pub mod page;
pub mod routes;

#[derive(Debug)]
pub struct WebError {
    err: anyhow::Error,
    status: StatusCode,
}

impl WebError {
    pub fn new(err: anyhow::Error, status: StatusCode) -> Self {
        WebError { err, status }
    }
}

impl std::fmt::Display for WebError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.err)
    }
}

impl actix_web::error::ResponseError for WebError {
    fn error_response(&self) -> HttpResponse {
        let err = HashMap::from([("errors", vec![self.to_string()])]);

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(err)
    }

    fn status_code(&self) -> StatusCode {
        self.status
    }
}

impl From<anyhow::Error> for WebError {
    fn from(err: anyhow::Error) -> WebError {
        WebError {
            err,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ClientError> for WebError {
    fn from(err: ClientError) -> Self {
        let status = if err.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        WebError {
            err: err.into(),
            status,
        }
    }
}
