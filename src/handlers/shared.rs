use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

use crate::database::models::PageRequest;
use crate::services::BookingError;
use crate::services::time_window::parse_date;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: Option<T>, message: &str) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.to_string()),
        }
    }
}

impl ApiResponse<()> {
    // Error response (no data)
    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(data))
}

pub fn created<T: Serialize>(data: T, message: &str) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::success_with_message(Some(data), message))
}

/// Builds a page request from optional `page`/`size` query parameters.
pub fn page_request(page: Option<u32>, size: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest::new(page.unwrap_or(defaults.page), size.unwrap_or(defaults.size))
}

/// Parses an optional `yyyy-MM-dd` query value, ignoring blanks.
pub fn optional_date(value: Option<&str>) -> Result<Option<chrono::NaiveDate>, BookingError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(parse_date)
        .transpose()
}

/// Parses an optional status filter case-insensitively, ignoring blanks.
pub fn optional_status<S: std::str::FromStr>(value: Option<&str>) -> Result<Option<S>, BookingError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<S>().map_err(|_| BookingError::InvalidStatus(v.to_string())))
        .transpose()
}
