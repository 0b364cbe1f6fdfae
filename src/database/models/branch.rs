use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::OperatingHours;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub google_maps_url: Option<String>,
    pub operating_hours_start: NaiveTime,
    pub operating_hours_end: NaiveTime,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub latitude: Option<BigDecimal>,
    pub longitude: Option<BigDecimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Branch {
    pub fn operating_hours(&self) -> OperatingHours {
        OperatingHours {
            start: self.operating_hours_start,
            end: self.operating_hours_end,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchInput {
    pub name: String,
    pub address: String,
    pub google_maps_url: Option<String>,
    pub operating_hours_start: String, // HH:mm
    pub operating_hours_end: String,   // HH:mm
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub latitude: Option<BigDecimal>,
    pub longitude: Option<BigDecimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranchInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub google_maps_url: Option<String>,
    pub operating_hours_start: Option<String>,
    pub operating_hours_end: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub latitude: Option<BigDecimal>,
    pub longitude: Option<BigDecimal>,
    pub is_active: Option<bool>,
}
