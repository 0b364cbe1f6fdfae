use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::models::{
    Branch, CreateBranchInput, OperatingHours, Page, PageRequest, UpdateBranchInput,
};
use crate::services::error::{BookingError, BookingResult};
use crate::services::finish;
use crate::services::time_window::{parse_time, validate_operating_hours};
use crate::store::{BookingStore, StoreTx};

#[derive(Clone)]
pub struct BranchService {
    store: Arc<dyn BookingStore>,
}

impl BranchService {
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }

    pub async fn create_branch(&self, input: CreateBranchInput) -> BookingResult<Branch> {
        let hours = OperatingHours {
            start: parse_time(&input.operating_hours_start, "Operating hours start")?,
            end: parse_time(&input.operating_hours_end, "Operating hours end")?,
        };
        validate_operating_hours(hours)?;

        let now = Utc::now();
        let branch = Branch {
            id: Uuid::new_v4(),
            name: non_blank(&input.name, "Branch name")?,
            address: non_blank(&input.address, "Address")?,
            google_maps_url: input.google_maps_url,
            operating_hours_start: hours.start,
            operating_hours_end: hours.end,
            contact_phone: input.contact_phone,
            contact_email: input.contact_email,
            latitude: input.latitude,
            longitude: input.longitude,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        let result = tx.insert_branch(&branch).await.map_err(BookingError::from);
        finish(tx, result).await?;

        log::info!("Created branch {} ({})", branch.id, branch.name);
        Ok(branch)
    }

    pub async fn update_branch(&self, branch_id: Uuid, input: UpdateBranchInput) -> BookingResult<Branch> {
        let mut tx = self.store.begin().await?;
        let result = update_branch_in_tx(tx.as_mut(), branch_id, input).await;
        let branch = finish(tx, result).await?;

        log::info!("Updated branch {}", branch.id);
        Ok(branch)
    }

    /// Soft delete: the branch disappears from listings and stops accepting
    /// bookings, existing rooms keep pointing at it.
    pub async fn deactivate_branch(&self, branch_id: Uuid) -> BookingResult<Branch> {
        let mut tx = self.store.begin().await?;
        let result: BookingResult<Branch> = async {
            let mut branch = tx
                .find_branch(branch_id)
                .await?
                .ok_or(BookingError::BranchNotFound)?;
            branch.is_active = false;
            branch.updated_at = Utc::now();
            tx.update_branch(&branch).await?;
            Ok(branch)
        }
        .await;
        let branch = finish(tx, result).await?;

        log::info!("Deactivated branch {}", branch.id);
        Ok(branch)
    }

    pub async fn get_branch(&self, branch_id: Uuid) -> BookingResult<Branch> {
        let mut tx = self.store.begin().await?;
        let result: BookingResult<Branch> = async {
            tx.find_branch(branch_id)
                .await?
                .filter(|b| b.is_active)
                .ok_or(BookingError::BranchNotFound)
        }
        .await;
        finish(tx, result).await
    }

    pub async fn list_branches(&self, name: Option<String>, page: PageRequest) -> BookingResult<Page<Branch>> {
        let mut tx = self.store.begin().await?;
        let result: BookingResult<Page<Branch>> = async {
            let (branches, total) = tx.list_active_branches(name.as_deref(), page).await?;
            Ok(Page::new(branches, total, page))
        }
        .await;
        finish(tx, result).await
    }
}

fn non_blank(value: &str, field: &'static str) -> BookingResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::InvalidName(field));
    }
    Ok(trimmed.to_string())
}

async fn update_branch_in_tx(
    tx: &mut dyn StoreTx,
    branch_id: Uuid,
    input: UpdateBranchInput,
) -> BookingResult<Branch> {
    let mut branch = tx
        .find_branch(branch_id)
        .await?
        .ok_or(BookingError::BranchNotFound)?;

    if let Some(name) = input.name {
        branch.name = non_blank(&name, "Branch name")?;
    }
    if let Some(address) = input.address {
        branch.address = non_blank(&address, "Address")?;
    }
    if let Some(start) = input.operating_hours_start {
        branch.operating_hours_start = parse_time(&start, "Operating hours start")?;
    }
    if let Some(end) = input.operating_hours_end {
        branch.operating_hours_end = parse_time(&end, "Operating hours end")?;
    }
    validate_operating_hours(branch.operating_hours())?;

    if input.google_maps_url.is_some() {
        branch.google_maps_url = input.google_maps_url;
    }
    if input.contact_phone.is_some() {
        branch.contact_phone = input.contact_phone;
    }
    if input.contact_email.is_some() {
        branch.contact_email = input.contact_email;
    }
    if input.latitude.is_some() {
        branch.latitude = input.latitude;
    }
    if input.longitude.is_some() {
        branch.longitude = input.longitude;
    }
    if let Some(is_active) = input.is_active {
        branch.is_active = is_active;
    }

    branch.updated_at = Utc::now();
    tx.update_branch(&branch).await?;
    Ok(branch)
}
