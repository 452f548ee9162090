//! Meeting endpoints on top of [`MeetingScheduler`].
//!
//! This layer resolves the caller's tenant, validates the request body and
//! the target product, and decorates meetings with their product and relative
//! label. Slot rules live in the scheduler.

use crate::errors::BoError;
use crate::models::{
    Identity, Meeting, MeetingListResponse, MeetingRequest, MeetingView, Product, Role,
};
use crate::repositories::Store;
use crate::services::access_filter::{check_meeting_access, check_write_ownership, narrow_products};
use crate::services::meeting_scheduler::MeetingScheduler;
use crate::services::tenancy::effective_tenant_id;
use crate::services::validation::Validator;
use chrono::{DateTime, Utc};
use common::types::{MeetingId, ProductId, TenantId};
use std::collections::BTreeMap;
use tracing::instrument;

pub const INVALID_MEETING_TIME: &str = "Meeting time must be an RFC 3339 timestamp";

fn view(scheduler: &MeetingScheduler, meeting: Meeting, product: Option<Product>) -> MeetingView {
    MeetingView {
        status: meeting.status(),
        meeting_in: scheduler.label(meeting.time),
        meeting,
        product,
    }
}

/// Validated `(product_id, time)` of a schedule or update body.
fn parse_request(request: &MeetingRequest) -> Result<(ProductId, DateTime<Utc>), BoError> {
    let mut v = Validator::new();
    if request.product_id.is_none() {
        v.push("product_id", "Product id field is empty!");
    }
    let time = v.required(request.time.as_deref(), "time", "Meeting time");
    v.finish()?;
    let (Some(product_id), Some(time)) = (request.product_id, time) else {
        return Err(BoError::invalid_field("body", "Request body is incomplete"));
    };

    let time = DateTime::parse_from_rfc3339(time)
        .map_err(|_| BoError::InvalidSchedule(INVALID_MEETING_TIME.to_string()))?
        .with_timezone(&Utc);

    Ok((product_id, time))
}

/// The meeting's product must be active and writable by the caller.
async fn load_target_product(
    store: &dyn Store,
    caller: &Identity,
    tenant: TenantId,
    product_id: ProductId,
) -> Result<Product, BoError> {
    let product = store
        .find_product(product_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| BoError::NotFound(format!("Invalid product id {}!", product_id)))?;

    check_write_ownership(caller, tenant, product.owner_tenant_id)?;
    Ok(product)
}

/// Active meetings of the caller's tenant, soonest first.
///
/// MEMBERs only see meetings on the products visible to them in the product
/// list.
#[instrument(skip_all, name = "bo.service.meeting.list")]
pub async fn list_meetings(
    store: &dyn Store,
    scheduler: &MeetingScheduler,
    caller: &Identity,
) -> Result<MeetingListResponse, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let products = narrow_products(caller, store.list_products(tenant).await?);
    let by_id: BTreeMap<ProductId, Product> = products.into_iter().map(|p| (p.id, p)).collect();

    let meetings = store
        .list_meetings(tenant)
        .await?
        .into_iter()
        .filter(|m| caller.role != Role::Member || by_id.contains_key(&m.product_id))
        .map(|m| {
            let product = by_id.get(&m.product_id).cloned();
            view(scheduler, m, product)
        })
        .collect();

    Ok(MeetingListResponse { meetings })
}

#[instrument(skip_all, name = "bo.service.meeting.get", fields(meeting_id = %id))]
pub async fn get_meeting(
    store: &dyn Store,
    scheduler: &MeetingScheduler,
    caller: &Identity,
    id: MeetingId,
) -> Result<MeetingView, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let meeting = store
        .find_meeting_by_id(id)
        .await?
        .filter(|m| m.active)
        .ok_or_else(|| BoError::NotFound(format!("Invalid meeting id {}!", id)))?;

    let tenant_products = store.list_products(tenant).await?;
    check_meeting_access(caller, tenant, &meeting, &tenant_products)?;

    let product = tenant_products
        .into_iter()
        .find(|p| p.id == meeting.product_id);
    Ok(view(scheduler, meeting, product))
}

#[instrument(skip_all, name = "bo.service.meeting.schedule")]
pub async fn schedule_meeting(
    store: &dyn Store,
    scheduler: &MeetingScheduler,
    caller: &Identity,
    request: MeetingRequest,
) -> Result<MeetingView, BoError> {
    let (product_id, time) = parse_request(&request)?;
    let tenant = effective_tenant_id(caller)?;
    let product = load_target_product(store, caller, tenant, product_id).await?;

    let meeting = scheduler.validate_and_create(product_id, time, tenant).await?;
    Ok(view(scheduler, meeting, Some(product)))
}

#[instrument(skip_all, name = "bo.service.meeting.update", fields(meeting_id = %id))]
pub async fn update_meeting(
    store: &dyn Store,
    scheduler: &MeetingScheduler,
    caller: &Identity,
    id: MeetingId,
    request: MeetingRequest,
) -> Result<MeetingView, BoError> {
    let (product_id, time) = parse_request(&request)?;
    let tenant = effective_tenant_id(caller)?;
    let product = load_target_product(store, caller, tenant, product_id).await?;

    let meeting = scheduler
        .validate_and_update(id, product_id, time, tenant)
        .await?;
    Ok(view(scheduler, meeting, Some(product)))
}

#[instrument(skip_all, name = "bo.service.meeting.disable", fields(meeting_id = %id))]
pub async fn disable_meeting(
    scheduler: &MeetingScheduler,
    caller: &Identity,
    id: MeetingId,
) -> Result<MeetingView, BoError> {
    let tenant = effective_tenant_id(caller)?;
    let meeting = scheduler.disable(caller, id, tenant).await?;
    Ok(view(scheduler, meeting, None))
}
