//! Meeting scheduling.
//!
//! A meeting moves `Proposed -> Active -> Disabled`. A proposal becomes
//! Active only if its time is strictly in the future and no other active
//! meeting of the tenant holds the exact same `(product, time)` slot.
//! Disabled is terminal.
//!
//! The slot check is read-then-write without a lock: two concurrent requests
//! for the same slot can both pass it.

use crate::clock::Clock;
use crate::errors::BoError;
use crate::models::{Identity, Meeting, NewMeeting};
use crate::observability::metrics::record_meeting_schedule;
use crate::repositories::Store;
use crate::services::access_filter::{check_write_ownership, PERMISSION_DENIED};
use chrono::{DateTime, Datelike, Utc};
use common::types::{MeetingId, ProductId, TenantId};
use std::sync::Arc;
use tracing::instrument;

pub const MEETING_IN_PAST: &str = "Meeting time must be in the future";
pub const MEETING_ALREADY_SCHEDULED: &str = "Meeting already scheduled";

pub struct MeetingScheduler {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl MeetingScheduler {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Future-time and slot checks shared by create and update.
    async fn check_slot(
        &self,
        operation: &str,
        product_id: ProductId,
        time: DateTime<Utc>,
        tenant: TenantId,
    ) -> Result<(), BoError> {
        if time <= self.clock.now() {
            record_meeting_schedule(operation, "past");
            return Err(BoError::InvalidSchedule(MEETING_IN_PAST.to_string()));
        }

        if self.store.find_meeting(product_id, time, tenant).await?.is_some() {
            tracing::debug!(
                target: "bo.services.scheduler",
                product_id = %product_id,
                tenant = %tenant,
                "Slot already taken"
            );
            record_meeting_schedule(operation, "conflict");
            return Err(BoError::Conflict(MEETING_ALREADY_SCHEDULED.to_string()));
        }

        Ok(())
    }

    /// Validate a proposal and persist it as an Active meeting.
    #[instrument(skip_all, name = "bo.scheduler.create", fields(product_id = %product_id, tenant = %tenant))]
    pub async fn validate_and_create(
        &self,
        product_id: ProductId,
        time: DateTime<Utc>,
        tenant: TenantId,
    ) -> Result<Meeting, BoError> {
        self.check_slot("create", product_id, time, tenant).await?;

        let meeting = self
            .store
            .create_meeting(NewMeeting {
                product_id,
                time,
                owner_tenant_id: tenant,
            })
            .await?;

        record_meeting_schedule("create", "success");
        tracing::info!(target: "bo.services.scheduler", meeting_id = %meeting.id, "Meeting scheduled");
        Ok(meeting)
    }

    /// Move an Active meeting to a new product and time.
    ///
    /// The meeting's own current slot is not excluded from the conflict
    /// check, so saving it again with an unchanged time is a conflict.
    #[instrument(skip_all, name = "bo.scheduler.update", fields(meeting_id = %meeting_id, tenant = %tenant))]
    pub async fn validate_and_update(
        &self,
        meeting_id: MeetingId,
        product_id: ProductId,
        time: DateTime<Utc>,
        tenant: TenantId,
    ) -> Result<Meeting, BoError> {
        let mut meeting = self
            .store
            .find_meeting_by_id(meeting_id)
            .await?
            .filter(|m| m.active)
            .ok_or_else(|| BoError::NotFound(format!("Invalid meeting id {}!", meeting_id)))?;

        if meeting.owner_tenant_id != tenant {
            record_meeting_schedule("update", "denied");
            return Err(BoError::PermissionDenied(PERMISSION_DENIED.to_string()));
        }

        self.check_slot("update", product_id, time, tenant).await?;

        meeting.product_id = product_id;
        meeting.time = time;
        let meeting = self.store.update_meeting(&meeting).await?;

        record_meeting_schedule("update", "success");
        Ok(meeting)
    }

    /// Active -> Disabled. Disabling an already disabled meeting succeeds and
    /// leaves it unchanged.
    #[instrument(skip_all, name = "bo.scheduler.disable", fields(meeting_id = %meeting_id, tenant = %tenant))]
    pub async fn disable(
        &self,
        caller: &Identity,
        meeting_id: MeetingId,
        tenant: TenantId,
    ) -> Result<Meeting, BoError> {
        let mut meeting = self
            .store
            .find_meeting_by_id(meeting_id)
            .await?
            .ok_or_else(|| BoError::NotFound(format!("Invalid meeting id {}!", meeting_id)))?;

        if let Err(e) = check_write_ownership(caller, tenant, meeting.owner_tenant_id) {
            record_meeting_schedule("disable", "denied");
            return Err(e);
        }

        if !meeting.active {
            record_meeting_schedule("disable", "noop");
            return Ok(meeting);
        }

        meeting.active = false;
        let meeting = self.store.update_meeting(&meeting).await?;

        record_meeting_schedule("disable", "success");
        Ok(meeting)
    }

    /// Relative label for `meeting_time` as seen from the clock's now.
    pub fn label(&self, meeting_time: DateTime<Utc>) -> String {
        relative_label(meeting_time, self.clock.now())
    }
}

/// Short human label for how far ahead `meeting_time` is.
///
/// Tiers, first match wins:
/// 1. same calendar day: `In {m} minutes` under an hour, else `In {h} hours`
/// 2. next calendar day: `Tomorrow`
/// 3. same calendar month: `in {d} days`
/// 4. next calendar month: `Next month`
/// 5. otherwise `M/D/YYYY`
///
/// Days and months compare calendar fields (UTC), so 23:00 -> 01:00 the next
/// morning is `Tomorrow`. Minutes and hours are floored elapsed time.
pub fn relative_label(meeting_time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let day_delta = (meeting_time.date_naive() - now.date_naive()).num_days();
    let month_delta = (i64::from(meeting_time.year()) - i64::from(now.year())) * 12
        + i64::from(meeting_time.month())
        - i64::from(now.month());

    if day_delta == 0 {
        let elapsed_secs = (meeting_time - now).num_seconds();
        let minutes = elapsed_secs.div_euclid(60);
        if minutes < 60 {
            format!("In {} minutes", minutes)
        } else {
            format!("In {} hours", elapsed_secs.div_euclid(3600))
        }
    } else if day_delta == 1 {
        "Tomorrow".to_string()
    } else if month_delta == 0 {
        format!("in {} days", day_delta)
    } else if month_delta == 1 {
        "Next month".to_string()
    } else {
        meeting_time.format("%-m/%-d/%Y").to_string()
    }
}
