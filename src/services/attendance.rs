//! Student daily attendance service

use tracing::info;
use serde::Serialize;
use crate::models::{Attendance, AttendanceReceipt, Page, PageRequest};
use crate::state::RequestContext;
use crate::utils::errors::{ApiError, ApiResult};
use crate::utils::helpers::is_valid_month;
use super::api::ApiClient;

#[derive(Debug, Serialize)]
struct CheckInRequest<'a> {
    subject: &'a str,
}

#[derive(Debug, Clone)]
pub struct AttendanceService {
    api: ApiClient,
}

impl AttendanceService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Record arrival for today
    pub async fn check_in(&self, ctx: &RequestContext, subject: &str) -> ApiResult<AttendanceReceipt> {
        let request = CheckInRequest { subject: subject.trim() };
        let receipt: AttendanceReceipt = self
            .api
            .post(ctx, &["student", "checkin"], Some(&request))
            .await?;
        info!(attendance_id = receipt.attendance.id, status = %receipt.attendance.status, "Checked in");
        Ok(receipt)
    }

    /// Record departure for today
    pub async fn check_out(&self, ctx: &RequestContext) -> ApiResult<AttendanceReceipt> {
        let receipt: AttendanceReceipt = self
            .api
            .post::<(), _>(ctx, &["student", "checkout"], None)
            .await?;
        info!(attendance_id = receipt.attendance.id, "Checked out");
        Ok(receipt)
    }

    /// The signed-in student's own records, optionally limited to a `YYYY-MM` month
    pub async fn my_attendance(&self, ctx: &RequestContext, page: PageRequest, month: Option<&str>) -> ApiResult<Page<Attendance>> {
        let mut query = vec![
            ("page", page.page.to_string()),
            ("limit", page.limit.to_string()),
        ];

        if let Some(month) = month {
            if !is_valid_month(month) {
                return Err(ApiError::Validation(format!(
                    "Month must be formatted as YYYY-MM, got {}",
                    month
                )));
            }
            query.push(("month", month.to_string()));
        }

        self.api.get(ctx, &["student", "attendance"], &query).await
    }
}
