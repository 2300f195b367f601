//! Admin management service
//!
//! Student CRUD, attendance CRUD and statistics for the dashboard. Filters
//! are passed as query parameters only when set; dates are checked locally
//! before the request is sent.

use tracing::info;
use crate::models::{
    Attendance, AttendanceFilter, AttendanceStats, CreateAttendanceRequest, Page, PageRequest,
    StatsFilter, Student, StudentFilter, StudentRegisterRequest, UpdateAttendanceRequest,
    UpdateStudentRequest,
};
use crate::state::RequestContext;
use crate::utils::errors::{ApiError, ApiResult};
use crate::utils::helpers::is_valid_api_date;
use super::api::{ApiClient, MessageResponse};

#[derive(Debug, Clone)]
pub struct AdminService {
    api: ApiClient,
}

fn page_query(page: PageRequest) -> Vec<(&'static str, String)> {
    vec![
        ("page", page.page.to_string()),
        ("limit", page.limit.to_string()),
    ]
}

fn push_opt(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        query.push((key, value.to_string()));
    }
}

fn check_date(field: &str, date: &str) -> ApiResult<()> {
    if is_valid_api_date(date) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!("{} must be formatted as YYYY-MM-DD, got {}", field, date)))
    }
}

impl AdminService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_students(&self, ctx: &RequestContext, page: PageRequest, filter: &StudentFilter) -> ApiResult<Page<Student>> {
        let mut query = page_query(page);
        push_opt(&mut query, "class", filter.class.as_deref());
        push_opt(&mut query, "grade", filter.grade.as_deref());
        push_opt(&mut query, "search", filter.search.as_deref());

        self.api.get(ctx, &["admin", "students"], &query).await
    }

    pub async fn get_student(&self, ctx: &RequestContext, id: u64) -> ApiResult<Student> {
        let id = id.to_string();
        self.api.get(ctx, &["admin", "students", id.as_str()], &[]).await
    }

    pub async fn create_student(&self, ctx: &RequestContext, request: &StudentRegisterRequest) -> ApiResult<Student> {
        let student: Student = self.api.post(ctx, &["admin", "students"], Some(request)).await?;
        info!(student_id = %student.student_id, "Student created");
        Ok(student)
    }

    pub async fn update_student(&self, ctx: &RequestContext, id: u64, update: &UpdateStudentRequest) -> ApiResult<Student> {
        let id = id.to_string();
        self.api.put(ctx, &["admin", "students", id.as_str()], Some(update)).await
    }

    pub async fn delete_student(&self, ctx: &RequestContext, id: u64) -> ApiResult<MessageResponse> {
        let id_text = id.to_string();
        let response: MessageResponse = self.api.delete(ctx, &["admin", "students", id_text.as_str()]).await?;
        info!(id, "Student deleted");
        Ok(response)
    }

    pub async fn students_by_class(&self, ctx: &RequestContext, class: &str) -> ApiResult<Vec<Student>> {
        if class.trim().is_empty() {
            return Err(ApiError::Validation("class is required".to_string()));
        }
        self.api.get(ctx, &["admin", "students", "class", class.trim()], &[]).await
    }

    pub async fn students_by_grade(&self, ctx: &RequestContext, grade: &str) -> ApiResult<Vec<Student>> {
        if grade.trim().is_empty() {
            return Err(ApiError::Validation("grade is required".to_string()));
        }
        self.api.get(ctx, &["admin", "students", "grade", grade.trim()], &[]).await
    }

    pub async fn list_attendance(&self, ctx: &RequestContext, page: PageRequest, filter: &AttendanceFilter) -> ApiResult<Page<Attendance>> {
        let mut query = page_query(page);
        push_opt(&mut query, "class", filter.class.as_deref());
        push_opt(&mut query, "grade", filter.grade.as_deref());
        if let Some(date) = filter.date.as_deref() {
            check_date("date", date)?;
            query.push(("date", date.to_string()));
        }
        if let Some(status) = filter.status {
            query.push(("status", status.as_str().to_string()));
        }

        self.api.get(ctx, &["admin", "attendance"], &query).await
    }

    pub async fn create_attendance(&self, ctx: &RequestContext, request: &CreateAttendanceRequest) -> ApiResult<Attendance> {
        check_date("date", &request.date)?;
        self.api.post(ctx, &["admin", "attendance"], Some(request)).await
    }

    pub async fn update_attendance(&self, ctx: &RequestContext, id: u64, update: &UpdateAttendanceRequest) -> ApiResult<Attendance> {
        let id = id.to_string();
        self.api.put(ctx, &["admin", "attendance", id.as_str()], Some(update)).await
    }

    /// Attendance statistics; the date range is only sent when both ends are set
    pub async fn attendance_stats(&self, ctx: &RequestContext, filter: &StatsFilter) -> ApiResult<Vec<AttendanceStats>> {
        let mut query = Vec::new();
        if let Some(student_id) = filter.student_id {
            query.push(("student_id", student_id.to_string()));
        }
        if let (Some(start), Some(end)) = (filter.start_date.as_deref(), filter.end_date.as_deref()) {
            check_date("start_date", start)?;
            check_date("end_date", end)?;
            if start > end {
                return Err(ApiError::Validation("start_date must not be after end_date".to_string()));
            }
            query.push(("start_date", start.to_string()));
            query.push(("end_date", end.to_string()));
        }

        self.api.get(ctx, &["admin", "attendance", "stats"], &query).await
    }
}
