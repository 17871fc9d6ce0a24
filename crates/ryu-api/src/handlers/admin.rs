//! Admin handlers: platform stats, customer/candidate management, and the
//! platform-wide settings documents.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use ryu_models::{
    Application, Job, NotificationSettings, Role, SecuritySettings, SystemSettings, UserPublic,
};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Admin dashboard stats.
///
/// `total_views` and `total_profit` mirror the dashboard's placeholder
/// semantics: applications stand in for views, and profit is a flat rate
/// per recruiter.
#[derive(Serialize)]
pub struct AdminStatsResponse {
    pub total_views: u64,
    pub total_profit: u64,
    pub total_product: u64,
    pub total_users: u64,
    pub total_recruiters: u64,
    pub total_candidates: u64,
    pub total_applications: u64,
}

pub async fn get_admin_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<AdminStatsResponse>> {
    current.require_role(Role::Admin)?;

    let stats = state.board.admin_stats().await?;
    Ok(Json(AdminStatsResponse {
        total_views: stats.total_applications,
        total_profit: stats.total_recruiters * 100,
        total_product: stats.total_jobs,
        total_users: stats.total_users,
        total_recruiters: stats.total_recruiters,
        total_candidates: stats.total_candidates,
        total_applications: stats.total_applications,
    }))
}

/// List all recruiter accounts.
pub async fn get_customers(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<UserPublic>>> {
    current.require_role(Role::Admin)?;
    Ok(Json(state.board.customers().await?))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Delete a recruiter account with its jobs and applications.
pub async fn delete_customer(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    current.require_role(Role::Admin)?;
    state.accounts.admin_delete_user(&user_id).await?;
    Ok(Json(MessageResponse::new("Customer deleted successfully")))
}

/// Candidate listing entry with the derived completion score.
#[derive(Serialize)]
pub struct CandidateSummary {
    #[serde(flatten)]
    pub user: UserPublic,
    pub profile_completion: u8,
}

pub async fn get_candidates(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<CandidateSummary>>> {
    current.require_role(Role::Admin)?;

    let candidates = state
        .board
        .candidates_with_completion()
        .await?
        .into_iter()
        .map(|(user, profile_completion)| CandidateSummary {
            user,
            profile_completion,
        })
        .collect();
    Ok(Json(candidates))
}

pub async fn delete_candidate(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(candidate_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    current.require_role(Role::Admin)?;
    state.accounts.admin_delete_candidate(&candidate_id).await?;
    Ok(Json(MessageResponse::new("Candidate deleted successfully")))
}

/// Job listing entry with its application count.
#[derive(Serialize)]
pub struct JobWithApplications {
    #[serde(flatten)]
    pub job: Job,
    pub total_applications: u64,
}

pub async fn get_company_jobs(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(company_id): Path<String>,
) -> ApiResult<Json<Vec<JobWithApplications>>> {
    current.require_role(Role::Admin)?;

    let jobs = state
        .board
        .jobs_with_counts(&company_id)
        .await?
        .into_iter()
        .map(|(job, total_applications)| JobWithApplications {
            job,
            total_applications,
        })
        .collect();
    Ok(Json(jobs))
}

pub async fn get_company_applications(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(company_id): Path<String>,
) -> ApiResult<Json<Vec<Application>>> {
    current.require_role(Role::Admin)?;
    Ok(Json(state.board.company_applications(&company_id).await?))
}

/// Application with the company-name snapshot from its job, when the job
/// still exists.
#[derive(Serialize)]
pub struct ApplicationWithCompany {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

pub async fn get_candidate_applications_admin(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(candidate_id): Path<String>,
) -> ApiResult<Json<Vec<ApplicationWithCompany>>> {
    current.require_role(Role::Admin)?;

    let applications = state
        .board
        .candidate_applications_with_company(&candidate_id)
        .await?
        .into_iter()
        .map(|(application, company_name)| ApplicationWithCompany {
            application,
            company_name,
        })
        .collect();
    Ok(Json(applications))
}

/// Profile update request shared by all roles' settings pages.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
}

#[derive(Serialize)]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub user: UserPublic,
}

pub async fn update_admin_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileUpdateResponse>> {
    let admin = current.require_role(Role::Admin)?;
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let updated = state
        .accounts
        .update_identity(&admin.id, &request.name, &request.email, None)
        .await?;

    Ok(Json(ProfileUpdateResponse {
        message: "Admin profile updated successfully".to_string(),
        user: updated.public(),
    }))
}

/// Password change request shared by all roles' settings pages.
#[derive(Debug, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_admin_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<PasswordChangeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let admin = current.require_role(Role::Admin)?;
    state
        .accounts
        .change_password(admin, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new(
        "Admin password changed successfully",
    )))
}

pub async fn update_admin_notifications(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(settings): Json<NotificationSettings>,
) -> ApiResult<Json<MessageResponse>> {
    let admin = current.require_role(Role::Admin)?;
    state
        .accounts
        .update_notification_settings(&admin.id, &settings)
        .await?;
    Ok(Json(MessageResponse::new(
        "Admin notification settings updated successfully",
    )))
}

pub async fn update_system_settings(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(settings): Json<SystemSettings>,
) -> ApiResult<Json<MessageResponse>> {
    let admin = current.require_role(Role::Admin)?;
    state
        .board
        .update_system_settings(&admin.id, &settings)
        .await?;
    Ok(Json(MessageResponse::new(
        "System settings updated successfully",
    )))
}

pub async fn update_security_settings(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(settings): Json<SecuritySettings>,
) -> ApiResult<Json<MessageResponse>> {
    let admin = current.require_role(Role::Admin)?;
    state
        .board
        .update_security_settings(&admin.id, &settings)
        .await?;
    Ok(Json(MessageResponse::new(
        "Security settings updated successfully",
    )))
}

#[derive(Serialize)]
pub struct BackupResponse {
    pub message: String,
    pub backup_id: String,
}

pub async fn create_system_backup(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<BackupResponse>> {
    let admin = current.require_role(Role::Admin)?;
    let backup_id = state.board.record_backup(&admin.id).await?;
    Ok(Json(BackupResponse {
        message: "System backup completed successfully".to_string(),
        backup_id,
    }))
}
