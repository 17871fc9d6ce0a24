//! Candidate handlers: job search, applications, profile, and settings.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use validator::Validate;

use ryu_models::{
    Application, ApplicationStatus, CandidateProfile, Job, NotificationSettings, PrivacySettings,
    Role, UserPublic,
};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::admin::{MessageResponse, PasswordChangeRequest, ProfileUpdateRequest, ProfileUpdateResponse};
use crate::state::AppState;

/// Open job decorated with the caller's application state.
#[derive(Serialize)]
pub struct JobForCandidate {
    #[serde(flatten)]
    pub job: Job,
    pub has_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_status: Option<ApplicationStatus>,
}

pub async fn get_available_jobs(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<JobForCandidate>>> {
    let candidate = current.require_role(Role::Candidate)?;

    let jobs = state
        .board
        .open_jobs_for_candidate(&candidate.id)
        .await?
        .into_iter()
        .map(|(job, application_status)| JobForCandidate {
            job,
            has_applied: application_status.is_some(),
            application_status,
        })
        .collect();
    Ok(Json(jobs))
}

#[derive(Serialize)]
pub struct ApplyResponse {
    pub message: String,
    pub application_id: String,
}

pub async fn apply_for_job(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(job_id): Path<String>,
) -> ApiResult<Json<ApplyResponse>> {
    let candidate = current.require_role(Role::Candidate)?;
    let application = state.board.apply(candidate, &job_id).await?;
    Ok(Json(ApplyResponse {
        message: "Application submitted successfully".to_string(),
        application_id: application.id,
    }))
}

/// Application with current job details joined in, when the job still
/// exists.
#[derive(Serialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: Application,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_details: Option<Job>,
}

pub async fn get_candidate_applications(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Vec<ApplicationWithJob>>> {
    let candidate = current.require_role(Role::Candidate)?;

    let applications = state
        .board
        .candidate_applications_with_jobs(&candidate.id)
        .await?
        .into_iter()
        .map(|(application, job_details)| ApplicationWithJob {
            application,
            job_details,
        })
        .collect();
    Ok(Json(applications))
}

pub async fn withdraw_application(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(application_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let candidate = current.require_role(Role::Candidate)?;
    state.board.withdraw(&candidate.id, &application_id).await?;
    Ok(Json(MessageResponse::new(
        "Application withdrawn successfully",
    )))
}

pub async fn get_candidate_profile(
    State(_state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<UserPublic>> {
    let candidate = current.require_role(Role::Candidate)?;
    Ok(Json(candidate.public()))
}

pub async fn update_candidate_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(profile): Json<CandidateProfile>,
) -> ApiResult<Json<MessageResponse>> {
    let candidate = current.require_role(Role::Candidate)?;
    state
        .accounts
        .update_candidate_profile(&candidate.id, &profile)
        .await?;
    Ok(Json(MessageResponse::new("Profile updated successfully")))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_path: String,
}

/// Accept a multipart `file` field and store it as the candidate's
/// profile picture.
pub async fn upload_profile_picture(
    State(state): State<AppState>,
    current: CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let candidate = current.require_role(Role::Candidate)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| ApiError::validation("Upload is missing a file name"))?
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {}", e)))?;

        let file_path = state
            .accounts
            .set_profile_picture(candidate, &filename, &bytes)
            .await?;

        return Ok(Json(UploadResponse {
            message: "Profile picture uploaded successfully".to_string(),
            file_path,
        }));
    }

    Err(ApiError::validation("No file field in upload"))
}

pub async fn update_candidate_basic_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<ProfileUpdateResponse>> {
    let candidate = current.require_role(Role::Candidate)?;
    request
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let updated = state
        .accounts
        .update_identity(&candidate.id, &request.name, &request.email, None)
        .await?;

    Ok(Json(ProfileUpdateResponse {
        message: "Profile updated successfully".to_string(),
        user: updated.public(),
    }))
}

pub async fn change_candidate_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<PasswordChangeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let candidate = current.require_role(Role::Candidate)?;
    state
        .accounts
        .change_password(candidate, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

pub async fn update_candidate_notifications(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(settings): Json<NotificationSettings>,
) -> ApiResult<Json<MessageResponse>> {
    let candidate = current.require_role(Role::Candidate)?;
    state
        .accounts
        .update_notification_settings(&candidate.id, &settings)
        .await?;
    Ok(Json(MessageResponse::new(
        "Notification settings updated successfully",
    )))
}

pub async fn update_candidate_privacy(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(settings): Json<PrivacySettings>,
) -> ApiResult<Json<MessageResponse>> {
    let candidate = current.require_role(Role::Candidate)?;
    state
        .accounts
        .update_privacy_settings(&candidate.id, &settings)
        .await?;
    Ok(Json(MessageResponse::new(
        "Privacy settings updated successfully",
    )))
}

pub async fn delete_candidate_account(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<MessageResponse>> {
    let candidate = current.require_role(Role::Candidate)?;
    state.accounts.delete_account(candidate).await?;
    Ok(Json(MessageResponse::new(
        "Candidate account and all associated data deleted successfully",
    )))
}
