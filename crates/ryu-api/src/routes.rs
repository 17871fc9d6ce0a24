//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::handlers::admin::{
    change_admin_password, create_system_backup, delete_candidate, delete_customer,
    get_admin_stats, get_candidate_applications_admin, get_candidates, get_company_applications,
    get_company_jobs, get_customers, update_admin_notifications, update_admin_profile,
    update_security_settings, update_system_settings,
};
use crate::handlers::auth::{login, signup};
use crate::handlers::candidate::{
    apply_for_job, change_candidate_password, delete_candidate_account, get_available_jobs,
    get_candidate_applications, get_candidate_profile, update_candidate_basic_profile,
    update_candidate_notifications, update_candidate_privacy, update_candidate_profile,
    upload_profile_picture, withdraw_application,
};
use crate::handlers::health::{health, ready};
use crate::handlers::recruiter::{
    change_recruiter_password, create_job, delete_job, delete_recruiter_account,
    get_job_applications, get_recruiter_jobs, get_recruiter_stats, update_application_status,
    update_recruiter_notifications, update_recruiter_preferences, update_recruiter_privacy,
    update_recruiter_profile,
};
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login));

    let admin_routes = Router::new()
        .route("/admin/stats", get(get_admin_stats))
        .route("/admin/customers", get(get_customers))
        .route("/admin/customers/:user_id", delete(delete_customer))
        .route("/admin/candidates", get(get_candidates))
        .route("/admin/candidates/:candidate_id", delete(delete_candidate))
        .route("/admin/company/:company_id/jobs", get(get_company_jobs))
        .route(
            "/admin/company/:company_id/applications",
            get(get_company_applications),
        )
        .route(
            "/admin/candidate/:candidate_id/applications",
            get(get_candidate_applications_admin),
        )
        .route("/admin/update-profile", put(update_admin_profile))
        .route("/admin/change-password", put(change_admin_password))
        .route(
            "/admin/notification-settings",
            put(update_admin_notifications),
        )
        .route("/admin/system-settings", put(update_system_settings))
        .route("/admin/security-settings", put(update_security_settings))
        .route("/admin/system-backup", post(create_system_backup));

    let recruiter_routes = Router::new()
        .route("/recruiter/stats", get(get_recruiter_stats))
        .route("/recruiter/jobs", post(create_job).get(get_recruiter_jobs))
        .route("/recruiter/jobs/:job_id", delete(delete_job))
        .route(
            "/recruiter/applications/:application_id",
            get(get_job_applications).put(update_application_status),
        )
        .route("/recruiter/update-profile", put(update_recruiter_profile))
        .route(
            "/recruiter/change-password",
            put(change_recruiter_password),
        )
        .route(
            "/recruiter/notification-settings",
            put(update_recruiter_notifications),
        )
        .route(
            "/recruiter/privacy-settings",
            put(update_recruiter_privacy),
        )
        .route("/recruiter/preferences", put(update_recruiter_preferences))
        .route(
            "/recruiter/delete-account",
            delete(delete_recruiter_account),
        );

    let candidate_routes = Router::new()
        .route("/candidate/jobs", get(get_available_jobs))
        .route("/candidate/apply/:job_id", post(apply_for_job))
        .route(
            "/candidate/applications",
            get(get_candidate_applications),
        )
        .route(
            "/candidate/applications/:application_id",
            delete(withdraw_application),
        )
        .route(
            "/candidate/profile",
            get(get_candidate_profile).put(update_candidate_profile),
        )
        .route(
            "/candidate/upload-profile-picture",
            post(upload_profile_picture),
        )
        .route(
            "/candidate/update-profile",
            put(update_candidate_basic_profile),
        )
        .route(
            "/candidate/change-password",
            put(change_candidate_password),
        )
        .route(
            "/candidate/notification-settings",
            put(update_candidate_notifications),
        )
        .route(
            "/candidate/privacy-settings",
            put(update_candidate_privacy),
        )
        .route(
            "/candidate/delete-account",
            delete(delete_candidate_account),
        );

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(admin_routes)
        .merge(recruiter_routes)
        .merge(candidate_routes);

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        // Uploaded profile pictures, served statically.
        .nest_service("/uploads", ServeDir::new(state.storage.root()))
        // Request body size limit to bound uploads.
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
