//! End-to-end tests over the full router.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use ryu_api::{create_router, AdminBootstrap, ApiConfig, AppState};

struct TestApp {
    app: Router,
    state: AppState,
    _uploads: TempDir,
}

fn test_app() -> TestApp {
    let uploads = TempDir::new().unwrap();
    let config = ApiConfig {
        upload_dir: uploads.path().join("uploads"),
        token_secret: "test-secret".to_string(),
        // Minimum bcrypt cost (4) keeps the many signups in these tests fast.
        password_cost: 4,
        ..Default::default()
    };
    let state = AppState::new(config).unwrap();
    let app = create_router(state.clone());
    TestApp {
        app,
        state,
        _uploads: uploads,
    }
}

async fn send(
    app: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn signup(app: &Router, name: &str, email: &str, role: &str, company: Option<&str>) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "secret-pass",
            "role": role,
            "company": company,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", body);
    body["user_id"].as_str().unwrap().to_string()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": email, "password": "secret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    assert_eq!(body["token_type"], "bearer");
    body["access_token"].as_str().unwrap().to_string()
}

async fn bootstrap_admin(state: &AppState) -> String {
    match state
        .accounts
        .ensure_admin("Admin User", "admin@recruiteryu.com", "secret-pass")
        .await
        .unwrap()
    {
        AdminBootstrap::Created(admin) | AdminBootstrap::AlreadyExists(admin) => admin.id,
    }
}

#[tokio::test]
async fn signup_is_unique_per_email() {
    let t = test_app();

    signup(&t.app, "Ada", "ada@x.io", "candidate", None).await;

    // Same email, different everything else: conflict.
    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Other",
            "email": "ada@x.io",
            "password": "different",
            "role": "recruiter",
            "company": "Acme",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");
}

#[tokio::test]
async fn signup_rejects_admin_and_unknown_roles() {
    let t = test_app();

    for role in ["admin", "superuser"] {
        let (status, _) = send(
            &t.app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({
                "name": "Mallory",
                "email": "mallory@x.io",
                "password": "secret-pass",
                "role": role,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "role {} accepted", role);
    }
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let t = test_app();
    signup(&t.app, "Ada", "ada@x.io", "candidate", None).await;

    for (email, password) in [("ada@x.io", "wrong"), ("nobody@x.io", "secret-pass")] {
        let (status, body) = send(
            &t.app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": password})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Incorrect email or password");
    }
}

#[tokio::test]
async fn requests_without_valid_tokens_are_unauthenticated() {
    let t = test_app();

    let (status, _) = send(&t.app, Method::GET, "/api/candidate/jobs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        send(&t.app, Method::GET, "/api/candidate/jobs", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthenticated() {
    let t = test_app();
    signup(&t.app, "Ada", "ada@x.io", "candidate", None).await;

    let expired = t
        .state
        .tokens
        .issue("ada@x.io", chrono::Duration::seconds(-1))
        .unwrap();
    let (status, _) = send(
        &t.app,
        Method::GET,
        "/api/candidate/profile",
        Some(&expired),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deleted_account_token_no_longer_resolves() {
    let t = test_app();
    bootstrap_admin(&t.state).await;
    let admin_token = login(&t.app, "admin@recruiteryu.com").await;

    let id = signup(&t.app, "Ada", "ada@x.io", "candidate", None).await;
    let token = login(&t.app, "ada@x.io").await;

    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/admin/candidates/{}", id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The token still verifies cryptographically, but the subject is gone.
    let (status, _) = send(
        &t.app,
        Method::GET,
        "/api/candidate/profile",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn every_surface_is_role_gated() {
    let t = test_app();
    bootstrap_admin(&t.state).await;
    signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;

    let admin = login(&t.app, "admin@recruiteryu.com").await;
    let recruiter = login(&t.app, "rae@x.io").await;
    let candidate = login(&t.app, "cal@x.io").await;

    // Admin-only surface rejects the other roles.
    for token in [&recruiter, &candidate] {
        let (status, _) = send(&t.app, Method::GET, "/api/admin/stats", Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    // Recruiter-only surface rejects the other roles.
    for token in [&admin, &candidate] {
        let (status, _) =
            send(&t.app, Method::GET, "/api/recruiter/stats", Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
    // Candidate-only surface rejects the other roles.
    for token in [&admin, &recruiter] {
        let (status, _) =
            send(&t.app, Method::GET, "/api/candidate/jobs", Some(token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    // And each role can reach its own surface.
    let (status, _) = send(&t.app, Method::GET, "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) =
        send(&t.app, Method::GET, "/api/recruiter/stats", Some(&recruiter), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) =
        send(&t.app, Method::GET, "/api/candidate/jobs", Some(&candidate), None).await;
    assert_eq!(status, StatusCode::OK);
}

async fn create_job(app: &Router, recruiter_token: &str, title: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/recruiter/jobs",
        Some(recruiter_token),
        Some(json!({
            "title": title,
            "skills_required": "rust, axum",
            "experience_years": 3,
            "qualification": "BSc",
            "description": "Build the API",
            "location": "Remote",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "job creation failed: {}", body);
    body["job_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn application_is_unique_per_candidate_and_job() {
    let t = test_app();
    signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;

    let recruiter = login(&t.app, "rae@x.io").await;
    let candidate = login(&t.app, "cal@x.io").await;

    let j1 = create_job(&t.app, &recruiter, "Backend Engineer").await;
    let j2 = create_job(&t.app, &recruiter, "Platform Engineer").await;

    // First application succeeds.
    let (status, body) = send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", j1),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["application_id"].as_str().is_some());

    // Same pair again: conflict.
    let (status, body) = send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", j1),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Already applied for this job");

    // A different job is fine.
    let (status, _) = send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", j2),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Unknown job: 404.
    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/candidate/apply/no-such-job",
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn job_listing_reflects_application_state() {
    let t = test_app();
    signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;

    let recruiter = login(&t.app, "rae@x.io").await;
    let candidate = login(&t.app, "cal@x.io").await;
    let job_id = create_job(&t.app, &recruiter, "Backend Engineer").await;

    let (_, jobs) = send(&t.app, Method::GET, "/api/candidate/jobs", Some(&candidate), None).await;
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["has_applied"], false);
    assert_eq!(jobs[0]["company_name"], "Acme");

    send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", job_id),
        Some(&candidate),
        None,
    )
    .await;

    let (_, jobs) = send(&t.app, Method::GET, "/api/candidate/jobs", Some(&candidate), None).await;
    assert_eq!(jobs[0]["has_applied"], true);
    assert_eq!(jobs[0]["application_status"], "pending");

    // Recruiter sees the application count and candidate details.
    let (_, listed) =
        send(&t.app, Method::GET, "/api/recruiter/jobs", Some(&recruiter), None).await;
    assert_eq!(listed[0]["total_applications"], 1);

    let (status, apps) = send(
        &t.app,
        Method::GET,
        &format!("/api/recruiter/applications/{}", job_id),
        Some(&recruiter),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(apps[0]["candidate_email"], "cal@x.io");
    assert_eq!(apps[0]["candidate_details"]["email"], "cal@x.io");
    assert!(apps[0]["candidate_details"]["password"].is_null());
}

#[tokio::test]
async fn status_updates_follow_the_transition_table() {
    let t = test_app();
    signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;

    let recruiter = login(&t.app, "rae@x.io").await;
    let candidate = login(&t.app, "cal@x.io").await;
    let job_id = create_job(&t.app, &recruiter, "Backend Engineer").await;

    let (_, body) = send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", job_id),
        Some(&candidate),
        None,
    )
    .await;
    let app_id = body["application_id"].as_str().unwrap().to_string();

    let update = |status: &str| {
        let path = format!("/api/recruiter/applications/{}", app_id);
        let body = json!({"status": status});
        let token = recruiter.clone();
        let app = t.app.clone();
        async move { send(&app, Method::PUT, &path, Some(&token), Some(body)).await }
    };

    // pending -> hired is illegal.
    let (status, _) = update("hired").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // pending -> approved -> hired is the happy path.
    let (status, _) = update("approved").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = update("hired").await;
    assert_eq!(status, StatusCode::OK);

    // hired is terminal.
    let (status, body) = update("pending").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "cannot move application from 'hired' to 'pending'");

    // Unknown status strings never reach the store.
    let (status, _) = update("banana").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Unknown application id: 404.
    let (status, _) = send(
        &t.app,
        Method::PUT,
        "/api/recruiter/applications/no-such-app",
        Some(&recruiter),
        Some(json!({"status": "approved"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The update stamped updated_at on the candidate's view.
    let (_, apps) = send(
        &t.app,
        Method::GET,
        "/api/candidate/applications",
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(apps[0]["status"], "hired");
    assert!(apps[0]["updated_at"].is_string());
    assert_eq!(apps[0]["job_details"]["title"], "Backend Engineer");
}

#[tokio::test]
async fn another_recruiters_application_reads_as_absent() {
    let t = test_app();
    signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    signup(&t.app, "Rob", "rob@x.io", "recruiter", Some("Globex")).await;
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;

    let rae = login(&t.app, "rae@x.io").await;
    let rob = login(&t.app, "rob@x.io").await;
    let candidate = login(&t.app, "cal@x.io").await;

    let job_id = create_job(&t.app, &rae, "Backend Engineer").await;
    let (_, body) = send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", job_id),
        Some(&candidate),
        None,
    )
    .await;
    let app_id = body["application_id"].as_str().unwrap();

    // Rob owns neither the job nor the application.
    let (status, _) = send(
        &t.app,
        Method::GET,
        &format!("/api/recruiter/applications/{}", job_id),
        Some(&rob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &t.app,
        Method::PUT,
        &format!("/api/recruiter/applications/{}", app_id),
        Some(&rob),
        Some(json!({"status": "approved"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/recruiter/jobs/{}", job_id),
        Some(&rob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_job_cascades_to_its_applications() {
    let t = test_app();
    signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    let recruiter = login(&t.app, "rae@x.io").await;
    let job_id = create_job(&t.app, &recruiter, "Backend Engineer").await;
    let keep_id = create_job(&t.app, &recruiter, "Platform Engineer").await;

    let mut tokens = Vec::new();
    for i in 0..3 {
        signup(&t.app, "Cand", &format!("c{}@x.io", i), "candidate", None).await;
        let token = login(&t.app, &format!("c{}@x.io", i)).await;
        send(
            &t.app,
            Method::POST,
            &format!("/api/candidate/apply/{}", job_id),
            Some(&token),
            None,
        )
        .await;
        tokens.push(token);
    }
    // One application on the surviving job.
    send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", keep_id),
        Some(&tokens[0]),
        None,
    )
    .await;

    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/recruiter/jobs/{}", job_id),
        Some(&recruiter),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Every application for the deleted job is gone; the other survives.
    for (i, token) in tokens.iter().enumerate() {
        let (_, apps) = send(
            &t.app,
            Method::GET,
            "/api/candidate/applications",
            Some(token),
            None,
        )
        .await;
        let expected = if i == 0 { 1 } else { 0 };
        assert_eq!(apps.as_array().unwrap().len(), expected);
    }

    // Deleting it again 404s.
    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/recruiter/jobs/{}", job_id),
        Some(&recruiter),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn full_lifecycle_with_admin_cascade() {
    let t = test_app();
    bootstrap_admin(&t.state).await;
    let admin = login(&t.app, "admin@recruiteryu.com").await;

    let recruiter_id = signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;
    let recruiter = login(&t.app, "rae@x.io").await;
    let candidate = login(&t.app, "cal@x.io").await;

    let job_id = create_job(&t.app, &recruiter, "Backend Engineer").await;

    // Candidate applies; the application starts pending.
    let (_, body) = send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", job_id),
        Some(&candidate),
        None,
    )
    .await;
    let app_id = body["application_id"].as_str().unwrap().to_string();

    // Recruiter approves; updated_at gets stamped.
    let (status, _) = send(
        &t.app,
        Method::PUT,
        &format!("/api/recruiter/applications/{}", app_id),
        Some(&recruiter),
        Some(json!({"status": "approved"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Re-applying still conflicts.
    let (status, _) = send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", job_id),
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Admin stats see all of it.
    let (_, stats) = send(&t.app, Method::GET, "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(stats["total_users"], 3);
    assert_eq!(stats["total_recruiters"], 1);
    assert_eq!(stats["total_candidates"], 1);
    assert_eq!(stats["total_applications"], 1);
    assert_eq!(stats["total_views"], 1);
    assert_eq!(stats["total_profit"], 100);

    let (_, company_apps) = send(
        &t.app,
        Method::GET,
        &format!("/api/admin/company/{}/applications", recruiter_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(company_apps.as_array().unwrap().len(), 1);

    // Admin deletes the recruiter: the job and application go with them.
    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/admin/customers/{}", recruiter_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = send(&t.app, Method::GET, "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(stats["total_users"], 2);
    assert_eq!(stats["total_recruiters"], 0);
    assert_eq!(stats["total_product"], 0);
    assert_eq!(stats["total_applications"], 0);

    // The candidate remains and sees no applications and no open jobs.
    let (_, apps) = send(
        &t.app,
        Method::GET,
        "/api/candidate/applications",
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(apps.as_array().unwrap().len(), 0);
    let (_, jobs) = send(&t.app, Method::GET, "/api/candidate/jobs", Some(&candidate), None).await;
    assert_eq!(jobs.as_array().unwrap().len(), 0);

    // Deleting the same customer again: 404.
    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/admin/customers/{}", recruiter_id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn withdrawal_only_touches_the_candidates_own_application() {
    let t = test_app();
    signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;
    signup(&t.app, "Dee", "dee@x.io", "candidate", None).await;

    let recruiter = login(&t.app, "rae@x.io").await;
    let cal = login(&t.app, "cal@x.io").await;
    let dee = login(&t.app, "dee@x.io").await;
    let job_id = create_job(&t.app, &recruiter, "Backend Engineer").await;

    let (_, body) = send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", job_id),
        Some(&cal),
        None,
    )
    .await;
    let cal_app = body["application_id"].as_str().unwrap().to_string();

    // Dee cannot withdraw Cal's application.
    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/candidate/applications/{}", cal_app),
        Some(&dee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Cal can, and can then re-apply.
    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("/api/candidate/applications/{}", cal_app),
        Some(&cal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", job_id),
        Some(&cal),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_updates_enforce_email_uniqueness() {
    let t = test_app();
    signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;
    let recruiter = login(&t.app, "rae@x.io").await;

    // Taking another account's email fails.
    let (status, body) = send(
        &t.app,
        Method::PUT,
        "/api/recruiter/update-profile",
        Some(&recruiter),
        Some(json!({"name": "Rae", "email": "cal@x.io"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already in use by another account");

    // Keeping your own email is fine, and the response is password-free.
    let (status, body) = send(
        &t.app,
        Method::PUT,
        "/api/recruiter/update-profile",
        Some(&recruiter),
        Some(json!({"name": "Rae Updated", "email": "rae@x.io", "company": "Acme Corp"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Rae Updated");
    assert_eq!(body["user"]["company"], "Acme Corp");
    assert!(body["user"]["password"].is_null());
}

#[tokio::test]
async fn password_change_requires_the_current_password() {
    let t = test_app();
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;
    let token = login(&t.app, "cal@x.io").await;

    let (status, body) = send(
        &t.app,
        Method::PUT,
        "/api/candidate/change-password",
        Some(&token),
        Some(json!({"current_password": "wrong", "new_password": "new-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Current password is incorrect");

    let (status, _) = send(
        &t.app,
        Method::PUT,
        "/api/candidate/change-password",
        Some(&token),
        Some(json!({"current_password": "secret-pass", "new_password": "new-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works; the new one does.
    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "cal@x.io", "password": "secret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "cal@x.io", "password": "new-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_candidate_listing_scores_profiles() {
    let t = test_app();
    bootstrap_admin(&t.state).await;
    let admin = login(&t.app, "admin@recruiteryu.com").await;

    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;
    let candidate = login(&t.app, "cal@x.io").await;

    // Fresh profile: 0.
    let (_, listed) = send(&t.app, Method::GET, "/api/admin/candidates", Some(&admin), None).await;
    assert_eq!(listed[0]["profile_completion"], 0);

    // Bio only: 20.
    send(
        &t.app,
        Method::PUT,
        "/api/candidate/profile",
        Some(&candidate),
        Some(json!({"bio": "Rust engineer"})),
    )
    .await;
    let (_, listed) = send(&t.app, Method::GET, "/api/admin/candidates", Some(&admin), None).await;
    assert_eq!(listed[0]["profile_completion"], 20);

    // Bio + skills + experience + education: 80.
    send(
        &t.app,
        Method::PUT,
        "/api/candidate/profile",
        Some(&candidate),
        Some(json!({
            "bio": "Rust engineer",
            "skills": ["rust"],
            "experience": [{"title": "Engineer", "years": 3}],
            "education": [{"degree": "BSc"}],
        })),
    )
    .await;
    let (_, listed) = send(&t.app, Method::GET, "/api/admin/candidates", Some(&admin), None).await;
    assert_eq!(listed[0]["profile_completion"], 80);
}

#[tokio::test]
async fn profile_picture_upload_round_trips() {
    let t = test_app();
    let candidate_id = signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;
    let token = login(&t.app, "cal@x.io").await;

    let boundary = "testboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"avatar.png\"\r\nContent-Type: image/png\r\n\r\nfake-png-bytes\r\n--{b}--\r\n",
        b = boundary
    );

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/candidate/upload-profile-picture")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let file_path = body["file_path"].as_str().unwrap().to_string();
    assert_eq!(file_path, format!("/uploads/{}_profile.png", candidate_id));

    // The stored profile points at it.
    let (_, profile) =
        send(&t.app, Method::GET, "/api/candidate/profile", Some(&token), None).await;
    assert_eq!(profile["profile"]["profile_picture"], file_path);

    // And the file is served back.
    let request = Request::builder()
        .method(Method::GET)
        .uri(&file_path)
        .body(Body::empty())
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&served[..], b"fake-png-bytes");
}

#[tokio::test]
async fn admin_settings_and_backup_endpoints() {
    let t = test_app();
    bootstrap_admin(&t.state).await;
    let admin = login(&t.app, "admin@recruiteryu.com").await;

    let (status, _) = send(
        &t.app,
        Method::PUT,
        "/api/admin/system-settings",
        Some(&admin),
        Some(json!({"maintenanceMode": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &t.app,
        Method::PUT,
        "/api/admin/security-settings",
        Some(&admin),
        Some(json!({"sessionTimeout": 60})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &t.app,
        Method::POST,
        "/api/admin/system-backup",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["backup_id"].as_str().unwrap().starts_with("backup_"));
}

#[tokio::test]
async fn admin_bootstrap_is_idempotent() {
    let t = test_app();

    let first = bootstrap_admin(&t.state).await;
    let second = bootstrap_admin(&t.state).await;
    assert_eq!(first, second);

    // Still exactly one admin-visible user.
    let admin = login(&t.app, "admin@recruiteryu.com").await;
    let (_, stats) = send(&t.app, Method::GET, "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(stats["total_users"], 1);
}

#[tokio::test]
async fn self_service_account_deletion_cascades() {
    let t = test_app();
    signup(&t.app, "Rae", "rae@x.io", "recruiter", Some("Acme")).await;
    signup(&t.app, "Cal", "cal@x.io", "candidate", None).await;
    let recruiter = login(&t.app, "rae@x.io").await;
    let candidate = login(&t.app, "cal@x.io").await;

    let job_id = create_job(&t.app, &recruiter, "Backend Engineer").await;
    send(
        &t.app,
        Method::POST,
        &format!("/api/candidate/apply/{}", job_id),
        Some(&candidate),
        None,
    )
    .await;

    let (status, _) = send(
        &t.app,
        Method::DELETE,
        "/api/recruiter/delete-account",
        Some(&recruiter),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Login is gone, and so are the job and application.
    let (status, _) = send(
        &t.app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "rae@x.io", "password": "secret-pass"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, jobs) = send(&t.app, Method::GET, "/api/candidate/jobs", Some(&candidate), None).await;
    assert_eq!(jobs.as_array().unwrap().len(), 0);
    let (_, apps) = send(
        &t.app,
        Method::GET,
        "/api/candidate/applications",
        Some(&candidate),
        None,
    )
    .await;
    assert_eq!(apps.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn health_endpoints_respond() {
    let t = test_app();
    let (status, body) = send(&t.app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&t.app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}
