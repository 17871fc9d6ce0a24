//! Account lifecycle: signup, login, identity/settings updates, password
//! changes, and the cascading account deletions.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use ryu_models::{
    CandidateProfile, NotificationSettings, PrivacySettings, RecruiterPreferences, Role, User,
};
use ryu_storage::ProfileStorage;
use ryu_store::{DocumentStore, JsonMap, StoreError, UserRepo};

use crate::auth::TokenService;
use crate::credential::{hash_password, verify_password};
use crate::error::{ApiError, ApiResult};

/// Outcome of the idempotent admin bootstrap.
pub enum AdminBootstrap {
    Created(User),
    AlreadyExists(User),
}

/// Account service over the users collection.
#[derive(Clone)]
pub struct AccountService {
    users: UserRepo,
    storage: Arc<ProfileStorage>,
    tokens: Arc<TokenService>,
    password_cost: u32,
}

impl AccountService {
    pub fn new(
        store: Arc<DocumentStore>,
        storage: Arc<ProfileStorage>,
        tokens: Arc<TokenService>,
        password_cost: u32,
    ) -> Self {
        Self {
            users: UserRepo::new(store),
            storage,
            tokens,
            password_cost,
        }
    }

    /// Create a self-service account.
    ///
    /// Signup is restricted to the non-privileged roles; admin accounts
    /// only come from [`AccountService::ensure_admin`]. The email unique
    /// index rejects duplicates atomically.
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
        company: Option<String>,
    ) -> ApiResult<User> {
        let role = Role::from_str(role)
            .map_err(|_| ApiError::validation(format!("Invalid role: {}", role)))?;
        if role == Role::Admin {
            return Err(ApiError::validation(
                "Admin accounts cannot be created through signup",
            ));
        }

        let mut user = User {
            id: String::new(),
            name: name.to_string(),
            email: email.to_string(),
            password: hash_password(password, self.password_cost)?,
            role,
            company,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            profile: (role == Role::Candidate).then(CandidateProfile::default),
            notification_settings: None,
            privacy_settings: None,
            recruitment_preferences: None,
        };

        user.id = self
            .users
            .create(&user)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already registered"))?;
        Ok(user)
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ApiResult<(String, User)> {
        let user = self.users.find_by_email(email).await?;

        let user = match user {
            Some(user) if verify_password(password, &user.password) => user,
            _ => return Err(ApiError::unauthenticated("Incorrect email or password")),
        };

        let token = self
            .tokens
            .issue_default(&user.email)
            .map_err(|e| ApiError::internal(format!("token issuance failed: {}", e)))?;

        Ok((token, user))
    }

    /// Idempotent admin bootstrap: when an admin already exists this is a
    /// no-op that reports it.
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<AdminBootstrap> {
        if let Some(existing) = self.users.find_one_by_role(Role::Admin).await? {
            return Ok(AdminBootstrap::AlreadyExists(existing));
        }

        let mut admin = User {
            id: String::new(),
            name: name.to_string(),
            email: email.to_string(),
            password: hash_password(password, self.password_cost)?,
            role: Role::Admin,
            company: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            profile: None,
            notification_settings: None,
            privacy_settings: None,
            recruitment_preferences: None,
        };

        admin.id = self
            .users
            .create(&admin)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already registered"))?;
        info!(admin_id = %admin.id, "bootstrapped admin account");
        Ok(AdminBootstrap::Created(admin))
    }

    /// Update name/email (and company, when given). An email taken by
    /// another account fails with `Conflict`; the store index re-keys
    /// atomically, so there is no window for a duplicate.
    pub async fn update_identity(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
        company: Option<String>,
    ) -> ApiResult<User> {
        let mut patch = JsonMap::new();
        patch.insert("name".to_string(), Value::String(name.to_string()));
        patch.insert("email".to_string(), Value::String(email.to_string()));
        patch.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        if let Some(company) = company {
            patch.insert("company".to_string(), Value::String(company));
        }

        self.users
            .update_fields(user_id, patch)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already in use by another account"))
    }

    /// Change the password after verifying the current one.
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        if !verify_password(current_password, &user.password) {
            return Err(ApiError::validation("Current password is incorrect"));
        }

        let mut patch = JsonMap::new();
        patch.insert(
            "password".to_string(),
            Value::String(hash_password(new_password, self.password_cost)?),
        );
        patch.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        self.users.update_fields(&user.id, patch).await?;
        Ok(())
    }

    /// Replace the candidate's profile substructure.
    pub async fn update_candidate_profile(
        &self,
        user_id: &str,
        profile: &CandidateProfile,
    ) -> ApiResult<()> {
        let mut patch = JsonMap::new();
        patch.insert("profile".to_string(), serde_json::to_value(profile)?);
        patch.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        self.users.update_fields(user_id, patch).await?;
        Ok(())
    }

    /// Store an uploaded picture and point the profile at it.
    pub async fn set_profile_picture(
        &self,
        user: &User,
        original_filename: &str,
        bytes: &[u8],
    ) -> ApiResult<String> {
        let public_path = self
            .storage
            .save_profile_picture(&user.id, original_filename, bytes)
            .await
            .map_err(|e| match e {
                ryu_storage::StorageError::InvalidFilename(msg) => {
                    ApiError::validation(format!("Invalid file name: {}", msg))
                }
                other => other.into(),
            })?;

        let mut profile = user.profile.clone().unwrap_or_default();
        profile.profile_picture = Some(public_path.clone());

        let mut patch = JsonMap::new();
        patch.insert("profile".to_string(), serde_json::to_value(&profile)?);
        self.users.update_fields(&user.id, patch).await?;

        Ok(public_path)
    }

    pub async fn update_notification_settings(
        &self,
        user_id: &str,
        settings: &NotificationSettings,
    ) -> ApiResult<()> {
        self.patch_settings(user_id, "notification_settings", serde_json::to_value(settings)?)
            .await
    }

    pub async fn update_privacy_settings(
        &self,
        user_id: &str,
        settings: &PrivacySettings,
    ) -> ApiResult<()> {
        self.patch_settings(user_id, "privacy_settings", serde_json::to_value(settings)?)
            .await
    }

    pub async fn update_preferences(
        &self,
        user_id: &str,
        preferences: &RecruiterPreferences,
    ) -> ApiResult<()> {
        self.patch_settings(
            user_id,
            "recruitment_preferences",
            serde_json::to_value(preferences)?,
        )
        .await
    }

    async fn patch_settings(&self, user_id: &str, field: &str, value: Value) -> ApiResult<()> {
        let mut patch = JsonMap::new();
        patch.insert(field.to_string(), value);
        patch.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);
        self.users.update_fields(user_id, patch).await?;
        Ok(())
    }

    /// Delete an account and everything that references it, atomically.
    /// Uploaded pictures are removed best-effort before the cascade.
    pub async fn delete_account(&self, user: &User) -> ApiResult<usize> {
        if let Some(picture) = user.profile.as_ref().and_then(|p| p.profile_picture.as_deref()) {
            if let Err(e) = self.storage.remove_by_public_path(picture).await {
                warn!(user_id = %user.id, "could not remove profile picture: {}", e);
            }
        }
        Ok(self.users.delete_cascade(&user.id).await?)
    }

    /// Admin-initiated deletion of any account by id.
    pub async fn admin_delete_user(&self, user_id: &str) -> ApiResult<()> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        self.delete_account(&user).await?;
        Ok(())
    }

    /// Admin-initiated deletion of a candidate. Ids that resolve to a
    /// different role report `NotFound`.
    pub async fn admin_delete_candidate(&self, candidate_id: &str) -> ApiResult<()> {
        let user = self
            .users
            .get(candidate_id)
            .await?
            .filter(|u| u.role == Role::Candidate)
            .ok_or_else(|| ApiError::not_found("Candidate not found"))?;
        self.delete_account(&user).await?;
        Ok(())
    }
}

fn conflict_on_unique(err: StoreError, msg: &str) -> ApiError {
    if err.is_unique_violation() {
        ApiError::conflict(msg)
    } else {
        err.into()
    }
}
