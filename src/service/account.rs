//! Account service
//!
//! Registration, login and profile updates.

use std::sync::Arc;

use crate::auth::{
    hash_password_blocking, verify_dummy_password_blocking, verify_password_blocking,
};
use crate::data::{Database, User};
use crate::error::AppError;
use crate::metrics::{LOGINS_TOTAL, USERS_REGISTERED_TOTAL};

/// Account service
pub struct AccountService {
    db: Arc<Database>,
}

impl AccountService {
    /// Create new account service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a new user
    ///
    /// The password is stored only as a one-way hash. Email format is not
    /// checked.
    ///
    /// # Errors
    /// `DuplicateEmail` if a user with exactly this email exists
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        // Fast-path guard before the expensive hash; the unique index
        // catches concurrent registrations that pass this check.
        if self.db.find_user_by_email(email).await?.is_some() {
            return Err(AppError::DuplicateEmail);
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;
        let user = self.db.insert_user(name, email, &password_hash).await?;

        USERS_REGISTERED_TOTAL.inc();
        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    /// Check credentials
    ///
    /// An unknown email still pays for one argon2 verification.
    ///
    /// # Errors
    /// `InvalidCredentials` if the email is unknown or the password is wrong
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AppError> {
        let Some(user) = self.db.find_user_by_email(email).await? else {
            verify_dummy_password_blocking(password.to_string()).await?;
            LOGINS_TOTAL.with_label_values(&["unknown_email"]).inc();
            return Err(AppError::InvalidCredentials);
        };

        let matches =
            verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
        if !matches {
            LOGINS_TOTAL.with_label_values(&["wrong_password"]).inc();
            tracing::debug!(user_id = %user.id, "Login rejected");
            return Err(AppError::InvalidCredentials);
        }

        LOGINS_TOTAL.with_label_values(&["success"]).inc();
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Overwrite name and email
    ///
    /// # Errors
    /// `NotFound` if no user has this ID, `DuplicateEmail` if another user
    /// owns `email`
    pub async fn update_profile(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
    ) -> Result<(), AppError> {
        if !self.db.update_user_profile(user_id, name, email).await? {
            return Err(AppError::NotFound("User"));
        }

        tracing::info!(user_id, "User profile updated");
        Ok(())
    }

    /// Acknowledge a signout. No server-side state exists to clear.
    pub fn signout(&self) {
        tracing::debug!("Signout acknowledged");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ConnectOptions;
    use tempfile::TempDir;

    async fn create_service() -> (AccountService, Arc<Database>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("service-account.db");
        let db = Arc::new(
            Database::connect(&db_path, ConnectOptions::default())
                .await
                .unwrap(),
        );
        (AccountService::new(db.clone()), db, temp_dir)
    }

    #[tokio::test]
    async fn register_hashes_password_and_rejects_duplicate() {
        let (service, db, _temp_dir) = create_service().await;

        let user = service
            .register("Ada", "ada@example.com", "hunter2")
            .await
            .unwrap();
        assert_eq!(user.name, "Ada");
        assert_ne!(user.password_hash, "hunter2");
        assert!(user.password_hash.starts_with("$argon2id$"));

        let error = service
            .register("Imposter", "ada@example.com", "other")
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::DuplicateEmail));
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn login_accepts_right_password_only() {
        let (service, _db, _temp_dir) = create_service().await;
        service
            .register("Ada", "ada@example.com", "hunter2")
            .await
            .unwrap();

        let user = service.login("ada@example.com", "hunter2").await.unwrap();
        assert_eq!(user.email, "ada@example.com");

        let wrong = service.login("ada@example.com", "hunter3").await.unwrap_err();
        assert!(matches!(wrong, AppError::InvalidCredentials));

        let unknown = service.login("bob@example.com", "hunter2").await.unwrap_err();
        assert!(matches!(unknown, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_rejects_legacy_plaintext_rows() {
        let (service, db, _temp_dir) = create_service().await;
        db.insert_user("Old", "old@example.com", "plaintext")
            .await
            .unwrap();

        let error = service
            .login("old@example.com", "plaintext")
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn update_profile_surfaces_missing_user() {
        let (service, db, _temp_dir) = create_service().await;
        let user = service
            .register("Ada", "ada@example.com", "hunter2")
            .await
            .unwrap();

        service
            .update_profile(&user.id, "Ada Lovelace", "lovelace@example.com")
            .await
            .unwrap();
        let stored = db.get_user(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ada Lovelace");
        assert_eq!(stored.email, "lovelace@example.com");

        // Password is untouched and still works under the new email
        service
            .login("lovelace@example.com", "hunter2")
            .await
            .unwrap();

        let error = service
            .update_profile("01ARZ3NDEKTSV4RRFFQ69G5FAV", "x", "x@example.com")
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::NotFound("User")));
    }
}
