//! The admission approval workflow.
//!
//! Approving an admission provisions a member account: the admission is
//! marked approved and a user row is inserted in one transaction, so a
//! half-provisioned state is never observable. The username suggested by
//! the allocator is only a hint; the unique constraint on the username
//! column is what actually guarantees uniqueness under concurrency, and a
//! violation rolls the whole transaction back.

use chrono::Utc;
use common::ProvisionedCredentials;
use model::entities::admission::{self, AdmissionStatus};
use model::entities::user::{self, UserRole};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set, SqlErr, TransactionError,
    TransactionTrait,
};
use std::fmt;
use tracing::{info, instrument, warn};

use crate::allocator;
use crate::error::{AdmissionError, Result};
use crate::password;

/// Deployment settings the provisioning workflow needs.
#[derive(Clone, Default)]
pub struct ProvisioningSettings {
    /// The default password assigned to newly provisioned accounts.
    /// Required; approval fails with a configuration error when absent.
    pub default_password: Option<String>,
    /// Bcrypt cost override, mainly for tests. `None` uses the default.
    pub bcrypt_cost: Option<u32>,
}

// The default password is plaintext and must never reach the logs, even
// through a tracing span that records this struct.
impl fmt::Debug for ProvisioningSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvisioningSettings")
            .field(
                "default_password",
                &self.default_password.as_ref().map(|_| "<redacted>"),
            )
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// How many times [`approve_admission_with_retry`] re-runs the workflow
/// after losing a username race.
const MAX_APPROVE_ATTEMPTS: u32 = 3;

/// Approve a pending admission and provision the member account.
///
/// Runs the whole workflow: lookup, idempotence guard, username
/// allocation, password hashing, then one atomic transaction updating the
/// admission status and inserting the user. On success the generated
/// username and the plaintext default password are returned once, for the
/// admin to relay out-of-band. On any failure nothing is committed.
#[instrument(skip(db, settings))]
pub async fn approve_admission(
    db: &DatabaseConnection,
    settings: &ProvisioningSettings,
    admission_id: i32,
) -> Result<ProvisionedCredentials> {
    let admission = admission::Entity::find_by_id(admission_id)
        .one(db)
        .await?
        .ok_or(AdmissionError::NotFound(admission_id))?;

    // Guard before any allocation or write: re-approving an already
    // processed admission must not provision a second account.
    if admission.status != AdmissionStatus::Pending {
        return Err(AdmissionError::AlreadyProcessed(admission.status));
    }

    let default_password = settings.default_password.as_deref().ok_or_else(|| {
        AdmissionError::Configuration(
            "default member password is not configured (set DEFAULT_MEMBER_PASSWORD)".to_string(),
        )
    })?;

    let username = allocator::next_username(db).await?;
    let password_hash = password::hash_password(default_password, settings.bcrypt_cost).await?;

    if let Err(err) = provision(db, &admission, &username, &password_hash).await {
        return Err(conflict_or(err, &username));
    }

    info!(admission_id, %username, "admission approved, member account provisioned");

    Ok(ProvisionedCredentials {
        username,
        default_password: default_password.to_string(),
    })
}

/// Approve with a bounded in-process retry on username conflicts.
///
/// Each attempt re-runs the workflow from the admission lookup, so a retry
/// that follows a concurrent approval of the same admission is caught by
/// the idempotence guard instead of provisioning a duplicate.
#[instrument(skip(db, settings))]
pub async fn approve_admission_with_retry(
    db: &DatabaseConnection,
    settings: &ProvisioningSettings,
    admission_id: i32,
) -> Result<ProvisionedCredentials> {
    let mut attempt = 1;
    loop {
        match approve_admission(db, settings, admission_id).await {
            Err(AdmissionError::Conflict(username)) if attempt < MAX_APPROVE_ATTEMPTS => {
                warn!(admission_id, %username, attempt, "username conflict, retrying approval");
                attempt += 1;
            }
            other => return other,
        }
    }
}

/// Reject a pending admission. No allocation, no user row.
#[instrument(skip(db))]
pub async fn reject_admission(db: &DatabaseConnection, admission_id: i32) -> Result<()> {
    let admission = admission::Entity::find_by_id(admission_id)
        .one(db)
        .await?
        .ok_or(AdmissionError::NotFound(admission_id))?;

    if admission.status != AdmissionStatus::Pending {
        return Err(AdmissionError::AlreadyProcessed(admission.status));
    }

    let mut active: admission::ActiveModel = admission.into();
    active.status = Set(AdmissionStatus::Rejected);
    active.update(db).await?;

    info!(admission_id, "admission rejected");
    Ok(())
}

/// The atomic half of the workflow: mark the admission approved and insert
/// the user in a single transaction. Either both writes commit or neither
/// does.
async fn provision(
    db: &DatabaseConnection,
    admission: &admission::Model,
    username: &str,
    password_hash: &str,
) -> Result<()> {
    let admission = admission.clone();
    let username = username.to_string();
    let password_hash = password_hash.to_string();

    db.transaction::<_, (), AdmissionError>(move |txn| {
        Box::pin(async move {
            let mut active: admission::ActiveModel = admission.clone().into();
            active.status = Set(AdmissionStatus::Approved);
            active.update(txn).await?;

            user::ActiveModel {
                username: Set(username),
                password_hash: Set(password_hash),
                name: Set(admission.name),
                email: Set(admission.email),
                phone: Set(admission.phone),
                father_name: Set(admission.father_name),
                mother_name: Set(admission.mother_name),
                image_url: Set(admission.image_url),
                gender: Set(admission.gender),
                role: Set(UserRole::Student),
                is_admin: Set(false),
                branch_id: Set(None),
                joined_on: Set(Utc::now().date_naive()),
                ..Default::default()
            }
            .insert(txn)
            .await?;

            Ok(())
        })
    })
    .await
    .map_err(|err| match err {
        TransactionError::Connection(e) => AdmissionError::Database(e),
        TransactionError::Transaction(e) => e,
    })
}

/// Map a unique-constraint violation on the username column to the
/// retryable `Conflict` variant; pass every other error through.
fn conflict_or(err: AdmissionError, username: &str) -> AdmissionError {
    if let AdmissionError::Database(db_err) = &err {
        if is_unique_violation(db_err) {
            warn!(%username, "username taken by a concurrent approval, transaction rolled back");
            return AdmissionError::Conflict(username.to_string());
        }
    }
    err
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ColumnTrait, Database, QueryFilter};

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    fn settings() -> ProvisioningSettings {
        ProvisioningSettings {
            default_password: Some("dojo1234".to_string()),
            // Low cost to keep the tests fast
            bcrypt_cost: Some(4),
        }
    }

    async fn submit_admission(db: &DatabaseConnection, name: &str, email: &str) -> admission::Model {
        admission::ActiveModel {
            name: Set(name.to_string()),
            father_name: Set("John Doe".to_string()),
            mother_name: Set("Mary Doe".to_string()),
            date_of_birth: Set(NaiveDate::from_ymd_opt(2008, 3, 21).unwrap()),
            gender: Set(model::entities::admission::Gender::Female),
            blood_group: Set(None),
            email: Set(email.to_string()),
            phone: Set("01900000001".to_string()),
            image_url: Set(None),
            transaction_ref: Set(None),
            status: Set(AdmissionStatus::Pending),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create admission")
    }

    async fn insert_user(db: &DatabaseConnection, username: &str) -> user::Model {
        user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set("$2b$04$placeholderhash".to_string()),
            name: Set("Existing Member".to_string()),
            email: Set("existing@example.com".to_string()),
            phone: Set("01800000000".to_string()),
            father_name: Set("Father".to_string()),
            mother_name: Set("Mother".to_string()),
            image_url: Set(None),
            gender: Set(model::entities::admission::Gender::Male),
            role: Set(UserRole::Student),
            is_admin: Set(false),
            branch_id: Set(None),
            joined_on: Set(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("Failed to create user")
    }

    #[tokio::test]
    async fn approve_provisions_account_end_to_end() {
        let db = setup_db().await;
        let admission = submit_admission(&db, "Jane Doe", "jane@example.com").await;

        let creds = approve_admission(&db, &settings(), admission.id)
            .await
            .unwrap();

        // First allocation with an empty user table
        assert_eq!(creds.username, "d101");
        assert_eq!(creds.default_password, "dojo1234");

        let admission = admission::Entity::find_by_id(admission.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admission.status, AdmissionStatus::Approved);

        let users = user::Entity::find().all(&db).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "d101");
        assert_eq!(users[0].role, UserRole::Student);
        assert!(!users[0].is_admin);
        assert_eq!(users[0].email, "jane@example.com");
        assert_eq!(users[0].name, "Jane Doe");

        // The stored hash verifies against the configured password and
        // the plaintext itself was not persisted.
        assert_ne!(users[0].password_hash, "dojo1234");
        assert!(bcrypt::verify("dojo1234", &users[0].password_hash).unwrap());
    }

    #[tokio::test]
    async fn approve_skips_gaps_and_legacy_usernames() {
        let db = setup_db().await;
        insert_user(&db, "d101").await;
        insert_user(&db, "d105").await;
        insert_user(&db, "shanto").await;

        let admission = submit_admission(&db, "Jane Doe", "jane@example.com").await;
        let creds = approve_admission(&db, &settings(), admission.id)
            .await
            .unwrap();

        assert_eq!(creds.username, "d106");
    }

    #[tokio::test]
    async fn approvals_allocate_distinct_usernames() {
        let db = setup_db().await;

        let mut usernames = Vec::new();
        for i in 0..5 {
            let admission =
                submit_admission(&db, "Member", &format!("member{}@example.com", i)).await;
            let creds = approve_admission(&db, &settings(), admission.id)
                .await
                .unwrap();
            usernames.push(creds.username);
        }

        assert_eq!(usernames, vec!["d101", "d102", "d103", "d104", "d105"]);

        let mut distinct = usernames.clone();
        distinct.sort();
        distinct.dedup();
        assert_eq!(distinct.len(), usernames.len());
    }

    #[test]
    fn provisioning_settings_debug_redacts_default_password() {
        let rendered = format!("{:?}", settings());
        assert!(!rendered.contains("dojo1234"));
        assert!(rendered.contains("<redacted>"));

        // An unset password renders as None, not as a redaction marker.
        let rendered = format!("{:?}", ProvisioningSettings::default());
        assert!(rendered.contains("None"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_approvals_allocate_distinct_usernames() {
        let db = setup_db().await;

        // Three concurrent tasks fit within the retry budget even in the
        // worst case where every loser re-reads before the winner commits.
        let mut admission_ids = Vec::new();
        for i in 0..3 {
            let admission =
                submit_admission(&db, "Member", &format!("racer{}@example.com", i)).await;
            admission_ids.push(admission.id);
        }

        let mut handles = Vec::new();
        for admission_id in admission_ids {
            let db = db.clone();
            let settings = settings();
            handles.push(tokio::spawn(async move {
                approve_admission_with_retry(&db, &settings, admission_id).await
            }));
        }

        let mut usernames = Vec::new();
        for handle in handles {
            let creds = handle.await.unwrap().unwrap();
            usernames.push(creds.username);
        }

        usernames.sort();
        usernames.dedup();
        assert_eq!(usernames.len(), 3, "usernames must be distinct");

        let users = user::Entity::find().all(&db).await.unwrap();
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn re_approval_is_rejected_and_does_not_duplicate() {
        let db = setup_db().await;
        let admission = submit_admission(&db, "Jane Doe", "jane@example.com").await;

        approve_admission(&db, &settings(), admission.id)
            .await
            .unwrap();
        let second = approve_admission(&db, &settings(), admission.id).await;

        assert!(matches!(
            second,
            Err(AdmissionError::AlreadyProcessed(AdmissionStatus::Approved))
        ));

        let users = user::Entity::find().all(&db).await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn approve_unknown_admission_is_not_found() {
        let db = setup_db().await;

        let result = approve_admission(&db, &settings(), 9999).await;
        assert!(matches!(result, Err(AdmissionError::NotFound(9999))));

        assert!(user::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn approve_without_configured_password_fails_before_writes() {
        let db = setup_db().await;
        let admission = submit_admission(&db, "Jane Doe", "jane@example.com").await;

        let bare = ProvisioningSettings::default();
        let result = approve_admission(&db, &bare, admission.id).await;
        assert!(matches!(result, Err(AdmissionError::Configuration(_))));

        let admission = admission::Entity::find_by_id(admission.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admission.status, AdmissionStatus::Pending);
        assert!(user::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn provisioning_conflict_rolls_back_status_update() {
        let db = setup_db().await;
        insert_user(&db, "d101").await;
        let admission = submit_admission(&db, "Jane Doe", "jane@example.com").await;

        // Drive the transactional half directly with a colliding username,
        // simulating a concurrent approval that raced past the allocator.
        let result = provision(&db, &admission, "d101", "$2b$04$placeholderhash").await;
        let err = result.unwrap_err();
        assert!(matches!(
            conflict_or(err, "d101"),
            AdmissionError::Conflict(u) if u == "d101"
        ));

        // The status update in the same transaction must have rolled back.
        let admission = admission::Entity::find_by_id(admission.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admission.status, AdmissionStatus::Pending);

        let users = user::Entity::find().all(&db).await.unwrap();
        assert_eq!(users.len(), 1, "no second user row may exist");
    }

    #[tokio::test]
    async fn retry_after_concurrent_approval_hits_idempotence_guard() {
        let db = setup_db().await;
        let admission = submit_admission(&db, "Jane Doe", "jane@example.com").await;

        // A "concurrent" call wins first; the retry wrapper re-reads the
        // admission and must report it processed instead of duplicating.
        approve_admission(&db, &settings(), admission.id)
            .await
            .unwrap();

        let retried = approve_admission_with_retry(&db, &settings(), admission.id).await;
        assert!(matches!(
            retried,
            Err(AdmissionError::AlreadyProcessed(AdmissionStatus::Approved))
        ));
    }

    #[tokio::test]
    async fn reject_is_terminal_and_non_provisioning() {
        let db = setup_db().await;
        let admission = submit_admission(&db, "Jane Doe", "jane@example.com").await;

        reject_admission(&db, admission.id).await.unwrap();

        let stored = admission::Entity::find_by_id(admission.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, AdmissionStatus::Rejected);
        assert!(user::Entity::find().all(&db).await.unwrap().is_empty());

        // Only pending admissions may be approved.
        let approve_after_reject = approve_admission(&db, &settings(), admission.id).await;
        assert!(matches!(
            approve_after_reject,
            Err(AdmissionError::AlreadyProcessed(AdmissionStatus::Rejected))
        ));
        assert!(user::Entity::find().all(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reject_twice_is_rejected() {
        let db = setup_db().await;
        let admission = submit_admission(&db, "Jane Doe", "jane@example.com").await;

        reject_admission(&db, admission.id).await.unwrap();
        let second = reject_admission(&db, admission.id).await;
        assert!(matches!(
            second,
            Err(AdmissionError::AlreadyProcessed(AdmissionStatus::Rejected))
        ));
    }

    #[tokio::test]
    async fn reject_unknown_admission_is_not_found() {
        let db = setup_db().await;

        let result = reject_admission(&db, 4242).await;
        assert!(matches!(result, Err(AdmissionError::NotFound(4242))));
    }

    #[tokio::test]
    async fn approved_admission_fields_are_copied_not_linked() {
        let db = setup_db().await;
        let admission = submit_admission(&db, "Kim Lee", "kim@example.com").await;

        approve_admission(&db, &settings(), admission.id)
            .await
            .unwrap();

        let users = user::Entity::find()
            .filter(user::Column::Email.eq("kim@example.com"))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].father_name, "John Doe");
        assert_eq!(users[0].mother_name, "Mary Doe");
        assert_eq!(users[0].gender, model::entities::admission::Gender::Female);
        assert_eq!(users[0].branch_id, None);
    }
}
