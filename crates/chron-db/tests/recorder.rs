//! End-to-end recording against a small host data layer.
//!
//! The host keeps a `users` table on the same libSQL connection as the version
//! log and fires the mutation hooks after each committed statement.

use pretty_assertions::assert_eq;
use serde_json::json;

use chron_config::DatabaseConfig;
use chron_core::context::{OperationContext, inject_actor};
use chron_core::entities::{NewVersion, Version};
use chron_core::enums::EventKind;
use chron_core::record::{FieldDescriptor, FieldValue, Record, RecordSchema};
use chron_core::{Changes, Snapshot};
use chron_db::VersionDb;
use chron_db::error::DatabaseError;
use chron_db::hooks::{MutationEvent, MutationHooks};
use chron_db::recorder::{RecordOutcome, SkipReason, Tracking, VersionRecorder};
use chron_db::store::VersionStore;

static USER: RecordSchema = RecordSchema::new(
    "User",
    FieldDescriptor::new("id", "id"),
    &[
        FieldDescriptor::auditable("name", "name"),
        FieldDescriptor::new("email", "email"),
        FieldDescriptor::auditable("status", "status"),
    ],
);

/// Same type after `status` stopped being audited.
static USER_WITHOUT_STATUS: RecordSchema = RecordSchema::new(
    "User",
    FieldDescriptor::new("id", "id"),
    &[
        FieldDescriptor::auditable("name", "name"),
        FieldDescriptor::new("email", "email"),
        FieldDescriptor::new("status", "status"),
    ],
);

#[derive(Debug, Clone, Default)]
struct User {
    id: u64,
    name: String,
    email: String,
    status: String,
    schema: Option<&'static RecordSchema>,
}

impl Record for User {
    fn schema(&self) -> &'static RecordSchema {
        self.schema.unwrap_or(&USER)
    }

    fn value_of(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::of(&self.id)),
            "name" => Some(FieldValue::of(&self.name)),
            "email" => Some(FieldValue::of(&self.email)),
            "status" => Some(FieldValue::of(&self.status)),
            _ => None,
        }
    }
}

/// Minimal host repository. Commits first, then calls the hooks.
struct UserRepo<'a, H> {
    db: &'a VersionDb,
    hooks: H,
}

impl<H: MutationHooks> UserRepo<'_, H> {
    async fn insert(&self, user: &mut User, ctx: &OperationContext) -> Result<(), DatabaseError> {
        let mut rows = self
            .db
            .conn()
            .query(
                "INSERT INTO users (name, email, status) VALUES (?1, ?2, ?3) RETURNING id",
                libsql::params![
                    user.name.as_str(),
                    user.email.as_str(),
                    user.status.as_str()
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        user.id = u64::try_from(row.get::<i64>(0)?).unwrap();
        drop(rows);

        self.hooks
            .after_insert(&MutationEvent::new(1, &*user, ctx))
            .await;
        Ok(())
    }

    async fn update(&self, user: &User, ctx: &OperationContext) -> Result<u64, DatabaseError> {
        let affected = self
            .db
            .conn()
            .execute(
                "UPDATE users SET name = ?1, email = ?2, status = ?3 WHERE id = ?4",
                libsql::params![
                    user.name.as_str(),
                    user.email.as_str(),
                    user.status.as_str(),
                    i64::try_from(user.id).unwrap()
                ],
            )
            .await?;

        self.hooks
            .after_update(&MutationEvent::new(affected, user, ctx))
            .await;
        Ok(affected)
    }

    async fn count_users(&self) -> i64 {
        let mut rows = self
            .db
            .conn()
            .query("SELECT COUNT(*) FROM users", ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }
}

async fn create_users_table(db: &VersionDb) {
    db.conn()
        .execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT ''
            )",
            (),
        )
        .await
        .unwrap();
}

async fn setup() -> VersionDb {
    let db = VersionDb::open_local(":memory:").await.unwrap();
    create_users_table(&db).await;
    db
}

fn repo<'a>(db: &'a VersionDb, tables: &[&str]) -> UserRepo<'a, VersionRecorder<&'a VersionDb>> {
    UserRepo {
        db,
        hooks: VersionRecorder::new(db, Tracking::new(tables.iter().copied())),
    }
}

fn snapshot(value: serde_json::Value) -> Snapshot {
    serde_json::from_value(value).unwrap()
}

fn alice() -> User {
    User {
        name: "alice".into(),
        email: "alice@example.com".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn insert_then_rename_then_status() {
    let db = setup().await;
    let repo = repo(&db, &["User"]);
    let ctx = OperationContext::for_actor("12344321");

    let mut user = alice();
    repo.insert(&mut user, &ctx).await.unwrap();
    assert_eq!(user.id, 1);

    let v1 = db.last_version("User", 1).await.unwrap().unwrap();
    assert_eq!(v1.event, EventKind::Insert);
    assert_eq!(v1.actor, "12344321");
    assert_eq!(v1.snapshot, snapshot(json!({"name": "alice"})));
    assert_eq!(v1.changes, None);

    user.name = "bob".into();
    repo.update(&user, &ctx).await.unwrap();

    let v2 = db.last_version("User", 1).await.unwrap().unwrap();
    assert_eq!(v2.event, EventKind::Update);
    assert_eq!(v2.snapshot, snapshot(json!({"name": "bob"})));
    assert_eq!(
        v2.changes,
        Some(Changes::from([(
            "name".to_string(),
            (json!("alice"), json!("bob"))
        )]))
    );

    user.status = "active".into();
    repo.update(&user, &ctx).await.unwrap();

    let v3 = db.last_version("User", 1).await.unwrap().unwrap();
    assert_eq!(
        v3.snapshot,
        snapshot(json!({"name": "bob", "status": "active"}))
    );
    // `status` was absent from the previous snapshot, so it is not paired.
    assert_eq!(
        v3.changes,
        Some(Changes::from([(
            "name".to_string(),
            (json!("bob"), json!("bob"))
        )]))
    );

    let history = db.history("User", 1).await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history.windows(2).all(|w| w[0].id < w[1].id));
    assert!(
        history
            .windows(2)
            .all(|w| w[0].created_at <= w[1].created_at)
    );
}

#[tokio::test]
async fn non_auditable_field_never_reaches_a_version() {
    let db = setup().await;
    let repo = repo(&db, &["User"]);
    let ctx = OperationContext::new();

    let mut user = alice();
    repo.insert(&mut user, &ctx).await.unwrap();
    user.email = "new@example.com".into();
    repo.update(&user, &ctx).await.unwrap();

    for version in db.history("User", user.id).await.unwrap() {
        assert!(!version.snapshot.contains_key("email"));
        if let Some(changes) = version.changes {
            assert!(!changes.contains_key("email"));
        }
    }
}

#[tokio::test]
async fn untracked_type_records_nothing() {
    let db = setup().await;
    let repo = repo(&db, &["Post"]);
    let ctx = OperationContext::for_actor(7);

    let mut user = alice();
    repo.insert(&mut user, &ctx).await.unwrap();
    user.name = "bob".into();
    repo.update(&user, &ctx).await.unwrap();

    assert_eq!(repo.count_users().await, 1);
    assert_eq!(db.count_versions("User", user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn update_touching_no_rows_records_nothing() {
    let db = setup().await;
    let repo = repo(&db, &["User"]);
    let ctx = OperationContext::new();

    let ghost = User {
        id: 42,
        ..alice()
    };
    let affected = repo.update(&ghost, &ctx).await.unwrap();
    assert_eq!(affected, 0);
    assert_eq!(db.count_versions("User", 42).await.unwrap(), 0);
}

#[tokio::test]
async fn insert_touching_no_rows_records_nothing() {
    let db = setup().await;
    let recorder = VersionRecorder::new(&db, Tracking::new(["User"]));
    let ctx = OperationContext::for_actor("12344321");
    let user = User { id: 5, ..alice() };

    let outcome = recorder
        .record_insert(&MutationEvent::new(0, &user, &ctx))
        .await;
    assert_eq!(outcome, RecordOutcome::Skipped(SkipReason::NoRowsAffected));

    recorder
        .after_insert(&MutationEvent::new(0, &user, &ctx))
        .await;
    assert_eq!(db.count_versions("User", 5).await.unwrap(), 0);
}

#[tokio::test]
async fn outcomes_report_skip_reasons() {
    let db = setup().await;
    let recorder = VersionRecorder::new(&db, Tracking::new(["User"]));
    let ctx = OperationContext::new();

    let unsaved = alice();
    let outcome = recorder
        .record_insert(&MutationEvent::new(1, &unsaved, &ctx))
        .await;
    assert_eq!(outcome, RecordOutcome::Skipped(SkipReason::NoIdentity));

    let saved = User { id: 3, ..alice() };
    let outcome = recorder
        .record_insert(&MutationEvent::new(1, &saved, &ctx))
        .await;
    assert!(matches!(outcome, RecordOutcome::Recorded(_)));
}

#[tokio::test]
async fn actor_flows_from_request_through_injection() {
    let db = setup().await;
    let repo = repo(&db, &["User"]);

    let request = OperationContext::new().with("current_user_id", 12_344_321);
    let ctx = inject_actor(&request, "current_user_id");

    let mut user = alice();
    repo.insert(&mut user, &ctx).await.unwrap();

    let version = db.last_version("User", user.id).await.unwrap().unwrap();
    assert_eq!(version.actor, "12344321");
}

#[tokio::test]
async fn missing_actor_records_empty_string() {
    let db = setup().await;
    let repo = repo(&db, &["User"]);
    let ctx = inject_actor(&OperationContext::new(), "current_user_id");

    let mut user = alice();
    repo.insert(&mut user, &ctx).await.unwrap();

    let version = db.last_version("User", user.id).await.unwrap().unwrap();
    assert_eq!(version.actor, "");
}

#[tokio::test]
async fn field_that_stopped_being_audited_drops_out_of_changes() {
    let db = setup().await;
    let repo = repo(&db, &["User"]);
    let ctx = OperationContext::new();

    let mut user = User {
        status: "active".into(),
        ..alice()
    };
    repo.insert(&mut user, &ctx).await.unwrap();
    let first = db.last_version("User", user.id).await.unwrap().unwrap();
    assert_eq!(first.snapshot["status"], json!("active"));

    user.schema = Some(&USER_WITHOUT_STATUS);
    user.status = "banned".into();
    repo.update(&user, &ctx).await.unwrap();

    let second = db.last_version("User", user.id).await.unwrap().unwrap();
    assert!(!second.snapshot.contains_key("status"));
    let changes = second.changes.unwrap();
    assert!(!changes.contains_key("status"));
    assert!(changes.contains_key("name"));
}

#[tokio::test]
async fn update_without_prior_version_has_empty_changes() {
    let db = setup().await;
    let ctx = OperationContext::new();

    // Insert while untracked, then start tracking.
    let mut user = alice();
    repo(&db, &[]).insert(&mut user, &ctx).await.unwrap();

    user.name = "bob".into();
    repo(&db, &["User"]).update(&user, &ctx).await.unwrap();

    let history = db.history("User", user.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].event, EventKind::Update);
    assert_eq!(history[0].changes, Some(Changes::new()));
}

#[tokio::test]
async fn hook_fired_inside_open_transaction_rolls_back_with_it() {
    let db = setup().await;
    let recorder = VersionRecorder::new(&db, Tracking::new(["User"]));
    let ctx = OperationContext::new();
    let user = User { id: 9, ..alice() };

    db.conn().execute("BEGIN", ()).await.unwrap();
    let outcome = recorder
        .record_insert(&MutationEvent::new(1, &user, &ctx))
        .await;
    assert!(matches!(outcome, RecordOutcome::Recorded(_)));
    db.conn().execute("ROLLBACK", ()).await.unwrap();

    assert_eq!(db.count_versions("User", 9).await.unwrap(), 0);
}

/// Store whose writes always fail.
struct FailingStore;

impl VersionStore for FailingStore {
    async fn append(&self, _version: &NewVersion) -> Result<i64, DatabaseError> {
        Err(DatabaseError::Query("storage offline".into()))
    }

    async fn last_version(
        &self,
        _record_type: &str,
        _record_id: u64,
    ) -> Result<Option<Version>, DatabaseError> {
        Err(DatabaseError::Query("storage offline".into()))
    }
}

#[tokio::test]
async fn failing_store_never_blocks_host_writes() {
    let db = setup().await;
    let repo = UserRepo {
        db: &db,
        hooks: VersionRecorder::new(FailingStore, Tracking::new(["User"])),
    };
    let ctx = OperationContext::for_actor("1");

    let mut user = alice();
    repo.insert(&mut user, &ctx).await.unwrap();
    user.name = "bob".into();
    assert_eq!(repo.update(&user, &ctx).await.unwrap(), 1);

    assert_eq!(repo.count_users().await, 1);
    assert_eq!(db.count_versions("User", user.id).await.unwrap(), 0);
}

#[tokio::test]
async fn missing_version_table_never_blocks_host_writes() {
    let config = DatabaseConfig {
        path: ":memory:".into(),
        auto_migrate: false,
    };
    let db = VersionDb::open(&config).await.unwrap();
    create_users_table(&db).await;
    let repo = repo(&db, &["User"]);
    let ctx = OperationContext::new();

    let mut user = alice();
    repo.insert(&mut user, &ctx).await.unwrap();
    user.name = "bob".into();
    repo.update(&user, &ctx).await.unwrap();

    let mut rows = db
        .conn()
        .query("SELECT name FROM users WHERE id = ?1", [1_i64])
        .await
        .unwrap();
    let name = rows.next().await.unwrap().unwrap().get::<String>(0).unwrap();
    assert_eq!(name, "bob");

    let outcome = repo
        .hooks
        .record_insert(&MutationEvent::new(1, &user, &ctx))
        .await;
    assert_eq!(outcome, RecordOutcome::Failed);
}
