//! `chron demo`: a host data layer wired to the recorder.
//!
//! Creates a `users` table next to the version log, then plays a request that
//! carries a user id through an insert and a rename. The repository commits
//! each statement first and only then fires the hooks.

use anyhow::Context;

use chron_config::ChronConfig;
use chron_core::context::{OperationContext, inject_actor};
use chron_core::record::{FieldDescriptor, FieldValue, Record, RecordSchema};
use chron_db::VersionDb;
use chron_db::hooks::{MutationEvent, MutationHooks};
use chron_db::recorder::{Tracking, VersionRecorder};

use crate::cli::{DemoArgs, GlobalFlags};
use crate::output::output_versions;

static USER: RecordSchema = RecordSchema::new(
    "User",
    FieldDescriptor::new("id", "id"),
    &[
        FieldDescriptor::auditable("name", "name"),
        FieldDescriptor::new("created_at", "created_at"),
    ],
);

#[derive(Debug, Default)]
struct User {
    id: u64,
    name: String,
    created_at: String,
}

impl Record for User {
    fn schema(&self) -> &'static RecordSchema {
        &USER
    }

    fn value_of(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::of(&self.id)),
            "name" => Some(FieldValue::of(&self.name)),
            "created_at" => Some(FieldValue::of(&self.created_at)),
            _ => None,
        }
    }
}

struct UserRepo<'a, H> {
    db: &'a VersionDb,
    hooks: H,
}

impl<H: MutationHooks> UserRepo<'_, H> {
    async fn create_table(&self) -> anyhow::Result<()> {
        self.db
            .conn()
            .execute(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    created_at TEXT NOT NULL
                )",
                (),
            )
            .await?;
        Ok(())
    }

    async fn create(&self, name: &str, ctx: &OperationContext) -> anyhow::Result<User> {
        let created_at = chrono::Utc::now().to_rfc3339();
        let mut rows = self
            .db
            .conn()
            .query(
                "INSERT INTO users (name, created_at) VALUES (?1, ?2) RETURNING id",
                libsql::params![name, created_at.as_str()],
            )
            .await?;
        let row = rows.next().await?.context("insert returned no id")?;
        let id = u64::try_from(row.get::<i64>(0)?)?;
        drop(rows);

        let user = User {
            id,
            name: name.to_string(),
            created_at,
        };
        self.hooks
            .after_insert(&MutationEvent::new(1, &user, ctx))
            .await;
        Ok(user)
    }

    async fn rename(
        &self,
        user: &mut User,
        name: &str,
        ctx: &OperationContext,
    ) -> anyhow::Result<()> {
        let affected = self
            .db
            .conn()
            .execute(
                "UPDATE users SET name = ?1 WHERE id = ?2",
                libsql::params![name, i64::try_from(user.id)?],
            )
            .await?;
        user.name = name.to_string();
        self.hooks
            .after_update(&MutationEvent::new(affected, &*user, ctx))
            .await;
        Ok(())
    }
}

/// Handle `chron demo`. Runs in memory unless `--db` names a file.
pub async fn handle(
    args: &DemoArgs,
    config: &ChronConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    USER.validate()?;

    let path = flags.db.as_deref().unwrap_or(":memory:");
    let db = VersionDb::open_local(path)
        .await
        .with_context(|| format!("failed to open demo database at {path}"))?;

    let tracking = if config.tracking.is_configured() {
        Tracking::from_config(&config.tracking)
    } else {
        Tracking::new([USER.name])
    };
    if !tracking.is_tracked(USER.name) {
        tracing::warn!(
            record_type = USER.name,
            "demo record type is not tracked; no versions will be recorded"
        );
    }

    let repo = UserRepo {
        db: &db,
        hooks: VersionRecorder::new(&db, tracking),
    };
    repo.create_table().await?;

    let key = &config.tracking.current_user_key;
    let request = OperationContext::new().with(key.as_str(), args.user.as_str());
    let ctx = inject_actor(&request, key);

    let mut user = repo.create(&args.name, &ctx).await?;
    repo.rename(&mut user, &args.rename, &ctx).await?;

    output_versions(&db.history(USER.name, user.id).await?, flags.format)
}
