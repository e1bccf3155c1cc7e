mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor, PgPool,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use uuid::Uuid;

use feed_domain::Item;

pub const DSN_VAR: &str = "FEED_PG_DSN";

/// Maintenance databases tried, in order, for `CREATE` and `DROP DATABASE`.
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

/// A throwaway database named `feed_scratch_<uuid>`. Dropped on [`ScratchDb::dispose`] or, as a
/// fallback, when the value goes out of scope.
pub struct ScratchDb {
	name: String,
	dsn: String,
	maintenance: Maintenance,
	disposed: bool,
}
impl ScratchDb {
	pub async fn create(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Invalid {DSN_VAR}: {err}.")))?;
		let maintenance = Maintenance::find(&base).await?;
		let name = format!("feed_scratch_{}", Uuid::new_v4().simple());

		maintenance.create(&name).await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, disposed: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn dispose(mut self) -> Result<()> {
		self.maintenance.drop_database(&self.name).await?;
		self.disposed = true;

		Ok(())
	}
}
impl Drop for ScratchDb {
	fn drop(&mut self) {
		if self.disposed {
			return;
		}

		// The caller may be inside a runtime, so block on a private one off-thread.
		thread::scope(|scope| {
			scope.spawn(|| {
				let outcome = Builder::new_current_thread()
					.enable_all()
					.build()
					.map_err(|err| Error::Message(err.to_string()))
					.and_then(|runtime| {
						runtime.block_on(self.maintenance.drop_database(&self.name))
					});

				if let Err(err) = outcome {
					eprintln!("Leaked scratch database {}: {err}", self.name);
				}
			});
		});
	}
}

/// Connection target for database-level DDL.
struct Maintenance {
	options: PgConnectOptions,
}
impl Maintenance {
	async fn find(base: &PgConnectOptions) -> Result<Self> {
		let mut failures = Vec::new();

		for database in MAINTENANCE_DATABASES {
			let options = base.clone().database(database);

			match PgConnection::connect_with(&options).await {
				Ok(conn) => {
					conn.close().await?;

					return Ok(Self { options });
				},
				Err(err) => failures.push(format!("{database}: {err}")),
			}
		}

		Err(Error::Message(format!("No maintenance database reachable ({}).", failures.join("; "))))
	}

	async fn create(&self, name: &str) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.options).await?;

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;

		Ok(())
	}

	async fn drop_database(&self, name: &str) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.options).await?;

		// Pooled connections from the test may still be open.
		sqlx::query(
			"SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
			WHERE datname = $1 AND pid <> pg_backend_pid()",
		)
		.bind(name)
		.execute(&mut conn)
		.await?;
		conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}""#).as_str()).await?;

		Ok(())
	}
}

pub fn env_dsn() -> Option<String> {
	env::var(DSN_VAR).ok()
}

/// Inserts item rows exactly as the upstream importer would.
pub async fn insert_items(pool: &PgPool, items: &[Item]) -> Result<()> {
	let mut tx = pool.begin().await?;

	for item in items {
		sqlx::query(
			"\
INSERT INTO items (
	id, promoted, up, down, flags, image, source, thumb, fullsize,
	username, mark, created, width, height, audio
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
		)
		.bind(item.id)
		.bind(item.promoted)
		.bind(item.up)
		.bind(item.down)
		.bind(item.flags.bits())
		.bind(item.image.as_str())
		.bind(item.source.as_str())
		.bind(item.thumb.as_str())
		.bind(item.fullsize.as_str())
		.bind(item.user.as_str())
		.bind(item.mark)
		.bind(item.created.unix_timestamp())
		.bind(item.width)
		.bind(item.height)
		.bind(item.audio)
		.execute(&mut *tx)
		.await?;
	}

	tx.commit().await?;

	Ok(())
}
