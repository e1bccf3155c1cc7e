use time::OffsetDateTime;

use feed_config::Postgres;
use feed_domain::{ContentFlags, CursorWindow, Item, ItemFilter, SampleKind, Scope};
use feed_storage::{Error, db::Db, queries};
use feed_testkit::ScratchDb;

fn postgres(dsn: &str) -> Postgres {
	Postgres {
		dsn: dsn.to_string(),
		pool_max_conns: 1,
		pool_min_idle: 0,
		conn_max_lifetime_secs: 300,
	}
}

fn item(id: i64, promoted: i64, up: i32, down: i32, flags: ContentFlags) -> Item {
	Item {
		id,
		promoted,
		up,
		down,
		created: OffsetDateTime::from_unix_timestamp(1_600_000_000 + id)
			.expect("Timestamp must be valid."),
		image: format!("{id}.jpg"),
		thumb: format!("{id}.thumb.jpg"),
		fullsize: String::new(),
		source: String::new(),
		flags,
		user: if id % 2 == 0 { "even".to_string() } else { "odd".to_string() },
		mark: 1,
		width: 640,
		height: 480,
		audio: id % 3 == 0,
	}
}

fn score_filter(min_score: i64, window: CursorWindow) -> ItemFilter {
	ItemFilter {
		content_types: ContentFlags::SFW,
		scope: Scope::MinScore(min_score),
		tsquery: None,
		user: None,
		top_only: false,
		window,
		repost_confidence: 0.3,
		limit: 120,
	}
}

async fn seeded_db(test_db: &ScratchDb) -> Db {
	let db = Db::connect(&postgres(test_db.dsn())).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let items = vec![
		item(900, 0, 700, 10, ContentFlags::SFW),
		item(950, 11, 900, 100, ContentFlags::SFW),
		item(999, 12, 40, 0, ContentFlags::SFW),
		item(1_001, 13, 1_200, 0, ContentFlags::SFW),
		item(960, 0, 800, 0, ContentFlags::NSFW),
	];

	feed_testkit::insert_items(&db.pool, &items).await.expect("Failed to insert items.");

	db
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FEED_PG_DSN to run."]
async fn db_connects_and_bootstraps() {
	let Some(base_dsn) = feed_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps; set FEED_PG_DSN to run this test.");

		return;
	};
	let test_db = ScratchDb::create(&base_dsn).await.expect("Failed to create scratch database.");

	assert!(test_db.name().starts_with("feed_scratch_"));

	let db = Db::connect(&postgres(test_db.dsn())).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");
	db.ensure_schema().await.expect("Schema bootstrap must be idempotent.");

	let count: i64 = sqlx::query_scalar(
		"SELECT count(*) FROM information_schema.tables WHERE table_name = 'controversial_items'",
	)
	.fetch_one(&db.pool)
	.await
	.expect("Failed to query schema tables.");

	assert_eq!(count, 1);

	test_db.dispose().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FEED_PG_DSN to run."]
async fn fetch_by_ids_drops_unknown_ids() {
	let Some(base_dsn) = feed_testkit::env_dsn() else {
		eprintln!("Skipping fetch_by_ids_drops_unknown_ids; set FEED_PG_DSN to run this test.");

		return;
	};
	let test_db = ScratchDb::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = seeded_db(&test_db).await;

	let mut items = queries::fetch_by_ids(&db, &[999, 950, 4_242]).await.expect("fetch");

	items.sort_by_key(|item| item.id);

	assert_eq!(items.len(), 2);
	assert_eq!(items[0], item(950, 11, 900, 100, ContentFlags::SFW));
	assert_eq!(items[1].created.unix_timestamp(), 1_600_000_999);
	assert!(items[1].audio);

	let none = queries::fetch_by_ids(&db, &[]).await.expect("fetch");

	assert!(none.is_empty());

	test_db.dispose().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FEED_PG_DSN to run."]
async fn filtered_ids_honor_score_cursor_and_reposts() {
	let Some(base_dsn) = feed_testkit::env_dsn() else {
		eprintln!("Skipping filtered_ids_honor_score_cursor_and_reposts; set FEED_PG_DSN to run.");

		return;
	};
	let test_db = ScratchDb::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = seeded_db(&test_db).await;

	let older = CursorWindow { older: Some(1_000), newer: None };
	let ids = queries::fetch_filtered(&db, &score_filter(500, older)).await.expect("filter");

	assert_eq!(ids, vec![950, 900]);

	sqlx::query("INSERT INTO tags (item_id, tag, confidence) VALUES (950, 'repost', 0.9)")
		.execute(&db.pool)
		.await
		.expect("Failed to tag repost.");

	let ids = queries::fetch_filtered(&db, &score_filter(500, older)).await.expect("filter");

	assert_eq!(ids, vec![900]);

	let newer = CursorWindow { older: None, newer: Some(900) };
	let ids = queries::fetch_filtered(&db, &score_filter(500, newer)).await.expect("filter");

	assert_eq!(ids, vec![1_001]);

	test_db.dispose().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FEED_PG_DSN to run."]
async fn promoted_cursor_resolution() {
	let Some(base_dsn) = feed_testkit::env_dsn() else {
		eprintln!("Skipping promoted_cursor_resolution; set FEED_PG_DSN to run this test.");

		return;
	};
	let test_db = ScratchDb::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = seeded_db(&test_db).await;

	assert_eq!(queries::resolve_promoted_id(&db, 12).await.expect("resolve"), 999);

	let missing = queries::resolve_promoted_id(&db, 77).await;

	assert!(matches!(missing, Err(Error::NotFound(_))));

	test_db.dispose().await.expect("Failed to drop scratch database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set FEED_PG_DSN to run."]
async fn random_samples_respect_content_mask() {
	let Some(base_dsn) = feed_testkit::env_dsn() else {
		eprintln!("Skipping random_samples_respect_content_mask; set FEED_PG_DSN to run.");

		return;
	};
	let test_db = ScratchDb::create(&base_dsn).await.expect("Failed to create scratch database.");
	let db = seeded_db(&test_db).await;

	let ids = queries::sample_random(&db, SampleKind::Rest(ContentFlags::NSFW))
		.await
		.expect("sample");

	assert!(ids.iter().all(|id| *id == 960), "Unexpected sample: {ids:?}");

	let nsfl = queries::sample_random(&db, SampleKind::Nsfl).await.expect("sample");

	assert!(nsfl.is_empty());

	test_db.dispose().await.expect("Failed to drop scratch database.");
}
