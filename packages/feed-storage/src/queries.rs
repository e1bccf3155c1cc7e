use sqlx::{Postgres, QueryBuilder};

use feed_domain::{ContentFlags, Item, ItemFilter, ItemId, SampleKind, Scope};

use crate::{Error, Result, db::Db, models::ItemRow};

pub const ITEM_COLUMNS: &str = "\
items.id, items.promoted, items.up, items.down, items.flags, \
items.image, items.source, items.thumb, items.fullsize, \
items.username, items.mark, items.created, items.width, items.height, items.audio";

/// Candidates drawn from the promoted pool per random page.
pub const SAMPLE_PROMOTED: i64 = 90;
/// Candidates drawn from the non-promoted pool per random page.
pub const SAMPLE_REGULAR: i64 = 30;

const SAMPLE_NSFL: &str = "\
(
	SELECT id
	FROM random_items_nsfl TABLESAMPLE BERNOULLI (2)
	WHERE promoted != 0
	ORDER BY random()
	LIMIT $1
)
UNION
(
	SELECT id
	FROM random_items_nsfl TABLESAMPLE BERNOULLI (1)
	WHERE promoted = 0
	ORDER BY random()
	LIMIT $2
)";

const SAMPLE_REST: &str = "\
(
	SELECT id
	FROM items TABLESAMPLE SYSTEM (0.5)
	WHERE flags & $1 != 0 AND promoted != 0
	ORDER BY random()
	LIMIT $2
)
UNION
(
	SELECT id
	FROM items TABLESAMPLE SYSTEM (0.1)
	WHERE flags & $1 != 0 AND promoted = 0
	ORDER BY random()
	LIMIT $3
)";

/// Materializes the given ids in one round trip. Unknown ids are simply absent from the result.
pub async fn fetch_by_ids(db: &Db, ids: &[ItemId]) -> Result<Vec<Item>> {
	if ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!("SELECT {ITEM_COLUMNS} FROM items WHERE items.id = ANY($1)");
	let rows: Vec<ItemRow> = sqlx::query_as(&sql).bind(ids).fetch_all(&db.pool).await?;

	rows.into_iter().map(Item::try_from).collect()
}

/// Ordered candidate ids matching a direct predicate, nearest to the cursor first.
pub async fn fetch_filtered(db: &Db, filter: &ItemFilter) -> Result<Vec<ItemId>> {
	let mut builder = filtered_query(filter)?;
	let ids = builder.build_query_scalar::<i64>().fetch_all(&db.pool).await?;

	Ok(ids)
}

/// Translates a promotion rank into the id of the promoted item.
pub async fn resolve_promoted_id(db: &Db, promoted: i64) -> Result<ItemId> {
	let id: Option<i64> = sqlx::query_scalar("SELECT id FROM items WHERE promoted = $1")
		.bind(promoted)
		.fetch_optional(&db.pool)
		.await?;

	id.ok_or_else(|| Error::NotFound(format!("No item with promoted id {promoted}.")))
}

pub async fn sample_random(db: &Db, kind: SampleKind) -> Result<Vec<ItemId>> {
	let ids = match kind {
		SampleKind::Nsfl =>
			sqlx::query_scalar::<_, i64>(SAMPLE_NSFL)
				.bind(SAMPLE_PROMOTED)
				.bind(SAMPLE_REGULAR)
				.fetch_all(&db.pool)
				.await?,
		SampleKind::Rest(content_types) =>
			sqlx::query_scalar::<_, i64>(SAMPLE_REST)
				.bind(content_types.bits())
				.bind(SAMPLE_PROMOTED)
				.bind(SAMPLE_REGULAR)
				.fetch_all(&db.pool)
				.await?,
	};

	Ok(ids)
}

pub fn filtered_query(filter: &ItemFilter) -> Result<QueryBuilder<'static, Postgres>> {
	if filter.content_types.is_empty() || filter.content_types.bits() & !ContentFlags::ALL.bits() != 0
	{
		return Err(Error::InvalidArgument(format!(
			"Content type mask {} is not a valid filter.",
			filter.content_types
		)));
	}

	let cursor_column = if filter.top_only { "items.promoted" } else { "items.id" };
	let mut builder = QueryBuilder::new("SELECT items.id FROM items WHERE items.flags & ");

	builder.push_bind(filter.content_types.bits());
	builder.push(" != 0");

	match filter.scope {
		Scope::MinScore(min_score) => {
			builder.push(" AND items.up - items.down > ");
			builder.push_bind(min_score);
		},
		Scope::Controversial => {
			builder.push(" AND items.id IN (SELECT id FROM controversial_items)");
		},
	}

	if let Some(tsquery) = &filter.tsquery {
		builder.push(
			" AND items.id IN (SELECT item_id FROM tag_documents WHERE document @@ to_tsquery('simple', ",
		);
		builder.push_bind(tsquery.clone());
		builder.push("))");
	}
	if let Some(user) = &filter.user {
		builder.push(" AND items.username = ");
		builder.push_bind(user.clone());
	}

	builder.push(
		" AND NOT EXISTS (SELECT 1 FROM tags WHERE tags.item_id = items.id AND tags.tag = 'repost' AND tags.confidence > ",
	);
	builder.push_bind(filter.repost_confidence);
	builder.push(")");

	if filter.top_only {
		builder.push(" AND items.promoted > 0");
	}
	if let Some(older) = filter.window.older {
		builder.push(format!(" AND {cursor_column} < "));
		builder.push_bind(older);
	}
	if let Some(newer) = filter.window.newer {
		builder.push(format!(" AND {cursor_column} > "));
		builder.push_bind(newer);
	}

	// A lone `newer` cursor pages towards the present, so the nearest items come first.
	let direction =
		if filter.window.newer.is_some() && filter.window.older.is_none() { "ASC" } else { "DESC" };

	builder.push(format!(" ORDER BY {cursor_column} {direction} LIMIT "));
	builder.push_bind(i64::try_from(filter.limit).unwrap_or(i64::MAX));

	Ok(builder)
}
