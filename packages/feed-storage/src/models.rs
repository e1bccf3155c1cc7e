use time::OffsetDateTime;

use feed_domain::{ContentFlags, Item};

use crate::{Error, Result};

/// Raw `items` row in the fixed column order of [`crate::queries::ITEM_COLUMNS`].
#[derive(Debug, sqlx::FromRow)]
pub struct ItemRow {
	pub id: i64,
	pub promoted: i64,
	pub up: i32,
	pub down: i32,
	pub flags: i32,
	pub image: String,
	pub source: String,
	pub thumb: String,
	pub fullsize: String,
	pub username: String,
	pub mark: i32,
	/// Epoch seconds.
	pub created: i64,
	pub width: i32,
	pub height: i32,
	pub audio: bool,
}
impl TryFrom<ItemRow> for Item {
	type Error = Error;

	fn try_from(row: ItemRow) -> Result<Self> {
		let created = OffsetDateTime::from_unix_timestamp(row.created).map_err(|err| {
			Error::MalformedRow(format!("Item {} has invalid created timestamp: {err}", row.id))
		})?;

		Ok(Item {
			id: row.id,
			promoted: row.promoted,
			up: row.up,
			down: row.down,
			created,
			image: row.image,
			thumb: row.thumb,
			fullsize: row.fullsize,
			source: row.source,
			flags: ContentFlags::from_bits_truncate(row.flags),
			user: row.username,
			mark: row.mark,
			width: row.width,
			height: row.height,
			audio: row.audio,
		})
	}
}
