use crate::{ContentFlags, Error, ItemId, Result};

pub const DEFAULT_MIN_SCORE: i64 = 500;

/// Normalized listing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemsQuery {
	pub content_types: ContentFlags,
	pub older: Option<i64>,
	pub newer: Option<i64>,
	pub around: Option<ItemId>,
	pub user: Option<String>,
	pub likes: Option<String>,
	pub tags: Option<String>,
	pub top_only: bool,
	pub random: bool,
	pub min_score: Option<i64>,
}
impl ItemsQuery {
	pub fn with_content_types(mut self, content_types: ContentFlags) -> Self {
		self.content_types = content_types;

		self
	}

	pub fn with_older(mut self, older: i64) -> Self {
		self.older = Some(older);

		self
	}

	pub fn with_newer(mut self, newer: i64) -> Self {
		self.newer = Some(newer);

		self
	}

	pub fn with_around(mut self, around: ItemId) -> Self {
		self.around = Some(around);

		self
	}

	pub fn with_user(mut self, user: impl Into<String>) -> Self {
		self.user = non_blank(user.into());

		self
	}

	pub fn with_likes(mut self, likes: impl Into<String>) -> Self {
		self.likes = non_blank(likes.into());

		self
	}

	pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
		self.tags = non_blank(tags.into());

		self
	}

	pub fn with_top_only(mut self, top_only: bool) -> Self {
		self.top_only = top_only;

		self
	}

	pub fn with_random(mut self, random: bool) -> Self {
		self.random = random;

		self
	}

	pub fn with_min_score(mut self, min_score: i64) -> Self {
		self.min_score = Some(min_score);

		self
	}

	pub fn validate(&self) -> Result<()> {
		if self.content_types.is_empty() {
			return Err(Error::Validation {
				message: "At least one content type must be requested.".to_string(),
			});
		}

		Ok(())
	}

	/// Effective cursor bounds. Zero cursors count as absent, and `around` opens a page
	/// that starts at the requested item when no explicit cursor is given. Top cursors are
	/// promotion ranks, so `around` (an item id) is ignored for top queries.
	pub fn window(&self) -> CursorWindow {
		let older = self.older.filter(|value| *value > 0);
		let newer = self.newer.filter(|value| *value > 0);

		if older.is_none() && newer.is_none() && !self.top_only {
			let older = self.around.filter(|value| *value > 0).map(|value| value.saturating_add(1));

			return CursorWindow { older, newer: None };
		}

		CursorWindow { older, newer }
	}

	pub fn at_start(&self) -> bool {
		self.window().older.is_none()
	}
}
impl Default for ItemsQuery {
	fn default() -> Self {
		Self {
			content_types: ContentFlags::SFW,
			older: None,
			newer: None,
			around: None,
			user: None,
			likes: None,
			tags: None,
			top_only: false,
			random: false,
			min_score: None,
		}
	}
}

/// Cursor bounds in either id or promoted-rank space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CursorWindow {
	pub older: Option<i64>,
	pub newer: Option<i64>,
}
impl CursorWindow {
	pub fn contains(&self, value: i64) -> bool {
		self.older.is_none_or(|older| value < older) && self.newer.is_none_or(|newer| value > newer)
	}
}

/// Rounds a requested best-of score down to a multiple of 500, keeping 500 as the floor.
pub fn best_of_threshold(score: Option<i64>) -> i64 {
	match score.map(|score| (score / DEFAULT_MIN_SCORE) * DEFAULT_MIN_SCORE) {
		Some(rounded) if rounded > 0 => rounded,
		_ => DEFAULT_MIN_SCORE,
	}
}

fn non_blank(value: String) -> Option<String> {
	let trimmed = value.trim();

	if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}
