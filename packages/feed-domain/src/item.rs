use std::{fmt, ops::BitOr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type ItemId = i64;

/// Content classification bitmask as stored in `items.flags`.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContentFlags(i32);
impl ContentFlags {
	pub const ALL: Self = Self(0b1111);
	pub const NONE: Self = Self(0);
	pub const NSFL: Self = Self(4);
	pub const NSFP: Self = Self(8);
	pub const NSFW: Self = Self(2);
	pub const SFW: Self = Self(1);

	const SINGLE: [Self; 4] = [Self::SFW, Self::NSFW, Self::NSFL, Self::NSFP];

	/// Drops every bit outside the four known content types.
	pub const fn from_bits_truncate(bits: i32) -> Self {
		Self(bits & Self::ALL.0)
	}

	pub const fn bits(self) -> i32 {
		self.0
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	pub const fn intersects(self, other: Self) -> bool {
		self.0 & other.0 != 0
	}

	pub const fn contains(self, other: Self) -> bool {
		self.0 & other.0 == other.0
	}

	pub fn iter(self) -> impl Iterator<Item = ContentFlags> {
		Self::SINGLE.into_iter().filter(move |flag| self.contains(*flag))
	}

	/// Search-service term for a single content type.
	pub fn search_term(self) -> Option<&'static str> {
		match self {
			Self::SFW => Some("f:sfw"),
			Self::NSFW => Some("f:nsfw"),
			Self::NSFL => Some("f:nsfl"),
			Self::NSFP => Some("f:nsfp"),
			_ => None,
		}
	}
}
impl BitOr for ContentFlags {
	type Output = Self;

	fn bitor(self, rhs: Self) -> Self {
		Self(self.0 | rhs.0)
	}
}
impl fmt::Display for ContentFlags {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Snapshot of an item row at fetch time.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Item {
	pub id: ItemId,
	/// Promotion rank, zero when the item never entered the top feed.
	pub promoted: i64,
	pub up: i32,
	pub down: i32,
	#[serde(with = "crate::time_serde")]
	pub created: OffsetDateTime,
	pub image: String,
	pub thumb: String,
	pub fullsize: String,
	pub source: String,
	pub flags: ContentFlags,
	pub user: String,
	pub mark: i32,
	pub width: i32,
	pub height: i32,
	pub audio: bool,
}
impl Item {
	pub fn score(&self) -> i64 {
		i64::from(self.up) - i64::from(self.down)
	}

	pub fn is_promoted(&self) -> bool {
		self.promoted > 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncates_unknown_bits() {
		let flags = ContentFlags::from_bits_truncate(0b1_0101);

		assert_eq!(flags, ContentFlags::SFW | ContentFlags::NSFL);
	}

	#[test]
	fn iterates_single_types_in_order() {
		let flags = ContentFlags::NSFP | ContentFlags::SFW;
		let terms = flags.iter().filter_map(ContentFlags::search_term).collect::<Vec<_>>();

		assert_eq!(terms, vec!["f:sfw", "f:nsfp"]);
	}

	#[test]
	fn combined_flags_have_no_single_term() {
		assert_eq!(ContentFlags::ALL.search_term(), None);
	}
}
