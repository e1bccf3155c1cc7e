use std::{fmt, str::FromStr};

use crate::{
	ContentFlags, CursorWindow, Error, ItemsQuery, Result,
	expression::{self, TERM_CONTROVERSIAL, TERM_TEXT},
	query,
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Category {
	General,
	Bestof,
	Controversial,
	Text,
	Random,
}
impl Category {
	pub const ALL: [Self; 5] =
		[Self::General, Self::Bestof, Self::Controversial, Self::Text, Self::Random];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::General => "general",
			Self::Bestof => "bestof",
			Self::Controversial => "controversial",
			Self::Text => "text",
			Self::Random => "random",
		}
	}

	/// Decides where the candidate ids of a page come from. Predicates are validated here, so a
	/// malformed query never reaches the store or the search service.
	pub fn plan(self, query: &ItemsQuery, feed: &feed_config::Feed) -> Result<Plan> {
		query.validate()?;

		match self {
			Self::General => search_plan(query, None),
			Self::Text => search_plan(query, Some(TERM_TEXT)),
			Self::Controversial =>
				if query.tags.is_some() || query.likes.is_some() {
					search_plan(query, Some(TERM_CONTROVERSIAL))
				} else {
					direct_plan(query, feed, Scope::Controversial)
				},
			Self::Bestof => {
				let min_score = query::best_of_threshold(query.min_score);

				if query.likes.is_some() {
					search_plan(query, Some(&expression::score_term(min_score)))
				} else {
					direct_plan(query, feed, Scope::MinScore(min_score))
				}
			},
			Self::Random => Ok(Plan::Sample(SampleKind::for_content_types(query.content_types))),
		}
	}
}
impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for Category {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		Self::ALL.into_iter().find(|category| category.as_str() == raw).ok_or_else(|| {
			Error::Validation { message: format!("Unknown category {raw:?}.") }
		})
	}
}

/// Candidate source chosen for one request.
#[derive(Clone, Debug, PartialEq)]
pub enum Plan {
	Search(SearchPlan),
	Direct(ItemFilter),
	Sample(SampleKind),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchPlan {
	pub expression: String,
	/// Cursor as requested; in promoted-rank space when `top_only` is set.
	pub older: Option<i64>,
	pub top_only: bool,
	pub random: bool,
}

/// Bounded SQL predicate over `items`.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemFilter {
	pub content_types: ContentFlags,
	pub scope: Scope,
	pub tsquery: Option<String>,
	pub user: Option<String>,
	pub top_only: bool,
	pub window: CursorWindow,
	pub repost_confidence: f32,
	pub limit: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope {
	MinScore(i64),
	Controversial,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SampleKind {
	Nsfl,
	Rest(ContentFlags),
}
impl SampleKind {
	pub fn for_content_types(content_types: ContentFlags) -> Self {
		if content_types == ContentFlags::NSFL { Self::Nsfl } else { Self::Rest(content_types) }
	}
}

fn search_plan(query: &ItemsQuery, extra: Option<&str>) -> Result<Plan> {
	let expression = expression::search_expression(query, extra)?;

	Ok(Plan::Search(SearchPlan {
		expression,
		older: query.window().older,
		top_only: query.top_only,
		random: query.random,
	}))
}

fn direct_plan(query: &ItemsQuery, feed: &feed_config::Feed, scope: Scope) -> Result<Plan> {
	let tsquery = query.tags.as_deref().map(expression::tag_tsquery).transpose()?;
	let user = query
		.user
		.as_deref()
		.map(|user| expression::validate_name("user", user).map(str::to_string))
		.transpose()?;

	Ok(Plan::Direct(ItemFilter {
		content_types: query.content_types,
		scope,
		tsquery,
		user,
		top_only: query.top_only,
		window: query.window(),
		repost_confidence: feed.repost_confidence,
		limit: feed.page_size,
	}))
}
