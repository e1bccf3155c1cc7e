use std::collections::HashSet;

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{Category, Item, ItemsQuery};

/// Response body for one category page.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsPage {
	pub items: Vec<Item>,
	pub at_start: bool,
	pub at_end: bool,
	/// Epoch seconds.
	pub server_time: i64,
	pub query_count: u32,
	pub response_time_ms: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PageOrder {
	/// Descending id.
	Newest,
	/// Descending promotion rank, promoted items only.
	Top,
	Shuffled,
}
impl PageOrder {
	pub fn for_query(category: Category, query: &ItemsQuery) -> Self {
		if category == Category::Random || query.random {
			Self::Shuffled
		} else if query.top_only {
			Self::Top
		} else {
			Self::Newest
		}
	}
}

#[derive(Clone, Copy, Debug)]
pub struct PageRules {
	pub page_size: usize,
	pub random_end_threshold: usize,
}
impl From<&feed_config::Feed> for PageRules {
	fn from(feed: &feed_config::Feed) -> Self {
		Self { page_size: feed.page_size, random_end_threshold: feed.random_end_threshold }
	}
}

/// Ordered page content plus its stream sentinels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paginated {
	pub items: Vec<Item>,
	pub at_start: bool,
	pub at_end: bool,
}

/// Keeps the first copy of every id that matches the content filter and the cursor window.
/// Top queries compare cursors against the promotion rank.
pub fn within_window(items: &[Item], query: &ItemsQuery, order: PageOrder) -> Vec<Item> {
	let window = query.window();
	let mut seen = HashSet::with_capacity(items.len());

	items
		.iter()
		.filter(|item| item.flags.intersects(query.content_types))
		.filter(|item| match order {
			PageOrder::Newest => window.contains(item.id),
			PageOrder::Top => window.contains(item.promoted),
			PageOrder::Shuffled => true,
		})
		.filter(|item| seen.insert(item.id))
		.cloned()
		.collect()
}

pub fn only_promoted(items: &[Item]) -> Vec<Item> {
	items.iter().filter(|item| item.is_promoted()).cloned().collect()
}

pub fn sorted_newest_first(items: &[Item]) -> Vec<Item> {
	let mut sorted = items.to_vec();

	sorted.sort_by(|a, b| b.id.cmp(&a.id));

	sorted
}

pub fn sorted_top_first(items: &[Item]) -> Vec<Item> {
	let mut sorted = only_promoted(items);

	sorted.sort_by(|a, b| b.promoted.cmp(&a.promoted).then_with(|| b.id.cmp(&a.id)));

	sorted
}

pub fn shuffled<R>(items: &[Item], rng: &mut R) -> Vec<Item>
where
	R: Rng + ?Sized,
{
	let mut shuffled = items.to_vec();

	shuffled.shuffle(rng);

	shuffled
}

/// Applies the window, the ordering and the page bound to a merged working set.
pub fn paginate<R>(
	items: &[Item],
	query: &ItemsQuery,
	order: PageOrder,
	rules: PageRules,
	rng: &mut R,
) -> Paginated
where
	R: Rng + ?Sized,
{
	let windowed = within_window(items, query, order);
	let mut ordered = match order {
		PageOrder::Newest => sorted_newest_first(&windowed),
		PageOrder::Top => sorted_top_first(&windowed),
		PageOrder::Shuffled => shuffled(&windowed, rng),
	};

	ordered.truncate(rules.page_size);

	let end_threshold = match order {
		PageOrder::Shuffled => rules.random_end_threshold,
		PageOrder::Newest | PageOrder::Top => rules.page_size,
	};
	let at_end = ordered.len() < end_threshold;

	Paginated { items: ordered, at_start: query.at_start(), at_end }
}
