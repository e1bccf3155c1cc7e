use feed_domain::{ItemId, Plan, SearchPlan};
use feed_providers::SearchOptions;

use crate::{Error, ItemStore, Result, SearchProvider};

/// Ordered candidate ids for one page, before materialization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Candidates {
	pub ids: Vec<ItemId>,
	pub round_trips: u32,
	/// Id-space cursor handed to the search service, when one was translated.
	pub older_than: Option<ItemId>,
}

pub async fn resolve(
	store: &dyn ItemStore,
	search: &dyn SearchProvider,
	plan: &Plan,
) -> Result<Candidates> {
	match plan {
		Plan::Search(plan) => resolve_search(store, search, plan).await,
		Plan::Direct(filter) => {
			let ids = store.fetch_filtered(filter).await.map_err(|err| Error::Resolution {
				message: format!("Candidate query failed: {err}"),
			})?;

			Ok(Candidates { ids, round_trips: 1, older_than: None })
		},
		Plan::Sample(kind) => {
			let ids = store.sample_random(*kind).await.map_err(|err| Error::Resolution {
				message: format!("Random sampling failed: {err}"),
			})?;

			Ok(Candidates { ids, round_trips: 1, older_than: None })
		},
	}
}

async fn resolve_search(
	store: &dyn ItemStore,
	search: &dyn SearchProvider,
	plan: &SearchPlan,
) -> Result<Candidates> {
	let mut round_trips = 0;
	let older_than = match plan.older {
		// Top cursors are promotion ranks; the search service pages by id.
		Some(promoted) if plan.top_only => {
			round_trips += 1;

			let id = store.resolve_promoted_cursor(promoted).await.map_err(|err| {
				Error::Resolution { message: format!("Cannot resolve top cursor {promoted}: {err}") }
			})?;

			Some(id)
		},
		older => older,
	};
	let options = SearchOptions { older_than: older_than.unwrap_or(0), random: plan.random };

	round_trips += 1;

	let ids = search.search(&plan.expression, options).await.map_err(|err| {
		Error::Resolution { message: format!("Search for {:?} failed: {err}", plan.expression) }
	})?;

	Ok(Candidates { ids, round_trips, older_than })
}
