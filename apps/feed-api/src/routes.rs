use std::collections::HashMap;

use axum::{
	Json, Router,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::get,
};
use serde::Serialize;

use feed_domain::{Category, ContentFlags, ItemsPage, ItemsQuery};
use feed_service::Error as ServiceError;

use crate::state::AppState;

type Params = Query<HashMap<String, String>>;

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::Resolution { message } =>
				Self::new(StatusCode::SERVICE_UNAVAILABLE, "RESOLUTION_FAILED", message),
			ServiceError::Fetch { message } =>
				Self::new(StatusCode::SERVICE_UNAVAILABLE, "FETCH_FAILED", message),
			ServiceError::Validation { message } =>
				Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/ping", get(ping))
		.route("/general", get(general))
		.route("/bestof", get(bestof))
		.route("/controversial", get(controversial))
		.route("/text", get(text))
		.route("/random", get(random))
		.with_state(state)
}

/// Builds a query from raw parameters. Unparseable values are ignored and the defaults kept.
pub fn items_query(params: &HashMap<String, String>) -> ItemsQuery {
	let mut query = ItemsQuery::default();

	if let Some(flags) = int_param(params, "flags").and_then(|bits| i32::try_from(bits).ok()) {
		let content_types = ContentFlags::from_bits_truncate(flags);

		if !content_types.is_empty() {
			query = query.with_content_types(content_types);
		}
	}
	if let Some(older) = int_param(params, "older") {
		query = query.with_older(older);
	}
	if let Some(newer) = int_param(params, "newer") {
		query = query.with_newer(newer);
	}
	if let Some(around) = int_param(params, "id") {
		query = query.with_around(around);
	}
	if let Some(user) = params.get("user") {
		query = query.with_user(user.as_str());
	}
	if let Some(likes) = params.get("likes") {
		query = query.with_likes(likes.as_str());
	}
	if let Some(tags) = params.get("tags") {
		query = query.with_tags(tags.as_str());
	}
	if let Some(score) = int_param(params, "score") {
		query = query.with_min_score(score);
	}

	query.with_top_only(flag_param(params, "promoted")).with_random(flag_param(params, "random"))
}

async fn ping() -> StatusCode {
	StatusCode::OK
}

async fn general(state: State<AppState>, params: Params) -> Result<Json<ItemsPage>, ApiError> {
	items(state, Category::General, params).await
}

async fn bestof(state: State<AppState>, params: Params) -> Result<Json<ItemsPage>, ApiError> {
	items(state, Category::Bestof, params).await
}

async fn controversial(
	state: State<AppState>,
	params: Params,
) -> Result<Json<ItemsPage>, ApiError> {
	items(state, Category::Controversial, params).await
}

async fn text(state: State<AppState>, params: Params) -> Result<Json<ItemsPage>, ApiError> {
	items(state, Category::Text, params).await
}

async fn random(state: State<AppState>, params: Params) -> Result<Json<ItemsPage>, ApiError> {
	items(state, Category::Random, params).await
}

async fn items(
	State(state): State<AppState>,
	category: Category,
	Query(params): Params,
) -> Result<Json<ItemsPage>, ApiError> {
	let query = items_query(&params);
	let page = state.service.page(category, query).await.map_err(|err| {
		tracing::warn!(%category, error = %err, "Page fetch failed.");

		ApiError::from(err)
	})?;

	Ok(Json(page))
}

fn int_param(params: &HashMap<String, String>, key: &str) -> Option<i64> {
	params.get(key).and_then(|raw| raw.trim().parse().ok())
}

fn flag_param(params: &HashMap<String, String>, key: &str) -> bool {
	params.get(key).is_some_and(|raw| matches!(raw.trim(), "1" | "true"))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
	}

	#[test]
	fn parses_known_parameters() {
		let query = items_query(&params(&[
			("flags", "3"),
			("older", "1000"),
			("user", " cha0s "),
			("tags", "cat"),
			("promoted", "1"),
			("score", "750"),
		]));

		assert_eq!(query.content_types, ContentFlags::SFW | ContentFlags::NSFW);
		assert_eq!(query.older, Some(1_000));
		assert_eq!(query.user.as_deref(), Some("cha0s"));
		assert_eq!(query.tags.as_deref(), Some("cat"));
		assert!(query.top_only);
		assert_eq!(query.min_score, Some(750));
	}

	#[test]
	fn malformed_values_keep_defaults() {
		let query = items_query(&params(&[
			("flags", "lots"),
			("older", "abc"),
			("likes", "   "),
			("promoted", "yes please"),
		]));

		assert_eq!(query, ItemsQuery::default());

		let query = items_query(&params(&[("flags", "16")]));

		assert_eq!(query.content_types, ContentFlags::SFW);
	}

	#[test]
	fn id_opens_a_page_around_an_item() {
		let query = items_query(&params(&[("id", "500")]));

		assert_eq!(query.around, Some(500));
		assert_eq!(query.window().older, Some(501));
	}
}
