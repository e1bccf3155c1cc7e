//! Predicate builders for the two candidate sources: boolean expressions for the tag search
//! service and `tsquery` documents for direct SQL lookups.

use std::sync::LazyLock;

use regex::Regex;

use crate::{ContentFlags, Error, ItemsQuery, Result};

pub const TERM_TOP: &str = "f:top";
pub const TERM_TEXT: &str = "f:text";
pub const TERM_CONTROVERSIAL: &str = "f:controversial";

const TSQUERY_OPERATORS: [char; 6] = ['!', '|', '&', ':', '<', '>'];

static NAME_PATTERN: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").ok());

/// `(f:sfw|f:nsfw)` style group, omitted when every content type is requested.
pub fn content_types_term(content_types: ContentFlags) -> Option<String> {
	if content_types.contains(ContentFlags::ALL) || content_types.is_empty() {
		return None;
	}

	let terms = content_types.iter().filter_map(ContentFlags::search_term).collect::<Vec<_>>();

	Some(format!("({})", terms.join("|")))
}

/// Conjunction of an optional tag expression with an extra category term.
pub fn and_tags(previous: Option<&str>, additional: &str) -> String {
	match previous {
		Some(previous) if !previous.trim().is_empty() => format!("({previous})&({additional})"),
		_ => format!("({additional})"),
	}
}

pub fn score_term(min_score: i64) -> String {
	format!("s:{min_score}")
}

/// Composes the full search expression for a query, with `extra` ANDed into the tag term.
pub fn search_expression(query: &ItemsQuery, extra: Option<&str>) -> Result<String> {
	let mut terms = Vec::new();

	if let Some(term) = content_types_term(query.content_types) {
		terms.push(term);
	}

	let tags = query.tags.as_deref().map(validate_tags).transpose()?;
	let tags = match extra {
		Some(extra) => Some(and_tags(tags, extra)),
		None => tags.map(str::to_string),
	};

	if let Some(tags) = tags {
		terms.push(format!("({tags})"));
	}
	if let Some(user) = query.user.as_deref() {
		terms.push(format!("u:{}", validate_name("user", user)?));
	}
	if let Some(likes) = query.likes.as_deref() {
		terms.push(format!("l:{}", validate_name("likes", likes)?));
	}
	if query.top_only {
		terms.push(TERM_TOP.to_string());
	}

	Ok(terms.join("&"))
}

/// Accepts a user supplied boolean sub-expression if its parentheses balance and no group is
/// empty.
pub fn validate_tags(tags: &str) -> Result<&str> {
	let trimmed = tags.trim();

	if trimmed.is_empty() {
		return Err(predicate_error("Tag expression must not be empty."));
	}

	let mut depth = 0_usize;
	let mut previous = None;

	for ch in trimmed.chars().filter(|ch| !ch.is_whitespace()) {
		match ch {
			'(' => depth += 1,
			')' => {
				if depth == 0 {
					return Err(predicate_error("Tag expression has an unmatched ')'."));
				}
				if previous == Some('(') {
					return Err(predicate_error("Tag expression contains an empty group."));
				}

				depth -= 1;
			},
			_ => {},
		}

		previous = Some(ch);
	}

	if depth != 0 {
		return Err(predicate_error("Tag expression has an unmatched '('."));
	}

	Ok(trimmed)
}

pub fn validate_name<'a>(label: &str, name: &'a str) -> Result<&'a str> {
	let name = name.trim();

	if NAME_PATTERN.as_ref().is_some_and(|pattern| pattern.is_match(name)) {
		Ok(name)
	} else {
		Err(predicate_error(format!("{label} must only contain letters, digits, '_' or '-'.")))
	}
}

/// Normalizes free-form tags into a `tsquery` AND expression of quoted lexemes.
/// Search operators have no lexeme meaning here and are rejected instead of quoted.
pub fn tag_tsquery(tags: &str) -> Result<String> {
	let mut lexemes = Vec::new();

	for term in validate_tags(tags)?
		.split(|ch: char| ch.is_whitespace() || ch == '(' || ch == ')')
		.filter(|term| !term.is_empty())
	{
		if let Some(operator) = term.chars().find(|ch| TSQUERY_OPERATORS.contains(ch)) {
			return Err(predicate_error(format!(
				"Tag term {term:?} contains unsupported operator '{operator}'."
			)));
		}

		let escaped = term.to_lowercase().replace('\\', "\\\\").replace('\'', "\\'");

		lexemes.push(format!("'{escaped}'"));
	}

	if lexemes.is_empty() {
		return Err(predicate_error("Tag predicate must contain at least one term."));
	}

	Ok(lexemes.join(" & "))
}

fn predicate_error(message: impl Into<String>) -> Error {
	Error::InvalidPredicate { message: message.into() }
}
