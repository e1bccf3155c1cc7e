pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	Validation { message: String },
	#[error("Invalid predicate: {message}")]
	InvalidPredicate { message: String },
}
