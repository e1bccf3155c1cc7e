pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Resolution failed: {message}")]
	Resolution { message: String },
	#[error("Fetch failed: {message}")]
	Fetch { message: String },
	#[error("Invalid request: {message}")]
	Validation { message: String },
}
impl From<feed_domain::Error> for Error {
	fn from(err: feed_domain::Error) -> Self {
		match err {
			feed_domain::Error::Validation { message } => Self::Validation { message },
			feed_domain::Error::InvalidPredicate { message } => Self::Resolution { message },
		}
	}
}
