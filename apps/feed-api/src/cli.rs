use std::path::PathBuf;

use clap::{
	Parser,
	builder::{
		Styles,
		styling::{AnsiColor, Effects, Style},
	},
};

/// `<crate version> (<git sha>, <target triple>)`, as printed by `--version`.
pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	" (",
	env!("VERGEN_GIT_SHA"),
	", ",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
	")",
);

/// Serves item pages for the category feeds over HTTP.
#[derive(Debug, Parser)]
#[command(version = VERSION, rename_all = "kebab", styles = styles())]
pub struct Args {
	/// Service configuration in TOML.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

fn styles() -> Styles {
	let heading: Style = AnsiColor::Magenta.on_default() | Effects::BOLD;

	Styles::styled()
		.header(heading)
		.usage(heading)
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::White.on_default() | Effects::DIMMED)
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn config_flag_is_required() {
		Args::command().debug_assert();

		assert!(Args::try_parse_from(["feed-api"]).is_err());

		let args = Args::try_parse_from(["feed-api", "-c", "feed.toml"]).expect("args");

		assert_eq!(args.config, PathBuf::from("feed.toml"));
	}
}
