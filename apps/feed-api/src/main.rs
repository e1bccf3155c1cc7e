use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = feed_api::Args::parse();

	feed_api::run(args).await
}
