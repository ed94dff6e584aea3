use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = insight_api::Args::parse();

	insight_api::run(args).await
}
