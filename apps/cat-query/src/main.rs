use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = cat_query::Args::parse();

	cat_query::run(args).await
}
