use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::{
	Parser, Subcommand,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use tracing_subscriber::EnvFilter;

use cat_service::{
	AverageRatingRequest, CatalogService, DatasetRequest, Envelope, GetItemRequest,
	ListItemsRequest, QueryIntent, RelationshipRequest,
};

#[derive(Debug, Parser)]
#[command(version, rename_all = "kebab", styles = styles())]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
	/// Run a search intent read from a JSON file.
	Search {
		#[arg(long, short = 'r', value_name = "FILE")]
		request: PathBuf,
	},
	/// Count the items matching a search intent read from a JSON file.
	Count {
		#[arg(long, short = 'r', value_name = "FILE")]
		request: PathBuf,
	},
	/// List items related to one catalogue item.
	Relationship {
		#[arg(long)]
		id: String,
		#[arg(long)]
		rel: String,
		#[arg(long)]
		limit: Option<u32>,
		#[arg(long)]
		offset: Option<u32>,
		#[arg(long, value_delimiter = ',')]
		filter: Option<Vec<String>>,
	},
	/// Fetch one item by id.
	Item {
		#[arg(long)]
		id: String,
	},
	/// List distinct ids of a type, or distinct tags.
	List {
		#[arg(long)]
		item_type: String,
		#[arg(long = "type")]
		type_tag: Option<String>,
		#[arg(long)]
		instance: Option<String>,
	},
	/// Average approved rating of an item.
	Rating {
		#[arg(long)]
		id: String,
	},
	/// Assemble the dataset view of a resource group.
	Dataset {
		#[arg(long)]
		id: String,
	},
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = cat_config::load(&args.config)?;

	init_tracing(&config)?;

	let service = CatalogService::new(config);
	let envelope = dispatch(&service, args.command).await?;

	tracing::debug!(urn = envelope.urn.as_str(), "Request finished.");

	println!("{}", serde_json::to_string_pretty(&envelope)?);

	Ok(())
}

async fn dispatch(service: &CatalogService, command: Command) -> color_eyre::Result<Envelope> {
	let envelope = match command {
		Command::Search { request } => service.search(read_intent(&request)?).await,
		Command::Count { request } => service.count(read_intent(&request)?).await,
		Command::Relationship { id, rel, limit, offset, filter } =>
			service
				.list_relationship(RelationshipRequest { id, relationship: rel, limit, offset, filter })
				.await,
		Command::Item { id } => service.get_item(GetItemRequest { id }).await,
		Command::List { item_type, type_tag, instance } =>
			service
				.list_items(ListItemsRequest {
					item_type,
					type_tag,
					instance,
					..Default::default()
				})
				.await,
		Command::Rating { id } => service.average_rating(AverageRatingRequest { id }).await,
		Command::Dataset { id } => service.dataset(DatasetRequest { id }).await,
	};

	Ok(envelope)
}

fn read_intent(path: &Path) -> color_eyre::Result<QueryIntent> {
	let raw = fs::read_to_string(path)?;

	Ok(serde_json::from_str(&raw)?)
}

fn init_tracing(config: &cat_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}

fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Red.on_default() | Effects::BOLD)
		.usage(AnsiColor::Red.on_default() | Effects::BOLD)
		.literal(AnsiColor::Blue.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}
