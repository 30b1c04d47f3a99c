use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use bazaar_api::{AppError, HttpTransport, NoticeHandle, NoticeKind, Notifier, SessionContext};
use bazaar_client::{ConversationResolver, ListingDraft, ListingPatch, ResourceClient};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "bazaar-cli")]
#[command(about = "CLI host for the Bazaar marketplace client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the current user's favorites.
    Favorites,
    /// Toggle the favorite state of a listing.
    Favorite(FavoriteArgs),
    /// Show one listing.
    Listing(ListingArgs),
    /// Show listings similar to one being viewed.
    Similar(SimilarArgs),
    /// Publish a new listing.
    Publish(PublishArgs),
    /// Update fields of an existing listing.
    Update(UpdateArgs),
    /// Show a seller profile.
    Seller(SellerArgs),
    /// Show reviews for a seller.
    Reviews(ReviewsArgs),
    /// Show messages in a conversation.
    Messages(MessagesArgs),
    /// Send a message into a conversation.
    Send(SendArgs),
    /// Open (or re-open) the conversation with a seller about a listing.
    Contact(ContactArgs),
}

#[derive(clap::Args, Debug)]
struct FavoriteArgs {
    listing_id: String,
    /// The listing is currently favorited; toggling removes it.
    #[arg(long, action = ArgAction::SetTrue)]
    remove: bool,
}

#[derive(clap::Args, Debug)]
struct ListingArgs {
    listing_id: String,
}

#[derive(clap::Args, Debug)]
struct SimilarArgs {
    category: String,
    #[arg(long)]
    exclude: String,
}

#[derive(clap::Args, Debug)]
struct PublishArgs {
    #[arg(long)]
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    price_cents: i64,
    #[arg(long)]
    image_url: Option<String>,
}

#[derive(clap::Args, Debug)]
struct UpdateArgs {
    listing_id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    price_cents: Option<i64>,
    #[arg(long)]
    image_url: Option<String>,
}

#[derive(clap::Args, Debug)]
struct SellerArgs {
    seller_id: String,
}

#[derive(clap::Args, Debug)]
struct ReviewsArgs {
    seller_id: String,
}

#[derive(clap::Args, Debug)]
struct MessagesArgs {
    conversation_id: String,
}

#[derive(clap::Args, Debug)]
struct SendArgs {
    conversation_id: String,
    body: String,
}

#[derive(clap::Args, Debug)]
struct ContactArgs {
    #[arg(long)]
    buyer: String,
    #[arg(long)]
    seller: String,
    #[arg(long)]
    listing: String,
}

/// Prints notices to stderr so stdout stays valid JSON.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) -> NoticeHandle {
        let label = match kind {
            NoticeKind::Info => "info",
            NoticeKind::Success => "ok",
            NoticeKind::Warning => "warn",
            NoticeKind::Error => "error",
        };
        eprintln!("[{label}] {message}");
        NoticeHandle(0)
    }

    fn dismiss(&self, _handle: NoticeHandle) {}
}

fn build_client() -> ResourceClient {
    let base_url =
        env::var("BAZAAR_API_URL").unwrap_or_else(|_| "http://localhost:8000/api".to_string());
    let session = match env::var("BAZAAR_API_TOKEN") {
        Ok(token) => SessionContext::with_bearer(token),
        Err(_) => SessionContext::anonymous(),
    };
    let transport = HttpTransport::new(base_url, session);
    ResourceClient::new(Arc::new(transport), Arc::new(StderrNotifier))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("[error] could not render output: {e}"),
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let client = build_client();

    match cli.command {
        Commands::Favorites => {
            let page = client.fetch_favorites().await?;
            print_json(&page);
        }
        Commands::Favorite(args) => {
            let now_favorite = client.toggle_favorite(&args.listing_id, args.remove).await?;
            print_json(&json!({ "listing_id": args.listing_id, "is_favorite": now_favorite }));
        }
        Commands::Listing(args) => {
            let listing = client.get_listing(&args.listing_id).await?;
            print_json(&listing);
        }
        Commands::Similar(args) => {
            let listings = client.get_similar_listings(&args.category, &args.exclude).await;
            print_json(&listings);
        }
        Commands::Publish(args) => {
            let draft = ListingDraft {
                title: args.title,
                description: args.description,
                category: args.category,
                price_cents: args.price_cents,
                image_url: args.image_url,
            };
            let listing = client.upload_listing(&draft).await?;
            print_json(&listing);
        }
        Commands::Update(args) => {
            let patch = ListingPatch {
                title: args.title,
                description: args.description,
                category: args.category,
                price_cents: args.price_cents,
                image_url: args.image_url,
            };
            let listing = client.update_listing(&args.listing_id, &patch).await?;
            print_json(&listing);
        }
        Commands::Seller(args) => {
            let seller = client.get_seller(&args.seller_id).await?;
            print_json(&seller);
        }
        Commands::Reviews(args) => {
            let page = client.get_seller_reviews(&args.seller_id).await?;
            print_json(&page);
        }
        Commands::Messages(args) => {
            let page = client.fetch_messages(&args.conversation_id).await?;
            print_json(&page);
        }
        Commands::Send(args) => {
            let message = client.send_message(&args.conversation_id, &args.body).await?;
            print_json(&message);
        }
        Commands::Contact(args) => {
            let resolver = ConversationResolver::new(client);
            let conversation_id = resolver
                .resolve(&args.buyer, &args.seller, &args.listing)
                .await?;
            print_json(&json!({ "conversation_id": conversation_id }));
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
