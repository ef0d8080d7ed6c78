mod display;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use display::{flush, print_details, print_page, Row};
use rumin::api::{
    Ack, ActionsApi, AdminApi, ApiClient, AuthApi, ListingSource, ListingUpdate, ListingsApi,
    StatusCounts, StatusTransition,
};
use rumin::models::{Hostel, ListingKind, ListingStatus, Room};
use rumin::notify::{Notification, Notifications, Notifier};
use rumin::pipeline::{view_lifetime, FilterParams, SearchPage, SortKey};
use rumin::session::{Session, TokenStore};
use rumin::validation::{HostelForm, LandlordForm, RoomForm, SignUpForm};
use rumin::Config;

#[derive(Parser)]
#[command(name = "rumin")]
#[command(about = "Find rooms and hostels to rent, and manage your listings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search rooms
    Rooms(SearchArgs),

    /// Search hostels
    Hostels(SearchArgs),

    /// Show one listing in full
    Show { kind: ListingKind, id: String },

    /// Create a renter account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: Option<String>,
    },

    /// Sign in as a renter or landlord
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Register as a landlord
    RegisterLandlord {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        phone: String,
    },

    /// Forget the signed-in account
    Signout,

    /// Admin back office
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Saved listings
    #[command(subcommand)]
    Bookmark(BookmarkCommand),

    /// Send the landlord a message about a listing
    Enquire {
        kind: ListingKind,
        id: String,
        message: String,
    },

    /// Mark or unmark interest in a listing
    #[command(subcommand)]
    Interest(InterestCommand),

    /// Submit a new listing for review
    #[command(subcommand)]
    Submit(SubmitCommand),
}

#[derive(Args)]
struct SearchArgs {
    /// Only listings that are available now
    #[arg(long)]
    available: bool,

    /// BHK for rooms ("2 BHK"), type for hostels ("Girls")
    #[arg(long)]
    category: Option<String>,

    /// Required amenity, repeatable
    #[arg(long = "amenity")]
    amenities: Vec<String>,

    #[arg(long)]
    min_price: Option<i64>,

    #[arg(long)]
    max_price: Option<i64>,

    /// City, address or state
    #[arg(long, short)]
    query: Option<String>,

    /// recommended, price-asc, price-desc or newest
    #[arg(long, default_value = "recommended")]
    sort: SortKey,

    /// How many pages to show
    #[arg(long, default_value_t = 1)]
    pages: usize,
}

impl SearchArgs {
    fn filters(&self) -> FilterParams {
        FilterParams {
            available_only: self.available,
            category: self.category.clone(),
            amenities: self.amenities.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
            query: self.query.clone(),
        }
    }
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Sign in to the admin panel
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// List every listing of a type, whatever its status
    List {
        kind: ListingKind,
        #[arg(long)]
        status: Option<ListingStatus>,
    },

    /// approve, reject, book or unbook a listing
    SetStatus {
        kind: ListingKind,
        id: String,
        action: StatusTransition,
    },

    /// Edit listing fields
    Update {
        kind: ListingKind,
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<i64>,
        #[arg(long = "amenity")]
        amenities: Vec<String>,
        #[arg(long)]
        available_beds: Option<u32>,
    },

    Delete {
        kind: ListingKind,
        id: String,
    },

    Logout,
}

#[derive(Subcommand)]
enum BookmarkCommand {
    Add { kind: ListingKind, id: String },
    Remove { id: String },
    List,
}

#[derive(Subcommand)]
enum InterestCommand {
    Add { kind: ListingKind, id: String },
    Remove { id: String },
}

#[derive(Args)]
struct ListingArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    /// Monthly rent
    #[arg(long)]
    price: String,
    #[arg(long = "amenity")]
    amenities: Vec<String>,
    /// Photo to upload, repeatable. The first is the cover.
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum SubmitCommand {
    Room {
        #[command(flatten)]
        listing: ListingArgs,
        #[arg(long)]
        bhk: String,
    },
    Hostel {
        #[command(flatten)]
        listing: ListingArgs,
        #[arg(long)]
        hostel_type: String,
        #[arg(long)]
        total_beds: String,
        #[arg(long)]
        available_beds: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load();
    let store = TokenStore::open(&config.session_file).with_context(|| {
        format!("Failed to open session file {}", config.session_file.display())
    })?;
    let session = Arc::new(Session::new(store));
    let client = ApiClient::new(&config, session).context("Failed to create HTTP client")?;
    debug!("Using API at {}", client.base_url());
    let notes = Notifications::new();

    let outcome = run(cli.command, &client, &config, &notes).await;
    flush(&notes);
    outcome
}

async fn run(
    command: Command,
    client: &ApiClient,
    config: &Config,
    notes: &Notifications,
) -> Result<()> {
    match command {
        Command::Rooms(args) => {
            let source = ListingsApi::<Room>::new(client.clone());
            search(&source, args, config, notes).await
        }
        Command::Hostels(args) => {
            let source = ListingsApi::<Hostel>::new(client.clone());
            search(&source, args, config, notes).await
        }
        Command::Show { kind, id } => match kind {
            ListingKind::Room => show::<Room>(client, &id).await,
            ListingKind::Hostel => show::<Hostel>(client, &id).await,
        },
        Command::Signup {
            name,
            email,
            password,
            phone,
        } => {
            let form = SignUpForm {
                name,
                email,
                password,
                phone,
            };
            let user = report(notes, AuthApi::new(client.clone()).sign_up(&form).await)?;
            let message = match user {
                Some(user) => format!("Welcome, {}!", user.name),
                None => "Account created. You can sign in now.".to_string(),
            };
            notes.notify(Notification::success(message));
            Ok(())
        }
        Command::Signin { email, password } => {
            let auth = AuthApi::new(client.clone());
            let user = report(notes, auth.sign_in(&email, &password).await)?;
            notes.notify(Notification::success(format!("Signed in as {}", user.name)));
            Ok(())
        }
        Command::RegisterLandlord {
            name,
            email,
            password,
            phone,
        } => {
            let form = LandlordForm {
                name,
                email,
                password,
                phone,
            };
            report(notes, AuthApi::new(client.clone()).register_landlord(&form).await)?;
            notes.notify(Notification::success("Landlord account registered"));
            Ok(())
        }
        Command::Signout => {
            AuthApi::new(client.clone()).sign_out()?;
            notes.notify(Notification::info("Signed out"));
            Ok(())
        }
        Command::Admin(command) => admin(command, client, config, notes).await,
        Command::Bookmark(command) => {
            let actions = ActionsApi::new(client.clone());
            match command {
                BookmarkCommand::Add { kind, id } => {
                    acknowledge(notes, actions.bookmark(kind, &id).await, "Bookmarked")
                }
                BookmarkCommand::Remove { id } => {
                    acknowledge(notes, actions.remove_bookmark(&id).await, "Bookmark removed")
                }
                BookmarkCommand::List => {
                    let bookmarks = report(notes, actions.bookmarks().await)?;
                    if bookmarks.is_empty() {
                        println!("No bookmarks yet");
                    }
                    for bookmark in bookmarks {
                        let title = bookmark.title.as_deref().unwrap_or("");
                        println!("{} {}  {title}", bookmark.listing_type, bookmark.listing_id);
                    }
                    Ok(())
                }
            }
        }
        Command::Enquire { kind, id, message } => {
            let actions = ActionsApi::new(client.clone());
            acknowledge(notes, actions.enquire(kind, &id, &message).await, "Enquiry sent")
        }
        Command::Interest(command) => {
            let actions = ActionsApi::new(client.clone());
            match command {
                InterestCommand::Add { kind, id } => acknowledge(
                    notes,
                    actions.express_interest(kind, &id).await,
                    "Marked as interested",
                ),
                InterestCommand::Remove { id } => {
                    acknowledge(notes, actions.withdraw_interest(&id).await, "Interest withdrawn")
                }
            }
        }
        Command::Submit(command) => submit(command, client, notes).await,
    }
}

async fn search<L, S>(
    source: &S,
    args: SearchArgs,
    config: &Config,
    notes: &Notifications,
) -> Result<()>
where
    L: Row,
    S: ListingSource<L>,
{
    let (_teardown, lifetime) = view_lifetime();
    let mut page = SearchPage::<L>::new().with_load_more_delay(config.load_more_delay);
    page.set_filters(args.filters());
    page.set_sort(args.sort);

    page.mount(source, &lifetime, notes)
        .await
        .context("Search was cancelled")?;
    for _ in 1..args.pages {
        if !page.on_sentinel_visible(1.0).await {
            break;
        }
    }

    flush(notes);
    print_page(&page);
    Ok(())
}

async fn show<L: Row>(client: &ApiClient, id: &str) -> Result<()> {
    let listing = ListingsApi::<L>::new(client.clone())
        .get(id)
        .await
        .with_context(|| format!("Failed to load {} {id}", L::KIND))?;
    print_details(&listing);
    Ok(())
}

async fn admin(
    command: AdminCommand,
    client: &ApiClient,
    config: &Config,
    notes: &Notifications,
) -> Result<()> {
    let api = AdminApi::new(client.clone());
    match command {
        AdminCommand::Login { email, password } => {
            report(notes, AuthApi::new(client.clone()).admin_login(&email, &password).await)?;
            notes.notify(Notification::success("Admin signed in"));
            Ok(())
        }
        AdminCommand::List { kind, status } => match kind {
            ListingKind::Room => dashboard::<Room>(&api, status, config, notes).await,
            ListingKind::Hostel => dashboard::<Hostel>(&api, status, config, notes).await,
        },
        AdminCommand::SetStatus { kind, id, action } => acknowledge(
            notes,
            api.transition(kind, &id, action).await,
            &format!("{kind} {id}: {}", action.target()),
        ),
        AdminCommand::Update {
            kind,
            id,
            title,
            description,
            price,
            amenities,
            available_beds,
        } => {
            let update = ListingUpdate {
                title,
                description,
                price,
                amenities: (!amenities.is_empty()).then_some(amenities),
                available_beds,
            };
            acknowledge(notes, api.update(kind, &id, &update).await, "Listing updated")
        }
        AdminCommand::Delete { kind, id } => {
            acknowledge(notes, api.delete(kind, &id).await, "Listing deleted")
        }
        AdminCommand::Logout => {
            client.session().admin_sign_out()?;
            notes.notify(Notification::info("Admin signed out"));
            Ok(())
        }
    }
}

async fn dashboard<L: Row>(
    api: &AdminApi,
    status: Option<ListingStatus>,
    config: &Config,
    notes: &Notifications,
) -> Result<()> {
    let (_teardown, lifetime) = view_lifetime();
    let mut page = SearchPage::<L>::new().with_load_more_delay(config.load_more_delay);
    page.mount(api, &lifetime, notes)
        .await
        .context("Dashboard load was cancelled")?;

    let all: Vec<L> = page.results().into_iter().cloned().collect();
    let counts = StatusCounts::tally(&all);
    if let Some(status) = status {
        page = page.with_predicate(move |listing: &L| listing.status() == status);
    }
    while page.advance() {}

    flush(notes);
    println!("All {}s: {counts}\n", L::KIND);
    print_page(&page);
    Ok(())
}

async fn submit(command: SubmitCommand, client: &ApiClient, notes: &Notifications) -> Result<()> {
    match command {
        SubmitCommand::Room { listing, bhk } => {
            let form = RoomForm {
                title: listing.title,
                description: listing.description,
                bhk,
                address: listing.address,
                city: listing.city,
                state: listing.state,
                price: listing.price,
                amenities: listing.amenities,
                images: listing.images,
            };
            let submission = report(notes, form.validate())?;
            let api = ListingsApi::<Room>::new(client.clone());
            acknowledge(notes, api.create(&submission).await, "Room submitted for review")
        }
        SubmitCommand::Hostel {
            listing,
            hostel_type,
            total_beds,
            available_beds,
        } => {
            let form = HostelForm {
                title: listing.title,
                description: listing.description,
                hostel_type,
                address: listing.address,
                city: listing.city,
                state: listing.state,
                price: listing.price,
                total_beds,
                available_beds,
                amenities: listing.amenities,
                images: listing.images,
            };
            let submission = report(notes, form.validate())?;
            let api = ListingsApi::<Hostel>::new(client.clone());
            acknowledge(notes, api.create(&submission).await, "Hostel submitted for review")
        }
    }
}

/// Surface a failure as a notification, then hand it to `main`.
fn report<T>(notes: &Notifications, result: rumin::Result<T>) -> Result<T> {
    result.map_err(|e| {
        notes.notify(Notification::error(e.user_message()));
        anyhow::Error::new(e)
    })
}

fn acknowledge(notes: &Notifications, result: rumin::Result<Ack>, fallback: &str) -> Result<()> {
    let ack = report(notes, result)?;
    let message = ack.message.filter(|m| !m.trim().is_empty());
    notes.notify(Notification::success(message.unwrap_or_else(|| fallback.to_string())));
    Ok(())
}
