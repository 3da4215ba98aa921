//! reserve: resumable booking wizard on the command line
//!
//! Every invocation restores the wizard from the local store, applies one
//! action and prints the resulting state. The session expires after the
//! configured TTL like any other front end would.

mod logging;
mod view;

use anyhow::{Context, anyhow};
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use reserve_client::{BookingApi, HttpClient};
use reserve_core::{
    AvailabilityQuery, AvailabilityResolver, BookingStep, BookingWizard, CartStore, Config,
    RedbStore, RoomView, SessionPersistence, SubmissionGateway, SystemClock, WizardError,
};
use shared::{LocationType, MenuItem};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "reserve", version, about = "Table and room reservation wizard")]
struct Cli {
    /// Booking API base URL
    #[arg(long, env = "RESERVE_API_URL")]
    api_url: Option<String>,

    /// Directory for the local store and logs
    #[arg(long, env = "RESERVE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the current booking
    Status,
    /// List the menu with cart quantities
    Menu,
    /// Edit the shared cart
    #[command(subcommand)]
    Cart(CartCommand),
    /// Set date, time, party size and location
    Basics {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        #[arg(long)]
        guests: Option<u32>,
        #[arg(long)]
        location: Option<LocationType>,
        #[arg(long)]
        audio: Option<bool>,
    },
    /// Continue to the next step
    Next,
    /// List rooms for the current date, time and filters
    Rooms,
    /// Select a room from the current list
    Select { room_id: i64 },
    /// Go back one step
    Back,
    /// Set contact details
    Contact {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Edit the booking's dishes
    #[command(subcommand)]
    Dish(DishCommand),
    /// Remove every dish from the booking and the cart
    ClearDishes,
    /// Submit the booking
    Submit,
    /// Start a new booking
    Reset,
}

#[derive(Debug, Subcommand)]
enum CartCommand {
    Add { item_id: String },
    Remove { item_id: String },
    Set {
        item_id: String,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
    Clear,
}

#[derive(Debug, Subcommand)]
enum DishCommand {
    Toggle { item_id: String },
    Set {
        item_id: String,
        #[arg(allow_negative_numbers = true)]
        qty: i64,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got '{}'", value))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    shared::time_format::parse_time(value).ok_or_else(|| format!("expected HH:MM, got '{}'", value))
}

fn user_error(e: WizardError) -> anyhow::Error {
    anyhow!(e.user_message())
}

struct App {
    config: Config,
    api: Arc<HttpClient>,
    cart: CartStore,
    wizard: BookingWizard,
}

impl App {
    fn open(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(
            RedbStore::open(config.store_path())
                .with_context(|| format!("Failed to open {}", config.store_path().display()))?,
        );
        let api = Arc::new(config.client_config().build_http_client()?);

        let cart = CartStore::load(store.clone());
        let persistence =
            SessionPersistence::new(store, Arc::new(SystemClock)).with_ttl(config.session_ttl());
        let wizard = BookingWizard::new(cart.clone(), persistence);

        Ok(Self {
            config,
            api,
            cart,
            wizard,
        })
    }

    async fn fetch_rooms(&self) -> anyhow::Result<Vec<RoomView>> {
        let mut resolver = AvailabilityResolver::new();
        let query = AvailabilityQuery::from_session(self.wizard.session());
        resolver
            .refresh(self.api.as_ref(), &query)
            .await
            .context("Failed to load rooms")
    }

    async fn fetch_menu(&self) -> anyhow::Result<Vec<MenuItem>> {
        self.api
            .fetch_menu_items()
            .await
            .context("Failed to load menu")
    }

    async fn run(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Status => {}
            Command::Menu => {
                let menu = self.fetch_menu().await?;
                view::print_menu(&menu, &self.cart);
                return Ok(());
            }
            Command::Cart(cmd) => {
                match cmd {
                    CartCommand::Add { item_id } => self.cart.add(&item_id),
                    CartCommand::Remove { item_id } => self.cart.remove(&item_id),
                    CartCommand::Set { item_id, qty } => self.cart.set_quantity(&item_id, qty),
                    CartCommand::Clear => self.cart.clear(),
                }
                self.wizard.sync_cart();
            }
            Command::Basics {
                date,
                time,
                guests,
                location,
                audio,
            } => {
                let w = &mut self.wizard;
                if let Some(date) = date {
                    w.set_date(date).map_err(user_error)?;
                }
                if let Some(time) = time {
                    w.set_time(time).map_err(user_error)?;
                }
                if let Some(guests) = guests {
                    w.set_guest_count(guests).map_err(user_error)?;
                }
                if let Some(location) = location {
                    w.set_location_type(location).map_err(user_error)?;
                }
                if let Some(audio) = audio {
                    w.set_audio_needed(audio).map_err(user_error)?;
                }
            }
            Command::Next => self.next().await?,
            Command::Rooms => {
                let rooms = self.fetch_rooms().await?;
                view::print_rooms(&rooms);
                return Ok(());
            }
            Command::Select { room_id } => {
                let rooms = self.fetch_rooms().await?;
                let room = rooms
                    .iter()
                    .find(|r| r.id == room_id)
                    .ok_or_else(|| anyhow!("Room {} does not match the current filters", room_id))?;
                self.wizard.select_room(room).map_err(user_error)?;
            }
            Command::Back => {
                self.wizard.back().map_err(user_error)?;
            }
            Command::Contact { name, phone, note } => {
                let w = &mut self.wizard;
                if let Some(name) = name {
                    w.set_customer_name(name).map_err(user_error)?;
                }
                if let Some(phone) = phone {
                    w.set_customer_phone(phone).map_err(user_error)?;
                }
                if let Some(note) = note {
                    w.set_note(note).map_err(user_error)?;
                }
            }
            Command::Dish(cmd) => match cmd {
                DishCommand::Toggle { item_id } => {
                    self.wizard.toggle_dish(&item_id).map_err(user_error)?
                }
                DishCommand::Set { item_id, qty } => {
                    self.wizard.update_dish_qty(&item_id, qty).map_err(user_error)?
                }
            },
            Command::ClearDishes => self.wizard.clear_dishes().map_err(user_error)?,
            Command::Submit => {
                let gateway = SubmissionGateway::new(self.api.clone())
                    .with_duration_minutes(self.config.booking_duration_minutes);
                if let Err(e) = gateway.submit(&mut self.wizard).await {
                    tracing::warn!(error = %e, "Submit failed");
                    return Err(anyhow!(e.user_message()));
                }
            }
            Command::Reset => self.wizard.start_over(),
        }

        self.print().await;
        Ok(())
    }

    async fn next(&mut self) -> anyhow::Result<()> {
        match self.wizard.step() {
            BookingStep::Basics => {
                self.wizard.continue_from_basics().map_err(user_error)?;
            }
            BookingStep::Room => {
                let rooms = self.fetch_rooms().await?;
                self.wizard
                    .continue_from_room(Some(&rooms))
                    .map_err(user_error)?;
            }
            BookingStep::Menu => {
                self.wizard.continue_from_menu().map_err(user_error)?;
            }
            BookingStep::Confirm => {
                println!("Run `reserve submit` to place the booking");
            }
            BookingStep::Submitted => {
                println!("Run `reserve reset` to start a new booking");
            }
        }
        Ok(())
    }

    async fn print(&self) {
        let menu = if self.wizard.step() == BookingStep::Confirm {
            match self.fetch_menu().await {
                Ok(menu) => Some(menu),
                Err(e) => {
                    tracing::warn!(error = %e, "Menu unavailable, showing ids only");
                    None
                }
            }
        } else {
            None
        };
        view::print_status(&self.wizard, menu.as_deref());

        if self.wizard.step() == BookingStep::Room {
            match self.fetch_rooms().await {
                Ok(rooms) => view::print_rooms(&rooms),
                Err(e) => tracing::warn!(error = %e, "Rooms unavailable"),
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create {}", config.data_dir.display()))?;

    let _guard = logging::init(&config.log_dir())?;
    tracing::debug!(api_url = %config.api_url, data_dir = %config.data_dir.display(), "Starting");

    let mut app = App::open(config)?;
    app.run(cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basics_flags() {
        let cli = Cli::try_parse_from([
            "reserve", "basics", "--date", "2026-10-24", "--time", "19:30", "--guests", "4",
            "--location", "outdoor", "--audio", "false",
        ])
        .unwrap();
        match cli.command {
            Command::Basics {
                date,
                time,
                guests,
                location,
                audio,
            } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2026, 10, 24));
                assert_eq!(time, NaiveTime::from_hms_opt(19, 30, 0));
                assert_eq!(guests, Some(4));
                assert_eq!(location, Some(LocationType::Outdoor));
                assert_eq!(audio, Some(false));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_negative_quantity() {
        let cli = Cli::try_parse_from(["reserve", "cart", "set", "12", "-1"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Cart(CartCommand::Set { qty: -1, .. })
        ));
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(Cli::try_parse_from(["reserve", "basics", "--date", "24/10/2026"]).is_err());
    }
}
