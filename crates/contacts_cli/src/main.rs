//! Command-line front end for the contacts core.
//!
//! # Responsibility
//! - Drive the screen controllers with the same actions a UI would send.
//! - Render the resulting state as plain text or JSON.
//!
//! # Invariants
//! - Never writes to the store directly; every mutation goes through a
//!   controller action.
//! - Flushes the store before exiting so fire-and-forget writes land.

use clap::{Parser, Subcommand};
use contacts_core::controller::{add_or_edit, contacts, favorites};
use contacts_core::{
    init_logging, AddOrEditScreen, Contact, ContactId, ContactsScreen, ContactsStore, CoreConfig,
    FavoritesScreen, INVALID_CONTACT_ID,
};
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::watch;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "contacts", version, about = "Manage contacts from the terminal")]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print contacts as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// List contacts, optionally filtered.
    List {
        #[arg(long, default_value = "")]
        search: String,
    },
    /// List favorite contacts.
    Favorites,
    /// Add a new contact.
    Add {
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        /// Defaults to the configured phone prefix.
        #[arg(long)]
        phone: Option<String>,
    },
    /// Change fields of an existing contact.
    Edit {
        id: ContactId,
        #[arg(long)]
        first: Option<String>,
        #[arg(long)]
        last: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a contact.
    Delete { id: ContactId },
    /// Flip the favorite flag of a contact.
    ToggleFavorite { id: ContactId },
    /// Mark several contacts as favorites.
    Promote {
        #[arg(required = true)]
        ids: Vec<ContactId>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(CoreConfig::default_path);
    let mut config = CoreConfig::load(&config_path)?;
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }

    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = ContactsStore::open(&config.db_path)?;
    info!("event=cli_command module=cli status=start");

    match cli.command {
        CliCommand::List { search } => list(&store, search, cli.json).await?,
        CliCommand::Favorites => list_favorites(&store, cli.json).await?,
        CliCommand::Add { first, last, phone } => {
            add(&store, &config.phone_prefix, first, last, phone).await?
        }
        CliCommand::Edit {
            id,
            first,
            last,
            phone,
        } => edit(&store, id, first, last, phone).await?,
        CliCommand::Delete { id } => {
            on_listed_contact(&store, id, contacts::Action::DeleteContact(id)).await?
        }
        CliCommand::ToggleFavorite { id } => {
            on_listed_contact(&store, id, contacts::Action::ToggleFavorite(id)).await?
        }
        CliCommand::Promote { ids } => promote(&store, &ids).await?,
    }

    store.flush().wait().await?;
    info!("event=cli_command module=cli status=ok");
    Ok(())
}

async fn loaded<S: Clone>(
    states: &mut watch::Receiver<S>,
    is_loading: impl Fn(&S) -> bool,
) -> CliResult<S> {
    let state = states.wait_for(|state| !is_loading(state)).await?;
    Ok(state.clone())
}

async fn list(store: &ContactsStore, search: String, json: bool) -> CliResult<()> {
    let controller = ContactsScreen.into_controller(store);
    loaded(&mut controller.subscribe(), |state| state.is_loading).await?;

    controller.handle(contacts::Action::SearchTextChanged(search));
    let state = controller.state();
    if state.contacts.is_empty() && !json {
        println!("{}", state.empty_state_description);
        return Ok(());
    }
    print_contacts(&state.contacts, json)
}

async fn list_favorites(store: &ContactsStore, json: bool) -> CliResult<()> {
    let controller = FavoritesScreen.into_controller(store);
    let state = loaded(&mut controller.subscribe(), |state| state.is_loading).await?;
    print_contacts(&state.contacts, json)
}

async fn add(
    store: &ContactsStore,
    phone_prefix: &str,
    first: String,
    last: String,
    phone: Option<String>,
) -> CliResult<()> {
    let controller = AddOrEditScreen::for_contact(INVALID_CONTACT_ID)
        .with_phone_prefix(phone_prefix)
        .into_controller(store);

    controller.handle(add_or_edit::Action::FirstNameChanged(first));
    controller.handle(add_or_edit::Action::LastNameChanged(last));
    if let Some(phone) = phone {
        controller.handle(add_or_edit::Action::PhoneNumberChanged(phone));
    }
    submit(&controller)
}

async fn edit(
    store: &ContactsStore,
    id: ContactId,
    first: Option<String>,
    last: Option<String>,
    phone: Option<String>,
) -> CliResult<()> {
    let controller = AddOrEditScreen::for_contact(id).into_controller(store);
    let mut states = controller.subscribe();

    tokio::select! {
        state = loaded(&mut states, |state| state.is_loading) => { state?; }
        _ = controller.events().recv() => {
            return Err(format!("contact {id} not found").into());
        }
    }
    // A missing row both finishes loading and emits `Close`.
    if controller.events().try_recv().is_some() {
        return Err(format!("contact {id} not found").into());
    }

    if let Some(first) = first {
        controller.handle(add_or_edit::Action::FirstNameChanged(first));
    }
    if let Some(last) = last {
        controller.handle(add_or_edit::Action::LastNameChanged(last));
    }
    if let Some(phone) = phone {
        controller.handle(add_or_edit::Action::PhoneNumberChanged(phone));
    }
    submit(&controller)
}

fn submit(controller: &contacts_core::AddOrEditController) -> CliResult<()> {
    if !controller.state().primary_button_enabled {
        return Err("nothing to save: fill every field or change at least one".into());
    }
    controller.handle(add_or_edit::Action::PrimaryButtonClick);
    match controller.events().try_recv() {
        Some(add_or_edit::Event::Close) => Ok(()),
        None => Err("contact was not saved".into()),
    }
}

async fn on_listed_contact(
    store: &ContactsStore,
    id: ContactId,
    action: contacts::Action,
) -> CliResult<()> {
    let controller = ContactsScreen.into_controller(store);
    let state = loaded(&mut controller.subscribe(), |state| state.is_loading).await?;
    if !state.contacts.iter().any(|contact| contact.id == Some(id)) {
        return Err(format!("contact {id} not found").into());
    }
    controller.handle(action);
    Ok(())
}

async fn promote(store: &ContactsStore, ids: &[ContactId]) -> CliResult<()> {
    let controller = FavoritesScreen.into_controller(store);
    loaded(&mut controller.subscribe(), |state| state.is_loading).await?;

    controller.handle(favorites::Action::AddFavoritesClick);
    let candidates = controller.state().add_favorite_contacts;
    // Each check toggles, so a repeated id must be sent once.
    let ids: BTreeSet<ContactId> = ids.iter().copied().collect();
    for id in ids {
        if !candidates.iter().any(|item| item.id == id) {
            return Err(format!("contact {id} is missing or already a favorite").into());
        }
        controller.handle(favorites::Action::AddToFavoriteCheckedChange(id));
    }

    if !controller.state().save_favorites_button_enabled {
        return Err("no contact selected".into());
    }
    controller.handle(favorites::Action::SaveFavoritesClick);
    Ok(())
}

fn print_contacts(contacts: &[Contact], json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(contacts)?);
        return Ok(());
    }

    for contact in contacts {
        let marker = if contact.is_favorite { "*" } else { " " };
        println!(
            "{marker} {:>4}  {:<32} {}",
            contact.id.unwrap_or(INVALID_CONTACT_ID),
            contact.full_name(),
            contact.phone_number
        );
    }
    Ok(())
}
