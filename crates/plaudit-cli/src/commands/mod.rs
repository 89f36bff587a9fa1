//! Subcommand implementations.

pub mod add;
pub mod comment;
pub mod delete;
pub mod list;
pub mod watch;

use anyhow::Result;

use plaudit_core::{CollectionName, StoreUrl};
use plaudit_view::TestimonialView;

use crate::cli::{Cli, Commands};
use crate::store::{self, Store};

/// Build the view controller for the configured store and collection.
fn build_view(cli: &Cli) -> Result<TestimonialView<Store>> {
    let url = match &cli.store {
        Some(s) => StoreUrl::new(s)?,
        None => store::default_store_url()?,
    };
    let collection = CollectionName::new(cli.collection.as_str())?;
    let backend = store::open(&url)?;

    Ok(TestimonialView::new(backend, collection))
}

pub async fn handle(cli: Cli) -> Result<()> {
    let view = build_view(&cli)?;

    match cli.command {
        Commands::Add(args) => add::run(view, args).await,
        Commands::Comment(args) => comment::run(view, args).await,
        Commands::Delete(args) => delete::run(view, args).await,
        Commands::List(args) => list::run(view, args).await,
        Commands::Watch(args) => watch::run(view, args).await,
    }
}
