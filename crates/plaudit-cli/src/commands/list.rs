//! List command implementation.

use anyhow::{Context, Result};
use clap::Args;
use futures_util::StreamExt;

use plaudit_view::TestimonialView;

use crate::output;
use crate::store::Store;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output records as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub async fn run(mut view: TestimonialView<Store>, args: ListArgs) -> Result<()> {
    let mut watch = view.watch()?;
    let snapshot = watch
        .next()
        .await
        .context("Subscription ended before the first snapshot")??;
    view.apply_snapshot(snapshot);

    if args.json {
        for record in view.records() {
            output::json(record)?;
        }
    } else {
        output::listing(view.records());
    }

    Ok(())
}
