//! Comment command implementation.

use anyhow::{Context, Result};
use clap::Args;
use futures_util::StreamExt;

use plaudit_core::DocumentId;
use plaudit_view::TestimonialView;

use crate::output;
use crate::store::Store;

#[derive(Args, Debug)]
pub struct CommentArgs {
    /// Testimonial id
    pub id: String,

    /// Comment text
    pub text: String,
}

pub async fn run(mut view: TestimonialView<Store>, args: CommentArgs) -> Result<()> {
    let id = DocumentId::new(&args.id)?;

    let mut watch = view.watch()?;
    let snapshot = watch
        .next()
        .await
        .context("Subscription ended before the first snapshot")??;
    view.apply_snapshot(snapshot);

    if view.find(&id).is_none() {
        output::error(&format!("No testimonial with id {}", id));
        anyhow::bail!("testimonial not found");
    }

    view.set_comment_draft(&id, args.text);
    view.append_comment(&id).await?;

    output::success("Comment added");
    Ok(())
}
