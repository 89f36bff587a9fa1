//! Add command implementation.

use anyhow::Result;
use clap::Args;

use plaudit_view::{TestimonialDraft, TestimonialView};

use crate::output;
use crate::store::Store;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Author name
    #[arg(long)]
    pub name: String,

    /// Author position
    #[arg(long)]
    pub position: String,

    /// Testimonial text
    #[arg(long = "text")]
    pub testimonial: String,
}

pub async fn run(mut view: TestimonialView<Store>, args: AddArgs) -> Result<()> {
    *view.draft_mut() = TestimonialDraft::new(args.name, args.position, args.testimonial);

    if let Err(e) = view.submit().await {
        output::error(&e.to_string());
        return Err(e.into());
    }

    output::success("Testimonial submitted");
    Ok(())
}
