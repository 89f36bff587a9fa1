//! Delete command implementation.

use anyhow::Result;
use clap::Args;

use plaudit_core::DocumentId;
use plaudit_view::TestimonialView;

use crate::output;
use crate::store::Store;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Testimonial id
    pub id: String,
}

pub async fn run(mut view: TestimonialView<Store>, args: DeleteArgs) -> Result<()> {
    let id = DocumentId::new(&args.id)?;

    view.delete(&id).await?;

    output::success("Delete requested");
    Ok(())
}
