//! Watch command implementation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use futures_util::StreamExt;

use plaudit_view::TestimonialView;

use crate::output;
use crate::store::Store;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Output each snapshot as JSON lines
    #[arg(long)]
    pub json: bool,
}

pub async fn run(mut view: TestimonialView<Store>, args: WatchArgs) -> Result<()> {
    eprintln!("{}", "Watching testimonials...".dimmed());
    eprintln!("{}", "Press Ctrl+C to stop.".dimmed());
    eprintln!();

    let mut stream = view.watch()?;

    while let Some(result) = stream.next().await {
        match result {
            Ok(snapshot) => {
                view.apply_snapshot(snapshot);

                if args.json {
                    for record in view.records() {
                        output::json(record)?;
                    }
                } else {
                    let header = format!("== {} testimonial(s) ==", view.records().len());
                    println!("{}", header.dimmed());
                    output::listing(view.records());
                }
            }
            Err(e) => {
                eprintln!("{} {}", "ERROR".red(), e);
            }
        }
    }

    Ok(())
}
