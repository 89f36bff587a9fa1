//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use plaudit_view::Testimonial;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a value as compact JSON.
pub fn json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    println!("{}", json);
    Ok(())
}

/// Print one testimonial as a block.
pub fn testimonial(record: &Testimonial) {
    println!(
        "{} {} {}",
        record.name.bold(),
        record.position.italic().dimmed(),
        format!("[{}]", record.id).dimmed()
    );
    if let Some(created_at) = record.created_at {
        println!("  {}", created_at.to_rfc3339().dimmed());
    }
    println!("  {}", record.testimonial);
    for comment in &record.comments {
        println!("    {} {}", "-".dimmed(), comment);
    }
}

/// Print a full testimonial listing.
pub fn listing(records: &[Testimonial]) {
    if records.is_empty() {
        println!("{}", "No testimonials yet.".dimmed());
        return;
    }

    for record in records {
        testimonial(record);
        println!();
    }
}
