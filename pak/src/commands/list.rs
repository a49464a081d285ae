use anyhow::{Context, Result};
use pak_format::Listing;
use serde::Serialize;

use crate::cli::ListArgs;
use crate::util::format_size;

#[derive(Serialize)]
struct JsonListing<'a> {
    archive: String,
    files: usize,
    total_bytes: u64,
    entries: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    name: &'a str,
    size: u64,
    offset: u64,
}

pub fn run(args: ListArgs) -> Result<()> {
    let listing = pak_format::list(&args.archive)
        .with_context(|| format!("Could not list `{}`", args.archive.display()))?;

    if args.json {
        list_json(&args, &listing)
    } else {
        list_plain(&args, &listing);
        Ok(())
    }
}

fn list_plain(args: &ListArgs, listing: &Listing) {
    println!("Listing files in {}", args.archive.display());
    println!("{} file(s) exist.", listing.file_count());

    for loc in listing {
        println!("{} {}", loc.entry.name, format_size(loc.entry.size, args.human));
    }
}

fn list_json(args: &ListArgs, listing: &Listing) -> Result<()> {
    let entries = listing
        .iter()
        .map(|loc| JsonEntry {
            name: &loc.entry.name,
            size: loc.entry.size,
            offset: loc.offset,
        })
        .collect();

    let out = JsonListing {
        archive: args.archive.display().to_string(),
        files: listing.file_count(),
        total_bytes: listing.total_bytes(),
        entries,
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
