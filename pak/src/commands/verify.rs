use anyhow::{Context, Result};

use crate::cli::VerifyArgs;
use crate::util::format_size;

pub fn run(args: VerifyArgs) -> Result<()> {
    let listing = pak_format::verify(&args.archive)
        .with_context(|| format!("Archive `{}` is not valid", args.archive.display()))?;

    println!(
        "{}: OK, {} file(s), {}",
        args.archive.display(),
        listing.file_count(),
        format_size(listing.total_bytes(), false)
    );
    Ok(())
}
