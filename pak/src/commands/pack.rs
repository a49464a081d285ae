use anyhow::{Context, Result};

use crate::cli::PackArgs;
use crate::util::report_skipped;

pub fn run(args: PackArgs) -> Result<()> {
    println!(
        "Archiving files from {} to {}",
        args.source.display(),
        args.archive.display()
    );

    let stats = pak_format::pack(&args.archive, &args.source).with_context(|| {
        format!(
            "Could not pack `{}` into `{}`",
            args.source.display(),
            args.archive.display()
        )
    })?;

    report_skipped(&stats.skipped);
    println!("{} file(s) archived.", stats.files);
    Ok(())
}
