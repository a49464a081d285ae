use anyhow::{Context, Result};

use crate::cli::AddArgs;

pub fn run(args: AddArgs) -> Result<()> {
    println!(
        "Adding file {} to {}",
        args.file.display(),
        args.archive.display()
    );

    pak_format::add(&args.archive, &args.file).with_context(|| {
        format!(
            "Could not add `{}` to `{}`",
            args.file.display(),
            args.archive.display()
        )
    })?;

    println!("1 file added.");
    Ok(())
}
