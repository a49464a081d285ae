use anyhow::{Context, Result};

use crate::cli::DeleteArgs;

pub fn run(args: DeleteArgs) -> Result<()> {
    println!(
        "Deleting file {} from {}",
        args.name,
        args.archive.display()
    );

    pak_format::delete(&args.archive, &args.name).with_context(|| {
        format!(
            "Could not delete `{}` from `{}`",
            args.name,
            args.archive.display()
        )
    })?;

    println!("1 file deleted.");
    Ok(())
}
