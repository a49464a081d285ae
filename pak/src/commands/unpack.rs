use anyhow::{Context, Result};

use crate::cli::UnpackArgs;
use crate::util::report_skipped;

pub fn run(args: UnpackArgs) -> Result<()> {
    println!(
        "Unpacking files from {} to {}",
        args.archive.display(),
        args.dest.display()
    );

    let stats = pak_format::unpack(&args.archive, &args.dest).with_context(|| {
        format!(
            "Could not unpack `{}` into `{}`",
            args.archive.display(),
            args.dest.display()
        )
    })?;

    report_skipped(&stats.skipped);
    println!("{} file(s) unpacked.", stats.files);
    Ok(())
}
