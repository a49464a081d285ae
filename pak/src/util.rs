use pak_format::Skipped;

pub fn format_size(bytes: u64, human: bool) -> String {
    if human {
        humansize::format_size(bytes, humansize::BINARY)
    } else {
        format!("{} byte(s)", bytes)
    }
}

/// Each skip was already logged as a warning; this only sums them up.
pub fn report_skipped(skipped: &[Skipped]) {
    if !skipped.is_empty() {
        eprintln!("{} file(s) skipped.", skipped.len());
    }
}
