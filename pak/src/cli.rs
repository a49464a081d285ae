use std::path::PathBuf;

use structopt::clap::AppSettings::*;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "pak",
    about = "Pack, modify and unpack single-file pak archives.",
    settings = &[SubcommandRequiredElseHelp, DisableHelpSubcommand, VersionlessSubcommands],
)]
pub struct Cli {
    #[structopt(short, long, help = "Show verbose output", global = true)]
    pub verbose: bool,

    #[structopt(subcommand)]
    pub command: Commands,
}

#[derive(Debug, StructOpt)]
pub enum Commands {
    #[structopt(
        name = "pack",
        about = "Pack the regular files of a directory into a new archive"
    )]
    Pack(PackArgs),

    #[structopt(name = "unpack", about = "Extract every file of an archive")]
    Unpack(UnpackArgs),

    #[structopt(name = "add", about = "Append one file to an archive")]
    Add(AddArgs),

    #[structopt(
        name = "del",
        visible_alias = "delete",
        about = "Remove one file from an archive"
    )]
    Delete(DeleteArgs),

    #[structopt(name = "list", visible_alias = "ls", about = "List files of an archive")]
    List(ListArgs),

    #[structopt(name = "verify", about = "Check the structure of an archive")]
    Verify(VerifyArgs),
}

#[derive(Debug, StructOpt)]
pub struct PackArgs {
    #[structopt(name = "archive", parse(from_os_str), help = "Path to the archive")]
    pub archive: PathBuf,

    #[structopt(
        name = "srcdir",
        parse(from_os_str),
        help = "Directory whose regular files are packed"
    )]
    pub source: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct UnpackArgs {
    #[structopt(name = "archive", parse(from_os_str), help = "Path to the archive")]
    pub archive: PathBuf,

    #[structopt(
        name = "destdir",
        parse(from_os_str),
        help = "Directory to extract into, created if missing"
    )]
    pub dest: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct AddArgs {
    #[structopt(name = "archive", parse(from_os_str), help = "Path to the archive")]
    pub archive: PathBuf,

    #[structopt(
        name = "file",
        parse(from_os_str),
        help = "File to append, stored under its base name"
    )]
    pub file: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct DeleteArgs {
    #[structopt(name = "archive", parse(from_os_str), help = "Path to the archive")]
    pub archive: PathBuf,

    #[structopt(name = "name", help = "Name of the entry to remove")]
    pub name: String,
}

#[derive(Debug, StructOpt)]
pub struct ListArgs {
    #[structopt(name = "archive", parse(from_os_str), help = "Path to the archive")]
    pub archive: PathBuf,

    #[structopt(long, help = "Print the listing as JSON")]
    pub json: bool,

    #[structopt(short = "H", long, help = "Print sizes in human-readable units")]
    pub human: bool,
}

#[derive(Debug, StructOpt)]
pub struct VerifyArgs {
    #[structopt(name = "archive", parse(from_os_str), help = "Path to the archive")]
    pub archive: PathBuf,
}
