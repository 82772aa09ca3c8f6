//! CLI argument parsing for finfo.
//!
//! The CLI is intentionally flat: every mode is a flag over the same list of
//! inputs, so dispatch lives in `main` and the probes stay reusable.
use clap::{ArgAction, Parser};

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "finfo",
    version,
    about = "File info at a glance: metadata, checksums, binary analysis",
    long_about = "finfo displays information about files including:\n- File size in multiple units (GB, MB, KB, bytes)\n- Architecture and OS\n- Permissions and ownership\n- Symlink chain (if applicable)\n\nIf the argument is not a valid path, finfo will search for it in PATH.",
    after_help = "Examples:\n  finfo /usr/bin/python3        Show info for a specific file\n  finfo python3                 Search for 'python3' in PATH\n  finfo file1 file2 file3       Show info for multiple files\n  finfo --lib ssl               Search for SSL library files\n  finfo --hash file.zip         Show file with checksums\n  finfo --diff file1 file2      Compare two files\n  finfo --ll cmake              Show only linked libraries (full list)",
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// File paths or command names to inspect
    #[arg(value_name = "PATH|COMMAND", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Search for library files (.so, .a, .dylib)
    #[arg(long, conflicts_with_all = ["diff", "linked_libs"])]
    pub lib: bool,

    /// Calculate and show file checksums (MD5, SHA256, SHA512)
    #[arg(long)]
    pub hash: bool,

    /// Compare two files and show differences
    #[arg(long, conflicts_with = "linked_libs")]
    pub diff: bool,

    /// Show only linked libraries (full list, no other info)
    #[arg(long = "ll", visible_alias = "linked-libs")]
    pub linked_libs: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
