use clap::Parser;

const KEYS: &str = "\
Keys:
  j, Down, Ctrl-J, Ctrl-N   next line
  k, Up, Ctrl-K, Ctrl-P     previous line
  d, Ctrl-D                 toggle deletion mark
  Space, s                  jump to another random line
  Enter, Ctrl-Q             submit
  Esc, Ctrl-C               abort without changing the file";

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "linesift")]
#[command(
    about = "Jump to random lines of each FILE, mark lines for deletion and remove them on submit",
    long_about = None
)]
#[command(version, after_help = KEYS)]
pub struct Cli {
    /// Dry run: log the marked line numbers instead of rewriting files
    #[arg(short, long)]
    pub debug: bool,

    /// Files to sift, processed one after another
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<String>,
}
