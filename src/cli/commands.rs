use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[cfg(feature = "unstable-dynamic")]
use clap_complete::engine::{ArgValueCompleter, CompletionCandidate, ValueCompleter};

#[derive(Parser, Debug)]
#[command(name = "cardboard")]
#[command(version)]
#[command(about = "A card board for markdown vaults, with thumbnails from embedded images")]
#[command(
    long_about = "cardboard - Browse a folder of markdown notes as a grid of cards.\n\n\
    Each note's card shows the first image or video the note embeds. Pick a different\n\
    thumbnail from the images a note embeds and cardboard moves that embed to the top\n\
    of the note. Launch without a subcommand for the interactive board.\n\n\
    Examples:\n  \
    cardboard ~/notes                       # Interactive board\n  \
    cardboard cards -C ~/notes trips        # Print the cards of a folder\n  \
    cardboard scan -C ~/notes trips/rome.md # List embedded media\n  \
    cardboard set-thumbnail trips/rome.md 2 # Use the third image as thumbnail"
)]
pub struct Cli {
    /// Vault directory to open
    ///
    /// Defaults to `[vault] root` from the config file, then the current directory.
    #[arg(add = folder_completer())]
    pub vault: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Vault directory for subcommands
    ///
    /// Same as the VAULT argument, usable after a subcommand.
    #[arg(short = 'C', long = "vault", value_name = "DIR", global = true)]
    pub vault_dir: Option<PathBuf>,

    /// Disable thumbnail images in the board
    ///
    /// Cards show the file name of their thumbnail instead. Useful for
    /// terminals without a graphics protocol. Overrides the config file.
    #[arg(long = "no-images")]
    pub no_images: bool,

    /// Enable thumbnail images in the board (override config)
    ///
    /// Images are displayed using the best available terminal graphics
    /// protocol (Kitty, iTerm2, Sixel) with halfblock Unicode fallback.
    #[arg(long = "images", conflicts_with = "no_images")]
    pub images: bool,

    /// Log debug details (to the log file for the board, stderr otherwise)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Print the cards of a folder
    ///
    /// Lists subfolders first, then notes, each with the thumbnail the
    /// board would show.
    Cards {
        /// Folder inside the vault (defaults to the vault root)
        #[arg(add = folder_completer())]
        folder: Option<PathBuf>,

        /// Output format
        #[arg(short = 'o', long = "output", default_value = "plain")]
        output: OutputFormat,
    },

    /// List the images and videos a note embeds
    ///
    /// Prints each embed in document order with its index. Indices are the
    /// ones `set-thumbnail` expects when --images-only is given.
    Scan {
        /// Markdown note to scan
        #[arg(add = markdown_file_completer())]
        note: PathBuf,

        /// Only list images, as offered by the thumbnail picker
        #[arg(long = "images-only")]
        images_only: bool,

        /// Output format
        #[arg(short = 'o', long = "output", default_value = "plain")]
        output: OutputFormat,
    },

    /// Make one of a note's images its thumbnail
    ///
    /// Moves the embed at INDEX (0-based, counting images only) to the top of
    /// the note, followed by a blank line.
    SetThumbnail {
        /// Markdown note to change
        #[arg(add = markdown_file_completer())]
        note: PathBuf,

        /// Index of the image, as printed by `scan --images-only`
        index: usize,
    },

    /// Print the location of the config file
    ConfigPath,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Plain,
    /// JSON output
    Json,
}

#[cfg(feature = "unstable-dynamic")]
fn folder_completer() -> ArgValueCompleter {
    ArgValueCompleter::new(PathCompleter { markdown: false })
}

#[cfg(feature = "unstable-dynamic")]
fn markdown_file_completer() -> ArgValueCompleter {
    ArgValueCompleter::new(PathCompleter { markdown: true })
}

/// Completes directories, plus `.md` files when `markdown` is set
#[cfg(feature = "unstable-dynamic")]
struct PathCompleter {
    markdown: bool,
}

#[cfg(feature = "unstable-dynamic")]
impl ValueCompleter for PathCompleter {
    fn complete(&self, current: &std::ffi::OsStr) -> Vec<CompletionCandidate> {
        use std::path::Path;

        // e.g., "../notes/tri" -> directory="../notes", prefix="tri"
        let input_str = current.to_string_lossy();
        let input_path = Path::new(input_str.as_ref());

        let (search_dir, prefix) = if input_str.is_empty() {
            (Path::new("."), String::new())
        } else if input_str.ends_with('/') || input_str.ends_with('\\') {
            (input_path, String::new())
        } else {
            // parent() returns Some("") for simple names like "R"
            let parent = input_path.parent().unwrap_or(Path::new("."));
            let search_dir = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            let prefix = input_path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            (search_dir, prefix)
        };

        let Ok(entries) = std::fs::read_dir(search_dir) else {
            return vec![];
        };

        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let path = entry.path();
                let file_name = path.file_name()?.to_string_lossy().to_string();

                if !file_name
                    .to_lowercase()
                    .starts_with(&prefix.to_lowercase())
                {
                    return None;
                }

                let completion_value = if search_dir == Path::new(".") {
                    file_name
                } else {
                    search_dir.join(&file_name).to_string_lossy().to_string()
                };

                if path.is_dir() {
                    // Trailing slash for easier navigation
                    let mut dir_completion = completion_value;
                    if !dir_completion.ends_with('/') {
                        dir_completion.push('/');
                    }
                    Some(CompletionCandidate::new(dir_completion).help(Some("directory".into())))
                } else if self.markdown && cardboard::vault::is_markdown(&path) {
                    Some(CompletionCandidate::new(completion_value))
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(not(feature = "unstable-dynamic"))]
fn folder_completer() -> clap::builder::ValueHint {
    clap::ValueHint::DirPath
}

#[cfg(not(feature = "unstable-dynamic"))]
fn markdown_file_completer() -> clap::builder::ValueHint {
    clap::ValueHint::FilePath
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_board() {
        let cli = Cli::try_parse_from(["cardboard", "/notes", "--no-images"]).unwrap();
        assert_eq!(cli.vault, Some(PathBuf::from("/notes")));
        assert!(cli.no_images);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_set_thumbnail() {
        let cli =
            Cli::try_parse_from(["cardboard", "set-thumbnail", "a.md", "2", "-C", "/v"]).unwrap();
        assert_eq!(cli.vault_dir, Some(PathBuf::from("/v")));
        match cli.command {
            Some(Command::SetThumbnail { note, index }) => {
                assert_eq!(note, PathBuf::from("a.md"));
                assert_eq!(index, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_images_flags_conflict() {
        assert!(Cli::try_parse_from(["cardboard", "--images", "--no-images"]).is_err());
    }
}
