//! # cardboard
//!
//! A terminal card board for markdown vaults.
//!
//! ## Features
//!
//! - Grid of cards per folder, with thumbnails from each note's first embed
//! - Thumbnail picker that moves the chosen image to the top of the note
//! - Live reload when the vault changes on disk
//! - CLI subcommands for scripting (plain or JSON output)
//!
//! ## Usage
//!
//! Launch the interactive board:
//! ```sh
//! cardboard ~/notes
//! ```
//!
//! List the embeds of a note:
//! ```sh
//! cardboard scan -C ~/notes trips/rome.md
//! ```

mod cli;

use cardboard::board::{Card, load_board};
use cardboard::media::{Direction, MediaKind, MediaReference, ScanMode, scan};
use cardboard::picker::PickerSession;
use cardboard::vault::{TextStore, Vault};
use cardboard::{Config, logging};
use clap::Parser as ClapParser;
use cli::{Cli, Command, OutputFormat};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail, eyre};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    color_eyre::install()?;

    // Handle dynamic shell completions
    #[cfg(feature = "unstable-dynamic")]
    clap_complete::CompleteEnv::with_factory(|| {
        use clap::CommandFactory;
        Cli::command()
    })
    .complete();

    let args = Cli::parse();
    let config = Config::load();

    match args.command {
        None => run_board(&args, config),
        Some(ref command) => {
            logging::init_stderr(args.verbose);
            run_command(&args, command, &config)
        }
    }
}

/// Vault root: command line, then config file, then the current directory
fn vault_root(args: &Cli, config: &Config) -> Result<PathBuf> {
    if let Some(root) = args.vault.as_ref().or(args.vault_dir.as_ref()) {
        return Ok(root.clone());
    }
    if let Some(root) = &config.vault.root {
        return Ok(root.clone());
    }
    std::env::current_dir().wrap_err("cannot determine the current directory")
}

fn open_vault(args: &Cli, config: &Config) -> Result<Vault> {
    let root = vault_root(args, config)?;
    Vault::open(&root).wrap_err_with(|| format!("cannot open vault {}", root.display()))
}

/// Resolve a path given on the command line: relative to the current
/// directory if it exists there, otherwise relative to the vault root.
fn vault_path(vault: &Vault, path: &Path) -> Result<PathBuf> {
    let from_cwd = path.canonicalize().ok();
    let located = match from_cwd {
        Some(absolute) => vault.locate(&absolute),
        None => vault.locate(path),
    };
    located.wrap_err_with(|| format!("invalid path {}", path.display()))
}

fn run_board(args: &Cli, config: Config) -> Result<()> {
    let _log_guard = match logging::init_file(args.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {}", e);
            None
        }
    };

    let vault = open_vault(args, &config)?;

    // Priority: CLI flags > config file > default (true)
    let images_enabled = if args.no_images {
        false
    } else if args.images {
        true
    } else {
        config.images.enabled
    };

    let app = cardboard::App::new(vault, config, images_enabled)?;

    // Manually initialize to get better error messages
    use crossterm::ExecutableCommand;
    use crossterm::terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    };
    use std::io::stdout;

    enable_raw_mode().inspect_err(|e| {
        eprintln!("Failed to enable raw mode: {}", e);
    })?;

    stdout().execute(EnterAlternateScreen).inspect_err(|_| {
        disable_raw_mode().ok();
    })?;

    let backend = ratatui::backend::CrosstermBackend::new(stdout());
    let mut terminal = ratatui::Terminal::new(backend).inspect_err(|_| {
        stdout().execute(LeaveAlternateScreen).ok();
        disable_raw_mode().ok();
    })?;

    let result = cardboard::tui::run(&mut terminal, app);

    // Cleanup terminal state
    stdout().execute(LeaveAlternateScreen).ok();
    disable_raw_mode().ok();

    result
}

fn run_command(args: &Cli, command: &Command, config: &Config) -> Result<()> {
    match command {
        Command::ConfigPath => {
            let path = Config::config_path().ok_or_else(|| eyre!("no config directory"))?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Cards { folder, output } => {
            let vault = open_vault(args, config)?;
            let folder = match folder {
                Some(folder) => vault_path(&vault, folder)?,
                None => vault.root().to_path_buf(),
            };
            let cards = load_board(&vault, &folder, config.board.show_videos)?;
            print_cards(&vault, &cards, *output)
        }
        Command::Scan {
            note,
            images_only,
            output,
        } => {
            let vault = open_vault(args, config)?;
            let note = vault_path(&vault, note)?;
            let text = vault.read(&note)?;
            let mode = if *images_only {
                ScanMode::Picker
            } else {
                ScanMode::Thumbnail
            };
            print_references(&scan(&text, mode), *output)
        }
        Command::SetThumbnail { note, index } => {
            let vault = open_vault(args, config)?;
            let note = vault_path(&vault, note)?;
            set_thumbnail(&vault, &note, *index)
        }
    }
}

fn print_cards(vault: &Vault, cards: &[Card], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            for card in cards {
                let kind = if card.is_folder() { "folder" } else { "note" };
                match &card.thumbnail {
                    Some(thumbnail) => println!(
                        "{:<6} {}  [{}]",
                        kind,
                        card.title(),
                        vault.relative(&thumbnail.path).display()
                    ),
                    None => println!("{:<6} {}", kind, card.title()),
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(cards)?),
    }
    Ok(())
}

fn print_references(references: &[MediaReference], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Plain => {
            for (index, reference) in references.iter().enumerate() {
                let kind = match reference.kind {
                    MediaKind::Image => "image",
                    MediaKind::Video => "video",
                };
                println!("{:>3}  {:<5}  {}", index, kind, reference.path);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(references)?),
    }
    Ok(())
}

/// Commit the picker reference at `index` of `note`, as the picker would.
fn set_thumbnail(vault: &Vault, note: &Path, index: usize) -> Result<()> {
    let mut session = PickerSession::open(vault, note)?;
    let total = session.selection().len();
    if index >= total {
        bail!(
            "index {} is out of range: {} has {} image{}",
            index,
            note.display(),
            total,
            if total == 1 { "" } else { "s" }
        );
    }

    // Walk the picker to the requested image
    for _ in 0..index {
        session.navigate(Direction::Next);
    }
    let chosen = session.current().map(|r| r.path.clone()).unwrap_or_default();
    session.commit(vault)?;

    println!("✓ {} now starts with {}", vault.relative(note).display(), chosen);
    Ok(())
}
