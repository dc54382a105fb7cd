use crate::keybindings::{Keybindings, KeybindingsConfig};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Card width limits in terminal cells
pub const CARD_WIDTH_RANGE: (u16, u16) = (12, 60);
/// Card height limits in terminal cells
pub const CARD_HEIGHT_RANGE: (u16, u16) = (6, 30);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub theme: CustomThemeConfig,

    #[serde(default)]
    pub keybindings: KeybindingsConfig,

    /// Image display configuration
    #[serde(default)]
    pub images: ImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "default_card_width")]
    pub card_width: u16,

    #[serde(default = "default_card_height")]
    pub card_height: u16,

    /// Open notes in `$EDITOR` inside the terminal instead of the system handler
    #[serde(default)]
    pub open_in_terminal_editor: bool,

    /// Use video embeds as thumbnails (shown as a placeholder)
    #[serde(default = "default_show_videos")]
    pub show_videos: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault opened when no path is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

/// Image display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Whether to render thumbnails in the TUI (default: true)
    /// When disabled, cards show note names only
    #[serde(default = "default_images_enabled")]
    pub enabled: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: default_images_enabled(),
        }
    }
}

fn default_images_enabled() -> bool {
    true
}

/// Custom theme color overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<ColorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_bg: Option<ColorValue>,
}

/// Color value that can be specified in multiple formats
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// Named color (e.g., "Red", "Cyan", "White")
    Named(String),
    /// RGB color { rgb = [r, g, b] }
    Rgb { rgb: [u8; 3] },
    /// Indexed color { indexed = 235 }
    Indexed { indexed: u8 },
}

impl ColorValue {
    /// Convert to ratatui Color
    pub fn to_color(&self) -> Option<Color> {
        match self {
            ColorValue::Named(name) => match name.to_lowercase().as_str() {
                "black" => Some(Color::Black),
                "red" => Some(Color::Red),
                "green" => Some(Color::Green),
                "yellow" => Some(Color::Yellow),
                "blue" => Some(Color::Blue),
                "magenta" => Some(Color::Magenta),
                "cyan" => Some(Color::Cyan),
                "gray" | "grey" => Some(Color::Gray),
                "darkgray" | "darkgrey" => Some(Color::DarkGray),
                "lightred" => Some(Color::LightRed),
                "lightgreen" => Some(Color::LightGreen),
                "lightyellow" => Some(Color::LightYellow),
                "lightblue" => Some(Color::LightBlue),
                "lightmagenta" => Some(Color::LightMagenta),
                "lightcyan" => Some(Color::LightCyan),
                "white" => Some(Color::White),
                _ => None,
            },
            ColorValue::Rgb { rgb } => Some(Color::Rgb(rgb[0], rgb[1], rgb[2])),
            ColorValue::Indexed { indexed } => Some(Color::Indexed(*indexed)),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            card_width: default_card_width(),
            card_height: default_card_height(),
            open_in_terminal_editor: false,
            show_videos: default_show_videos(),
        }
    }
}

fn default_card_width() -> u16 {
    24
}

fn default_card_height() -> u16 {
    12
}

fn default_show_videos() -> bool {
    true
}

impl Config {
    /// Get the XDG-style config file path (~/.config/cardboard/config.toml)
    /// This is preferred on macOS for CLI tools and cross-platform dotfiles
    #[cfg(target_os = "macos")]
    fn xdg_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("cardboard").join("config.toml"))
    }

    /// Get the platform-specific config file path
    /// - macOS: ~/Library/Application Support/cardboard/config.toml
    /// - Linux: ~/.config/cardboard/config.toml
    /// - Windows: %APPDATA%/cardboard/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cardboard").join("config.toml"))
    }

    /// Load config from file, or return default if file doesn't exist
    /// On macOS, checks ~/.config/cardboard first, then falls back to ~/Library/Application Support
    pub fn load() -> Self {
        #[cfg(target_os = "macos")]
        {
            // Prefer XDG-style path on macOS for CLI tools
            if let Some(xdg_path) = Self::xdg_config_path() {
                if let Ok(contents) = fs::read_to_string(&xdg_path) {
                    if let Ok(config) = toml::from_str(&contents) {
                        return config;
                    }
                }
            }
        }

        // Fall back to platform-specific path
        Self::config_path()
            .and_then(|path| {
                let contents = fs::read_to_string(&path).ok()?;
                match toml::from_str(&contents) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                        None
                    }
                }
            })
            .unwrap_or_default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::config_path().ok_or("Could not determine config directory")?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;

        Ok(())
    }

    /// Resize cards (clamped to sane limits) and save config
    pub fn set_card_size(&mut self, width: u16, height: u16) -> Result<(), Box<dyn std::error::Error>> {
        let (width, height) = clamp_card_size(width, height);
        self.board.card_width = width;
        self.board.card_height = height;
        self.save()
    }

    /// Toggle thumbnail rendering and save config
    pub fn set_images_enabled(&mut self, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
        self.images.enabled = enabled;
        self.save()
    }

    /// Get keybindings with user customizations applied
    pub fn keybindings(&self) -> Keybindings {
        self.keybindings.to_keybindings()
    }

    /// Accent color (selected card border, titles)
    pub fn accent_color(&self) -> Color {
        self.theme
            .accent
            .as_ref()
            .and_then(ColorValue::to_color)
            .unwrap_or(Color::Cyan)
    }

    pub fn border_color(&self) -> Color {
        self.theme
            .border
            .as_ref()
            .and_then(ColorValue::to_color)
            .unwrap_or(Color::DarkGray)
    }

    pub fn selection_bg(&self) -> Color {
        self.theme
            .selection_bg
            .as_ref()
            .and_then(ColorValue::to_color)
            .unwrap_or(Color::Rgb(40, 44, 52))
    }
}

/// Clamp a card size to the supported range
pub fn clamp_card_size(width: u16, height: u16) -> (u16, u16) {
    (
        width.clamp(CARD_WIDTH_RANGE.0, CARD_WIDTH_RANGE.1),
        height.clamp(CARD_HEIGHT_RANGE.0, CARD_HEIGHT_RANGE.1),
    )
}
