//! GU-7000 VFD Control Tool
//!
//! Runs one display operation against a simulated module wired as in the
//! configuration file and prints the bytes it would put on the bus. Also
//! converts XBM images into the module's bit image layout.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gu7000_hw::bitmap::load_xbm;
use gu7000_hw::{AutoScrollMode, OverlayMode, SimulatedDisplay, Vfd};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        matches!(toggle, Toggle::On)
    }
}

#[derive(Parser)]
#[command(name = "gu7000ctl")]
#[command(about = "Command stream preview tool for GU-7000 VFD modules")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Wiring configuration (built-in defaults if the file is absent)
    #[arg(short, long, default_value = "config/gu7000.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an XBM image to the module's bit image layout
    Convert {
        path: PathBuf,

        /// Print JSON instead of hex
        #[arg(long)]
        json: bool,
    },
    #[command(flatten)]
    Display(DisplayCommands),
}

#[derive(Subcommand)]
enum DisplayCommands {
    /// Reset the module to its power-on state
    Reset,
    /// Turn the display on or off
    Power { state: Toggle },
    /// Set brightness (0-8)
    Brightness { level: u8 },
    /// Blink the display (on) or switch all dots off (off)
    Screensaver { state: Toggle },
    /// Reverse display
    Inverse { state: Toggle },
    /// Character wrapping at the window edge
    Wrap { state: Toggle },
    /// Write mixture mode
    Overlay {
        /// Mode: none, or, and, xor
        mode: OverlayMode,
    },
    /// Set auto-scroll mode
    AutoScroll {
        /// Mode: wrap, vertical, horizontal
        mode: AutoScrollMode,

        /// Horizontal scroll speed (0-31)
        #[arg(long)]
        speed: Option<u8>,
    },
    /// Scroll the display contents
    Scroll {
        /// Shift in dot rows (0-4095)
        amount: u16,

        /// Number of repetitions
        #[arg(long, default_value = "1")]
        repeat: u16,

        /// Delay between steps
        #[arg(long, default_value = "0")]
        delay: u8,
    },
    /// Cursor commands
    Cursor {
        #[command(subcommand)]
        action: CursorCommands,
    },
    /// Move the cursor to the home position
    Home,
    /// Clear the current window
    Clear,
    /// Set font style and magnification
    Font {
        /// Wide (6x8) fixed font
        #[arg(long)]
        wide: bool,

        /// Proportional spacing
        #[arg(long)]
        proportional: bool,

        /// Horizontal magnification (1-4)
        #[arg(long, default_value = "1")]
        scale_x: u8,

        /// Vertical magnification (1-2)
        #[arg(long, default_value = "1")]
        scale_y: u8,
    },
    /// Window commands
    Window {
        #[command(subcommand)]
        action: WindowCommands,
    },
    /// Write text at the cursor
    Print { text: String },
    /// Display an XBM image at the cursor
    Image { path: PathBuf },
    /// Send raw bytes (decimal or 0x-prefixed hex)
    Raw {
        #[arg(value_parser = parse_byte)]
        bytes: Vec<u8>,
    },
}

#[derive(Subcommand)]
enum CursorCommands {
    /// Show or hide the cursor
    Show { state: Toggle },
    /// Move one character left
    Left,
    /// Move one character right
    Right,
    /// Move to a dot column and row
    Position {
        /// Dot column (0-511)
        x: u16,
        /// 8-dot row (0-7)
        y: u8,
    },
}

#[derive(Subcommand)]
enum WindowCommands {
    /// Select a window (0 is the base window)
    Select { id: u8 },
    /// Define a user window
    Create {
        /// Window (1-4)
        id: u8,
        /// Left edge in dots (0-511)
        x: u16,
        /// Top edge in 8-dot rows (0-7)
        y: u8,
        /// Width in dots (1-512)
        width: u16,
        /// Height in 8-dot rows (1-8)
        height: u8,
    },
    /// Delete a user window
    Delete { id: u8 },
}

#[derive(Serialize)]
struct ConvertedImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

fn parse_byte(s: &str) -> Result<u8, String> {
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    }
    .map_err(|e| format!("invalid byte \"{}\": {}", s, e))?;
    u8::try_from(value).map_err(|_| format!("byte out of range: {} (must be 0-255)", value))
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Convert { path, json } => handle_convert(&path, json),
        Commands::Display(command) => {
            let config =
                Config::load_or_default(&cli.config).context("Failed to load configuration")?;
            info!("Using configuration from: {}", cli.config.display());
            handle_display(command, &config)
        }
    }
}

fn handle_display(command: DisplayCommands, config: &Config) -> Result<()> {
    let pins = config.pin_set()?;
    let display = SimulatedDisplay::new(pins.clone());
    let mut vfd = Vfd::initialize_with(display, pins, config.bus_options())
        .context("Failed to initialise display")?;
    let init = vfd.gpio_mut().take_received();
    debug!("Initialisation sent: {}", hex(&init));

    match command {
        DisplayCommands::Reset => vfd.reset()?,
        DisplayCommands::Power { state } => vfd.power(state.into())?,
        DisplayCommands::Brightness { level } => vfd.brightness(level)?,
        DisplayCommands::Screensaver { state } => vfd.screensaver(state.into())?,
        DisplayCommands::Inverse { state } => vfd.inverse(state.into())?,
        DisplayCommands::Wrap { state } => vfd.wrap(state.into())?,
        DisplayCommands::Overlay { mode } => vfd.overlay(mode)?,
        DisplayCommands::AutoScroll { mode, speed } => vfd.auto_scroll(mode, speed)?,
        DisplayCommands::Scroll {
            amount,
            repeat,
            delay,
        } => vfd.scroll(amount, repeat, delay)?,
        DisplayCommands::Cursor { action } => match action {
            CursorCommands::Show { state } => vfd.cursor_show(state.into())?,
            CursorCommands::Left => vfd.cursor_left()?,
            CursorCommands::Right => vfd.cursor_right()?,
            CursorCommands::Position { x, y } => vfd.cursor_position(x, y)?,
        },
        DisplayCommands::Home => vfd.home()?,
        DisplayCommands::Clear => vfd.clear()?,
        DisplayCommands::Font {
            wide,
            proportional,
            scale_x,
            scale_y,
        } => vfd.font(wide, proportional, scale_x, scale_y)?,
        DisplayCommands::Window { action } => match action {
            WindowCommands::Select { id } => vfd.window_select(id)?,
            WindowCommands::Create {
                id,
                x,
                y,
                width,
                height,
            } => vfd.window_create(id, x, y, width, height)?,
            WindowCommands::Delete { id } => vfd.window_delete(id)?,
        },
        DisplayCommands::Print { text } => vfd.output(&text)?,
        DisplayCommands::Image { path } => {
            let source = load_xbm(&path)
                .with_context(|| format!("Failed to load image {}", path.display()))?;
            vfd.image(&source.to_native())?
        }
        DisplayCommands::Raw { bytes } => vfd.raw_command(&bytes)?,
    }

    debug!("Selected window: {}", vfd.selected_window().get());
    let sent = vfd.release().take_received();
    println!("{}", hex(&sent));
    Ok(())
}

fn handle_convert(path: &Path, json: bool) -> Result<()> {
    let source =
        load_xbm(path).with_context(|| format!("Failed to load image {}", path.display()))?;
    let native = source.to_native();

    if json {
        let output = ConvertedImage {
            width: native.width(),
            height: native.height(),
            data: native.data().to_vec(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        // one column per line
        let stride = native.height().div_ceil(8);
        for column in native.data().chunks(stride) {
            println!("{}", hex(column));
        }
    }
    Ok(())
}
