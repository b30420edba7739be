use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "logo-smart")]
#[command(about = "Normalize logo backgrounds and sizes for email signatures")]
#[command(version)]
pub struct Cli {
    /// JSON file overriding pipeline thresholds
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use the compact size-bucket table
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Classify, clean, trim and pad an uploaded logo
    Process {
        /// Input image (PNG, JPEG, WebP or SVG)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG (default: <input>.processed.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// MIME type of the input, when the extension is misleading
        #[arg(long)]
        mime: Option<String>,
    },

    /// Trim and downscale a logo before sending it for enhancement
    Prepare {
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG (default: <input>.prepared.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Post-process an enhanced logo: transparent background, white outline, trim
    Enhance {
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG (default: <input>.enhanced.png)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Outline width in pixels
        #[arg(short = 's', long)]
        stroke: Option<u32>,

        /// Never call the ImageMagick binary
        #[arg(long)]
        pure: bool,
    },

    /// Print the display box for an aspect ratio (width / height)
    Box {
        ratio: f64,
    },
}

/// `<stem>.<suffix>.png` next to the input.
pub fn default_output(input: &std::path::Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "logo".to_string());
    input.with_file_name(format!("{}.{}.png", stem, suffix))
}
