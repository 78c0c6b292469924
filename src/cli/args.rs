use crate::config::DEFAULT_CONFIG_PATH;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tile_sheet")]
#[command(about = "Slices tile sheet images into a deduplicated, indexed tile database")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a tileset image (or a directory of images) to the db
    #[command(alias = "slice")]
    Add {
        /// Source image file or directory
        src: PathBuf,

        /// Tile sheet name
        name: String,

        /// Maximum tile width in pixels
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        tile_width: u32,

        /// Maximum tile height in pixels
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        tile_height: u32,

        /// Output directory for the exported sheet and rejected tiles
        output_path: Option<PathBuf>,

        /// Comma-separated tags added to every tile
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Keep empty and duplicate tiles
        #[arg(long)]
        skip_validation: bool,

        /// Accept every tile without prompting
        #[arg(short = 'y', long)]
        yes: bool,

        /// Do not render tile previews while prompting
        #[arg(long)]
        no_preview: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Lists existing tiles in the db
    List {
        /// Tile sheet name
        name: String,

        /// Do not render tile previews
        #[arg(long)]
        no_preview: bool,
    },

    /// Writes tiles in the db to files
    Write {
        /// Output directory (defaults to the configured output path)
        output_path: Option<PathBuf>,

        /// Only write this tile sheet
        name: Option<String>,
    },

    /// Removes tiles from a sheet by index and/or fingerprint
    Remove {
        /// Tile sheet name
        name: String,

        /// 0-based tile indices
        indices: Vec<u32>,

        /// Comma-separated fingerprints
        #[arg(long, value_delimiter = ',')]
        hash: Vec<String>,
    },

    /// Sets persistent config options
    Config {
        /// Directory of the db file (an existing db is moved)
        #[arg(long)]
        db_path: Option<PathBuf>,

        /// Default output directory
        #[arg(long)]
        output_path: Option<PathBuf>,

        /// Empty tile threshold (0.0-1.0)
        #[arg(long)]
        empty_threshold: Option<f64>,

        /// Duplicate tile threshold (0.0-1.0)
        #[arg(long)]
        dupe_threshold: Option<f64>,

        /// Clear each sheet directory before writing
        #[arg(long)]
        clear_output: Option<bool>,

        /// Append fingerprints to written file names
        #[arg(long)]
        fingerprint_in_filenames: Option<bool>,
    },
}
