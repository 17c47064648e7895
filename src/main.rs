//! # image-to-zpl CLI
//!
//! Command-line interface for turning images into ZPL `^GFA` commands.
//!
//! ## Usage
//!
//! ```bash
//! # Convert an image at its natural size
//! image-to-zpl convert logo.png
//!
//! # Scale to 400 dots wide (height follows), rotate, print a preview link
//! image-to-zpl convert --width 400 --rotate left --link logo.png
//!
//! # Convert many files at once into a complete label file
//! image-to-zpl convert --label --output labels.zpl *.png
//!
//! # Render a command back to PNG
//! image-to-zpl decode --png check.png labels.zpl
//!
//! # Start the web UI
//! image-to-zpl serve --listen 0.0.0.0:8080
//! ```
//!
//! Set `RUST_LOG=debug` for per-stage sizes.

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io::Read;
use std::path::{Path, PathBuf};

use image_to_zpl::{
    Configuration, Encoding, Rotation, ZplError,
    config::DEFAULT_THRESHOLD,
    form::SizeSettings,
    pipeline, preview,
    printer::Density,
    protocol::{deflate, graphics},
    raster::PixelBuffer,
    server::{self, ServerConfig},
};

/// image-to-zpl - Convert images to ZPL graphic fields
#[derive(Parser, Debug)]
#[command(name = "image-to-zpl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert images to ^GFA commands
    Convert {
        /// Image files (PNG, JPEG, GIF, BMP, ...)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output width in dots (defaults to the image width)
        #[arg(long)]
        width: Option<u32>,

        /// Output height in dots (only used with --unlock)
        #[arg(long)]
        height: Option<u32>,

        /// Don't derive the height from the aspect ratio
        #[arg(long)]
        unlock: bool,

        /// Darkness threshold, 0 (all white) to 100 (all black)
        #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_parser = clap::value_parser!(u8).range(0..=100))]
        darkness: u8,

        /// Rotation: none, left, right or invert
        #[arg(long, default_value = "none")]
        rotate: Rotation,

        /// Payload encoding: compressed, ascii or z64
        #[arg(long, default_value = "compressed")]
        encoding: Encoding,

        /// Wrap each command in ^XA ... ^XZ
        #[arg(long)]
        label: bool,

        /// Print a Labelary preview link for each command to stderr
        #[arg(long)]
        link: bool,

        /// Print density for preview links (6, 8, 12 or 24 dpmm)
        #[arg(long, default_value = "8")]
        density: Density,

        /// Write commands to this file instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decode a ^GFA command back into a bitmap
    Decode {
        /// File containing the command (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Bitmap width in dots (defaults to row bytes * 8)
        #[arg(long)]
        width: Option<u32>,

        /// Payload encoding when it isn't self-describing (compressed or ascii)
        #[arg(long, default_value = "compressed")]
        encoding: Encoding,

        /// Save the bitmap as PNG
        #[arg(long, value_name = "FILE")]
        png: Option<PathBuf>,
    },

    /// Start the HTTP server with the drag-and-drop page
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        listen: String,

        /// Largest accepted upload in megabytes
        #[arg(long, default_value_t = 50)]
        max_upload_mb: usize,

        /// Print density for preview links
        #[arg(long, default_value = "8")]
        density: Density,
    },
}

/// Per-run settings shared by every converted file.
#[derive(Debug, Clone, Copy)]
struct ConvertOptions {
    width: Option<u32>,
    height: Option<u32>,
    lock: bool,
    darkness: u8,
    rotation: Rotation,
    encoding: Encoding,
    label: bool,
    link: bool,
    density: Density,
}

/// One converted file.
struct Converted {
    command: String,
    preview_url: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ZplError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            files,
            width,
            height,
            unlock,
            darkness,
            rotate,
            encoding,
            label,
            link,
            density,
            output,
        } => {
            if height.is_some() && !unlock {
                log::warn!("--height is ignored while the aspect ratio is locked (use --unlock)");
            }

            let opts = ConvertOptions {
                width,
                height,
                lock: !unlock,
                darkness,
                rotation: rotate,
                encoding,
                label,
                link,
                density,
            };

            // Bring the compressor up once before fanning out
            deflate::ensure_compressor_loaded()?;

            let results = files
                .par_iter()
                .map(|path| convert_file(path, &opts))
                .collect::<Result<Vec<_>, _>>()?;

            let mut text = String::new();
            for (path, converted) in files.iter().zip(&results) {
                text.push_str(&converted.command);
                text.push('\n');
                if let Some(url) = &converted.preview_url {
                    eprintln!("{}: {}", path.display(), url);
                }
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    log::info!("Wrote {} command(s) to {}", results.len(), path.display());
                }
                None => print!("{}", text),
            }
        }

        Commands::Decode {
            file,
            width,
            encoding,
            png,
        } => {
            let command = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let compressor = deflate::ensure_compressor_loaded()?;
            let bitmap = graphics::decode_command(&command, width, encoding, compressor)?;

            println!(
                "Decoded {}x{} bitmap, {} black dots",
                bitmap.width(),
                bitmap.height(),
                bitmap.count_black()
            );

            if let Some(png_path) = png {
                preview::save_png(&png_path, &bitmap)?;
                println!("Saved to {}", png_path.display());
            }
        }

        Commands::Serve {
            listen,
            max_upload_mb,
            density,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                max_upload_bytes: max_upload_mb * 1024 * 1024,
                density,
            };

            let rt = tokio::runtime::Runtime::new()
                .map_err(|e| ZplError::Transport(format!("Failed to create async runtime: {}", e)))?;
            rt.block_on(server::serve(config))?;
        }
    }

    Ok(())
}

/// Convert a single image file.
fn convert_file(path: &Path, opts: &ConvertOptions) -> Result<Converted, ZplError> {
    let bytes = std::fs::read(path)?;
    let pixels = PixelBuffer::decode(&bytes)
        .map_err(|e| ZplError::Image(format!("{}: {}", path.display(), e)))?;

    let size = SizeSettings::resolve(
        pixels.width(),
        pixels.height(),
        opts.width,
        opts.height,
        opts.lock,
    );
    let cfg = Configuration::new(size.width, size.height, opts.darkness, opts.rotation)
        .with_encoding(opts.encoding);
    cfg.validate()?;

    let conversion = pipeline::convert(Some(&pixels), &cfg)?.ok_or(ZplError::MissingInput)?;
    let command = conversion.command();

    log::info!(
        "{}: {}x{} dots, {} black, {} characters",
        path.display(),
        conversion.bitmap.width(),
        conversion.bitmap.height(),
        conversion.bitmap.count_black(),
        command.len()
    );

    let preview_url = if opts.link {
        if preview::exceeds_viewer_limit(&command) {
            log::warn!(
                "{}: command is {} characters, the viewer may reject it",
                path.display(),
                command.len()
            );
        }
        Some(preview::labelary_url(&command, &cfg, opts.density)?)
    } else {
        None
    };

    let command = if opts.label {
        graphics::wrap_label(&command)
    } else {
        command
    };

    Ok(Converted {
        command,
        preview_url,
    })
}
