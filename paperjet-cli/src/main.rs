//! paperjet - convert images and text to ESC/POS and deliver them
//!
//! Each subcommand builds one complete job buffer and either writes it to
//! stdout (for piping into `lp -o raw` or a socket) or delivers it directly
//! to a configured printer.

mod config;

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use paperjet_escpos::{
    Align, CodePage, CutMode, ImageMode, ImageOptions, JobBuilder, PrinterDevice, Underline,
    passthrough,
};

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "paperjet",
    about = "ESC/POS encoder and delivery tool for thermal printers",
    version
)]
struct Cli {
    /// Named printer from the PAPERJET_PRINTERS registry
    #[arg(short, long, global = true)]
    printer: Option<String>,

    /// Write the job buffer to stdout instead of a printer
    #[arg(long, global = true)]
    stdout: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a raster image
    Image {
        /// Path to the image file (png, jpg, bmp, gif, webp)
        path: PathBuf,
        /// Maximum width in dots; wider images are downscaled
        #[arg(long)]
        max_width: Option<u32>,
        /// Image alignment: left, center, right
        #[arg(long, default_value = "center")]
        align: String,
        /// Disable Floyd-Steinberg dithering
        #[arg(long)]
        no_dither: bool,
        /// Invert black and white
        #[arg(long)]
        invert: bool,
        /// Wire encoding: raster (GS v 0) or column (legacy ESC *)
        #[arg(long, default_value = "raster")]
        mode: String,
        /// Lines to feed after the image
        #[arg(long, default_value_t = 5)]
        lines_after: u8,
        /// Skip the cut after feeding
        #[arg(long)]
        no_cut: bool,
    },
    /// Print formatted text
    Text {
        /// The text to print
        text: String,
        /// Alignment: left, center, right
        #[arg(long, default_value = "left")]
        align: String,
        /// Bold text
        #[arg(long)]
        bold: bool,
        /// Underline style: 0 none, 1 single, 2 double
        #[arg(long, default_value_t = 0)]
        underline: u8,
        /// Character width multiplier (1-8)
        #[arg(long, default_value_t = 1)]
        width: u8,
        /// Character height multiplier (1-8)
        #[arg(long, default_value_t = 1)]
        height: u8,
        /// Code page for text transcoding (e.g. cp437, cp1252)
        #[arg(long, default_value = "cp437")]
        code_page: String,
        /// Lines to feed after the text
        #[arg(long, default_value_t = 2)]
        lines_after: u8,
        /// Cut the paper afterwards
        #[arg(long)]
        cut: bool,
    },
    /// Sound the printer buzzer
    Beep {
        /// Number of beeps (1-9)
        #[arg(long, default_value_t = 1)]
        count: u8,
        /// Beep duration in 100ms units (1-9)
        #[arg(long, default_value_t = 1)]
        duration: u8,
    },
    /// Cut the paper
    Cut {
        /// Lines to feed before cutting
        #[arg(long, default_value_t = 3)]
        feed: u8,
        /// Cut mode: "full" or anything else for partial
        #[arg(long, default_value = "partial")]
        mode: String,
    },
    /// Open the cash drawer
    Drawer {
        /// Drawer pin (0 or 1)
        #[arg(long, default_value_t = 0)]
        pin: u8,
        /// Pulse on-time in 2ms units
        #[arg(long, default_value_t = 100)]
        on: u8,
        /// Pulse off-time in 2ms units
        #[arg(long, default_value_t = 100)]
        off: u8,
    },
    /// Feed blank lines
    Feed {
        #[arg(long, default_value_t = 3)]
        lines: u8,
    },
    /// Send raw ESC/POS bytes
    Raw {
        /// Base64-encoded payload
        #[arg(long, conflicts_with = "hex")]
        base64: Option<String>,
        /// Hex-encoded payload
        #[arg(long)]
        hex: Option<String>,
    },
}

fn build_job(cli: &Cli, config: &Config) -> anyhow::Result<Vec<u8>> {
    match &cli.command {
        Command::Image {
            path,
            max_width,
            align,
            no_dither,
            invert,
            mode,
            lines_after,
            no_cut,
        } => {
            let img = image::open(path)
                .with_context(|| format!("Opening image {}", path.display()))?;
            info!(
                path = %path.display(),
                width = img.width(),
                height = img.height(),
                "Image loaded"
            );

            let options = ImageOptions {
                max_width: max_width.unwrap_or(config.max_width),
                dither: !no_dither,
                invert: *invert,
                align: align.parse::<Align>()?,
                mode: match mode.as_str() {
                    "column" => ImageMode::Column,
                    _ => ImageMode::Raster,
                },
            };

            let mut job = JobBuilder::new();
            job.image(&img, &options)?;
            // Feed far enough that the image clears the cutter before any cut
            if *lines_after > 0 {
                job.feed(*lines_after);
            } else {
                job.feed(2);
            }
            if !no_cut {
                job.cut(CutMode::Full, 0);
            }
            Ok(job.build())
        }
        Command::Text {
            text,
            align,
            bold,
            underline,
            width,
            height,
            code_page,
            lines_after,
            cut,
        } => {
            let mut job = JobBuilder::new();
            job.code_page(code_page.parse::<CodePage>()?)
                .align(align.parse::<Align>()?)
                .bold(*bold)
                .underline(match (*underline).min(2) {
                    0 => Underline::None,
                    1 => Underline::Single,
                    _ => Underline::Double,
                })
                .size(*width, *height)
                .text(text)
                .bold(false)
                .underline(Underline::None)
                .size(1, 1)
                .align(Align::Left);
            if *lines_after > 0 {
                job.feed(*lines_after);
            }
            if *cut {
                job.cut(CutMode::Partial, 0);
            }
            Ok(job.build())
        }
        Command::Beep { count, duration } => {
            let mut job = JobBuilder::new();
            job.beep(*count, *duration);
            Ok(job.build())
        }
        Command::Cut { feed, mode } => {
            let mut job = JobBuilder::new();
            job.cut(CutMode::from_name(mode), *feed);
            Ok(job.build())
        }
        Command::Drawer { pin, on, off } => {
            let mut job = JobBuilder::new();
            job.drawer_pulse(*pin, *on, *off);
            Ok(job.build())
        }
        Command::Feed { lines } => {
            let mut job = JobBuilder::new();
            job.feed(*lines);
            Ok(job.build())
        }
        Command::Raw { base64, hex } => {
            let bytes = match (base64, hex) {
                (Some(b64), _) => passthrough::decode_base64(b64)?,
                (None, Some(hx)) => passthrough::decode_hex(hx)?,
                (None, None) => anyhow::bail!("Provide --base64 or --hex"),
            };
            // Passthrough skips the init prefix: the caller controls every byte
            Ok(bytes)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let job = build_job(&cli, &config)?;

    if cli.stdout {
        std::io::stdout().write_all(&job)?;
        std::io::stdout().flush()?;
        return Ok(());
    }

    let (id, printer_config) = config.resolve_printer(cli.printer.as_deref())?;
    let device = PrinterDevice::from_config(&printer_config)?;

    info!(printer = %id, bytes = job.len(), "Delivering job");
    device.deliver(&job).await?;

    Ok(())
}
