//! # paperjet-escpos
//!
//! ESC/POS thermal printer toolkit - encoding and delivery only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - Image conversion (Floyd-Steinberg dithering, bitmap packing, GS v 0
//!   raster and legacy ESC * commands)
//! - ESC/POS control command encoding (alignment, bold, underline, size,
//!   feed, cut, buzzer, cash drawer, code pages)
//! - Code-page text transcoding
//! - Raw base64/hex passthrough decoding
//! - Job buffer assembly
//! - Delivery over raw TCP (port 9100) or an OS print spooler, with a
//!   synchronized per-printer connection cache
//!
//! What to print (receipts, tickets, upload handling, HTTP) belongs in
//! application code.
//!
//! ## Example
//!
//! ```ignore
//! use paperjet_escpos::{Align, CutMode, JobBuilder, ImageOptions, NetworkPrinter, Printer};
//!
//! let img = image::open("logo.png")?;
//!
//! let mut job = JobBuilder::new();
//! job.image(&img, &ImageOptions::default())?;
//! job.feed(5);
//! job.cut(CutMode::Full, 0);
//!
//! let printer = NetworkPrinter::new("192.168.1.87", 9100)?;
//! printer.deliver(&job.build()).await?;
//! ```

mod codepage;
mod command;
mod error;
mod image;
mod job;
mod pool;
mod printer;
mod raw;

// Re-exports
pub use codepage::CodePage;
pub use command::{Align, CutMode, Underline};
pub use error::{PrintError, PrintResult};
pub use crate::image::{
    Bitmap, DEFAULT_MAX_WIDTH, ImageMode, ImageOptions, column_command, encode_image,
    floyd_steinberg, raster_command, resize_to_width,
};
pub use job::JobBuilder;
pub use pool::{PrinterConfig, PrinterDevice, PrinterPool};
pub use printer::{NetworkPrinter, Printer, SpoolerPrinter};

/// Low-level command encoding functions
pub mod commands {
    pub use crate::command::{
        align, beep, bold, cut, drawer_pulse, feed, init, select_code_page, size, underline,
    };
}

/// Raw passthrough payload decoding
pub mod passthrough {
    pub use crate::raw::{decode_base64, decode_hex};
}
