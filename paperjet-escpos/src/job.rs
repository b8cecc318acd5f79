//! Fluent ESC/POS job builder
//!
//! Assembles one append-only command buffer per print job. The buffer has no
//! structure beyond byte order; the printer consumes it as a sequential
//! instruction stream. Typical order: init -> formatting -> text/image ->
//! feed -> beep -> cut.

use image::DynamicImage;

use crate::codepage::CodePage;
use crate::command::{self, Align, CutMode, Underline};
use crate::error::PrintResult;
use crate::image::{ImageOptions, encode_image};

/// ESC/POS job buffer builder
///
/// `new()` starts the buffer with an init command. The builder tracks the
/// selected code page only to pick the text transcoder; the emitted byte
/// stream itself carries no hidden state.
pub struct JobBuilder {
    buf: Vec<u8>,
    code_page: CodePage,
}

impl JobBuilder {
    /// Create a builder with the printer initialized (ESC @)
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(4096);
        buf.extend_from_slice(&command::init());
        Self {
            buf,
            code_page: CodePage::default(),
        }
    }

    /// Set alignment
    pub fn align(&mut self, align: Align) -> &mut Self {
        self.buf.extend_from_slice(&command::align(align));
        self
    }

    /// Enable or disable bold
    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&command::bold(on));
        self
    }

    /// Set underline style
    pub fn underline(&mut self, style: Underline) -> &mut Self {
        self.buf.extend_from_slice(&command::underline(style));
        self
    }

    /// Set character size multipliers (clamped to 1..=8)
    pub fn size(&mut self, width: u8, height: u8) -> &mut Self {
        self.buf.extend_from_slice(&command::size(width, height));
        self
    }

    /// Select the hardware code page used for subsequent text
    pub fn code_page(&mut self, page: CodePage) -> &mut Self {
        self.code_page = page;
        self.buf.extend_from_slice(&command::select_code_page(page));
        self
    }

    /// Append text, transcoded through the active code page.
    ///
    /// A trailing line feed is appended when the text does not end with one,
    /// so the printer always flushes the line.
    pub fn text(&mut self, text: &str) -> &mut Self {
        let encoded = self.code_page.encode_text(text);
        self.buf.extend_from_slice(&encoded);
        if !text.ends_with('\n') {
            self.buf.push(0x0A);
        }
        self
    }

    /// Print and feed lines
    pub fn feed(&mut self, lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&command::feed(lines));
        self
    }

    /// Append a converted image command sequence
    pub fn image(&mut self, img: &DynamicImage, options: &ImageOptions) -> PrintResult<&mut Self> {
        let encoded = encode_image(img, options)?;
        self.buf.extend_from_slice(&encoded);
        Ok(self)
    }

    /// Sound the buzzer
    pub fn beep(&mut self, count: u8, duration: u8) -> &mut Self {
        self.buf.extend_from_slice(&command::beep(count, duration));
        self
    }

    /// Cut paper, optionally feeding first
    pub fn cut(&mut self, mode: CutMode, feed_lines: u8) -> &mut Self {
        self.buf.extend_from_slice(&command::cut(mode, feed_lines));
        self
    }

    /// Fire a cash drawer pulse
    pub fn drawer_pulse(&mut self, pin: u8, on_time: u8, off_time: u8) -> &mut Self {
        self.buf
            .extend_from_slice(&command::drawer_pulse(pin, on_time, off_time));
        self
    }

    /// Append raw bytes verbatim
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Finalize and return the job buffer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for JobBuilder {
    fn default() -> Self {
        Self::new()
    }
}
