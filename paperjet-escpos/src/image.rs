//! Image to ESC/POS bitmap conversion
//!
//! Pipeline: grayscale -> resize to paper width -> optional Floyd-Steinberg
//! dithering -> threshold to a bilevel bitmap -> optional invert -> one
//! raster (GS v 0) or column (ESC *) command wrapped in alignment commands.
//!
//! Every step is a pure, deterministic transform over caller-owned buffers;
//! no step touches a device.

use image::DynamicImage;
use image::GrayImage;
use image::imageops::FilterType;
use tracing::debug;

use crate::command::{self, Align};
use crate::error::{PrintError, PrintResult};

/// Quantization threshold: values above this print white
const THRESHOLD: u8 = 128;

/// Default paper width in dots (80mm printer)
pub const DEFAULT_MAX_WIDTH: u32 = 576;

/// Image command encoding selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageMode {
    /// GS v 0 raster bitmap, bit-packed (the reliable modern path)
    #[default]
    Raster,
    /// ESC * bit image, one byte per pixel (legacy per-pixel encoding)
    Column,
}

/// Options controlling image conversion
#[derive(Debug, Clone)]
pub struct ImageOptions {
    /// Maximum output width in dots; wider images are downscaled
    pub max_width: u32,
    /// Apply Floyd-Steinberg dithering before thresholding
    pub dither: bool,
    /// Flip black and white after quantization
    pub invert: bool,
    /// Alignment emitted before the image command
    pub align: Align,
    /// Wire encoding for the image command
    pub mode: ImageMode,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            dither: true,
            invert: false,
            align: Align::Center,
            mode: ImageMode::Raster,
        }
    }
}

/// Bilevel image, row-major, `true` = black (printed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// Threshold a grayscale image into a bitmap.
    ///
    /// A pixel prints black unless its value exceeds the 128 threshold; the
    /// rule is identical whether or not the image was dithered first.
    pub fn from_gray(img: &GrayImage) -> PrintResult<Self> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(PrintError::InvalidImageDimensions { width, height });
        }
        let pixels = img.pixels().map(|p| p.0[0] <= THRESHOLD).collect();
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (x, y) is black
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Packed bytes needed per row (8 pixels per byte, last byte padded)
    pub fn bytes_per_row(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Flip every pixel. Runs after quantization, so it composes
    /// independently of whether dithering was applied.
    pub fn invert(&mut self) {
        for px in &mut self.pixels {
            *px = !*px;
        }
    }

    /// Pack into a row-major bit stream: MSB = leftmost pixel, black = 1,
    /// rows padded to whole bytes with 0 bits.
    pub fn pack(&self) -> Vec<u8> {
        let bytes_per_row = self.bytes_per_row();
        let mut data = Vec::with_capacity(bytes_per_row * self.height as usize);

        for y in 0..self.height {
            for byte_idx in 0..bytes_per_row as u32 {
                let mut byte = 0u8;
                for bit in 0..8 {
                    let x = byte_idx * 8 + bit;
                    if x < self.width && self.get(x, y) {
                        byte |= 0x80 >> bit;
                    }
                }
                data.push(byte);
            }
        }

        data
    }

    /// Reconstruct a bitmap from packed bytes; exact inverse of [`pack`].
    ///
    /// [`pack`]: Bitmap::pack
    pub fn unpack(data: &[u8], width: u32, height: u32) -> PrintResult<Self> {
        if width == 0 || height == 0 {
            return Err(PrintError::InvalidImageDimensions { width, height });
        }
        let bytes_per_row = (width as usize).div_ceil(8);
        if data.len() != bytes_per_row * height as usize {
            return Err(PrintError::InvalidEncoding(format!(
                "packed length {} does not match {}x{}",
                data.len(),
                width,
                height
            )));
        }

        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height as usize {
            let row = &data[y * bytes_per_row..(y + 1) * bytes_per_row];
            for x in 0..width as usize {
                let byte = row[x / 8];
                pixels.push(byte & (0x80 >> (x % 8)) != 0);
            }
        }

        Ok(Self { width, height, pixels })
    }
}

/// Apply Floyd-Steinberg error-diffusion dithering to a grayscale image.
///
/// Single pass in raster order. Quantizes `v > 128` to white, diffusing the
/// quantization error to unvisited neighbors (east 7/16, southwest 3/16,
/// south 5/16, southeast 1/16). Out-of-range neighbors drop their share;
/// weights are never renormalized. Accumulation runs in `i32` so transient
/// sums may leave 0..=255, matching the continuous-error behavior expected
/// from the algorithm.
pub fn floyd_steinberg(img: &GrayImage) -> GrayImage {
    let (width, height) = img.dimensions();
    debug!(width, height, "Applying Floyd-Steinberg dithering");

    let w = width as usize;
    let h = height as usize;
    let mut buffer: Vec<i32> = img.pixels().map(|p| i32::from(p.0[0])).collect();

    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            let old = buffer[idx];
            let new = if old > i32::from(THRESHOLD) { 255 } else { 0 };
            let error = old - new;
            buffer[idx] = new;

            if x + 1 < w {
                buffer[idx + 1] += error * 7 / 16;
            }
            if y + 1 < h {
                if x > 0 {
                    buffer[idx + w - 1] += error * 3 / 16;
                }
                buffer[idx + w] += error * 5 / 16;
                if x + 1 < w {
                    buffer[idx + w + 1] += error / 16;
                }
            }
        }
    }

    let mut output = GrayImage::new(width, height);
    for (i, px) in output.pixels_mut().enumerate() {
        px.0[0] = buffer[i].clamp(0, 255) as u8;
    }
    output
}

/// Downscale an image to fit a maximum width, preserving aspect ratio.
///
/// Uses Lanczos3 filtering. Images at or under `max_width` pass through
/// unchanged; nothing is ever upscaled.
pub fn resize_to_width(img: &DynamicImage, max_width: u32) -> DynamicImage {
    let (orig_w, orig_h) = (img.width(), img.height());
    if orig_w <= max_width {
        return img.clone();
    }

    let ratio = f64::from(max_width) / f64::from(orig_w);
    let new_height = ((f64::from(orig_h) * ratio).round() as u32).max(1);
    debug!(orig_w, orig_h, max_width, new_height, "Resizing image to paper width");

    img.resize_exact(max_width, new_height, FilterType::Lanczos3)
}

/// Build a GS v 0 raster bitmap command for the whole image
///
/// Layout: `1D 76 30 00`, bytes-per-row (LE16), height (LE16), packed data.
pub fn raster_command(bitmap: &Bitmap) -> Vec<u8> {
    let bytes_per_row = bitmap.bytes_per_row();
    let height = bitmap.height();

    let mut buf = Vec::with_capacity(8 + bytes_per_row * height as usize);
    buf.extend_from_slice(&[0x1D, 0x76, 0x30, 0x00]);
    buf.push((bytes_per_row & 0xFF) as u8);
    buf.push((bytes_per_row >> 8) as u8);
    buf.push((height & 0xFF) as u8);
    buf.push((height >> 8) as u8);
    buf.extend_from_slice(&bitmap.pack());
    buf
}

/// Build a legacy ESC * bit image command
///
/// Layout: `1B 2A 21`, width (LE16), then one full byte per pixel in raster
/// order (`FF` black, `00` white). Not bit-packed; some old firmwares only
/// accept this form.
pub fn column_command(bitmap: &Bitmap) -> Vec<u8> {
    let width = bitmap.width();
    let height = bitmap.height();

    let mut buf = Vec::with_capacity(5 + (width * height) as usize);
    buf.extend_from_slice(&[0x1B, 0x2A, 33]);
    buf.push((width & 0xFF) as u8);
    buf.push((width >> 8) as u8);

    for y in 0..height {
        for x in 0..width {
            buf.push(if bitmap.get(x, y) { 0xFF } else { 0x00 });
        }
    }
    buf
}

/// Convert a decoded image into a complete ESC/POS byte sequence.
///
/// Output is `[align][image command][align left]` — alignment is always
/// reset to left afterwards, regardless of the alignment requested.
pub fn encode_image(img: &DynamicImage, options: &ImageOptions) -> PrintResult<Vec<u8>> {
    let resized = resize_to_width(img, options.max_width);
    let gray = resized.to_luma8();

    let gray = if options.dither {
        floyd_steinberg(&gray)
    } else {
        gray
    };

    let mut bitmap = Bitmap::from_gray(&gray)?;
    if options.invert {
        bitmap.invert();
    }

    debug!(
        width = bitmap.width(),
        height = bitmap.height(),
        mode = ?options.mode,
        "Encoding image command"
    );

    let mut buf = Vec::new();
    buf.extend_from_slice(&command::align(options.align));
    match options.mode {
        ImageMode::Raster => buf.extend_from_slice(&raster_command(&bitmap)),
        ImageMode::Column => buf.extend_from_slice(&column_command(&bitmap)),
    }
    buf.extend_from_slice(&command::align(Align::Left));

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn gray_from_rows(rows: &[&[u8]]) -> GrayImage {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let mut img = GrayImage::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                img.put_pixel(x as u32, y as u32, Luma([v]));
            }
        }
        img
    }

    #[test]
    fn test_threshold_rule() {
        let img = gray_from_rows(&[&[0, 127, 128, 129, 255]]);
        let bitmap = Bitmap::from_gray(&img).unwrap();
        assert!(bitmap.get(0, 0));
        assert!(bitmap.get(1, 0));
        // 128 quantizes to black
        assert!(bitmap.get(2, 0));
        assert!(!bitmap.get(3, 0));
        assert!(!bitmap.get(4, 0));
    }

    #[test]
    fn test_from_gray_zero_dimensions() {
        let img = GrayImage::new(0, 4);
        assert!(matches!(
            Bitmap::from_gray(&img),
            Err(PrintError::InvalidImageDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_dither_output_is_binary() {
        let mut img = GrayImage::new(8, 8);
        for (i, px) in img.pixels_mut().enumerate() {
            px.0[0] = (i * 4) as u8;
        }
        let result = floyd_steinberg(&img);
        for px in result.pixels() {
            assert!(px.0[0] == 0 || px.0[0] == 255);
        }
    }

    #[test]
    fn test_dither_idempotent_on_bilevel() {
        // Error is always zero on pure 0/255 input, so nothing diffuses.
        let img = gray_from_rows(&[&[0, 255, 255, 0], &[255, 0, 0, 255]]);
        let once = floyd_steinberg(&img);
        assert_eq!(once.as_raw(), img.as_raw());
        let twice = floyd_steinberg(&once);
        assert_eq!(twice.as_raw(), once.as_raw());
    }

    #[test]
    fn test_dither_mid_gray_preserves_tone() {
        // A 16x16 field of 50% gray should dither to roughly half black.
        let img = GrayImage::from_pixel(16, 16, Luma([128]));
        let result = floyd_steinberg(&img);
        let black = result.pixels().filter(|p| p.0[0] == 0).count();
        assert!((96..=160).contains(&black), "black pixel count {black}");
    }

    #[test]
    fn test_pack_1x1_black() {
        let img = GrayImage::from_pixel(1, 1, Luma([0]));
        let bitmap = Bitmap::from_gray(&img).unwrap();
        assert_eq!(bitmap.pack(), vec![0x80]);
    }

    #[test]
    fn test_pack_row_padding() {
        // 10 pixels wide -> 2 bytes per row, low 6 bits of byte 2 padded
        let img = GrayImage::from_pixel(10, 1, Luma([0]));
        let bitmap = Bitmap::from_gray(&img).unwrap();
        assert_eq!(bitmap.bytes_per_row(), 2);
        assert_eq!(bitmap.pack(), vec![0xFF, 0xC0]);
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let img = gray_from_rows(&[
            &[0, 255, 0, 255, 0, 255, 0, 255, 0],
            &[255, 0, 255, 0, 255, 0, 255, 0, 255],
            &[0, 0, 255, 255, 0, 0, 255, 255, 0],
        ]);
        let bitmap = Bitmap::from_gray(&img).unwrap();
        let packed = bitmap.pack();
        let restored = Bitmap::unpack(&packed, bitmap.width(), bitmap.height()).unwrap();
        assert_eq!(restored, bitmap);
    }

    #[test]
    fn test_unpack_length_mismatch() {
        assert!(matches!(
            Bitmap::unpack(&[0x00], 9, 2),
            Err(PrintError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_invert_composes_with_pack() {
        let img = gray_from_rows(&[&[0, 255, 0, 255, 255, 0, 0, 0], &[255; 8]]);
        let bitmap = Bitmap::from_gray(&img).unwrap();

        let mut inverted = bitmap.clone();
        inverted.invert();

        let flipped: Vec<u8> = bitmap.pack().iter().map(|b| !b).collect();
        assert_eq!(inverted.pack(), flipped);
    }

    #[test]
    fn test_raster_command_1x1_black() {
        let img = GrayImage::from_pixel(1, 1, Luma([0]));
        let bitmap = Bitmap::from_gray(&img).unwrap();
        assert_eq!(
            raster_command(&bitmap),
            vec![0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x01, 0x00, 0x80]
        );
    }

    #[test]
    fn test_raster_command_header_fields() {
        // 600x300 -> 75 bytes per row
        let img = GrayImage::from_pixel(600, 300, Luma([255]));
        let bitmap = Bitmap::from_gray(&img).unwrap();
        let cmd = raster_command(&bitmap);
        assert_eq!(&cmd[..4], &[0x1D, 0x76, 0x30, 0x00]);
        assert_eq!(cmd[4], 75);
        assert_eq!(cmd[5], 0);
        assert_eq!(cmd[6], (300 & 0xFF) as u8);
        assert_eq!(cmd[7], (300 >> 8) as u8);
        assert_eq!(cmd.len(), 8 + 75 * 300);
    }

    #[test]
    fn test_column_command_per_pixel() {
        let img = gray_from_rows(&[&[0, 255], &[255, 0]]);
        let bitmap = Bitmap::from_gray(&img).unwrap();
        assert_eq!(
            column_command(&bitmap),
            vec![0x1B, 0x2A, 33, 0x02, 0x00, 0xFF, 0x00, 0x00, 0xFF]
        );
    }

    #[test]
    fn test_resize_no_op_at_or_below_max() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(576, 100));
        let out = resize_to_width(&img, 576);
        assert_eq!((out.width(), out.height()), (576, 100));

        let small = DynamicImage::ImageLuma8(GrayImage::new(100, 50));
        let out = resize_to_width(&small, 576);
        assert_eq!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn test_resize_preserves_aspect() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(1152, 400));
        let out = resize_to_width(&img, 576);
        assert_eq!(out.width(), 576);
        assert_eq!(out.height(), 200);
    }

    #[test]
    fn test_resize_min_height_one() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(1000, 1));
        let out = resize_to_width(&img, 10);
        assert_eq!(out.width(), 10);
        assert!(out.height() >= 1);
    }

    #[test]
    fn test_encode_image_wraps_in_alignment() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([0])));
        let options = ImageOptions { dither: false, ..Default::default() };
        let buf = encode_image(&img, &options).unwrap();

        // Center before, left after
        assert_eq!(&buf[..3], &[0x1B, 0x61, 0x01]);
        assert_eq!(&buf[buf.len() - 3..], &[0x1B, 0x61, 0x00]);
        assert_eq!(&buf[3..buf.len() - 3], &[0x1D, 0x76, 0x30, 0x00, 0x01, 0x00, 0x01, 0x00, 0x80]);
    }

    #[test]
    fn test_encode_image_invert() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([0])));
        let options = ImageOptions { dither: false, invert: true, ..Default::default() };
        let buf = encode_image(&img, &options).unwrap();
        // The single black pixel becomes white
        assert_eq!(buf[buf.len() - 4], 0x00);
    }
}
