//! ESC/POS control command encoding
//!
//! Each function maps one printer action to its fixed byte sequence.
//! The encoder is stateless: the printer retains formatting state, the
//! encoder never does. Numeric parameters are clamped to their documented
//! range, never rejected; enum-like string names fail closed on unknown
//! input (see [`Align::from_str`]).

use std::str::FromStr;

use crate::codepage::CodePage;
use crate::error::PrintError;

/// Text and image alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Parameter byte for ESC a
    pub fn code(self) -> u8 {
        match self {
            Align::Left => 0x00,
            Align::Center => 0x01,
            Align::Right => 0x02,
        }
    }
}

impl FromStr for Align {
    type Err = PrintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            other => Err(PrintError::InvalidConfig(format!(
                "Unknown alignment: {other}"
            ))),
        }
    }
}

/// Underline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
}

impl Underline {
    /// Parameter byte for ESC -
    pub fn code(self) -> u8 {
        match self {
            Underline::None => 0x00,
            Underline::Single => 0x01,
            Underline::Double => 0x02,
        }
    }
}

/// Paper cut mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutMode {
    Full,
    #[default]
    Partial,
}

impl CutMode {
    /// Lenient name lookup: "full" selects a full cut, anything else partial.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("full") {
            CutMode::Full
        } else {
            CutMode::Partial
        }
    }
}

/// Initialize the printer (ESC @)
pub fn init() -> [u8; 2] {
    [0x1B, 0x40]
}

/// Select alignment (ESC a m)
pub fn align(align: Align) -> [u8; 3] {
    [0x1B, 0x61, align.code()]
}

/// Enable or disable bold text (ESC E n)
pub fn bold(on: bool) -> [u8; 3] {
    [0x1B, 0x45, u8::from(on)]
}

/// Select underline style (ESC - n)
pub fn underline(style: Underline) -> [u8; 3] {
    [0x1B, 0x2D, style.code()]
}

/// Select character size (GS ! n)
///
/// Width and height are multipliers clamped to 1..=8 and packed as
/// `(width-1) << 4 | (height-1)`.
pub fn size(width: u8, height: u8) -> [u8; 3] {
    let w = width.clamp(1, 8);
    let h = height.clamp(1, 8);
    [0x1D, 0x21, (w - 1) << 4 | (h - 1)]
}

/// Print and feed n lines (ESC d n)
pub fn feed(lines: u8) -> [u8; 3] {
    [0x1B, 0x64, lines]
}

/// Cut paper (GS V m), optionally feeding first
///
/// Feeding before the cut moves the tail of the job past the cutter so the
/// cut never lands mid-content.
pub fn cut(mode: CutMode, feed_lines: u8) -> Vec<u8> {
    let mut buf = Vec::with_capacity(6);
    if feed_lines > 0 {
        buf.extend_from_slice(&feed(feed_lines));
    }
    let m = match mode {
        CutMode::Full => 0x00,
        CutMode::Partial => 0x01,
    };
    buf.extend_from_slice(&[0x1D, 0x56, m]);
    buf
}

/// Sound the buzzer (ESC B n t)
///
/// Count and duration (100ms units) are each clamped to 1..=9.
pub fn beep(count: u8, duration: u8) -> [u8; 4] {
    [0x1B, 0x42, count.clamp(1, 9), duration.clamp(1, 9)]
}

/// Generate a cash drawer kick pulse (ESC p m t1 t2)
///
/// Pin 0 maps to drawer connector pin 2, any other value to pin 5.
pub fn drawer_pulse(pin: u8, on_time: u8, off_time: u8) -> [u8; 5] {
    let m = if pin == 0 { 0x00 } else { 0x01 };
    [0x1B, 0x70, m, on_time, off_time]
}

/// Select a hardware code page (ESC t n)
pub fn select_code_page(page: CodePage) -> [u8; 3] {
    [0x1B, 0x74, page.id()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), [0x1B, 0x40]);
    }

    #[test]
    fn test_align_codes() {
        assert_eq!(align(Align::Left), [0x1B, 0x61, 0x00]);
        assert_eq!(align(Align::Center), [0x1B, 0x61, 0x01]);
        assert_eq!(align(Align::Right), [0x1B, 0x61, 0x02]);
    }

    #[test]
    fn test_align_from_str_fails_closed() {
        assert_eq!("center".parse::<Align>().unwrap(), Align::Center);
        assert_eq!("LEFT".parse::<Align>().unwrap(), Align::Left);
        assert!("justify".parse::<Align>().is_err());
        assert!("".parse::<Align>().is_err());
    }

    #[test]
    fn test_bold() {
        assert_eq!(bold(true), [0x1B, 0x45, 0x01]);
        assert_eq!(bold(false), [0x1B, 0x45, 0x00]);
    }

    #[test]
    fn test_underline() {
        assert_eq!(underline(Underline::None), [0x1B, 0x2D, 0x00]);
        assert_eq!(underline(Underline::Single), [0x1B, 0x2D, 0x01]);
        assert_eq!(underline(Underline::Double), [0x1B, 0x2D, 0x02]);
    }

    #[test]
    fn test_size_3x5() {
        // (3-1)<<4 | (5-1) = 0x24
        assert_eq!(size(3, 5), [0x1D, 0x21, 0x24]);
    }

    #[test]
    fn test_size_clamps() {
        assert_eq!(size(0, 0), size(1, 1));
        assert_eq!(size(255, 255), size(8, 8));
        assert_eq!(size(1, 1), [0x1D, 0x21, 0x00]);
        assert_eq!(size(8, 8), [0x1D, 0x21, 0x77]);
    }

    #[test]
    fn test_feed() {
        assert_eq!(feed(5), [0x1B, 0x64, 0x05]);
        assert_eq!(feed(0), [0x1B, 0x64, 0x00]);
    }

    #[test]
    fn test_cut_full_with_feed() {
        assert_eq!(cut(CutMode::Full, 3), vec![0x1B, 0x64, 0x03, 0x1D, 0x56, 0x00]);
    }

    #[test]
    fn test_cut_partial_no_feed() {
        assert_eq!(cut(CutMode::Partial, 0), vec![0x1D, 0x56, 0x01]);
    }

    #[test]
    fn test_cut_mode_lenient_names() {
        assert_eq!(CutMode::from_name("full"), CutMode::Full);
        assert_eq!(CutMode::from_name("FULL"), CutMode::Full);
        assert_eq!(CutMode::from_name("partial"), CutMode::Partial);
        assert_eq!(CutMode::from_name("anything"), CutMode::Partial);
    }

    #[test]
    fn test_beep_clamps() {
        assert_eq!(beep(15, 0), [0x1B, 0x42, 0x09, 0x01]);
        assert_eq!(beep(2, 3), [0x1B, 0x42, 0x02, 0x03]);
    }

    #[test]
    fn test_drawer_pulse() {
        assert_eq!(drawer_pulse(0, 100, 100), [0x1B, 0x70, 0x00, 100, 100]);
        assert_eq!(drawer_pulse(5, 25, 250), [0x1B, 0x70, 0x01, 25, 250]);
    }

    #[test]
    fn test_select_code_page() {
        assert_eq!(select_code_page(CodePage::Cp437), [0x1B, 0x74, 0]);
        assert_eq!(select_code_page(CodePage::Cp858), [0x1B, 0x74, 19]);
    }
}
