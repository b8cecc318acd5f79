//! Code page selection and text transcoding
//!
//! ESC/POS printers render text through a hardware code page selected with
//! ESC t. Application text must be transcoded to the byte layout of the
//! active page before it is appended to a job buffer.
//!
//! `encoding_rs` covers cp1252 and cp866. The remaining entries are DOS OEM
//! pages outside the web encoding set; all eight pages share the ASCII range,
//! so for those we pass ASCII through unchanged and substitute `?` for
//! anything above 0x7F.

use std::str::FromStr;

use crate::error::PrintError;

/// Supported hardware code pages with their ESC t identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodePage {
    #[default]
    Cp437,
    Cp860,
    Cp863,
    Cp865,
    Cp1252,
    Cp866,
    Cp852,
    Cp858,
}

impl CodePage {
    /// Parameter byte for ESC t
    pub fn id(self) -> u8 {
        match self {
            CodePage::Cp437 => 0,
            CodePage::Cp860 => 3,
            CodePage::Cp863 => 4,
            CodePage::Cp865 => 5,
            CodePage::Cp1252 => 16,
            CodePage::Cp866 => 17,
            CodePage::Cp852 => 18,
            CodePage::Cp858 => 19,
        }
    }

    /// Canonical lower-case name
    pub fn name(self) -> &'static str {
        match self {
            CodePage::Cp437 => "cp437",
            CodePage::Cp860 => "cp860",
            CodePage::Cp863 => "cp863",
            CodePage::Cp865 => "cp865",
            CodePage::Cp1252 => "cp1252",
            CodePage::Cp866 => "cp866",
            CodePage::Cp852 => "cp852",
            CodePage::Cp858 => "cp858",
        }
    }

    /// Transcode UTF-8 text into this page's byte representation
    pub fn encode_text(self, text: &str) -> Vec<u8> {
        match self {
            CodePage::Cp1252 => {
                let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
                bytes.into_owned()
            }
            CodePage::Cp866 => {
                let (bytes, _, _) = encoding_rs::IBM866.encode(text);
                bytes.into_owned()
            }
            // OEM DOS pages: ASCII-identical across the whole table
            _ => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
        }
    }
}

impl FromStr for CodePage {
    type Err = PrintError;

    /// Strict name lookup: unknown names are an error, never defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cp437" => Ok(CodePage::Cp437),
            "cp860" => Ok(CodePage::Cp860),
            "cp863" => Ok(CodePage::Cp863),
            "cp865" => Ok(CodePage::Cp865),
            "cp1252" => Ok(CodePage::Cp1252),
            "cp866" => Ok(CodePage::Cp866),
            "cp852" => Ok(CodePage::Cp852),
            "cp858" => Ok(CodePage::Cp858),
            other => Err(PrintError::UnsupportedCodePage(other.to_string())),
        }
    }
}
