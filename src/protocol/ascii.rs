//! # ASCII Payload Encodings
//!
//! The `^GF` field data must stay clear of the ZPL control prefixes (`^`,
//! `~`) and of the `,` field separator. Three printable encodings are used:
//!
//! | Encoding | Alphabet | Used by |
//! |----------|----------|---------|
//! | Hex | `0-9 A-F` | input of the run-length scheme |
//! | Base64 | `A-Z a-z 0-9 + / =` | compressed and Z64 payloads |
//! | CRC-16 | `0-9 a-f` (4 digits) | Z64 trailer |

use base64::{Engine, engine::general_purpose};

use crate::error::ZplError;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Uppercase hex, two digits per byte.
pub fn to_hex(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    for &byte in data {
        out.push(HEX_DIGITS[(byte >> 4) as usize]);
        out.push(HEX_DIGITS[(byte & 0x0F) as usize]);
    }
    out
}

/// Value of a single hex digit (either case).
#[inline]
pub fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}

/// Decode hex digits back into bytes.
pub fn from_hex(hex: &[u8]) -> Result<Vec<u8>, ZplError> {
    if hex.len() % 2 != 0 {
        return Err(ZplError::Decode(format!(
            "odd number of hex digits ({})",
            hex.len()
        )));
    }

    hex.chunks(2)
        .map(|pair| match (hex_value(pair[0]), hex_value(pair[1])) {
            (Some(hi), Some(lo)) => Ok(hi << 4 | lo),
            _ => Err(ZplError::Decode(format!(
                "invalid hex byte '{}'",
                String::from_utf8_lossy(pair)
            ))),
        })
        .collect()
}

/// Standard base64 with padding.
pub fn to_base64(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

/// Decode standard base64, ignoring embedded whitespace.
pub fn from_base64(text: &str) -> Result<Vec<u8>, ZplError> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| ZplError::Decode(format!("invalid base64: {}", e)))
}

/// CRC-16/XMODEM (polynomial 0x1021, initial value 0).
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// CRC-16 formatted as the 4 lowercase hex digits used in Z64 trailers.
pub fn crc16_hex(data: &[u8]) -> String {
    format!("{:04x}", crc16(data))
}
