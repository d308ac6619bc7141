//! RGB565 color packing.
//!
//! ```text
//!  15      11 10         5 4       0
//! ┌──────────┬────────────┬─────────┐
//! │ red (5)  │ green (6)  │ blue (5)│
//! └──────────┴────────────┴─────────┘
//! ```
//!
//! Packing truncates each channel, so `decode(encode(c))` is not `c` in
//! general (`0xFF` red comes back as `0xF8`). It is a fixed point, though:
//! packing a decoded color again yields the same value.

use rgb::RGB8;

const FACTOR_R: u16 = 8;
const FACTOR_G: u16 = 4;
const FACTOR_B: u16 = 8;

const SHIFT_R: u16 = 11;
const SHIFT_G: u16 = 5;

const MASK_R: u16 = 0x1f;
const MASK_G: u16 = 0x3f;
const MASK_B: u16 = 0x1f;

/// Pack a 24-bit color into RGB565.
pub fn encode_color(color: RGB8) -> u16 {
    let r = u16::from(color.r) / FACTOR_R;
    let g = u16::from(color.g) / FACTOR_G;
    let b = u16::from(color.b) / FACTOR_B;
    (r << SHIFT_R) | (g << SHIFT_G) | b
}

/// Unpack an RGB565 value into a 24-bit color.
pub fn decode_color(value: u16) -> RGB8 {
    let r = (value >> SHIFT_R) & MASK_R;
    let g = (value >> SHIFT_G) & MASK_G;
    let b = value & MASK_B;
    // Each product is at most 0xfc, so the narrowing casts are lossless.
    RGB8::new(
        (r * FACTOR_R) as u8,
        (g * FACTOR_G) as u8,
        (b * FACTOR_B) as u8,
    )
}
