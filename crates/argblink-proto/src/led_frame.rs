use std::sync::OnceLock;

use rgb::RGB8;

use crate::color565::encode_color;

/// One step of an LED animation: the color of every LED on the strip.
///
/// The RGB565 form of the colors is computed on first use and cached for
/// the lifetime of the frame.
#[derive(Debug, Clone, Default)]
pub struct LedFrame {
    colors: Vec<RGB8>,
    packed: OnceLock<Vec<u16>>,
}

impl LedFrame {
    /// Create a frame from LED colors, in strip order.
    pub fn new(colors: Vec<RGB8>) -> Self {
        Self {
            colors,
            packed: OnceLock::new(),
        }
    }

    /// A frame of `len` LEDs all set to `color`.
    pub fn filled(color: RGB8, len: usize) -> Self {
        Self::new(vec![color; len])
    }

    /// LED colors in this frame.
    pub fn colors(&self) -> &[RGB8] {
        &self.colors
    }

    /// RGB565 values of the LED colors in this frame.
    pub fn colors565(&self) -> &[u16] {
        self.packed
            .get_or_init(|| self.colors.iter().copied().map(encode_color).collect())
    }

    /// Number of LEDs in this frame.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl PartialEq for LedFrame {
    fn eq(&self, other: &Self) -> bool {
        self.colors == other.colors
    }
}

impl Eq for LedFrame {}

impl From<Vec<RGB8>> for LedFrame {
    fn from(colors: Vec<RGB8>) -> Self {
        Self::new(colors)
    }
}

impl FromIterator<RGB8> for LedFrame {
    fn from_iter<I: IntoIterator<Item = RGB8>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
