use image::imageops::FilterType;
use ratatui::{
    style::{Color, Style},
    text::Span,
};

/// Icons and avatars are drawn as a square of this many pixels a side, two
/// pixels per terminal cell.
pub const THUMBNAIL_SIZE: u32 = 4;

/// A decoded, downscaled image, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl Bitmap {
    /// Decodes `bytes` (any supported format) and scales it to a thumbnail.
    ///
    /// # Errors
    /// If the bytes aren't an image in a supported format.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let thumbnail = image::load_from_memory(bytes)?
            .resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Triangle)
            .to_rgb8();

        Ok(Self {
            width: thumbnail.width(),
            height: thumbnail.height(),
            pixels: thumbnail.pixels().map(|pixel| pixel.0).collect(),
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    /// One line of spans per terminal row, using upper half blocks so each
    /// cell carries two pixels.
    #[must_use]
    pub fn to_cells(&self) -> Vec<Vec<Span<'static>>> {
        (0..self.height.div_ceil(2))
            .map(|row| {
                (0..self.width)
                    .map(|x| {
                        let top = self.pixel(x, row * 2).map_or(Color::Reset, rgb);
                        let bottom = self.pixel(x, row * 2 + 1).map_or(Color::Reset, rgb);
                        Span::styled("▀", Style::default().fg(top).bg(bottom))
                    })
                    .collect()
            })
            .collect()
    }
}

const fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}
