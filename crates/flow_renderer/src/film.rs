//! Linear RGB frame buffer.

use crate::bucket::Bucket;
use crate::material::Color;

/// Row-major linear RGB pixels. Row 0 is the top of the image.
#[derive(Debug, Clone, PartialEq)]
pub struct Film {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Film {
    /// Create a new film filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Copy a bucket's row-major pixels into place.
    pub fn write_bucket(&mut self, bucket: &Bucket, pixels: &[Color]) {
        debug_assert_eq!(pixels.len(), bucket.pixel_count() as usize);
        let row_len = bucket.width as usize;
        for (row, chunk) in pixels.chunks_exact(row_len).enumerate() {
            let start = self.offset(bucket.x, bucket.y + row as u32);
            self.pixels[start..start + row_len].copy_from_slice(chunk);
        }
    }

    /// Index of (x, y). Panics outside the image instead of wrapping to the
    /// next row.
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) is outside the {}x{} film",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_black() {
        let film = Film::new(3, 2);
        assert_eq!(film.pixels().len(), 6);
        assert!(film.pixels().iter().all(|p| *p == Color::ZERO));
    }

    #[test]
    fn test_get_set() {
        let mut film = Film::new(3, 2);
        film.set(2, 1, Color::ONE);
        assert_eq!(film.get(2, 1), Color::ONE);
        assert_eq!(film.pixels()[5], Color::ONE);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_get_past_row_end_panics() {
        let film = Film::new(3, 2);
        film.get(3, 0);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_set_below_last_row_panics() {
        let mut film = Film::new(3, 2);
        film.set(0, 2, Color::ONE);
    }

    #[test]
    fn test_write_bucket() {
        let mut film = Film::new(4, 4);
        let bucket = Bucket::new(2, 1, 2, 2, 0);
        let pixels = [Color::X, Color::Y, Color::Z, Color::ONE];
        film.write_bucket(&bucket, &pixels);

        assert_eq!(film.get(2, 1), Color::X);
        assert_eq!(film.get(3, 1), Color::Y);
        assert_eq!(film.get(2, 2), Color::Z);
        assert_eq!(film.get(3, 2), Color::ONE);
        assert_eq!(film.get(1, 1), Color::ZERO);
    }
}
