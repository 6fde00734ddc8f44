use crate::error::InkResult;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use std::convert::Infallible;
use std::path::Path;

/// Luma value of an inked pixel
pub const INK: u8 = 0;
/// Luma value of bare paper
pub const PAPER: u8 = 255;

fn luma(color: BinaryColor) -> Luma<u8> {
    match color {
        BinaryColor::On => Luma([INK]),
        BinaryColor::Off => Luma([PAPER]),
    }
}

/// One ink colour's worth of pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plane {
    image: GrayImage,
}

impl Plane {
    /// Blank (all paper) plane
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([PAPER])),
        }
    }

    /// Threshold any image into a plane; dark pixels become ink
    pub fn from_image(image: &DynamicImage) -> Self {
        let mut gray = image.to_luma8();
        for pixel in gray.pixels_mut() {
            pixel.0[0] = if pixel.0[0] < 128 { INK } else { PAPER };
        }
        Self { image: gray }
    }

    pub fn open(path: &Path) -> InkResult<Self> {
        Ok(Self::from_image(&image::open(path)?))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.image
            .get_pixel_checked(x, y)
            .is_some_and(|p| p.0[0] == INK)
    }

    pub fn ink_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[0] == INK).count()
    }

    /// Fill the rectangle between two corners, both inclusive
    pub fn fill_rect(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), color: BinaryColor) {
        let width = bottom_right.0 - top_left.0 + 1;
        let height = bottom_right.1 - top_left.1 + 1;
        if width <= 0 || height <= 0 {
            return;
        }
        let rect = Rect::at(top_left.0, top_left.1).of_size(width as u32, height as u32);
        draw_filled_rect_mut(&mut self.image, rect, luma(color));
    }

    /// Pack to one bit per pixel, rows padded to whole bytes, MSB first, 1 = paper
    pub fn to_packed(&self) -> Vec<u8> {
        let stride = self.width().div_ceil(8) as usize;
        let mut packed = vec![0u8; stride * self.height() as usize];

        for (x, y, pixel) in self.image.enumerate_pixels() {
            if pixel.0[0] != INK {
                packed[y as usize * stride + (x / 8) as usize] |= 0x80 >> (x % 8);
            }
        }
        packed
    }

    pub fn save_png(&self, path: &Path) -> InkResult<()> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

impl OriginDimensions for Plane {
    fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }
}

impl DrawTarget for Plane {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = (self.width() as i32, self.height() as i32);
        for Pixel(point, color) in pixels {
            if (0..width).contains(&point.x) && (0..height).contains(&point.y) {
                self.image.put_pixel(point.x as u32, point.y as u32, luma(color));
            }
        }
        Ok(())
    }
}

/// Draw target that blows every pixel up into a `factor`×`factor` block around `origin`
pub struct Scaled<'a, T> {
    target: &'a mut T,
    origin: Point,
    factor: u32,
}

impl<'a, T> Scaled<'a, T> {
    pub fn new(target: &'a mut T, origin: Point, factor: u32) -> Self {
        Self {
            target,
            origin,
            factor: factor.max(1),
        }
    }
}

impl<T: OriginDimensions> Dimensions for Scaled<'_, T> {
    fn bounding_box(&self) -> Rectangle {
        let f = self.factor as i32;
        let size = self.target.size();
        Rectangle::new(
            Point::new(-self.origin.x / f, -self.origin.y / f),
            Size::new(size.width / self.factor, size.height / self.factor),
        )
    }
}

impl<T> DrawTarget for Scaled<'_, T>
where
    T: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    type Color = BinaryColor;
    type Error = T::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let f = self.factor as i32;
        for Pixel(point, color) in pixels {
            let top_left = self.origin + Point::new(point.x * f, point.y * f);
            self.target
                .fill_solid(&Rectangle::new(top_left, Size::new_equal(self.factor)), color)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_plane_is_blank() {
        let plane = Plane::new(16, 4);
        assert_eq!(plane.ink_count(), 0);
        assert!(plane.to_packed().iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_fill_rect_is_inclusive() {
        let mut plane = Plane::new(10, 10);
        plane.fill_rect((2, 3), (4, 3), BinaryColor::On);
        assert_eq!(plane.ink_count(), 3);
        assert!(plane.is_ink(2, 3));
        assert!(plane.is_ink(4, 3));
        assert!(!plane.is_ink(5, 3));
    }

    #[test]
    fn test_packing_is_msb_first_with_padding() {
        // 10 pixels wide pads each row to two bytes
        let mut plane = Plane::new(10, 2);
        plane.fill_rect((0, 0), (0, 0), BinaryColor::On);
        plane.fill_rect((9, 1), (9, 1), BinaryColor::On);

        let packed = plane.to_packed();
        assert_eq!(packed.len(), 4);
        assert_eq!(packed[0], 0b0111_1111);
        assert_eq!(packed[1], 0b1100_0000);
        assert_eq!(packed[2], 0b1111_1111);
        assert_eq!(packed[3], 0b1000_0000);
    }

    #[test]
    fn test_draw_target_clips() {
        let mut plane = Plane::new(4, 4);
        plane
            .draw_iter([
                Pixel(Point::new(-1, 0), BinaryColor::On),
                Pixel(Point::new(1, 1), BinaryColor::On),
                Pixel(Point::new(4, 4), BinaryColor::On),
            ])
            .unwrap();
        assert_eq!(plane.ink_count(), 1);
    }

    #[test]
    fn test_scaled_blocks() {
        let mut plane = Plane::new(20, 20);
        Scaled::new(&mut plane, Point::new(4, 4), 3)
            .draw_iter([Pixel(Point::new(1, 0), BinaryColor::On)])
            .unwrap();
        assert_eq!(plane.ink_count(), 9);
        assert!(plane.is_ink(7, 4));
        assert!(plane.is_ink(9, 6));
        assert!(!plane.is_ink(6, 4));
    }

    #[test]
    fn test_from_image_thresholds() {
        let mut gray = GrayImage::from_pixel(2, 1, Luma([200]));
        gray.put_pixel(0, 0, Luma([30]));
        let plane = Plane::from_image(&DynamicImage::ImageLuma8(gray));
        assert!(plane.is_ink(0, 0));
        assert!(!plane.is_ink(1, 0));
    }
}
