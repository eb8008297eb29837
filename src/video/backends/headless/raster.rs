//! Pixel storage and triangle rasterization of the software device.

use crate::math::prelude::{Color, Vector2};
use crate::video::assets::SurfaceViewport;

/// The default framebuffer. Rows are stored bottom-up like GL reads them back.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    dimensions: Vector2<u32>,
    pixels: Vec<Color<f32>>,
}

impl Framebuffer {
    pub fn new(dimensions: Vector2<u32>) -> Self {
        let len = dimensions.x as usize * dimensions.y as usize;
        Framebuffer {
            dimensions,
            pixels: vec![Color::transparent(); len],
        }
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    /// Reallocates the storage. Like resizing a canvas, this discards the contents.
    pub fn resize(&mut self, dimensions: Vector2<u32>) {
        *self = Framebuffer::new(dimensions);
    }

    pub fn clear(&mut self, color: Color<f32>) {
        for v in &mut self.pixels {
            *v = color;
        }
    }

    /// Returns the pixel at `(x, y)`, counted from the lower-left corner.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color<f32>> {
        if x >= self.dimensions.x || y >= self.dimensions.y {
            return None;
        }

        let index = y as usize * self.dimensions.x as usize + x as usize;
        Some(self.pixels[index])
    }

    /// Rasterizes a triangle given in clip coordinates, writing `color` to every
    /// pixel whose center it covers. Both windings are filled. Returns the number
    /// of pixels written.
    pub fn fill_triangle(
        &mut self,
        vp: SurfaceViewport,
        vertices: [[f32; 4]; 3],
        color: Color<f32>,
    ) -> usize {
        let mut points = [[0.0f32; 2]; 3];
        for (i, v) in vertices.iter().enumerate() {
            if v[3] == 0.0 {
                return 0;
            }

            // Perspective divide, then the viewport transform.
            let ndc = [v[0] / v[3], v[1] / v[3]];
            points[i] = [
                (ndc[0] + 1.0) * 0.5 * vp.size.x as f32 + vp.position.x as f32,
                (ndc[1] + 1.0) * 0.5 * vp.size.y as f32 + vp.position.y as f32,
            ];
        }

        let area = edge(points[0], points[1], points[2]);
        if area == 0.0 || !area.is_finite() {
            return 0;
        }

        let min_x = vp.position.x.max(0) as f32;
        let min_y = vp.position.y.max(0) as f32;
        let max_x = (vp.position.x as f32 + vp.size.x as f32).min(self.dimensions.x as f32);
        let max_y = (vp.position.y as f32 + vp.size.y as f32).min(self.dimensions.y as f32);

        let lo_x = points.iter().map(|v| v[0]).fold(max_x, f32::min).max(min_x).floor() as i64;
        let lo_y = points.iter().map(|v| v[1]).fold(max_y, f32::min).max(min_y).floor() as i64;
        let hi_x = points.iter().map(|v| v[0]).fold(min_x, f32::max).min(max_x).ceil() as i64;
        let hi_y = points.iter().map(|v| v[1]).fold(min_y, f32::max).min(max_y).ceil() as i64;

        let mut written = 0;
        for y in lo_y.max(0)..hi_y.min(i64::from(self.dimensions.y)) {
            for x in lo_x.max(0)..hi_x.min(i64::from(self.dimensions.x)) {
                let p = [x as f32 + 0.5, y as f32 + 0.5];
                if p[0] >= max_x || p[1] >= max_y || p[0] < min_x || p[1] < min_y {
                    continue;
                }

                let w0 = edge(points[1], points[2], p);
                let w1 = edge(points[2], points[0], p);
                let w2 = edge(points[0], points[1], p);

                let inside = if area > 0.0 {
                    w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
                } else {
                    w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
                };

                if inside {
                    let index = y as usize * self.dimensions.x as usize + x as usize;
                    self.pixels[index] = color;
                    written += 1;
                }
            }
        }

        written
    }
}

#[inline]
fn edge(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (p[1] - a[1]) - (b[1] - a[1]) * (p[0] - a[0])
}
