//! Map camera for viewport management, panning, and zooming

use std::ops::RangeInclusive;

use super::hex::{hex_to_pixel, pixel_to_hex, HexCoord};

/// Default hex radius in pixels
pub const DEFAULT_HEX_SIZE: f64 = 60.0;
pub const MIN_HEX_SIZE: f64 = 20.0;
pub const MAX_HEX_SIZE: f64 = 160.0;

/// Hex radius change per wheel notch
pub const ZOOM_STEP: f64 = 5.0;

/// Extra cells rendered around the viewport
const CULL_PAD: i32 = 2;

/// Map camera state
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// Screen position of the grid origin
    pub offset: (f64, f64),

    /// Hex radius in pixels, always within [MIN_HEX_SIZE, MAX_HEX_SIZE]
    hex_size: f64,
}

impl Camera {
    pub fn new(offset: (f64, f64), hex_size: f64) -> Self {
        Self {
            offset,
            hex_size: hex_size.clamp(MIN_HEX_SIZE, MAX_HEX_SIZE),
        }
    }

    pub fn hex_size(&self) -> f64 {
        self.hex_size
    }

    pub fn set_hex_size(&mut self, size: f64) {
        self.hex_size = size.clamp(MIN_HEX_SIZE, MAX_HEX_SIZE);
    }

    /// Move the grid origin to an absolute screen position
    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.offset = (x, y);
    }

    /// Pan the map by pixel delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset.0 += dx;
        self.offset.1 += dy;
    }

    /// Zoom by whole steps, keeping the point under the cursor stationary
    pub fn zoom_at(&mut self, direction: i32, screen_x: f64, screen_y: f64) {
        let old_size = self.hex_size;
        self.set_hex_size(old_size + direction as f64 * ZOOM_STEP);

        if (self.hex_size - old_size).abs() < f64::EPSILON {
            return;
        }

        let scale = self.hex_size / old_size;
        self.offset.0 = screen_x - scale * (screen_x - self.offset.0);
        self.offset.1 = screen_y - scale * (screen_y - self.offset.1);
    }

    /// Screen position of a hex center
    pub fn hex_to_screen(&self, coord: HexCoord) -> (f64, f64) {
        let (hx, hy) = hex_to_pixel(coord.col, coord.row, self.hex_size);
        (self.offset.0 + hx, self.offset.1 + hy)
    }

    /// Hex under a screen position
    pub fn screen_to_hex(&self, screen_x: f64, screen_y: f64) -> HexCoord {
        pixel_to_hex(
            screen_x - self.offset.0,
            screen_y - self.offset.1,
            self.hex_size,
        )
    }

    /// Column and row ranges covering a viewport of the given size
    pub fn visible_range(
        &self,
        width: f64,
        height: f64,
    ) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
        let size = self.hex_size;
        let top_left = pixel_to_hex(-self.offset.0 - size, -self.offset.1 - size, size);
        let bottom_right = pixel_to_hex(
            -self.offset.0 + width + size,
            -self.offset.1 + height + size,
            size,
        );

        (
            (top_left.col - CULL_PAD)..=(bottom_right.col + CULL_PAD),
            (top_left.row - CULL_PAD)..=(bottom_right.row + CULL_PAD),
        )
    }

    /// Iterate all hexes in the visible range, column-major
    pub fn visible_hexes(&self, width: f64, height: f64) -> Vec<HexCoord> {
        let (cols, rows) = self.visible_range(width, height);
        let mut hexes = Vec::new();
        for col in cols {
            for row in rows.clone() {
                hexes.push(HexCoord::new(col, row));
            }
        }
        hexes
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((550.0, 380.0), DEFAULT_HEX_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_keeps_cursor_point_fixed() {
        let mut camera = Camera::default();
        assert_eq!(camera.hex_size(), 60.0);

        let (px, py) = (400.0, 300.0);
        let world_x = (px - camera.offset.0) / camera.hex_size();
        let world_y = (py - camera.offset.1) / camera.hex_size();
        let hex_before = camera.screen_to_hex(px, py);

        camera.zoom_at(1, px, py);
        assert_eq!(camera.hex_size(), 65.0);

        let sx = camera.offset.0 + world_x * camera.hex_size();
        let sy = camera.offset.1 + world_y * camera.hex_size();
        assert!((sx - px).abs() < 1.0);
        assert!((sy - py).abs() < 1.0);
        assert_eq!(camera.screen_to_hex(px, py), hex_before);
    }

    #[test]
    fn test_zoom_clamps() {
        let mut camera = Camera::new((0.0, 0.0), 155.0);
        camera.zoom_at(1, 10.0, 10.0);
        camera.zoom_at(1, 10.0, 10.0);
        assert_eq!(camera.hex_size(), MAX_HEX_SIZE);

        // Clamped at the limit, so the offset is unchanged
        let offset = camera.offset;
        camera.zoom_at(1, 250.0, 90.0);
        assert_eq!(camera.offset, offset);

        for _ in 0..100 {
            camera.zoom_at(-1, 0.0, 0.0);
        }
        assert_eq!(camera.hex_size(), MIN_HEX_SIZE);
    }

    #[test]
    fn test_screen_hex_round_trip() {
        let camera = Camera::new((123.0, -45.0), 42.0);
        let coord = HexCoord::new(-3, 7);
        let (sx, sy) = camera.hex_to_screen(coord);
        assert_eq!(camera.screen_to_hex(sx, sy), coord);
    }

    #[test]
    fn test_visible_range_covers_viewport() {
        let camera = Camera::default();
        let (cols, rows) = camera.visible_range(800.0, 600.0);
        for &(x, y) in &[(0.0, 0.0), (800.0, 0.0), (0.0, 600.0), (800.0, 600.0)] {
            let hex = camera.screen_to_hex(x, y);
            assert!(cols.contains(&hex.col));
            assert!(rows.contains(&hex.row));
        }
        assert!(!camera.visible_hexes(800.0, 600.0).is_empty());
    }
}
