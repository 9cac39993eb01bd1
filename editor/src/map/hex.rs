//! Hex coordinate system and conversions
//! Flat-top hexagons in offset layout: odd columns sit half a row lower

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// √3, the row-height factor of a flat-top hexagon
pub const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Unique identifier for a hex cell
#[derive(
    Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct HexCoord {
    pub col: i32,
    pub row: i32,
}

impl HexCoord {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Column parity, 1 for odd columns (including negative ones)
    pub fn parity(&self) -> i32 {
        self.col.rem_euclid(2)
    }

    /// Pixel center of this hex relative to the grid origin
    pub fn to_pixel(&self, size: f64) -> (f64, f64) {
        hex_to_pixel(self.col, self.row, size)
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

/// Vertices of a flat-top hexagon, starting at 0° and stepping by 60°
pub fn hex_corners(center: (f64, f64), size: f64) -> [(f64, f64); 6] {
    let mut corners = [(0.0, 0.0); 6];
    for (i, corner) in corners.iter_mut().enumerate() {
        let angle = PI / 3.0 * i as f64;
        *corner = (center.0 + size * angle.cos(), center.1 + size * angle.sin());
    }
    corners
}

/// Convert offset hex coordinates to the pixel center of the cell
pub fn hex_to_pixel(col: i32, row: i32, size: f64) -> (f64, f64) {
    let parity = col.rem_euclid(2) as f64;
    let x = size * 1.5 * col as f64;
    let y = size * SQRT_3 * (row as f64 + 0.5 * parity);
    (x, y)
}

/// Find the hex whose center is nearest to a pixel position.
///
/// The row offset depends on column parity, so there is no exact closed-form
/// inverse. Candidates around the estimated column (±1) and row (±2) are
/// compared by squared distance; the first minimum wins.
pub fn pixel_to_hex(x: f64, y: f64, size: f64) -> HexCoord {
    let col = (x / (size * 1.5)).round() as i32;
    let mut best = HexCoord::new(col, 0);
    let mut best_dist = f64::INFINITY;

    for dc in -1..=1 {
        let c = col + dc;
        let parity = c.rem_euclid(2) as f64;
        let row_estimate = (y / (size * SQRT_3) - 0.5 * parity).round() as i32;
        for dr in -2..=2 {
            let r = row_estimate + dr;
            let (hx, hy) = hex_to_pixel(c, r, size);
            let dist = (x - hx).powi(2) + (y - hy).powi(2);
            if dist < best_dist {
                best_dist = dist;
                best = HexCoord::new(c, r);
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_pixel() {
        let (x, y) = hex_to_pixel(0, 0, 60.0);
        assert_eq!((x, y), (0.0, 0.0));

        // Odd column is pushed down half a row
        let (x, y) = hex_to_pixel(1, 0, 60.0);
        assert!((x - 90.0).abs() < 1e-9);
        assert!((y - 30.0 * SQRT_3).abs() < 1e-9);

        // Negative odd column shares the same shift
        let (_, y) = hex_to_pixel(-1, 0, 60.0);
        assert!((y - 30.0 * SQRT_3).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip() {
        for &size in &[20.0, 37.5, 60.0, 65.0, 160.0] {
            for col in -25..=25 {
                for row in -25..=25 {
                    let (x, y) = hex_to_pixel(col, row, size);
                    assert_eq!(pixel_to_hex(x, y, size), HexCoord::new(col, row));
                }
            }
        }
    }

    #[test]
    fn test_far_coordinates() {
        let coord = HexCoord::new(-10_001, 40_000);
        let (x, y) = coord.to_pixel(20.0);
        assert_eq!(pixel_to_hex(x, y, 20.0), coord);
    }

    #[test]
    fn test_near_column_boundary() {
        // Point just inside hex (1,0), between the centers of (0,0) and (1,0)
        let size = 60.0;
        let (x, y) = hex_to_pixel(1, 0, size);
        let hit = pixel_to_hex(x - size * 0.9, y, size);
        assert_eq!(hit, HexCoord::new(1, 0));
    }

    #[test]
    fn test_hex_corners() {
        let corners = hex_corners((10.0, 20.0), 30.0);
        assert!((corners[0].0 - 40.0).abs() < 1e-9);
        assert!((corners[0].1 - 20.0).abs() < 1e-9);
        assert!((corners[3].0 + 20.0).abs() < 1e-9);
        for (cx, cy) in corners {
            let r = ((cx - 10.0).powi(2) + (cy - 20.0).powi(2)).sqrt();
            assert!((r - 30.0).abs() < 1e-9);
        }
    }
}
