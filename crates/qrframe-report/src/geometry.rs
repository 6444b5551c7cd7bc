use qrframe_qr::Point2;
use serde::{Deserialize, Serialize};

/// A point in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    /// The x coordinate.
    pub x: i32,
    /// The y coordinate.
    pub y: i32,
}

impl Point {
    /// Rounds a sub-pixel point to the nearest integer coordinates.
    pub fn round(p: Point2) -> Self {
        Self {
            x: p[0].round() as i32,
            y: p[1].round() as i32,
        }
    }
}

/// Axis-aligned bounding box of a module, in integer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum x of the corners.
    pub min_x: i32,
    /// Minimum y of the corners.
    pub min_y: i32,
    /// Maximum x of the corners.
    pub max_x: i32,
    /// Maximum y of the corners.
    pub max_y: i32,
    /// `max_x - min_x`.
    pub width: i32,
    /// `max_y - min_y`.
    pub height: i32,
}

/// Derived geometry of one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Rounded centroid of the four corners.
    pub center: Point,
    /// Bounding box of the four corners.
    pub bounding_box: BoundingBox,
    /// The corners in the order the detector delivered them.
    pub corners: [Point; 4],
}

/// Resolves the position of a module from its four corners.
///
/// The center is the centroid of the corners, rounded to the nearest pixel, which differs
/// from the bounding box center for skewed quadrilaterals. The bounding box is computed on
/// the rounded corners, independently per axis. Corners are neither reordered nor checked
/// for convexity.
pub fn resolve(corners: &[Point2; 4]) -> Position {
    let (sum_x, sum_y) = corners
        .iter()
        .fold((0.0f64, 0.0f64), |(sx, sy), p| (sx + p[0] as f64, sy + p[1] as f64));
    let center = Point {
        x: (sum_x / 4.0).round() as i32,
        y: (sum_y / 4.0).round() as i32,
    };

    let corners = (*corners).map(Point::round);

    let mut min_x = i32::MAX;
    let mut min_y = i32::MAX;
    let mut max_x = i32::MIN;
    let mut max_y = i32::MIN;
    for p in &corners {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    Position {
        center,
        bounding_box: BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
            width: max_x - min_x,
            height: max_y - min_y,
        },
        corners,
    }
}

#[cfg(test)]
mod tests {
    use super::{resolve, BoundingBox, Point};

    #[test]
    fn axis_aligned_square() {
        let pos = resolve(&[
            [350.0, 250.0],
            [450.0, 250.0],
            [450.0, 350.0],
            [350.0, 350.0],
        ]);

        assert_eq!(pos.center, Point { x: 400, y: 300 });
        assert_eq!(
            pos.bounding_box,
            BoundingBox {
                min_x: 350,
                min_y: 250,
                max_x: 450,
                max_y: 350,
                width: 100,
                height: 100,
            }
        );
    }

    #[test]
    fn corners_keep_detector_order() {
        // counter-clockwise, starting bottom-right
        let pos = resolve(&[[20.0, 20.0], [20.0, 10.0], [10.0, 10.0], [10.0, 20.0]]);
        assert_eq!(
            pos.corners,
            [
                Point { x: 20, y: 20 },
                Point { x: 20, y: 10 },
                Point { x: 10, y: 10 },
                Point { x: 10, y: 20 },
            ]
        );
    }

    #[test]
    fn skewed_center_is_centroid() {
        let pos = resolve(&[[0.0, 0.0], [100.0, 0.0], [100.0, 100.0], [0.0, 10.0]]);

        // centroid y = 110 / 4 = 27.5, bounding box center would be 50
        assert_eq!(pos.center, Point { x: 50, y: 28 });
        assert_eq!(pos.bounding_box.height, 100);
    }

    #[test]
    fn subpixel_corners_are_rounded() {
        let pos = resolve(&[[10.4, 20.6], [30.5, 20.2], [29.7, 40.4], [9.6, 39.5]]);

        assert_eq!(pos.corners[0], Point { x: 10, y: 21 });
        assert_eq!(pos.corners[1], Point { x: 31, y: 20 });
        assert_eq!(pos.bounding_box.min_x, 10);
        assert_eq!(pos.bounding_box.max_x, 31);
        assert_eq!(pos.bounding_box.min_y, 20);
        assert_eq!(pos.bounding_box.max_y, 40);
        assert_eq!(pos.bounding_box.width, 21);
        assert_eq!(pos.bounding_box.height, 20);
    }

    #[test]
    fn extent_is_never_negative() {
        let quads = [
            [[5.0, 5.0], [5.0, 5.0], [5.0, 5.0], [5.0, 5.0]],
            [[-10.0, 3.0], [4.0, -7.0], [12.0, 9.0], [0.0, 15.0]],
            [[640.0, 0.0], [0.0, 480.0], [640.0, 480.0], [0.0, 0.0]],
        ];
        for quad in &quads {
            let bb = resolve(quad).bounding_box;
            assert_eq!(bb.width, bb.max_x - bb.min_x);
            assert_eq!(bb.height, bb.max_y - bb.min_y);
            assert!(bb.width >= 0 && bb.height >= 0);
        }
    }
}
