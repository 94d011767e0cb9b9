//! Curves sampled by wave number.

use serde::{Deserialize, Serialize};

/// Pure function from a sample point to a value.
pub trait Curve {
    /// Samples the curve at `x`.
    fn evaluate(&self, x: f64) -> f64;

    /// Reports whether the curve carries no data and should be treated as unset.
    fn is_empty(&self) -> bool {
        false
    }
}

/// Curve that yields the same value everywhere.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstantCurve(f64);

impl ConstantCurve {
    /// Creates a constant curve.
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// Value produced at every sample point.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }
}

impl Curve for ConstantCurve {
    fn evaluate(&self, _x: f64) -> f64 {
        self.0
    }
}

/// Control point of a [`LinearCurve`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct CurvePoint {
    /// Sample position.
    pub x: f64,
    /// Value at the sample position.
    pub y: f64,
}

impl CurvePoint {
    /// Creates a control point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for CurvePoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<CurvePoint> for (f64, f64) {
    fn from(point: CurvePoint) -> Self {
        (point.x, point.y)
    }
}

/// Piecewise linear curve through sorted control points.
///
/// Outside the key range the curve holds the first or last value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")]
pub struct LinearCurve {
    points: Vec<CurvePoint>,
}

impl LinearCurve {
    /// Builds a curve from arbitrary control points.
    ///
    /// Points with non-finite coordinates are discarded and the rest are
    /// sorted by `x`.
    #[must_use]
    pub fn new(points: impl IntoIterator<Item = CurvePoint>) -> Self {
        let mut points: Vec<CurvePoint> = points
            .into_iter()
            .filter(|point| point.x.is_finite() && point.y.is_finite())
            .collect();
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { points }
    }

    /// Straight line between two control points.
    #[must_use]
    pub fn between(start: (f64, f64), end: (f64, f64)) -> Self {
        Self::new([CurvePoint::from(start), CurvePoint::from(end)])
    }

    /// Control points in ascending `x` order.
    #[must_use]
    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }
}

impl From<Vec<CurvePoint>> for LinearCurve {
    fn from(points: Vec<CurvePoint>) -> Self {
        Self::new(points)
    }
}

impl From<LinearCurve> for Vec<CurvePoint> {
    fn from(curve: LinearCurve) -> Self {
        curve.points
    }
}

impl Curve for LinearCurve {
    fn evaluate(&self, x: f64) -> f64 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }

        for window in self.points.windows(2) {
            let (left, right) = (window[0], window[1]);
            if x > right.x {
                continue;
            }

            let span = right.x - left.x;
            if span <= f64::EPSILON {
                return right.y;
            }
            let t = (x - left.x) / span;
            return left.y + (right.y - left.y) * t;
        }

        last.y
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Stored form of a wave curve used by rules and scaling sets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveCurve {
    /// Same value at every wave.
    Constant(ConstantCurve),
    /// Linear interpolation between control points.
    Linear(LinearCurve),
}

impl WaveCurve {
    /// Convenience constructor for a constant curve.
    #[must_use]
    pub const fn constant(value: f64) -> Self {
        Self::Constant(ConstantCurve::new(value))
    }

    /// Convenience constructor for a linear curve.
    #[must_use]
    pub fn linear(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self::Linear(LinearCurve::new(points.into_iter().map(CurvePoint::from)))
    }
}

impl Curve for WaveCurve {
    fn evaluate(&self, x: f64) -> f64 {
        match self {
            Self::Constant(curve) => curve.evaluate(x),
            Self::Linear(curve) => curve.evaluate(x),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Self::Constant(curve) => curve.is_empty(),
            Self::Linear(curve) => curve.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Curve, CurvePoint, LinearCurve, WaveCurve};

    #[test]
    fn linear_curve_interpolates_between_points() {
        let curve = LinearCurve::between((1.0, 6.0), (20.0, 60.0));
        assert_eq!(curve.evaluate(1.0), 6.0);
        assert_eq!(curve.evaluate(20.0), 60.0);
        let midpoint = curve.evaluate(10.5);
        assert!((midpoint - 33.0).abs() < 1e-9, "midpoint was {midpoint}");
    }

    #[test]
    fn linear_curve_holds_end_values_outside_range() {
        let curve = LinearCurve::between((1.0, 6.0), (20.0, 60.0));
        assert_eq!(curve.evaluate(-5.0), 6.0);
        assert_eq!(curve.evaluate(400.0), 60.0);
    }

    #[test]
    fn unsorted_points_are_sorted() {
        let curve = LinearCurve::new([
            CurvePoint::new(10.0, 3.0),
            CurvePoint::new(0.0, 1.0),
            CurvePoint::new(5.0, 2.0),
        ]);
        let xs: Vec<f64> = curve.points().iter().map(|point| point.x).collect();
        assert_eq!(xs, vec![0.0, 5.0, 10.0]);
        assert_eq!(curve.evaluate(7.5), 2.5);
    }

    #[test]
    fn non_finite_points_are_dropped() {
        let curve = LinearCurve::new([
            CurvePoint::new(f64::NAN, 1.0),
            CurvePoint::new(2.0, f64::INFINITY),
        ]);
        assert!(curve.is_empty());
        assert_eq!(curve.evaluate(3.0), 0.0);
    }

    #[test]
    fn duplicate_keys_do_not_divide_by_zero() {
        let curve = LinearCurve::new([
            CurvePoint::new(0.0, 1.0),
            CurvePoint::new(2.0, 4.0),
            CurvePoint::new(2.0, 8.0),
            CurvePoint::new(4.0, 8.0),
        ]);
        assert!(curve.evaluate(2.0).is_finite());
        assert_eq!(curve.evaluate(3.0), 8.0);
    }

    #[test]
    fn wave_curve_deserializes_from_toml() {
        #[derive(serde::Deserialize)]
        struct Holder {
            count: WaveCurve,
            flat: WaveCurve,
        }

        let holder: Holder = toml::from_str(
            "count = { linear = [[1.0, 6.0], [20.0, 60.0]] }\nflat = { constant = 2.5 }\n",
        )
        .expect("curve toml parses");
        assert_eq!(holder.count, WaveCurve::linear([(1.0, 6.0), (20.0, 60.0)]));
        assert_eq!(holder.flat, WaveCurve::constant(2.5));
    }
}
