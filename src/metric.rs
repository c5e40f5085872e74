//! Distance functions over arbitrary item types.
//!
//! The tree never looks inside the items it stores. Everything it knows
//! about them comes from a [`Metric`], which must be symmetric,
//! non-negative and obey the triangle inequality; search pruning is only
//! sound for true metrics.
use std::cmp::Ordering;
use std::fmt::{Debug, Display};

pub use num::Float;

/// Numeric type of a distance.
pub trait Scalar: Float + Debug + Display {}
impl<T: Float + Debug + Display> Scalar for T {}

/// A distance function over items of type `T`.
///
/// Every `Fn(&T, &T) -> F` is a metric, so plain functions and closures can
/// be handed to the tree directly:
///
/// ```
/// use vantage::Metric;
///
/// let abs = |a: &f64, b: &f64| (a - b).abs();
/// assert_eq!(abs.distance(&1.0, &4.0), 3.0);
/// ```
pub trait Metric<T: ?Sized> {
    type Distance: Scalar;

    fn distance(&self, a: &T, b: &T) -> Self::Distance;
}

impl<T: ?Sized, F: Scalar, C> Metric<T> for C
    where C: Fn(&T, &T) -> F {
    type Distance = F;

    #[inline]
    fn distance(&self, a: &T, b: &T) -> F {
        self(a, b)
    }
}

/// An item that knows its own distance to other items of the same type.
pub trait MetricItem<F: Scalar> {
    fn distance(&self, other: &Self) -> F;
}

/// The metric induced by a [`MetricItem`] implementation.
pub type ItemMetric<T, F> = fn(&T, &T) -> F;

/// Return the metric of a [`MetricItem`] type as a function pointer.
pub fn item_metric<T: MetricItem<F>, F: Scalar>() -> ItemMetric<T, F> {
    <T as MetricItem<F>>::distance
}

/// Order two distances.
///
/// Incomparable values (NaN) are treated as equal rather than panicking.
#[inline]
pub fn cmp_distance<F: PartialOrd>(a: &F, b: &F) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    struct Cell(i32);

    impl MetricItem<f32> for Cell {
        fn distance(&self, other: &Self) -> f32 {
            (self.0 - other.0).abs() as f32
        }
    }

    fn euclid(a: &[f64; 2], b: &[f64; 2]) -> f64 {
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
    }

    #[test]
    fn fn_items_are_metrics() {
        assert_eq!(euclid.distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
    }

    #[test]
    fn item_metric_uses_trait_impl() {
        let m = item_metric::<Cell, f32>();
        assert_eq!(m.distance(&Cell(-2), &Cell(5)), 7.0);
    }

    #[test]
    fn nan_compares_equal() {
        assert_eq!(cmp_distance(&1.0, &2.0), Ordering::Less);
        assert_eq!(cmp_distance(&std::f32::NAN, &2.0), Ordering::Equal);
    }
}
