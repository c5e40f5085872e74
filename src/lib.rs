//! k-nearest-neighbor search over arbitrary metric spaces with a
//! vantage-point tree.
//!
//! ```
//! use vantage::VpTree;
//!
//! let tree = VpTree::new(vec![1.0, 5.0, 9.0, 2.0], |a: &f64, b: &f64| (a - b).abs());
//! let nearest: Vec<f64> = tree.search(&4.0, 2).iter().map(|n| *n.item).collect();
//! assert_eq!(nearest, vec![5.0, 2.0]);
//! ```
extern crate num;
extern crate rand;

pub mod error;
pub mod generator;
pub mod heap;
pub mod metric;
pub mod naive;
pub mod person;
pub mod report;
pub mod vptree;

pub use error::{Error, Result};
pub use heap::{KnnHeap, Neighbor};
pub use metric::{Metric, MetricItem, Scalar};
pub use naive::NaiveKnn;
pub use person::{person_distance, Person};
pub use vptree::{BuildOptions, SearchStats, VpTree};
