//! Linear-scan k-nearest-neighbor search.
//!
//! Every query measures every item, so this is only useful as a reference
//! to check [`VpTree`](crate::VpTree) results against.
use crate::heap::Neighbor;
use crate::metric::{cmp_distance, Metric};

pub struct NaiveKnn<T, M> {
    items: Vec<T>,
    metric: M,
}

impl<T, M: Metric<T>> NaiveKnn<T, M> {
    pub fn new(items: Vec<T>, metric: M) -> Self {
        NaiveKnn { items: items, metric: metric }
    }

    /// Select the `k` closest items with a linear-time selection, then
    /// sort only those.
    pub fn search(&self, query: &T, k: usize) -> Vec<Neighbor<'_, T, M::Distance>> {
        let k = k.min(self.items.len());
        if k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<Neighbor<'_, T, M::Distance>> = self.items.iter()
            .map(|item| Neighbor::new(item, self.metric.distance(query, item)))
            .collect();

        if k < scored.len() {
            order_stat::kth_by(&mut scored, k, |a, b| cmp_distance(&a.distance, &b.distance));
            scored.truncate(k);
        }
        scored.sort_by(|a, b| cmp_distance(&a.distance, &b.distance));
        scored
    }
}
