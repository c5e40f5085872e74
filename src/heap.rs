//! Bounded accumulator for the k best candidates of a search.
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use crate::metric::{cmp_distance, Scalar};

/// An item found by a search, together with its distance to the query.
pub struct Neighbor<'a, T: 'a, F> {
    pub item: &'a T,
    pub distance: F,
}

impl<'a, T: 'a, F> Neighbor<'a, T, F> {
    pub fn new(item: &'a T, distance: F) -> Self {
        Neighbor { item: item, distance: distance }
    }
}

impl<'a, T: 'a, F: Copy> Clone for Neighbor<'a, T, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T: 'a, F: Copy> Copy for Neighbor<'a, T, F> {}

impl<'a, T: fmt::Debug + 'a, F: fmt::Debug> fmt::Debug for Neighbor<'a, T, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Neighbor")
            .field("item", self.item)
            .field("distance", &self.distance)
            .finish()
    }
}

/// Heap entry, ordered by distance only.
struct HeapElem<'a, T: 'a, F> {
    dist: F,
    item: &'a T,
}

impl<'a, T: 'a, F: Scalar> PartialEq for HeapElem<'a, T, F> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<'a, T: 'a, F: Scalar> Eq for HeapElem<'a, T, F> {}

impl<'a, T: 'a, F: Scalar> PartialOrd for HeapElem<'a, T, F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a, T: 'a, F: Scalar> Ord for HeapElem<'a, T, F> {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_distance(&self.dist, &other.dist)
    }
}

/// Max-heap holding at most `k` candidates.
///
/// Once full, a new candidate only gets in by being strictly closer than
/// the current worst one, which it then evicts.
pub struct KnnHeap<'a, T: 'a, F: Scalar> {
    k: usize,
    heap: BinaryHeap<HeapElem<'a, T, F>>,
}

impl<'a, T: 'a, F: Scalar> KnnHeap<'a, T, F> {
    pub fn new(k: usize) -> Self {
        KnnHeap { k: k, heap: BinaryHeap::with_capacity(k) }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// Offer a candidate. Returns whether it was kept.
    pub fn offer(&mut self, item: &'a T, dist: F) -> bool {
        if self.k == 0 {
            return false;
        }
        if self.heap.len() < self.k {
            self.heap.push(HeapElem { dist: dist, item: item });
            return true;
        }

        // Replacing through PeekMut sifts the new top down on drop.
        match self.heap.peek_mut() {
            Some(mut top) => {
                if dist < top.dist {
                    *top = HeapElem { dist: dist, item: item };
                    true
                } else {
                    false
                }
            }
            None => false,
        }
    }

    /// The pruning bound: the largest distance held, or infinity until
    /// `k` candidates have been seen.
    pub fn current_worst(&self) -> F {
        match self.heap.peek() {
            Some(top) if self.is_full() => top.dist,
            _ => F::infinity(),
        }
    }

    /// Consume the heap, returning its candidates closest first.
    pub fn into_sorted_vec(self) -> Vec<Neighbor<'a, T, F>> {
        self.heap.into_sorted_vec()
            .into_iter()
            .map(|e| Neighbor::new(e.item, e.dist))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::KnnHeap;

    #[test]
    fn not_full_record_is_infinite() {
        let items = [1u8, 2];
        let mut heap = KnnHeap::<u8, f32>::new(3);
        assert!(heap.current_worst().is_infinite());
        heap.offer(&items[0], 1.0f32);
        heap.offer(&items[1], 4.0);
        assert!(heap.current_worst().is_infinite());
    }

    #[test]
    fn keeps_k_smallest() {
        let items: Vec<u32> = (0..10).collect();
        let mut heap = KnnHeap::new(3);
        for (item, d) in items.iter().zip(&[9.0, 3.0, 7.0, 1.0, 8.0, 2.0, 6.0, 5.0, 4.0, 0.5f64]) {
            heap.offer(item, *d);
        }
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.current_worst(), 2.0);

        let res = heap.into_sorted_vec();
        let ids: Vec<u32> = res.iter().map(|n| *n.item).collect();
        assert_eq!(ids, vec![9, 3, 5]);
        let ds: Vec<f64> = res.iter().map(|n| n.distance).collect();
        assert_eq!(ds, vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn equal_distance_does_not_evict() {
        let items = ['a', 'b'];
        let mut heap = KnnHeap::new(1);
        assert!(heap.offer(&items[0], 1.0f32));
        assert!(!heap.offer(&items[1], 1.0));
        assert_eq!(*heap.into_sorted_vec()[0].item, 'a');
    }

    #[test]
    fn zero_capacity_discards() {
        let x = 0u8;
        let mut heap = KnnHeap::new(0);
        assert!(!heap.offer(&x, 0.0f32));
        assert!(heap.is_empty());
        assert!(heap.into_sorted_vec().is_empty());
    }
}
