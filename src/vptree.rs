//! Vantage-Point Trees are a data structure for fast
//! k-nearest-neighbor searches in arbitrary metric spaces.
//!
//! The tree is an arena: one node per item, laid out so that the node at
//! index `i` has `items[i]` as its vantage point. Children are indices into
//! the same array. Construction shuffles the items and then splits every
//! range around the median distance from its first element; search is a
//! branch-and-bound walk pruned with the triangle inequality.
use std::fmt::{Debug, Write};

use log::{debug, log_enabled, trace, Level};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng, SeedableRng};

use crate::heap::{KnnHeap, Neighbor};
use crate::metric::{cmp_distance, item_metric, ItemMetric, Metric, MetricItem, Scalar};

/// Options controlling tree construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Seed for the shuffle applied before building. `None` draws from the
    /// thread-local generator.
    pub seed: Option<u64>,
}

impl BuildOptions {
    pub fn seeded(seed: u64) -> Self {
        BuildOptions { seed: Some(seed) }
    }
}

/// Counters collected during a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Number of nodes whose distance to the query was computed.
    pub visited: usize,
}

#[derive(Debug, Clone)]
struct Node<F> {
    item: usize,
    left: Option<usize>,
    right: Option<usize>,
    /// Median distance separating `left` (inner) from `right` (outer).
    /// `None` for leaves.
    radius: Option<F>,
}

impl<F> Node<F> {
    fn leaf(item: usize) -> Self {
        Node { item: item, left: None, right: None, radius: None }
    }
}

/// A pending child visit. Whether the child is entered is decided when it
/// is popped, against the record at that moment.
struct Branch<F> {
    node: usize,
    dist: F,
    radius: F,
    inner: bool,
}

impl<F: Scalar> Branch<F> {
    fn reachable(&self, record: F) -> bool {
        if self.inner {
            self.dist - record <= self.radius
        } else {
            self.dist + record >= self.radius
        }
    }
}

/// Immutable vantage-point tree over `items`, measured with `metric`.
pub struct VpTree<T, M: Metric<T>> {
    items: Vec<T>,
    nodes: Vec<Node<M::Distance>>,
    metric: M,
    root: Option<usize>,
}

impl<T, M: Metric<T>> VpTree<T, M> {
    /// Construct a new vantage point tree from a set of items.
    ///
    /// An empty set yields an empty tree, against which every search
    /// returns nothing.
    pub fn new(items: Vec<T>, metric: M) -> Self {
        Self::with_options(items, metric, &BuildOptions::default())
    }

    pub fn with_options(mut items: Vec<T>, metric: M, options: &BuildOptions) -> Self {
        match options.seed {
            Some(seed) => shuffle(&mut items, &mut StdRng::seed_from_u64(seed)),
            None => shuffle(&mut items, &mut thread_rng()),
        }

        let nodes = build(&mut items, &metric);
        let root = if nodes.is_empty() { None } else { Some(0) };
        let tree = VpTree { items: items, nodes: nodes, metric: metric, root: root };

        if log_enabled!(Level::Debug) {
            debug!("built vantage point tree over {} items, depth {}", tree.len(), tree.depth());
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The indexed items, in tree order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of levels on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(usize, usize)> = self.root.iter().map(|&r| (r, 1)).collect();
        while let Some((index, level)) = pending.pop() {
            deepest = deepest.max(level);
            let node = &self.nodes[index];
            pending.extend(node.left.iter().chain(node.right.iter()).map(|&c| (c, level + 1)));
        }
        deepest
    }

    /// Find the nearest neighbor, or `None` for an empty tree.
    pub fn nearest_neighbor(&self, query: &T) -> Option<Neighbor<'_, T, M::Distance>> {
        self.search(query, 1).into_iter().next()
    }

    /// Find the `k` nearest neighbors of `query`, closest first.
    ///
    /// Returns `min(k, len)` results. Items at exactly the same distance
    /// are ordered arbitrarily.
    pub fn search(&self, query: &T, k: usize) -> Vec<Neighbor<'_, T, M::Distance>> {
        self.search_with_stats(query, k).0
    }

    /// Like [`search`](VpTree::search), also reporting how many nodes
    /// were examined.
    pub fn search_with_stats(&self, query: &T, k: usize)
                             -> (Vec<Neighbor<'_, T, M::Distance>>, SearchStats) {
        let mut stats = SearchStats::default();
        let root = match self.root {
            Some(root) if k > 0 => root,
            _ => return (Vec::new(), stats),
        };

        let mut heap = KnnHeap::new(k.min(self.len()));
        let mut first = Some(root);
        let mut pending: Vec<Branch<M::Distance>> = Vec::new();

        loop {
            let index = match first.take() {
                Some(index) => index,
                None => match pending.pop() {
                    Some(branch) => {
                        if !branch.reachable(heap.current_worst()) {
                            continue;
                        }
                        branch.node
                    }
                    None => break,
                },
            };

            let node = &self.nodes[index];
            let item = &self.items[node.item];
            let dist = self.metric.distance(item, query);
            stats.visited += 1;
            heap.offer(item, dist);

            if let Some(radius) = node.radius {
                let inner = node.left.map(|c| Branch { node: c, dist: dist, radius: radius, inner: true });
                let outer = node.right.map(|c| Branch { node: c, dist: dist, radius: radius, inner: false });

                // Descend first into the side the query falls on; it tightens
                // the record sooner. The last one pushed is visited first.
                if dist < radius {
                    pending.extend(outer);
                    pending.extend(inner);
                } else {
                    pending.extend(inner);
                    pending.extend(outer);
                }
            }
        }

        trace!("knn search k={} visited {} of {} nodes", k, stats.visited, self.len());
        (heap.into_sorted_vec(), stats)
    }

    /// Render the tree structure, one node per line.
    pub fn dump(&self) -> String where T: Debug {
        let mut out = String::new();
        let mut pending: Vec<(usize, usize)> = self.root.iter().map(|&r| (r, 0)).collect();
        while let Some((index, level)) = pending.pop() {
            let node = &self.nodes[index];
            let _ = write!(out, "{:width$}{:?}", "", self.items[node.item], width = 2 * level);
            if let Some(radius) = node.radius {
                let _ = write!(out, " mu={}", radius);
            }
            out.push('\n');
            pending.extend(node.right.iter().map(|&c| (c, level + 1)));
            pending.extend(node.left.iter().map(|&c| (c, level + 1)));
        }
        out
    }
}

impl<T: MetricItem<F>, F: Scalar> VpTree<T, ItemMetric<T, F>> {
    /// Build a tree over items that measure themselves.
    pub fn from_items(items: Vec<T>) -> Self {
        Self::new(items, item_metric())
    }
}

#[cfg(feature = "parallel")]
impl<T: Sync, M: Metric<T> + Sync> VpTree<T, M>
    where M::Distance: Send + Sync {
    /// Answer a batch of queries on the rayon thread pool.
    pub fn par_search(&self, queries: &[T], k: usize) -> Vec<Vec<Neighbor<'_, T, M::Distance>>> {
        use rayon::prelude::*;

        queries.par_iter().map(|q| self.search(q, k)).collect()
    }
}

fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// Lay out the tree over `items`, reordering them in place.
///
/// The node for range `[start, finish)` lives at `start`. Ranges are
/// processed from an explicit stack rather than by recursion.
fn build<T, M: Metric<T>>(items: &mut [T], metric: &M) -> Vec<Node<M::Distance>> {
    let n = items.len();
    let mut nodes: Vec<Node<M::Distance>> = (0..n).map(Node::leaf).collect();
    let mut pending = vec![(0, n)];

    while let Some((start, finish)) = pending.pop() {
        if finish - start <= 1 {
            continue;
        }

        // The larger half goes right when the range is odd-sized.
        let median = (start + finish + 1) / 2;
        let (head, tail) = items[start..finish].split_at_mut(1);
        let vp = &head[0];
        let kth = median - start - 1;

        // Everything before `median` ends up no farther than the element at
        // `median`, everything after no nearer.
        order_stat::kth_by(tail, kth, |a, b| {
            cmp_distance(&metric.distance(vp, a), &metric.distance(vp, b))
        });
        let radius = metric.distance(vp, &tail[kth]);

        let node = &mut nodes[start];
        node.radius = Some(radius);
        node.left = if start + 1 < median { Some(start + 1) } else { None };
        node.right = Some(median);

        pending.push((median, finish));
        pending.push((start + 1, median));
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abs(a: &f64, b: &f64) -> f64 {
        (a - b).abs()
    }

    fn check_subtree(tree: &VpTree<f64, fn(&f64, &f64) -> f64>, index: usize, out: &mut Vec<usize>) {
        out.push(index);
        let node = &tree.nodes[index];
        assert_eq!(node.item, index);
        let vp = tree.items[node.item];
        if let Some(radius) = node.radius {
            let mut left = Vec::new();
            let mut right = Vec::new();
            if let Some(l) = node.left {
                check_subtree(tree, l, &mut left);
            }
            if let Some(r) = node.right {
                check_subtree(tree, r, &mut right);
            }
            for &i in &left {
                assert!(abs(&vp, &tree.items[i]) <= radius);
            }
            for &i in &right {
                assert!(abs(&vp, &tree.items[i]) >= radius);
            }
            out.extend(left);
            out.extend(right);
        } else {
            assert!(node.left.is_none() && node.right.is_none());
        }
    }

    fn tree_of(items: Vec<f64>, seed: u64) -> VpTree<f64, fn(&f64, &f64) -> f64> {
        VpTree::with_options(items, abs as fn(&f64, &f64) -> f64, &BuildOptions::seeded(seed))
    }

    #[test]
    fn partition_invariants_hold() {
        for n in 0..64 {
            let items: Vec<f64> = (0..n).map(|i| ((i * 37) % 11) as f64).collect();
            let tree = tree_of(items, n as u64);
            assert_eq!(tree.nodes.len(), tree.items.len());
            let mut seen = Vec::new();
            if let Some(root) = tree.root {
                check_subtree(&tree, root, &mut seen);
            }
            seen.sort();
            assert_eq!(seen, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn empty_tree() {
        let tree = tree_of(Vec::new(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(tree.search(&1.0, 5).is_empty());
        assert!(tree.nearest_neighbor(&1.0).is_none());
        assert_eq!(tree.dump(), "");
    }

    #[test]
    fn single_item() {
        let tree = tree_of(vec![3.0], 0);
        let res = tree.search(&3.0, 4);
        assert_eq!(res.len(), 1);
        assert_eq!(*res[0].item, 3.0);
        assert_eq!(res[0].distance, 0.0);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn identical_items() {
        let tree = tree_of(vec![2.5; 17], 3);
        let res = tree.search(&2.5, 5);
        assert_eq!(res.len(), 5);
        assert!(res.iter().all(|n| n.distance == 0.0));

        let res = tree.search(&0.5, 100);
        assert_eq!(res.len(), 17);
        assert!(res.iter().all(|n| n.distance == 2.0));
    }

    #[test]
    fn zero_k_is_empty() {
        let tree = tree_of((0..10).map(|x| x as f64).collect(), 1);
        let (res, stats) = tree.search_with_stats(&4.0, 0);
        assert!(res.is_empty());
        assert_eq!(stats.visited, 0);
    }

    #[test]
    fn large_k_returns_everything_sorted() {
        let tree = tree_of((0..20).map(|x| x as f64).collect(), 9);
        let res = tree.search(&7.2, 50);
        assert_eq!(res.len(), 20);
        for pair in res.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        assert_eq!(*res[0].item, 7.0);
        assert_eq!(*res[19].item, 19.0);
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let items: Vec<f64> = (0..100).map(|x| (x as f64).sqrt()).collect();
        let a = tree_of(items.clone(), 42);
        let b = tree_of(items, 42);
        assert_eq!(a.items(), b.items());
        assert_eq!(a.dump(), b.dump());
    }

    #[test]
    fn pruning_skips_nodes() {
        let tree = tree_of((0..1000).map(|x| x as f64).collect(), 5);
        let (res, stats) = tree.search_with_stats(&500.0, 1);
        assert_eq!(*res[0].item, 500.0);
        assert!(stats.visited < tree.len());
    }

    #[test]
    fn median_split_is_balanced() {
        let tree = tree_of((0..4096).map(|x| x as f64).collect(), 11);
        // Depth depends only on range sizes: 13 levels for 4096 items.
        assert_eq!(tree.depth(), 13);
    }

    #[test]
    fn dump_lists_every_item() {
        let tree = tree_of(vec![1.0, 2.0, 3.0], 0);
        assert_eq!(tree.dump().lines().count(), 3);
    }
}
