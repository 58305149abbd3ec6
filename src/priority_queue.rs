//! Binary max-heap with owner-supplied ordering and heap-position tracking.
//!
//! Unlike `std::collections::BinaryHeap`, the ordering lives outside the items:
//! every mutating call receives a [`HeapOrder`] that compares items and is told
//! where each item currently sits in the heap. Owners that store plain indices
//! in the queue can record those positions in their own node arrays and later
//! call [`PriorityQueue::reposition`] after changing a node's key, which gives
//! O(log n) decrease-key without searching the heap.

/// Ordering and index sink used by [`PriorityQueue`].
pub trait HeapOrder<T> {
    /// `true` when `lhs` must be popped before `rhs`.
    fn higher_than(&self, lhs: &T, rhs: &T) -> bool;

    /// Called whenever `item` lands at `heap_idx`.
    fn set_index(&mut self, _item: &T, _heap_idx: usize) {}
}

/// Order given by a closure, without position tracking.
pub struct FnOrder<F>(pub F);

impl<T, F> HeapOrder<T> for FnOrder<F>
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn higher_than(&self, lhs: &T, rhs: &T) -> bool {
        (self.0)(lhs, rhs)
    }
}

#[derive(Clone, Debug)]
pub struct PriorityQueue<T> {
    heap: Vec<T>,
}

impl<T> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self { heap: Vec::new() }
    }
}

impl<T> PriorityQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Highest item under the order used so far.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.heap.first()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Items in heap order (not sorted).
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.heap.iter()
    }

    /// Mutate every item in place and rebuild the heap.
    pub fn retain_mut<O, F>(&mut self, order: &mut O, mut keep: F)
    where
        O: HeapOrder<T>,
        F: FnMut(&mut T) -> bool,
    {
        self.heap.retain_mut(|item| keep(item));
        for idx in 0..self.heap.len() {
            order.set_index(&self.heap[idx], idx);
        }
        for idx in (0..self.heap.len() / 2).rev() {
            self.sift_down(idx, order);
        }
    }

    pub fn push<O: HeapOrder<T>>(&mut self, item: T, order: &mut O) {
        let idx = self.heap.len();
        self.heap.push(item);
        order.set_index(&self.heap[idx], idx);
        self.sift_up(idx, order);
    }

    pub fn pop<O: HeapOrder<T>>(&mut self, order: &mut O) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let top = self.heap.pop();
        if !self.heap.is_empty() {
            order.set_index(&self.heap[0], 0);
            self.sift_down(0, order);
        }
        top
    }

    /// Restore the heap property after the key of the item at `heap_idx`
    /// changed in either direction.
    pub fn reposition<O: HeapOrder<T>>(&mut self, heap_idx: usize, order: &mut O) {
        if heap_idx >= self.heap.len() {
            return;
        }
        let idx = self.sift_up(heap_idx, order);
        if idx == heap_idx {
            self.sift_down(idx, order);
        }
    }

    fn sift_up<O: HeapOrder<T>>(&mut self, mut idx: usize, order: &mut O) -> usize {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !order.higher_than(&self.heap[idx], &self.heap[parent]) {
                break;
            }
            self.heap.swap(idx, parent);
            order.set_index(&self.heap[idx], idx);
            order.set_index(&self.heap[parent], parent);
            idx = parent;
        }
        idx
    }

    fn sift_down<O: HeapOrder<T>>(&mut self, mut idx: usize, order: &mut O) {
        let len = self.heap.len();
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut best = left;
            if right < len && order.higher_than(&self.heap[right], &self.heap[left]) {
                best = right;
            }
            if !order.higher_than(&self.heap[best], &self.heap[idx]) {
                break;
            }
            self.heap.swap(idx, best);
            order.set_index(&self.heap[idx], idx);
            order.set_index(&self.heap[best], best);
            idx = best;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Keys live outside the queue; the queue stores key indices.
    struct KeyOrder {
        keys: Vec<i32>,
        positions: Vec<usize>,
    }

    impl HeapOrder<usize> for KeyOrder {
        fn higher_than(&self, lhs: &usize, rhs: &usize) -> bool {
            self.keys[*lhs] > self.keys[*rhs]
        }

        fn set_index(&mut self, item: &usize, heap_idx: usize) {
            self.positions[*item] = heap_idx;
        }
    }

    fn lcg(seed: &mut u64) -> u64 {
        *seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        *seed >> 33
    }

    #[test]
    fn front_is_always_maximum() {
        let mut order = FnOrder(|a: &i32, b: &i32| a > b);
        let mut queue = PriorityQueue::new();
        let mut mirror: Vec<i32> = Vec::new();
        let mut seed = 7u64;
        let mut pushes = 0usize;
        let mut pops = 0usize;
        for step in 0..500 {
            if step % 3 == 2 && !queue.is_empty() {
                let top = queue.pop(&mut order).unwrap();
                let max_pos = mirror
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, v)| **v)
                    .map(|(i, _)| i)
                    .unwrap();
                assert_eq!(top, mirror.swap_remove(max_pos));
                pops += 1;
            } else {
                let v = (lcg(&mut seed) % 1000) as i32;
                queue.push(v, &mut order);
                mirror.push(v);
                pushes += 1;
            }
            assert_eq!(queue.len(), pushes - pops);
            assert_eq!(queue.front().copied(), mirror.iter().copied().max());
        }
    }

    #[test]
    fn reposition_after_key_change() {
        let n = 64;
        let mut order = KeyOrder {
            keys: (0..n as i32).map(|i| (i * 37) % 101).collect(),
            positions: vec![usize::MAX; n],
        };
        let mut queue = PriorityQueue::new();
        for i in 0..n {
            queue.push(i, &mut order);
        }
        let mut seed = 11u64;
        for _ in 0..200 {
            let item = (lcg(&mut seed) % n as u64) as usize;
            order.keys[item] = (lcg(&mut seed) % 500) as i32 - 250;
            let pos = order.positions[item];
            assert_eq!(queue.iter().nth(pos), Some(&item));
            queue.reposition(pos, &mut order);
            let max_key = order.keys.iter().copied().max().unwrap();
            let front = *queue.front().unwrap();
            assert_eq!(order.keys[front], max_key);
        }
        let mut last = i32::MAX;
        while let Some(item) = queue.pop(&mut order) {
            assert!(order.keys[item] <= last);
            last = order.keys[item];
        }
        assert!(queue.is_empty());
        assert!(queue.pop(&mut order).is_none());
    }

    #[test]
    fn retain_rebuilds_heap() {
        let mut order = FnOrder(|a: &u32, b: &u32| a > b);
        let mut queue = PriorityQueue::new();
        for v in [5u32, 1, 9, 3, 7, 2, 8] {
            queue.push(v, &mut order);
        }
        queue.retain_mut(&mut order, |v| *v % 2 == 1);
        let mut drained = Vec::new();
        while let Some(v) = queue.pop(&mut order) {
            drained.push(v);
        }
        assert_eq!(drained, vec![9, 7, 5, 3, 1]);
    }
}
