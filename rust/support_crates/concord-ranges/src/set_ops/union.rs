use std::{cmp::Reverse, collections::BinaryHeap};

/// Creates an iterator over the set-union of any number of ordered
/// (ascending) streams.
///
/// The produced iterator:
/// * Yields items in ascending order.
/// * Never yields the same item twice, whether the duplicate comes from two
///   different inputs or from repeats within one input.
/// * Holds one pending item per input in a binary heap.
///
/// Complexity: O(n log k) for n items over k inputs.
///
/// A union of zero streams is empty.
pub fn union_all<T, S, I>(streams: S) -> UnionAll<I::IntoIter, T>
where
    T: Ord + Clone,
    S: IntoIterator<Item = I>,
    I: IntoIterator<Item = T>,
{
    UnionAll::new(streams.into_iter().map(IntoIterator::into_iter).collect())
}

/// Iterator adapter implementing [`union_all`].
pub struct UnionAll<I, T>
where
    I: Iterator<Item = T>,
{
    inputs: Vec<I>,
    /// Smallest pending item of every non-exhausted input, tagged with the
    /// input index.
    heap: BinaryHeap<Reverse<(T, usize)>>,
    last: Option<T>,
}

impl<I, T> UnionAll<I, T>
where
    I: Iterator<Item = T>,
    T: Ord + Clone,
{
    pub fn new(mut inputs: Vec<I>) -> Self {
        let mut heap = BinaryHeap::with_capacity(inputs.len());
        for (idx, input) in inputs.iter_mut().enumerate() {
            if let Some(item) = input.next() {
                heap.push(Reverse((item, idx)));
            }
        }
        UnionAll {
            inputs,
            heap,
            last: None,
        }
    }
}

impl<I, T> Iterator for UnionAll<I, T>
where
    I: Iterator<Item = T>,
    T: Ord + Clone,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(Reverse((item, idx))) = self.heap.pop() {
            if let Some(next) = self.inputs[idx].next() {
                self.heap.push(Reverse((next, idx)));
            }
            if self.last.as_ref() == Some(&item) {
                continue;
            }
            self.last = Some(item.clone());
            return Some(item);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::from(!self.heap.is_empty()), None)
    }
}
