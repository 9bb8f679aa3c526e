use std::iter::Peekable;

/// Creates an iterator over the set-intersection of any number of ordered
/// (strictly ascending) streams, by exact item equality.
///
/// The produced iterator:
/// * Yields only items present in EVERY input.
/// * Yields items in ascending order, without duplicates.
/// * Leapfrogs: each round raises every input to the largest pending item,
///   so inputs are consumed in a single pass.
///
/// The intersection of zero streams is empty (there is no universe to
/// intersect against).
///
/// Complexity: O(total items) comparisons; one look-ahead item per input.
pub fn intersect_all<T, S, I>(streams: S) -> IntersectAll<I::IntoIter, T>
where
    T: Ord + Clone,
    S: IntoIterator<Item = I>,
    I: IntoIterator<Item = T>,
{
    IntersectAll::new(streams.into_iter().map(IntoIterator::into_iter).collect())
}

/// Iterator adapter implementing [`intersect_all`].
pub struct IntersectAll<I, T>
where
    I: Iterator<Item = T>,
{
    inputs: Vec<Peekable<I>>,
}

impl<I, T> IntersectAll<I, T>
where
    I: Iterator<Item = T>,
    T: Ord + Clone,
{
    pub fn new(inputs: Vec<I>) -> Self {
        IntersectAll {
            inputs: inputs.into_iter().map(Iterator::peekable).collect(),
        }
    }
}

impl<I, T> Iterator for IntersectAll<I, T>
where
    I: Iterator<Item = T>,
    T: Ord + Clone,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.inputs.is_empty() {
            return None;
        }

        let mut target = self.inputs[0].peek()?.clone();
        loop {
            let mut agreed = true;
            for input in self.inputs.iter_mut() {
                while let Some(item) = input.peek() {
                    if *item < target {
                        input.next();
                    } else {
                        break;
                    }
                }
                let head = input.peek()?;
                if *head > target {
                    target = head.clone();
                    agreed = false;
                }
            }
            if agreed {
                for input in self.inputs.iter_mut() {
                    input.next();
                }
                return Some(target);
            }
        }
    }
}
