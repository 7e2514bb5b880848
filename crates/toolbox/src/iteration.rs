use std::collections::HashSet;
use std::hash::Hash;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::error::{Result, ToolboxError};

/// Unique items in their original order.
pub fn unique<I>(items: I) -> impl Iterator<Item = I::Item>
where
    I: IntoIterator,
    I::Item: Hash + Eq + Clone,
{
    unique_by(items, |item| item.clone())
}

/// Items whose `key` has not been seen before, in their original order.
pub fn unique_by<I, K, F>(items: I, mut key: F) -> impl Iterator<Item = I::Item>
where
    I: IntoIterator,
    K: Hash + Eq,
    F: FnMut(&I::Item) -> K,
{
    let mut seen = HashSet::new();
    items.into_iter().filter(move |item| seen.insert(key(item)))
}

/// Fixed-size batches; the last one may be smaller.
pub struct Batches<I> {
    items: I,
    size: usize,
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let batch: Vec<_> = self.items.by_ref().take(self.size).collect();
        (!batch.is_empty()).then_some(batch)
    }
}

pub fn batches<I: IntoIterator>(items: I, size: usize) -> Result<Batches<I::IntoIter>> {
    if size == 0 {
        return Err(ToolboxError::InvalidArgument(
            "batch size must be positive".to_string(),
        ));
    }
    Ok(Batches {
        items: items.into_iter(),
        size,
    })
}

/// An iterator carrying a declared length, for consumers that want one up front.
pub struct SizedIter<I> {
    items: I,
    remaining: usize,
}

impl<I> SizedIter<I> {
    pub fn new(items: impl IntoIterator<IntoIter = I>, len: usize) -> Self {
        Self {
            items: items.into_iter(),
            remaining: len,
        }
    }
}

impl<I: Iterator> Iterator for SizedIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<I: Iterator> ExactSizeIterator for SizedIter<I> {}

/// A uniform sample of at most `size` items, taken in a single pass.
/// The order of the sample is unspecified.
pub fn random_sample<I: IntoIterator>(items: I, size: usize, seed: Option<u64>) -> Vec<I::Item> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let items = items.into_iter();
    let mut sample = Vec::with_capacity(size.min(items.size_hint().0));
    for (i, item) in items.enumerate() {
        if i < size {
            sample.push(item);
        } else {
            let j = rng.gen_range(0..=i);
            if j < size {
                sample[j] = item;
            }
        }
    }
    sample
}

/// Apply `f` to each item, retrying failed calls up to `tries` times in total.
///
/// When every try fails, `default` is yielded if given, otherwise the last error.
pub fn map_with_retry<I, T, S, E, F>(
    items: I,
    tries: usize,
    default: Option<S>,
    f: F,
) -> Result<impl Iterator<Item = Result<S, E>>>
where
    I: IntoIterator<Item = T>,
    S: Clone,
    E: std::fmt::Display,
    F: FnMut(&T) -> Result<S, E>,
{
    if tries == 0 {
        return Err(ToolboxError::InvalidArgument(
            "tries must be positive".to_string(),
        ));
    }
    let mut f = f;
    Ok(items.into_iter().map(move |item| {
        let mut attempt = 1;
        loop {
            match f(&item) {
                Ok(value) => return Ok(value),
                Err(err) if attempt < tries => {
                    warn!(attempt, tries, error = %err, "retrying");
                    attempt += 1;
                }
                Err(err) => {
                    return match &default {
                        Some(value) => Ok(value.clone()),
                        None => Err(err),
                    };
                }
            }
        }
    }))
}

/// Fold with `f`, starting from the first item. `default` is returned only
/// for an empty input and never takes part in the fold.
pub fn reduce_with_default<I, F>(items: I, default: I::Item, f: F) -> I::Item
where
    I: IntoIterator,
    F: FnMut(I::Item, I::Item) -> I::Item,
{
    items.into_iter().reduce(f).unwrap_or(default)
}

/// The one and only item.
pub fn get_single<I: IntoIterator>(items: I) -> Result<I::Item> {
    let mut it = items.into_iter();
    let first = it
        .next()
        .ok_or(ToolboxError::NotSingle { found: "none" })?;
    if it.next().is_some() {
        return Err(ToolboxError::NotSingle {
            found: "more than one",
        });
    }
    Ok(first)
}
