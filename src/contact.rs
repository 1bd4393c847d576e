//! All-pairs proximity scan.
//!
//! Every unordered pair `(i, j)` with `i < j` is visited once per tick, in increasing
//! lexicographic order, and the pairs within the proximity threshold are handed to the caller.
//! The scan is quadratic in the population size.
//!
//! Contact depends only on locations, and locations only change in the movement phase, so the
//! contact set of a tick is fixed before any status changes. The scan therefore takes a snapshot
//! of the locations and the caller is free to mutate agents from the callback; every mutation is
//! visible to the pairs handled after it. With the `parallel` feature the snapshot is searched on
//! the rayon thread pool and the pairs are then replayed in the same canonical order.
use crate::geometry::{distance, Location};

/// Returns whether two locations are close enough to count as a contact.
#[must_use]
pub fn in_contact(a: Location, b: Location, threshold: f64) -> bool {
    distance(a, b) <= threshold
}

/// Calls `on_contact(i, j)` for every contacting pair, in `(i, j)` order.
pub fn for_each_contact<F>(locations: &[Location], threshold: f64, mut on_contact: F)
where
    F: FnMut(usize, usize),
{
    #[cfg(feature = "parallel")]
    {
        for (i, j) in contacts(locations, threshold) {
            on_contact(i, j);
        }
    }

    #[cfg(not(feature = "parallel"))]
    {
        for (i, &a) in locations.iter().enumerate() {
            for (offset, &b) in locations[i + 1..].iter().enumerate() {
                if in_contact(a, b, threshold) {
                    on_contact(i, i + 1 + offset);
                }
            }
        }
    }
}

/// Collects every contacting pair in `(i, j)` order.
#[cfg(not(feature = "parallel"))]
#[must_use]
pub fn contacts(locations: &[Location], threshold: f64) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for_each_contact(locations, threshold, |i, j| pairs.push((i, j)));
    pairs
}

/// Collects every contacting pair in `(i, j)` order.
#[cfg(feature = "parallel")]
#[must_use]
pub fn contacts(locations: &[Location], threshold: f64) -> Vec<(usize, usize)> {
    use rayon::prelude::*;

    // Indexed collection keeps the rows in `i` order.
    locations
        .par_iter()
        .enumerate()
        .map(|(i, &a)| {
            locations[i + 1..]
                .iter()
                .enumerate()
                .filter(|&(_, &b)| in_contact(a, b, threshold))
                .map(|(offset, _)| (i, i + 1 + offset))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
