//! Extremal selection over candidate lists
//!
//! All selectors are pure: an empty candidate list yields `None` and ties
//! resolve to the earliest candidate, so repeated calls on an unchanged
//! list always agree.

use std::cmp::Reverse;

use ordered_float::OrderedFloat;

use super::{dist, Energetic, Located};

/// Candidate closest to `from`
pub fn nearest<T, I>(from: impl Located, list: I) -> Option<T>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    let from = from.position();
    list.into_iter()
        .min_by_key(|entity| OrderedFloat(dist(entity, from)))
}

/// Candidate farthest from `from`
pub fn farthest<T, I>(from: impl Located, list: I) -> Option<T>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    let from = from.position();
    list.into_iter()
        .min_by_key(|entity| Reverse(OrderedFloat(dist(entity, from))))
}

/// Candidate with the least energy
pub fn lowest_energy<T, I>(list: I) -> Option<T>
where
    T: Energetic,
    I: IntoIterator<Item = T>,
{
    list.into_iter()
        .min_by_key(|entity| OrderedFloat(entity.energy()))
}

/// Candidate with the most energy
pub fn highest_energy<T, I>(list: I) -> Option<T>
where
    T: Energetic,
    I: IntoIterator<Item = T>,
{
    list.into_iter()
        .min_by_key(|entity| Reverse(OrderedFloat(entity.energy())))
}
