//! Sorted union of two keyed maps

use std::collections::BTreeMap;
use std::iter::Peekable;

/// Where a key was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Presence<'a, V> {
    Left(&'a V),
    Right(&'a V),
    Both(&'a V, &'a V),
}

/// Walk the union of both key sets in ascending key order.
///
/// Both maps are already sorted, so this is a single merge pass.
pub(crate) fn union_by_key<'a, V>(
    left: &'a BTreeMap<String, V>,
    right: &'a BTreeMap<String, V>,
) -> UnionByKey<'a, V> {
    UnionByKey {
        left: left.iter().peekable(),
        right: right.iter().peekable(),
    }
}

pub(crate) struct UnionByKey<'a, V> {
    left: Peekable<std::collections::btree_map::Iter<'a, String, V>>,
    right: Peekable<std::collections::btree_map::Iter<'a, String, V>>,
}

impl<'a, V> Iterator for UnionByKey<'a, V> {
    type Item = (&'a str, Presence<'a, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let order = match (self.left.peek(), self.right.peek()) {
            (None, None) => return None,
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (Some((l, _)), Some((r, _))) => l.cmp(r),
        };

        match order {
            std::cmp::Ordering::Less => {
                let (key, value) = self.left.next()?;
                Some((key.as_str(), Presence::Left(value)))
            }
            std::cmp::Ordering::Greater => {
                let (key, value) = self.right.next()?;
                Some((key.as_str(), Presence::Right(value)))
            }
            std::cmp::Ordering::Equal => {
                let (key, l) = self.left.next()?;
                let (_, r) = self.right.next()?;
                Some((key.as_str(), Presence::Both(l, r)))
            }
        }
    }
}
