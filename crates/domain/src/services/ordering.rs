//! Contiguous ordering for album sessions and album images.
//!
//! Stored orders always form the sequence 1..N. Writers compute the target
//! sequence here and persist it inside one transaction.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderingError {
    #[error("Item {0} does not belong to this album")]
    UnknownItem(Uuid),

    #[error("Item {0} appears more than once")]
    DuplicateItem(Uuid),

    #[error("Position must be at least 1, got {0}")]
    InvalidPosition(i32),
}

/// An item and its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub id: Uuid,
    pub order: i32,
}

impl Placement {
    pub fn new(id: Uuid, order: i32) -> Self {
        Self { id, order }
    }
}

/// Position of an item appended to a list of `len` items.
pub fn append_position(len: usize) -> i32 {
    i32::try_from(len).unwrap_or(i32::MAX - 1) + 1
}

/// Position for an insert at `requested`, clamped to the end of the list.
pub fn insert_position(requested: i32, len: usize) -> Result<i32, OrderingError> {
    if requested < 1 {
        return Err(OrderingError::InvalidPosition(requested));
    }
    Ok(requested.min(append_position(len)))
}

/// Renumbers items to 1..N keeping their relative order. Ties keep input order.
pub fn renumber(items: &[Placement]) -> Vec<Placement> {
    let mut sorted: Vec<(usize, Placement)> = items.iter().copied().enumerate().collect();
    sorted.sort_by_key(|(idx, p)| (p.order, *idx));
    sorted
        .into_iter()
        .enumerate()
        .map(|(pos, (_, p))| Placement::new(p.id, append_position(pos)))
        .collect()
}

/// True when `orders` is exactly {1..N}.
pub fn is_contiguous(orders: &[i32]) -> bool {
    let mut sorted = orders.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(idx, order)| *order == append_position(idx))
}

/// Computes the new 1..N sequence for a reorder request.
///
/// `current` is the stored list; `requested` may name any subset of it.
/// Requested positions are relative: items are sorted by their requested
/// position (or current one when not named), requested items win ties, and
/// the result is renumbered.
pub fn plan_reorder(
    current: &[Placement],
    requested: &[Placement],
) -> Result<Vec<Placement>, OrderingError> {
    let known: HashSet<Uuid> = current.iter().map(|p| p.id).collect();
    let mut wanted: HashMap<Uuid, i32> = HashMap::with_capacity(requested.len());

    for p in requested {
        if !known.contains(&p.id) {
            return Err(OrderingError::UnknownItem(p.id));
        }
        if wanted.insert(p.id, p.order).is_some() {
            return Err(OrderingError::DuplicateItem(p.id));
        }
    }

    let mut keyed: Vec<(i32, u8, i32, Uuid)> = current
        .iter()
        .map(|p| match wanted.get(&p.id) {
            Some(order) => (*order, 0, p.order, p.id),
            None => (p.order, 1, p.order, p.id),
        })
        .collect();
    keyed.sort();

    Ok(keyed
        .into_iter()
        .enumerate()
        .map(|(pos, (_, _, _, id))| Placement::new(id, append_position(pos)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn placed(ids: &[Uuid]) -> Vec<Placement> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| Placement::new(*id, append_position(i)))
            .collect()
    }

    fn order_of(plan: &[Placement]) -> Vec<Uuid> {
        plan.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_append_and_insert_positions() {
        assert_eq!(append_position(0), 1);
        assert_eq!(append_position(3), 4);
        assert_eq!(insert_position(2, 3), Ok(2));
        assert_eq!(insert_position(10, 3), Ok(4));
        assert_eq!(insert_position(0, 3), Err(OrderingError::InvalidPosition(0)));
    }

    #[test]
    fn test_renumber_closes_gaps() {
        let ids = ids(3);
        let items = vec![
            Placement::new(ids[0], 5),
            Placement::new(ids[1], 2),
            Placement::new(ids[2], 9),
        ];
        let result = renumber(&items);
        assert_eq!(order_of(&result), vec![ids[1], ids[0], ids[2]]);
        assert!(is_contiguous(&result.iter().map(|p| p.order).collect::<Vec<_>>()));
    }

    #[test]
    fn test_is_contiguous() {
        assert!(is_contiguous(&[]));
        assert!(is_contiguous(&[2, 1, 3]));
        assert!(!is_contiguous(&[1, 3]));
        assert!(!is_contiguous(&[1, 1, 2]));
        assert!(!is_contiguous(&[0, 1]));
    }

    #[test]
    fn test_full_reorder() {
        let ids = ids(3);
        let current = placed(&ids);
        let requested = vec![
            Placement::new(ids[2], 1),
            Placement::new(ids[0], 2),
            Placement::new(ids[1], 3),
        ];
        let plan = plan_reorder(&current, &requested).unwrap();
        assert_eq!(order_of(&plan), vec![ids[2], ids[0], ids[1]]);
        assert_eq!(plan.iter().map(|p| p.order).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_sparse_positions_are_normalized() {
        let ids = ids(3);
        let current = placed(&ids);
        let requested = vec![
            Placement::new(ids[0], 30),
            Placement::new(ids[1], 10),
            Placement::new(ids[2], 20),
        ];
        let plan = plan_reorder(&current, &requested).unwrap();
        assert_eq!(order_of(&plan), vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_partial_reorder_moves_named_item_ahead_of_tie() {
        let ids = ids(4);
        let current = placed(&ids);
        // Move the last image to position 2.
        let plan = plan_reorder(&current, &[Placement::new(ids[3], 2)]).unwrap();
        assert_eq!(order_of(&plan), vec![ids[0], ids[3], ids[1], ids[2]]);
        assert!(is_contiguous(&plan.iter().map(|p| p.order).collect::<Vec<_>>()));
    }

    #[test]
    fn test_unknown_item_rejected() {
        let ids = ids(2);
        let stranger = Uuid::new_v4();
        let result = plan_reorder(&placed(&ids), &[Placement::new(stranger, 1)]);
        assert_eq!(result, Err(OrderingError::UnknownItem(stranger)));
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let ids = ids(2);
        let requested = vec![Placement::new(ids[0], 1), Placement::new(ids[0], 2)];
        let result = plan_reorder(&placed(&ids), &requested);
        assert_eq!(result, Err(OrderingError::DuplicateItem(ids[0])));
    }
}
