//! Sibling ordering for board collections.
//!
//! # Responsibility
//! - Reassign sequential `order` values after structural mutations.
//! - Compute same-container and cross-container move results.
//!
//! # Invariants
//! - Normalized siblings carry `order` values `0..len`, no gaps, no
//!   duplicates, matching array position.
//! - Same-container detection belongs to the caller; `reorder_across`
//!   assumes the two lists are distinct containers.
//! - Nothing here persists. Callers write back every entity in the
//!   affected lists.

/// Entity carrying a position among its container siblings.
pub trait OrderedEntity {
    /// Current position value.
    fn order(&self) -> i64;
    /// Overwrites the position value.
    fn set_order(&mut self, order: i64);
}

/// Reassigns each entity's `order` to its index in the sequence.
///
/// The input is expected to already reflect the desired final order
/// (spliced for insert/remove). Pure; the caller persists the result.
pub fn normalize<T: OrderedEntity>(mut items: Vec<T>) -> Vec<T> {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order(index as i64);
    }
    items
}

/// Moves the entity at `source_index` to `dest_index` within one container.
///
/// Removal happens first, so `dest_index` addresses the post-removal
/// sequence (standard move-element semantics). `dest_index` past the end
/// is clamped to the last position. Returns the input unchanged when
/// source and destination coincide.
pub fn reorder_within<T: OrderedEntity>(
    mut items: Vec<T>,
    source_index: usize,
    dest_index: usize,
) -> Vec<T> {
    let dest_index = dest_index.min(items.len().saturating_sub(1));
    if source_index == dest_index {
        return items;
    }
    let moved = items.remove(source_index);
    items.insert(dest_index, moved);
    normalize(items)
}

/// Moves the entity at `source_index` of `source` into `dest` at
/// `dest_index`, rekeying it to the destination container.
///
/// `rekey` updates the moved entity's parent-reference fields (stage/layer
/// pair, or column id). `dest_index` may equal `dest.len()` to append;
/// larger values clamp. Both resulting lists are normalized independently,
/// since `order` numbering is per container.
pub fn reorder_across<T: OrderedEntity>(
    mut source: Vec<T>,
    mut dest: Vec<T>,
    source_index: usize,
    dest_index: usize,
    rekey: impl FnOnce(&mut T),
) -> (Vec<T>, Vec<T>) {
    let mut moved = source.remove(source_index);
    rekey(&mut moved);
    let dest_index = dest_index.min(dest.len());
    dest.insert(dest_index, moved);
    (normalize(source), normalize(dest))
}
