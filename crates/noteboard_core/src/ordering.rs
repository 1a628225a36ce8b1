//! Sibling ordering and reorder reconciliation helpers.
//!
//! # Responsibility
//! - Compute the post-drag sibling sequence (remove then reinsert).
//! - Assign and normalize explicit `order` values.
//! - Detect observable note field changes for the remote diff path.
//!
//! # Invariants
//! - A reorder with equal source and target index is a no-op.
//! - Removing a dragged item and reinserting it preserves the relative
//!   order of all remaining siblings.
//! - Assigned `order` values are the dense sequence 0..n-1.

use crate::model::board::{Note, NoteBlock};

/// Sorts indices of a sibling list by `order`, stable on ties so insertion
/// order decides between equal values.
fn sorted_indices(orders: &[i64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..orders.len()).collect();
    indices.sort_by_key(|&index| orders[index]);
    indices
}

/// Returns blocks sorted into display order without mutating the input.
pub fn sorted_blocks(blocks: &[NoteBlock]) -> Vec<NoteBlock> {
    let orders: Vec<i64> = blocks.iter().map(|block| block.order).collect();
    sorted_indices(&orders)
        .into_iter()
        .map(|index| blocks[index].clone())
        .collect()
}

/// Returns notes sorted into display order without mutating the input.
pub fn sorted_notes(notes: &[Note]) -> Vec<Note> {
    let orders: Vec<i64> = notes.iter().map(|note| note.order).collect();
    sorted_indices(&orders)
        .into_iter()
        .map(|index| notes[index].clone())
        .collect()
}

/// Computes the post-drag permutation: the element at `from` is removed and
/// reinserted at `to`. Returns item indices in final position order, or
/// `None` when the drag is a no-op (same index) or out of range.
pub fn apply_reorder(len: usize, from: usize, to: usize) -> Option<Vec<usize>> {
    if from >= len || to >= len || from == to {
        return None;
    }
    let mut sequence: Vec<usize> = (0..len).collect();
    let moved = sequence.remove(from);
    sequence.insert(to, moved);
    Some(sequence)
}

/// Stamps dense 0..n-1 `order` values onto blocks in slice order.
pub fn assign_block_orders(blocks: &mut [NoteBlock]) {
    for (index, block) in blocks.iter_mut().enumerate() {
        block.order = index as i64;
    }
}

/// Stamps dense 0..n-1 `order` values onto notes in slice order.
pub fn assign_note_orders(notes: &mut [Note]) {
    for (index, note) in notes.iter_mut().enumerate() {
        note.order = index as i64;
    }
}

/// Normalizes a board loaded from a legacy document: sorts siblings into
/// display order (array position is the fallback for absent `order`) and
/// rewrites dense explicit values. Returns true when anything changed.
pub fn normalize_board_orders(blocks: &mut Vec<NoteBlock>) -> bool {
    let mut changed = false;

    let sorted = sorted_blocks(blocks);
    if sorted.iter().map(|b| &b.id).ne(blocks.iter().map(|b| &b.id)) {
        changed = true;
    }
    *blocks = sorted;

    for (index, block) in blocks.iter_mut().enumerate() {
        if block.order != index as i64 {
            block.order = index as i64;
            changed = true;
        }
        let sorted = sorted_notes(&block.notes);
        if sorted
            .iter()
            .map(|n| &n.id)
            .ne(block.notes.iter().map(|n| &n.id))
        {
            changed = true;
        }
        block.notes = sorted;
        for (note_index, note) in block.notes.iter_mut().enumerate() {
            if note.order != note_index as i64 {
                note.order = note_index as i64;
                changed = true;
            }
        }
    }

    changed
}

/// Reports whether the observable note fields differ between two versions.
///
/// Compares `priority`, `head`, `note` and `completed`; `order` is tracked
/// separately by the reorder path.
pub fn note_fields_changed(prev: &Note, next: &Note) -> bool {
    prev.priority != next.priority
        || prev.head != next.head
        || prev.note != next.note
        || prev.metadata.completed != next.metadata.completed
}
