//! Applying a ranking to a result list.

/// Reorder `items` so the entries named by `indices` come first.
///
/// Indices are taken in order; any that are out of range or repeat an
/// earlier index are skipped. Items not named keep their original relative
/// order after the ranked ones. The output is always a permutation of the
/// input.
pub fn reorder<T>(items: Vec<T>, indices: &[usize]) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());

    for &index in indices {
        if let Some(item) = slots.get_mut(index).and_then(Option::take) {
            ordered.push(item);
        }
    }

    ordered.extend(slots.into_iter().flatten());
    ordered
}

/// Reorder only the first `batch` items; the rest follow unchanged.
///
/// `indices` refer to positions inside the batch, so anything at or past
/// `batch` is ignored.
pub fn reorder_head<T>(mut items: Vec<T>, batch: usize, indices: &[usize]) -> Vec<T> {
    let split = batch.min(items.len());
    let tail = items.split_off(split);
    let mut head = reorder(items, indices);
    head.extend(tail);
    head
}
