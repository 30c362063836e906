//! Batch-size-driven chunking for materializer writes (spec §4.7/§6
//! `import.node_batch` / `import.relationship_batch`), the same
//! commit-every-N-items idiom as the symbol store's write loop.

/// Splits `items` into chunks of at most `batch_size`, yielding one slice
/// per chunk. `batch_size` of 0 is treated as "everything in one batch" so
/// a misconfigured value can't spin this into an infinite loop.
pub fn chunks<T>(items: &[T], batch_size: usize) -> impl Iterator<Item = &[T]> {
    let size = if batch_size == 0 { items.len().max(1) } else { batch_size };
    items.chunks(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_requested_batch_size() {
        let items = [1, 2, 3, 4, 5];
        let batches: Vec<&[i32]> = chunks(&items, 2).collect();
        assert_eq!(batches, vec![&[1, 2][..], &[3, 4][..], &[5][..]]);
    }

    #[test]
    fn zero_batch_size_falls_back_to_one_batch() {
        let items = [1, 2, 3];
        let batches: Vec<&[i32]> = chunks(&items, 0).collect();
        assert_eq!(batches.len(), 1);
    }
}
