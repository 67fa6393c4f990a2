use std::num::NonZeroUsize;

/// Indices kept when sampling `len` frames every `stride` frames: 0, every multiple of
/// `stride`, and always the last index, each at most once.
pub fn sample_indices(len: usize, stride: NonZeroUsize) -> Vec<usize> {
    let Some(last) = len.checked_sub(1) else {
        return Vec::new();
    };
    let mut indices: Vec<usize> = (0..len).step_by(stride.get()).collect();
    if indices.last() != Some(&last) {
        indices.push(last);
    }
    indices
}

/// Keep every `stride`-th frame plus the final one. Dropped frames are discarded, not
/// merged into the kept ones.
pub fn downsample<T>(frames: Vec<T>, stride: NonZeroUsize) -> Vec<T> {
    let mut keep = sample_indices(frames.len(), stride).into_iter().peekable();
    frames
        .into_iter()
        .enumerate()
        .filter_map(|(i, frame)| keep.next_if_eq(&i).map(|_| frame))
        .collect()
}
