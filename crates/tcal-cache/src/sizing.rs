/// Bytes a single decoded frame occupies, approximated as three `f32`
/// coordinate arrays (spec §3: `atom_count · 3 · 4`).
pub fn approx_frame_bytes(atom_count: usize) -> u64 {
    (atom_count as u64) * 3 * 4
}

/// `capacity = min(num_frames, available_bytes / approx_frame_bytes)`
/// (spec §3). Degenerate inputs (zero atoms, zero frames) clamp to zero
/// rather than dividing by zero.
pub fn capacity_for(num_frames: usize, atom_count: usize, available_bytes: u64) -> usize {
    if num_frames == 0 {
        return 0;
    }
    let frame_bytes = approx_frame_bytes(atom_count);
    if frame_bytes == 0 {
        return num_frames;
    }
    let by_memory = (available_bytes / frame_bytes) as usize;
    num_frames.min(by_memory).max(1).min(num_frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_bounded_by_num_frames() {
        // Plenty of memory, few frames: capped at num_frames.
        assert_eq!(capacity_for(3, 1000, 1024 * 1024 * 1024), 3);
    }

    #[test]
    fn capacity_is_bounded_by_memory() {
        let atom_count = 1_000_000;
        let frame_bytes = approx_frame_bytes(atom_count);
        let available = frame_bytes * 5;
        assert_eq!(capacity_for(1000, atom_count, available), 5);
    }

    #[test]
    fn zero_frames_yields_zero_capacity() {
        assert_eq!(capacity_for(0, 100, 1024), 0);
    }

    #[test]
    fn zero_atoms_does_not_divide_by_zero() {
        assert_eq!(capacity_for(10, 0, 1024), 10);
    }
}
