use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// An explicit allocation scope threaded through every TCAL entry point,
/// per spec §5 ("every API takes an allocator handle; do not rely on a
/// global heap").
///
/// Rust's global allocator and RAII already give us the memory-safety
/// properties the original C/C++ design used a custom allocator for, so
/// this type does not itself allocate memory: it is a lightweight,
/// cloneable handle that (a) preserves the spec's call-site shape
/// (`fn open_file(path, backend, molecule, alloc: &Allocator)`) and (b)
/// gives tests and callers a cheap way to distinguish scratch allocations
/// (freed before a call returns) from long-lived ones (owned by a frame
/// cache slot or façade for its whole lifetime) via [`Allocator::child`].
#[derive(Debug, Clone)]
pub struct Allocator {
    label: &'static str,
    bytes_in_use: Arc<AtomicI64>,
}

impl Allocator {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            bytes_in_use: Arc::new(AtomicI64::new(0)),
        }
    }

    /// A child scope that shares this allocator's accounting but carries
    /// its own label, e.g. `alloc.child("scratch-decode")`.
    pub fn child(&self, label: &'static str) -> Self {
        Self {
            label,
            bytes_in_use: self.bytes_in_use.clone(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn note_alloc(&self, bytes: usize) {
        self.bytes_in_use.fetch_add(bytes as i64, Ordering::Relaxed);
    }

    pub fn note_free(&self, bytes: usize) {
        self.bytes_in_use.fetch_sub(bytes as i64, Ordering::Relaxed);
    }

    pub fn bytes_in_use(&self) -> i64 {
        self.bytes_in_use.load(Ordering::Relaxed)
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_and_free_round_trip_to_zero() {
        let alloc = Allocator::new("test");
        alloc.note_alloc(128);
        assert_eq!(alloc.bytes_in_use(), 128);
        alloc.note_free(128);
        assert_eq!(alloc.bytes_in_use(), 0);
    }

    #[test]
    fn child_scope_shares_accounting_with_parent() {
        let parent = Allocator::new("parent");
        let child = parent.child("scratch");
        child.note_alloc(64);
        assert_eq!(parent.bytes_in_use(), 64);
        assert_eq!(child.label(), "scratch");
        assert_eq!(parent.label(), "parent");
    }
}
