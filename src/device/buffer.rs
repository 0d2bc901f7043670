use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How kernels may use a buffer. Host transfers are allowed either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAccess {
    ReadOnly,
    ReadWrite,
}

/// Memory owned by a [`super::HostDevice`].
///
/// Dropping the buffer returns its bytes to the device's allocation budget.
#[derive(Debug)]
pub struct DeviceBuffer<T> {
    pub(super) data: Vec<T>,
    access: MemAccess,
    bytes: usize,
    ledger: Arc<AtomicUsize>,
}

impl<T> DeviceBuffer<T> {
    pub(super) fn new(data: Vec<T>, access: MemAccess, bytes: usize, ledger: Arc<AtomicUsize>) -> Self {
        Self {
            data,
            access,
            bytes,
            ledger,
        }
    }

    /// Capacity in elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn access(&self) -> MemAccess {
        self.access
    }
}

impl<T> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        self.ledger.fetch_sub(self.bytes, Ordering::AcqRel);
    }
}
