//! A host-memory stand-in for an accelerator.
//!
//! [`HostDevice`] keeps buffers in its own allocations, so every byte the
//! benchmark touches has to be uploaded and downloaded explicitly, the way
//! it would be with a discrete device. Kernels run through a [`Backend`]
//! and return only after the update is complete.

pub mod buffer;

pub use buffer::{DeviceBuffer, MemAccess};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use num_complex::Complex;
use tracing::debug;

use crate::element::HerkReal;
use crate::error::DeviceError;
use crate::kernels::{Backend, HerkArgs};
use crate::layout::Operand;

#[derive(Debug)]
pub struct HostDevice {
    backend: Backend,
    max_alloc_bytes: Option<usize>,
    allocated: Arc<AtomicUsize>,
}

impl Default for HostDevice {
    fn default() -> Self {
        Self::new(Backend::default())
    }
}

impl HostDevice {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            max_alloc_bytes: None,
            allocated: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Cap the total bytes that may be allocated at once.
    pub fn with_memory_limit(mut self, bytes: usize) -> Self {
        self.max_alloc_bytes = Some(bytes);
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Bytes currently held by live buffers.
    pub fn allocated_bytes(&self) -> usize {
        self.allocated.load(Ordering::Acquire)
    }

    /// Fail with `OutOfResources` if `bytes` more would not fit under the memory limit.
    /// Nothing is reserved.
    pub fn ensure_available(&self, bytes: usize) -> Result<(), DeviceError> {
        let Some(limit) = self.max_alloc_bytes else {
            return Ok(());
        };
        let held = self.allocated_bytes();
        if held.saturating_add(bytes) > limit {
            return Err(DeviceError::OutOfResources {
                requested: bytes,
                available: limit.saturating_sub(held),
            });
        }
        Ok(())
    }

    /// Allocate a zero-filled buffer of `len` elements.
    pub fn alloc<T: Copy + Default>(&self, len: usize, access: MemAccess) -> Result<DeviceBuffer<T>, DeviceError> {
        if len == 0 {
            return Err(DeviceError::InvalidArgument("buffer size must be non-zero".to_string()));
        }
        let bytes = len
            .checked_mul(size_of::<T>())
            .ok_or_else(|| DeviceError::InvalidArgument(format!("buffer of {} elements overflows", len)))?;

        // reserve first so concurrent allocations cannot both pass the limit
        let before = self.allocated.fetch_add(bytes, Ordering::AcqRel);
        if let Some(limit) = self.max_alloc_bytes {
            if before.saturating_add(bytes) > limit {
                self.allocated.fetch_sub(bytes, Ordering::AcqRel);
                return Err(DeviceError::OutOfResources {
                    requested: bytes,
                    available: limit.saturating_sub(before),
                });
            }
        }

        debug!("Allocated {:?} buffer: {} elements, {} bytes", access, len, bytes);
        Ok(DeviceBuffer::new(
            vec![T::default(); len],
            access,
            bytes,
            Arc::clone(&self.allocated),
        ))
    }

    /// Blocking copy of `src` into `buf` starting at element `offset`.
    pub fn write<T: Copy>(&self, buf: &mut DeviceBuffer<T>, offset: usize, src: &[T]) -> Result<(), DeviceError> {
        let range = checked_range(offset, src.len(), buf.len())?;
        buf.data[range].copy_from_slice(src);
        Ok(())
    }

    /// Blocking copy from `buf` starting at element `offset` into `dst`.
    pub fn read<T: Copy>(&self, buf: &DeviceBuffer<T>, offset: usize, dst: &mut [T]) -> Result<(), DeviceError> {
        let range = checked_range(offset, dst.len(), buf.len())?;
        dst.copy_from_slice(&buf.data[range]);
        Ok(())
    }

    /// Run herk and wait for it to finish.
    pub fn herk<R: HerkReal>(
        &self,
        args: &HerkArgs<R>,
        a: &DeviceBuffer<Complex<R>>,
        c: &mut DeviceBuffer<Complex<R>>,
    ) -> Result<(), DeviceError> {
        if c.access() == MemAccess::ReadOnly {
            return Err(DeviceError::ReadOnlyBuffer { operand: Operand::C });
        }
        args.validate(a.len(), c.len())?;

        self.backend.herk(args, &a.data, &mut c.data);
        Ok(())
    }
}

fn checked_range(offset: usize, len: usize, capacity: usize) -> Result<std::ops::Range<usize>, DeviceError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(offset..end),
        _ => Err(DeviceError::OutOfBounds {
            offset,
            len,
            capacity,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_buffer_returns_its_bytes() {
        let device = HostDevice::new(Backend::Naive);
        let buf = device.alloc::<Complex<f32>>(16, MemAccess::ReadWrite).unwrap();
        assert_eq!(device.allocated_bytes(), 16 * 8);
        drop(buf);
        assert_eq!(device.allocated_bytes(), 0);
    }

    #[test]
    fn memory_limit_rejects_oversized_allocation() {
        let device = HostDevice::new(Backend::Naive).with_memory_limit(100);
        let _held = device.alloc::<Complex<f64>>(4, MemAccess::ReadOnly).unwrap();

        match device.alloc::<Complex<f64>>(4, MemAccess::ReadWrite) {
            Err(DeviceError::OutOfResources { requested, available }) => {
                assert_eq!(requested, 64);
                assert_eq!(available, 36);
            }
            other => panic!("expected OutOfResources, got {:?}", other),
        }
        assert_eq!(device.allocated_bytes(), 64);
    }

    #[test]
    fn ensure_available_checks_without_reserving() {
        let device = HostDevice::new(Backend::Naive).with_memory_limit(100);
        let _held = device.alloc::<Complex<f64>>(4, MemAccess::ReadOnly).unwrap();

        assert!(device.ensure_available(36).is_ok());
        assert!(matches!(
            device.ensure_available(37),
            Err(DeviceError::OutOfResources { requested: 37, available: 36 })
        ));
        assert_eq!(device.allocated_bytes(), 64);
        assert!(HostDevice::new(Backend::Naive).ensure_available(usize::MAX).is_ok());
    }

    #[test]
    fn zero_length_allocation_is_rejected() {
        let device = HostDevice::new(Backend::Naive);
        assert!(matches!(
            device.alloc::<f32>(0, MemAccess::ReadWrite),
            Err(DeviceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn transfers_respect_offset_and_capacity() {
        let device = HostDevice::new(Backend::Naive);
        let mut buf = device.alloc::<f32>(6, MemAccess::ReadWrite).unwrap();

        device.write(&mut buf, 2, &[1.0, 2.0, 3.0]).unwrap();
        let mut out = [0.0f32; 4];
        device.read(&buf, 1, &mut out).unwrap();
        assert_eq!(out, [0.0, 1.0, 2.0, 3.0]);

        assert!(matches!(
            device.write(&mut buf, 4, &[1.0, 2.0, 3.0]),
            Err(DeviceError::OutOfBounds { offset: 4, len: 3, capacity: 6 })
        ));
    }

    #[test]
    fn herk_refuses_read_only_output() {
        let device = HostDevice::new(Backend::Naive);
        let a = device.alloc::<Complex<f32>>(4, MemAccess::ReadOnly).unwrap();
        let mut c = device.alloc::<Complex<f32>>(4, MemAccess::ReadOnly).unwrap();
        let args = HerkArgs {
            order: crate::layout::Order::ColumnMajor,
            uplo: crate::layout::Uplo::Upper,
            trans_a: crate::layout::Transpose::NoTrans,
            n: 2,
            k: 2,
            alpha: 1.0f32,
            beta: 0.0,
            offa: 0,
            lda: 2,
            offc: 0,
            ldc: 2,
        };
        assert!(matches!(
            device.herk(&args, &a, &mut c),
            Err(DeviceError::ReadOnlyBuffer { operand: Operand::C })
        ));
    }
}
