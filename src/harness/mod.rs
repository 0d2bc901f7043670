//! The herk benchmark client.
//!
//! [`HerkBench`] walks through the same steps for every iteration: resolve
//! the buffer layout, allocate host and device memory, fill the host copies
//! with reproducible pseudo-random data, upload, run the timed kernel and
//! download the result. The round-trip variant moves allocation and
//! transfers inside the timed region to measure their overhead.

pub mod runner;

pub use runner::{BenchReport, RunConfig, RunMode, run};

use num_complex::Complex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::device::{DeviceBuffer, HostDevice, MemAccess};
use crate::element::{FILL_SEED, HerkReal};
use crate::error::{BenchError, LayoutError};
use crate::kernels::{HerkArgs, flops};
use crate::layout::{MatrixLayoutSpec, Operand, Order, ResolvedLayout, Transpose, Uplo, resolve_a, resolve_c};
use crate::timer::StatisticalTimer;

/// What to do with a leading dimension smaller than the layout needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LeadingDimPolicy {
    /// Every undersized leading dimension aborts before anything is allocated.
    #[default]
    Strict,
    /// Undersized `ldc` is logged and replaced by `n`; undersized `lda` still aborts.
    Legacy,
}

/// Parameters of one herk benchmark run. Leading dimensions of 0 are auto-computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HerkParams {
    pub order: Order,
    pub uplo: Uplo,
    pub trans_a: Transpose,
    pub n: usize,
    pub k: usize,
    pub lda: usize,
    pub ldc: usize,
    pub offa: usize,
    pub offc: usize,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for HerkParams {
    fn default() -> Self {
        Self {
            order: Order::ColumnMajor,
            uplo: Uplo::Upper,
            trans_a: Transpose::NoTrans,
            n: 64,
            k: 64,
            lda: 0,
            ldc: 0,
            offa: 0,
            offc: 0,
            alpha: 1.0,
            beta: 0.0,
        }
    }
}

impl HerkParams {
    pub fn layout_spec(&self) -> MatrixLayoutSpec {
        MatrixLayoutSpec {
            order: self.order,
            trans_a: self.trans_a,
            n: self.n,
            k: self.k,
            lda: self.lda,
            ldc: self.ldc,
        }
    }

    pub fn herk_args<R: HerkReal>(&self, layout: &ResolvedLayout) -> HerkArgs<R> {
        HerkArgs {
            order: self.order,
            uplo: self.uplo,
            trans_a: self.trans_a,
            n: self.n,
            k: self.k,
            alpha: R::from_f64(self.alpha),
            beta: R::from_f64(self.beta),
            offa: self.offa,
            lda: layout.lda,
            offc: self.offc,
            ldc: layout.ldc,
        }
    }
}

/// Resolve both operands, applying `policy` to an undersized `ldc`.
pub fn resolve_with_policy(spec: &MatrixLayoutSpec, policy: LeadingDimPolicy) -> Result<ResolvedLayout, LayoutError> {
    let c = match resolve_c(spec) {
        Ok(c) => c,
        Err(err @ LayoutError::LeadingDimensionTooSmall { .. }) if policy == LeadingDimPolicy::Legacy => {
            warn!("{}; continuing with ldc = {}", err, spec.n);
            resolve_c(&spec.with_ldc(0))?
        }
        Err(err) => return Err(err),
    };
    let a = resolve_a(spec)?;

    Ok(ResolvedLayout {
        lda: a.leading_dim,
        ldc: c.leading_dim,
        a_vectors: a.vectors,
        c_vectors: c.vectors,
    })
}

struct HerkState<R: HerkReal> {
    args: HerkArgs<R>,
    layout: ResolvedLayout,
    host_a: Vec<Complex<R>>,
    host_c: Vec<Complex<R>>,
    dev_a: Option<DeviceBuffer<Complex<R>>>,
    dev_c: Option<DeviceBuffer<Complex<R>>>,
}

/// Benchmark driver for `cherk` (`R = f32`) or `zherk` (`R = f64`).
pub struct HerkBench<R: HerkReal> {
    device: HostDevice,
    timer: StatisticalTimer,
    policy: LeadingDimPolicy,
    dims: (usize, usize),
    state: Option<HerkState<R>>,
}

impl<R: HerkReal> HerkBench<R> {
    pub fn new(device: HostDevice) -> Self {
        Self {
            device,
            timer: StatisticalTimer::new(R::ROUTINE),
            policy: LeadingDimPolicy::default(),
            dims: (0, 0),
            state: None,
        }
    }

    pub fn with_policy(mut self, policy: LeadingDimPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: LeadingDimPolicy) {
        self.policy = policy;
    }

    pub fn device(&self) -> &HostDevice {
        &self.device
    }

    pub fn timer(&self) -> &StatisticalTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut StatisticalTimer {
        &mut self.timer
    }

    pub fn layout(&self) -> Option<ResolvedLayout> {
        self.state.as_ref().map(|s| s.layout)
    }

    pub fn args(&self) -> Option<HerkArgs<R>> {
        self.state.as_ref().map(|s| s.args)
    }

    pub fn host_a(&self) -> Option<&[Complex<R>]> {
        self.state.as_ref().map(|s| s.host_a.as_slice())
    }

    pub fn host_c(&self) -> Option<&[Complex<R>]> {
        self.state.as_ref().map(|s| s.host_c.as_slice())
    }

    /// Resolve the layout, allocate host buffers and device buffers.
    pub fn setup_buffer(&mut self, params: &HerkParams) -> Result<(), BenchError> {
        let mut state = self.prepare(params)?;
        self.alloc_device(&mut state)?;
        self.state = Some(state);
        Ok(())
    }

    /// Like [`Self::setup_buffer`], but device buffers are left to [`Self::roundtrip_func`].
    pub fn roundtrip_setup_buffer(&mut self, params: &HerkParams) -> Result<(), BenchError> {
        self.state = Some(self.prepare(params)?);
        Ok(())
    }

    /// Fill host A and C from a fixed seed, so every iteration computes on the same data.
    pub fn initialize_cpu_buffer(&mut self) -> Result<(), BenchError> {
        let state = self.state.as_mut().ok_or(BenchError::NotSetUp("initialize_cpu_buffer"))?;
        let mut rng = StdRng::seed_from_u64(FILL_SEED);
        for x in state.host_a.iter_mut() {
            *x = R::random_element(&mut rng);
        }
        for x in state.host_c.iter_mut() {
            *x = R::random_element(&mut rng);
        }
        Ok(())
    }

    /// Upload A at `offa` and C at `offc`.
    pub fn initialize_gpu_buffer(&mut self) -> Result<(), BenchError> {
        let state = self.state.as_mut().ok_or(BenchError::NotSetUp("initialize_gpu_buffer"))?;
        upload(&self.device, state)
    }

    /// Re-upload host C to the device so the next call starts from the same input.
    pub fn reset_gpu_write_buffer(&mut self) -> Result<(), BenchError> {
        let state = self.state.as_mut().ok_or(BenchError::NotSetUp("reset_gpu_write_buffer"))?;
        let dev_c = state.dev_c.as_mut().ok_or(BenchError::NotSetUp("reset_gpu_write_buffer"))?;
        self.device.write(dev_c, state.args.offc, &state.host_c)?;
        Ok(())
    }

    /// Timed kernel call. Returns once the update has completed.
    pub fn call_func(&mut self) -> Result<(), BenchError> {
        let state = self.state.as_mut().ok_or(BenchError::NotSetUp("call_func"))?;
        let (Some(dev_a), Some(dev_c)) = (state.dev_a.as_ref(), state.dev_c.as_mut()) else {
            return Err(BenchError::NotSetUp("call_func"));
        };

        self.timer.start();
        if let Err(err) = self.device.herk(&state.args, dev_a, dev_c) {
            self.timer.cancel();
            return Err(err.into());
        }
        self.timer.stop();
        Ok(())
    }

    /// Download C from the device into the host copy.
    pub fn read_gpu_buffer(&mut self) -> Result<(), BenchError> {
        let state = self.state.as_mut().ok_or(BenchError::NotSetUp("read_gpu_buffer"))?;
        let dev_c = state.dev_c.as_ref().ok_or(BenchError::NotSetUp("read_gpu_buffer"))?;
        self.device.read(dev_c, state.args.offc, &mut state.host_c)?;
        Ok(())
    }

    /// Timed allocation, upload, kernel call and download of C.
    pub fn roundtrip_func(&mut self) -> Result<(), BenchError> {
        let mut state = self.state.take().ok_or(BenchError::NotSetUp("roundtrip_func"))?;

        self.timer.start();
        let result = self.roundtrip(&mut state);
        match &result {
            Ok(_) => self.timer.stop(),
            Err(_) => self.timer.cancel(),
        }
        self.state = Some(state);
        result
    }

    pub fn zerocopy_roundtrip_func(&mut self) -> Result<(), BenchError> {
        Err(BenchError::Unsupported("zero-copy round trip"))
    }

    /// Drop host and device buffers. Timer samples are kept.
    pub fn release_buffers(&mut self) {
        self.state = None;
    }

    /// Throughput of the mean timed call.
    pub fn gflops(&self) -> f64 {
        let ns = self.timer.time_in_ns();
        if ns == 0.0 {
            return 0.0;
        }
        flops(self.dims.0, self.dims.1) / ns
    }

    pub fn gflops_formula(&self) -> &'static str {
        "4*K*N*(N+1)/time"
    }

    fn prepare(&mut self, params: &HerkParams) -> Result<HerkState<R>, BenchError> {
        // drop the previous iteration's buffers before allocating new ones
        self.state = None;

        let layout = resolve_with_policy(&params.layout_spec(), self.policy)?;
        debug!(
            "{} layout: lda={} a_vectors={} ldc={} c_vectors={}",
            R::ROUTINE,
            layout.lda,
            layout.a_vectors,
            layout.ldc,
            layout.c_vectors
        );

        // size everything with checked arithmetic and consult the device
        // budget before any host or device memory is touched
        let a_len = layout.host_len(Operand::A)?;
        let c_len = layout.host_len(Operand::C)?;
        let a_count = layout.element_count(Operand::A, params.offa)?;
        let c_count = layout.element_count(Operand::C, params.offc)?;
        let device_bytes = a_count
            .checked_add(c_count)
            .and_then(|total| total.checked_mul(R::PRECISION.element_size()))
            .unwrap_or(usize::MAX);
        self.device.ensure_available(device_bytes)?;

        self.dims = (params.n, params.k);
        Ok(HerkState {
            args: params.herk_args(&layout),
            layout,
            host_a: host_buffer(Operand::A, a_len)?,
            host_c: host_buffer(Operand::C, c_len)?,
            dev_a: None,
            dev_c: None,
        })
    }

    fn alloc_device(&self, state: &mut HerkState<R>) -> Result<(), BenchError> {
        let a_len = state.layout.element_count(Operand::A, state.args.offa)?;
        let c_len = state.layout.element_count(Operand::C, state.args.offc)?;
        state.dev_a = Some(self.device.alloc(a_len, MemAccess::ReadOnly)?);
        state.dev_c = Some(self.device.alloc(c_len, MemAccess::ReadWrite)?);
        Ok(())
    }

    fn roundtrip(&self, state: &mut HerkState<R>) -> Result<(), BenchError> {
        self.alloc_device(state)?;
        upload(&self.device, state)?;

        let (Some(dev_a), Some(dev_c)) = (state.dev_a.as_ref(), state.dev_c.as_mut()) else {
            return Err(BenchError::NotSetUp("roundtrip_func"));
        };
        self.device.herk(&state.args, dev_a, dev_c)?;
        self.device.read(dev_c, state.args.offc, &mut state.host_c)?;
        Ok(())
    }
}

/// Zero-filled host buffer; allocation failure is reported instead of aborting.
fn host_buffer<R: HerkReal>(operand: Operand, len: usize) -> Result<Vec<Complex<R>>, BenchError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| BenchError::HostAllocation { operand, elements: len })?;
    buf.resize(len, Complex::default());
    Ok(buf)
}

fn upload<R: HerkReal>(device: &HostDevice, state: &mut HerkState<R>) -> Result<(), BenchError> {
    let (Some(dev_a), Some(dev_c)) = (state.dev_a.as_mut(), state.dev_c.as_mut()) else {
        return Err(BenchError::NotSetUp("initialize_gpu_buffer"));
    };
    device.write(dev_a, state.args.offa, &state.host_a)?;
    device.write(dev_c, state.args.offc, &state.host_c)?;
    Ok(())
}
