use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use super::{HerkBench, HerkParams, LeadingDimPolicy, resolve_with_policy};
use crate::element::{HerkReal, Precision};
use crate::error::BenchError;
use crate::layout::ResolvedLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RunMode {
    /// Time only the kernel call.
    #[default]
    Standard,
    /// Time allocation, upload, kernel call and download together.
    Roundtrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    pub iterations: usize,
    pub warmup: usize,
    pub mode: RunMode,
    pub policy: LeadingDimPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            warmup: 1,
            mode: RunMode::Standard,
            policy: LeadingDimPolicy::Strict,
        }
    }
}

/// Outcome of one [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub routine: &'static str,
    pub precision: Precision,
    pub backend: String,
    pub mode: RunMode,
    pub params: HerkParams,
    pub layout: ResolvedLayout,
    pub iterations: usize,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub std_dev_ms: f64,
    pub gflops: f64,
    pub gflops_formula: &'static str,
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:>9} N={:<5} K={:<5} {:8.3} ms (min {:8.3})  {:7.2} GFLOPS",
            self.routine,
            match self.mode {
                RunMode::Standard => "kernel",
                RunMode::Roundtrip => "roundtrip",
            },
            self.params.n,
            self.params.k,
            self.mean_ms,
            self.min_ms,
            self.gflops
        )
    }
}

/// Run warm-up iterations, reset the timer, then run `config.iterations`
/// timed iterations and summarize them.
pub fn run<R: HerkReal>(
    bench: &mut HerkBench<R>,
    params: &HerkParams,
    config: &RunConfig,
) -> Result<BenchReport, BenchError> {
    bench.set_policy(config.policy);
    let layout = resolve_with_policy(&params.layout_spec(), config.policy)?;

    for _ in 0..config.warmup {
        iteration(bench, params, config.mode)?;
    }
    bench.timer_mut().reset();

    for _ in 0..config.iterations {
        iteration(bench, params, config.mode)?;
    }

    let timer = bench.timer();
    let report = BenchReport {
        routine: R::ROUTINE,
        precision: R::PRECISION,
        backend: bench.device().backend().name(),
        mode: config.mode,
        params: *params,
        layout,
        iterations: timer.samples().len(),
        mean_ms: to_ms(timer.mean()),
        min_ms: to_ms(timer.min()),
        max_ms: to_ms(timer.max()),
        median_ms: to_ms(timer.median()),
        std_dev_ms: timer.std_dev().unwrap_or(0.0) * 1000.0,
        gflops: bench.gflops(),
        gflops_formula: bench.gflops_formula(),
    };

    info!(
        "{} N={} K={} {:?}: {:.3} ms, {:.2} GFLOPS",
        report.routine, params.n, params.k, config.mode, report.mean_ms, report.gflops
    );
    Ok(report)
}

fn iteration<R: HerkReal>(bench: &mut HerkBench<R>, params: &HerkParams, mode: RunMode) -> Result<(), BenchError> {
    let result = steps(bench, params, mode);
    bench.release_buffers();
    result
}

fn steps<R: HerkReal>(bench: &mut HerkBench<R>, params: &HerkParams, mode: RunMode) -> Result<(), BenchError> {
    match mode {
        RunMode::Standard => {
            bench.setup_buffer(params)?;
            bench.initialize_cpu_buffer()?;
            bench.initialize_gpu_buffer()?;
            bench.call_func()?;
            bench.read_gpu_buffer()
        }
        RunMode::Roundtrip => {
            bench.roundtrip_setup_buffer(params)?;
            bench.initialize_cpu_buffer()?;
            bench.roundtrip_func()
        }
    }
}

fn to_ms(d: Option<Duration>) -> f64 {
    d.map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}
