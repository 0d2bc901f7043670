//! Benchmark runner for cherk/zherk.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use herk::HerkReal;
use herk::device::HostDevice;
use herk::harness::{BenchReport, HerkBench, HerkParams, LeadingDimPolicy, RunConfig, RunMode, run};
use herk::kernels::Backend;
use herk::layout::{Order, Transpose, Uplo};

#[derive(Parser, Debug)]
#[command(name = "herk")]
#[command(about = "Benchmark the Hermitian rank-k update (cherk/zherk)")]
#[command(version)]
struct Args {
    /// Element type: c = single complex (cherk), z = double complex (zherk)
    #[arg(short, long, value_enum, default_value_t = CliPrecision::C)]
    precision: CliPrecision,

    #[arg(long, value_enum, default_value_t = CliOrder::Column)]
    order: CliOrder,

    #[arg(long, value_enum, default_value_t = CliUplo::Upper)]
    uplo: CliUplo,

    /// Transpose flag for A
    #[arg(long = "transa", value_enum, default_value_t = CliTranspose::N)]
    trans_a: CliTranspose,

    /// Matrix dimension N; a comma-separated list runs a size sweep
    #[arg(short, value_delimiter = ',', default_values_t = vec![64, 128, 256])]
    n: Vec<usize>,

    /// Inner dimension K (defaults to N)
    #[arg(short)]
    k: Option<usize>,

    /// Leading dimension of A (0 = auto)
    #[arg(long, default_value_t = 0)]
    lda: usize,

    /// Leading dimension of C (0 = auto)
    #[arg(long, default_value_t = 0)]
    ldc: usize,

    /// Element offset of A in its device buffer
    #[arg(long, default_value_t = 0)]
    offa: usize,

    /// Element offset of C in its device buffer
    #[arg(long, default_value_t = 0)]
    offc: usize,

    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    alpha: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    beta: f64,

    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: u64,

    /// Untimed iterations before measuring
    #[arg(long, default_value_t = 1)]
    warmup: usize,

    /// Time allocation and transfers together with the kernel
    #[arg(long)]
    roundtrip: bool,

    #[arg(long, value_enum, default_value_t = CliBackend::Threaded)]
    backend: CliBackend,

    /// Thread cap for the threaded backend (defaults to available cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Only warn about an undersized ldc and fall back to N
    #[arg(long)]
    legacy_ldc: bool,

    /// Device memory budget in MiB
    #[arg(long)]
    max_alloc_mb: Option<usize>,

    /// Print one JSON report per line instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliPrecision {
    #[value(alias = "single")]
    C,
    #[value(alias = "double")]
    Z,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliOrder {
    Row,
    Column,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliUplo {
    Upper,
    Lower,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliTranspose {
    N,
    T,
    C,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliBackend {
    Naive,
    Threaded,
}

impl From<CliOrder> for Order {
    fn from(o: CliOrder) -> Self {
        match o {
            CliOrder::Row => Order::RowMajor,
            CliOrder::Column => Order::ColumnMajor,
        }
    }
}

impl From<CliUplo> for Uplo {
    fn from(u: CliUplo) -> Self {
        match u {
            CliUplo::Upper => Uplo::Upper,
            CliUplo::Lower => Uplo::Lower,
        }
    }
}

impl From<CliTranspose> for Transpose {
    fn from(t: CliTranspose) -> Self {
        match t {
            CliTranspose::N => Transpose::NoTrans,
            CliTranspose::T => Transpose::Trans,
            CliTranspose::C => Transpose::ConjTrans,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let backend = match args.backend {
        CliBackend::Naive => Backend::Naive,
        CliBackend::Threaded => match args.threads {
            Some(threads) => Backend::Threaded { threads },
            None => Backend::default(),
        },
    };

    let config = RunConfig {
        iterations: args.iterations as usize,
        warmup: args.warmup,
        mode: if args.roundtrip {
            RunMode::Roundtrip
        } else {
            RunMode::Standard
        },
        policy: if args.legacy_ldc {
            LeadingDimPolicy::Legacy
        } else {
            LeadingDimPolicy::Strict
        },
    };

    if !args.json {
        println!("=== Hermitian Rank-K Update Benchmark ===\n");
        println!(
            "Routine: {}  Backend: {}  Order: {}  Uplo: {}  TransA: {}\n",
            match args.precision {
                CliPrecision::C => f32::ROUTINE,
                CliPrecision::Z => f64::ROUTINE,
            },
            backend.name(),
            Order::from(args.order),
            Uplo::from(args.uplo),
            Transpose::from(args.trans_a)
        );
    }

    let mut reports = Vec::with_capacity(args.n.len());
    for &n in &args.n {
        let params = HerkParams {
            order: args.order.into(),
            uplo: args.uplo.into(),
            trans_a: args.trans_a.into(),
            n,
            k: args.k.unwrap_or(n),
            lda: args.lda,
            ldc: args.ldc,
            offa: args.offa,
            offc: args.offc,
            alpha: args.alpha,
            beta: args.beta,
        };

        let report = match args.precision {
            CliPrecision::C => bench_size::<f32>(backend, args.max_alloc_mb, &params, &config),
            CliPrecision::Z => bench_size::<f64>(backend, args.max_alloc_mb, &params, &config),
        }
        .with_context(|| format!("benchmark failed for N={} K={}", params.n, params.k))?;

        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", report);
        }
        reports.push(report);
    }

    if !args.json {
        print_summary_table(&reports);
    }
    Ok(())
}

fn bench_size<R: HerkReal>(
    backend: Backend,
    max_alloc_mb: Option<usize>,
    params: &HerkParams,
    config: &RunConfig,
) -> Result<BenchReport> {
    let mut device = HostDevice::new(backend);
    if let Some(mb) = max_alloc_mb {
        device = device.with_memory_limit(mb.saturating_mul(1024 * 1024));
    }

    let mut bench = HerkBench::<R>::new(device);
    Ok(run(&mut bench, params, config)?)
}

fn print_summary_table(reports: &[BenchReport]) {
    let Some(first) = reports.first() else {
        return;
    };

    println!("\n{}", "=".repeat(78));
    println!("SUMMARY ({}, {})", first.routine, first.backend);
    println!("{}", "=".repeat(78));

    println!(
        "\n{:>7} {:>7} {:>7} {:>7} {:>12} {:>12} {:>12}",
        "N", "K", "lda", "ldc", "Mean (ms)", "Min (ms)", "GFLOPS"
    );
    println!("{}", "-".repeat(78));

    for r in reports {
        println!(
            "{:>7} {:>7} {:>7} {:>7} {:>12.3} {:>12.3} {:>12.2}",
            r.params.n, r.params.k, r.layout.lda, r.layout.ldc, r.mean_ms, r.min_ms, r.gflops
        );
    }

    println!("{}", "=".repeat(78));
    println!("\nGFLOPS = {} in GFLOPS (billion floating point operations per second)\n", first.gflops_formula);
}
