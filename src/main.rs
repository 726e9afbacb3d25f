//! Command-line driver: runs the single-cycle and five-stage cores over
//! the same memory image and dumps their final state for comparison.

use anyhow::{Context, Result};
use clap::Parser;
use rv32_dual_core_sim::five_stage::FiveStageCore;
use rv32_dual_core_sim::memory::{DataMemory, InstructionMemory};
use rv32_dual_core_sim::metrics::PerformanceMetrics;
use rv32_dual_core_sim::single_cycle::SingleCycleCore;
use std::path::PathBuf;

/// Cycle-accurate RV32I simulator: single-cycle and five-stage pipelined cores.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory containing imem.txt/dmem.txt and where result files are written.
    #[arg(long, default_value = ".")]
    iodir: PathBuf,

    /// Safety cutoff: abort a core that hasn't halted after this many cycles.
    #[arg(long, default_value_t = 1_000_000)]
    max_cycles: u64,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let imem_path = args.iodir.join("imem.txt");
    let dmem_path = args.iodir.join("dmem.txt");

    let imem = InstructionMemory::load(&imem_path)
        .with_context(|| format!("loading instruction memory from {}", imem_path.display()))?;
    let dmem_image = DataMemory::load(&dmem_path)
        .with_context(|| format!("loading data memory from {}", dmem_path.display()))?;

    run_single_cycle(&args, &imem, dmem_image.clone())?;
    run_five_stage(&args, &imem, dmem_image)?;

    Ok(())
}

fn run_single_cycle(args: &Args, imem: &InstructionMemory, dmem: DataMemory) -> Result<()> {
    let mut core = SingleCycleCore::new(dmem);
    let rf_path = args.iodir.join("SS_RFResult.txt");
    let state_path = args.iodir.join("StateResult_SS.txt");

    while !core.tick(imem) {
        core.reg
            .dump_cycle(&rf_path, core.cycle - 1)
            .context("writing SS_RFResult.txt")?;
        core.dump_cycle(&state_path, core.cycle - 1)
            .context("writing StateResult_SS.txt")?;
        if core.cycle > args.max_cycles {
            anyhow::bail!("single-cycle core did not halt within {} cycles", args.max_cycles);
        }
    }
    core.reg
        .dump_cycle(&rf_path, core.cycle - 1)
        .context("writing SS_RFResult.txt")?;
    core.dump_cycle(&state_path, core.cycle - 1)
        .context("writing StateResult_SS.txt")?;

    core.dmem
        .dump(&args.iodir.join("SS_DMEMResult.txt"))
        .context("writing SS_DMEMResult.txt")?;

    PerformanceMetrics {
        core_name: "Single Stage",
        cycles: core.cycle,
        instructions: core.cycle.saturating_sub(1),
    }
    .append(&args.iodir.join("PerformanceMetrics_Result.txt"))
    .context("writing PerformanceMetrics_Result.txt")?;

    Ok(())
}

fn run_five_stage(args: &Args, imem: &InstructionMemory, dmem: DataMemory) -> Result<()> {
    let mut core = FiveStageCore::new(dmem);
    let rf_path = args.iodir.join("FS_RFResult.txt");
    let state_path = args.iodir.join("StateResult_FS.txt");

    let mut cycle = 0u64;
    loop {
        let halted = core.tick(imem);
        core.reg
            .dump_cycle(&rf_path, cycle)
            .context("writing FS_RFResult.txt")?;
        core.dump_state_cycle(&state_path, cycle)
            .context("writing StateResult_FS.txt")?;
        cycle += 1;
        if halted {
            break;
        }
        if cycle > args.max_cycles {
            anyhow::bail!("five-stage core did not halt within {} cycles", args.max_cycles);
        }
    }

    core.dmem
        .dump(&args.iodir.join("FS_DMEMResult.txt"))
        .context("writing FS_DMEMResult.txt")?;

    PerformanceMetrics {
        core_name: "Five Stage",
        cycles: core.cycle(),
        instructions: core.instructions_retired(),
    }
    .append(&args.iodir.join("PerformanceMetrics_Result.txt"))
    .context("writing PerformanceMetrics_Result.txt")?;

    Ok(())
}
