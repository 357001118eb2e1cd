use std::path::PathBuf;
use std::process::ExitCode;

use blockjoin::buffer::BufferManager;
use blockjoin::common::{
    JoinConfig, DEFAULT_BUCKET_COUNT, DEFAULT_MAX_BLOCK_SIZE, DEFAULT_MAX_PINNED_BLOCKS,
};
use blockjoin::execution::{HashEquiJoin, Join, NestedLoopEquiJoin};
use blockjoin::loader::load_relation;
use blockjoin::report::{collect_join, JoinReport};
use blockjoin::Result;
use clap::Parser;
use log::error;

/// Compare the I/O cost of equi-join algorithms on two tab-separated files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maximum number of pinned blocks
    #[arg(long, default_value_t = DEFAULT_MAX_PINNED_BLOCKS)]
    block_count: usize,

    /// Maximum block size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BLOCK_SIZE)]
    block_size: usize,

    /// Bucket count for hash algorithms
    #[arg(long, default_value_t = DEFAULT_BUCKET_COUNT)]
    bucket_count: usize,

    /// First file to join
    #[arg(long = "relation1", alias = "r1")]
    relation1: PathBuf,

    /// Second file to join
    #[arg(long = "relation2", alias = "r2")]
    relation2: PathBuf,

    /// Join attribute index of the first relation
    #[arg(long = "join1", alias = "j1")]
    join1: usize,

    /// Join attribute index of the second relation
    #[arg(long = "join2", alias = "j2")]
    join2: usize,

    /// Scale factor of the first relation
    #[arg(long = "scale1", alias = "s1", default_value_t = 1)]
    scale1: usize,

    /// Scale factor of the second relation
    #[arg(long = "scale2", alias = "s2", default_value_t = 1)]
    scale2: usize,

    /// Keep probe-side partition buffers pinned between hash join phases
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    retain_probe_buffers: bool,

    /// Increase logging verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> JoinConfig {
        JoinConfig {
            max_pinned_blocks: self.block_count,
            max_block_size: self.block_size,
            bucket_count: self.bucket_count,
            join_attribute_a: self.join1,
            join_attribute_b: self.join2,
            scale_a: self.scale1,
            scale_b: self.scale2,
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = args.config();
    config.validate()?;

    let mut bm = BufferManager::new(config.max_pinned_blocks, config.max_block_size);
    let relation_a = load_relation(&args.relation1, config.scale_a, &mut bm)?;
    let relation_b = load_relation(&args.relation2, config.scale_b, &mut bm)?;
    println!(
        "Input relation sizes (blocks): {} {}",
        relation_a.block_count(),
        relation_b.block_count()
    );

    let reference = collect_join(
        &NestedLoopEquiJoin::new(),
        &mut bm,
        &relation_a,
        config.join_attribute_a,
        &relation_b,
        config.join_attribute_b,
    )?;
    println!("NLJ result: {}", reference.len());
    println!();

    let algorithms: Vec<Box<dyn Join>> = vec![
        Box::new(NestedLoopEquiJoin::new()),
        Box::new(
            HashEquiJoin::new(config.bucket_count)?
                .with_probe_retention(args.retain_probe_buffers),
        ),
    ];

    for algorithm in &algorithms {
        let report = JoinReport::evaluate(
            algorithm.as_ref(),
            &mut bm,
            &relation_a,
            config.join_attribute_a,
            &relation_b,
            config.join_attribute_b,
            &reference,
        )?;
        println!("{}", report);
        println!();
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("join run failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
