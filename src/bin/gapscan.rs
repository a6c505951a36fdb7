use std::process;
use std::time::Instant;

use clap::Parser;
use cramer_wronskian::{scan_gaps, GapRecord};

/// Scan for record prime gaps and their compression ratios.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Exclusive upper bound for the prime scan
    #[arg(long, default_value_t = 10_000_000)]
    limit: u64,
}

fn print_record(record: &GapRecord) {
    println!(
        "{:<12} | {:<8} | {:<12.2} | {:<14.4} | {:<10.4}",
        record.lower_prime,
        record.gap,
        record.log_p_squared,
        record.cramer_ratio,
        record.q_w
    );
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    println!("{}", "=".repeat(85));
    println!("Record Prime Gaps and Compression Ratios");
    println!("{}", "=".repeat(85));
    println!(
        "{:<12} | {:<8} | {:<12} | {:<14} | {:<10}",
        "P_n", "Gap g", "log^2(P_n)", "Cramer ratio", "q_W"
    );
    println!("{}", "-".repeat(85));

    let start = Instant::now();
    match scan_gaps(cli.limit, print_record) {
        Ok(max_gap) => {
            let elapsed = start.elapsed();
            println!("{}", "=".repeat(85));
            println!(
                "Scan complete. Depth: {}, max gap: {}, time: {:.1}s",
                cli.limit,
                max_gap,
                elapsed.as_secs_f64()
            );
        }
        Err(err) => {
            eprintln!("error: {}", err);
            process::exit(1);
        }
    }
}
