use worker_pool::{Config, ThreadPool};
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;


fn collatz_steps(mut n: u64) -> u32 {
    let mut steps = 0;
    while n != 1 {
        n = if n % 2 == 0 { n / 2 } else { 3 * n + 1 };
        steps += 1;
    }
    steps
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pool = match ThreadPool::with_config(Config::cpu_bound()) {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "failed to start thread pool");
            std::process::exit(1);
        }
    };

    let now = Instant::now();
    let chunk = 250_000_u64;
    let mut handles = Vec::new();
    for i in 0..pool.num_threads() as u64 * 4 {
        let start = i * chunk + 1;
        let handle = pool.submit_with(
            |(start, end): (u64, u64)| {
                (start..end)
                    .map(|n| (collatz_steps(n), n))
                    .max()
                    .unwrap_or((0, start))
            },
            (start, start + chunk),
        );
        match handle {
            Ok(h) => handles.push(h),
            Err(e) => error!(error = %e, "submit failed"),
        }
    }

    let mut best = (0, 0);
    for handle in handles {
        match handle.join() {
            Ok(found) => best = best.max(found),
            Err(e) => error!(error = %e, "task failed"),
        }
    }

    let metrics = pool.metrics();
    pool.shutdown();

    info!(
        number = best.1,
        steps = best.0,
        completed = metrics.completed_tasks,
        failed = metrics.failed_tasks,
        elapsed = ?now.elapsed(),
        "longest collatz chain"
    );
}
