use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::Instant;

use peripherald_core::{
    features::DeviceFeature, scheduler::TokioScheduler, AppConfig, ScrollSmoother,
};

/// Run deltas through an in-process smoother and print every chunk
pub async fn run(
    config: &AppConfig,
    deltas: &[i32],
    interval: Option<i32>,
    steps: Option<i32>,
    gap_ms: u64,
) -> Result<()> {
    let smoother = ScrollSmoother::new(Arc::new(TokioScheduler::try_current()?));
    smoother.set_profile(&config.profile);
    if let Some(interval) = interval {
        smoother.set_interval_ms(interval);
    }
    if let Some(steps) = steps {
        smoother.set_steps(steps);
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let start = Instant::now();
    smoother.set_on_chunk(move |chunk| {
        // The receiver only goes away once we are done printing.
        let _ = tx.send((chunk, start.elapsed()));
    });

    println!(
        "Smoothing {} deltas (interval {} ms, steps {})\n",
        deltas.len(),
        smoother.interval_ms(),
        smoother.steps()
    );

    for (i, delta) in deltas.iter().enumerate() {
        if i > 0 && gap_ms > 0 {
            tokio::time::sleep(Duration::from_millis(gap_ms)).await;
        }
        smoother.feed(*delta);
    }

    // Ticks are at most one interval apart while an episode is active.
    let idle_wait = Duration::from_millis(u64::from(smoother.interval_ms()) * 4 + 20);
    let mut ticks = 0u32;
    let mut total = 0i64;
    loop {
        match tokio::time::timeout(idle_wait, rx.recv()).await {
            Ok(Some((chunk, at))) => {
                ticks += 1;
                total += i64::from(chunk);
                println!(
                    "  {:>8.1} ms  {:>+6}  (remaining {})",
                    at.as_secs_f64() * 1000.0,
                    chunk,
                    smoother.pending()
                );
            }
            Ok(None) => break,
            Err(_) if !smoother.is_draining() => break,
            Err(_) => continue,
        }
    }

    let fed: i64 = deltas.iter().map(|&d| i64::from(d)).sum();
    println!("\n{} chunks, {} emitted of {} fed.", ticks, total, fed);

    Ok(())
}
