//! Console reporter for metrics with real-time updates.

use std::io::{self, Write};

use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;

use super::collector::MetricsCollector;
use super::thresholds::ThresholdOutcome;

/// Start periodic metrics reporting until the run is cancelled.
pub async fn start_periodic_reporter(
    collector: MetricsCollector,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                collector.update_system_metrics();
                print_live_metrics(&collector);
            }
            _ = cancel.cancelled() => break,
        }
    }
}

/// Print live metrics (clears screen and updates in place)
pub fn print_live_metrics(collector: &MetricsCollector) {
    // Clear screen and move cursor to top
    print!("\x1B[2J\x1B[1;1H");

    let metrics = collector.snapshot();
    let elapsed = collector.elapsed_seconds();
    let latency = collector.latency_stats();

    println!("╔════════════════════════════════════════════════════════════════╗");
    println!("║           Registry Load Test - Live Metrics                    ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    println!(
        "\n⏱️  Elapsed Time: {:02}:{:02}:{:02}",
        elapsed / 3600,
        (elapsed % 3600) / 60,
        elapsed % 60
    );

    let inv = &metrics.invocations;
    println!("\n┌─ INVOCATIONS ───────────────────────────────────────────────┐");
    println!(
        "│  Attempted:    {:>8}    Recorded:   {:>8}              │",
        inv.attempted, inv.recorded
    );
    println!(
        "│  Replies:      {:>8}    Errors:     {:>8}              │",
        inv.replies(),
        inv.errors()
    );
    if elapsed > 0 {
        let throughput = inv.recorded as f64 / elapsed as f64;
        println!("│  Throughput:   {:>7.2}/sec                                  │", throughput);
    }
    println!("└─────────────────────────────────────────────────────────────┘");

    if !inv.statuses.is_empty() {
        println!("\n┌─ STATUS CODES ──────────────────────────────────────────────┐");
        let mut statuses: Vec<_> = inv.statuses.iter().collect();
        statuses.sort_by(|a, b| a.0.cmp(b.0));
        for (code, count) in statuses {
            println!("│  {:<24} {:>10}                        │", code, count);
        }
        println!("└─────────────────────────────────────────────────────────────┘");
    }

    if latency.count > 0 {
        println!("\n┌─ CALL LATENCY (ms) ─────────────────────────────────────────┐");
        println!(
            "│  Min: {:>6}  P50: {:>6}  P95: {:>6}  P99: {:>6}  Max: {:>6}│",
            latency.min, latency.p50, latency.p95, latency.p99, latency.max
        );
        println!(
            "│  Mean: {:>8.2} ms    Count: {:>10}                    │",
            latency.mean, latency.count
        );
        println!("└─────────────────────────────────────────────────────────────┘");
    }

    if !metrics.checks.is_empty() {
        println!("\n┌─ CHECKS ────────────────────────────────────────────────────┐");
        for check in &metrics.checks {
            println!(
                "│  {:<28} {:>7}/{:<7} {:>6.2}%          │",
                check.name,
                check.passed,
                check.total,
                check.rate() * 100.0
            );
        }
        println!("└─────────────────────────────────────────────────────────────┘");
    }

    println!("\n┌─ SYSTEM ────────────────────────────────────────────────────┐");
    println!(
        "│  CPU Usage:    {:>6.1}%    Memory: {:>6} / {:>6} MB       │",
        metrics.system.cpu_usage, metrics.system.memory_used_mb, metrics.system.memory_total_mb
    );
    println!("└─────────────────────────────────────────────────────────────┘");

    println!("\n  [Press Ctrl+C to stop test]");

    let _ = io::stdout().flush();
}

/// Print final summary report
pub fn print_final_report(collector: &MetricsCollector, thresholds: &[ThresholdOutcome]) {
    let metrics = collector.snapshot();
    let elapsed = collector.elapsed_seconds();
    let latency = collector.latency_stats();
    let inv = &metrics.invocations;

    println!("\n╔════════════════════════════════════════════════════════════════╗");
    println!("║                    FINAL TEST REPORT                           ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    println!("\n📊 INVOCATIONS");
    println!("   Total Attempted:      {:>10}", inv.attempted);
    println!("   Total Recorded:       {:>10}", inv.recorded);
    println!("   Replies:              {:>10}", inv.replies());
    println!("   Connect Failures:     {:>10}", inv.connect_failed);
    println!("   Encode Errors:        {:>10}", inv.encode_errors);
    println!("   Transport Errors:     {:>10}", inv.transport_errors);
    println!("   Aborted:              {:>10}", inv.aborted);

    if elapsed > 0 {
        let throughput = inv.recorded as f64 / elapsed as f64;
        println!("   Throughput:           {:>10.2} calls/sec", throughput);
    }

    if !inv.statuses.is_empty() {
        println!("\n📦 STATUS CODES");
        let mut statuses: Vec<_> = inv.statuses.iter().collect();
        statuses.sort_by(|a, b| a.0.cmp(b.0));
        for (code, count) in statuses {
            println!("   {:<24} {:>10}", code, count);
        }
    }

    if latency.count > 0 {
        println!("\n📈 CALL LATENCY");
        println!("   Min:                  {:>10} ms", latency.min);
        println!("   P50 (Median):         {:>10} ms", latency.p50);
        println!("   P95:                  {:>10} ms", latency.p95);
        println!("   P99:                  {:>10} ms", latency.p99);
        println!("   Max:                  {:>10} ms", latency.max);
        println!("   Mean:                 {:>10.2} ms", latency.mean);
    }

    if !metrics.checks.is_empty() {
        println!("\n✅ CHECKS");
        for check in &metrics.checks {
            println!(
                "   {:<28} {:>7}/{:<7} {:>6.2}%",
                check.name,
                check.passed,
                check.total,
                check.rate() * 100.0
            );
        }
    }

    if !thresholds.is_empty() {
        println!("\n🎯 THRESHOLDS");
        for outcome in thresholds {
            let mark = if outcome.passed { "✓" } else { "✗" };
            match outcome.observed {
                Some(value) => {
                    println!("   {} {:<36} observed {:.2}", mark, outcome.name, value)
                }
                None => println!("   {} {:<36} no samples", mark, outcome.name),
            }
        }
    }

    println!("\n⏱️  Test Duration: {} seconds", elapsed);
    println!("════════════════════════════════════════════════════════════════\n");
}
