//! Memory-system profiling.
//!
//! Tracks per-sequencer request counts and miss latencies over a run. The
//! counters are atomic so the assembled system can be shared read-only
//! while sequencers record into it.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Debug, Default)]
struct SequencerCounters {
    requests: AtomicU64,
    misses: AtomicU64,
    miss_latency: AtomicU64,
}

/// Profiler sized to the number of sequencers in the system.
#[derive(Debug)]
pub struct Profiler {
    start_time: Instant,
    sequencers: Vec<SequencerCounters>,
}

/// Point-in-time copy of one sequencer's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SequencerStats {
    pub requests: u64,
    pub misses: u64,
    pub miss_latency: u64,
}

impl Profiler {
    /// Creates a profiler with one counter set per sequencer.
    pub fn new(num_of_sequencers: usize) -> Self {
        Self {
            start_time: Instant::now(),
            sequencers: (0..num_of_sequencers)
                .map(|_| SequencerCounters::default())
                .collect(),
        }
    }

    pub fn num_of_sequencers(&self) -> usize {
        self.sequencers.len()
    }

    /// Records a request issued by sequencer `seq`. Out-of-range indices
    /// are ignored.
    pub fn record_request(&self, seq: usize) {
        if let Some(c) = self.sequencers.get(seq) {
            c.requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a miss by sequencer `seq` that took `latency` cycles.
    pub fn record_miss(&self, seq: usize, latency: u64) {
        if let Some(c) = self.sequencers.get(seq) {
            c.misses.fetch_add(1, Ordering::Relaxed);
            c.miss_latency.fetch_add(latency, Ordering::Relaxed);
        }
    }

    pub fn sequencer(&self, seq: usize) -> Option<SequencerStats> {
        self.sequencers.get(seq).map(|c| SequencerStats {
            requests: c.requests.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            miss_latency: c.miss_latency.load(Ordering::Relaxed),
        })
    }

    /// Counters summed over every sequencer.
    pub fn totals(&self) -> SequencerStats {
        (0..self.sequencers.len())
            .filter_map(|i| self.sequencer(i))
            .fold(SequencerStats::default(), |acc, s| SequencerStats {
                requests: acc.requests + s.requests,
                misses: acc.misses + s.misses,
                miss_latency: acc.miss_latency + s.miss_latency,
            })
    }

    /// Prints a formatted summary of the memory-system statistics.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let totals = self.totals();

        let avg = |s: &SequencerStats| {
            if s.misses > 0 {
                s.miss_latency as f64 / s.misses as f64
            } else {
                0.0
            }
        };
        let miss_rate = |s: &SequencerStats| {
            if s.requests > 0 {
                (s.misses as f64 / s.requests as f64) * 100.0
            } else {
                0.0
            }
        };

        println!("\n==========================================================");
        println!("RUBY MEMORY SYSTEM STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sequencers               {}", self.num_of_sequencers());
        println!("requests                 {}", totals.requests);
        println!("misses                   {}", totals.misses);
        println!("miss_rate                {:.2}%", miss_rate(&totals));
        println!("avg_miss_latency         {:.2}", avg(&totals));
        println!("----------------------------------------------------------");
        println!("PER SEQUENCER");
        for i in 0..self.num_of_sequencers() {
            if let Some(s) = self.sequencer(i) {
                println!(
                    "  seq{:<4} requests: {:<10} | misses: {:<10} | avg_latency: {:.2}",
                    i,
                    s.requests,
                    s.misses,
                    avg(&s)
                );
            }
        }
        println!("==========================================================");
    }
}
