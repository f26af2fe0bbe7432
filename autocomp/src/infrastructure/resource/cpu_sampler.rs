// /////////////////////////////////////////////////////////////////////////////
// AutoComp
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CPU Sampler (§4.F)
//!
//! A background thread that reads the kernel's aggregate CPU counters at
//! ~2 Hz and folds the delta into [`ResourceState::set_cpu_load`]. The
//! counter source is a trait (`CpuCounterSource`) so the sampling loop and
//! its load-from-delta arithmetic can be unit-tested without `/proc/stat` —
//! only `ProcStatSource` ever reads the real kernel file.

use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use autocomp_domain::value_objects::ResourceState;

const SAMPLE_INTERVAL: Duration = Duration::from_millis(500);

/// The 8 counters on the aggregate `cpu` line of `/proc/stat`, in the order
/// §4.F names them: user, nice, system, idle, iowait, irq, softirq, steal.
pub type CpuCounters = [u64; 8];

/// Abstracts "where do the raw counters come from" so the sampler's loop
/// and arithmetic are testable off a real kernel.
pub trait CpuCounterSource: Send {
    /// Returns the current counters, or `None` on a read failure — per
    /// §4.F, "if counter reads fail, the last value is retained".
    fn read(&mut self) -> Option<CpuCounters>;
}

/// Reads the aggregate `cpu` line from `/proc/stat`.
pub struct ProcStatSource;

impl CpuCounterSource for ProcStatSource {
    fn read(&mut self) -> Option<CpuCounters> {
        let mut contents = String::new();
        std::fs::File::open("/proc/stat").ok()?.read_to_string(&mut contents).ok()?;
        let first_line = contents.lines().next()?;
        parse_cpu_line(first_line)
    }
}

fn parse_cpu_line(line: &str) -> Option<CpuCounters> {
    let mut fields = line.split_whitespace();
    if fields.next()? != "cpu" {
        return None;
    }
    let mut counters = [0u64; 8];
    for slot in counters.iter_mut() {
        *slot = fields.next()?.parse().ok()?;
    }
    Some(counters)
}

/// `Δtotal = sum(now) − sum(prev)`, `Δidle = (now.idle + now.iowait) −
/// (prev.idle + prev.iowait)`, `cpu_load = (Δtotal − Δidle) / Δtotal`.
/// Returns `None` when `Δtotal` is zero (no time has passed, or counters
/// didn't move) to avoid a divide-by-zero — the caller retains the last
/// value in that case, same as a failed read.
fn cpu_load_from_delta(prev: CpuCounters, now: CpuCounters) -> Option<f32> {
    let sum = |c: CpuCounters| c.iter().sum::<u64>();
    let delta_total = sum(now).saturating_sub(sum(prev));
    if delta_total == 0 {
        return None;
    }
    let prev_idle = prev[3] + prev[4];
    let now_idle = now[3] + now[4];
    let delta_idle = now_idle.saturating_sub(prev_idle);
    Some((delta_total.saturating_sub(delta_idle)) as f32 / delta_total as f32)
}

/// Handle to the running sampler thread; dropping it does not stop the
/// thread — use [`CpuSampler::stop`] (or the shared `shutdown` flag) and
/// then [`CpuSampler::join`], matching §4.P's ordered shutdown ("join F").
pub struct CpuSampler {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CpuSampler {
    /// Spawns the sampler thread against `state`, using `source` for
    /// readings. Production callers pass [`ProcStatSource`]; tests pass a
    /// scripted source.
    pub fn spawn(state: Arc<ResourceState>, mut source: impl CpuCounterSource + 'static) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();

        let handle = std::thread::spawn(move || {
            let mut prev = source.read();
            while !thread_shutdown.load(Ordering::Relaxed) {
                std::thread::sleep(SAMPLE_INTERVAL);
                if thread_shutdown.load(Ordering::Relaxed) {
                    break;
                }
                let Some(now) = source.read() else { continue };
                if let Some(prev_counters) = prev {
                    if let Some(load) = cpu_load_from_delta(prev_counters, now) {
                        state.set_cpu_load(load);
                    }
                }
                prev = Some(now);
            }
        });

        Self { shutdown, handle: Some(handle) }
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Blocks until the sampler thread exits. Call [`CpuSampler::stop`]
    /// first, or this can block for up to one sample interval.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for CpuSampler {
    fn drop(&mut self) {
        self.stop();
        self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn parses_the_aggregate_cpu_line() {
        let line = "cpu  100 10 50 800 20 0 5 0 0 0";
        let counters = parse_cpu_line(line).unwrap();
        assert_eq!(counters, [100, 10, 50, 800, 20, 0, 5, 0]);
    }

    #[test]
    fn non_cpu_line_is_rejected() {
        assert!(parse_cpu_line("cpu0 1 2 3 4 5 6 7 8").is_none());
    }

    #[test]
    fn load_from_delta_matches_formula() {
        let prev: CpuCounters = [100, 0, 0, 800, 0, 0, 0, 0];
        let now: CpuCounters = [150, 0, 0, 820, 0, 0, 0, 0];
        // delta_total = 70, delta_idle = 20 -> load = 50/70
        let load = cpu_load_from_delta(prev, now).unwrap();
        assert!((load - (50.0 / 70.0)).abs() < 1e-6);
    }

    #[test]
    fn zero_delta_total_is_none() {
        let counters: CpuCounters = [100, 0, 0, 800, 0, 0, 0, 0];
        assert!(cpu_load_from_delta(counters, counters).is_none());
    }

    /// A scripted source yielding a fixed sequence of readings, then `None`
    /// forever (simulating a sustained read failure where the sampler must
    /// retain the last value).
    struct ScriptedSource {
        readings: Mutex<std::collections::VecDeque<Option<CpuCounters>>>,
    }

    impl CpuCounterSource for ScriptedSource {
        fn read(&mut self) -> Option<CpuCounters> {
            self.readings.lock().unwrap().pop_front().flatten()
        }
    }

    #[test]
    fn failed_reads_leave_resource_state_unchanged() {
        let state = Arc::new(ResourceState::new());
        state.set_cpu_load(0.25);
        let source = ScriptedSource {
            readings: Mutex::new(std::collections::VecDeque::from(vec![None, None])),
        };
        let mut sampler = CpuSampler::spawn(state.clone(), source);
        std::thread::sleep(Duration::from_millis(20));
        sampler.stop();
        sampler.join();
        assert_eq!(state.cpu_load(), 0.25);
    }
}
