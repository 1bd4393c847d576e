// Loss of precision is allowable in this module's use cases.
#![allow(clippy::cast_precision_loss)]

use std::time::{Duration, Instant};

use bytesize::ByteSize;
use humantime::format_duration;
use serde::Serialize;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::log::{debug, error, info};

/// Minimum time between two memory polls.
const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Resource use of one simulation run. Per-agent and per-tick figures are zero when the
/// population or the tick count is zero.
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionStatistics {
    pub max_memory_usage: u64,
    pub cpu_time: Duration,
    pub wall_time: Duration,

    pub population: usize,
    pub ticks: usize,
    pub memory_per_agent: u64,
    pub wall_time_per_agent: Duration,
    pub wall_time_per_tick: Duration,
    pub cpu_time_per_tick: Duration,
}

/// Samples process memory and CPU time over a run.
pub struct ExecutionProfilingCollector {
    start_time: Instant,
    last_refresh: Instant,
    /// Accumulated CPU milliseconds of the process when collection started.
    start_cpu_time: u64,
    /// Largest resident memory seen so far, in bytes.
    max_memory_usage: u64,
    system: System,
    /// `None` where `sysinfo` cannot see the current process.
    process_id: Option<Pid>,
}

impl ExecutionProfilingCollector {
    #[must_use]
    pub fn new() -> ExecutionProfilingCollector {
        let process_id = sysinfo::get_current_pid().ok();
        let now = Instant::now();

        let mut collector = ExecutionProfilingCollector {
            start_time: now,
            last_refresh: now,
            start_cpu_time: 0,
            max_memory_usage: 0,
            system: System::new(),
            process_id,
        };
        if let Some(process_id) = process_id {
            debug!("Process ID: {}", process_id);
            collector.update_system_info(ProcessRefreshKind::nothing().with_cpu().with_memory());
            if let Some(process) = collector.system.process(process_id) {
                collector.max_memory_usage = process.memory();
                collector.start_cpu_time = process.accumulated_cpu_time();
            }
        }
        collector
    }

    /// Polls memory use if `REFRESH_INTERVAL` has passed since the last poll. Cheap enough to
    /// call after every tick.
    #[inline]
    pub fn refresh(&mut self) {
        if self.last_refresh.elapsed() >= REFRESH_INTERVAL {
            self.poll_memory();
            self.last_refresh = Instant::now();
        }
    }

    fn poll_memory(&mut self) {
        self.update_system_info(ProcessRefreshKind::nothing().with_memory());
        if let Some(process) = self.process_id.and_then(|pid| self.system.process(pid)) {
            self.max_memory_usage = self.max_memory_usage.max(process.memory());
        }
    }

    /// CPU milliseconds used by the process since collection started.
    pub fn cpu_time(&mut self) -> u64 {
        self.update_system_info(ProcessRefreshKind::nothing().with_cpu());
        self.process_id
            .and_then(|pid| self.system.process(pid))
            .map_or(0, |process| {
                process
                    .accumulated_cpu_time()
                    .saturating_sub(self.start_cpu_time)
            })
    }

    fn update_system_info(&mut self, process_refresh_kind: ProcessRefreshKind) {
        if let Some(pid) = self.process_id {
            if self.system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                process_refresh_kind,
            ) < 1
            {
                error!("could not refresh process statistics");
            }
        }
    }

    pub fn compute_final_statistics(
        &mut self,
        population: usize,
        ticks: usize,
    ) -> ExecutionStatistics {
        let mut cpu_time_millis = 0;
        self.update_system_info(ProcessRefreshKind::nothing().with_cpu().with_memory());
        if let Some(process) = self.process_id.and_then(|pid| self.system.process(pid)) {
            self.max_memory_usage = self.max_memory_usage.max(process.memory());
            cpu_time_millis = process
                .accumulated_cpu_time()
                .saturating_sub(self.start_cpu_time);
        }

        let cpu_time = Duration::from_millis(cpu_time_millis);
        let wall_time = self.start_time.elapsed();

        let per = |total: Duration, count: usize| {
            if count > 0 {
                Duration::from_secs_f64(total.as_secs_f64() / count as f64)
            } else {
                Duration::ZERO
            }
        };

        ExecutionStatistics {
            max_memory_usage: self.max_memory_usage,
            cpu_time,
            wall_time,
            population,
            ticks,
            memory_per_agent: if population > 0 {
                self.max_memory_usage / population as u64
            } else {
                0
            },
            wall_time_per_agent: per(wall_time, population),
            wall_time_per_tick: per(wall_time, ticks),
            cpu_time_per_tick: per(cpu_time, ticks),
        }
    }
}

impl Default for ExecutionProfilingCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Prints execution statistics to the console.
pub fn print_execution_statistics(summary: &ExecutionStatistics) {
    println!("━━━━ Execution Summary ━━━━");
    if summary.max_memory_usage == 0 {
        println!("Memory and CPU statistics are not available on your platform.");
    } else {
        println!(
            "{:<25}{}",
            "Max memory usage:",
            ByteSize::b(summary.max_memory_usage)
        );
        println!("{:<25}{}", "CPU time:", format_duration(summary.cpu_time));
    }
    println!("{:<25}{}", "Wall time:", format_duration(summary.wall_time));

    if summary.population > 0 {
        println!("{:<25}{}", "Population:", summary.population);
        if summary.max_memory_usage > 0 {
            println!(
                "{:<25}{}",
                "Memory per agent:",
                ByteSize::b(summary.memory_per_agent)
            );
        }
        println!(
            "{:<25}{}",
            "Wall time per agent:",
            format_duration(summary.wall_time_per_agent)
        );
    }
    if summary.ticks > 0 {
        println!("{:<25}{}", "Ticks:", summary.ticks);
        println!(
            "{:<25}{}",
            "Wall time per tick:",
            format_duration(summary.wall_time_per_tick)
        );
        if summary.max_memory_usage > 0 {
            println!(
                "{:<25}{}",
                "CPU time per tick:",
                format_duration(summary.cpu_time_per_tick)
            );
        }
    }
}

/// Logs execution statistics at `info` level.
pub fn log_execution_statistics(stats: &ExecutionStatistics) {
    info!("Execution complete.");
    if stats.max_memory_usage == 0 {
        info!("Memory and CPU statistics are not available on your platform.");
    } else {
        info!("Max memory usage: {}", ByteSize::b(stats.max_memory_usage));
        info!("CPU time: {}", format_duration(stats.cpu_time));
    }
    info!("Wall time: {}", format_duration(stats.wall_time));
    info!(
        "Population: {}, ticks: {}, wall time per tick: {}",
        stats.population,
        stats.ticks,
        format_duration(stats.wall_time_per_tick)
    );
}
