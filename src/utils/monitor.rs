use std::time::Duration;
#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::Instant;
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// 單一階段結束時的資源快照
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseSample {
    pub phase: String,
    pub rows: usize,
    pub duration: Duration,
    pub cpu_usage: f32,
    pub memory_mb: u64,
}

impl PhaseSample {
    pub fn rows_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.rows as f64 / secs
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total_time: Duration,
    pub peak_memory_mb: u64,
    pub slowest_phase: String,
}

/// Folds the recorded phases into totals; `None` when nothing was recorded.
pub fn summarize(samples: &[PhaseSample]) -> Option<RunSummary> {
    let slowest = samples.iter().max_by_key(|s| s.duration)?;
    Some(RunSummary {
        total_time: samples.iter().map(|s| s.duration).sum(),
        peak_memory_mb: samples.iter().map(|s| s.memory_mb).max().unwrap_or(0),
        slowest_phase: slowest.phase.clone(),
    })
}

/// 記錄 extract / transform / load 各階段的處理量、CPU 與記憶體
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    phase_started: Mutex<Instant>,
    samples: Mutex<Vec<PhaseSample>>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => Some(pid),
                Err(e) => {
                    tracing::warn!("Resource monitoring unavailable: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let mut system = System::new();
        if let Some(pid) = pid {
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::everything(),
            );
        }

        Self {
            system: Mutex::new(system),
            pid,
            phase_started: Mutex::new(Instant::now()),
            samples: Mutex::new(Vec::new()),
        }
    }

    pub fn start(&self) {
        if let Ok(mut started) = self.phase_started.lock() {
            *started = Instant::now();
        }
    }

    /// Closes the current phase and logs how many rows it handled.
    pub fn finish_phase(&self, phase: &str, rows: usize) {
        let Some(sample) = self.sample(phase, rows) else {
            return;
        };

        tracing::info!(
            "📊 {} - {} row(s) in {:?} ({:.0} rows/s), CPU: {:.1}%, Memory: {}MB",
            sample.phase,
            sample.rows,
            sample.duration,
            sample.rows_per_second(),
            sample.cpu_usage,
            sample.memory_mb
        );

        if let Ok(mut samples) = self.samples.lock() {
            samples.push(sample);
        }
    }

    pub fn log_summary(&self) {
        let Ok(samples) = self.samples.lock() else {
            return;
        };
        if let Some(summary) = summarize(&samples) {
            tracing::info!(
                "📊 Run finished in {:?}, Peak Memory: {}MB, Slowest Phase: {}",
                summary.total_time,
                summary.peak_memory_mb,
                summary.slowest_phase
            );
        }
    }

    fn sample(&self, phase: &str, rows: usize) -> Option<PhaseSample> {
        let pid = self.pid?;

        let duration = {
            let mut started = self.phase_started.lock().ok()?;
            let elapsed = started.elapsed();
            *started = Instant::now();
            elapsed
        };

        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        let process = system.process(pid)?;

        Some(PhaseSample {
            phase: phase.to_string(),
            rows,
            duration,
            cpu_usage: process.cpu_usage(),
            memory_mb: process.memory() / 1024 / 1024,
        })
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn start(&self) {}

    pub fn finish_phase(&self, _phase: &str, _rows: usize) {}

    pub fn log_summary(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(phase: &str, rows: usize, millis: u64, memory_mb: u64) -> PhaseSample {
        PhaseSample {
            phase: phase.to_string(),
            rows,
            duration: Duration::from_millis(millis),
            cpu_usage: 0.0,
            memory_mb,
        }
    }

    #[test]
    fn test_summarize_phases() {
        let samples = vec![
            sample("Extract", 840, 120, 30),
            sample("Transform", 840, 40, 42),
            sample("Load", 840, 300, 38),
        ];

        let summary = summarize(&samples).unwrap();
        assert_eq!(summary.total_time, Duration::from_millis(460));
        assert_eq!(summary.peak_memory_mb, 42);
        assert_eq!(summary.slowest_phase, "Load");
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_rows_per_second() {
        assert_eq!(sample("Extract", 500, 250, 0).rows_per_second(), 2000.0);
        assert_eq!(sample("Extract", 500, 0, 0).rows_per_second(), 0.0);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_disabled_monitor_records_nothing() {
        let monitor = SystemMonitor::new(false);
        monitor.finish_phase("Extract", 10);
        assert!(monitor.samples.lock().unwrap().is_empty());
    }
}
