//! Adaptive quality control.
//!
//! The controller watches two signals. Frame times are recorded every frame into a bounded
//! history, and every `evaluation_interval` frames the average frame rate is compared with the
//! target: a deficit larger than the margin drops quality one level, a surplus larger than the
//! margin raises it one level, but only while the device is thermally nominal. Thermal state
//! changes act immediately: each state caps quality at a ceiling, and an escalation that puts the
//! current level above the new ceiling drops straight to it. Cooling down lifts the ceiling
//! without raising quality; any recovery goes through the gradual frame-rate path.
//!
//! | Thermal state | Quality ceiling |
//! |---------------|-----------------|
//! | Nominal       | High            |
//! | Fair          | Medium          |
//! | Serious       | Low             |
//! | Critical      | Minimal         |

use std::{collections::VecDeque, fmt};

use log::{info, warn};
use serde::Deserialize;

use crate::core::{config::QualityConfig, time::is_valid_delta};

/// Frame rate shortfall, below target, that raises a low FPS warning.
const LOW_FPS_WARNING_MARGIN: f64 = 10.0;

/// Multiple of the target frame time that raises a high frame time warning.
const HIGH_FRAME_TIME_FACTOR: f64 = 1.5;

/// Frame time variance, in squared milliseconds, that raises a variance warning.
const VARIANCE_WARNING_MS2: f64 = 5.0;

/// Samples needed before variance is reported. Smaller histories report once full.
const VARIANCE_MIN_SAMPLES: usize = 10;

/// Fraction of the target frame rate under which low FPS becomes critical.
const CRITICAL_FPS_RATIO: f64 = 2.0 / 3.0;

/// Multiple of the target frame time over which a slow frame becomes critical.
const CRITICAL_FRAME_TIME_FACTOR: f64 = 1.8;

/// Discrete rendering quality, ordered from cheapest to richest.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Minimal,
    Low,
    Medium,
    #[default]
    High,
}

impl QualityLevel {
    /// One level down, or `None` at the bottom.
    pub fn lower(self) -> Option<Self> {
        match self {
            QualityLevel::Minimal => None,
            QualityLevel::Low => Some(QualityLevel::Minimal),
            QualityLevel::Medium => Some(QualityLevel::Low),
            QualityLevel::High => Some(QualityLevel::Medium),
        }
    }

    /// One level up, or `None` at the top.
    pub fn higher(self) -> Option<Self> {
        match self {
            QualityLevel::Minimal => Some(QualityLevel::Low),
            QualityLevel::Low => Some(QualityLevel::Medium),
            QualityLevel::Medium => Some(QualityLevel::High),
            QualityLevel::High => None,
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QualityLevel::Minimal => "Minimal",
            QualityLevel::Low => "Low",
            QualityLevel::Medium => "Medium",
            QualityLevel::High => "High",
        };
        f.write_str(name)
    }
}

/// Device thermal pressure, as reported by the platform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ThermalState {
    #[default]
    Nominal,
    Fair,
    Serious,
    Critical,
}

impl ThermalState {
    /// The highest quality level allowed in this state.
    pub fn ceiling(self) -> QualityLevel {
        match self {
            ThermalState::Nominal => QualityLevel::High,
            ThermalState::Fair => QualityLevel::Medium,
            ThermalState::Serious => QualityLevel::Low,
            ThermalState::Critical => QualityLevel::Minimal,
        }
    }

    /// Serious and critical states mean the platform is throttling.
    pub fn is_throttling(self) -> bool {
        self >= ThermalState::Serious
    }
}

impl fmt::Display for ThermalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ThermalState::Nominal => "Nominal",
            ThermalState::Fair => "Fair",
            ThermalState::Serious => "Serious",
            ThermalState::Critical => "Critical",
        };
        f.write_str(name)
    }
}

/// What triggered a quality change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeCause {
    FrameRate,
    Thermal,
}

/// A quality level transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityChange {
    pub from: QualityLevel,
    pub to: QualityLevel,
    pub cause: ChangeCause,
}

impl fmt::Display for QualityChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cause = match self.cause {
            ChangeCause::FrameRate => "frame rate",
            ChangeCause::Thermal => "thermal state",
        };
        write!(f, "{} -> {} ({cause})", self.from, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// A performance problem observed in the recorded history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerformanceWarning {
    /// Average frames per second well under target.
    LowFps(f64),
    /// Latest frame time, in milliseconds, well over the target frame time.
    HighFrameTime(f64),
    ThermalThrottling(ThermalState),
    /// Frame time variance in squared milliseconds.
    HighFrameTimeVariance(f64),
}

impl PerformanceWarning {
    /// Severity relative to the frame rate the controller is aiming for.
    pub fn severity(&self, target_fps: f64) -> Severity {
        let target_ms = if target_fps > 0.0 {
            1000.0 / target_fps
        } else {
            f64::INFINITY
        };
        match *self {
            PerformanceWarning::LowFps(fps) if fps < target_fps * CRITICAL_FPS_RATIO => {
                Severity::Critical
            }
            PerformanceWarning::HighFrameTime(ms) if ms > target_ms * CRITICAL_FRAME_TIME_FACTOR => {
                Severity::Critical
            }
            PerformanceWarning::ThermalThrottling(ThermalState::Critical) => Severity::Critical,
            PerformanceWarning::HighFrameTimeVariance(_) => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for PerformanceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceWarning::LowFps(fps) => write!(f, "Low FPS: {fps:.1} fps"),
            PerformanceWarning::HighFrameTime(ms) => write!(f, "High frame time: {ms:.2} ms"),
            PerformanceWarning::ThermalThrottling(state) => {
                write!(f, "Thermal throttling: {state}")
            }
            PerformanceWarning::HighFrameTimeVariance(variance) => {
                write!(f, "Frame time variance: {variance:.2} ms^2")
            }
        }
    }
}

/// A snapshot of the controller. Frame times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub fps: f64,
    pub target_fps: f64,
    pub average_frame_time: f64,
    /// Shortest frame in the current history.
    pub min_frame_time: f64,
    /// Longest frame in the current history.
    pub max_frame_time: f64,
    pub quality_level: QualityLevel,
    pub thermal_state: ThermalState,
    pub warnings: Vec<PerformanceWarning>,
}

impl fmt::Display for PerformanceMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Performance Report ===")?;
        writeln!(f, "FPS: {:.1} (target {:.0})", self.fps, self.target_fps)?;
        writeln!(
            f,
            "Frame time: avg {:.2} ms, min {:.2} ms, max {:.2} ms",
            self.average_frame_time * 1000.0,
            self.min_frame_time * 1000.0,
            self.max_frame_time * 1000.0
        )?;
        writeln!(f, "Quality: {}", self.quality_level)?;
        writeln!(f, "Thermal state: {}", self.thermal_state)?;
        if self.warnings.is_empty() {
            write!(f, "No active performance warnings")
        } else {
            write!(f, "Active warnings:")?;
            for warning in &self.warnings {
                write!(f, "\n  - {warning}")?;
            }
            Ok(())
        }
    }
}

/// Closed-loop controller choosing a [`QualityLevel`] from frame times and thermal state.
#[derive(Debug, Clone)]
pub struct QualityController {
    target_fps: f64,
    config: QualityConfig,
    /// Recent frame times in seconds, oldest first.
    history: VecDeque<f64>,
    frames_since_evaluation: u32,
    level: QualityLevel,
    thermal: ThermalState,
}

impl QualityController {
    pub fn new(target_fps: f64, config: QualityConfig) -> Self {
        Self {
            target_fps,
            history: VecDeque::with_capacity(config.history_capacity),
            frames_since_evaluation: 0,
            level: config.initial_level,
            thermal: ThermalState::Nominal,
            config,
        }
    }

    #[inline]
    pub fn level(&self) -> QualityLevel {
        self.level
    }

    #[inline]
    pub fn thermal_state(&self) -> ThermalState {
        self.thermal
    }

    #[inline]
    pub fn target_fps(&self) -> f64 {
        self.target_fps
    }

    /// Mean of the recorded frame times, or zero with no history.
    pub fn average_frame_time(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f64>() / self.history.len() as f64
    }

    /// Frames per second derived from the average frame time.
    pub fn average_fps(&self) -> f64 {
        let average = self.average_frame_time();
        if average > 0.0 { 1.0 / average } else { 0.0 }
    }

    /// Record one frame time. Every `evaluation_interval` frames the frame rate is evaluated and
    /// quality may move one level. Invalid frame times are ignored.
    pub fn record_frame_time(&mut self, frame_time: f64) -> Option<QualityChange> {
        if !is_valid_delta(frame_time) {
            return None;
        }
        if self.history.len() >= self.config.history_capacity.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(frame_time);

        self.frames_since_evaluation += 1;
        if self.frames_since_evaluation < self.config.evaluation_interval.max(1) {
            return None;
        }
        self.frames_since_evaluation = 0;
        self.evaluate()
    }

    fn evaluate(&mut self) -> Option<QualityChange> {
        let fps = self.average_fps();
        let margin = self.config.fps_margin;
        let next = if fps < self.target_fps - margin {
            self.level.lower()
        } else if fps > self.target_fps + margin && self.thermal == ThermalState::Nominal {
            self.level
                .higher()
                .filter(|higher| *higher <= self.thermal.ceiling())
        } else {
            None
        };
        next.map(|to| self.change_to(to, ChangeCause::FrameRate))
    }

    /// Apply a thermal notification. Escalation above the current ceiling drops quality at once;
    /// de-escalation never raises it.
    pub fn set_thermal_state(&mut self, state: ThermalState) -> Option<QualityChange> {
        if state == self.thermal {
            return None;
        }
        if state > self.thermal && state.is_throttling() {
            warn!("Thermal state escalated to {state}");
        } else {
            info!("Thermal state changed to {state}");
        }
        self.thermal = state;

        let ceiling = state.ceiling();
        (self.level > ceiling).then(|| self.change_to(ceiling, ChangeCause::Thermal))
    }

    fn change_to(&mut self, to: QualityLevel, cause: ChangeCause) -> QualityChange {
        let change = QualityChange {
            from: self.level,
            to,
            cause,
        };
        self.level = to;
        change
    }

    /// Current warnings, computed from the recorded history.
    pub fn warnings(&self) -> Vec<PerformanceWarning> {
        let mut warnings = Vec::new();
        let Some(&latest) = self.history.back() else {
            if self.thermal.is_throttling() {
                warnings.push(PerformanceWarning::ThermalThrottling(self.thermal));
            }
            return warnings;
        };

        let fps = self.average_fps();
        if fps < self.target_fps - LOW_FPS_WARNING_MARGIN {
            warnings.push(PerformanceWarning::LowFps(fps));
        }
        if self.target_fps > 0.0 && latest > HIGH_FRAME_TIME_FACTOR / self.target_fps {
            warnings.push(PerformanceWarning::HighFrameTime(latest * 1000.0));
        }
        if self.thermal.is_throttling() {
            warnings.push(PerformanceWarning::ThermalThrottling(self.thermal));
        }
        let needed = VARIANCE_MIN_SAMPLES.min(self.config.history_capacity.max(2));
        if self.history.len() >= needed {
            let variance = self.variance_ms2();
            if variance > VARIANCE_WARNING_MS2 {
                warnings.push(PerformanceWarning::HighFrameTimeVariance(variance));
            }
        }
        warnings
    }

    fn variance_ms2(&self) -> f64 {
        let mean = self.average_frame_time() * 1000.0;
        self.history
            .iter()
            .map(|t| (t * 1000.0 - mean).powi(2))
            .sum::<f64>()
            / self.history.len() as f64
    }

    /// Shortest and longest frame times in the history, or zeros with no history.
    pub fn frame_time_range(&self) -> (f64, f64) {
        if self.history.is_empty() {
            return (0.0, 0.0);
        }
        self.history
            .iter()
            .fold((f64::INFINITY, 0.0_f64), |(min, max), &t| (min.min(t), max.max(t)))
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        let (min_frame_time, max_frame_time) = self.frame_time_range();
        PerformanceMetrics {
            fps: self.average_fps(),
            target_fps: self.target_fps,
            average_frame_time: self.average_frame_time(),
            min_frame_time,
            max_frame_time,
            quality_level: self.level,
            thermal_state: self.thermal,
            warnings: self.warnings(),
        }
    }

    /// Forget the frame history. Quality level and thermal state are kept.
    pub fn reset(&mut self) {
        self.history.clear();
        self.frames_since_evaluation = 0;
    }
}
