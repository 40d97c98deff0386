// Library interface for ergrs modules
// This allows the CLI and integration tests to share the engine

pub mod analysis;
pub mod batch;
pub mod calendar;
pub mod config;
pub mod effort;
pub mod error;
pub mod export;
pub mod heart_rate;
pub mod import;
pub mod logging;
pub mod models;
pub mod power;
pub mod share;
pub mod zones;

// Re-export commonly used types for convenience
pub use analysis::{ScoredWorkout, WorkoutAnalysis, WorkoutAnalyzer};
pub use batch::{BatchConfig, BatchScorer, BatchSummary};
pub use calendar::{DailyEffort, EffortCalendar, WeeklyEffort};
pub use config::AppConfig;
pub use effort::{EffortBreakdown, EffortCalculator, EffortResult, EffortZone};
pub use error::{ErgRsError, Result};
pub use heart_rate::{HeartRateAnalysis, HeartRateAnalyzer, HraResult};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use share::share_text;
pub use zones::{HeartRateZones, HrZone, ZoneCalculator};
