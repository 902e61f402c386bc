pub mod clock;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod service;
pub mod stats;

pub use domain::{
    Category, CheckIn, CheckInReport, JournalEntry, MetricType, NewCheckIn, NewTask,
    ReplayState, Task, TaskPatch, User,
};
pub use engine::{CheckInOutcome, ReplayOffer, REPLAY_RETRY_WINDOW_MINUTES};
pub use error::{DomainError, DomainResult};
pub use ports::{PortError, PortResult, ProfileStore, TaskStore};
pub use service::{CheckInReceipt, CheckInService, PendingCheckIn, StatsOverview, TaskStatsEntry};
pub use stats::{DayActivity, GlobalStats, TaskStats};
