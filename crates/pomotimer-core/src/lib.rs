//! # pomotimer core library
//!
//! Business logic for a work/break cycle timer. The CLI binary is a thin
//! host over this crate: it builds one engine per process and forwards
//! user actions to it.
//!
//! ## Architecture
//!
//! - **Timer Engine**: the phase state machine. It is caller-driven: a host
//!   (usually [`timer::driver::run`]) feeds it one tick per second
//! - **Storage**: key-value persistence (SQLite or in-memory) with
//!   elapsed-time compensation on load, plus TOML configuration
//! - **Events**: synchronous, insertion-ordered state broadcasts
//! - **Notify**: outbound phase notifications
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Persistence`]: Snapshot save/load and rehydration
//! - [`Database`]: SQLite key-value store
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Subscribers, Subscription};
pub use notify::{NoopNotifier, NotificationPort, RecordingNotifier};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, Persistence};
pub use timer::{
    Command, Indicator, IndicatorSequence, PhaseKind, Settings, TickHandle, TimerEngine,
    TimerState,
};
