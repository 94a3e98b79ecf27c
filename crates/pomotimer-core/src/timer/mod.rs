pub mod driver;
mod engine;
mod indicator;
mod settings;
mod state;
mod ticker;

pub use engine::{Command, TimerEngine};
pub use indicator::{Indicator, IndicatorSequence};
pub use settings::{Settings, CYCLES_RANGE, LONG_BREAK_RANGE, SHORT_BREAK_RANGE, WORK_RANGE};
pub use state::{PhaseKind, TimerState};
pub use ticker::{TickHandle, Ticker, TICK_PERIOD};
