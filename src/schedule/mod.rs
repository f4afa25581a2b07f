//! Bank rate schedules and rate table loading

mod data;
pub mod loader;

pub use data::{Bank, BankSchedule, BankSchedules, RateTier};
pub use loader::{
    load_default_schedules, load_schedules, load_schedules_from_reader, DEFAULT_RATES_PATH,
};
