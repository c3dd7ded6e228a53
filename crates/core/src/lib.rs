//! Control core for a microwave oven appliance.
//!
//! A single [`state::OvenState`] record is shared between a set of periodic
//! monitor tasks and the operator [`dispatch::CommandDispatcher`]. All access
//! goes through [`state::StateCell`], which guarantees the guard is released
//! on every exit path; the multi-second cooling and auto-resume waits happen
//! with the lock released and commit their final transition afterwards.

pub mod config;
pub mod cycles;
pub mod dispatch;
pub mod monitor;
pub mod report;
pub mod runtime;
pub mod state;

pub use config::OvenCfg;
pub use runtime::Runtime;
