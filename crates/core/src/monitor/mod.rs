//! The monitor tasks that realize oven behavior.
//!
//! Every monitor is an indefinitely-running tokio task with the same shape:
//! sleep a fixed interval, run one short guarded step against the shared
//! state, repeat until the runtime's cancellation token fires. The cycle
//! timer is the exception: armed on demand, it disarms itself at zero.

pub mod announcer;
pub mod auto_resume;
pub mod cooling;
pub mod emergency;
pub mod lamp;
pub mod power;
pub mod schedule;
pub mod timer;
pub mod turntable;
