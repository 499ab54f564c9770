//! Battery-status probing: external commands, output scraping and the UPower
//! display device.
//!
//! The [`resolver`] walks an ordered list of `rivalcfg` / script invocations
//! and returns the first non-blank output; the [`parser`] scrapes a
//! percentage and charge state out of it; [`upower`] is the last resort.

pub mod command;
pub mod parser;
pub mod resolver;
pub mod upower;

pub use command::{CommandAttempt, CommandResult, CommandRunner, ProcessRunner, Strategy};
pub use parser::parse;
pub use resolver::{locate_rivalcfg, plan, resolve, Resolution};
pub use upower::{PowerSource, UpowerClient};
