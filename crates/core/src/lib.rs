pub mod error;
pub mod event;
pub mod state;

pub use error::{IndicatorError, Result};
pub use event::Trigger;
pub use state::{
    BatteryStatus, ChargeState, DeviceState, ParsedStatus, PowerReading, ResolveConfig, Source,
};
