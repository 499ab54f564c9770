/// Everything that can cause the daemon to run a refresh.
///
/// Sources:
/// - Refresh timer        → `Tick`
/// - Config watcher task  → `ConfigChanged`
/// - UPower property stream → `PowerChanged`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First refresh right after launch.
    Startup,
    /// Periodic timer fired.
    Tick,
    /// Config file changed on disk; reload before refreshing.
    ConfigChanged,
    /// The UPower display device reported a property change.
    PowerChanged,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Startup       => "startup",
            Self::Tick          => "tick",
            Self::ConfigChanged => "config-changed",
            Self::PowerChanged  => "power-changed",
        }
    }
}
