use rivalbat_config::IndicatorConfig;
use rivalbat_core::{BatteryStatus, ResolveConfig};
use rivalbat_probe::{locate_rivalcfg, parse, resolve, CommandRunner, PowerSource, Resolution};
use tracing::{debug, info, warn};

/// One refresh: commands, then parser, then UPower, then the "no battery"
/// diagnosis.
pub struct Pipeline<R, P> {
    runner: R,
    power:  Option<P>,
}

impl<R, P> Pipeline<R, P>
where
    R: CommandRunner + Sync,
    P: PowerSource + Sync,
{
    /// `power` is `None` when UPower could not be reached at startup.
    pub fn new(runner: R, power: Option<P>) -> Self {
        Self { runner, power }
    }

    pub async fn refresh(&self, config: &IndicatorConfig) -> BatteryStatus {
        let resolve_config = config.resolve_config();

        match resolve(&self.runner, &resolve_config).await {
            Resolution::Found { text, strategy } => {
                let source = strategy.source();
                match parse(&text) {
                    Some(parsed) => {
                        debug!(?parsed, strategy = strategy.as_str(), "Parsed battery output");
                        BatteryStatus::from_parsed(source, parsed)
                    }
                    None => {
                        warn!(strategy = strategy.as_str(), "Unrecognized battery output: {text}");
                        BatteryStatus::Unrecognized { source, raw: text }
                    }
                }
            }
            Resolution::Unavailable => self.fallback(config, &resolve_config).await,
        }
    }

    async fn fallback(&self, config: &IndicatorConfig, resolve_config: &ResolveConfig) -> BatteryStatus {
        if config.upower_fallback {
            if let Some(power) = &self.power {
                let status = power
                    .display_device()
                    .await
                    .and_then(|reading| BatteryStatus::from_power(&reading));
                if let Some(status) = status {
                    info!("rivalcfg unavailable; using UPower display device");
                    return status;
                }
                debug!("UPower reports no battery present");
            }
        }

        let rivalcfg_location = locate_rivalcfg(&self.runner, resolve_config).await;
        BatteryStatus::NoBattery { rivalcfg_location }
    }
}
