use futures::stream::{self, BoxStream, StreamExt};
use rivalbat_core::{DeviceState, IndicatorError, PowerReading, Result};
use std::future::Future;
use tracing::{debug, info, warn};

/// UPower's aggregate "display device": the battery the desktop shows.
/// See <https://upower.freedesktop.org/docs/Device.html>.
#[zbus::proxy(
    interface = "org.freedesktop.UPower.Device",
    default_service = "org.freedesktop.UPower",
    default_path = "/org/freedesktop/UPower/devices/DisplayDevice",
    gen_blocking = false
)]
pub trait DisplayDevice {
    #[zbus(property)]
    fn percentage(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn state(&self) -> zbus::Result<u32>;

    #[zbus(property)]
    fn is_present(&self) -> zbus::Result<bool>;
}

/// Something that can report a generic system battery reading.
pub trait PowerSource {
    /// `None` when the source is unreachable or reports nothing useful.
    fn display_device(&self) -> impl Future<Output = Option<PowerReading>> + Send;
}

/// Client for the UPower daemon on the system bus.
#[derive(Clone)]
pub struct UpowerClient {
    proxy: DisplayDeviceProxy<'static>,
}

impl UpowerClient {
    /// Connect to the system bus and bind the display device proxy.
    pub async fn connect() -> Result<Self> {
        let conn = zbus::Connection::system().await.map_err(dbus_error)?;
        let proxy = DisplayDeviceProxy::new(&conn).await.map_err(dbus_error)?;
        info!("Connected to UPower display device");
        Ok(Self { proxy })
    }

    /// Read the three properties the indicator needs.
    pub async fn read(&self) -> Result<PowerReading> {
        let percentage = self.proxy.percentage().await.map_err(dbus_error)?;
        let state      = self.proxy.state().await.map_err(dbus_error)?;
        let is_present = self.proxy.is_present().await.map_err(dbus_error)?;

        Ok(PowerReading {
            percentage,
            state: DeviceState::from_raw(state),
            is_present,
        })
    }

    /// A stream that yields once per change of `Percentage`, `State` or
    /// `IsPresent`.
    pub async fn changes(&self) -> BoxStream<'static, ()> {
        let percentage = self.proxy.receive_percentage_changed().await.map(|_| ());
        let state      = self.proxy.receive_state_changed().await.map(|_| ());
        let present    = self.proxy.receive_is_present_changed().await.map(|_| ());

        stream::select_all([percentage.boxed(), state.boxed(), present.boxed()]).boxed()
    }
}

impl PowerSource for UpowerClient {
    async fn display_device(&self) -> Option<PowerReading> {
        match self.read().await {
            Ok(reading) => {
                debug!(?reading, "UPower display device");
                Some(reading)
            }
            Err(e) => {
                warn!("UPower query failed: {e}");
                None
            }
        }
    }
}

fn dbus_error(e: zbus::Error) -> IndicatorError {
    IndicatorError::Dbus(e.to_string())
}
