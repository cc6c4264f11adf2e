use embassy_time::Duration;
use heapless::String;

use crate::error::Error;

/// Longest property value.
pub const PROPERTY_VALUE_MAX: usize = 92;

pub type PropertyValue = String<PROPERTY_VALUE_MAX>;

/// Set when running inside the emulator.
pub const EMULATOR_PROPERTY: &str = "ro.kernel.qemu";

/// `dsds` or `dsda` enables the second logical instance.
pub const MULTI_INSTANCE_PROPERTY: &str = "persist.multisim.config";

/// Optional out-of-band device bringing up the packet data bearer, used
/// instead of dialing the modem's own PPP context.
#[allow(async_fn_in_trait)]
pub trait DataBearer {
    /// Ask the bearer to come up on `apn`.
    async fn request_up(&self, apn: &str) -> Result<(), Error>;

    /// Current status text, e.g. `STATE=up` or `online`.
    async fn status(&self) -> Result<String<64>, Error>;

    /// Configure the host network interface once the bearer is up.
    async fn configure_interface(&self) -> Result<(), Error>;
}

pub struct NoBearer;

impl DataBearer for NoBearer {
    async fn request_up(&self, _apn: &str) -> Result<(), Error> {
        Err(Error::Bearer)
    }

    async fn status(&self) -> Result<String<64>, Error> {
        Err(Error::Bearer)
    }

    async fn configure_interface(&self) -> Result<(), Error> {
        Err(Error::Bearer)
    }
}

pub trait RilConfig {
    type Bearer: DataBearer;

    /// Interface name reported for every data call.
    const DATA_INTERFACE: &'static str = "eth0";
    /// Gateway reported when running inside the emulator.
    const EMULATOR_GATEWAY: &'static str = "10.0.2.2";
    /// DNS servers reported outside the emulator.
    const FALLBACK_DNS: &'static str = "8.8.8.8 8.8.4.4";
    /// Number of `net.<iface>.dns<n>` properties read in the emulator.
    const DNS_SERVER_COUNT: u8 = 4;

    const SIM_POLL_INTERVAL: Duration = Duration::from_secs(1);
    const CALL_REPOLL_INTERVAL: Duration = Duration::from_millis(500);
    /// Upper bound on withheld call lists while an unannounced answer settles.
    const MAX_ERRONEOUS_ANSWER_REPOLLS: u8 = 4;

    const BEARER_ATTEMPTS: u8 = 10;
    const BEARER_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Key/value environment lookup. Empty values count as undefined.
    fn property(&self, key: &str) -> Option<PropertyValue>;

    fn bearer(&self) -> Option<&Self::Bearer> {
        None
    }

    fn is_emulator(&self) -> bool {
        self.property(EMULATOR_PROPERTY)
            .filter(|value| !value.is_empty())
            .is_some()
    }

    fn is_multi_instance(&self) -> bool {
        matches!(
            self.property(MULTI_INSTANCE_PROPERTY).as_deref(),
            Some("dsds") | Some("dsda")
        )
    }
}
