use core::fmt::Write;

use atat::asynch::AtatClient;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Timer;
use heapless::String;

use super::Ril;
use crate::command::bounded;
use crate::command::psn::{
    EnterDataState, GetPdpContextDefinition, GetPdpContextState, SetMinimumQos,
    SetPacketDomainEventReporting, SetPdpContextDefinition, SetPdpContextState, SetRequestedQos,
    MAX_APN_LEN, MAX_PDP_TYPE_LEN,
};
use crate::config::{DataBearer, RilConfig};
use crate::data_call::{reconcile, Addressing, DataCallList, DnsList};
use crate::error::{Error, RequestError};
use crate::host::{Event, Host, InstanceId};
use crate::request::SetupDataCall;
use crate::response::Response;

/// Context brought up by a data call setup.
const DATA_CID: u8 = 1;

impl<M: RawMutex, AT: AtatClient, H: Host, C: RilConfig> Ril<M, AT, H, C> {
    /// DNS servers reported with every data call.
    ///
    /// In the emulator these come from `net.<iface>.dns1` onwards, skipping
    /// unset entries. Everywhere else the fallback pair is used.
    pub(crate) fn dns_servers(&self) -> Result<DnsList, Error> {
        if !self.config.is_emulator() {
            return DnsList::try_from(C::FALLBACK_DNS).map_err(|_| Error::Overflow);
        }

        let mut dnses = DnsList::new();
        for n in 1..=C::DNS_SERVER_COUNT {
            let mut key: String<64> = String::new();
            write!(key, "net.{}.dns{}", C::DATA_INTERFACE, n).map_err(|_| Error::Overflow)?;

            let Some(value) = self.config.property(&key).filter(|v| !v.is_empty()) else {
                continue;
            };

            if !dnses.is_empty() {
                dnses.push(' ').map_err(|_| Error::Overflow)?;
            }
            dnses.push_str(&value).map_err(|_| Error::Overflow)?;
        }

        Ok(dnses)
    }

    /// Reads both context tables and merges them.
    pub(crate) async fn data_calls(&self) -> Result<DataCallList, Error> {
        let activations = self.send(&GetPdpContextState).await?;
        let definitions = self.send(&GetPdpContextDefinition).await?;

        let dnses = self.dns_servers()?;
        let gateways = if self.config.is_emulator() {
            C::EMULATOR_GATEWAY
        } else {
            ""
        };

        let addressing = Addressing {
            ifname: C::DATA_INTERFACE,
            dnses: &dnses,
            gateways,
        };

        Ok(reconcile(
            activations.prefixed("+CGACT:"),
            definitions.prefixed("+CGDCONT:"),
            &addressing,
        )?)
    }

    pub(crate) async fn data_call_list(&self) -> Result<Response, RequestError> {
        Ok(Response::DataCalls(self.data_calls().await?))
    }

    /// Unsolicited refresh. A failed read is reported as an empty list.
    pub(crate) async fn report_data_calls(&self, instance: InstanceId) {
        let calls = self.data_calls().await.unwrap_or_else(|e| {
            warn!("[{}] data call list unavailable: {:?}", instance.id(), e);
            DataCallList::new()
        });
        self.notify(instance, Event::DataCallListChanged(calls));
    }

    pub(crate) async fn setup_data_call(
        &self,
        req: &SetupDataCall<'_>,
    ) -> Result<Response, RequestError> {
        #[cfg(feature = "ti-commands")]
        {
            use crate::command::vendor::{RouteDataToUart, MULTISLOT_CLASS_10};

            self.send_unchecked(&MULTISLOT_CLASS_10).await?;
            self.send_unchecked(&RouteDataToUart).await?;
        }

        match self.config.bearer() {
            Some(bearer) => {
                if let Err(e) = self.bring_up_bearer(bearer, req.apn).await {
                    error!("Data bearer failed: {:?}", e);
                    return Err(RequestError::GenericFailure);
                }
            }
            None => {
                let definition = SetPdpContextDefinition {
                    cid: DATA_CID,
                    pdp_type: bounded(req.pdp_type.unwrap_or("IP"), MAX_PDP_TYPE_LEN)?,
                    apn: bounded(req.apn, MAX_APN_LEN)?,
                    pdp_addr: "",
                    d_comp: 0,
                    h_comp: 0,
                };
                self.send_unchecked(&definition).await?;
                self.send_unchecked(&SetRequestedQos { cid: DATA_CID }).await?;
                self.send_unchecked(&SetMinimumQos { cid: DATA_CID }).await?;
                self.send_unchecked(&SetPacketDomainEventReporting { mode: 1, bfr: 0 })
                    .await?;
                self.send_unchecked(&SetPdpContextState { state: 1, cid: 0 })
                    .await?;

                self.send(&EnterDataState { cid: DATA_CID }).await?;
            }
        }

        self.data_call_list().await
    }

    async fn bring_up_bearer(&self, bearer: &C::Bearer, apn: &str) -> Result<(), Error> {
        bearer.request_up(apn).await?;

        for attempt in 1..=C::BEARER_ATTEMPTS {
            Timer::after(C::BEARER_POLL_INTERVAL).await;

            let status = bearer.status().await?;
            if status.starts_with("STATE=up") || status == "online" {
                debug!("Data bearer up after {} polls", attempt);
                return bearer.configure_interface().await;
            }
            trace!("Data bearer status: {}", status.as_str());
        }

        Err(Error::Bearer)
    }
}
