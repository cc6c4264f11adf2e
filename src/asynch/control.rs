use atat::asynch::AtatClient;
use atat::AtatCmd;
use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::Vec;

use super::state::RadioState;
use super::Ril;
use crate::card::SubscriptionStatus;
use crate::command::call_control::HoldAction;
use crate::command::general::{GetImei, GetImsi};
use crate::command::network_service::{
    GetNetworkRegistrationStatus, GetOperatorNames, GetOperatorSelection, GetSignalQuality,
    SetOperatorSelection,
};
use crate::command::psn::GetGprsRegistrationStatus;
use crate::command::sim::{RestrictedSimAccess, MAX_SIM_DATA_LEN};
use crate::command::sms::{
    DeleteMessage, NewMessageAck, PrepareSendMessage, PrepareWriteMessage, StorePdu, SubmitPdu,
};
use crate::command::supplementary::SetUssd;
use crate::command::{bounded, Line, Lines};
use crate::config::RilConfig;
use crate::data_call::{DataCallList, DataCallProfile};
use crate::error::RequestError;
use crate::host::{Event, Host, InstanceId, Token};
use crate::registration::{selection_mode_from_line, Operator, RegistrationState, SignalStrength};
use crate::request::{Request, RequestKind, SimIo};
use crate::response::{OemString, Response, SimData, SimIoResponse, SmsResponse};
use crate::tokenizer::ParseError;

/// EF ICCID
const ICCID_FILE_ID: u16 = 0x2FE2;
const READ_BINARY: u8 = 0xB0;
/// ICCID reported for the card behind the second instance, which shares the
/// first instance's physical SIM.
const SIMULATED_ICCID: &str = "88004433112288557700";

/// SMSC placeholder selecting the SIM's default service centre.
const DEFAULT_SMSC: &str = "00";

/// Request handle bound to one instance.
pub struct Control<'a, M: RawMutex, AT: AtatClient, H: Host, C: RilConfig> {
    ril: &'a Ril<M, AT, H, C>,
    instance: InstanceId,
}

impl<'a, M: RawMutex, AT: AtatClient, H: Host, C: RilConfig> Control<'a, M, AT, H, C> {
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    pub async fn dispatch(&self, request: Request<'_>, token: Token) {
        self.ril.dispatch(self.instance, request, token).await
    }

    pub fn query_state(&self) -> RadioState {
        self.ril.query_state(self.instance)
    }

    pub fn supports(&self, kind: RequestKind) -> bool {
        self.ril.supports(self.instance, kind)
    }

    pub fn cancel(&self, token: Token) {
        self.ril.cancel(self.instance, token)
    }

    pub fn version(&self) -> &'static str {
        self.ril.version()
    }
}

impl<M: RawMutex, AT: AtatClient, H: Host, C: RilConfig> Ril<M, AT, H, C> {
    /// Handle for a configured instance.
    pub fn control(&self, instance: InstanceId) -> Option<Control<'_, M, AT, H, C>> {
        self.instance(instance.id())
            .map(|instance| Control { ril: self, instance })
    }

    pub fn supports(&self, _instance: InstanceId, kind: RequestKind) -> bool {
        kind.is_supported()
    }

    /// Requests run to completion once dispatched.
    pub fn cancel(&self, instance: InstanceId, token: Token) {
        debug!("[{}] cancel of {:?} ignored", instance.id(), token);
    }

    /// Runs `request` and reports its outcome through [`Host::complete`],
    /// exactly once.
    pub async fn dispatch(&self, instance: InstanceId, request: Request<'_>, token: Token) {
        let kind = request.kind();
        debug!("[{}] request {:?} ({:?})", instance.id(), kind, token);

        let admitted = match self.state.radio_state(instance) {
            RadioState::Unavailable => kind.allowed_when_unavailable(),
            RadioState::Off => kind.allowed_when_off(),
            _ => true,
        };

        if !admitted {
            debug!("[{}] {:?} refused, radio not available", instance.id(), kind);
            self.complete(instance, token, Err(RequestError::RadioNotAvailable));
            return;
        }

        let result = self.handle(instance, &request).await;
        let succeeded = result.is_ok();
        self.complete(instance, token, result);

        if succeeded {
            self.after_completion(instance, &request);
        }
    }

    async fn handle(
        &self,
        instance: InstanceId,
        request: &Request<'_>,
    ) -> Result<Response, RequestError> {
        match *request {
            Request::GetSimStatus => self.card_status(instance).await,
            Request::SimPin(ref req) => self.enter_sim_pin(instance, req).await,
            Request::GetCurrentCalls => self.current_calls(instance).await,
            Request::Dial { address, clir } => self.dial(address, clir).await,
            Request::GetImsi => {
                self.query(&GetImsi, "", |line| Ok(Response::Imsi(copy_line(line)?)))
                    .await
            }
            Request::GetImei => {
                self.query(&GetImei, "", |line| Ok(Response::Imei(copy_line(line)?)))
                    .await
            }
            Request::Hangup { line } => self.hold(instance, HoldAction::Release(line)).await,
            Request::HangupWaitingOrBackground => {
                self.hold(instance, HoldAction::ReleaseHeldOrWaiting).await
            }
            Request::HangupForegroundResumeBackground => {
                self.hold(instance, HoldAction::ReleaseActiveAcceptOther)
                    .await
            }
            Request::SwitchWaitingOrHoldingAndActive => {
                self.hold(instance, HoldAction::HoldActiveAcceptOther).await
            }
            Request::Conference => self.hold(instance, HoldAction::Conference).await,
            Request::SeparateConnection { party } => {
                self.hold(instance, HoldAction::HoldAllExcept(party)).await
            }
            Request::Udub => self.reject_incoming().await,
            Request::Answer => self.answer(instance).await,
            Request::Dtmf { tone } => self.dtmf(tone).await,
            Request::SignalStrength => {
                self.query(&GetSignalQuality, "+CSQ:", |line| {
                    Ok(Response::SignalStrength(SignalStrength::from_line(line)?))
                })
                .await
            }
            Request::VoiceRegistrationState => {
                self.query(&GetNetworkRegistrationStatus, "+CREG:", |line| {
                    Ok(Response::Registration(RegistrationState::from_line(line)?))
                })
                .await
            }
            Request::DataRegistrationState => {
                self.query(&GetGprsRegistrationStatus, "+CGREG:", |line| {
                    Ok(Response::Registration(RegistrationState::from_line(line)?))
                })
                .await
            }
            Request::Operator => {
                let names = self.send(&GetOperatorNames).await?;
                Ok(Response::Operator(Operator::from_lines(names.prefixed("+COPS:"))?))
            }
            Request::QueryNetworkSelectionMode => {
                self.query(&GetOperatorSelection, "+COPS:", |line| {
                    Ok(Response::NetworkSelectionMode(selection_mode_from_line(line)?))
                })
                .await
            }
            Request::SetNetworkSelectionAutomatic => {
                self.send(&SetOperatorSelection { mode: 0 }).await?;
                Ok(Response::None)
            }
            Request::RadioPower { on } => self.set_radio_power(instance, on).await,
            Request::SendSms { smsc, pdu } => self.send_sms(smsc, pdu).await,
            Request::WriteSmsToSim { status, pdu } => self.write_sms(status, pdu).await,
            Request::DeleteSmsOnSim { index } => {
                self.send(&DeleteMessage { index }).await?;
                Ok(Response::None)
            }
            Request::SmsAcknowledge { success } => {
                self.send_unchecked(&NewMessageAck::new(success)).await?;
                Ok(Response::None)
            }
            Request::SimIo(ref io) => self.sim_io(instance, io).await,
            Request::SetupDataCall(ref req) => self.setup_data_call(req).await,
            Request::DataCallList => self.data_call_list().await,
            Request::GetDataCallProfile => {
                let mut profiles = Vec::new();
                profiles
                    .push(DataCallProfile {
                        profile_id: 1,
                        priority: 10,
                    })
                    .map_err(|_| RequestError::GenericFailure)?;
                Ok(Response::DataCallProfiles(profiles))
            }
            Request::CancelUssd => {
                self.send(&SetUssd { n: 2 })
                    .await
                    .map_err(|_| RequestError::GenericFailure)?;
                Ok(Response::None)
            }
            Request::OemHookRaw(data) => Vec::from_slice(data)
                .map(Response::OemHookRaw)
                .map_err(|_| RequestError::GenericFailure),
            Request::OemHookStrings(strings) => {
                let mut echoed = Vec::new();
                for s in strings {
                    trace!("OEM > '{}'", s);
                    let s = OemString::try_from(*s).map_err(|_| RequestError::GenericFailure)?;
                    echoed.push(s).map_err(|_| RequestError::GenericFailure)?;
                }
                Ok(Response::OemHookStrings(echoed))
            }
            Request::SetUiccSubscription(sub) => {
                let stored = self
                    .subscriptions
                    .lock(|subs| subs.borrow_mut().select(sub));
                if !stored {
                    return Err(RequestError::GenericFailure);
                }
                Ok(Response::None)
            }
            Request::SetDataSubscription
            | Request::GetUiccSubscription
            | Request::GetDataSubscription
            | Request::SetSubscriptionMode => Ok(Response::None),
            Request::SendUssd { .. } | Request::Unknown(_) => {
                Err(RequestError::RequestNotSupported)
            }
        }
    }

    /// Notifications that must follow the completion of `request`.
    fn after_completion(&self, instance: InstanceId, request: &Request<'_>) {
        match request {
            Request::SetUiccSubscription(sub) => {
                if sub.status == SubscriptionStatus::Activate {
                    self.notify(
                        instance,
                        Event::UiccSubscriptionStatusChanged { activated: true },
                    );
                }
                if let Some(slot) = InstanceId::new(sub.slot) {
                    self.notify(slot, Event::SimStatusChanged);
                }
            }
            Request::SetDataSubscription => {
                // Data moved away, everything on the peer is disconnected
                self.notify(
                    instance.other(),
                    Event::DataCallListChanged(DataCallList::new()),
                );
            }
            _ => {}
        }
    }

    /// Sends `cmd` and decodes the first reply line starting with `prefix`.
    async fn query<Cmd, F, const N: usize, const L: usize>(
        &self,
        cmd: &Cmd,
        prefix: &str,
        decode: F,
    ) -> Result<Response, RequestError>
    where
        Cmd: AtatCmd<Response = Lines<N, L>>,
        F: FnOnce(&str) -> Result<Response, ParseError>,
    {
        let reply = self.send(cmd).await?;
        Ok(decode(reply.first_prefixed(prefix)?)?)
    }

    async fn send_sms(&self, smsc: Option<&str>, pdu: &str) -> Result<Response, RequestError> {
        let submit = SubmitPdu::new(smsc.unwrap_or(DEFAULT_SMSC), pdu)?;
        let prepare = PrepareSendMessage {
            length: octets(pdu)?,
        };

        let sent = self.send_with_payload(&prepare, &submit).await?;
        Ok(Response::Sms(SmsResponse {
            reference: i32::from(sent.reference),
        }))
    }

    async fn write_sms(&self, status: u8, pdu: &str) -> Result<Response, RequestError> {
        let store = StorePdu::new(pdu)?;
        let prepare = PrepareWriteMessage {
            length: octets(pdu)?,
            status,
        };

        let stored = self.send_with_payload(&prepare, &store).await?;
        debug!("SMS stored at index {}", stored.index);
        Ok(Response::None)
    }

    async fn sim_io(&self, instance: InstanceId, io: &SimIo<'_>) -> Result<Response, RequestError> {
        let cmd = RestrictedSimAccess {
            command: io.command,
            file_id: io.file_id,
            p1: io.p1,
            p2: io.p2,
            p3: io.p3,
            data: io
                .data
                .map(|data| bounded(data, MAX_SIM_DATA_LEN))
                .transpose()?,
        };
        let reply = self.send(&cmd).await?;
        let mut sr = SimIoResponse::from_line(reply.first_prefixed("+CRSM:")?)?;

        if io.file_id == ICCID_FILE_ID && io.command == READ_BINARY {
            if instance == InstanceId::SECOND {
                sr.response = Some(
                    SimData::try_from(SIMULATED_ICCID).map_err(|_| RequestError::GenericFailure)?,
                );
            }
            debug!("[{}] ICCID read: {:?}", instance.id(), sr.response.as_deref());
        }

        Ok(Response::SimIo(sr))
    }
}

fn copy_line(line: &str) -> Result<Line, ParseError> {
    Line::try_from(line).map_err(|_| ParseError::InvalidField)
}

/// Octet count of a hex encoded TPDU.
fn octets(pdu: &str) -> Result<u16, RequestError> {
    u16::try_from(pdu.len() / 2).map_err(|_| RequestError::GenericFailure)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::asynch::test_support::TestRil;
    use crate::card::UiccSubscription;
    use crate::command::call_control::Clir;
    use crate::test_helpers::{RecordingHost, Reply, ScriptedModem, TestConfig};
    use embassy_futures::block_on;

    fn ril(modem: &ScriptedModem, config: TestConfig) -> TestRil {
        let ril = Ril::new(modem.clone(), RecordingHost::default(), config);
        for instance in [InstanceId::FIRST, InstanceId::SECOND] {
            ril.state.set_radio_state(instance, RadioState::SimReady);
        }
        ril
    }

    fn run(ril: &TestRil, instance: InstanceId, request: Request<'_>) -> Result<Response, RequestError> {
        block_on(ril.dispatch(instance, request, Token(42)));
        let mut completions = ril.host().completions();
        assert_eq!(completions.len(), 1, "exactly one completion");
        ril.host().take();
        completions.remove(0).2
    }

    #[test]
    fn unavailable_admits_status_queries_only() {
        let modem = ScriptedModem::new();
        let ril = Ril::new(modem.clone(), RecordingHost::default(), TestConfig::default());

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::Dial { address: "123", clir: Clir::Subscription }),
            Err(RequestError::RadioNotAvailable)
        );
        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::RadioPower { on: true }),
            Err(RequestError::RadioNotAvailable)
        );
        assert!(matches!(
            run(&ril, InstanceId::FIRST, Request::GetDataCallProfile),
            Ok(Response::DataCallProfiles(_))
        ));
        assert!(matches!(
            run(&ril, InstanceId::FIRST, Request::GetSimStatus),
            Ok(Response::CardStatus(_))
        ));
        assert!(modem.sent().is_empty());
    }

    #[test]
    fn off_admits_radio_power() {
        let modem = ScriptedModem::new();
        let ril = Ril::new(modem.clone(), RecordingHost::default(), TestConfig::default());
        ril.state.set_radio_state(InstanceId::FIRST, RadioState::Off);

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::GetCurrentCalls),
            Err(RequestError::RadioNotAvailable)
        );
        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::RadioPower { on: false }),
            Ok(Response::None)
        );
        assert!(modem.sent().is_empty());
    }

    #[test]
    fn unsupported_requests() {
        let ril = ril(&ScriptedModem::new(), TestConfig::default());

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::SendUssd { ussd: "*100#" }),
            Err(RequestError::RequestNotSupported)
        );
        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::Unknown(9999)),
            Err(RequestError::RequestNotSupported)
        );
        assert!(!ril.supports(InstanceId::FIRST, RequestKind::SendUssd));
        assert!(ril.supports(InstanceId::FIRST, RequestKind::CancelUssd));
    }

    #[test]
    fn registration_and_signal_queries() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CREG?", Reply::ok("+CREG: 2,1,\"00C3\",\"A13B\""));
        modem.reply("AT+CSQ", Reply::ok("+CSQ: 17,99"));
        modem.reply("AT+CGREG?", Reply::Error);
        let ril = ril(&modem, TestConfig::default());

        let Ok(Response::Registration(reg)) =
            run(&ril, InstanceId::FIRST, Request::VoiceRegistrationState)
        else {
            panic!("no registration");
        };
        assert_eq!(reg.stat, 1);
        assert_eq!(reg.cid, Some(0xA13B));

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::SignalStrength),
            Ok(Response::SignalStrength(SignalStrength {
                rssi: 17,
                bit_error_rate: 99
            }))
        );
        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::DataRegistrationState),
            Err(RequestError::GenericFailure)
        );
    }

    #[test]
    fn operator_names() {
        let modem = ScriptedModem::new();
        modem.reply(
            "AT+COPS=3,0;+COPS?;+COPS=3,1;+COPS?;+COPS=3,2;+COPS?",
            Reply::ok("+COPS: 0,0,\"Android\"\r\n+COPS: 0,1,\"Android\"\r\n+COPS: 0,2,\"310260\""),
        );
        let ril = ril(&modem, TestConfig::default());

        let Ok(Response::Operator(op)) = run(&ril, InstanceId::FIRST, Request::Operator) else {
            panic!("no operator");
        };
        assert_eq!(op.numeric.as_deref(), Some("310260"));
    }

    #[test]
    fn imsi_is_numeric_line() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CIMI", Reply::ok("310260000000000"));
        let ril = ril(&modem, TestConfig::default());

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::GetImsi),
            Ok(Response::Imsi(Line::try_from("310260000000000").unwrap()))
        );
    }

    #[test]
    fn sms_submit_two_phase() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CMGS=3", Reply::ok(""));
        modem.reply("00010203", Reply::ok("+CMGS: 5"));
        let ril = ril(&modem, TestConfig::default());

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::SendSms { smsc: None, pdu: "010203" }),
            Ok(Response::Sms(SmsResponse { reference: 5 }))
        );
        assert_eq!(modem.sent(), ["AT+CMGS=3", "00010203"]);
    }

    #[test]
    fn sms_submit_without_prompt() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CMGS=1", Reply::Error);
        let ril = ril(&modem, TestConfig::default());

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::SendSms { smsc: Some("00"), pdu: "01" }),
            Err(RequestError::GenericFailure)
        );
        assert_eq!(modem.sent(), ["AT+CMGS=1"]);
    }

    #[test]
    fn iccid_of_second_instance_is_simulated() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CRSM=176,12258,0,0,10", Reply::ok("+CRSM: 144,0,\"98101430121181157002\""));
        modem.reply("AT+CRSM=176,12258,0,0,10", Reply::ok("+CRSM: 144,0,\"98101430121181157002\""));
        let ril = ril(&modem, TestConfig::multi_instance());
        let io = SimIo {
            command: READ_BINARY,
            file_id: ICCID_FILE_ID,
            p1: 0,
            p2: 0,
            p3: 10,
            data: None,
        };

        let Ok(Response::SimIo(first)) = run(&ril, InstanceId::FIRST, Request::SimIo(io)) else {
            panic!("no sim io");
        };
        assert_eq!(first.response.as_deref(), Some("98101430121181157002"));

        let Ok(Response::SimIo(second)) = run(&ril, InstanceId::SECOND, Request::SimIo(io)) else {
            panic!("no sim io");
        };
        assert_eq!(second.response.as_deref(), Some(SIMULATED_ICCID));
    }

    #[test]
    fn full_sim_record() {
        let record = "A5".repeat(150);
        let modem = ScriptedModem::new();
        modem.reply(
            "AT+CRSM=178,28474,1,4,150",
            Reply::Ok(std::format!("+CRSM: 144,0,\"{}\"", record)),
        );
        let ril = ril(&modem, TestConfig::default());
        let io = SimIo {
            command: 0xB2,
            file_id: 0x6F3A,
            p1: 1,
            p2: 4,
            p3: 150,
            data: None,
        };

        let Ok(Response::SimIo(sr)) = run(&ril, InstanceId::FIRST, Request::SimIo(io)) else {
            panic!("no sim io");
        };
        assert_eq!(sr.sw1, 0x90);
        assert_eq!(sr.response.as_deref(), Some(record.as_str()));
        assert_eq!(ril.query_state(InstanceId::FIRST), RadioState::SimReady);
    }

    #[test]
    fn sim_update_is_quoted() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CRSM=220,28480,1,4,2,\"FFFF\"", Reply::ok("+CRSM: 144,0"));
        let ril = ril(&modem, TestConfig::default());
        let io = SimIo {
            command: 0xDC,
            file_id: 0x6F40,
            p1: 1,
            p2: 4,
            p3: 2,
            data: Some("FFFF"),
        };

        let Ok(Response::SimIo(sr)) = run(&ril, InstanceId::FIRST, Request::SimIo(io)) else {
            panic!("no sim io");
        };
        assert_eq!((sr.sw1, sr.sw2, sr.response), (0x90, 0, None));
    }

    #[test]
    fn sms_write_two_phase() {
        let modem = ScriptedModem::new();
        modem.reply("0100", Reply::ok("+CMGW: 7"));
        let ril = ril(&modem, TestConfig::default());

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::WriteSmsToSim { status: 1, pdu: "0100" }),
            Ok(Response::None)
        );
        assert_eq!(modem.sent(), ["AT+CMGW=2,1", "0100"]);
    }

    #[test]
    fn oem_hooks_echo() {
        let ril = ril(&ScriptedModem::new(), TestConfig::default());

        let Ok(Response::OemHookRaw(raw)) =
            run(&ril, InstanceId::FIRST, Request::OemHookRaw(&[1, 2, 3]))
        else {
            panic!("no echo");
        };
        assert_eq!(&raw[..], [1, 2, 3]);

        let Ok(Response::OemHookStrings(strings)) =
            run(&ril, InstanceId::FIRST, Request::OemHookStrings(&["a", "bc"]))
        else {
            panic!("no echo");
        };
        assert_eq!(strings.len(), 2);
        assert_eq!(strings[1], "bc");
    }

    #[test]
    fn uicc_subscription_completes_then_notifies() {
        let ril = ril(&ScriptedModem::new(), TestConfig::multi_instance());
        let sub = UiccSubscription {
            slot: 1,
            app_index: 0,
            sub_type: 1,
            status: SubscriptionStatus::Activate,
        };

        block_on(ril.dispatch(InstanceId::FIRST, Request::SetUiccSubscription(sub), Token(1)));

        assert_eq!(ril.host().completions(), [(InstanceId::FIRST, Token(1), Ok(Response::None))]);
        assert_eq!(
            ril.host().events(),
            [
                (
                    InstanceId::FIRST,
                    Event::UiccSubscriptionStatusChanged { activated: true }
                ),
                (InstanceId::SECOND, Event::SimStatusChanged),
            ]
        );
        assert!(ril.subscriptions.lock(|s| s.borrow().is_app_ready(1, 0)));
    }

    #[test]
    fn invalid_uicc_slot_fails() {
        let ril = ril(&ScriptedModem::new(), TestConfig::multi_instance());
        let sub = UiccSubscription {
            slot: 3,
            ..Default::default()
        };

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::SetUiccSubscription(sub)),
            Err(RequestError::GenericFailure)
        );
        assert!(ril.host().events().is_empty());
    }

    #[test]
    fn data_subscription_disconnects_peer() {
        let ril = ril(&ScriptedModem::new(), TestConfig::multi_instance());

        block_on(ril.dispatch(InstanceId::SECOND, Request::SetDataSubscription, Token(2)));

        assert_eq!(ril.host().completions(), [(InstanceId::SECOND, Token(2), Ok(Response::None))]);
        assert_eq!(
            ril.host().events(),
            [(InstanceId::FIRST, Event::DataCallListChanged(DataCallList::new()))]
        );
    }

    #[test]
    fn data_subscription_single_instance_drops_event() {
        let ril = ril(&ScriptedModem::new(), TestConfig::default());

        run(&ril, InstanceId::FIRST, Request::SetDataSubscription).unwrap();
        assert!(ril.host().events().is_empty());
    }

    #[test]
    fn cancel_ussd_failure() {
        let modem = ScriptedModem::new();
        modem.reply("AT+CUSD=2", Reply::Error);
        let ril = ril(&modem, TestConfig::default());

        assert_eq!(
            run(&ril, InstanceId::FIRST, Request::CancelUssd),
            Err(RequestError::GenericFailure)
        );
    }

    #[test]
    fn control_handle_is_instance_bound() {
        let ril = ril(&ScriptedModem::new(), TestConfig::default());

        assert!(ril.control(InstanceId::SECOND).is_none());
        let control = ril.control(InstanceId::FIRST).unwrap();
        assert_eq!(control.query_state(), RadioState::SimReady);
        assert!(control.version().starts_with("modem-ril "));
        control.cancel(Token(5));
    }
}
