//! Requests the host dispatches to an instance.

use crate::card::UiccSubscription;
use crate::command::call_control::Clir;

/// Which code a SIM PIN request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinKind {
    EnterPin,
    EnterPuk,
    EnterPin2,
    EnterPuk2,
    ChangePin,
    ChangePin2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinRequest<'a> {
    pub kind: PinKind,
    /// PIN, PUK or old PIN.
    pub code: &'a str,
    /// New PIN when unblocking or changing.
    pub new_code: Option<&'a str>,
}

/// 3GPP TS 51.011 SIM I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimIo<'a> {
    pub command: u8,
    pub file_id: u16,
    pub p1: u8,
    pub p2: u8,
    pub p3: u8,
    pub data: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupDataCall<'a> {
    pub apn: &'a str,
    /// Defaults to `IP`.
    pub pdp_type: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    GetSimStatus,
    SimPin(PinRequest<'a>),
    GetCurrentCalls,
    Dial { address: &'a str, clir: Clir },
    GetImsi,
    Hangup { line: u8 },
    HangupWaitingOrBackground,
    HangupForegroundResumeBackground,
    SwitchWaitingOrHoldingAndActive,
    Conference,
    Udub,
    SignalStrength,
    VoiceRegistrationState,
    DataRegistrationState,
    Operator,
    RadioPower { on: bool },
    Dtmf { tone: char },
    SendSms { smsc: Option<&'a str>, pdu: &'a str },
    SetupDataCall(SetupDataCall<'a>),
    SimIo(SimIo<'a>),
    SendUssd { ussd: &'a str },
    CancelUssd,
    SmsAcknowledge { success: bool },
    GetImei,
    Answer,
    QueryNetworkSelectionMode,
    SetNetworkSelectionAutomatic,
    DataCallList,
    OemHookRaw(&'a [u8]),
    OemHookStrings(&'a [&'a str]),
    WriteSmsToSim { status: u8, pdu: &'a str },
    DeleteSmsOnSim { index: u16 },
    SeparateConnection { party: u8 },
    GetDataCallProfile,
    SetUiccSubscription(UiccSubscription),
    SetDataSubscription,
    GetUiccSubscription,
    GetDataSubscription,
    SetSubscriptionMode,
    /// A request code this adapter has no handler for.
    Unknown(u32),
}

/// Payload-free discriminant of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestKind {
    GetSimStatus,
    SimPin,
    GetCurrentCalls,
    Dial,
    GetImsi,
    Hangup,
    HangupWaitingOrBackground,
    HangupForegroundResumeBackground,
    SwitchWaitingOrHoldingAndActive,
    Conference,
    Udub,
    SignalStrength,
    VoiceRegistrationState,
    DataRegistrationState,
    Operator,
    RadioPower,
    Dtmf,
    SendSms,
    SetupDataCall,
    SimIo,
    SendUssd,
    CancelUssd,
    SmsAcknowledge,
    GetImei,
    Answer,
    QueryNetworkSelectionMode,
    SetNetworkSelectionAutomatic,
    DataCallList,
    OemHookRaw,
    OemHookStrings,
    WriteSmsToSim,
    DeleteSmsOnSim,
    SeparateConnection,
    GetDataCallProfile,
    SetUiccSubscription,
    SetDataSubscription,
    GetUiccSubscription,
    GetDataSubscription,
    SetSubscriptionMode,
    Unknown(u32),
}

impl RequestKind {
    /// Requests served while the radio is unavailable.
    pub fn allowed_when_unavailable(self) -> bool {
        matches!(self, Self::GetSimStatus | Self::GetDataCallProfile)
    }

    /// Requests served while the radio is off.
    pub fn allowed_when_off(self) -> bool {
        self.allowed_when_unavailable() || self == Self::RadioPower
    }

    /// Whether a handler exists that can succeed.
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::SendUssd | Self::Unknown(_))
    }
}

impl Request<'_> {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::GetSimStatus => RequestKind::GetSimStatus,
            Self::SimPin(_) => RequestKind::SimPin,
            Self::GetCurrentCalls => RequestKind::GetCurrentCalls,
            Self::Dial { .. } => RequestKind::Dial,
            Self::GetImsi => RequestKind::GetImsi,
            Self::Hangup { .. } => RequestKind::Hangup,
            Self::HangupWaitingOrBackground => RequestKind::HangupWaitingOrBackground,
            Self::HangupForegroundResumeBackground => {
                RequestKind::HangupForegroundResumeBackground
            }
            Self::SwitchWaitingOrHoldingAndActive => RequestKind::SwitchWaitingOrHoldingAndActive,
            Self::Conference => RequestKind::Conference,
            Self::Udub => RequestKind::Udub,
            Self::SignalStrength => RequestKind::SignalStrength,
            Self::VoiceRegistrationState => RequestKind::VoiceRegistrationState,
            Self::DataRegistrationState => RequestKind::DataRegistrationState,
            Self::Operator => RequestKind::Operator,
            Self::RadioPower { .. } => RequestKind::RadioPower,
            Self::Dtmf { .. } => RequestKind::Dtmf,
            Self::SendSms { .. } => RequestKind::SendSms,
            Self::SetupDataCall(_) => RequestKind::SetupDataCall,
            Self::SimIo(_) => RequestKind::SimIo,
            Self::SendUssd { .. } => RequestKind::SendUssd,
            Self::CancelUssd => RequestKind::CancelUssd,
            Self::SmsAcknowledge { .. } => RequestKind::SmsAcknowledge,
            Self::GetImei => RequestKind::GetImei,
            Self::Answer => RequestKind::Answer,
            Self::QueryNetworkSelectionMode => RequestKind::QueryNetworkSelectionMode,
            Self::SetNetworkSelectionAutomatic => RequestKind::SetNetworkSelectionAutomatic,
            Self::DataCallList => RequestKind::DataCallList,
            Self::OemHookRaw(_) => RequestKind::OemHookRaw,
            Self::OemHookStrings(_) => RequestKind::OemHookStrings,
            Self::WriteSmsToSim { .. } => RequestKind::WriteSmsToSim,
            Self::DeleteSmsOnSim { .. } => RequestKind::DeleteSmsOnSim,
            Self::SeparateConnection { .. } => RequestKind::SeparateConnection,
            Self::GetDataCallProfile => RequestKind::GetDataCallProfile,
            Self::SetUiccSubscription(_) => RequestKind::SetUiccSubscription,
            Self::SetDataSubscription => RequestKind::SetDataSubscription,
            Self::GetUiccSubscription => RequestKind::GetUiccSubscription,
            Self::GetDataSubscription => RequestKind::GetDataSubscription,
            Self::SetSubscriptionMode => RequestKind::SetSubscriptionMode,
            Self::Unknown(code) => RequestKind::Unknown(*code),
        }
    }
}
