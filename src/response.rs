use heapless::{String, Vec};
use serde::Serialize;

use crate::call::CallList;
use crate::card::CardStatus;
use crate::command::sim::MAX_SIM_DATA_LEN;
use crate::command::Line;
use crate::data_call::{DataCallList, DataCallProfile};
use crate::registration::{Operator, RegistrationState, SignalStrength};
use crate::tokenizer::{ParseError, Tokenizer};

pub const MAX_OEM_RAW: usize = 256;
pub const MAX_OEM_STRINGS: usize = 8;

pub type OemString = String<64>;

/// Hex encoded `<response>` of `+CRSM`.
pub type SimData = String<MAX_SIM_DATA_LEN>;

/// Payload of a successful completion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    None,
    CardStatus(CardStatus),
    Calls(CallList),
    SignalStrength(SignalStrength),
    Registration(RegistrationState),
    Operator(Operator),
    NetworkSelectionMode(i32),
    Imsi(Line),
    Imei(Line),
    SimIo(SimIoResponse),
    Sms(SmsResponse),
    DataCalls(DataCallList),
    DataCallProfiles(Vec<DataCallProfile, 1>),
    OemHookRaw(Vec<u8, MAX_OEM_RAW>),
    OemHookStrings(Vec<OemString, MAX_OEM_STRINGS>),
}

/// `+CRSM: <sw1>,<sw2>[,<response>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimIoResponse {
    pub sw1: u8,
    pub sw2: u8,
    pub response: Option<SimData>,
}

impl SimIoResponse {
    pub fn from_line(line: &str) -> Result<Self, ParseError> {
        let mut tok = Tokenizer::start(line)?;
        let sw1 = u8::try_from(tok.next_int()?).map_err(|_| ParseError::InvalidField)?;
        let sw2 = u8::try_from(tok.next_int()?).map_err(|_| ParseError::InvalidField)?;
        let response = if tok.has_more() {
            Some(SimData::try_from(tok.next_str()?).map_err(|_| ParseError::Overflow)?)
        } else {
            None
        };
        Ok(Self { sw1, sw2, response })
    }
}

/// Outcome of a submitted or stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmsResponse {
    /// `<mr>` of `+CMGS`, or the storage `<index>` of `+CMGW`.
    pub reference: i32,
}
