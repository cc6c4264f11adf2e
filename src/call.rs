use heapless::{String, Vec};
use serde::Serialize;

use crate::tokenizer::{ParseError, Tokenizer};

/// Upper bound on simultaneous call lines (3GPP TS 22.084 multiparty).
pub const MAX_CALLS: usize = 7;

pub type CallList = Vec<Call, MAX_CALLS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CallState {
    Active,
    Holding,
    Dialing,
    Alerting,
    Incoming,
    Waiting,
}

impl CallState {
    fn from_clcc(stat: i32) -> Result<Self, ParseError> {
        Ok(match stat {
            0 => Self::Active,
            1 => Self::Holding,
            2 => Self::Dialing,
            3 => Self::Alerting,
            4 => Self::Incoming,
            5 => Self::Waiting,
            _ => return Err(ParseError::InvalidField),
        })
    }

    /// Dialing, alerting, incoming or waiting.
    pub fn is_transient(self) -> bool {
        !matches!(self, Self::Active | Self::Holding)
    }

    pub fn is_incoming_or_waiting(self) -> bool {
        matches!(self, Self::Incoming | Self::Waiting)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Call {
    pub index: u8,
    pub is_mt: bool,
    pub state: CallState,
    pub is_voice: bool,
    pub is_mpty: bool,
    pub number: Option<String<40>>,
    pub toa: Option<u8>,
}

impl Call {
    /// Parses `+CLCC: <idx>,<dir>,<stat>,<mode>,<mpty>[,<number>,<type>]`.
    pub fn from_clcc(line: &str) -> Result<Self, ParseError> {
        let mut tok = Tokenizer::start(line)?;

        let index = u8::try_from(tok.next_int()?).map_err(|_| ParseError::InvalidField)?;
        let is_mt = tok.next_bool()?;
        let state = CallState::from_clcc(tok.next_int()?)?;
        let is_voice = tok.next_int()? == 0;
        let is_mpty = tok.next_bool()?;

        let mut call = Self {
            index,
            is_mt,
            state,
            is_voice,
            is_mpty,
            number: None,
            toa: None,
        };

        if tok.has_more() {
            let Ok(number) = tok.next_str() else {
                return Ok(call);
            };

            // Some modems put text like "NOT AVAILABLE" in place of the number
            if number.starts_with(|c: char| c == '+' || c.is_ascii_digit()) {
                call.number = Some(String::try_from(number).map_err(|_| ParseError::InvalidField)?);
            }

            call.toa = Some(u8::try_from(tok.next_int()?).map_err(|_| ParseError::InvalidField)?);
        }

        Ok(call)
    }
}
