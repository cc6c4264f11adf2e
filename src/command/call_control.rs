//! ### 6 - Call control

use core::fmt::Write;

use atat::atat_derive::AtatCmd;
use heapless::String;

use super::{Lines, NoResponse};
use crate::call::MAX_CALLS;
use crate::error::Error;

/// `+CLCC:` lines, one per call.
pub type CallLines = Lines<{ MAX_CALLS + 1 }, 128>;

/// Dialled number plus CLIR modifier.
pub type DialString = String<34>;

/// CLIR override for a single call, 3GPP TS 27.007 6.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Clir {
    /// Use the subscription default.
    #[default]
    Subscription,
    /// Restrict presentation of the own number.
    Invocation,
    /// Allow presentation of the own number.
    Suppression,
}

/// 6.2 Dial command D, voice call.
#[derive(Clone, AtatCmd)]
#[at_cmd(
    "D",
    NoResponse,
    abortable = true,
    timeout_ms = 180000,
    value_sep = false,
    quote_escape_strings = false,
    termination = ";\r\n"
)]
pub struct Dial {
    #[at_arg(position = 0)]
    pub target: DialString,
}

impl Dial {
    pub fn new(number: &str, clir: Clir) -> Result<Self, Error> {
        let modifier = match clir {
            Clir::Subscription => "",
            Clir::Invocation => "I",
            Clir::Suppression => "i",
        };
        let mut target = DialString::new();
        write!(target, "{}{}", number, modifier).map_err(|_| Error::Overflow)?;
        Ok(Self { target })
    }
}

/// 6.4 Call answer A
#[derive(Clone, AtatCmd)]
#[at_cmd("A", NoResponse, timeout_ms = 20000)]
pub struct Answer;

/// 6.5 Hook control H, also rejects an incoming call (UDUB).
#[derive(Clone, AtatCmd)]
#[at_cmd("H", NoResponse, timeout_ms = 20000)]
pub struct HangUp;

/// Supplementary service operation of +CHLD, 3GPP TS 22.030.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HoldAction {
    /// 0: release held calls or reject the waiting call.
    ReleaseHeldOrWaiting,
    /// 1: release active calls and accept the held or waiting one.
    ReleaseActiveAcceptOther,
    /// 1X: release call X.
    Release(u8),
    /// 2: hold active calls and accept the held or waiting one.
    HoldActiveAcceptOther,
    /// 2X: hold all calls except X.
    HoldAllExcept(u8),
    /// 3: add the held call to the conversation.
    Conference,
}

impl HoldAction {
    /// `<n>` of `AT+CHLD=<n>`; a call index is appended to the operation
    /// digit.
    pub fn code(self) -> u16 {
        fn with_call(op: u16, call: u8) -> u16 {
            let call = u16::from(call);
            let scale = match call {
                0..=9 => 10,
                10..=99 => 100,
                _ => 1000,
            };
            op * scale + call
        }

        match self {
            Self::ReleaseHeldOrWaiting => 0,
            Self::ReleaseActiveAcceptOther => 1,
            Self::Release(call) => with_call(1, call),
            Self::HoldActiveAcceptOther => 2,
            Self::HoldAllExcept(call) => with_call(2, call),
            Self::Conference => 3,
        }
    }
}

/// 6.13 Call related supplementary services +CHLD
#[derive(Clone, AtatCmd)]
#[at_cmd("+CHLD", NoResponse, timeout_ms = 20000)]
pub struct CallHold {
    #[at_arg(position = 0)]
    pub n: u16,
}

impl From<HoldAction> for CallHold {
    fn from(action: HoldAction) -> Self {
        Self { n: action.code() }
    }
}

/// 6.20 List current calls +CLCC
#[derive(Clone, AtatCmd)]
#[at_cmd("+CLCC", CallLines, parse = CallLines::parse)]
pub struct ListCurrentCalls;

/// 6.26 DTMF tone generation +VTS
#[derive(Clone, AtatCmd)]
#[at_cmd("+VTS", NoResponse)]
pub struct SendDtmf {
    #[at_arg(position = 0)]
    pub tone: char,
}

/// 7.12 Call waiting +CCWA, `n` 1 enables the unsolicited presentation.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CCWA", NoResponse)]
pub struct SetCallWaitingPresentation {
    #[at_arg(position = 0)]
    pub n: u8,
}

/// 7.8 Connected line identification presentation +COLP
#[derive(Clone, AtatCmd)]
#[at_cmd("+COLP", NoResponse)]
pub struct SetConnectedLinePresentation {
    #[at_arg(position = 0)]
    pub n: u8,
}

/// 7.17 Supplementary service notifications +CSSN
#[derive(Clone, AtatCmd)]
#[at_cmd("+CSSN", NoResponse)]
pub struct SetSupplementaryServiceNotifications {
    /// `+CSSI` intermediate result codes.
    #[at_arg(position = 0)]
    pub n: u8,
    /// `+CSSU` unsolicited result codes.
    #[at_arg(position = 1)]
    pub m: u8,
}
