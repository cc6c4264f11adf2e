//! ### 9 - Security

use atat::atat_derive::AtatCmd;

use super::{Lines, NoResponse};

/// Longest PIN or PUK the modem accepts.
pub const MAX_PIN_LEN: usize = 16;

/// `+CPIN: <code>`; some modems answer a bare `OK` when no PIN is pending.
pub type PinStatus = Lines<2>;

/// 9.1 Read PIN status +CPIN?
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPIN?", PinStatus, parse = PinStatus::parse, timeout_ms = 10000)]
pub struct GetPinStatus;

/// 9.1 Enter PIN +CPIN
///
/// `new_pin` is given when unblocking with a PUK or changing a PIN.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CPIN", NoResponse, timeout_ms = 10000)]
pub struct EnterPin<'a> {
    #[at_arg(position = 0, len = 16)]
    pub pin: &'a str,
    #[at_arg(position = 1, len = 18)]
    pub new_pin: Option<&'a str>,
}
