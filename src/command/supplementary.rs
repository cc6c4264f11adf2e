//! ### 7 - Unstructured supplementary service data

use atat::atat_derive::AtatCmd;

use super::NoResponse;

/// 7.15 USSD +CUSD
#[derive(Clone, AtatCmd)]
#[at_cmd("+CUSD", NoResponse, timeout_ms = 10000)]
pub struct SetUssd {
    /// 0: presentation off, 1: presentation on, 2: cancel the session.
    #[at_arg(position = 0)]
    pub n: u8,
}
