//! ### 20 - SIM access

use atat::atat_derive::AtatCmd;

use super::Lines;

/// Longest hex encoded `<data>` / `<response>`, 255 octets.
pub const MAX_SIM_DATA_LEN: usize = 2 * 255;

/// `+CRSM: <sw1>,<sw2>[,"<response>"]`
pub type SimAccessReply = Lines<2, { MAX_SIM_DATA_LEN + 32 }>;

/// 20.2 Restricted SIM access +CRSM
#[derive(Clone, AtatCmd)]
#[at_cmd("+CRSM", SimAccessReply, parse = SimAccessReply::parse, timeout_ms = 10000)]
pub struct RestrictedSimAccess<'a> {
    #[at_arg(position = 0)]
    pub command: u8,
    #[at_arg(position = 1)]
    pub file_id: u16,
    #[at_arg(position = 2)]
    pub p1: u8,
    #[at_arg(position = 3)]
    pub p2: u8,
    #[at_arg(position = 4)]
    pub p3: u8,
    #[at_arg(position = 5, len = 512)]
    pub data: Option<&'a str>,
}
