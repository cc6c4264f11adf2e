//! ### 4 - General operation

use atat::atat_derive::AtatCmd;

use super::{Lines, NoResponse};

/// `AT+CIMI` / `AT+CGSN` reply: one bare numeric line.
pub type Identity = Lines<1>;

/// Echo off, verbose final result codes.
#[derive(Clone, AtatCmd)]
#[at_cmd("E0Q0V1", NoResponse)]
pub struct SetResultPresentation;

/// Automatic answering, `rings` 0 disables it.
#[derive(Clone, AtatCmd)]
#[at_cmd("S0", NoResponse)]
pub struct SetAutoAnswer {
    #[at_arg(position = 0)]
    pub rings: u8,
}

/// 4.7 IMSI identification +CIMI
#[derive(Clone, AtatCmd)]
#[at_cmd("+CIMI", Identity, parse = Identity::parse)]
pub struct GetImsi;

/// 4.8 Serial number / IMEI +CGSN
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGSN", Identity, parse = Identity::parse)]
pub struct GetImei;

/// 4.10 Select TE character set +CSCS
#[derive(Clone, AtatCmd)]
#[at_cmd("+CSCS", NoResponse)]
pub struct SetCharacterSet<'a> {
    #[at_arg(position = 0, len = 8)]
    pub chset: &'a str,
}
