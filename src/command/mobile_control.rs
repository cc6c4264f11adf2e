//! ### 5 - Mobile equipment control and status

use atat::atat_derive::{AtatCmd, AtatEnum, AtatResp};

use super::NoResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum Functionality {
    Minimum = 0,
    Full = 1,
}

/// 5.2 Set module functionality +CFUN
#[derive(Clone, AtatCmd)]
#[at_cmd("+CFUN", NoResponse, timeout_ms = 180000)]
pub struct SetModuleFunctionality {
    #[at_arg(position = 0)]
    pub fun: Functionality,
}

/// `+CFUN: <fun>`
#[derive(Debug, Clone, AtatResp)]
pub struct ModuleFunctionality {
    #[at_arg(position = 0)]
    pub fun: u8,
}

impl ModuleFunctionality {
    /// Anything but minimum functionality counts as on.
    pub fn is_on(&self) -> bool {
        self.fun != 0
    }
}

/// 5.2 Read module functionality +CFUN?
#[derive(Clone, AtatCmd)]
#[at_cmd("+CFUN?", ModuleFunctionality)]
pub struct GetModuleFunctionality;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AtatEnum)]
pub enum TerminationErrorMode {
    Disabled = 0,
    /// `+CME ERROR: <err>` with numeric codes.
    Enabled = 1,
    Verbose = 2,
}

/// 5.11 Report mobile termination error +CMEE
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMEE", NoResponse)]
pub struct SetReportMobileTerminationError {
    #[at_arg(position = 0)]
    pub n: TerminationErrorMode,
}

/// Call mode +CMOD, 0 is single mode calls only.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMOD", NoResponse)]
pub struct SetCallMode {
    #[at_arg(position = 0)]
    pub mode: u8,
}

/// Microphone mute control +CMUT
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMUT", NoResponse)]
pub struct SetMute {
    #[at_arg(position = 0)]
    pub muted: u8,
}
