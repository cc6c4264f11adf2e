//! Vendor specific extensions of TI based modems.

use atat::atat_derive::AtatCmd;

use super::NoResponse;

/// Call progress indications %CPI
#[derive(Clone, AtatCmd)]
#[at_cmd("%CPI", NoResponse)]
pub struct SetCallProgressIndication {
    #[at_arg(position = 0)]
    pub mode: u8,
}

/// SIM and SMS readiness indications %CSTAT
#[derive(Clone, AtatCmd)]
#[at_cmd("%CSTAT", NoResponse)]
pub struct SetStatusIndication {
    #[at_arg(position = 0)]
    pub mode: u8,
}

/// CPHS notifications such as the message waiting indicator %CPHS
#[derive(Clone, AtatCmd)]
#[at_cmd("%CPHS", NoResponse)]
pub struct SetCphs {
    #[at_arg(position = 0)]
    pub mode: u8,
}

/// NITZ network time reporting %CTZV
#[derive(Clone, AtatCmd)]
#[at_cmd("%CTZV", NoResponse)]
pub struct SetNetworkTimeReporting {
    #[at_arg(position = 0)]
    pub mode: u8,
}

/// Primitive to a protocol stack entity %CPRIM
#[derive(Clone, AtatCmd)]
#[at_cmd("%CPRIM", NoResponse)]
pub struct SendPrimitive<'a> {
    #[at_arg(position = 0, len = 8)]
    pub entity: &'a str,
    #[at_arg(position = 1, len = 64)]
    pub primitive: &'a str,
}

/// GPRS multislot class 10.
pub const MULTISLOT_CLASS_10: SendPrimitive<'static> = SendPrimitive {
    entity: "GMM",
    primitive: "CONFIG MULTISLOT_CLASS=<10>",
};

/// Route packet data over the UART %DATA
#[derive(Clone, AtatCmd)]
#[at_cmd("%DATA=2,\"UART\",1,,\"SER\",\"UART\",0", NoResponse)]
pub struct RouteDataToUart;
