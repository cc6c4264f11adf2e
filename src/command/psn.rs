//! ### 18 - Packet switched data services

use atat::atat_derive::AtatCmd;

use super::{Lines, NoResponse, MAX_CONTEXTS};

pub const MAX_PDP_TYPE_LEN: usize = 8;
pub const MAX_APN_LEN: usize = 99;

/// `+CGACT: <cid>,<state>` per context.
pub type ContextStates = Lines<MAX_CONTEXTS, 64>;
/// `+CGDCONT: <cid>,<type>,<apn>,<addr>,...` per context.
pub type ContextDefinitions = Lines<MAX_CONTEXTS, 192>;
pub type GprsRegistrationLine = Lines<2>;

/// 18.27 GPRS network registration status +CGREG
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGREG", NoResponse)]
pub struct SetGprsRegistrationStatus {
    #[at_arg(position = 0)]
    pub n: u8,
}

/// 18.27 Read GPRS network registration status +CGREG?
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGREG?", GprsRegistrationLine, parse = GprsRegistrationLine::parse)]
pub struct GetGprsRegistrationStatus;

/// 18.26 Packet domain event reporting +CGEREP
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGEREP", NoResponse)]
pub struct SetPacketDomainEventReporting {
    /// 1: discard events while the link is reserved, forward otherwise.
    #[at_arg(position = 0)]
    pub mode: u8,
    /// 0: clear buffered events.
    #[at_arg(position = 1)]
    pub bfr: u8,
}

/// 18.14 Read PDP context activation state +CGACT?
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGACT?", ContextStates, parse = ContextStates::parse)]
pub struct GetPdpContextState;

/// 18.4 Read PDP context definitions +CGDCONT?
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGDCONT?", ContextDefinitions, parse = ContextDefinitions::parse)]
pub struct GetPdpContextDefinition;

/// 18.4 PDP context definition +CGDCONT
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGDCONT", NoResponse)]
pub struct SetPdpContextDefinition<'a> {
    #[at_arg(position = 0)]
    pub cid: u8,
    #[at_arg(position = 1, len = 8)]
    pub pdp_type: &'a str,
    #[at_arg(position = 2, len = 99)]
    pub apn: &'a str,
    /// Left empty for a dynamic address.
    #[at_arg(position = 3, len = 0)]
    pub pdp_addr: &'a str,
    #[at_arg(position = 4)]
    pub d_comp: u8,
    #[at_arg(position = 5)]
    pub h_comp: u8,
}

/// 18.8 Quality of service profile (requested) +CGQREQ, subscribed values.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGQREQ", NoResponse)]
pub struct SetRequestedQos {
    #[at_arg(position = 0)]
    pub cid: u8,
}

/// 18.9 Quality of service profile (minimum acceptable) +CGQMIN
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGQMIN", NoResponse)]
pub struct SetMinimumQos {
    #[at_arg(position = 0)]
    pub cid: u8,
}

/// 18.14 PDP context activate or deactivate +CGACT
#[derive(Clone, AtatCmd)]
#[at_cmd("+CGACT", NoResponse, timeout_ms = 150000)]
pub struct SetPdpContextState {
    #[at_arg(position = 0)]
    pub state: u8,
    #[at_arg(position = 1)]
    pub cid: u8,
}

/// 18.16 Enter data state, GPRS service request D*99***<cid>#
#[derive(Clone, AtatCmd)]
#[at_cmd(
    "D*99***",
    NoResponse,
    value_sep = false,
    termination = "#\r\n",
    timeout_ms = 180000
)]
pub struct EnterDataState {
    #[at_arg(position = 0)]
    pub cid: u8,
}
