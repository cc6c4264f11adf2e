//! ### 7 - Network service

use atat::atat_derive::AtatCmd;

use super::{Lines, NoResponse};

pub type RegistrationLine = Lines<2>;
pub type SignalQuality = Lines<2, 32>;
pub type OperatorSelection = Lines<2>;
/// Three `+COPS:` lines, one per name format.
pub type OperatorNames = Lines<4, 96>;

/// 7.2 Network registration status +CREG
#[derive(Clone, AtatCmd)]
#[at_cmd("+CREG", NoResponse)]
pub struct SetNetworkRegistrationStatus {
    /// 1: registration URCs, 2: registration and location URCs.
    #[at_arg(position = 0)]
    pub n: u8,
}

/// 7.2 Read network registration status +CREG?
#[derive(Clone, AtatCmd)]
#[at_cmd("+CREG?", RegistrationLine, parse = RegistrationLine::parse)]
pub struct GetNetworkRegistrationStatus;

/// 7.3 Signal quality +CSQ
#[derive(Clone, AtatCmd)]
#[at_cmd("+CSQ", SignalQuality, parse = SignalQuality::parse)]
pub struct GetSignalQuality;

/// 7.5 Read operator selection +COPS?
#[derive(Clone, AtatCmd)]
#[at_cmd("+COPS?", OperatorSelection, parse = OperatorSelection::parse)]
pub struct GetOperatorSelection;

/// 7.5 Operator selection +COPS, `mode` 0 is automatic.
#[derive(Clone, AtatCmd)]
#[at_cmd("+COPS", NoResponse, timeout_ms = 180000)]
pub struct SetOperatorSelection {
    #[at_arg(position = 0)]
    pub mode: u8,
}

/// 7.5 Operator in long alphanumeric, short alphanumeric and numeric
/// format, one `+COPS:` line each.
#[derive(Clone, AtatCmd)]
#[at_cmd(
    "+COPS=3,0;+COPS?;+COPS=3,1;+COPS?;+COPS=3,2;+COPS?",
    OperatorNames,
    parse = OperatorNames::parse
)]
pub struct GetOperatorNames;

#[cfg(test)]
mod test {
    use super::*;
    use crate::command::written;
    use atat::AtatCmd;

    #[test]
    fn commands() {
        assert_eq!(
            written(&SetNetworkRegistrationStatus { n: 2 }),
            b"AT+CREG=2\r\n"
        );
        assert_eq!(written(&SetOperatorSelection { mode: 0 }), b"AT+COPS=0\r\n");
        assert_eq!(
            written(&GetOperatorNames),
            b"AT+COPS=3,0;+COPS?;+COPS=3,1;+COPS?;+COPS=3,2;+COPS?\r\n"
        );
    }

    #[test]
    fn operator_lines() {
        let names = GetOperatorNames
            .parse(Ok(b"+COPS: 0,0,\"Android\"\r\n+COPS: 0,1,\"Android\"\r\n+COPS: 0,2,\"310260\""))
            .unwrap();
        assert_eq!(names.prefixed("+COPS:").count(), 3);
    }
}
