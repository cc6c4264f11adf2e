//! ### 3GPP TS 27.005 - Short message service, PDU mode

use atat::atat_derive::{AtatCmd, AtatResp};
use heapless::String;

use super::NoResponse;
use crate::error::Error;

/// Hex encoded SMSC address (up to 12 octets) and TPDU (up to 176 octets).
pub const MAX_PDU_HEX_LEN: usize = 2 * (12 + 176);

pub type PduHex = String<MAX_PDU_HEX_LEN>;

/// 3.2.3 Message format +CMGF, 0 is PDU mode.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGF", NoResponse)]
pub struct SetMessageFormat {
    #[at_arg(position = 0)]
    pub mode: u8,
}

/// 3.2.1 Select message service +CSMS, 1 is phase 2+.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CSMS", NoResponse)]
pub struct SelectMessageService {
    #[at_arg(position = 0)]
    pub service: u8,
}

/// 3.4.1 New message indications +CNMI
#[derive(Clone, AtatCmd)]
#[at_cmd("+CNMI", NoResponse)]
pub struct SetNewMessageIndication {
    #[at_arg(position = 0)]
    pub mode: u8,
    #[at_arg(position = 1)]
    pub mt: u8,
    #[at_arg(position = 2)]
    pub bm: u8,
    #[at_arg(position = 3)]
    pub ds: u8,
    #[at_arg(position = 4)]
    pub bfr: u8,
}

/// 3.5.1 Send message +CMGS, first phase up to the `>` prompt.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGS", NoResponse)]
pub struct PrepareSendMessage {
    /// TPDU length in octets, SMSC excluded.
    #[at_arg(position = 0)]
    pub length: u16,
}

/// `+CMGS: <mr>`
#[derive(Debug, Clone, AtatResp)]
pub struct MessageReference {
    #[at_arg(position = 0)]
    pub reference: u8,
}

/// 3.5.1 Send message +CMGS, hex encoded SMSC address followed by the TPDU,
/// closed with Ctrl-Z.
#[derive(Clone, AtatCmd)]
#[at_cmd(
    "",
    MessageReference,
    cmd_prefix = "",
    value_sep = false,
    quote_escape_strings = false,
    termination = "\x1a",
    timeout_ms = 180000
)]
pub struct SubmitPdu {
    #[at_arg(position = 0)]
    pub pdu: PduHex,
}

impl SubmitPdu {
    pub fn new(smsc: &str, pdu: &str) -> Result<Self, Error> {
        let mut hex = PduHex::new();
        hex.push_str(smsc).map_err(|_| Error::Overflow)?;
        hex.push_str(pdu).map_err(|_| Error::Overflow)?;
        Ok(Self { pdu: hex })
    }
}

/// 3.5.3 Write message to memory +CMGW, first phase up to the `>` prompt.
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGW", NoResponse)]
pub struct PrepareWriteMessage {
    #[at_arg(position = 0)]
    pub length: u16,
    #[at_arg(position = 1)]
    pub status: u8,
}

/// `+CMGW: <index>`
#[derive(Debug, Clone, AtatResp)]
pub struct StoredMessage {
    #[at_arg(position = 0)]
    pub index: u16,
}

/// 3.5.3 Write message to memory +CMGW, the stored PDU.
#[derive(Clone, AtatCmd)]
#[at_cmd(
    "",
    StoredMessage,
    cmd_prefix = "",
    value_sep = false,
    quote_escape_strings = false,
    termination = "\x1a",
    timeout_ms = 10000
)]
pub struct StorePdu {
    #[at_arg(position = 0)]
    pub pdu: PduHex,
}

impl StorePdu {
    pub fn new(pdu: &str) -> Result<Self, Error> {
        PduHex::try_from(pdu)
            .map(|pdu| Self { pdu })
            .map_err(|_| Error::Overflow)
    }
}

/// 3.5.4 Delete message +CMGD
#[derive(Clone, AtatCmd)]
#[at_cmd("+CMGD", NoResponse)]
pub struct DeleteMessage {
    #[at_arg(position = 0)]
    pub index: u16,
}

/// 3.4.4 New message acknowledgement to ME/TA +CNMA
#[derive(Clone, AtatCmd)]
#[at_cmd("+CNMA", NoResponse)]
pub struct NewMessageAck {
    /// 1: received, 2: memory capacity exceeded.
    #[at_arg(position = 0)]
    pub n: u8,
}

impl NewMessageAck {
    pub fn new(received: bool) -> Self {
        Self {
            n: if received { 1 } else { 2 },
        }
    }
}
