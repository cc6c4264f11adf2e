use heapless::{String, Vec};
use serde::Serialize;

use crate::command::MAX_CONTEXTS;
use crate::tokenizer::{ParseError, Tokenizer};

pub type DataCallList = Vec<DataCall, MAX_CONTEXTS>;

pub type DnsList = String<128>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataCallStatus {
    /// The context is active but has no definition.
    Unknown,
    NoError,
}

/// One PDP context as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataCall {
    pub cid: u8,
    pub active: bool,
    pub status: DataCallStatus,
    pub pdp_type: String<16>,
    pub ifname: String<16>,
    pub addresses: String<64>,
    pub dnses: DnsList,
    pub gateways: String<32>,
}

impl DataCall {
    fn new(cid: u8, active: bool) -> Self {
        Self {
            cid,
            active,
            status: DataCallStatus::Unknown,
            pdp_type: String::new(),
            ifname: String::new(),
            addresses: String::new(),
            dnses: String::new(),
            gateways: String::new(),
        }
    }
}

/// Interface, DNS and gateway values filled into every defined context.
#[derive(Debug, Clone, Copy)]
pub struct Addressing<'a> {
    pub ifname: &'a str,
    pub dnses: &'a str,
    pub gateways: &'a str,
}

fn copy<const N: usize>(s: &str) -> Result<String<N>, ParseError> {
    String::try_from(s).map_err(|_| ParseError::InvalidField)
}

/// Merges the `+CGACT:` activation lines with the `+CGDCONT:` definition
/// lines.
///
/// Every activated context is reported. Definitions are matched by context
/// id; a definition without an activation entry is dropped.
pub fn reconcile<'a, 'b>(
    activations: impl Iterator<Item = &'a str>,
    definitions: impl Iterator<Item = &'b str>,
    addressing: &Addressing<'_>,
) -> Result<DataCallList, ParseError> {
    let mut calls = DataCallList::new();

    for line in activations {
        let mut tok = Tokenizer::start(line)?;
        let cid = u8::try_from(tok.next_int()?).map_err(|_| ParseError::InvalidField)?;
        let active = tok.next_int()? != 0;
        calls
            .push(DataCall::new(cid, active))
            .map_err(|_| ParseError::InvalidField)?;
    }

    for line in definitions {
        let mut tok = Tokenizer::start(line)?;
        let cid = tok.next_int()?;

        let Some(call) = calls.iter_mut().find(|c| i32::from(c.cid) == cid) else {
            continue;
        };

        call.status = DataCallStatus::NoError;
        call.pdp_type = copy(tok.next_str()?)?;

        // APN, already known to the host
        tok.next_str()?;

        call.ifname = copy(addressing.ifname)?;
        call.addresses = copy(tok.next_str()?)?;
        call.dnses = copy(addressing.dnses)?;
        call.gateways = copy(addressing.gateways)?;
    }

    Ok(calls)
}

/// A data call profile as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataCallProfile {
    pub profile_id: u8,
    pub priority: u8,
}
