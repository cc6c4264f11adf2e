//! AT commands issued by the adapter, grouped after 3GPP TS 27.007 / 27.005.
//!
//! Commands are `AtatCmd` structs. Replies with a fixed shape deserialize
//! into typed responses; replies the adapter walks line by line come back
//! as [`Lines`] and are tokenized by the caller.

pub mod call_control;
pub mod device_lock;
pub mod general;
pub mod mobile_control;
pub mod network_service;
pub mod psn;
pub mod sim;
pub mod sms;
pub mod supplementary;
#[cfg(feature = "ti-commands")]
pub mod vendor;

pub mod urc;

use atat::atat_derive::AtatResp;
use atat::AtatResp;
use heapless::{String, Vec};

use crate::error::Error;
use crate::tokenizer::ParseError;

pub use urc::{Pdu, Urc};

pub const MAX_LINE_LEN: usize = 256;
/// PDP contexts a modem may list in `+CGACT?` / `+CGDCONT?`.
pub const MAX_CONTEXTS: usize = 16;

pub type Line = String<MAX_LINE_LEN>;

#[derive(Debug, Clone, AtatResp)]
pub struct NoResponse;

/// Intermediate lines of a reply, trimmed, empty lines dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Lines<const N: usize, const L: usize = MAX_LINE_LEN> {
    lines: Vec<String<L>, N>,
}

impl<const N: usize, const L: usize> AtatResp for Lines<N, L> {}

impl<const N: usize, const L: usize> Lines<N, L> {
    pub fn parse(body: &[u8]) -> Result<Self, ParseError> {
        let text = core::str::from_utf8(body).map_err(|_| ParseError::InvalidField)?;

        let mut lines = Vec::new();
        for line in text.split(['\r', '\n']).map(str::trim).filter(|l| !l.is_empty()) {
            let line = String::try_from(line).map_err(|_| ParseError::Overflow)?;
            lines.push(line).map_err(|_| ParseError::Overflow)?;
        }

        Ok(Self { lines })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.as_str())
    }

    /// Lines starting with `prefix`, e.g. `+CGACT:`.
    pub fn prefixed<'a: 'p, 'p>(&'a self, prefix: &'p str) -> impl Iterator<Item = &'a str> + 'p {
        self.iter().filter(move |l| l.starts_with(prefix))
    }

    /// The line a single-line command must produce.
    pub fn first(&self) -> Result<&str, ParseError> {
        self.iter().next().ok_or(ParseError::Exhausted)
    }

    pub fn first_prefixed<'a>(&'a self, prefix: &str) -> Result<&'a str, ParseError> {
        self.prefixed(prefix).next().ok_or(ParseError::Exhausted)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// `value` if it fits a string argument declared with `len`.
pub(crate) fn bounded(value: &str, len: usize) -> Result<&str, Error> {
    if value.len() <= len {
        Ok(value)
    } else {
        Err(Error::Overflow)
    }
}

#[cfg(test)]
pub(crate) fn written<Cmd: atat::AtatCmd>(cmd: &Cmd) -> std::vec::Vec<u8> {
    let mut buf = std::vec![0u8; Cmd::MAX_LEN];
    let len = cmd.write(&mut buf);
    buf.truncate(len);
    buf
}
