use heapless::String;
use serde::Serialize;

use crate::tokenizer::{ParseError, Tokenizer};

/// Voice or data registration as reported by `+CREG`/`+CGREG`.
///
/// `lac` and `cid` are only known while registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistrationState {
    pub stat: i32,
    pub lac: Option<u32>,
    pub cid: Option<u32>,
    pub network_type: Option<u32>,
}

impl RegistrationState {
    /// Parses every form of the registration line:
    ///
    /// - `<stat>`
    /// - `<n>,<stat>`
    /// - `<stat>,<lac>,<ci>`
    /// - `<n>,<stat>,<lac>,<ci>`
    /// - `<n>,<stat>,<lac>,<ci>,<AcT>` (`+CGREG` only)
    ///
    /// The solicited form carries `<n>`, but an unsolicited line may sneak in
    /// where the solicited one was expected.
    pub fn from_line(line: &str) -> Result<Self, ParseError> {
        let mut tok = Tokenizer::start(line)?;
        let commas = tok.remaining().matches(',').count();

        let mut state = Self {
            stat: 0,
            lac: None,
            cid: None,
            network_type: None,
        };

        match commas {
            0 => state.stat = tok.next_int()?,
            1 => {
                tok.next_int()?;
                state.stat = tok.next_int()?;
            }
            2 => {
                state.stat = tok.next_int()?;
                state.lac = Some(tok.next_hex_int()?);
                state.cid = Some(tok.next_hex_int()?);
            }
            3 | 4 => {
                tok.next_int()?;
                state.stat = tok.next_int()?;
                state.lac = Some(tok.next_hex_int()?);
                state.cid = Some(tok.next_hex_int()?);
                if commas == 4 {
                    state.network_type = Some(tok.next_hex_int()?);
                }
            }
            _ => return Err(ParseError::InvalidField),
        }

        Ok(state)
    }
}

/// `+CSQ: <rssi>,<ber>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalStrength {
    pub rssi: i32,
    pub bit_error_rate: i32,
}

impl SignalStrength {
    pub fn from_line(line: &str) -> Result<Self, ParseError> {
        let mut tok = Tokenizer::start(line)?;
        Ok(Self {
            rssi: tok.next_int()?,
            bit_error_rate: tok.next_int()?,
        })
    }
}

pub type OperatorName = String<64>;

/// Registered operator in the three `+COPS` formats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Operator {
    pub long_name: Option<OperatorName>,
    pub short_name: Option<OperatorName>,
    pub numeric: Option<OperatorName>,
}

impl Operator {
    /// Parses the three `+COPS: <mode>[,<format>,<oper>]` lines answering
    /// the long, short and numeric format queries, in that order.
    pub fn from_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Self, ParseError> {
        let mut names: [Option<OperatorName>; 3] = [None, None, None];
        let mut count = 0;

        for line in lines {
            let slot = names.get_mut(count).ok_or(ParseError::InvalidField)?;
            *slot = Self::name_from_line(line)?;
            count += 1;
        }

        if count != names.len() {
            return Err(ParseError::Exhausted);
        }

        let [long_name, short_name, numeric] = names;
        Ok(Self {
            long_name,
            short_name,
            numeric,
        })
    }

    fn name_from_line(line: &str) -> Result<Option<OperatorName>, ParseError> {
        let mut tok = Tokenizer::start(line)?;

        // <mode>
        tok.next_int()?;
        if !tok.has_more() {
            return Ok(None);
        }

        // <format>
        tok.next_int()?;
        if !tok.has_more() {
            return Ok(None);
        }

        let name = tok.next_str()?;
        OperatorName::try_from(name)
            .map(Some)
            .map_err(|_| ParseError::InvalidField)
    }
}

/// `+COPS: <mode>`, 0 automatic, 1 manual.
pub fn selection_mode_from_line(line: &str) -> Result<i32, ParseError> {
    Tokenizer::start(line)?.next_int()
}
