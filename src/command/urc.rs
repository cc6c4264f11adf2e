use atat::digest::parser::urc_helper;
use atat::digest::ParseError;
use atat::nom::branch::alt;
use atat::nom::bytes::streaming::{tag, take_until};
use atat::nom::character::complete::line_ending;
use atat::nom::combinator::recognize;
use atat::nom::error::{Error as NomError, ErrorKind};
use atat::nom::sequence::tuple;
use atat::nom::IResult;
use atat::{AtatUrc, Parser};
use heapless::String;

use crate::tokenizer::Tokenizer;

/// Hex PDU of a routed SMS or status report.
pub type Pdu = String<400>;

/// Unsolicited lines the adapter reacts to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Urc {
    /// `%CTZV:` network time and zone.
    NetworkTime(String<64>),
    /// `RING`, `+CRING:`, `NO CARRIER` or `+CCWA`.
    CallStateChanged { ring: bool },
    /// `+CREG:` or `+CGREG:`.
    RegistrationChanged,
    /// `+CMT:` followed by the PDU line.
    NewSms(Pdu),
    /// `+CDS:` followed by the PDU line.
    SmsStatusReport(Pdu),
    /// `+CGEV:` packet domain event.
    ContextEvent,
    /// `+CME ERROR: 150`, sent by modems without `+CGEV` support when a
    /// context goes away.
    ContextError,
}

impl Urc {
    /// Classifies one unsolicited line. SMS notifications need the PDU from
    /// the line that follows.
    pub fn classify(line: &str, pdu: Option<&str>) -> Option<Self> {
        if line.starts_with("%CTZV:") {
            let mut tok = Tokenizer::start(line).ok()?;
            let time = tok.next_str().ok()?;
            return String::try_from(time).ok().map(Self::NetworkTime);
        }

        if line.starts_with("+CRING:")
            || line.starts_with("RING")
            || line.starts_with("NO CARRIER")
            || line.starts_with("+CCWA")
        {
            return Some(Self::CallStateChanged {
                ring: line.starts_with("RING"),
            });
        }

        if line.starts_with("+CREG:") || line.starts_with("+CGREG:") {
            return Some(Self::RegistrationChanged);
        }

        if line.starts_with("+CMT:") {
            return Pdu::try_from(pdu?).ok().map(Self::NewSms);
        }

        if line.starts_with("+CDS:") {
            return Pdu::try_from(pdu?).ok().map(Self::SmsStatusReport);
        }

        if line.starts_with("+CGEV:") {
            return Some(Self::ContextEvent);
        }

        if line.starts_with("+CME ERROR: 150") {
            return Some(Self::ContextError);
        }

        None
    }
}

type Framed<'a> = IResult<&'a [u8], (&'a [u8], usize), NomError<&'a [u8]>>;

/// `+CREG:` / `+CGREG:` in their unsolicited forms: `<stat>` alone or
/// followed by quoted location fields. The solicited `<n>,<stat>` reply is
/// left to the response parser.
fn registration<'a>(token: &'static str) -> impl Fn(&'a [u8]) -> Framed<'a> {
    move |i: &'a [u8]| {
        let (rest, (urc, len)) = urc_helper::<_, NomError<&'a [u8]>>(token)(i)?;

        let fields = urc
            .iter()
            .position(|&b| b == b':')
            .map(|colon| &urc[colon + 1..])
            .unwrap_or_default();
        let second = fields
            .split(|&b| b == b',')
            .nth(1)
            .map(|f| f.iter().find(|b| !b.is_ascii_whitespace()));

        match second {
            None | Some(Some(&b'"')) => Ok((rest, (urc, len))),
            Some(_) => Err(atat::nom::Err::Error(NomError::new(i, ErrorKind::Verify))),
        }
    }
}

/// A notification line followed by its PDU line, framed as one URC. Waits
/// for the PDU line to complete.
fn with_pdu<'a>(token: &'static str) -> impl Fn(&'a [u8]) -> Framed<'a> {
    move |i: &'a [u8]| {
        let (rest, (le, urc)) = tuple((
            line_ending,
            recognize(tuple((
                tag(token),
                take_until("\r\n"),
                tag("\r\n"),
                take_until("\r\n"),
            ))),
        ))(i)?;
        let (rest, end) = tag("\r\n")(rest)?;

        Ok((rest, (urc, le.len() + urc.len() + end.len())))
    }
}

impl Parser for Urc {
    fn parse(buf: &[u8]) -> Result<(&[u8], usize), ParseError> {
        // `+CME ERROR: 150` is not framed here, it is indistinguishable from
        // a solicited error reply
        let (_, r) = alt((
            urc_helper("%CTZV"),
            urc_helper("+CRING"),
            urc_helper("RING"),
            urc_helper("NO CARRIER"),
            urc_helper("+CCWA"),
            registration("+CREG"),
            registration("+CGREG"),
            with_pdu("+CMT:"),
            with_pdu("+CDS:"),
            urc_helper("+CGEV"),
        ))(buf)?;

        Ok(r)
    }
}

impl AtatUrc for Urc {
    type Response = Urc;

    fn parse(resp: &[u8]) -> Option<Self::Response> {
        let text = core::str::from_utf8(resp).ok()?;
        let mut lines = text.split(['\r', '\n']).map(str::trim).filter(|l| !l.is_empty());
        let line = lines.next()?;
        Self::classify(line, lines.next())
    }
}
