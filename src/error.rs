use atat::CmeError;

use crate::tokenizer::ParseError;

#[derive(Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    // Transport failure, fatal to the whole session: read, write, timeout
    // or abort
    Atat(atat::Error),
    ChannelClosed,

    // The modem answered with a non-success final result
    Rejected(Option<CmeError>),

    // Malformed reply, the channel stays open
    Parse(ParseError),

    // A value did not fit its bounded buffer
    Overflow,

    // External data bearer did not come up
    Bearer,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter<'_>) {
        match self {
            Self::Atat(e) => defmt::write!(f, "Atat({:?})", e),
            Self::ChannelClosed => defmt::write!(f, "ChannelClosed"),
            Self::Rejected(Some(e)) => defmt::write!(f, "Rejected({:?})", e),
            Self::Rejected(None) => defmt::write!(f, "Rejected"),
            Self::Parse(e) => defmt::write!(f, "Parse({:?})", e),
            Self::Overflow => defmt::write!(f, "Overflow"),
            Self::Bearer => defmt::write!(f, "Bearer"),
        }
    }
}

impl Error {
    /// The AT channel itself failed, no answer is coming.
    pub fn is_channel_failure(&self) -> bool {
        matches!(self, Self::Atat(_))
    }
}

impl From<atat::Error> for Error {
    fn from(e: atat::Error) -> Self {
        match e {
            atat::Error::Read | atat::Error::Write | atat::Error::Timeout | atat::Error::Aborted => {
                Self::Atat(e)
            }
            atat::Error::Parse | atat::Error::InvalidResponse => {
                Self::Parse(ParseError::InvalidField)
            }
            atat::Error::CmeError(cme) => Self::Rejected(Some(cme)),
            _ => Self::Rejected(None),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

/// Result code reported to the host with every completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    RadioNotAvailable,
    GenericFailure,
    PasswordIncorrect,
    RequestNotSupported,
}

impl From<Error> for RequestError {
    fn from(_: Error) -> Self {
        Self::GenericFailure
    }
}

impl From<ParseError> for RequestError {
    fn from(_: ParseError) -> Self {
        Self::GenericFailure
    }
}
