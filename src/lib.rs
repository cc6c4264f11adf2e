#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod asynch;
pub mod call;
pub mod card;
pub mod command;
pub mod config;
pub mod data_call;
pub mod error;
pub mod host;
pub mod registration;
pub mod request;
pub mod response;
pub mod tokenizer;

#[cfg(test)]
mod test_helpers;

pub use asynch::control::Control;
pub use asynch::runner::{Runner, TimerQueue};
pub use asynch::state::RadioState;
pub use asynch::Ril;
pub use error::{Error, RequestError};
pub use host::{Deferred, Event, Host, InstanceId, Token};
pub use request::{Request, RequestKind};
pub use response::Response;
