//! Log routing for hosts that render logs themselves.

mod channel;

pub use channel::{ChannelLogger, LogMessage, init};
