//! Race control communication.
//!
//! - [`RaceSnapshot`] decodes the `RaceData` wire record
//! - [`RaceSync`] runs discovery, liveness and message dispatch over a
//!   [`MessageChannel`]

mod snapshot;
mod sync;

pub use snapshot::{EMPTY_LAP_TIME, RACE_DATA_FIELDS, RaceSnapshot};
pub use sync::{
    Message, MessageChannel, PeerAddress, RaceSync, TAG_ADDRESS, TAG_ARGUMENT, TAG_FLAG,
    TAG_RACE_DATA, TAG_REGISTER,
};
