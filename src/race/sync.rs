//! Race control link
//!
//! Race control announces its address on a broadcast channel. A car with no
//! recent unicast traffic answers the announcement with a `Register` message
//! and from then on receives `RaceData` and `Argument` messages by unicast.
//! The link counts as alive while unicast traffic keeps resetting the
//! connection timeout.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, trace, warn};

use super::RaceSnapshot;
use crate::weather::WeatherLevel;
use crate::{CockpitError, Flag, Result};

/// Broadcast tag carrying the race control address.
pub const TAG_ADDRESS: &str = "Address";
/// Unicast tag carrying a [`RaceSnapshot`] record.
pub const TAG_RACE_DATA: &str = "RaceData";
/// Unicast tag carrying a remote command token.
pub const TAG_ARGUMENT: &str = "Argument";
/// Outbound registration handshake.
pub const TAG_REGISTER: &str = "Register";
/// Outbound flag request.
pub const TAG_FLAG: &str = "Flag";

/// Transport address of another programmable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerAddress(pub i64);

impl PeerAddress {
    /// Parse an `Address` payload. Non-positive addresses are not routable.
    pub fn parse(payload: &str) -> Result<Self> {
        let address: i64 = payload.trim().parse().map_err(|_| {
            CockpitError::parse_error("Address", format!("'{payload}' is not an address"))
        })?;
        if address <= 0 {
            return Err(CockpitError::parse_error("Address", format!("{address} is not routable")));
        }
        Ok(Self(address))
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tagged string message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub tag: String,
    pub data: String,
}

impl Message {
    pub fn new(tag: impl Into<String>, data: impl Into<String>) -> Self {
        Self { tag: tag.into(), data: data.into() }
    }
}

/// Non-blocking message transport.
///
/// Delivery is at-least-once and FIFO within one channel. Polls drain every
/// pending message.
pub trait MessageChannel {
    /// Own transport id, sent along with the registration.
    fn own_id(&self) -> i64;

    /// Drain pending unicast messages.
    fn poll_unicast(&mut self) -> Vec<Message>;

    /// Drain pending messages from the subscribed broadcast tags.
    fn poll_broadcast(&mut self) -> Vec<Message>;

    fn send_unicast(&mut self, to: PeerAddress, message: Message);
}

/// Peer link and latest race snapshot.
#[derive(Debug, Clone)]
pub struct RaceSync {
    peer: Option<PeerAddress>,
    timeout_ms: u32,
    timeout_period_ms: u32,
    snapshot: RaceSnapshot,
    snapshot_received: bool,
}

impl RaceSync {
    /// A fresh link starts disconnected, ready to answer the next announcement.
    pub fn new(timeout_period_ms: u32) -> Self {
        Self {
            peer: None,
            timeout_ms: 0,
            timeout_period_ms,
            snapshot: RaceSnapshot::default(),
            snapshot_received: false,
        }
    }

    pub fn peer(&self) -> Option<PeerAddress> {
        self.peer
    }

    /// True while unicast traffic arrived within the timeout.
    pub fn is_connected(&self) -> bool {
        self.timeout_ms > 0
    }

    pub fn snapshot(&self) -> &RaceSnapshot {
        &self.snapshot
    }

    /// Weather reported by race control, once any race data arrived.
    pub fn remote_weather(&self) -> Option<WeatherLevel> {
        self.snapshot_received.then_some(self.snapshot.weather)
    }

    /// Flag reported by race control.
    pub fn flag(&self) -> Flag {
        self.snapshot.flag
    }

    /// Process one tick of traffic. Returns remote command tokens in arrival
    /// order.
    pub fn drain(
        &mut self,
        elapsed_ms: u32,
        channel: &mut dyn MessageChannel,
        grid_name: &str,
    ) -> Vec<String> {
        let was_connected = self.is_connected();
        let messages = channel.poll_unicast();

        if messages.is_empty() {
            self.timeout_ms = self.timeout_ms.saturating_sub(elapsed_ms);
            if was_connected && !self.is_connected() {
                debug!(peer = ?self.peer, "Race control connection lost");
            }
            if !self.is_connected() {
                self.discover(channel, grid_name);
            }
            return Vec::new();
        }

        let mut commands = Vec::new();
        for message in messages {
            trace!(tag = %message.tag, "Unicast message");
            match message.tag.as_str() {
                TAG_RACE_DATA => self.apply_race_data(&message.data),
                TAG_ARGUMENT => commands.push(message.data),
                _ => {}
            }
        }

        self.timeout_ms = self.timeout_period_ms;
        if !was_connected {
            debug!(peer = ?self.peer, "Race control connection established");
        }
        commands
    }

    /// Ask race control to show `flag`. Does nothing before discovery.
    pub fn request_flag(&self, channel: &mut dyn MessageChannel, flag: Flag) {
        let Some(peer) = self.peer else {
            debug!(flag = flag.name(), "No race control address, flag request dropped");
            return;
        };
        channel.send_unicast(peer, Message::new(TAG_FLAG, flag.code().to_string()));
        info!(flag = flag.name(), %peer, "Flag requested");
    }

    fn discover(&mut self, channel: &mut dyn MessageChannel, grid_name: &str) {
        let announcement = channel
            .poll_broadcast()
            .into_iter()
            .filter(|m| m.tag == TAG_ADDRESS)
            .last();

        let Some(announcement) = announcement else {
            return;
        };

        match PeerAddress::parse(&announcement.data) {
            Ok(peer) => {
                self.peer = Some(peer);
                let payload = format!("{};{}", grid_name, channel.own_id());
                channel.send_unicast(peer, Message::new(TAG_REGISTER, payload));
                info!(%peer, grid_name, "Registered with race control");
            }
            Err(e) => warn!("Ignoring race control announcement: {}", e),
        }
    }

    fn apply_race_data(&mut self, record: &str) {
        match record.parse::<RaceSnapshot>() {
            Ok(snapshot) => {
                if snapshot.flag != self.snapshot.flag {
                    debug!(from = self.snapshot.flag.name(), to = snapshot.flag.name(), "Flag changed");
                }
                self.snapshot = snapshot;
                self.snapshot_received = true;
            }
            Err(e) => warn!("Keeping previous race data: {}", e),
        }
    }
}
