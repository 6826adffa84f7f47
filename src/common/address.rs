// src/common/address.rs

use core::convert::TryFrom;
use core::fmt;

/// Mesh node a text message is addressed to.
///
/// Displays as eight uppercase hex digits, the form `AT+SEND` expects.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    /// Every node on the channel.
    pub const BROADCAST: NodeId = NodeId(0xFFFF_FFFF);

    #[inline]
    pub const fn new(id: u32) -> Self {
        NodeId(id)
    }

    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_broadcast(&self) -> bool {
        self.0 == Self::BROADCAST.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::BROADCAST
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Radio channel slot (0-7) a message is sent on.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct ChannelIndex(u8);

/// Channel index outside 0-7.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid channel index: {0} (expected 0-{max})", max = ChannelIndex::MAX)]
pub struct InvalidChannelIndex(pub u8);

impl ChannelIndex {
    pub const PRIMARY: ChannelIndex = ChannelIndex(0);
    pub const MAX: u8 = 7;

    pub const fn new(index: u8) -> Result<Self, InvalidChannelIndex> {
        if index <= Self::MAX {
            Ok(ChannelIndex(index))
        } else {
            Err(InvalidChannelIndex(index))
        }
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ChannelIndex {
    type Error = InvalidChannelIndex;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelIndex> for u8 {
    fn from(value: ChannelIndex) -> Self {
        value.0
    }
}

impl fmt::Display for ChannelIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
