// Use-case level events and channel lifecycle types.

use crate::domain::Player;

/// Events fanned out to every connected channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    ShotEvent { killer: Player, target: Player },
    GameReset { message: String },
}

/// Why the server closed a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    // A newer connection for the same player took over.
    Replaced,
    // Admin reset severed every channel.
    Reset,
    // The channel's outbound queue was full or closed during delivery.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl ChannelState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ChannelState::Disconnected | ChannelState::Failed)
    }
}

impl From<CloseReason> for ChannelState {
    fn from(reason: CloseReason) -> Self {
        match reason {
            CloseReason::Replaced | CloseReason::Reset => ChannelState::Disconnected,
            CloseReason::Failed => ChannelState::Failed,
        }
    }
}
