//! Message tags and delivery policies

use std::fmt;

/// Wire discriminant of every message in the catalog.
///
/// Values are assigned in declaration order and written as the first byte of
/// every payload. Appending a variant is compatible; reordering is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
#[repr(u8)]
pub enum MessageTag {
    ArenaList = 0,
    ArenaParticleSystems,
    ArenaPrefabs,
    ArenaSounds,
    ArenaState,
    BotMessage,
    ChatMessage,
    ControlEntity,
    CreateEntity,
    CreateSpaceship,
    CreateSpaceshipFailure,
    CreateSpaceshipSuccess,
    DeleteEntity,
    DeleteSpaceship,
    DeleteSpaceshipFailure,
    DeleteSpaceshipSuccess,
    HullList,
    InstantiateParticleSystem,
    IntegrityUpdate,
    JoinArena,
    LeaveArena,
    Login,
    LoginByToken,
    LoginFailure,
    LoginSuccess,
    ModuleList,
    NetworkStrings,
    PlayerChat,
    PlayerMovement,
    PlayerShoot,
    PlaySound,
    QueryArenaList,
    QueryHullList,
    QueryModuleList,
    QuerySpaceshipInfo,
    QuerySpaceshipList,
    Register,
    RegisterFailure,
    RegisterSuccess,
    SpaceshipInfo,
    SpaceshipList,
    TimeSyncRequest,
    TimeSyncResponse,
    UpdateSpaceship,
    UpdateSpaceshipFailure,
    UpdateSpaceshipSuccess,
}

impl MessageTag {
    /// Every tag, indexed by its wire value.
    pub const ALL: [Self; 46] = [
        Self::ArenaList,
        Self::ArenaParticleSystems,
        Self::ArenaPrefabs,
        Self::ArenaSounds,
        Self::ArenaState,
        Self::BotMessage,
        Self::ChatMessage,
        Self::ControlEntity,
        Self::CreateEntity,
        Self::CreateSpaceship,
        Self::CreateSpaceshipFailure,
        Self::CreateSpaceshipSuccess,
        Self::DeleteEntity,
        Self::DeleteSpaceship,
        Self::DeleteSpaceshipFailure,
        Self::DeleteSpaceshipSuccess,
        Self::HullList,
        Self::InstantiateParticleSystem,
        Self::IntegrityUpdate,
        Self::JoinArena,
        Self::LeaveArena,
        Self::Login,
        Self::LoginByToken,
        Self::LoginFailure,
        Self::LoginSuccess,
        Self::ModuleList,
        Self::NetworkStrings,
        Self::PlayerChat,
        Self::PlayerMovement,
        Self::PlayerShoot,
        Self::PlaySound,
        Self::QueryArenaList,
        Self::QueryHullList,
        Self::QueryModuleList,
        Self::QuerySpaceshipInfo,
        Self::QuerySpaceshipList,
        Self::Register,
        Self::RegisterFailure,
        Self::RegisterSuccess,
        Self::SpaceshipInfo,
        Self::SpaceshipList,
        Self::TimeSyncRequest,
        Self::TimeSyncResponse,
        Self::UpdateSpaceship,
        Self::UpdateSpaceshipFailure,
        Self::UpdateSpaceshipSuccess,
    ];

    /// Number of tags in the catalog
    pub const COUNT: usize = Self::ALL.len();

    /// Convert from byte
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Position of the tag in dense lookup tables
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Stable catalog name of the message type
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ArenaList => "ArenaList",
            Self::ArenaParticleSystems => "ArenaParticleSystems",
            Self::ArenaPrefabs => "ArenaPrefabs",
            Self::ArenaSounds => "ArenaSounds",
            Self::ArenaState => "ArenaState",
            Self::BotMessage => "BotMessage",
            Self::ChatMessage => "ChatMessage",
            Self::ControlEntity => "ControlEntity",
            Self::CreateEntity => "CreateEntity",
            Self::CreateSpaceship => "CreateSpaceship",
            Self::CreateSpaceshipFailure => "CreateSpaceshipFailure",
            Self::CreateSpaceshipSuccess => "CreateSpaceshipSuccess",
            Self::DeleteEntity => "DeleteEntity",
            Self::DeleteSpaceship => "DeleteSpaceship",
            Self::DeleteSpaceshipFailure => "DeleteSpaceshipFailure",
            Self::DeleteSpaceshipSuccess => "DeleteSpaceshipSuccess",
            Self::HullList => "HullList",
            Self::InstantiateParticleSystem => "InstantiateParticleSystem",
            Self::IntegrityUpdate => "IntegrityUpdate",
            Self::JoinArena => "JoinArena",
            Self::LeaveArena => "LeaveArena",
            Self::Login => "Login",
            Self::LoginByToken => "LoginByToken",
            Self::LoginFailure => "LoginFailure",
            Self::LoginSuccess => "LoginSuccess",
            Self::ModuleList => "ModuleList",
            Self::NetworkStrings => "NetworkStrings",
            Self::PlayerChat => "PlayerChat",
            Self::PlayerMovement => "PlayerMovement",
            Self::PlayerShoot => "PlayerShoot",
            Self::PlaySound => "PlaySound",
            Self::QueryArenaList => "QueryArenaList",
            Self::QueryHullList => "QueryHullList",
            Self::QueryModuleList => "QueryModuleList",
            Self::QuerySpaceshipInfo => "QuerySpaceshipInfo",
            Self::QuerySpaceshipList => "QuerySpaceshipList",
            Self::Register => "Register",
            Self::RegisterFailure => "RegisterFailure",
            Self::RegisterSuccess => "RegisterSuccess",
            Self::SpaceshipInfo => "SpaceshipInfo",
            Self::SpaceshipList => "SpaceshipList",
            Self::TimeSyncRequest => "TimeSyncRequest",
            Self::TimeSyncResponse => "TimeSyncResponse",
            Self::UpdateSpaceship => "UpdateSpaceship",
            Self::UpdateSpaceshipFailure => "UpdateSpaceshipFailure",
            Self::UpdateSpaceshipSuccess => "UpdateSpaceshipSuccess",
        }
    }
}

impl fmt::Display for MessageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transport reliability class requested for an outgoing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reliability {
    /// Delivered exactly once, in order within the channel
    Reliable,
    /// May be lost or reordered
    Unreliable,
}

/// Reliability class plus channel index for an outgoing message.
///
/// Messages sharing a channel are delivered in send order; different channels
/// carry no relative ordering guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryPolicy {
    reliability: Reliability,
    channel: u8,
}

impl DeliveryPolicy {
    /// Create a policy
    #[must_use]
    pub const fn new(reliability: Reliability, channel: u8) -> Self {
        Self {
            reliability,
            channel,
        }
    }

    /// Reliable delivery on the given channel
    #[must_use]
    pub const fn reliable(channel: u8) -> Self {
        Self::new(Reliability::Reliable, channel)
    }

    /// Unreliable delivery on the given channel
    #[must_use]
    pub const fn unreliable(channel: u8) -> Self {
        Self::new(Reliability::Unreliable, channel)
    }

    /// Reliability class
    #[must_use]
    pub const fn reliability(self) -> Reliability {
        self.reliability
    }

    /// Channel index
    #[must_use]
    pub const fn channel(self) -> u8 {
        self.channel
    }

    /// Check if reliable
    #[must_use]
    pub const fn is_reliable(self) -> bool {
        matches!(self.reliability, Reliability::Reliable)
    }
}

impl fmt::Display for DeliveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = if self.is_reliable() {
            "RELIABLE"
        } else {
            "UNRELIABLE"
        };
        write!(f, "{class}@{}", self.channel)
    }
}
