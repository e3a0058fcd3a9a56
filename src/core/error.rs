use thiserror::Error;

use crate::core::types::{CharacterId, GuildId, Role, Stat};

/// A guild or party that cannot start an expedition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("guild {guild} has no {role:?} in its active party")]
    MissingRole { guild: GuildId, role: Role },

    #[error("guild {guild} fields more than one {role:?}")]
    DuplicateRole { guild: GuildId, role: Role },

    #[error("active party of guild {guild} must have 4 members, found {found}")]
    PartySize { guild: GuildId, found: usize },

    #[error("character {character} is not on the roster of guild {guild}")]
    UnknownCharacter { guild: GuildId, character: CharacterId },

    #[error("character {character} is resting and sits this expedition out")]
    CharacterResting { character: CharacterId },

    #[error("character {character} has {stat:?} {value}, expected 3..=18")]
    StatOutOfRange { character: CharacterId, stat: Stat, value: i32 },

    #[error("character {character} has no hit points")]
    NoHitPoints { character: CharacterId },

    #[error("character {character} has {hp} HP, above its max of {max_hp}")]
    HpAboveMax { character: CharacterId, hp: u32, max_hp: u32 },

    #[error("guild {0} appears twice in one expedition")]
    DuplicateGuild(GuildId),

    #[error("invalid expedition config: {0}")]
    InvalidConfig(String),
}

/// Broken invariants while resolving a run. The run is aborted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("combat started on floor {floor} room {room} with no enemies")]
    EmptyEncounter { floor: u32, room: u32 },

    #[error("no conscious party member to {action}")]
    NoConsciousMember { action: &'static str },

    #[error("event {event} pushed after the expedition terminated")]
    EventAfterTermination { event: String },

    #[error("expedition already terminated as {0}")]
    AlreadyTerminated(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiceError {
    #[error("a roll needs at least one die")]
    NoDice,

    #[error("a die needs at least two sides, got {0}")]
    TooFewSides(u32),

    #[error("cannot parse dice notation {0:?}")]
    Notation(String),

    #[error("dice expression {0} does not fit a 32-bit total")]
    OutOfRange(String),
}

#[derive(Error, Debug)]
pub enum DelveError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Dice(#[from] DiceError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, DelveError>;
