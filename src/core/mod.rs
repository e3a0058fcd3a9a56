pub mod config;
pub mod error;
pub mod types;

pub use config::ExpeditionConfig;
pub use error::{ConfigurationError, DelveError, DiceError, ResolutionError, Result};
pub use types::{CharacterId, GuildId, Role, Stat, Stats, Tick};
