//! Multi-guild runner
//!
//! One expedition per guild on a bounded rayon pool. Runs share nothing:
//! each gets its own party snapshot, event log and roller seeded from the
//! run seed and the guild id. A guild that fails is reported, the rest
//! carry on.

use ahash::AHashSet;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{info, warn};

use crate::core::config::ExpeditionConfig;
use crate::core::error::{ConfigurationError, DelveError, Result};
use crate::core::types::{CharacterId, GuildId};
use crate::dice::SeededDice;
use crate::expedition::{Expedition, ExpeditionReport};
use crate::party::guild::Guild;
use crate::recovery::{recover, RecoveryReport};

/// Odd 64-bit constant spreading guild ids across the seed space
const SEED_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for one guild's roller
pub fn guild_seed(seed: u64, guild: GuildId) -> u64 {
    seed ^ u64::from(guild.0).wrapping_mul(SEED_SPREAD)
}

/// Result of one guild's scheduled run
#[derive(Debug)]
pub enum GuildOutcome {
    Finished {
        guild: Guild,
        report: Box<ExpeditionReport>,
        recovery: RecoveryReport,
    },
    /// A resting member had no rested reserve, so the whole guild stayed
    /// home. The rest is used up.
    SatOut { guild: Guild, rested: Vec<CharacterId> },
    /// The guild could not start, or its run aborted; the guild is unchanged
    Failed { guild: Guild, error: DelveError },
}

impl GuildOutcome {
    pub fn guild(&self) -> &Guild {
        match self {
            GuildOutcome::Finished { guild, .. }
            | GuildOutcome::SatOut { guild, .. }
            | GuildOutcome::Failed { guild, .. } => guild,
        }
    }

    pub fn report(&self) -> Option<&ExpeditionReport> {
        match self {
            GuildOutcome::Finished { report, .. } => Some(&**report),
            GuildOutcome::SatOut { .. } | GuildOutcome::Failed { .. } => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, GuildOutcome::Finished { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, GuildOutcome::Failed { .. })
    }
}

pub struct ExpeditionRunner {
    config: ExpeditionConfig,
    pool: ThreadPool,
}

impl ExpeditionRunner {
    pub fn new(config: ExpeditionConfig) -> Result<Self> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("delve-worker-{}", i))
            .build()?;
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &ExpeditionConfig {
        &self.config
    }

    /// Run every guild once. Outcomes come back in input order.
    pub fn run(&self, guilds: Vec<Guild>, seed: u64) -> Result<Vec<GuildOutcome>> {
        let mut seen = AHashSet::with_capacity(guilds.len());
        for guild in &guilds {
            if !seen.insert(guild.id) {
                return Err(ConfigurationError::DuplicateGuild(guild.id).into());
            }
        }

        info!(guilds = guilds.len(), threads = self.pool.current_num_threads(), seed, "running expeditions");
        let config = &self.config;
        let outcomes: Vec<GuildOutcome> = self.pool.install(|| {
            guilds
                .into_par_iter()
                .map(|guild| run_guild(guild, config, seed))
                .collect()
        });

        let finished = outcomes.iter().filter(|o| o.is_finished()).count();
        let failed = outcomes.iter().filter(|o| o.is_failed()).count();
        info!(finished, sat_out = outcomes.len() - finished - failed, failed, "expeditions done");
        Ok(outcomes)
    }
}

/// Expedition then recovery for one guild, both on the guild's own roller
pub fn run_guild(mut guild: Guild, config: &ExpeditionConfig, seed: u64) -> GuildOutcome {
    let mut dice = SeededDice::new(guild_seed(seed, guild.id));
    let result = Expedition::with_dice(&guild, config.clone(), &mut dice)
        .and_then(|expedition| expedition.run().map_err(DelveError::from));

    match result {
        Ok(report) => {
            let recovery = recover(&mut guild, &report, config, &mut dice);
            GuildOutcome::Finished { guild, report: Box::new(report), recovery }
        }
        Err(DelveError::Configuration(ConfigurationError::CharacterResting { .. })) => {
            let rested = guild.sit_out();
            info!(guild = %guild.id, name = %guild.name, ?rested, "guild sits this expedition out");
            GuildOutcome::SatOut { guild, rested }
        }
        Err(error) => {
            warn!(guild = %guild.id, name = %guild.name, %error, "expedition failed");
            GuildOutcome::Failed { guild, error }
        }
    }
}
