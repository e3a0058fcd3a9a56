//! Non-combat room hazards: traps and treasure checks

pub mod trap;
pub mod treasure;

pub use trap::{resolve_trap, trap_dc, TrapOutcome, TrapReport};
pub use treasure::{resolve_treasure, treasure_dc, TreasureReport};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::core::types::{CharacterId, GuildId, Role, Stats};
    use crate::events::EventLog;
    use crate::party::character::Character;
    use crate::party::guild::Party;

    /// Striker, Scout, Support, Controller with 15 HP and every stat at 10
    pub fn party() -> Party {
        Party::new(
            Role::ALL
                .into_iter()
                .enumerate()
                .map(|(i, role)| {
                    Character::new(CharacterId(i as u32 + 1), role.name(), role, Stats::default(), 15)
                })
                .collect(),
        )
    }

    pub fn log() -> EventLog {
        EventLog::new(GuildId(1), "Test Company")
    }
}
