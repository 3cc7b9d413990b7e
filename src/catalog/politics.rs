//! Political systems and their channel effects

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};
use crate::core::types::{Channel, Effect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoliticalSystem {
    Democracy,
    Authoritarianism,
    MilitaryDictatorship,
    Communism,
    Monarchy,
    Anarchy,
}

const DEMOCRACY: &[Effect] = &[
    Effect::new(Channel::Production, 0.10),
    Effect::new(Channel::Economy, 0.15),
    Effect::new(Channel::Military, -0.05),
];

const AUTHORITARIANISM: &[Effect] = &[
    Effect::new(Channel::Production, 0.05),
    Effect::new(Channel::Economy, 0.05),
    Effect::new(Channel::Military, 0.10),
];

const MILITARY_DICTATORSHIP: &[Effect] = &[
    Effect::new(Channel::Production, 0.20),
    Effect::new(Channel::Economy, -0.10),
    Effect::new(Channel::Military, 0.15),
];

const COMMUNISM: &[Effect] = &[
    Effect::new(Channel::Production, 0.15),
    Effect::new(Channel::Economy, -0.05),
    Effect::new(Channel::Military, 0.05),
];

const MONARCHY: &[Effect] = &[
    Effect::new(Channel::Production, -0.05),
    Effect::new(Channel::Economy, 0.10),
    Effect::new(Channel::Military, 0.05),
];

const ANARCHY: &[Effect] = &[
    Effect::new(Channel::Production, -0.10),
    Effect::new(Channel::Economy, -0.15),
    Effect::new(Channel::Military, 0.20),
];

impl PoliticalSystem {
    pub const ALL: [PoliticalSystem; 6] = [
        PoliticalSystem::Democracy,
        PoliticalSystem::Authoritarianism,
        PoliticalSystem::MilitaryDictatorship,
        PoliticalSystem::Communism,
        PoliticalSystem::Monarchy,
        PoliticalSystem::Anarchy,
    ];

    /// Stable identifier used in commands and storage
    pub fn id(&self) -> &'static str {
        match self {
            PoliticalSystem::Democracy => "democracy",
            PoliticalSystem::Authoritarianism => "authoritarianism",
            PoliticalSystem::MilitaryDictatorship => "military_dictatorship",
            PoliticalSystem::Communism => "communism",
            PoliticalSystem::Monarchy => "monarchy",
            PoliticalSystem::Anarchy => "anarchy",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PoliticalSystem::Democracy => "Democracy",
            PoliticalSystem::Authoritarianism => "Authoritarianism",
            PoliticalSystem::MilitaryDictatorship => "Military dictatorship",
            PoliticalSystem::Communism => "Communism",
            PoliticalSystem::Monarchy => "Monarchy",
            PoliticalSystem::Anarchy => "Anarchy",
        }
    }

    pub fn effects(&self) -> &'static [Effect] {
        match self {
            PoliticalSystem::Democracy => DEMOCRACY,
            PoliticalSystem::Authoritarianism => AUTHORITARIANISM,
            PoliticalSystem::MilitaryDictatorship => MILITARY_DICTATORSHIP,
            PoliticalSystem::Communism => COMMUNISM,
            PoliticalSystem::Monarchy => MONARCHY,
            PoliticalSystem::Anarchy => ANARCHY,
        }
    }
}

impl fmt::Display for PoliticalSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PoliticalSystem {
    type Err = GameError;

    /// Accepts the id, with spaces or dashes in place of underscores
    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        PoliticalSystem::ALL
            .into_iter()
            .find(|system| system.id() == wanted)
            .ok_or_else(|| GameError::InvalidSystem(s.to_string()))
    }
}
