//! Countries and their region catalogs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};
use crate::core::types::Effect;
use crate::core::types::Channel::{Economy as E, Military as M, Production as P};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Country {
    Ukraine,
    Russia,
    Belarus,
}

impl Country {
    pub const ALL: [Country; 3] = [Country::Ukraine, Country::Russia, Country::Belarus];

    pub fn name(&self) -> &'static str {
        match self {
            Country::Ukraine => "Ukraine",
            Country::Russia => "Russia",
            Country::Belarus => "Belarus",
        }
    }

    /// Native spelling, also accepted on input
    fn native_name(&self) -> &'static str {
        match self {
            Country::Ukraine => "Украина",
            Country::Russia => "Россия",
            Country::Belarus => "Беларусь",
        }
    }

    /// Regions a player of this country controls on selection
    pub fn regions(&self) -> &'static [RegionSpec] {
        match self {
            Country::Ukraine => UKRAINE,
            Country::Russia | Country::Belarus => &[],
        }
    }

    pub fn region(&self, id: &str) -> Result<&'static RegionSpec> {
        self.regions()
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| GameError::UnknownRegion(id.to_string()))
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Country {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Country::ALL
            .into_iter()
            .find(|c| c.name().to_lowercase() == wanted || c.native_name().to_lowercase() == wanted)
            .ok_or_else(|| GameError::InvalidCountry(s.to_string()))
    }
}

/// Static catalog entry for a sub-national region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub capital: &'static str,
    pub effects: &'static [Effect],
    pub is_capital: bool,
}

const fn region(
    id: &'static str,
    name: &'static str,
    capital: &'static str,
    effects: &'static [Effect],
) -> RegionSpec {
    RegionSpec {
        id,
        name,
        capital,
        effects,
        is_capital: false,
    }
}

const UKRAINE: &[RegionSpec] = &[
    region("vinnitsa", "Vinnytsia Oblast", "Vinnytsia", &[Effect::new(E, 0.05), Effect::new(P, 0.02)]),
    region("volyn", "Volyn Oblast", "Lutsk", &[Effect::new(E, 0.03), Effect::new(M, 0.02)]),
    region("dnipro", "Dnipropetrovsk Oblast", "Dnipro", &[Effect::new(E, 0.10), Effect::new(P, 0.10)]),
    region("donetsk", "Donetsk Oblast", "Donetsk", &[Effect::new(P, 0.15), Effect::new(E, 0.07)]),
    region("zhytomyr", "Zhytomyr Oblast", "Zhytomyr", &[Effect::new(E, 0.04), Effect::new(P, 0.02)]),
    region("zakarpattia", "Zakarpattia Oblast", "Uzhhorod", &[Effect::new(E, 0.06), Effect::new(M, 0.03)]),
    region("zaporizhzhia", "Zaporizhzhia Oblast", "Zaporizhzhia", &[Effect::new(P, 0.12), Effect::new(E, 0.08)]),
    region("ivano_frankivsk", "Ivano-Frankivsk Oblast", "Ivano-Frankivsk", &[Effect::new(E, 0.07), Effect::new(M, 0.02)]),
    region("kyiv_region", "Kyiv Oblast", "Kyiv", &[Effect::new(E, 0.10), Effect::new(P, 0.05), Effect::new(M, 0.05)]),
    region("kirovohrad", "Kirovohrad Oblast", "Kropyvnytskyi", &[Effect::new(E, 0.05), Effect::new(P, 0.03)]),
    region("luhansk", "Luhansk Oblast", "Luhansk", &[Effect::new(P, 0.12), Effect::new(E, 0.06)]),
    region("lviv", "Lviv Oblast", "Lviv", &[Effect::new(E, 0.09), Effect::new(M, 0.04)]),
    region("mykolaiv", "Mykolaiv Oblast", "Mykolaiv", &[Effect::new(P, 0.08), Effect::new(E, 0.07), Effect::new(M, 0.05)]),
    region("odesa", "Odesa Oblast", "Odesa", &[Effect::new(E, 0.12), Effect::new(M, 0.06)]),
    region("poltava", "Poltava Oblast", "Poltava", &[Effect::new(E, 0.07), Effect::new(P, 0.06)]),
    region("rivne", "Rivne Oblast", "Rivne", &[Effect::new(E, 0.04), Effect::new(P, 0.03)]),
    region("sumy", "Sumy Oblast", "Sumy", &[Effect::new(E, 0.05), Effect::new(M, 0.04)]),
    region("ternopil", "Ternopil Oblast", "Ternopil", &[Effect::new(E, 0.04), Effect::new(P, 0.02)]),
    region("kharkiv", "Kharkiv Oblast", "Kharkiv", &[Effect::new(E, 0.09), Effect::new(P, 0.09), Effect::new(M, 0.05)]),
    region("kherson", "Kherson Oblast", "Kherson", &[Effect::new(E, 0.06), Effect::new(M, 0.03)]),
    region("khmelnytskyi", "Khmelnytskyi Oblast", "Khmelnytskyi", &[Effect::new(E, 0.05), Effect::new(P, 0.04)]),
    region("cherkasy", "Cherkasy Oblast", "Cherkasy", &[Effect::new(E, 0.06), Effect::new(P, 0.04)]),
    region("chernihiv", "Chernihiv Oblast", "Chernihiv", &[Effect::new(E, 0.04), Effect::new(M, 0.03)]),
    region("chernivtsi", "Chernivtsi Oblast", "Chernivtsi", &[Effect::new(E, 0.05), Effect::new(M, 0.02)]),
    region("crimea", "Autonomous Republic of Crimea", "Simferopol", &[Effect::new(E, 0.08), Effect::new(M, 0.07)]),
    RegionSpec {
        id: "kyiv_city",
        name: "Kyiv",
        capital: "Kyiv",
        effects: &[Effect::new(E, 0.15), Effect::new(P, 0.10), Effect::new(M, 0.10)],
        is_capital: true,
    },
    region("sevastopol", "Sevastopol", "Sevastopol", &[Effect::new(E, 0.06), Effect::new(M, 0.08)]),
];
