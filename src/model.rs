use serde::Serialize;

pub const DEFAULT_COUNTRY: &str = "Tanzania";
pub const PHC_SOURCE: &str = "2022 Population and Housing Census (PHC)";

/// Root of the extracted tree. Owns every region, council and ward.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub country: String,
    pub source: Option<String>,
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub statistics: Option<Statistics>,
    pub councils: Vec<Council>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Council {
    pub kind: CouncilKind,
    pub name: String,
    pub statistics: Option<Statistics>,
    pub wards: Vec<Ward>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ward {
    pub name: String,
    pub statistics: Option<Statistics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouncilKind {
    DistrictCouncil,
    MunicipalCouncil,
    TownCouncil,
    CityCouncil,
}

/// Six-column demographic summary. Any column may be missing when the
/// source token was blank, a dash or garbled.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub both_sexes: Option<u64>,
    pub male: Option<u64>,
    pub female: Option<u64>,
    pub sex_ratio: Option<u64>,
    pub households: Option<u64>,
    pub average_household_size: Option<f64>,
}

impl CouncilKind {
    pub const ALL: [CouncilKind; 4] = [
        CouncilKind::DistrictCouncil,
        CouncilKind::MunicipalCouncil,
        CouncilKind::TownCouncil,
        CouncilKind::CityCouncil,
    ];

    /// Caption keyword preceding "COUNCIL" in section headers.
    pub fn keyword(self) -> &'static str {
        match self {
            CouncilKind::DistrictCouncil => "DISTRICT",
            CouncilKind::MunicipalCouncil => "MUNICIPAL",
            CouncilKind::TownCouncil => "TOWN",
            CouncilKind::CityCouncil => "CITY",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword().eq_ignore_ascii_case(keyword))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CouncilKind::DistrictCouncil => "district_council",
            CouncilKind::MunicipalCouncil => "municipal_council",
            CouncilKind::TownCouncil => "town_council",
            CouncilKind::CityCouncil => "city_council",
        }
    }
}

impl std::fmt::Display for CouncilKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Dataset {
    pub fn new(country: impl Into<String>, source: Option<String>) -> Self {
        Dataset {
            country: country.into(),
            source,
            regions: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }
}

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Region {
            name: name.into(),
            statistics: None,
            councils: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn council(&self, kind: CouncilKind, name: &str) -> Option<&Council> {
        self.councils.iter().find(|c| c.kind == kind && c.name == name)
    }

    pub fn ward_count(&self) -> usize {
        self.councils.iter().map(|c| c.wards.len()).sum()
    }

    pub fn population(&self) -> u64 {
        self.statistics
            .as_ref()
            .and_then(|s| s.both_sexes)
            .unwrap_or(0)
    }
}

impl Council {
    pub fn new(kind: CouncilKind, name: impl Into<String>) -> Self {
        Council {
            kind,
            name: name.into(),
            statistics: None,
            wards: Vec::new(),
        }
    }

    pub fn ward(&self, name: &str) -> Option<&Ward> {
        self.wards.iter().find(|w| w.name == name)
    }
}

/// Per-region counts printed at the end of a run.
pub struct RegionSummary {
    pub name: String,
    pub councils: usize,
    pub wards: usize,
    pub population: u64,
}

pub struct Summary {
    pub regions: Vec<RegionSummary>,
    pub total_councils: usize,
    pub total_wards: usize,
    pub total_population: u64,
}

impl Summary {
    pub fn of(dataset: &Dataset) -> Self {
        let regions: Vec<RegionSummary> = dataset
            .regions
            .iter()
            .map(|r| RegionSummary {
                name: r.name.clone(),
                councils: r.councils.len(),
                wards: r.ward_count(),
                population: r.population(),
            })
            .collect();

        Summary {
            total_councils: regions.iter().map(|r| r.councils).sum(),
            total_wards: regions.iter().map(|r| r.wards).sum(),
            total_population: regions.iter().map(|r| r.population).sum(),
            regions,
        }
    }
}
