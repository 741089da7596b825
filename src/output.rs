use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::info;

use crate::model::{Council, CouncilKind, Dataset, Region, Statistics, Ward};

/// JSON shape written for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Regions → councils → wards, each with a `population` block.
    Population,
    /// Regions → `data` entries keyed by council type → ward names.
    Administrative,
}

impl Layout {
    pub fn for_mode(with_statistics: bool) -> Self {
        if with_statistics {
            Layout::Population
        } else {
            Layout::Administrative
        }
    }
}

// ── Population layout ──

#[derive(Serialize)]
struct PopulationDoc<'a> {
    country: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    regions: Vec<PopulationRegion<'a>>,
}

#[derive(Serialize)]
struct PopulationRegion<'a> {
    region: &'a str,
    #[serde(serialize_with = "stats_or_empty")]
    population: Option<&'a Statistics>,
    councils: Vec<PopulationCouncil<'a>>,
}

#[derive(Serialize)]
struct PopulationCouncil<'a> {
    #[serde(rename = "type")]
    kind: CouncilKind,
    name: &'a str,
    #[serde(serialize_with = "stats_or_empty")]
    population: Option<&'a Statistics>,
    wards: Vec<PopulationWard<'a>>,
}

#[derive(Serialize)]
struct PopulationWard<'a> {
    name: &'a str,
    #[serde(serialize_with = "stats_or_empty")]
    population: Option<&'a Statistics>,
}

/// An entity without a statistics row is written as `{}`.
fn stats_or_empty<S: Serializer>(
    stats: &Option<&Statistics>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match stats {
        Some(stats) => stats.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

impl<'a> From<&'a Dataset> for PopulationDoc<'a> {
    fn from(dataset: &'a Dataset) -> Self {
        PopulationDoc {
            country: &dataset.country,
            source: dataset.source.as_deref(),
            regions: dataset.regions.iter().map(PopulationRegion::from).collect(),
        }
    }
}

impl<'a> From<&'a Region> for PopulationRegion<'a> {
    fn from(region: &'a Region) -> Self {
        PopulationRegion {
            region: &region.name,
            population: region.statistics.as_ref(),
            councils: region.councils.iter().map(PopulationCouncil::from).collect(),
        }
    }
}

impl<'a> From<&'a Council> for PopulationCouncil<'a> {
    fn from(council: &'a Council) -> Self {
        PopulationCouncil {
            kind: council.kind,
            name: &council.name,
            population: council.statistics.as_ref(),
            wards: council.wards.iter().map(PopulationWard::from).collect(),
        }
    }
}

impl<'a> From<&'a Ward> for PopulationWard<'a> {
    fn from(ward: &'a Ward) -> Self {
        PopulationWard {
            name: &ward.name,
            population: ward.statistics.as_ref(),
        }
    }
}

// ── Administrative layout ──

#[derive(Serialize)]
struct AdministrativeDoc<'a> {
    country: &'a str,
    regions: Vec<AdministrativeRegion<'a>>,
}

#[derive(Serialize)]
struct AdministrativeRegion<'a> {
    region: &'a str,
    data: Vec<AdministrativeCouncil<'a>>,
}

/// `{"town_council": "Nzega", "wards": [...]}`: the council type is the key.
struct AdministrativeCouncil<'a>(&'a Council);

impl Serialize for AdministrativeCouncil<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let council = self.0;
        let wards: Vec<&str> = council.wards.iter().map(|w| w.name.as_str()).collect();
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(council.kind.as_str(), &council.name)?;
        map.serialize_entry("wards", &wards)?;
        map.end()
    }
}

impl<'a> From<&'a Dataset> for AdministrativeDoc<'a> {
    fn from(dataset: &'a Dataset) -> Self {
        AdministrativeDoc {
            country: &dataset.country,
            regions: dataset
                .regions
                .iter()
                .map(|r| AdministrativeRegion {
                    region: &r.name,
                    data: r.councils.iter().map(AdministrativeCouncil).collect(),
                })
                .collect(),
        }
    }
}

// ── Writing ──

/// Pretty-printed JSON (two-space indent, UTF-8 kept as is).
fn render(dataset: &Dataset, layout: Layout) -> serde_json::Result<String> {
    match layout {
        Layout::Population => serde_json::to_string_pretty(&PopulationDoc::from(dataset)),
        Layout::Administrative => serde_json::to_string_pretty(&AdministrativeDoc::from(dataset)),
    }
}

/// Write the dataset next to `path` first and rename it into place, so an
/// interrupted run leaves no half-written file behind.
pub fn write_dataset(path: &Path, dataset: &Dataset, layout: Layout) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    let written = write_json(&tmp, dataset, layout).and_then(|()| {
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to move output into place: {}", path.display()))
    });
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written?;

    info!("Data saved to: {}", path.display());
    Ok(())
}

fn write_json(path: &Path, dataset: &Dataset, layout: Layout) -> Result<()> {
    let json = render(dataset, layout)?;
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{}", json)?;
    writer.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
