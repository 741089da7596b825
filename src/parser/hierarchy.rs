use tracing::{debug, info};

use super::classify::{Classifier, LineView, Record, Scope};
use crate::model::{Council, CouncilKind, Dataset, Region, Statistics, Ward};

/// Where the builder currently is in the tree. Indices point into the
/// dataset it owns; a council position always carries its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    NoRegion,
    InRegion { region: usize },
    InCouncil { region: usize, council: usize },
}

pub struct HierarchyBuilder {
    classifier: Classifier,
    dataset: Dataset,
    cursor: Cursor,
}

impl HierarchyBuilder {
    pub fn new(classifier: Classifier, dataset: Dataset) -> Self {
        HierarchyBuilder {
            classifier,
            dataset,
            cursor: Cursor::NoRegion,
        }
    }

    #[cfg(test)]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[cfg(test)]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn finish(self) -> Dataset {
        self.dataset
    }

    /// Run every line of one page through the classifier. Each line is looked
    /// at together with the next one, but the cursor moves one line at a time.
    pub fn feed_page(&mut self, text: &str) {
        let lines: Vec<&str> = text.lines().collect();
        for (i, raw) in lines.iter().enumerate() {
            if raw.trim().is_empty() {
                continue;
            }
            let view = LineView::new(raw, lines.get(i + 1).copied());
            let record = self.classifier.classify(&view, &self.scope());
            self.apply(record);
        }
    }

    pub fn apply(&mut self, record: Record) {
        match record {
            Record::RegionHeader { name } => self.enter_region(name),
            Record::RegionStats(stats) => self.attach_region_stats(stats),
            Record::CouncilHeader { kind, name } => self.enter_council(kind, name),
            Record::CouncilStats(stats) => self.attach_council_stats(stats),
            Record::WardEntry { name, statistics } => self.add_ward(name, statistics),
            Record::Rejected(reason) => debug!("Skipped line: {:?}", reason),
            Record::NoMatch => {}
        }
    }

    fn scope(&self) -> Scope<'_> {
        match self.cursor {
            Cursor::NoRegion => Scope::default(),
            Cursor::InRegion { region } => Scope {
                region: self.dataset.regions.get(region),
                council: None,
            },
            Cursor::InCouncil { region, council } => {
                let region = self.dataset.regions.get(region);
                Scope {
                    region,
                    council: region.and_then(|r| r.councils.get(council)),
                }
            }
        }
    }

    fn enter_region(&mut self, name: String) {
        let idx = match self.dataset.regions.iter().position(|r| r.name == name) {
            Some(idx) => idx,
            None => {
                info!("Found region: {}", name);
                self.dataset.regions.push(Region::new(name));
                self.dataset.regions.len() - 1
            }
        };
        self.cursor = Cursor::InRegion { region: idx };
    }

    fn enter_council(&mut self, kind: CouncilKind, name: String) {
        let region_idx = match self.cursor {
            Cursor::InRegion { region } | Cursor::InCouncil { region, .. } => region,
            Cursor::NoRegion => return,
        };
        let Some(region) = self.dataset.regions.get_mut(region_idx) else {
            return;
        };
        let idx = match region
            .councils
            .iter()
            .position(|c| c.kind == kind && c.name == name)
        {
            Some(idx) => idx,
            None => {
                info!("  Found {}: {}", kind, name);
                region.councils.push(Council::new(kind, name));
                region.councils.len() - 1
            }
        };
        self.cursor = Cursor::InCouncil {
            region: region_idx,
            council: idx,
        };
    }

    fn current_region_mut(&mut self) -> Option<&mut Region> {
        match self.cursor {
            Cursor::InRegion { region } | Cursor::InCouncil { region, .. } => {
                self.dataset.regions.get_mut(region)
            }
            Cursor::NoRegion => None,
        }
    }

    fn current_council_mut(&mut self) -> Option<&mut Council> {
        match self.cursor {
            Cursor::InCouncil { region, council } => self
                .dataset
                .regions
                .get_mut(region)
                .and_then(|r| r.councils.get_mut(council)),
            _ => None,
        }
    }

    fn attach_region_stats(&mut self, stats: Statistics) {
        if let Some(region) = self.current_region_mut() {
            if region.statistics.is_none() {
                debug!("  Region stats: {:?} people", stats.both_sexes);
                region.statistics = Some(stats);
            }
        }
    }

    fn attach_council_stats(&mut self, stats: Statistics) {
        if let Some(council) = self.current_council_mut() {
            if council.statistics.is_none() {
                debug!("    Council stats: {:?} people", stats.both_sexes);
                council.statistics = Some(stats);
            }
        }
    }

    fn add_ward(&mut self, name: String, statistics: Option<Statistics>) {
        let Some(council) = self.current_council_mut() else {
            return;
        };
        if council.ward(&name).is_none() {
            council.wards.push(Ward { name, statistics });
        }
    }
}
