pub mod classify;
pub mod hierarchy;
pub mod normalize;

use indicatif::ProgressBar;
use tracing::debug;

use crate::model::{Dataset, DEFAULT_COUNTRY, PHC_SOURCE};
use crate::source::PageSource;
use classify::Classifier;
use hierarchy::HierarchyBuilder;

/// Inclusive, 1-indexed page span. The census tables run from page 54 to 286.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: usize,
    pub end: usize,
}

impl Default for PageRange {
    fn default() -> Self {
        PageRange { start: 54, end: 286 }
    }
}

impl PageRange {
    /// Page numbers actually present in a source of `page_count` pages.
    pub fn clamp(self, page_count: usize) -> std::ops::RangeInclusive<usize> {
        self.start.max(1)..=self.end.min(page_count)
    }
}

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Parse the six-column statistics rows. Off means names only.
    pub with_statistics: bool,
    pub country: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            with_statistics: true,
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

/// Pages → lines → records → tree. Pages without text are skipped.
pub fn extract_pages<S: PageSource + ?Sized>(
    source: &S,
    range: PageRange,
    options: &ExtractOptions,
    progress: &ProgressBar,
) -> Dataset {
    let source_caption = options.with_statistics.then(|| PHC_SOURCE.to_string());
    let mut builder = HierarchyBuilder::new(
        Classifier::new(options.with_statistics),
        Dataset::new(options.country.clone(), source_caption),
    );

    for number in range.clamp(source.page_count()) {
        match source.page_text(number) {
            Some(text) if !text.trim().is_empty() => builder.feed_page(text),
            _ => debug!("Page {} has no text, skipping", number),
        }
        progress.inc(1);
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CouncilKind;
    use crate::source::Document;
    use std::collections::HashSet;
    use std::path::Path;

    fn fixture() -> Document {
        Document::open(Path::new("tests/fixtures/report_pages.txt")).unwrap()
    }

    fn run(with_statistics: bool) -> Dataset {
        let options = ExtractOptions {
            with_statistics,
            ..Default::default()
        };
        let range = PageRange { start: 1, end: 100 };
        extract_pages(&fixture(), range, &options, &ProgressBar::hidden())
    }

    #[test]
    fn range_clamps_to_source() {
        assert_eq!(PageRange { start: 54, end: 286 }.clamp(100), 54..=100);
        assert_eq!(PageRange { start: 0, end: 3 }.clamp(10), 1..=3);
        assert!(PageRange { start: 5, end: 4 }.clamp(10).is_empty());
    }

    #[test]
    fn fixture_regions_in_document_order() {
        let dataset = run(true);
        let names: Vec<&str> = dataset.regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Arusha", "Tabora"]);
        assert_eq!(dataset.country, "Tanzania");
        assert_eq!(dataset.source.as_deref(), Some(PHC_SOURCE));
    }

    #[test]
    fn arusha_header_and_statistics() {
        let dataset = run(true);
        let arusha = dataset.region("Arusha").unwrap();
        let stats = arusha.statistics.as_ref().unwrap();
        assert_eq!(stats.both_sexes, Some(1_694_310));
        assert_eq!(stats.average_household_size, Some(4.2));
    }

    #[test]
    fn councils_continue_across_pages() {
        let dataset = run(true);
        let arusha = dataset.region("Arusha").unwrap();
        let city = arusha.council(CouncilKind::CityCouncil, "Arusha").unwrap();
        let names: Vec<&str> = city.wards.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["Baraa", "Daraja Mbili", "Elerai", "Kaloleni"]);
        assert!(city.wards.iter().all(|w| w.statistics.is_some()));
    }

    #[test]
    fn tabora_town_council_and_rejections() {
        let dataset = run(true);
        let tabora = dataset.region("Tabora").unwrap();
        let nzega = tabora.council(CouncilKind::TownCouncil, "Nzega").unwrap();
        let mwanzo = nzega.ward("Mwanzo").unwrap();
        assert_eq!(mwanzo.statistics.as_ref().unwrap().both_sexes, Some(12_000));
        assert_eq!(nzega.wards.iter().filter(|w| w.name == "Mwanzo").count(), 1);
        assert!(nzega.ward("District Office").is_none());
    }

    #[test]
    fn tree_invariants_hold() {
        const SKIP: [&str; 6] = ["Council", "District", "Region", "Town", "City", "Municipal"];
        for with_statistics in [true, false] {
            let dataset = run(with_statistics);
            let mut regions = HashSet::new();
            for region in &dataset.regions {
                assert!(regions.insert(region.name.as_str()));
                let mut councils = HashSet::new();
                for council in &region.councils {
                    assert!(councils.insert((council.kind, council.name.as_str())));
                    let mut wards = HashSet::new();
                    for ward in &council.wards {
                        assert!(wards.insert(ward.name.as_str()));
                        assert!(!SKIP.iter().any(|t| ward.name.contains(t)), "{}", ward.name);
                        assert_eq!(ward.statistics.is_some(), with_statistics);
                    }
                }
            }
        }
    }

    #[test]
    fn extraction_is_idempotent() {
        assert_eq!(run(true), run(true));
        assert_eq!(run(false), run(false));
    }

    #[test]
    fn administrative_mode_has_no_statistics() {
        let dataset = run(false);
        assert!(dataset.source.is_none());
        assert!(dataset.regions.iter().all(|r| r.statistics.is_none()));
        let tabora = dataset.region("Tabora").unwrap();
        assert!(tabora.council(CouncilKind::TownCouncil, "Nzega").is_some());
    }

    #[test]
    fn range_limits_pages() {
        let options = ExtractOptions::default();
        let only_first = PageRange { start: 1, end: 1 };
        let dataset = extract_pages(&fixture(), only_first, &options, &ProgressBar::hidden());
        let names: Vec<&str> = dataset.regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Arusha"]);
    }

    #[test]
    fn missing_pages_are_skipped() {
        let pages = vec![
            String::new(),
            "Table 1.0: Population Distribution by Council, Arusha Region; 2022 PHC".to_string(),
        ];
        let dataset = extract_pages(
            &pages,
            PageRange { start: 1, end: 5 },
            &ExtractOptions::default(),
            &ProgressBar::hidden(),
        );
        assert_eq!(dataset.regions.len(), 1);
    }
}
