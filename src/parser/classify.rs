use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::normalize::{clean_text, parse_count, parse_decimal, title_case};
use crate::model::{Council, CouncilKind, Region, Statistics};

/// both_sexes, male, female, sex_ratio, households, average_household_size.
/// Each column may also be a not-available dash.
const STATS: &str = r"([\d,]+|[-–—])\s+([\d,]+|[-–—])\s+([\d,]+|[-–—])\s+(\d+|[-–—])\s+([\d,]+|[-–—])\s+([\d.]+|[-–—])";
const CENSUS_MARKER: &str = r"\s+Region[;\s,]+(?:19|20)\d{2}\s+PHC";

static REGION_HEADER_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(&format!(r"(?i)by\s+Council[,\s]+([A-Z][a-zA-Z\s]{{3,25}}?){CENSUS_MARKER}")).unwrap(),
        Regex::new(&format!(r"(?i)Council\s+([A-Z][a-zA-Z\s]{{3,25}}?){CENSUS_MARKER}")).unwrap(),
    ]
});
/// Looser `Table n.0: <Name> Region` caption, only tried for names-only runs.
static TABLE_CAPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)Table\s+\d+\.\s*0[:\s]+.*?\b([A-Z][a-zA-Z\s]{{3,25}}?){CENSUS_MARKER}")).unwrap()
});
static REGION_STATS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^\s+Region\s+{STATS}")).unwrap());
static COUNCIL_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+\.\s*\d+\s+([A-Z][A-Z\s'/-]*?)\s+(DISTRICT|MUNICIPAL|TOWN|CITY)\s+COUNCIL").unwrap()
});
static COUNCIL_STATS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:\s+(?:District|Municipal|Town|City))?(?:\s+Council)?\s+{STATS}"
    ))
    .unwrap()
});
static WARD_STATS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(\d+)\.\s+([A-Z][a-zA-Z\s'-]+?)\s+{STATS}")).unwrap()
});
static WARD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s+([A-Z][a-zA-Z\s'-]+?)(?:\s+\d|$)").unwrap());

/// Words that show up in region captures when the two-line join glued
/// unrelated table titles together.
const REGION_BOILERPLATE: &[&str] = &[
    "Household",
    "Number",
    "Average",
    "Size",
    "Population",
    "Distribution",
];
/// A numbered line carrying one of these is a header the ward pattern swept up.
const WARD_SKIP_TERMS: &[&str] = &["Council", "Municipal", "District", "Region", "Town", "City"];

const REGION_NAME_LEN: std::ops::RangeInclusive<usize> = 4..=26;
const MIN_WARD_NAME_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    RegionHeader { name: String },
    RegionStats(Statistics),
    CouncilHeader { kind: CouncilKind, name: String },
    CouncilStats(Statistics),
    WardEntry { name: String, statistics: Option<Statistics> },
    Rejected(Rejection),
    NoMatch,
}

/// Why a line that looked like a record was thrown away.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    BoilerplateRegion(String),
    RegionNameLength(String),
    WardSkipTerm(String),
    WardNameTooShort(String),
}

/// One line of page text plus the same line joined to its successor.
pub struct LineView<'a> {
    pub line: &'a str,
    pub joined: Cow<'a, str>,
}

impl<'a> LineView<'a> {
    pub fn new(line: &'a str, next: Option<&str>) -> Self {
        let line = line.trim();
        let joined = match next {
            Some(next) => Cow::Owned(format!("{} {}", line, next.trim())),
            None => Cow::Borrowed(line),
        };
        LineView { line, joined }
    }
}

/// Read-only view of the builder's cursor handed to the matchers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'a> {
    pub region: Option<&'a Region>,
    pub council: Option<&'a Council>,
}

enum Outcome {
    Pass,
    Hit(Record),
    Reject(Rejection),
}

type Matcher = fn(&Classifier, &LineView<'_>, &Scope<'_>) -> Outcome;

/// Tried top to bottom; the first hit or reject decides the line.
const MATCHERS: &[Matcher] = &[
    match_region_header,
    match_region_stats,
    match_council_header,
    match_council_stats,
    match_ward,
];

#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    with_statistics: bool,
}

impl Classifier {
    pub fn new(with_statistics: bool) -> Self {
        Classifier { with_statistics }
    }

    pub fn classify(&self, view: &LineView<'_>, scope: &Scope<'_>) -> Record {
        for matcher in MATCHERS {
            match matcher(self, view, scope) {
                Outcome::Pass => continue,
                Outcome::Hit(record) => return record,
                Outcome::Reject(reason) => return Record::Rejected(reason),
            }
        }
        Record::NoMatch
    }

    #[cfg(test)]
    pub fn classify_line(&self, line: &str, next: Option<&str>, scope: &Scope<'_>) -> Record {
        self.classify(&LineView::new(line, next), scope)
    }
}

fn match_region_header(classifier: &Classifier, view: &LineView<'_>, _: &Scope<'_>) -> Outcome {
    let table_caption = (!classifier.with_statistics).then_some(&*TABLE_CAPTION_RE);
    // A caption found wholly in the lookahead belongs to the next line.
    let starts_here =
        |caps: &Captures<'_>| caps.get(0).is_some_and(|m| m.start() < view.line.len());
    let Some(caps) = REGION_HEADER_RES
        .iter()
        .chain(table_caption)
        .find_map(|re| re.captures(&view.joined).filter(starts_here))
    else {
        return Outcome::Pass;
    };
    let name = clean_text(&caps[1]);

    if REGION_BOILERPLATE.iter().any(|w| name.contains(w))
        || name.to_lowercase().contains("by")
    {
        return Outcome::Reject(Rejection::BoilerplateRegion(name));
    }
    if !REGION_NAME_LEN.contains(&name.chars().count()) {
        return Outcome::Reject(Rejection::RegionNameLength(name));
    }
    Outcome::Hit(Record::RegionHeader { name })
}

fn match_region_stats(classifier: &Classifier, view: &LineView<'_>, scope: &Scope<'_>) -> Outcome {
    if !classifier.with_statistics {
        return Outcome::Pass;
    }
    let Some(region) = scope.region.filter(|r| r.statistics.is_none()) else {
        return Outcome::Pass;
    };
    view.line
        .strip_prefix(region.name.as_str())
        .and_then(|rest| REGION_STATS_RE.captures(rest))
        .map(|caps| Outcome::Hit(Record::RegionStats(statistics_from(&caps, 1))))
        .unwrap_or(Outcome::Pass)
}

fn match_council_header(_: &Classifier, view: &LineView<'_>, scope: &Scope<'_>) -> Outcome {
    if scope.region.is_none() {
        return Outcome::Pass;
    }
    let Some(caps) = COUNCIL_HEADER_RE.captures(view.line) else {
        return Outcome::Pass;
    };
    let Some(kind) = CouncilKind::from_keyword(&caps[2]) else {
        return Outcome::Pass;
    };
    let name = title_case(&clean_text(&caps[1]));
    if name.is_empty() {
        return Outcome::Pass;
    }
    Outcome::Hit(Record::CouncilHeader { kind, name })
}

fn match_council_stats(classifier: &Classifier, view: &LineView<'_>, scope: &Scope<'_>) -> Outcome {
    if !classifier.with_statistics {
        return Outcome::Pass;
    }
    let Some(council) = scope.council.filter(|c| c.statistics.is_none()) else {
        return Outcome::Pass;
    };
    strip_prefix_ignore_case(view.line, &council.name)
        .and_then(|rest| COUNCIL_STATS_RE.captures(rest))
        .map(|caps| Outcome::Hit(Record::CouncilStats(statistics_from(&caps, 1))))
        .unwrap_or(Outcome::Pass)
}

fn match_ward(classifier: &Classifier, view: &LineView<'_>, scope: &Scope<'_>) -> Outcome {
    if scope.council.is_none() {
        return Outcome::Pass;
    }
    let re: &Regex = if classifier.with_statistics {
        &WARD_STATS_RE
    } else {
        &WARD_NAME_RE
    };
    let Some(caps) = re.captures(view.line) else {
        return Outcome::Pass;
    };
    let name = clean_text(&caps[2]);

    if WARD_SKIP_TERMS.iter().any(|term| name.contains(term)) {
        return Outcome::Reject(Rejection::WardSkipTerm(name));
    }
    if name.chars().count() < MIN_WARD_NAME_LEN {
        return Outcome::Reject(Rejection::WardNameTooShort(name));
    }

    let statistics = classifier
        .with_statistics
        .then(|| statistics_from(&caps, 3));
    Outcome::Hit(Record::WardEntry { name, statistics })
}

fn statistics_from(caps: &Captures<'_>, first: usize) -> Statistics {
    let col = |offset: usize| caps.get(first + offset).map_or("", |m| m.as_str());
    Statistics {
        both_sexes: parse_count(col(0)),
        male: parse_count(col(1)),
        female: parse_count(col(2)),
        sex_ratio: parse_count(col(3)),
        households: parse_count(col(4)),
        average_household_size: parse_decimal(col(5)),
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}
