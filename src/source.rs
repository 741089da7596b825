use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// `pdftotext` separates pages with a form feed.
const PAGE_BREAK: char = '\u{c}';
/// Directory pages numbered above this are not report pages.
const MAX_PAGE: usize = 10_000;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("page source not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read page source {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Anything that can hand out the plain text of a report page.
/// Pages are numbered from 1, as printed in the report's page index.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// `None` when the page has no extractable text.
    fn page_text(&self, number: usize) -> Option<&str>;
}

/// Page texts loaded from disk.
#[derive(Debug, Clone)]
pub struct Document {
    pages: Vec<Option<String>>,
}

impl Document {
    /// Load a form-feed separated text dump, or a directory holding one
    /// `.txt` file per page (`page-054.txt`, `54.txt`, ...).
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }
        let io_err = |source: io::Error| SourceError::Io {
            path: path.to_path_buf(),
            source,
        };

        let doc = if path.is_dir() {
            Self::from_directory(path).map_err(io_err)?
        } else {
            Self::from_dump(&fs::read_to_string(path).map_err(io_err)?)
        };
        info!("Loaded {} pages from {}", doc.pages.len(), path.display());
        Ok(doc)
    }

    pub fn from_dump(text: &str) -> Self {
        let mut pages: Vec<Option<String>> = text
            .split(PAGE_BREAK)
            .map(|p| Some(p.to_string()))
            .collect();
        // A dump ending in a page break leaves an empty tail that is not a page.
        if text.ends_with(PAGE_BREAK) {
            pages.pop();
        }
        Document { pages }
    }

    fn from_directory(dir: &Path) -> io::Result<Self> {
        let mut numbered: BTreeMap<usize, String> = BTreeMap::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(number) = page_number(&path) else {
                continue;
            };
            if number == 0 || number > MAX_PAGE {
                debug!("Ignoring {}: page number {} out of range", path.display(), number);
                continue;
            }
            numbered.insert(number, fs::read_to_string(&path)?);
        }

        let last = numbered.keys().next_back().copied().unwrap_or(0);
        let mut pages = vec![None; last];
        for (number, text) in numbered {
            pages[number - 1] = Some(text);
        }
        Ok(Document { pages })
    }
}

impl PageSource for Document {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, number: usize) -> Option<&str> {
        let idx = number.checked_sub(1)?;
        self.pages.get(idx)?.as_deref()
    }
}

impl PageSource for Vec<String> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, number: usize) -> Option<&str> {
        self.get(number.checked_sub(1)?).map(String::as_str)
    }
}

/// Last run of digits in the file stem: `report-2022-p054` → 54.
fn page_number(path: &Path) -> Option<usize> {
    let stem = path.file_stem()?.to_str()?;
    let end = stem.rfind(|c: char| c.is_ascii_digit())? + 1;
    let head = &stem[..end];
    let start = head.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    head[start..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_splits_on_form_feed() {
        let doc = Document::from_dump("first\u{c}second\u{c}\u{c}fourth\u{c}");
        assert_eq!(doc.page_count(), 4);
        assert_eq!(doc.page_text(1), Some("first"));
        assert_eq!(doc.page_text(3), Some(""));
        assert_eq!(doc.page_text(4), Some("fourth"));
        assert_eq!(doc.page_text(0), None);
        assert_eq!(doc.page_text(5), None);
    }

    #[test]
    fn directory_pages_by_number() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page-003.txt"), "three").unwrap();
        fs::write(dir.path().join("page-001.txt"), "one").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let doc = Document::open(dir.path()).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.page_text(1), Some("one"));
        assert_eq!(doc.page_text(2), None);
        assert_eq!(doc.page_text(3), Some("three"));
    }

    #[test]
    fn page_number_uses_last_digit_run() {
        assert_eq!(page_number(Path::new("report-2022-p054.txt")), Some(54));
        assert_eq!(page_number(Path::new("scan_20221012_054.txt")), Some(54));
        assert_eq!(page_number(Path::new("54.txt")), Some(54));
        assert_eq!(page_number(Path::new("page-7-final.txt")), Some(7));
        assert_eq!(page_number(Path::new("cover.txt")), None);
    }

    #[test]
    fn directory_with_year_in_file_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report-2022-p054.txt"), "fifty-four").unwrap();
        fs::write(dir.path().join("report-2022-p002.txt"), "two").unwrap();
        fs::write(dir.path().join("scan-99999999.txt"), "stray").unwrap();
        fs::write(dir.path().join("page-000.txt"), "zero").unwrap();

        let doc = Document::open(dir.path()).unwrap();
        assert_eq!(doc.page_count(), 54);
        assert_eq!(doc.page_text(2), Some("two"));
        assert_eq!(doc.page_text(54), Some("fifty-four"));
    }

    #[test]
    fn open_reads_dump_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        fs::write(&path, "a\u{c}b").unwrap();
        let doc = Document::open(&path).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_text(2), Some("b"));
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::open(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn vec_source_is_one_indexed() {
        let pages = vec!["p1".to_string(), "p2".to_string()];
        assert_eq!(pages.page_count(), 2);
        assert_eq!(pages.page_text(2), Some("p2"));
        assert_eq!(pages.page_text(0), None);
    }

    #[test]
    fn fixture_dump_has_pages() {
        let doc = Document::open(Path::new("tests/fixtures/report_pages.txt")).unwrap();
        assert!(doc.page_count() >= 4);
    }
}
