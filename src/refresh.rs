//! Cell refresh passes.
//!
//! Each pass looks up the cells of one or more [`CellKind`]s and rewrites
//! their text from the `data-utc` / `data-local` attributes. The passes are
//! written against [`CellPage`] so the same code drives the live document
//! and the in-memory page used by the tests.

use chrono::{DateTime, Utc};

use crate::format::{INVALID_DUE_IN, format_due_in, format_local, parse_instant};
use crate::model::{ATTR_LOCAL, ATTR_UTC, CellKind, DisplayMode};

pub trait TimestampCell {
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_text(&self, text: &str);
}

pub trait CellPage {
    type Cell: TimestampCell;

    /// All cells of `kind` in document order. Empty when none exist.
    fn cells(&self, kind: CellKind) -> Vec<Self::Cell>;
}

/// Switches run/due cells between browser-local and server-local text.
/// Returns how many cells were rewritten.
pub fn apply_mode<P: CellPage>(page: &P, mode: DisplayMode) -> usize {
    let mut touched = 0;
    for kind in CellKind::TOGGLEABLE {
        for cell in page.cells(kind) {
            let text = match mode {
                DisplayMode::Browser => match cell.attribute(ATTR_UTC) {
                    Some(utc) => format_local(&utc),
                    None => continue,
                },
                // missing data-local clears the cell
                DisplayMode::Server => cell.attribute(ATTR_LOCAL).unwrap_or_default(),
            };
            cell.set_text(&text);
            touched += 1;
        }
    }
    touched
}

pub fn toggle_browser_tz<P: CellPage>(page: &P, checked: bool) -> usize {
    apply_mode(page, DisplayMode::from_checked(checked))
}

/// Re-renders every countdown cell against a single `now`.
pub fn tick_due_in<P: CellPage>(page: &P, now: &DateTime<Utc>) -> usize {
    let mut touched = 0;
    for cell in page.cells(CellKind::DueIn) {
        let Some(utc) = cell.attribute(ATTR_UTC) else {
            continue;
        };
        let text = match parse_instant(&utc) {
            Ok(target) => format_due_in(&target, now),
            Err(_) => INVALID_DUE_IN.to_string(),
        };
        cell.set_text(&text);
        touched += 1;
    }
    touched
}

pub fn fill_due_browser<P: CellPage>(page: &P) -> usize {
    let mut touched = 0;
    for cell in page.cells(CellKind::DueBrowser) {
        if let Some(utc) = cell.attribute(ATTR_UTC) {
            cell.set_text(&format_local(&utc));
            touched += 1;
        }
    }
    touched
}

#[cfg(test)]
pub(crate) mod memory {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use super::{CellPage, TimestampCell};
    use crate::model::{ATTR_LOCAL, ATTR_UTC, CellKind};

    #[derive(Clone, Debug, Default)]
    pub struct MemoryCell {
        attrs: HashMap<String, String>,
        text: Rc<RefCell<String>>,
    }

    impl MemoryCell {
        pub fn new(utc: Option<&str>, local: Option<&str>, text: &str) -> Self {
            let mut attrs = HashMap::new();
            if let Some(utc) = utc {
                attrs.insert(ATTR_UTC.to_string(), utc.to_string());
            }
            if let Some(local) = local {
                attrs.insert(ATTR_LOCAL.to_string(), local.to_string());
            }
            Self {
                attrs,
                text: Rc::new(RefCell::new(text.to_string())),
            }
        }

        pub fn text(&self) -> String {
            self.text.borrow().clone()
        }
    }

    impl TimestampCell for MemoryCell {
        fn attribute(&self, name: &str) -> Option<String> {
            self.attrs.get(name).cloned()
        }

        fn set_text(&self, text: &str) {
            *self.text.borrow_mut() = text.to_string();
        }
    }

    #[derive(Default)]
    pub struct MemoryPage {
        cells: HashMap<CellKind, Vec<MemoryCell>>,
    }

    impl MemoryPage {
        pub fn add(&mut self, kind: CellKind, cell: MemoryCell) -> MemoryCell {
            self.cells.entry(kind).or_default().push(cell.clone());
            cell
        }
    }

    impl CellPage for MemoryPage {
        type Cell = MemoryCell;

        fn cells(&self, kind: CellKind) -> Vec<MemoryCell> {
            self.cells.get(&kind).cloned().unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::{MemoryCell, MemoryPage};
    use super::*;
    use chrono::Duration;

    const UTC: &str = "2024-06-01T12:30:05Z";
    const SERVER: &str = "2024-06-01 15:30:05";

    fn toggle_page() -> (MemoryPage, Vec<MemoryCell>) {
        let mut page = MemoryPage::default();
        let cells = vec![
            page.add(CellKind::Run, MemoryCell::new(Some(UTC), Some(SERVER), SERVER)),
            page.add(CellKind::Due, MemoryCell::new(Some(UTC), Some("  kept  verbatim "), "")),
        ];
        (page, cells)
    }

    #[test]
    fn checked_renders_browser_local() {
        let (page, cells) = toggle_page();
        assert_eq!(toggle_browser_tz(&page, true), 2);
        for cell in &cells {
            assert_eq!(cell.text(), format_local(UTC));
        }
    }

    #[test]
    fn unchecked_restores_data_local_verbatim() {
        let (page, cells) = toggle_page();
        toggle_browser_tz(&page, true);
        toggle_browser_tz(&page, false);
        assert_eq!(cells[0].text(), SERVER);
        assert_eq!(cells[1].text(), "  kept  verbatim ");
    }

    #[test]
    fn missing_attributes() {
        let mut page = MemoryPage::default();
        let no_utc = page.add(CellKind::Run, MemoryCell::new(None, Some(SERVER), "orig"));
        let no_local = page.add(CellKind::Due, MemoryCell::new(Some(UTC), None, "orig"));

        assert_eq!(apply_mode(&page, DisplayMode::Browser), 1);
        assert_eq!(no_utc.text(), "orig");

        apply_mode(&page, DisplayMode::Server);
        assert_eq!(no_utc.text(), SERVER);
        assert_eq!(no_local.text(), "");
    }

    #[test]
    fn toggle_ignores_other_kinds() {
        let mut page = MemoryPage::default();
        let countdown = page.add(CellKind::DueIn, MemoryCell::new(Some(UTC), Some(SERVER), "x"));
        let once = page.add(CellKind::DueBrowser, MemoryCell::new(Some(UTC), Some(SERVER), "y"));
        assert_eq!(toggle_browser_tz(&page, true), 0);
        assert_eq!(countdown.text(), "x");
        assert_eq!(once.text(), "y");
    }

    #[test]
    fn tick_renders_countdowns_against_now() {
        let now = DateTime::parse_from_rfc3339(UTC).unwrap().with_timezone(&Utc);
        let ahead = (now + Duration::seconds(90_061)).to_rfc3339();
        let behind = (now - Duration::seconds(45)).to_rfc3339();

        let mut page = MemoryPage::default();
        let a = page.add(CellKind::DueIn, MemoryCell::new(Some(ahead.as_str()), None, ""));
        let b = page.add(CellKind::DueIn, MemoryCell::new(Some(behind.as_str()), None, ""));
        let c = page.add(CellKind::DueIn, MemoryCell::new(Some(UTC), None, ""));
        let bad = page.add(CellKind::DueIn, MemoryCell::new(Some("soon"), None, ""));
        let skipped = page.add(CellKind::DueIn, MemoryCell::new(None, None, "untouched"));

        assert_eq!(tick_due_in(&page, &now), 4);
        assert_eq!(a.text(), "in 1d 1h");
        assert_eq!(b.text(), "45s");
        assert_eq!(c.text(), "0s");
        assert_eq!(bad.text(), "in NaNs");
        assert_eq!(skipped.text(), "untouched");

        // later ticks keep counting past due
        let later = now + Duration::hours(2);
        tick_due_in(&page, &later);
        assert_eq!(c.text(), "2h");
    }

    #[test]
    fn fill_due_browser_renders_once() {
        let mut page = MemoryPage::default();
        let cell = page.add(CellKind::DueBrowser, MemoryCell::new(Some(UTC), None, ""));
        assert_eq!(fill_due_browser(&page), 1);
        assert_eq!(cell.text(), format_local(UTC));
    }

    #[test]
    fn empty_page_is_a_no_op() {
        let page = MemoryPage::default();
        assert_eq!(toggle_browser_tz(&page, true), 0);
        assert_eq!(tick_due_in(&page, &Utc::now()), 0);
        assert_eq!(fill_due_browser(&page), 0);
    }
}
