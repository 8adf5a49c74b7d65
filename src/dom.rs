use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::error::DisplayError;
use crate::model::CellKind;
use crate::refresh::{CellPage, TimestampCell};

pub struct DomCell(Element);

impl TimestampCell for DomCell {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }
}

/// The live document, scanned afresh on every pass.
#[derive(Clone)]
pub struct DomPage {
    document: Document,
}

impl DomPage {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn current() -> Result<Self, DisplayError> {
        let window = web_sys::window().ok_or(DisplayError::NoWindow)?;
        let document = window.document().ok_or(DisplayError::NoDocument)?;
        Ok(Self::new(document))
    }

    pub fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }
}

impl CellPage for DomPage {
    type Cell = DomCell;

    fn cells(&self, kind: CellKind) -> Vec<DomCell> {
        let Ok(list) = self.document.query_selector_all(&kind.selector()) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(DomCell)
            .collect()
    }
}
