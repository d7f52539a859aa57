use crate::timefmt::date_stamp;
use serde::{Deserialize, Serialize};

/// UI template selection shared between the panel pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiStyle {
    pub active_template_id: String,
    pub notes: String,
    pub updated_at: String,
}

impl Default for UiStyle {
    fn default() -> Self {
        Self {
            active_template_id: String::new(),
            notes: String::new(),
            updated_at: date_stamp(),
        }
    }
}

/// Request payload for POST /api/ui-style.
#[derive(Debug, Default, Deserialize)]
pub struct UiStylePatch {
    pub active_template_id: Option<String>,
    pub notes: Option<String>,
}

pub fn apply(doc: &mut UiStyle, patch: UiStylePatch) {
    if let Some(id) = &patch.active_template_id {
        doc.active_template_id = id.trim().to_string();
    }
    if let Some(notes) = &patch.notes {
        doc.notes = notes.trim().to_string();
    }
    doc.updated_at = date_stamp();
}
