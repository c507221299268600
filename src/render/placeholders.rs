//! Template placeholder tokens and their replacement values.

use crate::models::TruckType;

use super::form::ReportFields;

pub const ADDRESS: &str = "{{ADDRESS}}";
pub const DATE: &str = "{{DATE}}";
pub const LICENSE_PLATE: &str = "{{LICENSE_PLATE}}";
pub const IMAGE_1: &str = "{{IMAGE_1}}";
pub const IMAGE_2: &str = "{{IMAGE_2}}";
pub const CHECKBOX_COMPRESSION: &str = "{{CHECKBOX_COMPRESSION}}";
pub const CHECKBOX_RECYCLING: &str = "{{CHECKBOX_RECYCLING}}";

/// Token → replacement text, applied in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text replacements for a report. Checkbox tokens are only filled when
    /// the template carries them.
    pub fn for_report(fields: &ReportFields, truck: TruckType, checkboxes: bool) -> Self {
        let mut map = Self::new();
        map.insert(ADDRESS, fields.address.as_str());
        map.insert(DATE, fields.date.as_str());
        map.insert(LICENSE_PLATE, fields.plate.as_str());
        if checkboxes {
            map.insert(CHECKBOX_COMPRESSION, truck.checkbox_for(TruckType::Compression));
            map.insert(CHECKBOX_RECYCLING, truck.checkbox_for(TruckType::Recycling));
        }
        map
    }

    /// Add a replacement; an existing token keeps its position.
    pub fn insert(&mut self, token: impl Into<String>, value: impl Into<String>) {
        let token = token.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| *t == token) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((token, value)),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, v)| (t.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
