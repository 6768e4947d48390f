//! Color catalogue entry

use md_core::traits::Identifiable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Color {
    pub id: String,
    pub name: String,
    pub code: String,
}

impl Identifiable for Color {
    fn id(&self) -> &str {
        &self.id
    }
}
