//! Words assembled from characters.

use serde::{Deserialize, Serialize};

use super::objects::{Bounded, Char};
use crate::geometry::BBox;

/// A run of characters with no significant gap between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
    pub upright: bool,
    /// The characters the word was built from.
    #[serde(skip)]
    pub chars: Vec<Char>,
}

impl Word {
    /// Build a word from a non-empty run of characters.
    pub(crate) fn from_chars(chars: Vec<Char>) -> Option<Self> {
        let first = chars.first()?;
        let bbox = chars
            .iter()
            .skip(1)
            .fold(first.bbox(), |acc, c| acc.union(&c.bbox()));
        let text: String = chars.iter().map(|c| c.text.as_str()).collect();
        let upright = first.upright;

        Some(Self {
            text,
            x0: bbox.x0,
            top: bbox.top,
            x1: bbox.x1,
            bottom: bbox.bottom,
            upright,
            chars,
        })
    }

    pub fn bbox(&self) -> BBox {
        BBox {
            x0: self.x0,
            top: self.top,
            x1: self.x1,
            bottom: self.bottom,
        }
    }
}
