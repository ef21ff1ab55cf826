//! Diagnostic category vocabulary
//!
//! The order of [`CATEGORY_SET`] is the order of the classifier's output
//! logits. It must never be re-sorted.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One of the four diagnostic categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    NoTumor,
    Glioma,
    Meningioma,
    Pituitary,
}

/// Canonical category order, index-aligned with the model output
pub const CATEGORY_SET: [Category; 4] = [
    Category::NoTumor,
    Category::Glioma,
    Category::Meningioma,
    Category::Pituitary,
];

/// Number of output classes
pub const NUM_CLASSES: usize = CATEGORY_SET.len();

impl Category {
    /// Position in the canonical order
    pub fn index(self) -> usize {
        match self {
            Category::NoTumor => 0,
            Category::Glioma => 1,
            Category::Meningioma => 2,
            Category::Pituitary => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        CATEGORY_SET.get(index).copied()
    }

    /// Human-facing label
    pub fn display_name(self) -> &'static str {
        match self {
            Category::NoTumor => "No Tumor",
            Category::Glioma => "Glioma",
            Category::Meningioma => "Meningioma",
            Category::Pituitary => "Pituitary",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "notumor" => Ok(Category::NoTumor),
            "glioma" => Ok(Category::Glioma),
            "meningioma" => Ok(Category::Meningioma),
            "pituitary" => Ok(Category::Pituitary),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let names: Vec<_> = CATEGORY_SET.iter().map(|c| c.display_name()).collect();
        assert_eq!(names, vec!["No Tumor", "Glioma", "Meningioma", "Pituitary"]);
        for (i, category) in CATEGORY_SET.iter().enumerate() {
            assert_eq!(category.index(), i);
            assert_eq!(Category::from_index(i), Some(*category));
        }
        assert_eq!(Category::from_index(4), None);
    }

    #[test]
    fn test_parse_accepts_all_spellings() {
        assert_eq!("No Tumor".parse::<Category>().unwrap(), Category::NoTumor);
        assert_eq!("no_tumor".parse::<Category>().unwrap(), Category::NoTumor);
        assert_eq!("notumor".parse::<Category>().unwrap(), Category::NoTumor);
        assert_eq!("GLIOMA".parse::<Category>().unwrap(), Category::Glioma);
        assert!("astrocytoma".parse::<Category>().is_err());
    }

    #[test]
    fn test_serializes_display_name() {
        let json = serde_json::to_string(&Category::Meningioma).unwrap();
        assert_eq!(json, "\"Meningioma\"");
        let back: Category = serde_json::from_str("\"pituitary\"").unwrap();
        assert_eq!(back, Category::Pituitary);
    }
}
