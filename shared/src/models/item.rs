//! Menu Item Model

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Serving variant of a menu item (hot / iced / not applicable)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum Variant {
    Hot,
    Iced,
    #[default]
    None,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Hot => "hot",
            Variant::Iced => "iced",
            Variant::None => "none",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid variant: {0}")]
pub struct VariantParseError(String);

impl FromStr for Variant {
    type Err = VariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Legacy single-letter codes ("H"/"I"/"") still appear in old data
        match s {
            "hot" | "H" | "h" => Ok(Variant::Hot),
            "iced" | "I" | "i" => Ok(Variant::Iced),
            "none" | "" => Ok(Variant::None),
            other => Err(VariantParseError(other.to_string())),
        }
    }
}

/// Menu item row
///
/// `price` is in minor currency units. `image` is a weak reference to an
/// image blob key; a dangling reference is resolved by placeholder
/// synthesis on read, never treated as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub category: String,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub category: String,
    pub name: String,
    pub price: i64,
    pub image: Option<String>,
    pub variant: Option<Variant>,
    pub sort_order: Option<i64>,
}

/// Partial update; unspecified fields retain their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}

/// One entry of a client-submitted full ordering of a category
///
/// An entry naming an existing item id keeps that item's stored fields and
/// only moves it; an entry with an unknown (or absent) id becomes a new
/// item when `name`, `price` and `image` are all supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReorderEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<Variant>,
}
