//! Static registry of vehicle categories.
//!
//! Every category belongs to a [`Group`] (used for URL namespacing), lives in
//! its own JSON document under the data directory, and keys its records by a
//! category-specific human-readable field (the *id-field*).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Logical grouping of categories, used as the route namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Aviation,
    Ground,
    Naval,
}

impl Group {
    /// All groups in route order.
    pub const ALL: [Group; 3] = [Group::Aviation, Group::Ground, Group::Naval];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aviation => "aviation",
            Self::Ground => "ground",
            Self::Naval => "naval",
        }
    }

    /// Categories registered under this group, in registry order.
    pub fn categories(self) -> impl Iterator<Item = Category> {
        Category::ALL
            .into_iter()
            .filter(move |category| category.group() == self)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Group::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| TypeError::UnknownGroup(s.to_string()))
    }
}

/// One vehicle kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Aircraft,
    Helicopters,
    Tanks,
    Bluewater,
    Coastal,
}

/// Registry entry describing where a category is stored and how it is keyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategorySpec {
    pub category: Category,
    pub group: Group,
    /// Document path relative to the data directory.
    pub path: &'static str,
    /// Name of the human-readable unique key field.
    pub id_field: &'static str,
}

const REGISTRY: [CategorySpec; Category::COUNT] = [
    CategorySpec {
        category: Category::Aircraft,
        group: Group::Aviation,
        path: "aviation/aircraft.json",
        id_field: "aircraftid",
    },
    CategorySpec {
        category: Category::Helicopters,
        group: Group::Aviation,
        path: "aviation/helicopters.json",
        id_field: "helicopterid",
    },
    CategorySpec {
        category: Category::Tanks,
        group: Group::Ground,
        path: "ground/tanks.json",
        id_field: "vehicleid",
    },
    CategorySpec {
        category: Category::Bluewater,
        group: Group::Naval,
        path: "naval/bluewater.json",
        id_field: "shipid",
    },
    CategorySpec {
        category: Category::Coastal,
        group: Group::Naval,
        path: "naval/coastal.json",
        id_field: "boatid",
    },
];

impl Category {
    pub const COUNT: usize = 5;

    /// All categories in registry order.
    pub const ALL: [Category; Self::COUNT] = [
        Category::Aircraft,
        Category::Helicopters,
        Category::Tanks,
        Category::Bluewater,
        Category::Coastal,
    ];

    pub fn spec(&self) -> &'static CategorySpec {
        // The registry is indexed in declaration order.
        &REGISTRY[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aircraft => "aircraft",
            Self::Helicopters => "helicopters",
            Self::Tanks => "tanks",
            Self::Bluewater => "bluewater",
            Self::Coastal => "coastal",
        }
    }

    pub fn group(&self) -> Group {
        self.spec().group
    }

    pub fn path(&self) -> &'static str {
        self.spec().path
    }

    pub fn id_field(&self) -> &'static str {
        self.spec().id_field
    }

    /// Resolve a `/<group>/<category>` route pair. Returns `None` when the
    /// category exists but is registered under a different group.
    pub fn from_route(group: &str, category: &str) -> Option<Category> {
        let group: Group = group.parse().ok()?;
        let category: Category = category.parse().ok()?;
        (category.group() == group).then_some(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| TypeError::UnknownCategory(s.to_string()))
    }
}
