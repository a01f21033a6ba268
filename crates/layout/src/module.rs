//! Infrastructure modules: catalog, footprints, and placed objects.

use moonbase_core::{CellRect, Error, GridPoint, ObjectId, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rectangular extent of a module in whole cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    /// Creates a new footprint.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of cells covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Rejects footprints that cover no cells.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidInput(format!(
                "footprint must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// The cell block covered when anchored at `(x, y)`.
    pub fn at(&self, x: i32, y: i32) -> CellRect {
        CellRect::new(x, y, self.width, self.height)
    }
}

/// Standard module types of a lunar base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ModuleKind {
    /// Individual living quarters.
    #[cfg_attr(feature = "serde", serde(rename = "residential-ind"))]
    ResidentialIndividual,
    /// Shared living quarters.
    ResidentialCommon,
    Sports,
    Administrative,
    Medical,
    Research,
    Repair,
    Spaceport,
    /// Communication tower.
    Communication,
    Plantation,
    /// Waste disposal site.
    Waste,
    Production,
    /// Astronomy platform.
    Astronomy,
    /// Solar power plant.
    Solar,
    /// Mining shaft.
    Mining,
}

/// Default geometry and display name of a module type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleSpec {
    pub footprint: Footprint,
    pub clearance: u32,
    pub label: &'static str,
}

impl ModuleKind {
    /// Every catalog entry, in display order.
    pub const ALL: [ModuleKind; 15] = [
        Self::ResidentialIndividual,
        Self::ResidentialCommon,
        Self::Sports,
        Self::Administrative,
        Self::Medical,
        Self::Research,
        Self::Repair,
        Self::Spaceport,
        Self::Communication,
        Self::Plantation,
        Self::Waste,
        Self::Production,
        Self::Astronomy,
        Self::Solar,
        Self::Mining,
    ];

    /// Catalog footprint, clearance and label.
    pub const fn spec(self) -> ModuleSpec {
        let (w, h, clearance, label) = match self {
            Self::ResidentialIndividual => (2, 2, 1, "Residential module (individual)"),
            Self::ResidentialCommon => (4, 3, 2, "Residential module (common)"),
            Self::Sports => (3, 4, 2, "Sports module"),
            Self::Administrative => (3, 3, 2, "Administrative module"),
            Self::Medical => (3, 3, 2, "Medical module"),
            Self::Research => (4, 3, 2, "Research module"),
            Self::Repair => (3, 3, 2, "Repair module"),
            Self::Spaceport => (10, 10, 5, "Spaceport"),
            Self::Communication => (2, 2, 1, "Communication tower"),
            Self::Plantation => (4, 4, 2, "Plantation"),
            Self::Waste => (5, 5, 3, "Waste site"),
            Self::Production => (4, 4, 2, "Production module"),
            Self::Astronomy => (3, 3, 2, "Astronomy platform"),
            Self::Solar => (5, 3, 2, "Solar power plant"),
            Self::Mining => (3, 3, 2, "Mining shaft"),
        };
        ModuleSpec {
            footprint: Footprint::new(w, h),
            clearance,
            label,
        }
    }
}

/// A request to place one module; defaults come from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementRequest {
    pub module_type: ModuleKind,
    pub footprint: Footprint,
    pub clearance: u32,
    pub label: String,
}

impl PlacementRequest {
    /// Creates a request with the catalog defaults for `module_type`.
    pub fn new(module_type: ModuleKind) -> Self {
        let spec = module_type.spec();
        Self {
            module_type,
            footprint: spec.footprint,
            clearance: spec.clearance,
            label: spec.label.to_string(),
        }
    }

    /// Overrides the footprint.
    pub fn with_footprint(mut self, width: u32, height: u32) -> Self {
        self.footprint = Footprint::new(width, height);
        self
    }

    /// Overrides the clearance.
    pub fn with_clearance(mut self, clearance: u32) -> Self {
        self.clearance = clearance;
        self
    }

    /// Overrides the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// A module that has been placed on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacedObject {
    pub id: ObjectId,
    pub module_type: ModuleKind,
    pub x: i32,
    pub y: i32,
    pub footprint: Footprint,
    pub clearance: u32,
    pub label: String,
}

impl PlacedObject {
    /// Materializes a request at `(x, y)`.
    pub fn from_request(id: ObjectId, request: PlacementRequest, x: i32, y: i32) -> Self {
        Self {
            id,
            module_type: request.module_type,
            x,
            y,
            footprint: request.footprint,
            clearance: request.clearance,
            label: request.label,
        }
    }

    /// The cells covered by the module body.
    pub fn rect(&self) -> CellRect {
        self.footprint.at(self.x, self.y)
    }

    /// Geometric centre in grid units.
    pub fn center(&self) -> GridPoint {
        self.rect().center()
    }

    /// Footprint area in cells.
    pub fn area(&self) -> u64 {
        self.footprint.area()
    }

    /// Returns a copy moved to `(x, y)`; id and type are preserved.
    pub fn moved_to(&self, x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }
}
