//! Terrain tile records and cell-to-tile lookup.
//!
//! Tiles are produced by an external raster pipeline; this module only reads
//! them and answers which tile covers a given cell.

use moonbase_core::{Error, Result};
use rstar::{RTree, RTreeObject, AABB};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Half-open pixel range `[x_min, x_max) × [y_min, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelRange {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl PixelRange {
    /// Returns true if pixel `(x, y)` lies inside the range.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x_min && x < self.x_max && y >= self.y_min && y < self.y_max
    }

    /// Returns true if the range covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.x_max <= self.x_min || self.y_max <= self.y_min
    }
}

/// Geographic bounds of a tile in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoRange {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

/// Summary statistics of one raster layer over a tile.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayerStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Per-tile statistics for every terrain layer; missing layers are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TileLayers {
    pub elevation: Option<LayerStats>,
    pub slope: Option<LayerStats>,
    pub shadows: Option<LayerStats>,
    pub illumination: Option<LayerStats>,
    pub ice_probability: Option<LayerStats>,
}

/// One terrain tile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileRecord {
    pub tile_id: u64,
    pub pixel_coords: PixelRange,
    pub geo_coords: GeoRange,
    #[cfg_attr(feature = "serde", serde(default))]
    pub layers: TileLayers,
}

/// A named area as delivered by the tile pipeline.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct TileArea {
    pub name: Option<String>,
    pub description: Option<String>,
    pub grid_size: Option<u32>,
    pub tiles: Vec<TileRecord>,
}

#[derive(Debug, Clone, PartialEq)]
struct TileEntry {
    order: usize,
    range: PixelRange,
}

impl RTreeObject for TileEntry {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.range.x_min, self.range.y_min],
            [self.range.x_max, self.range.y_max],
        )
    }
}

/// Indexed collection of tiles.
#[derive(Debug)]
pub struct TileSet {
    tiles: Vec<TileRecord>,
    tree: RTree<TileEntry>,
}

impl TileSet {
    /// Indexes `tiles`; tiles with an empty pixel range are kept but never matched.
    pub fn new(tiles: Vec<TileRecord>) -> Self {
        let entries = tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| !tile.pixel_coords.is_empty())
            .map(|(order, tile)| TileEntry {
                order,
                range: tile.pixel_coords,
            })
            .collect();
        Self {
            tiles,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Parses a [`TileArea`] document.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        let area: TileArea =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        log::debug!(
            "loaded {} tiles for area {}",
            area.tiles.len(),
            area.name.as_deref().unwrap_or("<unnamed>")
        );
        Ok(Self::new(area.tiles))
    }

    /// The tile whose pixel range contains `(x, y)`.
    ///
    /// When ranges overlap, the tile listed first wins.
    pub fn tile_at(&self, x: i64, y: i64) -> Option<&TileRecord> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([x, y]))
            .filter(|entry| entry.range.contains(x, y))
            .min_by_key(|entry| entry.order)
            .and_then(|entry| self.tiles.get(entry.order))
    }

    /// Looks up a tile by its id.
    pub fn get(&self, tile_id: u64) -> Result<&TileRecord> {
        self.tiles
            .iter()
            .find(|tile| tile.tile_id == tile_id)
            .ok_or(Error::NotFound {
                kind: "tile",
                id: tile_id,
            })
    }

    /// All tiles in load order.
    pub fn tiles(&self) -> &[TileRecord] {
        &self.tiles
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true if no tiles are loaded.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
