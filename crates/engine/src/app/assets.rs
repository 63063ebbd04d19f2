use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::info;

use crate::asset_keys::{validate_asset_key, AssetKeyError};
use crate::sim::{SheetId, TileCoord};

use super::rendering::{GLYPH_HEIGHT_PX, GLYPH_WIDTH_PX};

pub const DUNGEON_SHEET_KEY: &str = "tiny_dungeon/tilemap_packed.png";
pub const FONT_SHEET_KEY: &str = "bitmap_font/kenney-pixel.png";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("invalid asset key {key:?}: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("failed to open sprite sheet {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode sprite sheet {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(
        "sprite sheet {path} is {width}x{height}, which is not a whole number of {tile_width}x{tile_height} tiles"
    )]
    TileSizeMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    },
}

/// Decoded RGBA sheet cut into fixed-size tiles.
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    rgba: Vec<u8>,
}

impl SpriteSheet {
    /// `None` when the buffer size or tile grid does not line up.
    pub fn from_rgba(width: u32, height: u32, tile_size: (u32, u32), rgba: Vec<u8>) -> Option<Self> {
        let (tile_width, tile_height) = tile_size;
        let expected_len = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if tile_width == 0
            || tile_height == 0
            || width % tile_width != 0
            || height % tile_height != 0
            || rgba.len() != expected_len
        {
            return None;
        }
        Some(Self {
            width,
            height,
            tile_width,
            tile_height,
            rgba,
        })
    }

    pub fn load(path: &Path, tile_size: (u32, u32)) -> Result<Self, AssetError> {
        let reader = ImageReader::open(path).map_err(|source| AssetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = reader.decode().map_err(|source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let image = decoded.to_rgba8();
        let (width, height) = (image.width(), image.height());
        Self::from_rgba(width, height, tile_size, image.into_raw()).ok_or_else(|| {
            AssetError::TileSizeMismatch {
                path: path.to_path_buf(),
                width,
                height,
                tile_width: tile_size.0,
                tile_height: tile_size.1,
            }
        })
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    pub fn columns(&self) -> u32 {
        self.width / self.tile_width
    }

    pub fn rows(&self) -> u32 {
        self.height / self.tile_height
    }

    /// Pixel `(x, y)` inside `tile`. Transparent pixels (zero alpha or the
    /// pure-black color key) and out-of-range lookups give `None`.
    pub fn tile_pixel(&self, tile: TileCoord, x: u32, y: u32) -> Option<[u8; 4]> {
        if tile.col >= self.columns()
            || tile.row >= self.rows()
            || x >= self.tile_width
            || y >= self.tile_height
        {
            return None;
        }
        let px = tile.col * self.tile_width + x;
        let py = tile.row * self.tile_height + y;
        let offset = (py as usize * self.width as usize + px as usize) * 4;
        let pixel: [u8; 4] = self.rgba.get(offset..offset + 4)?.try_into().ok()?;
        let is_color_key = pixel[0] == 0 && pixel[1] == 0 && pixel[2] == 0;
        if pixel[3] == 0 || is_color_key {
            None
        } else {
            Some(pixel)
        }
    }
}

/// Every sheet the demos draw from, loaded once at startup.
#[derive(Debug, Clone)]
pub struct AssetStore {
    dungeon: SpriteSheet,
    font: SpriteSheet,
}

impl AssetStore {
    pub fn new(dungeon: SpriteSheet, font: SpriteSheet) -> Self {
        Self { dungeon, font }
    }

    pub fn load(asset_root: &Path) -> Result<Self, AssetError> {
        let dungeon = load_sheet(asset_root, DUNGEON_SHEET_KEY, SheetId::Dungeon.tile_size_px())?;
        let font = load_sheet(asset_root, FONT_SHEET_KEY, (GLYPH_WIDTH_PX, GLYPH_HEIGHT_PX))?;
        Ok(Self::new(dungeon, font))
    }

    pub fn sheet(&self, id: SheetId) -> &SpriteSheet {
        match id {
            SheetId::Dungeon => &self.dungeon,
        }
    }

    pub fn font(&self) -> &SpriteSheet {
        &self.font
    }
}

fn load_sheet(asset_root: &Path, key: &str, tile_size: (u32, u32)) -> Result<SpriteSheet, AssetError> {
    let path = resolve_asset_path(asset_root, key)?;
    let sheet = SpriteSheet::load(&path, tile_size)?;
    info!(
        key,
        path = %path.display(),
        columns = sheet.columns(),
        rows = sheet.rows(),
        "sprite_sheet_loaded"
    );
    Ok(sheet)
}

fn resolve_asset_path(asset_root: &Path, key: &str) -> Result<PathBuf, AssetError> {
    validate_asset_key(key).map_err(|source| AssetError::InvalidKey {
        key: key.to_string(),
        source,
    })?;
    Ok(key.split('/').fold(asset_root.to_path_buf(), |path, segment| path.join(segment)))
}
