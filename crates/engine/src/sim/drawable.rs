use super::geometry::Vec2;

/// Sprite sheets known to the asset store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetId {
    Dungeon,
}

impl SheetId {
    pub const fn tile_size_px(self) -> (u32, u32) {
        match self {
            SheetId::Dungeon => (16, 16),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub col: u32,
    pub row: u32,
}

impl TileCoord {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// Opaque image handle: a tile on a sheet plus how to blit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteRef {
    pub sheet: SheetId,
    pub tile: TileCoord,
    pub scale: u32,
    pub flip_y: bool,
}

impl SpriteRef {
    pub const fn dungeon(col: u32, row: u32, scale: u32) -> Self {
        Self {
            sheet: SheetId::Dungeon,
            tile: TileCoord::new(col, row),
            scale,
            flip_y: false,
        }
    }

    pub const fn flipped_y(mut self) -> Self {
        self.flip_y = !self.flip_y;
        self
    }

    /// Same sheet row, `offset` tiles to the right. Used for frame strips.
    pub const fn offset_col(mut self, offset: u32) -> Self {
        self.tile.col += offset;
        self
    }

    pub fn scaled_size(&self) -> Vec2 {
        let (width, height) = self.sheet.tile_size_px();
        Vec2::new((width * self.scale) as f32, (height * self.scale) as f32)
    }
}

/// Where a drawable sits this tick: center point plus counter-clockwise
/// rotation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub center: Vec2,
    pub rotation_degrees: f32,
}

impl Placement {
    pub const fn upright(center: Vec2) -> Self {
        Self {
            center,
            rotation_degrees: 0.0,
        }
    }
}

/// Shared capability of actors, obstacles and attachments: something with a
/// placement and an image handle the renderer can draw.
pub trait Drawable {
    fn placement(&self) -> Placement;
    fn sprite(&self) -> SpriteRef;
}
