//! Tile grid and the path enemies walk along.

use glam::Vec2;
use tower_defence_core::{GameConfig, GridType, MapError, Rect, TilePosition};
use tower_defence_rendering::{AtlasError, AtlasPack, Color, Render, ShapeRenderer, SpriteBatch};

use crate::game_object::GameObject;

const GROUND_COLOR: Color = Color::from_rgb_u8(0x4c, 0x7a, 0x3a);
const PATH_COLOR: Color = Color::from_rgb_u8(0xc2, 0xa6, 0x6b);

/// Single square cell of the map.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    object: GameObject,
    grid_type: GridType,
    column: u32,
    row: u32,
}

impl Tile {
    /// Creates a tile occupying the provided cell.
    #[must_use]
    pub fn new(column: u32, row: u32, tile_size: f32, grid_type: GridType) -> Self {
        Self {
            object: GameObject::new(
                column as f32 * tile_size,
                row as f32 * tile_size,
                tile_size,
                tile_size,
            ),
            grid_type,
            column,
            row,
        }
    }

    /// Classification that governs placement legality.
    #[must_use]
    pub fn grid_type(&self) -> GridType {
        self.grid_type
    }

    /// Zero-based column index.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index.
    #[must_use]
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Underlying game object.
    #[must_use]
    pub fn object(&self) -> &GameObject {
        &self.object
    }

    /// Bounds of the tile in world units.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.object.bounds()
    }
}

impl Render for Tile {
    fn render_shapes(&self, shapes: &mut dyn ShapeRenderer) {
        if !self.object.is_visible() {
            return;
        }
        let position = self.object.position();
        let size = self.object.size();
        match self.grid_type {
            GridType::Ground => shapes.set_color(GROUND_COLOR),
            GridType::Path => {
                shapes.set_color(PATH_COLOR);
                shapes.filled_rect(position.x, position.y, size.x, size.y);
                shapes.set_color(PATH_COLOR.lighten(0.3));
            }
        }
        self.object.render_shapes(shapes);
    }

    fn render_sprites(&self, batch: &mut dyn SpriteBatch) {
        self.object.render_sprites(batch);
    }
}

/// Rectangular grid of tiles with a single waypoint path carved through it.
#[derive(Clone, Debug, PartialEq)]
pub struct Map {
    columns: u32,
    rows: u32,
    tile_size: f32,
    tiles: Vec<Tile>,
    path_points: Vec<Vec2>,
}

impl Map {
    /// Builds a map whose path joins the waypoints with straight segments.
    ///
    /// Every tile on a segment, endpoints included, is a path tile; all other
    /// tiles are ground.
    pub fn from_waypoints(
        columns: u32,
        rows: u32,
        tile_size: f32,
        waypoints: &[TilePosition],
    ) -> Result<Self, MapError> {
        if columns == 0 || rows == 0 {
            return Err(MapError::Empty);
        }
        if !(tile_size > 0.0) {
            return Err(MapError::InvalidTileSize);
        }
        if waypoints.len() < 2 {
            return Err(MapError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }
        for waypoint in waypoints {
            if waypoint.column >= columns || waypoint.row >= rows {
                return Err(MapError::WaypointOutOfBounds {
                    column: waypoint.column,
                    row: waypoint.row,
                });
            }
        }

        let mut grid = vec![GridType::Ground; columns as usize * rows as usize];
        for (index, segment) in waypoints.windows(2).enumerate() {
            let (from, to) = (segment[0], segment[1]);
            if from.column != to.column && from.row != to.row {
                return Err(MapError::DiagonalSegment { index });
            }
            for row in from.row.min(to.row)..=from.row.max(to.row) {
                for column in from.column.min(to.column)..=from.column.max(to.column) {
                    grid[(row * columns + column) as usize] = GridType::Path;
                }
            }
        }

        let tiles = grid
            .into_iter()
            .enumerate()
            .map(|(index, grid_type)| {
                let index = index as u32;
                Tile::new(index % columns, index / columns, tile_size, grid_type)
            })
            .collect();
        let path_points = waypoints
            .iter()
            .map(|waypoint| {
                Vec2::new(
                    (waypoint.column as f32 + 0.5) * tile_size,
                    (waypoint.row as f32 + 0.5) * tile_size,
                )
            })
            .collect();

        Ok(Self {
            columns,
            rows,
            tile_size,
            tiles,
            path_points,
        })
    }

    /// Builds the map described by a game configuration.
    pub fn from_config(config: &GameConfig) -> Result<Self, MapError> {
        Self::from_waypoints(config.columns, config.rows, config.tile_size, &config.path)
    }

    /// Assigns every tile the atlas sprite matching its grid type.
    pub fn initialize_sprites(&mut self, atlas: &AtlasPack) -> Result<(), AtlasError> {
        for tile in &mut self.tiles {
            let region = tile.grid_type.region_name();
            tile.object.initialize_sprites(atlas, region, region)?;
        }
        Ok(())
    }

    /// Returns the tile under the world-space point, if the point lies on the map.
    #[must_use]
    pub fn selected_tile(&self, x: f32, y: f32) -> Option<&Tile> {
        if !x.is_finite() || !y.is_finite() || x < 0.0 || y < 0.0 {
            return None;
        }
        let column = (x / self.tile_size).floor() as u32;
        let row = (y / self.tile_size).floor() as u32;
        self.tile(column, row)
    }

    /// Returns the tile at the provided cell.
    #[must_use]
    pub fn tile(&self, column: u32, row: u32) -> Option<&Tile> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.tiles.get((row * self.columns + column) as usize)
    }

    /// Every tile in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// World-space centers of the path waypoints, from spawn to exit.
    #[must_use]
    pub fn path_points(&self) -> &[Vec2] {
        &self.path_points
    }

    /// Number of tile columns.
    #[must_use]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Total width and height in world units.
    #[must_use]
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.columns as f32 * self.tile_size,
            self.rows as f32 * self.tile_size,
        )
    }
}

impl Render for Map {
    fn render_shapes(&self, shapes: &mut dyn ShapeRenderer) {
        for tile in &self.tiles {
            tile.render_shapes(shapes);
        }
    }

    fn render_sprites(&self, batch: &mut dyn SpriteBatch) {
        for tile in &self.tiles {
            tile.render_sprites(batch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn waypoints(points: &[(u32, u32)]) -> Vec<TilePosition> {
        points
            .iter()
            .map(|&(column, row)| TilePosition::new(column, row))
            .collect()
    }

    #[test]
    fn segments_between_waypoints_become_path() {
        let map = Map::from_waypoints(5, 4, 10.0, &waypoints(&[(0, 1), (3, 1), (3, 3)]))
            .expect("valid layout");

        let path_cells: Vec<(u32, u32)> = map
            .tiles()
            .iter()
            .filter(|tile| tile.grid_type() == GridType::Path)
            .map(|tile| (tile.column(), tile.row()))
            .collect();

        assert_eq!(
            path_cells,
            vec![(0, 1), (1, 1), (2, 1), (3, 1), (3, 2), (3, 3)]
        );
        assert_eq!(map.tiles().len(), 20);
    }

    #[test]
    fn selected_tile_maps_world_coordinates_to_cells() {
        let map = Map::from_waypoints(4, 4, 32.0, &waypoints(&[(0, 0), (3, 0)]))
            .expect("valid layout");

        let tile = map.selected_tile(70.0, 40.0).expect("point lies on the map");
        assert_eq!((tile.column(), tile.row()), (2, 1));
        assert_eq!(tile.grid_type(), GridType::Ground);
        assert_eq!(tile.bounds(), Rect::new(64.0, 32.0, 32.0, 32.0));

        let tile = map.selected_tile(0.0, 0.0).expect("origin lies on the map");
        assert_eq!(tile.grid_type(), GridType::Path);
    }

    #[test]
    fn selected_tile_rejects_points_off_the_map() {
        let map = Map::from_waypoints(4, 4, 32.0, &waypoints(&[(0, 0), (3, 0)]))
            .expect("valid layout");

        assert!(map.selected_tile(-1.0, 10.0).is_none());
        assert!(map.selected_tile(10.0, 128.0).is_none());
        assert!(map.selected_tile(f32::NAN, 10.0).is_none());
    }

    #[test]
    fn path_points_are_tile_centers() {
        let map = Map::from_waypoints(4, 4, 20.0, &waypoints(&[(0, 2), (3, 2)]))
            .expect("valid layout");

        assert_eq!(
            map.path_points(),
            &[Vec2::new(10.0, 50.0), Vec2::new(70.0, 50.0)]
        );
    }

    #[test]
    fn diagonal_segments_are_rejected() {
        let error = Map::from_waypoints(4, 4, 10.0, &waypoints(&[(0, 0), (2, 0), (3, 3)]))
            .expect_err("second segment is diagonal");

        assert_eq!(error, MapError::DiagonalSegment { index: 1 });
    }

    #[test]
    fn out_of_bounds_waypoints_are_rejected() {
        let error = Map::from_waypoints(4, 4, 10.0, &waypoints(&[(0, 0), (4, 0)]))
            .expect_err("column 4 is outside a four column map");

        assert_eq!(error, MapError::WaypointOutOfBounds { column: 4, row: 0 });
    }

    #[test]
    fn degenerate_layouts_are_rejected() {
        assert_eq!(
            Map::from_waypoints(0, 4, 10.0, &waypoints(&[(0, 0), (0, 1)])),
            Err(MapError::Empty)
        );
        assert_eq!(
            Map::from_waypoints(4, 4, 0.0, &waypoints(&[(0, 0), (0, 1)])),
            Err(MapError::InvalidTileSize)
        );
        assert_eq!(
            Map::from_waypoints(4, 4, 10.0, &waypoints(&[(0, 0)])),
            Err(MapError::TooFewWaypoints { count: 1 })
        );
    }

    #[test]
    fn sprites_follow_grid_type() {
        let atlas = AtlasPack::parse(
            "pack.png\nground\n  xy: 0, 0\n  size: 8, 8\npath\n  xy: 8, 0\n  size: 8, 8\n",
            Path::new(""),
        )
        .expect("atlas parses");
        let mut map = Map::from_waypoints(2, 2, 16.0, &waypoints(&[(0, 0), (1, 0)]))
            .expect("valid layout");

        map.initialize_sprites(&atlas).expect("both regions exist");

        let path_tile = map.tile(0, 0).expect("tile exists");
        let ground_tile = map.tile(0, 1).expect("tile exists");
        assert_eq!(
            path_tile.object().sprite().map(|sprite| sprite.source),
            Some(Rect::new(8.0, 0.0, 8.0, 8.0))
        );
        assert_eq!(
            ground_tile.object().sprite().map(|sprite| sprite.source),
            Some(Rect::new(0.0, 0.0, 8.0, 8.0))
        );
    }
}
