//! Texture side of the packed atlas: page textures and the path tile sprite.

use std::{fs, panic, path::Path};

use anyhow::{anyhow, Context, Result};
use macroquad::texture::{FilterMode, Image, Texture2D};
use tower_defence_core::GridType;
use tower_defence_rendering::{AtlasPack, AtlasPage, Sprite};

/// Default location of the packed atlas relative to the working directory.
pub const DEFAULT_ATLAS_PATH: &str = "assets/pack.atlas";

/// Page textures of a loaded atlas plus the sprite used for path tiles.
#[derive(Debug)]
pub struct GameAtlas {
    pages: Vec<Texture2D>,
    path_tile: Sprite,
}

impl GameAtlas {
    /// Loads every page texture of `pack` with linear filtering and extracts
    /// the path tile sprite.
    ///
    /// Must run inside the macroquad window context.
    pub fn init(pack: &AtlasPack) -> Result<Self> {
        Self::init_with_loader(pack, load_linear_texture)
    }

    pub(crate) fn init_with_loader(
        pack: &AtlasPack,
        mut loader: impl FnMut(&AtlasPage) -> Result<Texture2D>,
    ) -> Result<Self> {
        let path_tile = pack
            .create_sprite(GridType::Path.region_name())
            .context("atlas does not define the path tile")?;

        let mut pages = Vec::with_capacity(pack.pages().len());
        for page in pack.pages() {
            let texture = loader(page).with_context(|| {
                format!(
                    "failed to load atlas page {}",
                    page.texture_path.display()
                )
            })?;
            pages.push(texture);
        }

        Ok(Self { pages, path_tile })
    }

    /// Sprite for path tiles, resolved once when the atlas is initialised.
    ///
    /// The world resolves its own tile sprites from the [`AtlasPack`]; this
    /// handle serves callers that only hold the loaded textures, and its
    /// lookup makes [`init`](Self::init) fail early for atlases without a
    /// path region.
    #[must_use]
    pub fn path_tile(&self) -> &Sprite {
        &self.path_tile
    }

    /// Texture of the page with the provided index.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<Texture2D> {
        self.pages.get(index).copied()
    }

    /// Number of loaded pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Releases every page texture.
    pub fn dispose(self) {
        for texture in self.pages {
            texture.delete();
        }
    }
}

fn load_linear_texture(page: &AtlasPage) -> Result<Texture2D> {
    let bytes = read_page(&page.texture_path)?;
    let image = decode_page(&bytes)?;
    let texture = Texture2D::from_image(&image);
    texture.set_filter(FilterMode::Linear);
    Ok(texture)
}

/// Decodes page bytes into an image.
///
/// macroquad panics on undecodable input, so the panic is caught and turned
/// into an error.
fn decode_page(bytes: &[u8]) -> Result<Image> {
    panic::catch_unwind(|| Image::from_file_with_format(bytes, None))
        .map_err(|_| anyhow!("atlas page is not a decodable image"))
}

fn read_page(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read atlas page at {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, path::PathBuf};
    use tower_defence_core::Rect;

    const TWO_PAGE_ATLAS: &str = "
first.png
size: 128, 64
filter: Linear, Linear
ground
  xy: 0, 0
  size: 64, 64
path
  xy: 64, 0
  size: 64, 64

second.png
size: 64, 64
gunner
  xy: 0, 0
  size: 64, 64
";

    #[test]
    fn init_loads_every_page_in_declaration_order() {
        let pack = AtlasPack::parse(TWO_PAGE_ATLAS, Path::new("assets")).expect("atlas parses");
        let loaded = RefCell::new(Vec::new());

        let atlas = GameAtlas::init_with_loader(&pack, |page| {
            loaded.borrow_mut().push(page.texture_path.clone());
            Ok(Texture2D::empty())
        })
        .expect("atlas initialises with stub textures");

        assert_eq!(
            loaded.into_inner(),
            vec![
                PathBuf::from("assets/first.png"),
                PathBuf::from("assets/second.png")
            ]
        );
        assert_eq!(atlas.page_count(), 2);
        assert!(atlas.page(1).is_some());
        assert!(atlas.page(2).is_none());
    }

    #[test]
    fn init_extracts_the_path_tile() {
        let pack = AtlasPack::parse(TWO_PAGE_ATLAS, Path::new("")).expect("atlas parses");

        let atlas = GameAtlas::init_with_loader(&pack, |_| Ok(Texture2D::empty()))
            .expect("atlas initialises with stub textures");

        assert_eq!(atlas.path_tile().page, 0);
        assert_eq!(atlas.path_tile().source, Rect::new(64.0, 0.0, 64.0, 64.0));
    }

    #[test]
    fn init_fails_without_a_path_region() {
        let pack = AtlasPack::parse("only.png\nground\n  xy: 0, 0\n  size: 8, 8\n", Path::new(""))
            .expect("atlas parses");
        let mut calls = 0;

        let result = GameAtlas::init_with_loader(&pack, |_| {
            calls += 1;
            Ok(Texture2D::empty())
        });

        assert!(result.is_err());
        assert_eq!(calls, 0, "no texture is loaded for an unusable atlas");
    }

    #[test]
    fn bundled_page_decodes() {
        let bytes = include_bytes!("../../../assets/pack.png");

        let image = decode_page(bytes).expect("sample page is a valid png");

        assert_eq!((image.width, image.height), (256, 192));
    }

    #[test]
    fn undecodable_page_is_an_error() {
        let error = decode_page(b"definitely not an image").expect_err("garbage fails to decode");

        assert!(format!("{error}").contains("not a decodable image"));
    }

    #[test]
    fn loader_failures_name_the_page() {
        let pack = AtlasPack::parse(TWO_PAGE_ATLAS, Path::new("assets")).expect("atlas parses");

        let error = GameAtlas::init_with_loader(&pack, |page| {
            if page.texture_path.ends_with("second.png") {
                anyhow::bail!("corrupt image");
            }
            Ok(Texture2D::empty())
        })
        .expect_err("second page fails to load");

        assert!(format!("{error:#}").contains("second.png"));
    }
}
