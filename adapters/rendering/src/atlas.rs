//! Parser for packed texture atlases.
//!
//! An atlas file lists one or more pages (image files) followed by the named
//! regions packed onto each page. Both the classic layout (`xy`, `size`,
//! `orig`, `offset`, `index`, `rotate` on indented lines) and the compact
//! layout (`bounds`, `offsets`) are accepted:
//!
//! ```text
//! pack.png
//! size: 256, 256
//! format: RGBA8888
//! filter: Linear, Linear
//! repeat: none
//! path
//!   rotate: false
//!   xy: 2, 2
//!   size: 64, 64
//!   orig: 64, 64
//!   offset: 0, 0
//!   index: -1
//! ```
//!
//! A blank line ends the current page; the next non-blank line names a new
//! page.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tower_defence_core::Rect;

use crate::Sprite;

/// Errors raised while loading an atlas or resolving its regions.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// The atlas file could not be read.
    #[error("failed to read atlas at {path}")]
    Io {
        /// Location of the atlas file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A field value did not have the expected shape.
    #[error("line {line}: malformed `{field}` value `{value}`")]
    MalformedField {
        /// One-based line number.
        line: usize,
        /// Field name.
        field: String,
        /// Raw value text.
        value: String,
    },
    /// A filter name is not one of the known texture filters.
    #[error("line {line}: unknown texture filter `{value}`")]
    UnknownFilter {
        /// One-based line number.
        line: usize,
        /// Rejected filter name.
        value: String,
    },
    /// A region never declared where it sits on its page.
    #[error("region `{name}` has no position or size")]
    MissingBounds {
        /// Name of the incomplete region.
        name: String,
    },
    /// A requested region does not exist in the atlas.
    #[error("atlas has no region named `{name}`")]
    MissingRegion {
        /// Requested region name.
        name: String,
    },
}

/// Texture sampling filter declared by an atlas page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    /// Nearest-neighbour sampling.
    Nearest,
    /// Bilinear sampling.
    Linear,
    /// Mipmapped sampling with driver-chosen interpolation.
    MipMap,
    /// Nearest mip level, nearest texel.
    MipMapNearestNearest,
    /// Nearest mip level, linear texel.
    MipMapLinearNearest,
    /// Linear between mip levels, nearest texel.
    MipMapNearestLinear,
    /// Linear between mip levels, linear texel.
    MipMapLinearLinear,
}

impl TextureFilter {
    fn parse(value: &str, line: usize) -> Result<Self, AtlasError> {
        match value {
            "Nearest" => Ok(Self::Nearest),
            "Linear" => Ok(Self::Linear),
            "MipMap" => Ok(Self::MipMap),
            "MipMapNearestNearest" => Ok(Self::MipMapNearestNearest),
            "MipMapLinearNearest" => Ok(Self::MipMapLinearNearest),
            "MipMapNearestLinear" => Ok(Self::MipMapNearestLinear),
            "MipMapLinearLinear" => Ok(Self::MipMapLinearLinear),
            _ => Err(AtlasError::UnknownFilter {
                line,
                value: value.to_owned(),
            }),
        }
    }
}

/// Image file holding packed regions.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasPage {
    /// Location of the page image, resolved against the atlas directory.
    pub texture_path: PathBuf,
    /// Page width in pixels, zero when undeclared.
    pub width: u32,
    /// Page height in pixels, zero when undeclared.
    pub height: u32,
    /// Declared pixel format.
    pub format: String,
    /// Minification filter.
    pub min_filter: TextureFilter,
    /// Magnification filter.
    pub mag_filter: TextureFilter,
    /// Declared wrap mode (`none`, `x`, `y` or `xy`).
    pub repeat: String,
    /// Whether page pixels use premultiplied alpha.
    pub premultiplied_alpha: bool,
}

impl AtlasPage {
    fn new(texture_path: PathBuf) -> Self {
        Self {
            texture_path,
            width: 0,
            height: 0,
            format: String::from("RGBA8888"),
            min_filter: TextureFilter::Nearest,
            mag_filter: TextureFilter::Nearest,
            repeat: String::from("none"),
            premultiplied_alpha: false,
        }
    }
}

/// Named rectangle packed onto an atlas page.
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasRegion {
    /// Region name.
    pub name: String,
    /// Index of the page that holds the region.
    pub page: usize,
    /// Left edge on the page in pixels.
    pub x: u32,
    /// Top edge on the page in pixels.
    pub y: u32,
    /// Unrotated width in pixels.
    pub width: u32,
    /// Unrotated height in pixels.
    pub height: u32,
    /// Width before whitespace stripping.
    pub original_width: u32,
    /// Height before whitespace stripping.
    pub original_height: u32,
    /// Horizontal offset of the stripped image inside the original.
    pub offset_x: i32,
    /// Vertical offset of the stripped image inside the original.
    pub offset_y: i32,
    /// Animation frame index, `-1` when the region is not part of a sequence.
    pub index: i32,
    /// Whether the packer rotated the image by 90 degrees.
    pub rotate: bool,
}

impl AtlasRegion {
    /// Rectangle occupied on the page, accounting for rotation.
    #[must_use]
    pub fn packed_bounds(&self) -> Rect {
        let (width, height) = if self.rotate {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        };
        Rect::new(self.x as f32, self.y as f32, width as f32, height as f32)
    }
}

/// Parsed atlas: pages plus the regions packed onto them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AtlasPack {
    pages: Vec<AtlasPage>,
    regions: Vec<AtlasRegion>,
}

impl AtlasPack {
    /// Reads and parses the atlas at `path`. Page paths resolve relative to
    /// the atlas directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| AtlasError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::parse(&contents, &base)
    }

    /// Parses atlas text, resolving page file names against `base_path`.
    pub fn parse(contents: &str, base_path: &Path) -> Result<Self, AtlasError> {
        let mut pack = Self::default();
        let mut current_page: Option<usize> = None;
        let mut pending: Option<PendingRegion> = None;

        for (index, raw_line) in contents.lines().enumerate() {
            let line = index + 1;
            let trimmed = raw_line.trim();

            if trimmed.is_empty() {
                pack.finish_region(pending.take())?;
                current_page = None;
                continue;
            }

            let Some(page_index) = current_page else {
                pack.pages.push(AtlasPage::new(base_path.join(trimmed)));
                current_page = Some(pack.pages.len() - 1);
                continue;
            };

            match trimmed.split_once(':') {
                Some((key, value)) => {
                    let key = key.trim();
                    let value = value.trim();
                    match pending.as_mut() {
                        Some(region) => region.apply(key, value, line)?,
                        None => apply_page_field(&mut pack.pages[page_index], key, value, line)?,
                    }
                }
                None => {
                    pack.finish_region(pending.take())?;
                    pending = Some(PendingRegion::new(trimmed, page_index));
                }
            }
        }

        pack.finish_region(pending)?;
        Ok(pack)
    }

    /// Pages declared by the atlas, in file order.
    #[must_use]
    pub fn pages(&self) -> &[AtlasPage] {
        &self.pages
    }

    /// Regions declared by the atlas, in file order.
    #[must_use]
    pub fn regions(&self) -> &[AtlasRegion] {
        &self.regions
    }

    /// Returns the first region with the provided name.
    #[must_use]
    pub fn find_region(&self, name: &str) -> Option<&AtlasRegion> {
        self.regions.iter().find(|region| region.name == name)
    }

    /// Creates a sprite for the named region.
    pub fn create_sprite(&self, name: &str) -> Result<Sprite, AtlasError> {
        let region = self
            .find_region(name)
            .ok_or_else(|| AtlasError::MissingRegion {
                name: name.to_owned(),
            })?;
        Ok(Sprite::new(
            region.page,
            region.packed_bounds(),
            region.rotate,
        ))
    }

    fn finish_region(&mut self, pending: Option<PendingRegion>) -> Result<(), AtlasError> {
        if let Some(region) = pending {
            self.regions.push(region.finish()?);
        }
        Ok(())
    }
}

fn apply_page_field(
    page: &mut AtlasPage,
    key: &str,
    value: &str,
    line: usize,
) -> Result<(), AtlasError> {
    match key {
        "size" => {
            let [width, height] = parse_tuple::<u32, 2>(key, value, line)?;
            page.width = width;
            page.height = height;
        }
        "format" => page.format = value.to_owned(),
        "filter" => {
            let (min, mag) = value
                .split_once(',')
                .ok_or_else(|| malformed(key, value, line))?;
            page.min_filter = TextureFilter::parse(min.trim(), line)?;
            page.mag_filter = TextureFilter::parse(mag.trim(), line)?;
        }
        "repeat" => page.repeat = value.to_owned(),
        "pma" => page.premultiplied_alpha = parse_bool(key, value, line)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug)]
struct PendingRegion {
    name: String,
    page: usize,
    position: Option<(u32, u32)>,
    size: Option<(u32, u32)>,
    original: Option<(u32, u32)>,
    offset: (i32, i32),
    index: i32,
    rotate: bool,
}

impl PendingRegion {
    fn new(name: &str, page: usize) -> Self {
        Self {
            name: name.to_owned(),
            page,
            position: None,
            size: None,
            original: None,
            offset: (0, 0),
            index: -1,
            rotate: false,
        }
    }

    fn apply(&mut self, key: &str, value: &str, line: usize) -> Result<(), AtlasError> {
        match key {
            "xy" => {
                let [x, y] = parse_tuple::<u32, 2>(key, value, line)?;
                self.position = Some((x, y));
            }
            "size" => {
                let [width, height] = parse_tuple::<u32, 2>(key, value, line)?;
                self.size = Some((width, height));
            }
            "bounds" => {
                let [x, y, width, height] = parse_tuple::<u32, 4>(key, value, line)?;
                self.position = Some((x, y));
                self.size = Some((width, height));
            }
            "orig" => {
                let [width, height] = parse_tuple::<u32, 2>(key, value, line)?;
                self.original = Some((width, height));
            }
            "offset" => {
                let [x, y] = parse_tuple::<i32, 2>(key, value, line)?;
                self.offset = (x, y);
            }
            "offsets" => {
                let [x, y, width, height] = parse_tuple::<i32, 4>(key, value, line)?;
                self.offset = (x, y);
                let width = u32::try_from(width).map_err(|_| malformed(key, value, line))?;
                let height = u32::try_from(height).map_err(|_| malformed(key, value, line))?;
                self.original = Some((width, height));
            }
            "index" => {
                let [index] = parse_tuple::<i32, 1>(key, value, line)?;
                self.index = index;
            }
            "rotate" => {
                self.rotate = match value {
                    "true" => true,
                    "false" => false,
                    degrees => {
                        let [degrees] = parse_tuple::<i32, 1>(key, degrees, line)?;
                        degrees == 90
                    }
                };
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<AtlasRegion, AtlasError> {
        let (Some((x, y)), Some((width, height))) = (self.position, self.size) else {
            return Err(AtlasError::MissingBounds { name: self.name });
        };
        let (original_width, original_height) = self.original.unwrap_or((width, height));

        Ok(AtlasRegion {
            name: self.name,
            page: self.page,
            x,
            y,
            width,
            height,
            original_width,
            original_height,
            offset_x: self.offset.0,
            offset_y: self.offset.1,
            index: self.index,
            rotate: self.rotate,
        })
    }
}

fn parse_tuple<T, const N: usize>(key: &str, value: &str, line: usize) -> Result<[T; N], AtlasError>
where
    T: std::str::FromStr + Copy + Default,
{
    let mut parsed = [T::default(); N];
    let mut parts = value.split(',');
    for slot in parsed.iter_mut() {
        let part = parts.next().ok_or_else(|| malformed(key, value, line))?;
        *slot = part
            .trim()
            .parse()
            .map_err(|_| malformed(key, value, line))?;
    }
    if parts.next().is_some() {
        return Err(malformed(key, value, line));
    }
    Ok(parsed)
}

fn parse_bool(key: &str, value: &str, line: usize) -> Result<bool, AtlasError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(malformed(key, value, line)),
    }
}

fn malformed(key: &str, value: &str, line: usize) -> AtlasError {
    AtlasError::MalformedField {
        line,
        field: key.to_owned(),
        value: value.to_owned(),
    }
}
