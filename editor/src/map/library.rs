//! Asset library: tile and overlay catalogs scanned from an asset folder

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::AssetLoadError;

/// Folder names containing any of these are tile sets
const TILE_KEYWORDS: [&str; 6] = [
    "tile",
    "dungeon",
    "river",
    "cavern",
    "subterranean",
    "underdark",
];

const BRAND_PREFIXES: [&str; 2] = ["Realm Brew - ", "Realm Brew "];

const SET_SUFFIXES: [&str; 6] = [
    " - Digital Tiles",
    " - Digital Overlays",
    " Digital Tiles",
    " Digital Overlays",
    " Tiles",
    " Overlays",
];

const IMAGE_EXTENSION: &str = "png";

/// What a catalog folder provides
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetKind {
    Tile,
    Overlay,
}

/// One image in a catalog
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetInfo {
    pub path: PathBuf,
    /// Raw name of the folder the image came from
    pub folder: String,
    /// Cleaned folder name shown as the category
    pub category: String,
    /// Title-cased file stem
    pub name: String,
}

impl AssetInfo {
    pub fn new(path: PathBuf, folder: &str, category: &str) -> Self {
        let name = display_asset_name(&path);
        Self {
            path,
            folder: folder.to_string(),
            category: category.to_string(),
            name,
        }
    }
}

/// Named group of assets, in folder order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub assets: Vec<AssetInfo>,
}

/// Tile and overlay catalogs
#[derive(Clone, Debug, Default)]
pub struct AssetLibrary {
    root: Option<PathBuf>,
    tiles: Vec<Category>,
    overlays: Vec<Category>,
}

impl AssetLibrary {
    /// Scan the immediate subfolders of `root`.
    ///
    /// Fails with [`AssetLoadError::NothingFound`] when no folder yields a
    /// tile or overlay set.
    pub fn load(root: impl AsRef<Path>) -> Result<Self, AssetLoadError> {
        let root = root.as_ref();
        std::fs::read_dir(root).map_err(|source| AssetLoadError::Unreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let mut library = Self {
            root: Some(root.to_path_buf()),
            ..Self::default()
        };

        let folders = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir());

        for entry in folders {
            let folder = entry.file_name().to_string_lossy().into_owned();
            let images = list_images(entry.path());
            if images.is_empty() {
                continue;
            }

            let Some(kind) = classify_folder(&folder) else {
                log::debug!("Skipping unrecognised folder {:?}", folder);
                continue;
            };

            let display = clean_display_name(&folder);
            let assets = images
                .into_iter()
                .map(|path| AssetInfo::new(path, &folder, &display))
                .collect::<Vec<_>>();
            log::debug!("{:?} set {:?}: {} images", kind, display, assets.len());

            let catalog = match kind {
                AssetKind::Tile => &mut library.tiles,
                AssetKind::Overlay => &mut library.overlays,
            };
            insert_category(catalog, display, assets);
        }

        if library.tiles.is_empty() && library.overlays.is_empty() {
            return Err(AssetLoadError::NothingFound {
                path: root.to_path_buf(),
            });
        }

        log::info!(
            "Loaded {} tile sets and {} overlay sets from {:?}",
            library.tiles.len(),
            library.overlays.len(),
            root
        );
        Ok(library)
    }

    /// Build a library from prepared catalogs without touching the disk
    pub fn from_catalogs(tiles: Vec<Category>, overlays: Vec<Category>) -> Self {
        Self {
            root: None,
            tiles,
            overlays,
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn catalog(&self, kind: AssetKind) -> &[Category] {
        match kind {
            AssetKind::Tile => &self.tiles,
            AssetKind::Overlay => &self.overlays,
        }
    }

    /// Category names in folder order
    pub fn category_names(&self, kind: AssetKind) -> Vec<&str> {
        self.catalog(kind).iter().map(|c| c.name.as_str()).collect()
    }

    /// Assets of a category, empty if the category is unknown
    pub fn assets(&self, kind: AssetKind, category: &str) -> &[AssetInfo] {
        self.catalog(kind)
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.assets.as_slice())
            .unwrap_or(&[])
    }

    pub fn asset(&self, kind: AssetKind, category: &str, index: usize) -> Option<&AssetInfo> {
        self.assets(kind, category).get(index)
    }

    pub fn tile_categories(&self) -> Vec<&str> {
        self.category_names(AssetKind::Tile)
    }

    pub fn overlay_categories(&self) -> Vec<&str> {
        self.category_names(AssetKind::Overlay)
    }

    pub fn tiles(&self, category: &str) -> &[AssetInfo] {
        self.assets(AssetKind::Tile, category)
    }

    pub fn overlays(&self, category: &str) -> &[AssetInfo] {
        self.assets(AssetKind::Overlay, category)
    }

    pub fn tile_set_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn overlay_set_count(&self) -> usize {
        self.overlays.len()
    }

    /// Total number of overlay images across all sets
    pub fn overlay_image_count(&self) -> usize {
        self.overlays.iter().map(|c| c.assets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.overlays.is_empty()
    }
}

/// A later folder with the same display name replaces the earlier assets
fn insert_category(catalog: &mut Vec<Category>, name: String, assets: Vec<AssetInfo>) {
    match catalog.iter_mut().find(|c| c.name == name) {
        Some(existing) => existing.assets = assets,
        None => catalog.push(Category { name, assets }),
    }
}

/// PNG files directly inside a folder, sorted by name
fn list_images(folder: &Path) -> Vec<PathBuf> {
    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION))
        })
        .collect()
}

/// Overlay match wins over tile keywords; anything else is not a catalog
pub fn classify_folder(name: &str) -> Option<AssetKind> {
    let lower = name.to_lowercase();
    if lower.contains("overlay") {
        Some(AssetKind::Overlay)
    } else if TILE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Some(AssetKind::Tile)
    } else {
        None
    }
}

/// Strip ordinal bullets, branding, and set suffixes from a folder name
pub fn clean_display_name(folder: &str) -> String {
    let mut name = strip_ordinal(folder);

    if let Some(rest) = BRAND_PREFIXES.iter().find_map(|p| name.strip_prefix(p)) {
        name = rest;
    }
    if let Some(rest) = SET_SUFFIXES.iter().find_map(|s| name.strip_suffix(s)) {
        name = rest;
    }

    name.trim().to_string()
}

/// Remove a leading `<digit> • ` or `<digit>·` marker
fn strip_ordinal(name: &str) -> &str {
    let mut chars = name.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_digit() => {}
        _ => return name,
    }

    let rest = chars.as_str().trim_start();
    match rest.strip_prefix(['•', '·']) {
        Some(after) => after.trim_start(),
        None => name,
    }
}

/// File stem with separators turned into spaces, title-cased
pub fn display_asset_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    title_case(&stem.replace(['_', '-'], " "))
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn fixture_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "hexmap-library-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    fn write_png(folder: &Path, file: &str) {
        std::fs::create_dir_all(folder).unwrap();
        RgbaImage::from_pixel(4, 4, Rgba([0, 128, 0, 255]))
            .save(folder.join(file))
            .unwrap();
    }

    #[test]
    fn test_clean_display_name() {
        assert_eq!(clean_display_name("1 • Realm Brew - Forest Tiles"), "Forest");
        assert_eq!(clean_display_name("Magic Overlays"), "Magic");
        assert_eq!(clean_display_name("2·Realm Brew Dungeon - Digital Tiles"), "Dungeon");
        assert_eq!(clean_display_name("Rivers"), "Rivers");
        // Only one suffix is stripped
        assert_eq!(clean_display_name("Cave Overlays Tiles"), "Cave Overlays");
    }

    #[test]
    fn test_classify_folder() {
        assert_eq!(
            classify_folder("1 • Realm Brew - Forest Tiles"),
            Some(AssetKind::Tile)
        );
        assert_eq!(classify_folder("Magic Overlays"), Some(AssetKind::Overlay));
        assert_eq!(classify_folder("Tile Overlays"), Some(AssetKind::Overlay));
        assert_eq!(classify_folder("Underdark"), Some(AssetKind::Tile));
        assert_eq!(classify_folder("Documentation"), None);
    }

    #[test]
    fn test_display_asset_name() {
        assert_eq!(
            display_asset_name(Path::new("/a/forest_clearing-01.png")),
            "Forest Clearing 01"
        );
        assert_eq!(display_asset_name(Path::new("3d_TOWER.png")), "3D Tower");
    }

    #[test]
    fn test_load_builds_catalogs() {
        let root = fixture_root("catalogs");
        write_png(&root.join("1 • Realm Brew - Forest Tiles"), "b_tree.png");
        write_png(&root.join("1 • Realm Brew - Forest Tiles"), "a-grass.png");
        write_png(&root.join("Magic Overlays"), "rune.png");
        write_png(&root.join("Artwork"), "cover.png");
        std::fs::create_dir_all(root.join("Empty Tiles")).unwrap();
        std::fs::write(root.join("readme.txt"), "not a folder").unwrap();

        let library = AssetLibrary::load(&root).unwrap();
        assert_eq!(library.tile_categories(), vec!["Forest"]);
        assert_eq!(library.overlay_categories(), vec!["Magic"]);

        let forest = library.tiles("Forest");
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].name, "A Grass");
        assert_eq!(forest[1].name, "B Tree");
        assert_eq!(forest[0].folder, "1 • Realm Brew - Forest Tiles");
        assert_eq!(forest[0].category, "Forest");

        assert_eq!(library.overlay_image_count(), 1);
        assert_eq!(library.overlays("Magic")[0].name, "Rune");
        assert!(library.tiles("Magic").is_empty());
        assert!(library.asset(AssetKind::Overlay, "Magic", 1).is_none());
    }

    #[test]
    fn test_load_nothing_found() {
        let root = fixture_root("nothing");
        write_png(&root.join("Artwork"), "cover.png");

        let err = AssetLibrary::load(&root).unwrap_err();
        assert!(matches!(err, AssetLoadError::NothingFound { .. }));
    }

    #[test]
    fn test_load_unreadable() {
        let err = AssetLibrary::load("/nonexistent/hexmap/assets").unwrap_err();
        assert!(matches!(err, AssetLoadError::Unreadable { .. }));
    }
}
