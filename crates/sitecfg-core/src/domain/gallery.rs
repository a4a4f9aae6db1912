//! Image galleries on project and collection items.
//!
//! Early versions of the editor stored one `image` per item.  The current
//! editor shows a gallery, stored as `images`.  Payloads of both generations
//! are still around, so before a gallery is edited it is normalised:
//!
//! 1. a non-empty `images` list is left alone;
//! 2. otherwise it is seeded with a copy of the legacy `image` when that image
//!    has a non-empty `src`;
//! 3. otherwise it is seeded with the section's placeholder image.
//!
//! A gallery is never left empty: removing the last image re-seeds the
//! placeholder.

use crate::domain::path::{ConfigPath, PathError, Segment};
use crate::domain::site::{CollectionItem, Dimensions, Extra, ImageAsset, ProjectItem, SiteConfig};

/// An item that owns a gallery of images.
pub trait Gallery {
    /// The legacy single-image field, if present.
    fn legacy_image(&self) -> Option<&ImageAsset>;
    /// The gallery list.
    fn images_mut(&mut self) -> &mut Vec<ImageAsset>;
    /// Placeholder used when the item has no usable image at all.
    fn placeholder() -> ImageAsset;
}

/// Placeholder image for project items.
pub fn project_placeholder() -> ImageAsset {
    placeholder("assets/img/p01.jpg", "Imagem do projeto", 1600, 1000)
}

/// Placeholder image for collection items.
pub fn collection_placeholder() -> ImageAsset {
    placeholder("assets/img/gallery-01.png", "Imagem da coleção", 900, 1100)
}

fn placeholder(src: &str, alt: &str, width: u32, height: u32) -> ImageAsset {
    ImageAsset {
        src: src.to_string(),
        alt: alt.to_string(),
        recommended: Dimensions { width, height },
        extra: Extra::new(),
    }
}

impl Gallery for ProjectItem {
    fn legacy_image(&self) -> Option<&ImageAsset> {
        self.image.as_ref()
    }
    fn images_mut(&mut self) -> &mut Vec<ImageAsset> {
        &mut self.images
    }
    fn placeholder() -> ImageAsset {
        project_placeholder()
    }
}

impl Gallery for CollectionItem {
    fn legacy_image(&self) -> Option<&ImageAsset> {
        self.image.as_ref()
    }
    fn images_mut(&mut self) -> &mut Vec<ImageAsset> {
        &mut self.images
    }
    fn placeholder() -> ImageAsset {
        collection_placeholder()
    }
}

/// Guarantees `item` has a non-empty gallery and returns it.
pub fn ensure_images<G: Gallery>(item: &mut G) -> &mut Vec<ImageAsset> {
    let needs_seed = item.images_mut().is_empty();
    if needs_seed {
        let seed = item
            .legacy_image()
            .filter(|img| !img.src.is_empty())
            .cloned()
            .unwrap_or_else(G::placeholder);
        item.images_mut().push(seed);
    }
    item.images_mut()
}

/// Removes the gallery image at `index`.
///
/// Returns the removed image, or `None` when `index` is out of range.  When
/// the last image is removed the placeholder takes its place.
pub fn remove_image<G: Gallery>(item: &mut G, index: usize) -> Option<ImageAsset> {
    let images = item.images_mut();
    if index >= images.len() {
        return None;
    }
    let removed = images.remove(index);
    if images.is_empty() {
        images.push(G::placeholder());
    }
    Some(removed)
}

impl SiteConfig {
    /// Normalises every project and collection gallery.
    ///
    /// Returns the number of items whose gallery was seeded.
    pub fn normalize_galleries(&mut self) -> usize {
        let mut seeded = 0;
        for item in &mut self.projects.items {
            if item.images.is_empty() {
                seeded += 1;
            }
            ensure_images(item);
        }
        for item in &mut self.collections.items {
            if item.images.is_empty() {
                seeded += 1;
            }
            ensure_images(item);
        }
        seeded
    }

    /// Removes image `index` from the gallery of the item at `item`
    /// (`projects.items.N` or `collections.items.N`).
    ///
    /// The gallery is normalised first, so a legacy single-image item can be
    /// edited too, and is re-seeded with the placeholder when emptied.
    ///
    /// # Errors
    ///
    /// [`PathError::NotAGalleryItem`] when `item` names anything else, and
    /// [`PathError::IndexOutOfRange`] when the item or the image does not exist.
    pub fn remove_gallery_image(
        &mut self,
        item: &ConfigPath,
        index: usize,
    ) -> Result<ImageAsset, PathError> {
        let not_gallery = || PathError::NotAGalleryItem(item.to_string());
        let [Segment::Key(section), Segment::Key(items), Segment::Index(pos)] = item.segments()
        else {
            return Err(not_gallery());
        };
        if items != "items" {
            return Err(not_gallery());
        }
        let out_of_range = |index: usize, len: usize| PathError::IndexOutOfRange {
            path: item.to_string(),
            index,
            len,
        };
        match section.as_str() {
            "projects" => {
                let len = self.projects.items.len();
                let entry = self
                    .projects
                    .items
                    .get_mut(*pos)
                    .ok_or_else(|| out_of_range(*pos, len))?;
                let len = ensure_images(entry).len();
                remove_image(entry, index).ok_or_else(|| out_of_range(index, len))
            }
            "collections" => {
                let len = self.collections.items.len();
                let entry = self
                    .collections
                    .items
                    .get_mut(*pos)
                    .ok_or_else(|| out_of_range(*pos, len))?;
                let len = ensure_images(entry).len();
                remove_image(entry, index).ok_or_else(|| out_of_range(index, len))
            }
            _ => Err(not_gallery()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(src: &str) -> ImageAsset {
        ImageAsset {
            src: src.to_string(),
            ..ImageAsset::default()
        }
    }

    #[test]
    fn test_ensure_images_seeds_from_legacy_image() {
        // Arrange
        let mut item = ProjectItem {
            image: Some(image("assets/img/p03.jpg")),
            ..ProjectItem::default()
        };

        // Act
        let images = ensure_images(&mut item);

        // Assert
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].src, "assets/img/p03.jpg");
        // The legacy field is kept for renderers that still read it.
        assert!(item.image.is_some());
    }

    #[test]
    fn test_ensure_images_uses_placeholder_when_legacy_src_is_empty() {
        let mut item = CollectionItem {
            image: Some(image("")),
            ..CollectionItem::default()
        };
        let images = ensure_images(&mut item);
        assert_eq!(images, &vec![collection_placeholder()]);
    }

    #[test]
    fn test_ensure_images_uses_placeholder_without_any_image() {
        let mut item = ProjectItem::default();
        ensure_images(&mut item);
        assert_eq!(item.images, vec![project_placeholder()]);
    }

    #[test]
    fn test_ensure_images_leaves_existing_gallery_untouched() {
        let mut item = ProjectItem {
            image: Some(image("legacy.jpg")),
            images: vec![image("a.jpg"), image("b.jpg")],
            ..ProjectItem::default()
        };
        ensure_images(&mut item);
        let srcs: Vec<_> = item.images.iter().map(|i| i.src.as_str()).collect();
        assert_eq!(srcs, ["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_remove_last_image_reseeds_placeholder() {
        // Arrange
        let mut item = CollectionItem {
            images: vec![image("only.png")],
            ..CollectionItem::default()
        };

        // Act
        let removed = remove_image(&mut item, 0);

        // Assert
        assert_eq!(removed.map(|i| i.src), Some("only.png".to_string()));
        assert_eq!(item.images, vec![collection_placeholder()]);
    }

    #[test]
    fn test_remove_image_out_of_range_returns_none() {
        let mut item = ProjectItem {
            images: vec![image("a.jpg")],
            ..ProjectItem::default()
        };
        assert!(remove_image(&mut item, 3).is_none());
        assert_eq!(item.images.len(), 1);
    }

    #[test]
    fn test_remove_gallery_image_normalises_then_removes() {
        // Arrange: baseline items only carry the legacy image
        let mut cfg = SiteConfig::baseline();
        let legacy = cfg.projects.items[0].image.clone();
        let item = ConfigPath::parse("projects.items.0").expect("path");

        // Act
        let removed = cfg.remove_gallery_image(&item, 0).expect("remove");

        // Assert
        assert_eq!(Some(removed), legacy);
        assert_eq!(cfg.projects.items[0].images, vec![project_placeholder()]);
    }

    #[test]
    fn test_remove_gallery_image_keeps_other_images() {
        let mut cfg = SiteConfig::baseline();
        cfg.collections.items[0].images = vec![image("a.png"), image("b.png")];
        let item = ConfigPath::parse("collections.items.0").expect("path");

        let removed = cfg.remove_gallery_image(&item, 0).expect("remove");

        assert_eq!(removed.src, "a.png");
        assert_eq!(cfg.collections.items[0].images, vec![image("b.png")]);
    }

    #[test]
    fn test_remove_gallery_image_rejects_bad_targets() {
        let mut cfg = SiteConfig::baseline();
        let media = ConfigPath::parse("media.items.0").expect("path");
        let missing = ConfigPath::parse("projects.items.999").expect("path");
        let item = ConfigPath::parse("projects.items.0").expect("path");

        assert!(matches!(
            cfg.remove_gallery_image(&media, 0),
            Err(PathError::NotAGalleryItem(_))
        ));
        assert!(matches!(
            cfg.remove_gallery_image(&missing, 0),
            Err(PathError::IndexOutOfRange { index: 999, .. })
        ));
        assert!(matches!(
            cfg.remove_gallery_image(&item, 7),
            Err(PathError::IndexOutOfRange { index: 7, len: 1, .. })
        ));
    }

    #[test]
    fn test_normalize_galleries_seeds_every_baseline_item() {
        // Arrange: the baseline only carries legacy single images
        let mut cfg = SiteConfig::baseline();

        // Act
        let seeded = cfg.normalize_galleries();

        // Assert
        assert_eq!(seeded, cfg.projects.items.len() + cfg.collections.items.len());
        for item in &cfg.projects.items {
            assert_eq!(Some(&item.images[0]), item.image.as_ref());
        }
        // A second pass is a no-op.
        assert_eq!(cfg.normalize_galleries(), 0);
    }
}
