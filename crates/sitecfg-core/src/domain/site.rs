//! Typed view of the site configuration.
//!
//! The persistence layer works on untyped `serde_json::Value` trees so that it
//! can carry keys this version of the editor does not know about.  Consumers
//! that want field access use [`SiteConfig`], which mirrors the baseline's
//! shape.
//!
//! Every record is `#[serde(default)]` and carries a flattened [`Extra`] map,
//! so converting a tree into the typed view and back loses nothing: missing
//! fields come back as empty values, unknown fields come back verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::baseline::baseline;

/// Unknown keys preserved on every typed record.
pub type Extra = Map<String, Value>;

/// Pixel size an editor should aim for when replacing an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// An image reference with alt text and a recommended size.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageAsset {
    pub src: String,
    pub alt: String,
    pub recommended: Dimensions,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A video reference with its poster frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoAsset {
    pub src: String,
    pub poster: String,
    pub recommended: Dimensions,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A call-to-action link.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    pub label: String,
    pub href: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A titled paragraph; used by the services list and the process steps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextItem {
    pub title: String,
    pub text: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Brand {
    pub logo: ImageAsset,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Document `<head>` metadata, including Open Graph tags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Header {
    pub cta_label: String,
    pub cta_href: String,
    pub instagram: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Hero {
    pub eyebrow: String,
    pub title: String,
    pub subtitle: String,
    pub image: ImageAsset,
    pub background: ImageAsset,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stat {
    pub value: String,
    pub label: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct About {
    pub title: String,
    pub text: String,
    pub stats: Vec<Stat>,
    pub image: ImageAsset,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesSection {
    pub title: String,
    pub subtitle: String,
    pub cta: Link,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One entry of the collections gallery.
///
/// Older payloads carry a single `image`; newer ones carry an `images` list.
/// See [`crate::domain::gallery`] for how the two are reconciled.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAsset>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageAsset>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Collections {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<CollectionItem>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// One featured project.  Carries the same legacy/new image pair as
/// [`CollectionItem`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectItem {
    pub title: String,
    pub text: String,
    pub link_label: String,
    pub link_href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAsset>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageAsset>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Projects {
    pub title: String,
    pub subtitle: String,
    pub items: Vec<ProjectItem>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeaturedMedia {
    pub badge: String,
    pub eyebrow: String,
    pub title: String,
    pub text: String,
    pub link_label: String,
    pub link_href: String,
    pub video: VideoAsset,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaItem {
    pub title: String,
    pub date: String,
    pub text: String,
    pub link_label: String,
    pub link_href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageAsset>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Media {
    pub title: String,
    pub subtitle: String,
    pub featured: FeaturedMedia,
    pub items: Vec<MediaItem>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Process {
    pub title: String,
    pub subtitle: String,
    pub steps: Vec<TextItem>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Showroom {
    pub title: String,
    pub address: String,
    pub cta_label: String,
    pub cta_href: String,
    pub map_url: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub title: String,
    pub subtitle: String,
    pub address_label: String,
    pub address: String,
    pub phone_label: String,
    pub phone: String,
    pub whatsapp_label: String,
    pub whatsapp: String,
    pub instagram_label: String,
    pub instagram: String,
    pub form_note: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// WhatsApp contact settings.  `template` contains `{nome}`, `{tel}` and
/// `{msg}` placeholders filled in by the page renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WhatsApp {
    pub number: String,
    pub quick_message: String,
    pub template: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Footer {
    pub tagline: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Top-level site configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub brand: Brand,
    pub meta: PageMeta,
    pub header: Header,
    pub hero: Hero,
    pub about: About,
    pub services: Vec<TextItem>,
    pub services_section: ServicesSection,
    pub collections: Collections,
    pub projects: Projects,
    pub media: Media,
    pub process: Process,
    pub showroom: Showroom,
    pub contact: Contact,
    pub whatsapp: WhatsApp,
    pub footer: Footer,
    #[serde(flatten)]
    pub extra: Extra,
}

impl SiteConfig {
    /// Builds the typed view of the canonical baseline.
    pub fn baseline() -> Self {
        // baseline.json is checked against this type by the unit tests below.
        Self::from_value(baseline()).expect("embedded baseline must match SiteConfig")
    }

    /// Reads a configuration tree into the typed view.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] when a known field holds a value of the
    /// wrong type (e.g. a string where a pixel width is expected).
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Converts the typed view back into a configuration tree.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors; with the types defined here this only
    /// happens if an `extra` map was filled with a non-serializable value.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_baseline_round_trips_through_typed_view() {
        // Arrange
        let tree = baseline();

        // Act
        let typed = SiteConfig::from_value(tree).expect("baseline must deserialize");
        let back = typed.to_value().expect("typed view must serialize");

        // Assert
        assert_eq!(&back, tree);
    }

    #[test]
    fn test_typed_baseline_exposes_known_fields() {
        let cfg = SiteConfig::baseline();
        assert_eq!(cfg.services.len(), 3);
        assert_eq!(cfg.collections.items.len(), 6);
        assert_eq!(cfg.projects.items.len(), 4);
        assert_eq!(cfg.media.items.len(), 3);
        assert_eq!(cfg.process.steps.len(), 3);
        assert_eq!(cfg.hero.image.recommended.width, 1200);
        assert_eq!(cfg.whatsapp.number, "5511947518715");
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        // Arrange: an extra top-level section and an extra key inside hero
        let tree = json!({
            "hero": { "title": "X", "badge": "new" },
            "promo": { "enabled": true }
        });

        // Act
        let typed = SiteConfig::from_value(&tree).expect("deserialize");
        let back = typed.to_value().expect("serialize");

        // Assert
        assert_eq!(typed.hero.title, "X");
        assert_eq!(back["hero"]["badge"], "new");
        assert_eq!(back["promo"], json!({ "enabled": true }));
    }

    #[test]
    fn test_partial_tree_fills_missing_fields_with_empty_values() {
        let typed = SiteConfig::from_value(&json!({ "meta": { "title": "T" } })).expect("ok");
        assert_eq!(typed.meta.title, "T");
        assert!(typed.meta.description.is_empty());
        assert!(typed.services.is_empty());
    }

    #[test]
    fn test_wrong_field_type_is_rejected() {
        let bad = json!({ "brand": { "logo": { "recommended": { "width": "wide" } } } });
        assert!(SiteConfig::from_value(&bad).is_err());
    }

    #[test]
    fn test_camel_case_keys_are_used_on_the_wire() {
        let mut cfg = SiteConfig::default();
        cfg.services_section.title = "S".to_string();
        cfg.meta.og_title = "OG".to_string();
        let tree = cfg.to_value().expect("serialize");
        assert_eq!(tree["servicesSection"]["title"], "S");
        assert_eq!(tree["meta"]["ogTitle"], "OG");
    }
}
