/*!
 * Entity descriptors.
 *
 * Every translatable content type is described once here: its source table,
 * its translation table and foreign key, the fields eligible for translation,
 * and the predicate that marks a row as published.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::ContentFields;

/// How a source column is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain text column
    Text,
    /// JSON text column holding an array or object
    Structured,
}

/// One translatable field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Column name in both the source and the translation table
    pub name: &'static str,
    /// Storage form of the column
    pub kind: FieldKind,
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Text }
}

const fn structured(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Structured }
}

const PACKAGE_FIELDS: &[FieldSpec] = &[
    text("title"),
    text("short_description"),
    text("description"),
    text("location"),
    text("duration"),
    structured("highlights"),
    structured("itinerary"),
    structured("includes"),
    structured("excludes"),
    structured("faqs"),
];

const BLOG_FIELDS: &[FieldSpec] = &[
    text("title"),
    text("excerpt"),
    text("content"),
    text("category"),
    structured("tags"),
];

const TESTIMONIAL_FIELDS: &[FieldSpec] = &[text("content"), text("designation"), text("trip_name")];

const GALLERY_FIELDS: &[FieldSpec] = &[text("title"), text("description"), text("category")];

const SECTION_FIELDS: &[FieldSpec] = &[
    text("title"),
    text("subtitle"),
    text("description"),
    text("cta_label"),
    structured("content"),
];

const NAVIGATION_ITEM_FIELDS: &[FieldSpec] = &[text("title")];

/// Content types handled by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Tour package
    Package,
    /// Blog post
    Blog,
    /// Customer testimonial
    Testimonial,
    /// Gallery item
    Gallery,
    /// Generic page section
    Section,
    /// Menu entry
    NavigationItem,
}

impl EntityKind {
    /// All kinds, in the order a full batch run processes them
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Package,
        EntityKind::Blog,
        EntityKind::Testimonial,
        EntityKind::Gallery,
        EntityKind::Section,
        EntityKind::NavigationItem,
    ];

    /// Table holding the canonical source-language rows
    pub fn source_table(&self) -> &'static str {
        match self {
            EntityKind::Package => "packages",
            EntityKind::Blog => "blog_posts",
            EntityKind::Testimonial => "testimonials",
            EntityKind::Gallery => "gallery_items",
            EntityKind::Section => "sections",
            EntityKind::NavigationItem => "navigation_items",
        }
    }

    /// Table holding one row per (entity, language)
    pub fn translation_table(&self) -> &'static str {
        match self {
            EntityKind::Package => "package_translations",
            EntityKind::Blog => "blog_translations",
            EntityKind::Testimonial => "testimonial_translations",
            EntityKind::Gallery => "gallery_translations",
            EntityKind::Section => "section_translations",
            EntityKind::NavigationItem => "navigation_item_translations",
        }
    }

    /// Foreign key column of the translation table
    pub fn foreign_key(&self) -> &'static str {
        match self {
            EntityKind::Package => "package_id",
            EntityKind::Blog => "blog_id",
            EntityKind::Testimonial => "testimonial_id",
            EntityKind::Gallery => "gallery_id",
            EntityKind::Section => "section_id",
            EntityKind::NavigationItem => "navigation_item_id",
        }
    }

    /// Translatable fields in declaration order
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            EntityKind::Package => PACKAGE_FIELDS,
            EntityKind::Blog => BLOG_FIELDS,
            EntityKind::Testimonial => TESTIMONIAL_FIELDS,
            EntityKind::Gallery => GALLERY_FIELDS,
            EntityKind::Section => SECTION_FIELDS,
            EntityKind::NavigationItem => NAVIGATION_ITEM_FIELDS,
        }
    }

    /// SQL predicate selecting published/approved source rows
    pub fn published_predicate(&self) -> &'static str {
        match self {
            EntityKind::Package | EntityKind::Blog => "status = 'published'",
            EntityKind::Testimonial => "is_approved = 1",
            EntityKind::Gallery => "is_published = 1",
            EntityKind::Section | EntityKind::NavigationItem => "is_active = 1",
        }
    }

    /// Look up a field by column name
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Package => write!(f, "package"),
            EntityKind::Blog => write!(f, "blog"),
            EntityKind::Testimonial => write!(f, "testimonial"),
            EntityKind::Gallery => write!(f, "gallery"),
            EntityKind::Section => write!(f, "section"),
            EntityKind::NavigationItem => write!(f, "navigation_item"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "package" => Ok(EntityKind::Package),
            "blog" | "blog_post" => Ok(EntityKind::Blog),
            "testimonial" => Ok(EntityKind::Testimonial),
            "gallery" | "gallery_item" => Ok(EntityKind::Gallery),
            "section" => Ok(EntityKind::Section),
            "navigation_item" | "navigation" => Ok(EntityKind::NavigationItem),
            _ => Err(anyhow::anyhow!("Invalid entity kind: {}", s)),
        }
    }
}

/// Canonical source-language content of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct SourceEntity {
    /// Entity type
    pub kind: EntityKind,
    /// Primary key in the source table
    pub id: i64,
    /// Translatable fields; missing columns are absent
    pub fields: ContentFields,
    /// Section slot such as `header`; only set for sections
    pub section_key: Option<String>,
}

impl SourceEntity {
    /// Create a source entity without a section key
    pub fn new(kind: EntityKind, id: i64, fields: ContentFields) -> Self {
        Self {
            kind,
            id,
            fields,
            section_key: None,
        }
    }

    /// Whether this entity is the site header section
    pub fn is_header_section(&self) -> bool {
        self.kind == EntityKind::Section && self.section_key.as_deref() == Some(HEADER_SECTION_KEY)
    }
}

/// `section_key` of the site header
pub const HEADER_SECTION_KEY: &str = "header";
