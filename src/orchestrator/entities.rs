//! Content type orchestrators.

use async_trait::async_trait;

use crate::entities::{EntityKind, SourceEntity};
use crate::orchestrator::navigation::translate_header_navigation;
use crate::orchestrator::{EntityOrchestrator, LanguageOutcome, TranslationPipeline};

/// Tour packages
#[derive(Debug, Default, Clone, Copy)]
pub struct PackageOrchestrator;

/// Blog posts
#[derive(Debug, Default, Clone, Copy)]
pub struct BlogOrchestrator;

/// Customer testimonials
#[derive(Debug, Default, Clone, Copy)]
pub struct TestimonialOrchestrator;

/// Gallery items
#[derive(Debug, Default, Clone, Copy)]
pub struct GalleryOrchestrator;

/// Page sections; the header section also translates its menu
#[derive(Debug, Default, Clone, Copy)]
pub struct SectionOrchestrator;

/// Menu entries
#[derive(Debug, Default, Clone, Copy)]
pub struct NavigationItemOrchestrator;

impl EntityOrchestrator for PackageOrchestrator {
    fn kind(&self) -> EntityKind {
        EntityKind::Package
    }
}

impl EntityOrchestrator for BlogOrchestrator {
    fn kind(&self) -> EntityKind {
        EntityKind::Blog
    }
}

impl EntityOrchestrator for TestimonialOrchestrator {
    fn kind(&self) -> EntityKind {
        EntityKind::Testimonial
    }
}

impl EntityOrchestrator for GalleryOrchestrator {
    fn kind(&self) -> EntityKind {
        EntityKind::Gallery
    }
}

impl EntityOrchestrator for NavigationItemOrchestrator {
    fn kind(&self) -> EntityKind {
        EntityKind::NavigationItem
    }
}

#[async_trait]
impl EntityOrchestrator for SectionOrchestrator {
    fn kind(&self) -> EntityKind {
        EntityKind::Section
    }

    async fn after_persist(
        &self,
        pipeline: &TranslationPipeline,
        entity: &SourceEntity,
        language: &str,
        force: bool,
    ) -> Vec<LanguageOutcome> {
        if !entity.is_header_section() {
            return Vec::new();
        }
        translate_header_navigation(pipeline, entity, language, force).await
    }
}

static PACKAGE: PackageOrchestrator = PackageOrchestrator;
static BLOG: BlogOrchestrator = BlogOrchestrator;
static TESTIMONIAL: TestimonialOrchestrator = TestimonialOrchestrator;
static GALLERY: GalleryOrchestrator = GalleryOrchestrator;
static SECTION: SectionOrchestrator = SectionOrchestrator;
static NAVIGATION_ITEM: NavigationItemOrchestrator = NavigationItemOrchestrator;

/// The orchestrator responsible for a content type
pub fn orchestrator_for(kind: EntityKind) -> &'static dyn EntityOrchestrator {
    match kind {
        EntityKind::Package => &PACKAGE,
        EntityKind::Blog => &BLOG,
        EntityKind::Testimonial => &TESTIMONIAL,
        EntityKind::Gallery => &GALLERY,
        EntityKind::Section => &SECTION,
        EntityKind::NavigationItem => &NAVIGATION_ITEM,
    }
}
