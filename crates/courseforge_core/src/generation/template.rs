//! Deterministic offline generator.
//!
//! Produces outlines, layouts and placeholder image URLs from fixed
//! templates, so the wizard and editor work without a network generator.

use crate::generation::{GenerationAdapter, GenerationError, GenerationResult};
use crate::model::document::{Document, ElementStyle, ElementType, TextAlign};
use crate::model::outline::{
    AspectRatio, Chapter, ContentLength, ElementDraft, GenerationConfig, Outline, PageLayout,
};
use crate::text::{collapse_whitespace, slugify};

const CHAPTER_STEMS: [&str; 8] = [
    "Foundations of {topic}",
    "Core Concepts",
    "Putting {topic} into Practice",
    "Common Pitfalls",
    "Advanced Techniques",
    "Case Studies",
    "Tools and Workflows",
    "Next Steps",
];

const PLACEHOLDER_IMAGE_BASE: &str = "https://picsum.photos/seed";

/// Template-based generation adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateGenerator;

impl TemplateGenerator {
    pub fn new() -> Self {
        Self
    }

    fn chapter_count(length: ContentLength) -> usize {
        match length {
            ContentLength::Short => 3,
            ContentLength::Medium => 5,
            ContentLength::Long => 8,
        }
    }
}

impl GenerationAdapter for TemplateGenerator {
    fn generate_outline(&self, config: &GenerationConfig) -> GenerationResult<Outline> {
        let topic = config.topic.trim();
        if topic.is_empty() {
            return Err(GenerationError::InvalidInput("topic is empty".to_string()));
        }

        let tone = config.tone.trim().to_lowercase();
        let audience = config.audience.trim();
        let subtitle = if audience.is_empty() {
            format!("A {tone} guide")
        } else {
            format!("A {tone} guide for {audience}")
        };

        let chapters = CHAPTER_STEMS
            .iter()
            .take(Self::chapter_count(config.length))
            .map(|stem| {
                let title = stem.replace("{topic}", topic);
                Chapter {
                    subsections: vec![format!("Why {title} matters"), "Worked example".to_string()],
                    key_points: vec![
                        format!("The essentials of {}", title.to_lowercase()),
                        "A repeatable checklist".to_string(),
                        "What to practice next".to_string(),
                    ],
                    title,
                }
            })
            .collect();

        Ok(Outline {
            title: topic.to_string(),
            subtitle,
            chapters,
        })
    }

    fn generate_page_layout(
        &self,
        chapter: &Chapter,
        page_number: usize,
    ) -> GenerationResult<PageLayout> {
        let background_color = if page_number % 2 == 0 {
            "#f8fafc"
        } else {
            "#ffffff"
        };

        let mut elements = vec![ElementDraft {
            kind: ElementType::Heading,
            content: chapter.title.clone(),
            x: 50.0,
            y: 60.0,
            w: 500.0,
            h: 60.0,
            style: ElementStyle {
                font_size: Some(28.0),
                font_weight: Some("bold".to_string()),
                color: Some("#1e293b".to_string()),
                text_align: Some(TextAlign::Left),
                ..ElementStyle::default()
            },
        }];

        if !chapter.subsections.is_empty() {
            elements.push(ElementDraft {
                kind: ElementType::Paragraph,
                content: chapter.subsections.join(". "),
                x: 50.0,
                y: 140.0,
                w: 500.0,
                h: 120.0,
                style: ElementStyle {
                    font_size: Some(16.0),
                    color: Some("#334155".to_string()),
                    text_align: Some(TextAlign::Left),
                    ..ElementStyle::default()
                },
            });
        }

        if !chapter.key_points.is_empty() {
            elements.push(ElementDraft {
                kind: ElementType::List,
                content: chapter.key_points.join("\n"),
                x: 50.0,
                y: 280.0,
                w: 500.0,
                h: 160.0,
                style: ElementStyle {
                    font_size: Some(16.0),
                    color: Some("#334155".to_string()),
                    ..ElementStyle::default()
                },
            });
            elements.push(ElementDraft {
                kind: ElementType::Quote,
                content: chapter.key_points[0].clone(),
                x: 50.0,
                y: 470.0,
                w: 500.0,
                h: 80.0,
                style: ElementStyle {
                    font_size: Some(18.0),
                    color: Some("#4f46e5".to_string()),
                    ..ElementStyle::default()
                },
            });
        }

        Ok(PageLayout {
            background_color: Some(background_color.to_string()),
            elements,
        })
    }

    fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio) -> GenerationResult<String> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidInput("image prompt is empty".to_string()));
        }
        let (width, height) = match aspect_ratio {
            AspectRatio::Square => (800, 800),
            AspectRatio::Portrait => (720, 1280),
        };
        Ok(format!(
            "{PLACEHOLDER_IMAGE_BASE}/{}/{width}/{height}",
            slugify(prompt)
        ))
    }

    fn optimize_document(&self, document: &Document) -> GenerationResult<Document> {
        let mut optimized = document.clone();
        optimized.title = collapse_whitespace(&optimized.title);
        optimized.subtitle = collapse_whitespace(&optimized.subtitle);
        for element in optimized
            .pages
            .iter_mut()
            .flat_map(|page| page.elements.iter_mut())
            .filter(|element| element.kind != ElementType::Image)
        {
            element.content = collapse_whitespace(&element.content);
        }
        Ok(optimized)
    }
}
