#![allow(dead_code)]

use courseforge_core::model::outline::ElementDraft;
use courseforge_core::{
    AspectRatio, Chapter, DbError, Document, DocumentStatus, Element, ElementStyle, ElementType,
    GenerationAdapter, GenerationConfig, GenerationError, GenerationResult, InMemoryProjectStore,
    Outline, Page, PageLayout, ProjectStore, StoreError, StoreResult,
};
use std::cell::{Cell, RefCell};

/// Generation adapter fake with canned answers and call recording.
pub struct ScriptedGenerator {
    pub chapter_titles: Vec<String>,
    pub fail_layout_at: Option<usize>,
    pub fail_images: bool,
    pub optimized: Option<Document>,
    pub calls: Cell<usize>,
    pub layout_pages: RefCell<Vec<usize>>,
    pub image_requests: RefCell<Vec<(String, AspectRatio)>>,
}

impl ScriptedGenerator {
    pub fn with_chapters(count: usize) -> Self {
        Self {
            chapter_titles: (1..=count).map(|n| format!("Chapter {n}")).collect(),
            fail_layout_at: None,
            fail_images: false,
            optimized: None,
            calls: Cell::new(0),
            layout_pages: RefCell::new(Vec::new()),
            image_requests: RefCell::new(Vec::new()),
        }
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl GenerationAdapter for ScriptedGenerator {
    fn generate_outline(&self, config: &GenerationConfig) -> GenerationResult<Outline> {
        self.tick();
        Ok(Outline {
            title: config.topic.clone(),
            subtitle: format!("For {}", config.audience),
            chapters: self
                .chapter_titles
                .iter()
                .map(|title| Chapter {
                    title: title.clone(),
                    subsections: vec!["Basics".to_string()],
                    key_points: vec!["Remember this".to_string()],
                })
                .collect(),
        })
    }

    fn generate_page_layout(
        &self,
        chapter: &Chapter,
        page_number: usize,
    ) -> GenerationResult<PageLayout> {
        self.tick();
        self.layout_pages.borrow_mut().push(page_number);
        if self.fail_layout_at == Some(page_number) {
            return Err(GenerationError::Request("layout service down".to_string()));
        }
        Ok(PageLayout {
            background_color: Some("#f8fafc".to_string()),
            elements: vec![
                ElementDraft {
                    kind: ElementType::Heading,
                    content: chapter.title.clone(),
                    x: 50.0,
                    y: 40.0,
                    w: 400.0,
                    h: 60.0,
                    style: ElementStyle::default(),
                },
                ElementDraft {
                    kind: ElementType::Paragraph,
                    content: "Body".to_string(),
                    x: 50.0,
                    y: 120.0,
                    w: 400.0,
                    h: 200.0,
                    style: ElementStyle::default(),
                },
            ],
        })
    }

    fn generate_image(&self, prompt: &str, aspect_ratio: AspectRatio) -> GenerationResult<String> {
        self.tick();
        self.image_requests
            .borrow_mut()
            .push((prompt.to_string(), aspect_ratio));
        if self.fail_images {
            return Err(GenerationError::Request("image service down".to_string()));
        }
        Ok(format!(
            "https://images.test/{}/{}.png",
            aspect_ratio.as_str().replace(':', "x"),
            self.calls.get()
        ))
    }

    fn optimize_document(&self, document: &Document) -> GenerationResult<Document> {
        self.tick();
        Ok(self.optimized.clone().unwrap_or_else(|| {
            let mut optimized = document.clone();
            optimized.title = format!("{} (Revised)", document.title);
            optimized
        }))
    }
}

/// Two-page document: cover with `el_title`, page 1 with `el_1` and `el_2`.
pub fn sample_document(id: &str) -> Document {
    let mut cover = Page::blank("page_0");
    cover.elements = vec![Element::new("el_title", ElementType::Title, "Sample")
        .at(50.0, 100.0)
        .sized(400.0, 80.0)];
    let mut body = Page::blank("page_1");
    body.elements = vec![
        Element::new("el_1", ElementType::Heading, "Intro")
            .at(100.0, 100.0)
            .sized(200.0, 50.0),
        Element::new("el_2", ElementType::Paragraph, "Text")
            .at(100.0, 200.0)
            .sized(200.0, 120.0),
    ];

    Document {
        id: id.to_string(),
        title: "Sample".to_string(),
        subtitle: "A subtitle".to_string(),
        author: "Me".to_string(),
        pages: vec![cover, body],
        created_at: "2026-01-01T00:00:00Z".to_string(),
        status: DocumentStatus::Draft,
    }
}

/// In-memory store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryProjectStore,
    pub fail_writes: Cell<bool>,
}

impl ProjectStore for FlakyStore {
    fn load_all(&self) -> StoreResult<Vec<Document>> {
        self.inner.load_all()
    }

    fn save_all(&self, documents: &[Document]) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Db(DbError::Io(std::io::Error::other("disk full"))));
        }
        self.inner.save_all(documents)
    }
}
