mod support;

use courseforge_core::service::wizard_service::MAX_GENERATED_CHAPTER_PAGES;
use courseforge_core::{
    ContentLength, DocumentStatus, ElementType, GenerationConfig, GenerationError,
    InMemoryProjectStore, ProjectStore, TemplateGenerator, WizardError, WizardService,
};
use support::ScriptedGenerator;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

fn react_config() -> GenerationConfig {
    GenerationConfig {
        topic: "Master React in 30 Days".to_string(),
        audience: "Busy Engineers".to_string(),
        tone: "Professional".to_string(),
        length: ContentLength::Medium,
        style: "Modern".to_string(),
    }
}

#[test]
fn wizard_builds_cover_plus_capped_chapter_pages() {
    for chapters in [1, 2, 5] {
        let store = InMemoryProjectStore::new();
        let generator = ScriptedGenerator::with_chapters(chapters);
        let wizard = WizardService::new(&generator, &store);

        let doc = wizard.create_project(&react_config()).unwrap();

        assert_eq!(
            doc.pages.len(),
            1 + chapters.min(MAX_GENERATED_CHAPTER_PAGES),
            "chapters={chapters}"
        );
        let cover = &doc.pages[0];
        let titles: Vec<&str> = cover
            .elements
            .iter()
            .filter(|e| e.kind == ElementType::Title)
            .map(|e| e.content.as_str())
            .collect();
        let headings: Vec<&str> = cover
            .elements
            .iter()
            .filter(|e| e.kind == ElementType::Heading)
            .map(|e| e.content.as_str())
            .collect();
        assert_eq!(titles, vec!["Master React in 30 Days"]);
        assert_eq!(headings, vec!["For Busy Engineers"]);
    }
}

#[test]
fn wizard_requests_layouts_with_one_based_page_numbers() {
    let store = InMemoryProjectStore::new();
    let generator = ScriptedGenerator::with_chapters(4);
    let doc = WizardService::new(&generator, &store)
        .create_project(&react_config())
        .unwrap();

    assert_eq!(*generator.layout_pages.borrow(), vec![1, 2]);
    assert_eq!(doc.pages[1].id, "page_1");
    assert_eq!(doc.pages[1].background_color, "#f8fafc");
    assert_eq!(doc.pages[1].elements[0].id, "el_1_0");
    assert_eq!(doc.pages[1].elements[0].content, "Chapter 1");
    assert_eq!(doc.pages[2].elements[1].id, "el_2_1");
}

#[test]
fn wizard_stores_draft_with_metadata() {
    let store = InMemoryProjectStore::new();
    let generator = ScriptedGenerator::with_chapters(2);
    let doc = WizardService::new(&generator, &store)
        .with_author("Ada")
        .create_project(&react_config())
        .unwrap();

    assert!(doc.id.starts_with("project_"));
    assert_eq!(doc.author, "Ada");
    assert_eq!(doc.status, DocumentStatus::Draft);
    assert_eq!(doc.title, "Master React in 30 Days");
    assert!(OffsetDateTime::parse(&doc.created_at, &Rfc3339).is_ok());

    assert_eq!(store.write_count(), 1);
    assert_eq!(store.load_all().unwrap(), vec![doc]);
}

#[test]
fn zero_chapters_yield_cover_only_document() {
    let store = InMemoryProjectStore::new();
    let generator = ScriptedGenerator::with_chapters(0);
    let doc = WizardService::new(&generator, &store)
        .create_project(&react_config())
        .unwrap();

    assert_eq!(doc.pages.len(), 1);
    assert!(generator.layout_pages.borrow().is_empty());
}

#[test]
fn blank_topic_is_rejected_before_any_call() {
    let store = InMemoryProjectStore::new();
    let generator = ScriptedGenerator::with_chapters(3);
    let mut config = react_config();
    config.topic = "  ".to_string();

    let err = WizardService::new(&generator, &store)
        .create_project(&config)
        .unwrap_err();
    assert!(matches!(
        err,
        WizardError::Generation(GenerationError::InvalidInput(_))
    ));
    assert_eq!(generator.calls.get(), 0);
    assert_eq!(store.write_count(), 0);
}

#[test]
fn layout_failure_commits_nothing() {
    let store = InMemoryProjectStore::new();
    let mut generator = ScriptedGenerator::with_chapters(3);
    generator.fail_layout_at = Some(2);

    let err = WizardService::new(&generator, &store)
        .create_project(&react_config())
        .unwrap_err();
    assert!(matches!(err, WizardError::Generation(GenerationError::Request(_))));
    assert_eq!(store.write_count(), 0);
    assert!(store.load_all().unwrap().is_empty());
}

#[test]
fn template_generator_drives_full_wizard() {
    let store = InMemoryProjectStore::new();
    let mut config = GenerationConfig::new("Sourdough Baking");
    config.length = ContentLength::Short;

    let doc = WizardService::new(TemplateGenerator, &store)
        .create_project(&config)
        .unwrap();

    assert_eq!(doc.pages.len(), 3);
    assert!(doc.validate().is_ok());
    assert_eq!(doc.pages[0].elements[0].content, "Sourdough Baking");
    assert_eq!(doc.pages[1].elements[0].kind, ElementType::Heading);
    assert_eq!(store.load_all().unwrap().len(), 1);
}
