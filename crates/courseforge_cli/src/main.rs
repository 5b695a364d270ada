//! CourseForge command-line front end.
//!
//! # Responsibility
//! - Map the project list, generation wizard and editor screens to
//!   subcommands over the SQLite project store.
//! - Use the offline template generator for every generation call.

use clap::{Args, Parser, Subcommand};
use courseforge_core::{
    init_logging_to, open_db, AppConfig, ConfigError, ContentLength, DbError, Document,
    EditorSession, ElementPatch, ElementType, ExportFormat, GenerationConfig, LogDestination, Point,
    PointerButton, ProjectService, SessionError, SqliteProjectStore, StoreError, StylePatch,
    TemplateGenerator, TextAlign, WizardError, WizardService,
};
use log::error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(String),
    Db(DbError),
    Store(StoreError),
    Wizard(WizardError),
    Session(SessionError),
    InvalidArgument(String),
    Output(std::io::Error),
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "logging setup failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Wizard(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::InvalidArgument(message) => write!(f, "{message}"),
            Self::Output(err) => write!(f, "failed to write output: {err}"),
            Self::Json(err) => write!(f, "failed to render JSON: {err}"),
        }
    }
}

macro_rules! impl_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(impl From<$source> for CliError {
            fn from(value: $source) -> Self {
                Self::$variant(value)
            }
        })*
    };
}

impl_from! {
    ConfigError => Config,
    DbError => Db,
    StoreError => Store,
    WizardError => Wizard,
    SessionError => Session,
    std::io::Error => Output,
    serde_json::Error => Json,
}

#[derive(Parser, Debug)]
#[command(name = "courseforge", version, about = "Generate and edit ebooks")]
struct Cli {
    /// SQLite file holding the project collection.
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for log files; logs go to stderr when unset.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[arg(long, global = true)]
    author: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored projects.
    List,
    /// Generate a new project.
    Create(CreateArgs),
    /// Print a project as JSON.
    Show { project_id: String },
    /// Edit a project.
    Edit(EditCommand),
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    topic: String,

    #[arg(long, default_value = "")]
    audience: String,

    #[arg(long, default_value = "Professional")]
    tone: String,

    /// short | medium | long
    #[arg(long, default_value = "medium")]
    length: String,

    #[arg(long, default_value = "Modern")]
    style: String,
}

#[derive(Args, Debug)]
struct EditCommand {
    project_id: String,

    /// Active page index the edit applies to.
    #[arg(long, default_value_t = 0)]
    page: usize,

    #[command(subcommand)]
    action: EditAction,
}

#[derive(Subcommand, Debug)]
enum EditAction {
    AddElement {
        /// title | heading | paragraph | image | quote | list | shape
        #[arg(long = "type")]
        kind: String,
        #[arg(long)]
        content: Option<String>,
    },
    /// Drag an element so its top-left lands on (x, y).
    Move {
        element_id: String,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },
    /// Change selected fields of an element; unset flags keep their value.
    Update(UpdateArgs),
    DeleteElement {
        element_id: String,
    },
    SetBackground {
        color: String,
    },
    AddPage,
    Cover,
    Image {
        #[arg(long)]
        prompt: String,
    },
    Optimize,
    Export {
        /// pdf | epub | docx
        #[arg(long, default_value = "pdf")]
        format: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct UpdateArgs {
    element_id: String,

    #[arg(long)]
    content: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    x: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    y: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    w: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    h: Option<f64>,

    #[arg(long)]
    font_size: Option<f64>,
    #[arg(long)]
    font_weight: Option<String>,
    /// left | center | right
    #[arg(long)]
    align: Option<String>,
    #[arg(long)]
    color: Option<String>,
    #[arg(long)]
    background_color: Option<String>,
}

impl UpdateArgs {
    fn to_patch(&self) -> Result<ElementPatch, CliError> {
        let text_align = self
            .align
            .as_deref()
            .map(|raw| {
                TextAlign::parse(raw).ok_or_else(|| {
                    CliError::InvalidArgument(format!(
                        "unknown alignment `{raw}`; expected left|center|right"
                    ))
                })
            })
            .transpose()?;
        let style = StylePatch {
            font_size: self.font_size,
            font_weight: self.font_weight.clone(),
            color: self.color.clone(),
            text_align,
            background_color: self.background_color.clone(),
            ..StylePatch::default()
        };
        let patch = ElementPatch {
            content: self.content.clone(),
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
            style: (style != StylePatch::default()).then_some(style),
            ..ElementPatch::default()
        };
        if patch == ElementPatch::default() {
            return Err(CliError::InvalidArgument(
                "update needs at least one field to change".to_string(),
            ));
        }
        Ok(patch)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(&cli)?;
    init_logging_to(config.log_level, config.log_destination.clone()).map_err(CliError::Logging)?;

    let conn = open_db(&config.db_path)?;
    let store = SqliteProjectStore::try_new(&conn)?;

    match cli.command.unwrap_or(Command::List) {
        Command::List => run_list(&store),
        Command::Create(args) => run_create(&store, &config, args),
        Command::Show { project_id } => run_show(&store, &project_id),
        Command::Edit(edit) => run_edit(&store, edit),
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = &cli.db_path {
        config.db_path = path.clone();
    }
    // Flags go through the same lookup so they get the same validation.
    let flags = AppConfig::from_lookup(|key| match key {
        courseforge_core::config::LOG_LEVEL_ENV => cli.log_level.clone(),
        courseforge_core::config::LOG_DIR_ENV => cli.log_dir.clone(),
        _ => None,
    })?;
    if cli.log_level.is_some() {
        config.log_level = flags.log_level;
    }
    if let LogDestination::Directory(_) = flags.log_destination {
        config.log_destination = flags.log_destination;
    }
    if let Some(author) = cli.author.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        config.author = author.to_string();
    }
    Ok(config)
}

fn run_list(store: &SqliteProjectStore<'_>) -> Result<(), CliError> {
    let projects = ProjectService::new(store).list_projects()?;
    println!("{} project(s)", projects.len());
    for project in &projects {
        println!(
            "{}\t{}\t{} page(s)\t{}\t{}",
            project.id,
            project.title,
            project.page_count,
            project.status.as_str(),
            project.created_at
        );
    }
    Ok(())
}

fn run_create(
    store: &SqliteProjectStore<'_>,
    config: &AppConfig,
    args: CreateArgs,
) -> Result<(), CliError> {
    let length = ContentLength::parse(&args.length).ok_or_else(|| {
        CliError::InvalidArgument(format!(
            "unknown length `{}`; expected short|medium|long",
            args.length
        ))
    })?;
    let generation = GenerationConfig {
        topic: args.topic,
        audience: args.audience,
        tone: args.tone,
        length,
        style: args.style,
    };

    let wizard =
        WizardService::new(TemplateGenerator, store).with_author(config.author.clone());
    let document = wizard.create_project(&generation)?;
    println!(
        "created {} \"{}\" with {} page(s)",
        document.id,
        document.title,
        document.pages.len()
    );
    Ok(())
}

fn run_show(store: &SqliteProjectStore<'_>, project_id: &str) -> Result<(), CliError> {
    let document = ProjectService::new(store)
        .get_project(project_id)?
        .ok_or_else(|| SessionError::ProjectNotFound(project_id.to_string()))?;
    print_document(&document)
}

fn run_edit(store: &SqliteProjectStore<'_>, edit: EditCommand) -> Result<(), CliError> {
    let mut session = EditorSession::open(store, &edit.project_id)?;
    session.select_page(edit.page)?;

    match edit.action {
        EditAction::AddElement { kind, content } => {
            let kind = ElementType::parse(&kind).ok_or_else(|| {
                CliError::InvalidArgument(format!("unknown element type `{kind}`"))
            })?;
            let id = session.add_element(kind, content)?;
            println!("added {id} to page {}", session.active_page_index());
        }
        EditAction::Move { element_id, x, y } => {
            let origin = session
                .active_page()
                .element(&element_id)
                .map(|element| Point::new(element.x, element.y))
                .unwrap_or_default();
            session.pointer_down(&element_id, origin, PointerButton::Primary)?;
            session.pointer_move(Point::new(x, y))?;
            session.pointer_up()?;
            println!("moved {element_id} to ({x}, {y})");
        }
        EditAction::Update(args) => {
            let patch = args.to_patch()?;
            session.update_element(&args.element_id, &patch)?;
            println!("updated {}", args.element_id);
        }
        EditAction::DeleteElement { element_id } => {
            session.delete_element(&element_id)?;
            println!("deleted {element_id}");
        }
        EditAction::SetBackground { color } => {
            session.set_page_background(&color)?;
            println!("page {} background set to {color}", session.active_page_index());
        }
        EditAction::AddPage => {
            let index = session.add_page()?;
            println!("added page {index}");
        }
        EditAction::Cover => {
            let id = session.generate_cover(&TemplateGenerator)?;
            println!("cover image {id} placed on page 0");
        }
        EditAction::Image { prompt } => {
            let id = session.generate_image(&TemplateGenerator, &prompt)?;
            println!("added image {id} to page {}", session.active_page_index());
        }
        EditAction::Optimize => {
            session.optimize(&TemplateGenerator)?;
            println!("optimized {}", session.document().id);
        }
        EditAction::Export { format, out_dir } => {
            let format = ExportFormat::parse(&format).ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "unknown export format `{format}`; expected pdf|epub|docx"
                ))
            })?;
            let artifact = session.export(format)?;
            std::fs::create_dir_all(&out_dir)?;
            let path = out_dir.join(&artifact.file_name);
            std::fs::write(&path, &artifact.payload)?;
            println!(
                "exported {} page(s), {} element(s) to {}",
                artifact.page_count,
                artifact.element_count,
                path.display()
            );
        }
    }
    Ok(())
}

fn print_document(document: &Document) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(document)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, CliError, Command, EditAction, UpdateArgs};
    use courseforge_core::TextAlign;
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_list() {
        let cli = Cli::parse_from(["courseforge"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn move_accepts_negative_coordinates() {
        let cli = Cli::parse_from([
            "courseforge", "edit", "project_1", "--page", "1", "move", "el_1", "--x", "-5", "--y",
            "12.5",
        ]);
        let Some(Command::Edit(edit)) = cli.command else {
            panic!("expected edit command");
        };
        assert_eq!(edit.page, 1);
        match edit.action {
            EditAction::Move { element_id, x, y } => {
                assert_eq!(element_id, "el_1");
                assert_eq!(x, -5.0);
                assert_eq!(y, 12.5);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn update_builds_a_merge_patch() {
        let cli = Cli::parse_from([
            "courseforge", "edit", "project_1", "update", "el_1", "--x", "-20", "--h", "64",
            "--align", "Center", "--color", "#112233",
        ]);
        let Some(Command::Edit(edit)) = cli.command else {
            panic!("expected edit command");
        };
        let EditAction::Update(args) = edit.action else {
            panic!("expected update action");
        };
        assert_eq!(args.element_id, "el_1");

        let patch = args.to_patch().unwrap();
        assert_eq!(patch.x, Some(-20.0));
        assert_eq!(patch.h, Some(64.0));
        assert_eq!(patch.y, None);
        assert_eq!(patch.content, None);
        let style = patch.style.unwrap();
        assert_eq!(style.text_align, Some(TextAlign::Center));
        assert_eq!(style.color.as_deref(), Some("#112233"));
        assert_eq!(style.font_size, None);
    }

    #[test]
    fn update_without_style_flags_leaves_style_alone() {
        let args = UpdateArgs {
            element_id: "el_1".to_string(),
            content: Some("New text".to_string()),
            ..UpdateArgs::default()
        };
        let patch = args.to_patch().unwrap();
        assert_eq!(patch.content.as_deref(), Some("New text"));
        assert!(patch.style.is_none());
    }

    #[test]
    fn update_rejects_empty_patch_and_unknown_alignment() {
        let empty = UpdateArgs {
            element_id: "el_1".to_string(),
            ..UpdateArgs::default()
        };
        assert!(matches!(empty.to_patch(), Err(CliError::InvalidArgument(_))));

        let bad_align = UpdateArgs {
            element_id: "el_1".to_string(),
            align: Some("justify".to_string()),
            ..UpdateArgs::default()
        };
        assert!(matches!(bad_align.to_patch(), Err(CliError::InvalidArgument(_))));
    }
}
