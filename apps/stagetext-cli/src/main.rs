use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use stagetext_bind::{ApplicationI18nExt, I18nAppOptions, I18nText, I18nTextOptions};
use stagetext_common::Locale;
use stagetext_i18n::{InitOptions, Localization, Resources};
use stagetext_scene::{Application, ApplicationOptions, DebugTextRenderer, Extensions, Renderer};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stagetext-cli", about = "CLI tool for stagetext localization")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Resolve a single key
    Translate {
        /// Resource file (.json, .yaml or .yml)
        #[arg(short, long)]
        resources: PathBuf,
        /// Translation key, optionally `ns:key`
        #[arg(short, long)]
        key: String,
        /// Locale to resolve for (defaults to the first fallback locale)
        #[arg(short, long)]
        locale: Option<Locale>,
        /// Fallback locales, in order
        #[arg(short, long, default_value = "en")]
        fallback: Vec<Locale>,
    },
    /// Build a stage of localized text nodes and render it once per locale
    Demo {
        /// Resource file (.json, .yaml or .yml)
        #[arg(short, long)]
        resources: PathBuf,
        /// Init options file; `--resources` is merged over its resources
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Keys to place on the stage, one text node each
        #[arg(short, long = "key", required = true)]
        keys: Vec<String>,
        /// Locales to switch through, in order
        #[arg(short, long = "locale", required = true)]
        locales: Vec<Locale>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("stagetext-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("i18n: {}", stagetext_i18n::crate_info());
            println!("scene: {}", stagetext_scene::crate_info());
            println!("bind: {}", stagetext_bind::crate_info());
        }
        Commands::Translate {
            resources,
            key,
            locale,
            fallback,
        } => {
            let resources = load_resources(&resources)?;
            let l10n = Localization::new();
            l10n.init(
                InitOptions::new()
                    .with_resources(resources)
                    .with_fallback(fallback)
                    .with_support_notice(false),
            )?;
            let locale = locale.unwrap_or_else(|| l10n.current_locale());
            match l10n.translate(&key, &locale) {
                Some(text) => println!("{text}"),
                None => anyhow::bail!("no translation for {key:?} in {locale}"),
            }
        }
        Commands::Demo {
            resources,
            config,
            keys,
            locales,
        } => run_demo(&resources, config.as_deref(), &keys, &locales)?,
    }

    Ok(())
}

fn load_resources(path: &Path) -> anyhow::Result<Resources> {
    Resources::from_path(path).with_context(|| format!("loading resources from {}", path.display()))
}

fn run_demo(
    resources: &Path,
    config: Option<&Path>,
    keys: &[String],
    locales: &[Locale],
) -> anyhow::Result<()> {
    let mut init = match config {
        Some(path) => InitOptions::from_path(path)
            .with_context(|| format!("loading init options from {}", path.display()))?,
        None => InitOptions::new(),
    };
    let mut merged = init.resources.take().unwrap_or_default();
    merged.extend(load_resources(resources)?);
    for locale in locales {
        if !merged.has_locale(locale) {
            tracing::warn!(%locale, "no resources for locale, lookups will fall back");
        }
    }
    init.resources = Some(merged);

    let mut extensions = Extensions::new();
    stagetext_bind::register(&mut extensions)?;

    let mut app = Application::new();
    app.init(
        &extensions,
        ApplicationOptions::new().with(I18nAppOptions::new(init)),
    )?;
    let l10n = app.i18n().context("i18n plugin did not attach an instance")?;

    let mut texts = Vec::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        let text = I18nText::new(
            I18nTextOptions::new(key.as_str(), Rc::clone(&l10n))
                .with_position(Vec2::new(0.0, i as f32 * 32.0)),
        )?;
        app.stage_mut().add_child(Rc::clone(text.node()));
        texts.push(text);
    }

    let renderer = DebugTextRenderer::new();
    println!("locale: {}", l10n.current_locale());
    print!("{}", renderer.render(app.stage()));

    for locale in locales {
        l10n.change_locale(locale.clone())?;
        tracing::info!(%locale, nodes = texts.len(), "locale switched");
        println!("locale: {locale}");
        print!("{}", renderer.render(app.stage()));
    }

    app.destroy();
    Ok(())
}
