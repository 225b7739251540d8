use std::{fs, path::PathBuf};

use anyhow::{Context, Result, anyhow, ensure};
use boss_card::{
    BossStatus, CardRenderer, FontGlyphs, RenderConfig, load_render_config, render_report,
    write_png,
};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};

#[derive(Parser, Debug)]
#[command(about = "Render boss status cards into a stacked PNG report", version)]
struct Args {
    /// JSON array of boss statuses to render, one card each
    #[arg(long)]
    status: PathBuf,

    /// Destination PNG
    #[arg(long, default_value = "report.png")]
    output: PathBuf,

    /// Optional render preset JSON (font, asset directories, templates, seed)
    #[arg(long)]
    config: Option<PathBuf>,

    /// TTF/OTF font used for every label; overrides the preset
    #[arg(long)]
    font: Option<PathBuf>,

    /// Directory holding cached avatars named {user id}.{extension}
    #[arg(long)]
    avatar_dir: Option<PathBuf>,

    /// Directory holding boss icons named {icon id}.{extension}
    #[arg(long)]
    icon_dir: Option<PathBuf>,

    /// Seed for chip and container tints; omit for a random palette
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn resolve_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => load_render_config(path)?,
            None => RenderConfig::default(),
        };
        if let Some(font) = &self.font {
            config.font = Some(font.clone());
        }
        if let Some(dir) = &self.avatar_dir {
            config.avatar_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.icon_dir {
            config.icon_dir = Some(dir.clone());
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::init();

    let config = args.resolve_config()?;
    let font_path = config
        .font
        .as_deref()
        .ok_or_else(|| anyhow!("no font configured; pass --font or set \"font\" in the preset"))?;
    let glyphs = FontGlyphs::open(font_path)
        .with_context(|| format!("loading font {}", font_path.display()))?;

    let data = fs::read_to_string(&args.status)
        .with_context(|| format!("reading statuses {}", args.status.display()))?;
    let statuses: Vec<BossStatus> = serde_json::from_str(&data)
        .with_context(|| format!("parsing statuses {}", args.status.display()))?;
    ensure!(
        !statuses.is_empty(),
        "{} lists no boss statuses",
        args.status.display()
    );

    let icons = config.icon_store();
    let avatars = config.avatar_store();
    let renderer = CardRenderer::new(&glyphs, &icons, &avatars)
        .with_templates(config.tag_template(), config.empty_template());

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let report = render_report(&renderer, &statuses, &mut rng).context("rendering report")?;
    ensure!(!report.is_empty(), "report has no height; nothing to write");

    write_png(&report, &args.output)
        .with_context(|| format!("writing report to {}", args.output.display()))?;
    println!(
        "[render_report] wrote {} cards ({}x{}) to {}",
        statuses.len(),
        report.width(),
        report.height(),
        args.output.display()
    );
    Ok(())
}
