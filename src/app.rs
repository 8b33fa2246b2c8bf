//! Orchestrates one run: analysis, generation, export, templates, deployment
//! and the optional system actions.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::RunConfig;
use crate::error::Error;
use crate::output::deploy::{self, DeployConfig, DEPLOY_FILE};
use crate::output::export::{self, SchemeExport};
use crate::output::preview;
use crate::output::template::{self, TemplateContext};
use crate::pipeline::detect::{self, Analysis};
use crate::pipeline::extract::{self, ColorMap};
use crate::pipeline::generate::ThemeGenerator;
use crate::report::{ItemReport, Outcome};
use crate::system::{self, CommandRunner};
use crate::theme::{Mode, Theme, Variant};

/// Wallpaper plus whatever has been generated from it so far.
#[derive(Debug, Clone)]
pub struct Session {
    wallpaper: PathBuf,
    variant: Variant,
    generated: Option<(Theme, Mode)>,
}

impl Session {
    pub fn new(wallpaper: impl Into<PathBuf>, variant: Variant) -> Self {
        Self {
            wallpaper: wallpaper.into(),
            variant,
            generated: None,
        }
    }

    pub fn wallpaper(&self) -> &Path {
        &self.wallpaper
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Decode the wallpaper and measure its brightness.
    pub fn analyze(&self, threshold: u8) -> crate::Result<Analysis> {
        let image = extract::load_wallpaper(&self.wallpaper)?;
        Ok(detect::analyze(&image, threshold))
    }

    /// Generate the theme and return the colors for `mode`.
    pub fn generate(
        &mut self,
        generator: &dyn ThemeGenerator,
        mode: Mode,
    ) -> crate::Result<ColorMap> {
        let theme = generator.generate(&self.wallpaper, self.variant)?;
        self.generated = Some((theme, mode));
        self.colors()
    }

    pub fn colors(&self) -> crate::Result<ColorMap> {
        let (theme, mode) = self.theme()?;
        Ok(extract::extract(theme, mode))
    }

    pub fn mode(&self) -> crate::Result<Mode> {
        self.theme().map(|(_, mode)| mode)
    }

    pub fn source_color(&self) -> crate::Result<String> {
        self.theme().map(|(theme, _)| theme.source.to_hex())
    }

    pub fn template_context(&self) -> crate::Result<TemplateContext> {
        let (theme, mode) = self.theme()?;
        Ok(TemplateContext {
            wallpaper_path: self.wallpaper.display().to_string(),
            mode,
            source_color: theme.source.to_hex(),
        })
    }

    fn theme(&self) -> crate::Result<(&Theme, Mode)> {
        self.generated
            .as_ref()
            .map(|(theme, mode)| (theme, *mode))
            .ok_or(Error::State("generate the scheme first"))
    }
}

/// Per-run inputs that do not come from the config file.
#[derive(Debug, Clone)]
pub struct Request {
    pub wallpaper: PathBuf,
    /// Explicit JSON export path; defaults to `<output_dir>/<stem>_<VARIANT>_scheme.json`.
    pub json_output: Option<PathBuf>,
}

/// Everything a run produced, stage by stage.
#[derive(Debug)]
pub struct RunSummary {
    pub analysis: Option<Analysis>,
    pub mode: Mode,
    pub variant: Variant,
    pub colors: ColorMap,
    pub export: PathBuf,
    pub export_mirror: PathBuf,
    pub templates: Vec<ItemReport>,
    pub deployments: Vec<ItemReport>,
    pub actions: Vec<ItemReport>,
}

impl RunSummary {
    pub fn failures(&self) -> usize {
        self.templates
            .iter()
            .chain(&self.deployments)
            .chain(&self.actions)
            .filter(|r| r.outcome.is_failed())
            .count()
    }
}

fn print_reports(out: &mut impl Write, reports: &[ItemReport]) -> io::Result<()> {
    for report in reports {
        writeln!(out, "{report}")?;
    }
    Ok(())
}

/// Run the full pipeline. Errors from analysis, generation and the JSON export
/// abort the run; later stages only report.
pub fn run(
    config: &RunConfig,
    request: &Request,
    generator: &dyn ThemeGenerator,
    out: &mut impl Write,
) -> Result<RunSummary> {
    let mut session = Session::new(&request.wallpaper, config.variant);

    let (analysis, mode) = match config.mode.forced() {
        Some(mode) => (None, mode),
        None => {
            writeln!(out, "Analyzing wallpaper...")?;
            let analysis = session
                .analyze(config.brightness_threshold)
                .with_context(|| format!("failed to analyze {}", request.wallpaper.display()))?;
            writeln!(
                out,
                "  Brightness: {:.1} (threshold: {})",
                analysis.brightness, config.brightness_threshold
            )?;
            writeln!(out, "  Auto-detected mode: {}", analysis.mode)?;
            (Some(analysis), analysis.mode)
        }
    };

    writeln!(out, "\nGenerating {mode} scheme with {} variant...", config.variant)?;
    let colors = session
        .generate(generator, mode)
        .context("theme generation failed")?;
    writeln!(out, "  Generated {} colors", colors.len())?;

    let source_color = session.source_color()?;
    let ctx = session.template_context()?;

    let file_name = export::export_file_name(&request.wallpaper, config.variant);
    let primary = request
        .json_output
        .clone()
        .unwrap_or_else(|| config.paths.output_dir.join(&file_name));
    let wallpaper_str = request.wallpaper.display().to_string();
    let snapshot = SchemeExport {
        wallpaper: &wallpaper_str,
        mode,
        variant: config.variant,
        source_color: &source_color,
        colors: &colors,
    };
    let mirror = config.paths.config_dir.join("output").join(&file_name);
    let (export_path, export_mirror) = export::write_export(&snapshot, &primary, &mirror)
        .context("failed to export scheme JSON")?;
    writeln!(out, "\nExported to: {}", export_path.display())?;
    writeln!(out, "Also saved to: {}", export_mirror.display())?;

    writeln!(out, "\nApplying colors to templates...")?;
    let templates = match template::apply_all(
        &config.paths.templates_dir,
        &config.paths.cache_dir,
        &config.template_extensions,
        &colors,
        &ctx,
    ) {
        Ok(reports) => reports,
        Err(err) => vec![ItemReport::new(
            config.paths.templates_dir.display().to_string(),
            Outcome::from_error(err),
        )],
    };
    print_reports(out, &templates)?;

    writeln!(out, "\nDeploying configs...")?;
    let mapping_path = config.paths.config_dir.join(DEPLOY_FILE);
    let deployments = match DeployConfig::load_or_create(&mapping_path) {
        Ok(mapping) => deploy::deploy(&mapping.deployments, &config.paths.cache_dir),
        Err(err) => vec![ItemReport::new(DEPLOY_FILE, Outcome::from_error(err))],
    };
    print_reports(out, &deployments)?;

    let actions = run_actions(config, &session, &colors, out)?;

    let summary = RunSummary {
        analysis,
        mode,
        variant: config.variant,
        colors,
        export: export_path,
        export_mirror,
        templates,
        deployments,
        actions,
    };
    tracing::info!(failures = summary.failures(), "run finished");
    Ok(summary)
}

fn run_actions(
    config: &RunConfig,
    session: &Session,
    colors: &ColorMap,
    out: &mut impl Write,
) -> Result<Vec<ItemReport>> {
    let runner = CommandRunner::new(config.command_timeout);
    let features = config.features;
    let mut actions = Vec::new();
    let mut record = |out: &mut dyn Write, report: ItemReport| -> io::Result<()> {
        writeln!(out, "{report}")?;
        actions.push(report);
        Ok(())
    };

    if features.apply_xresources {
        writeln!(out, "\nApplying Xresources...")?;
        let result =
            system::apply_xresources(&runner, &config.commands.xresources, &config.paths.cache_dir);
        record(out, ItemReport::new("xresources", result))?;
    }

    if features.set_wallpaper {
        writeln!(out, "\nSetting wallpaper...")?;
        let result = system::set_wallpaper(&runner, &config.commands.wallpaper, session.wallpaper());
        record(out, ItemReport::new("wallpaper", result))?;
    }

    if features.create_symlink {
        writeln!(out, "\nCreating wallpaper symlink...")?;
        let result = system::link_wallpaper(&config.paths.config_dir, session.wallpaper());
        record(out, ItemReport::new("symlink", result))?;
    }

    if features.run_post_script {
        writeln!(out, "\nRunning post script...")?;
        let result = system::run_post_script(&runner, &config.commands.shell, &config.post_script);
        record(out, ItemReport::new("post-script", result))?;
    }

    if features.print_colors {
        let styled = io::stdout().is_terminal();
        preview::print_colors(out, colors, session.mode()?, &session.source_color()?, styled)?;
    }

    if features.generate_palette_preview {
        writeln!(out, "\nGenerating palette preview...")?;
        let path = config
            .paths
            .config_dir
            .join("sample")
            .join(preview::preview_file_name(session.wallpaper(), session.variant()));
        let result = preview::save_preview(colors, &path);
        record(out, ItemReport::new("palette preview", result))?;
    }

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{Scheme, SchemeColor};

    struct FixedGenerator;

    impl ThemeGenerator for FixedGenerator {
        fn generate(&self, _wallpaper: &Path, _variant: Variant) -> crate::Result<Theme> {
            Ok(Theme {
                source: SchemeColor::Argb(0xff6750a4),
                light: Scheme::from_fn(|_| SchemeColor::Argb(0xffeeeeee)),
                dark: Scheme::from_fn(|_| SchemeColor::Argb(0xff111111)),
            })
        }
    }

    #[test]
    fn colors_before_generate_is_state_error() {
        let session = Session::new("/w/wall.png", Variant::Content);
        assert!(matches!(session.colors(), Err(Error::State(_))));
        assert!(matches!(session.template_context(), Err(Error::State(_))));
        assert!(matches!(session.source_color(), Err(Error::State(_))));
    }

    #[test]
    fn generate_uses_requested_mode() {
        let mut session = Session::new("/w/wall.png", Variant::Content);
        let colors = session.generate(&FixedGenerator, Mode::Light).unwrap();
        assert_eq!(colors.material.primary, "#eeeeee");
        assert_eq!(session.mode().unwrap(), Mode::Light);

        let ctx = session.template_context().unwrap();
        assert_eq!(ctx.wallpaper_path, "/w/wall.png");
        assert_eq!(ctx.source_color, "#6750a4");
    }

    #[test]
    fn colors_are_fresh_each_call() {
        let mut session = Session::new("/w/wall.png", Variant::Content);
        session.generate(&FixedGenerator, Mode::Dark).unwrap();
        assert_eq!(session.colors().unwrap(), session.colors().unwrap());
    }

    #[test]
    fn analyze_missing_wallpaper_fails() {
        let session = Session::new("/nonexistent/wall.png", Variant::Content);
        assert!(matches!(session.analyze(128), Err(Error::NotFound(_))));
    }
}
