use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};
use crate::pipeline::extract::ColorMap;
use crate::report::ItemReport;
use crate::theme::Mode;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid"));

/// Run metadata exposed to templates next to the colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    pub wallpaper_path: String,
    pub mode: Mode,
    pub source_color: String,
}

impl TemplateContext {
    fn get(&self, key: &str) -> Option<&str> {
        match key {
            "wallpaper_path" => Some(&self.wallpaper_path),
            "mode" => Some(self.mode.as_str()),
            "source_color" => Some(&self.source_color),
            _ => None,
        }
    }
}

/// Replace every `{{key}}` with its value. Unknown keys stay verbatim.
pub fn render(template: &str, colors: &ColorMap, ctx: &TemplateContext) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            colors
                .get(key)
                .or_else(|| ctx.get(key))
                .unwrap_or(&caps[0])
                .to_string()
        })
        .into_owned()
}

/// Render `source` into `output`, creating parent directories.
pub fn render_file(
    source: &Path,
    output: &Path,
    colors: &ColorMap,
    ctx: &TemplateContext,
) -> Result<PathBuf> {
    let template = fs::read_to_string(source).map_err(|e| Error::io(source, e))?;
    let rendered = render(&template, colors, ctx);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(output, rendered).map_err(|e| Error::io(output, e))?;
    Ok(output.to_path_buf())
}

/// A template found on disk and the file name it renders to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub source: PathBuf,
    pub output_name: String,
}

/// List templates in `dir` whose extension is one of `extensions`,
/// sorted by file name.
pub fn discover(dir: &Path, extensions: &[String]) -> Result<Vec<TemplateDescriptor>> {
    if !dir.is_dir() {
        return Err(Error::NotFound(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let stem = extensions.iter().find_map(|ext| {
            file_name
                .strip_suffix(ext.as_str())
                .and_then(|rest| rest.strip_suffix('.'))
                .filter(|stem| !stem.is_empty())
        });
        if let Some(stem) = stem {
            found.push(TemplateDescriptor {
                output_name: stem.to_string(),
                source: path,
            });
        }
    }
    found.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(found)
}

/// Output names claimed by more than one template. The later template in
/// discovery order overwrites the earlier one.
pub fn find_collisions(templates: &[TemplateDescriptor]) -> Vec<(String, Vec<PathBuf>)> {
    let mut by_output: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
    for template in templates {
        by_output
            .entry(template.output_name.as_str())
            .or_default()
            .push(template.source.clone());
    }
    by_output
        .into_iter()
        .filter(|(_, sources)| sources.len() > 1)
        .map(|(name, sources)| (name.to_string(), sources))
        .collect()
}

/// Render every discovered template into `output_dir`, one report per template.
pub fn apply_all(
    templates_dir: &Path,
    output_dir: &Path,
    extensions: &[String],
    colors: &ColorMap,
    ctx: &TemplateContext,
) -> Result<Vec<ItemReport>> {
    let templates = discover(templates_dir, extensions)?;
    for (output, sources) in find_collisions(&templates) {
        tracing::warn!(
            output = %output,
            sources = ?sources,
            "several templates render to the same file; the last one wins"
        );
    }

    let reports = templates
        .iter()
        .map(|template| {
            let output = output_dir.join(&template.output_name);
            let name = template
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ItemReport::new(name, render_file(&template.source, &output, colors, ctx))
        })
        .collect();
    Ok(reports)
}
