//! New command implementation

use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common::load_config;

/// Execute the new command
pub(crate) async fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let (up, down) = create_unit(
        &config.migrations.dir,
        &config.migrations.rollback_dir,
        &stamp,
        &args.description,
    )?;

    println!("Created {}", up.display());
    println!("Created {}", down.display());
    Ok(())
}

/// Write an empty migration `<stamp>_<slug>.sql` and its rollback file.
pub(crate) fn create_unit(
    dir: &Path,
    rollback_dir: &Path,
    stamp: &str,
    description: &str,
) -> Result<(PathBuf, PathBuf)> {
    let slug = slugify(description);
    if slug.is_empty() {
        bail!("Description '{description}' has no usable characters");
    }
    let file_name = format!("{stamp}_{slug}.sql");
    let up = dir.join(&file_name);
    let down = rollback_dir.join(&file_name);

    for path in [&up, &down] {
        if path.exists() {
            bail!("{} already exists", path.display());
        }
    }

    for path in [&up, &down] {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, "")
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok((up, down))
}

/// Lowercase, runs of non-alphanumerics become a single `_`.
pub(crate) fn slugify(description: &str) -> String {
    let mut slug = String::with_capacity(description.len());
    for c in description.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_end_matches('_').to_string()
}

#[cfg(test)]
#[path = "new_test.rs"]
mod tests;
