//! Catalog commands: fetch and search the reference data set.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::info;

use chivescan_core::Catalog;

use crate::cli::CatalogAction;

pub fn run(action: CatalogAction) -> Result<()> {
    match action {
        CatalogAction::Fetch { output, url } => fetch(&output, &url),
        CatalogAction::Search {
            query,
            url,
            catalog_file,
            limit,
        } => search(&query, catalog_file.as_deref(), &url, limit),
    }
}

fn fetch(output: &Path, url: &str) -> Result<()> {
    let body = fetch_catalog_json(url)?;
    // Validate before writing so a server error page never lands on disk.
    let catalog = Catalog::from_json_str(&body)?;
    fs::write(output, &body)
        .with_context(|| format!("Failed to write catalog to {:?}", output))?;
    info!(
        "Saved {} achievement records to {}",
        catalog.len(),
        output.display()
    );
    Ok(())
}

fn search(query: &str, catalog_file: Option<&Path>, url: &str, limit: usize) -> Result<()> {
    let catalog = load_catalog(catalog_file, url)?;
    let matcher = SkimMatcherV2::default();

    // Score every record title against the query.
    let mut scored: Vec<(i64, u32, &str)> = catalog
        .records()
        .iter()
        .filter_map(|record| {
            matcher
                .fuzzy_match(&record.title, query)
                .map(|score| (score, record.id, &*record.title))
        })
        .collect();

    if scored.is_empty() {
        bail!("No achievements matching \"{}\"", query);
    }

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    for (score, id, title) in scored.iter().take(limit) {
        let description = catalog
            .get(*id)
            .map(|r| r.description.as_ref())
            .unwrap_or_default();
        println!("{:>6}  {} | {} (score {})", id, title, description, score);
    }
    Ok(())
}

/// Load the catalog from a local file or the published URL.
pub(crate) fn load_catalog(file: Option<&Path>, url: &str) -> Result<Catalog> {
    let body = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {:?}", path))?,
        None => fetch_catalog_json(url)?,
    };
    Ok(Catalog::from_json_str(&body)?)
}

fn fetch_catalog_json(url: &str) -> Result<String> {
    info!("Fetching achievement catalog from {}", url);
    let mut response = ureq::get(url)
        .call()
        .with_context(|| format!("Failed to fetch game data from {}", url))?;
    let body = response
        .body_mut()
        .read_to_string()
        .context("Failed to read catalog response body")?;
    Ok(body)
}
