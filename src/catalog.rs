use crate::app::ports::CatalogPort;
use crate::constants::normalize_key;
use crate::error::{CatalogError, Result};
use crate::types::{Category, FetchJob, ReferenceItem};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Lists every reference item of one category.
///
/// Starts at `<base>/<category>?limit=<limit>` and keeps following `next`
/// links until the catalog reports none, so a server-side page cap does not
/// truncate the listing. A `next` link back to a page already listed is an
/// error rather than an endless loop.
#[instrument(skip(port))]
pub async fn list_category(
    port: &dyn CatalogPort,
    base_url: &str,
    category: Category,
    limit: u32,
) -> Result<Vec<ReferenceItem>> {
    let mut url = Some(format!(
        "{}/{}?limit={}",
        base_url.trim_end_matches('/'),
        category.endpoint(),
        limit
    ));
    let mut items = Vec::new();
    let mut visited = HashSet::new();

    while let Some(page_url) = url.take() {
        if !visited.insert(page_url.clone()) {
            return Err(CatalogError::MissingField(format!(
                "next link loops back to {page_url}"
            )));
        }
        let page = port.get_json(&page_url).await?;
        let results = page
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| CatalogError::MissingField(format!("results not found in {page_url}")))?;
        for entry in results {
            items.push(reference_item(entry, &page_url)?);
        }
        url = page.get("next").and_then(Value::as_str).map(str::to_string);
        if url.is_some() {
            debug!(pages = visited.len(), listed = items.len(), "following next page");
        }
    }

    info!("Listed {} {} items in {} page(s)", items.len(), category, visited.len());
    Ok(items)
}

fn reference_item(entry: &Value, page_url: &str) -> Result<ReferenceItem> {
    let name = entry
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::MissingField(format!("name not found in {page_url}")))?;
    let url = entry
        .get("url")
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::MissingField(format!("url not found in {page_url}")))?;
    Ok(ReferenceItem {
        name: name.to_string(),
        url: url.to_string(),
    })
}

/// Enumerates all categories in order and turns every listed item into a
/// fetch job. Any listing failure aborts the enumeration.
pub async fn enumerate_jobs(
    port: &dyn CatalogPort,
    base_url: &str,
    categories: &[Category],
    limit: u32,
) -> Result<Vec<FetchJob>> {
    let mut jobs = Vec::new();
    for &category in categories {
        let items = list_category(port, base_url, category, limit).await?;
        jobs.extend(items.into_iter().map(|item| FetchJob {
            seq: 0,
            key: normalize_key(&item.name),
            url: item.url,
            category,
        }));
    }
    for (seq, job) in jobs.iter_mut().enumerate() {
        job.seq = seq;
    }
    Ok(jobs)
}
