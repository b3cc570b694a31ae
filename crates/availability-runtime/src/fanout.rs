//! Concurrent view assembly.
//!
//! The four view builders only read the dataset, so each runs on tokio's
//! blocking pool against a shared `Arc<[Record]>` and the results are joined.

use std::sync::Arc;

use anyhow::Context;
use availability_core::models::Record;
use availability_data::views::{
    cluster_view, low_availability_views, region_view, site_view, ReportViews, ViewConfig,
};
use tokio::task::spawn_blocking;

/// Build the same [`ReportViews`] as
/// [`availability_data::views::assemble_views`], one blocking task per view.
pub async fn assemble_views_concurrently(
    records: Arc<[Record]>,
    config: ViewConfig,
) -> anyhow::Result<ReportViews> {
    let regions = {
        let records = Arc::clone(&records);
        spawn_blocking(move || region_view(&records))
    };
    let low_availability = {
        let records = Arc::clone(&records);
        spawn_blocking(move || low_availability_views(&records, &config))
    };
    let sites = {
        let records = Arc::clone(&records);
        spawn_blocking(move || site_view(&records))
    };
    let clusters = spawn_blocking(move || cluster_view(&records));

    let (regions, low_availability, sites, clusters) =
        tokio::try_join!(regions, low_availability, sites, clusters)
            .context("view task did not complete")?;

    Ok(ReportViews {
        regions,
        low_availability: low_availability?,
        sites: sites?,
        clusters: clusters?,
    })
}
