use std::sync::Arc;

use super::UnitOfWorkTaskGenerator;
use crate::binner;
use crate::collaborator::CatalogLookup;
use crate::error::BinningError;
use crate::error::Result;
use crate::params::KeplerIdRangeParameters;
use crate::params::ParameterKind;
use crate::params::UowParameters;
use crate::task::IntRange;
use crate::task::KeplerIdChunkBinnable;
use crate::task::KeplerIdChunkCadenceUowTask;
use crate::task::KeplerIdChunkUowTask;

/// The configured Kepler ID window, or the catalog's full extent when both
/// bounds are zero. `None` means the catalog is empty.
fn resolve_kepler_id_range(
    params: &KeplerIdRangeParameters,
    catalog: Option<&dyn CatalogLookup>,
) -> Result<Option<IntRange>> {
    if !params.is_unbounded() {
        return IntRange::checked(params.start_kepler_id, params.end_kepler_id).map(Some);
    }
    let catalog = catalog.ok_or_else(|| {
        BinningError::IllegalState(
            "an unbounded Kepler ID range needs a catalog to resolve it".to_string(),
        )
    })?;
    let range = catalog.kepler_id_range()?;
    tracing::info!(range = ?range, "resolved Kepler ID range from catalog");
    Ok(range)
}

/// Catalog IDs in range, one task per sky group, then chunks of each group.
fn sky_group_chunks<T: KeplerIdChunkBinnable>(
    catalog: &dyn CatalogLookup,
    params: &UowParameters,
    prototype: impl FnOnce(IntRange) -> T,
) -> Result<Vec<T>> {
    let kepler_id_range = UowParameters::require(&params.kepler_id_range, ParameterKind::KeplerIdRange)?;
    let chunk = UowParameters::require(&params.kepler_id_chunk, ParameterKind::KeplerIdChunk)?;
    let sky_group_filter =
        UowParameters::require(&params.sky_group_id_lists, ParameterKind::SkyGroupIdLists)?;

    let Some(range) = resolve_kepler_id_range(kepler_id_range, Some(catalog))? else {
        tracing::warn!("catalog is empty, no Kepler ID tasks to generate");
        return Ok(Vec::new());
    };

    let kepler_ids = catalog.kepler_ids(range.start, range.end)?;
    let sky_group_by_kepler_id = catalog.sky_groups(&kepler_ids)?;
    tracing::info!(
        %range,
        kepler_ids = kepler_ids.len(),
        assigned = sky_group_by_kepler_id.len(),
        "retrieved Kepler IDs"
    );

    let tasks = binner::sky_group::subdivide(
        &[prototype(range)],
        &kepler_ids,
        &sky_group_by_kepler_id,
        sky_group_filter,
    );
    tracing::debug!(tasks = tasks.len(), "binned by sky group");
    Ok(binner::kepler_id_chunk::subdivide(
        &tasks,
        chunk.chunk_size,
        &sky_group_by_kepler_id,
    ))
}

/// Kepler ID chunks, each confined to one sky group.
#[derive(Clone)]
pub struct KeplerIdChunkUowTaskGenerator {
    catalog: Arc<dyn CatalogLookup>,
}

impl KeplerIdChunkUowTaskGenerator {
    pub fn new(catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { catalog }
    }
}

impl UnitOfWorkTaskGenerator for KeplerIdChunkUowTaskGenerator {
    type Task = KeplerIdChunkUowTask;

    fn name(&self) -> &'static str {
        "kepler-id-chunk"
    }

    fn required_parameters(&self) -> &'static [ParameterKind] {
        &[
            ParameterKind::KeplerIdRange,
            ParameterKind::KeplerIdChunk,
            ParameterKind::SkyGroupIdLists,
        ]
    }

    fn build_tasks(&self, params: &UowParameters) -> Result<Vec<KeplerIdChunkUowTask>> {
        sky_group_chunks(self.catalog.as_ref(), params, |range| {
            KeplerIdChunkUowTask::new(range.start, range.end)
        })
    }
}

/// Kepler ID chunks crossed with cadence bins.
#[derive(Clone)]
pub struct KeplerIdChunkCadenceUowTaskGenerator {
    catalog: Arc<dyn CatalogLookup>,
}

impl KeplerIdChunkCadenceUowTaskGenerator {
    pub fn new(catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { catalog }
    }
}

impl UnitOfWorkTaskGenerator for KeplerIdChunkCadenceUowTaskGenerator {
    type Task = KeplerIdChunkCadenceUowTask;

    fn name(&self) -> &'static str {
        "kepler-id-chunk-cadence"
    }

    fn required_parameters(&self) -> &'static [ParameterKind] {
        &[
            ParameterKind::KeplerIdRange,
            ParameterKind::KeplerIdChunk,
            ParameterKind::SkyGroupIdLists,
            ParameterKind::CadenceRange,
        ]
    }

    fn build_tasks(&self, params: &UowParameters) -> Result<Vec<KeplerIdChunkCadenceUowTask>> {
        let cadence_range = UowParameters::require(&params.cadence_range, ParameterKind::CadenceRange)?;
        let cadences = cadence_range.cadence_range()?;

        let tasks = sky_group_chunks(self.catalog.as_ref(), params, |kepler_ids| {
            KeplerIdChunkCadenceUowTask::new(kepler_ids, cadences)
        })?;
        binner::cadence::subdivide(
            &tasks,
            cadence_range.number_of_bins,
            cadence_range.minimum_bin_size,
        )
    }
}

/// Fixed-size Kepler ID intervals with no regard for sky groups.
#[derive(Clone, Default)]
pub struct KicGroupUowTaskGenerator {
    catalog: Option<Arc<dyn CatalogLookup>>,
}

impl KicGroupUowTaskGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only consulted when the Kepler ID range is left unbounded.
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogLookup>) -> Self {
        self.catalog = Some(catalog);
        self
    }
}

impl UnitOfWorkTaskGenerator for KicGroupUowTaskGenerator {
    type Task = KeplerIdChunkUowTask;

    fn name(&self) -> &'static str {
        "kic-group"
    }

    fn required_parameters(&self) -> &'static [ParameterKind] {
        &[ParameterKind::KeplerIdRange, ParameterKind::KicGroup]
    }

    fn build_tasks(&self, params: &UowParameters) -> Result<Vec<KeplerIdChunkUowTask>> {
        let kepler_id_range = UowParameters::require(&params.kepler_id_range, ParameterKind::KeplerIdRange)?;
        let kic_group = UowParameters::require(&params.kic_group, ParameterKind::KicGroup)?;

        let Some(range) = resolve_kepler_id_range(kepler_id_range, self.catalog.as_deref())? else {
            tracing::warn!("catalog is empty, no Kepler ID groups to generate");
            return Ok(Vec::new());
        };
        binner::kic_group::subdivide(
            &[KeplerIdChunkUowTask::new(range.start, range.end)],
            kic_group.bin_size,
            kic_group.max_groups,
        )
    }
}
