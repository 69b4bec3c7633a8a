//! End-to-end generation against in-memory collaborators.

#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::sync::Arc;

use kepler_uow::BinningError;
use kepler_uow::InMemoryCatalog;
use kepler_uow::InMemoryLogStore;
use kepler_uow::LogStore;
use kepler_uow::UnitOfWorkTaskGenerator;
use kepler_uow::UowParameters;
use kepler_uow::collaborator::PixelLog;
use kepler_uow::collaborator::TargetTableBoundary;
use kepler_uow::collaborator::TargetType;
use kepler_uow::generator::CadenceUowTaskGenerator;
use kepler_uow::generator::KeplerIdChunkUowTaskGenerator;
use kepler_uow::generator::ModOutCadenceUowTaskGenerator;
use kepler_uow::generator::ModOutUowTaskGenerator;
use kepler_uow::params::CadenceRangeParameters;
use kepler_uow::params::CadenceType;
use kepler_uow::params::CadenceTypeParameters;
use kepler_uow::params::ModuleOutputListsParameters;
use kepler_uow::params::ParameterKind;
use kepler_uow::task::ModOutBinnable;
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

/// Long cadences 0..300 under tables 10, 11 and 12, a hundred cadences each.
fn three_tables() -> Arc<InMemoryLogStore> {
    let logs = (0..300)
        .map(|cadence| PixelLog::long_cadence(cadence, 10 + cadence / 100))
        .collect();
    Arc::new(InMemoryLogStore::new(logs))
}

fn cadence_params(cadence_range: CadenceRangeParameters) -> UowParameters {
    UowParameters {
        cadence_range: Some(cadence_range),
        cadence_type: Some(CadenceTypeParameters {
            cadence_type: CadenceType::Long,
        }),
        ..Default::default()
    }
}

struct FixedBoundaries(Vec<TargetTableBoundary>);

impl LogStore for FixedBoundaries {
    fn target_table_boundaries(
        &self,
        _target_type: TargetType,
        _start: i32,
        _end: i32,
    ) -> anyhow::Result<Vec<TargetTableBoundary>> {
        Ok(self.0.clone())
    }

    fn has_data(&self, _cadence_type: CadenceType, _start: i32, _end: i32) -> anyhow::Result<bool> {
        Ok(true)
    }
}

#[test]
fn test_cadence_generator_bins_by_target_table_then_cadence() {
    let mut cadence_range = CadenceRangeParameters::new(50, 249);
    cadence_range.bin_by_target_table = true;
    cadence_range.number_of_bins = 2;
    cadence_range.exclude_cadences = vec![100, 101];

    let tasks = CadenceUowTaskGenerator::new()
        .with_log_store(three_tables())
        .generate_tasks(&cadence_params(cadence_range))
        .unwrap();

    let summary: Vec<(Option<i32>, i32, i32)> = tasks
        .iter()
        .map(|t| (t.target_table_id, t.start_cadence, t.end_cadence))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Some(10), 50, 74),
            (Some(10), 75, 99),
            (Some(11), 102, 150),
            (Some(11), 151, 199),
            (Some(12), 200, 224),
            (Some(12), 225, 249),
        ]
    );
}

#[test]
fn test_touching_target_table_boundaries_abort_generation() {
    for next_start in [100, 90] {
        let log_store = Arc::new(FixedBoundaries(vec![
            TargetTableBoundary::new(1, 0, 100),
            TargetTableBoundary::new(2, next_start, 200),
        ]));
        let mut cadence_range = CadenceRangeParameters::new(0, 200);
        cadence_range.bin_by_target_table = true;

        let err = CadenceUowTaskGenerator::new()
            .with_log_store(log_store)
            .generate_tasks(&cadence_params(cadence_range))
            .unwrap_err();
        assert!(matches!(err, BinningError::OutOfOrder { .. }));
        assert!(err.to_string().contains("out of order"));
    }
}

#[test]
fn test_missing_parameters_are_reported_together() {
    let err = ModOutCadenceUowTaskGenerator::new()
        .generate_tasks(&UowParameters::default())
        .unwrap_err();
    match err {
        BinningError::MissingParameters(missing) => assert_eq!(
            missing,
            vec![
                ParameterKind::CadenceRange,
                ParameterKind::CadenceType,
                ParameterKind::ModuleOutputLists,
            ]
        ),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_mod_out_cadence_generation_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[cadence_range]
start_cadence = 0
end_cadence = 299
bin_by_target_table = true

[cadence_type]
cadence_type = "long"

[module_output_lists]
channel_groups_enabled = true
channel_groups = "1:4; 81:84"
dead_channel_array = [84]
cadence_of_death_array = [250]
"#
    )
    .unwrap();

    let params = UowParameters::load(file.path()).unwrap();
    let tasks = ModOutCadenceUowTaskGenerator::new()
        .with_log_store(three_tables())
        .generate_tasks(&params)
        .unwrap();

    let summary: Vec<(Vec<i32>, Option<i32>, i32, i32)> = tasks
        .iter()
        .map(|t| (t.channels(), t.target_table_id, t.start_cadence, t.end_cadence))
        .collect();
    assert_eq!(
        summary,
        vec![
            (vec![1, 2, 3, 4], Some(10), 0, 99),
            (vec![1, 2, 3, 4], Some(11), 100, 199),
            (vec![1, 2, 3, 4], Some(12), 200, 299),
            (vec![81, 82, 83, 84], Some(10), 0, 99),
            (vec![81, 82, 83, 84], Some(11), 100, 199),
            (vec![81, 82, 83, 84], Some(12), 200, 299),
        ]
    );
}

#[test]
fn test_mod_out_generator_with_channel_batches() {
    let params = UowParameters {
        module_output_lists: Some(ModuleOutputListsParameters {
            channels_per_task: 20,
            ..Default::default()
        }),
        ..Default::default()
    };
    let tasks = ModOutUowTaskGenerator.generate_tasks(&params).unwrap();
    let sizes: Vec<usize> = tasks.iter().map(|t| t.module_outputs.len()).collect();
    assert_eq!(sizes, vec![20, 20, 20, 20, 4]);
}

#[test]
fn test_kepler_id_chunks_from_catalog_file() {
    let mut catalog_file = tempfile::NamedTempFile::new().unwrap();
    let entries: serde_json::Map<String, serde_json::Value> = (1000..1030)
        .map(|id| (id.to_string(), serde_json::Value::from(1 + (id % 3))))
        .collect();
    write!(catalog_file, "{}", serde_json::Value::Object(entries)).unwrap();
    let catalog = InMemoryCatalog::from_json_path(catalog_file.path()).unwrap();
    assert_eq!(catalog.len(), 30);

    let params = UowParameters::from_toml_str(
        r#"
[kepler_id_range]

[kepler_id_chunk]
chunk_size = 4

[sky_group_id_lists]
sky_group_id_exclude_array = [3]
"#,
    )
    .unwrap();

    let tasks = KeplerIdChunkUowTaskGenerator::new(Arc::new(catalog))
        .generate_tasks(&params)
        .unwrap();

    assert!(tasks.iter().all(|t| matches!(t.sky_group_id, Some(1) | Some(2))));
    let mut seen = 0;
    for task in &tasks {
        let sky_group_id = task.sky_group_id.unwrap();
        let members: Vec<i32> = (task.start_kepler_id..=task.end_kepler_id)
            .filter(|id| 1 + (id % 3) == sky_group_id)
            .collect();
        assert!(!members.is_empty() && members.len() <= 4);
        seen += members.len();
    }
    assert_eq!(seen, 20);
}

#[test]
#[traced_test]
fn test_ranges_without_data_are_skipped_and_logged() {
    let mut cadence_range = CadenceRangeParameters::new(0, 599);
    cadence_range.number_of_bins = 6;
    cadence_range.skip_ranges_without_data = true;

    let tasks = CadenceUowTaskGenerator::new()
        .with_log_store(three_tables())
        .generate_tasks(&cadence_params(cadence_range))
        .unwrap();

    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks.last().map(|t| t.end_cadence), Some(299));
    assert!(logs_contain("skipping task without data"));
}
