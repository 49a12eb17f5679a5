//! End-to-end sweeps over generated input files

use matbench::io::generate_matrix_files;
use matbench::{
    BenchError, BinaryMatrixLoader, CooBaselineKernel, CsvSink, DenseKernel, GustavsonKernel,
    RecordDetails, RecordShape, RecordSink, Result, RunConfig, RunRecord, SweepConfig,
    SweepController, SweepState,
};

/// Sink that rejects every other record
struct FlakySink {
    accepted: Vec<RunRecord>,
    calls: usize,
}

impl RecordSink for FlakySink {
    fn emit(&mut self, record: &RunRecord) -> Result<()> {
        self.calls += 1;
        if self.calls % 2 == 0 {
            return Err(BenchError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.accepted.push(record.clone());
        Ok(())
    }
}

fn sparse_config(sizes: Vec<usize>, levels: Vec<u32>) -> SweepConfig {
    SweepConfig {
        sizes,
        sparsity_levels: levels,
        warmup: 2,
        repetitions: 3,
        ..SweepConfig::sparse_default()
    }
    .without_pauses()
}

fn sparse_axes(records: &[RunRecord]) -> Vec<(usize, u32, usize, bool)> {
    records
        .iter()
        .map(|r| match &r.details {
            RecordDetails::Sparse {
                sparsity_percent, ..
            } => (r.matrix_size, *sparsity_percent, r.repetition, r.warmup),
            RecordDetails::Dense { .. } => panic!("unexpected dense record"),
        })
        .collect()
}

#[test]
fn test_sparse_sweep_emission_order() {
    let dir = tempfile::tempdir().unwrap();
    generate_matrix_files(dir.path(), &[4, 8], &[0, 90], 42).unwrap();

    let mut controller = SweepController::new(
        sparse_config(vec![4, 8], vec![0, 90]),
        BinaryMatrixLoader::new(dir.path()),
        Vec::<RunRecord>::new(),
    );
    let summary = controller.run(|_: &RunConfig| Ok(GustavsonKernel));
    assert_eq!(summary.emitted, 20);
    assert_eq!(summary.skipped_groups, 0);

    let mut expected = Vec::new();
    for size in [4, 8] {
        for sparsity in [0, 90] {
            for rep in 1..=5 {
                expected.push((size, sparsity, rep, rep <= 2));
            }
        }
    }
    assert_eq!(sparse_axes(&controller.into_sink()), expected);
}

#[test]
fn test_missing_file_skips_only_its_group() {
    let dir = tempfile::tempdir().unwrap();
    generate_matrix_files(dir.path(), &[4], &[50, 75], 1).unwrap();
    std::fs::remove_file(dir.path().join("B_4_50.bin")).unwrap();

    let mut controller = SweepController::new(
        sparse_config(vec![4], vec![50, 75]),
        BinaryMatrixLoader::new(dir.path()),
        Vec::<RunRecord>::new(),
    );
    let summary = controller.run(|_: &RunConfig| Ok(CooBaselineKernel));

    assert_eq!(summary.skipped_groups, 1);
    assert_eq!(summary.emitted, 5);
    assert_eq!(controller.state(), SweepState::Exhausted);

    let records = controller.into_sink();
    assert!(records.iter().all(|r| matches!(
        &r.details,
        RecordDetails::Sparse { sparsity_percent: 75, implementation, .. } if implementation == "unoptimized"
    )));
}

#[test]
fn test_truncated_file_skips_group() {
    let dir = tempfile::tempdir().unwrap();
    generate_matrix_files(dir.path(), &[6], &[], 3).unwrap();
    let path = dir.path().join("A_6.bin");
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();

    let config = SweepConfig {
        sizes: vec![6],
        thread_counts: vec![1],
        vectorization: vec![false],
        warmup: 1,
        repetitions: 1,
        ..SweepConfig::dense_default()
    }
    .without_pauses();

    let mut controller =
        SweepController::new(config, BinaryMatrixLoader::new(dir.path()), Vec::<RunRecord>::new());
    let summary = controller.run(|c: &RunConfig| DenseKernel::new(c.block_size, c.vectorize, c.threads));

    assert_eq!(summary.skipped_groups, 1);
    assert_eq!(summary.emitted, 0);
}

#[test]
fn test_failed_emissions_do_not_stop_sweep() {
    let dir = tempfile::tempdir().unwrap();
    generate_matrix_files(dir.path(), &[4], &[0], 9).unwrap();

    let sink = FlakySink {
        accepted: Vec::new(),
        calls: 0,
    };
    let mut controller = SweepController::new(
        sparse_config(vec![4], vec![0]),
        BinaryMatrixLoader::new(dir.path()),
        sink,
    );
    let summary = controller.run(|_: &RunConfig| Ok(GustavsonKernel));

    assert_eq!(summary.emitted, 3);
    assert_eq!(summary.failed_emissions, 2);

    let sink = controller.into_sink();
    assert_eq!(sink.calls, 5);
    let reps: Vec<_> = sink.accepted.iter().map(|r| r.repetition).collect();
    assert_eq!(reps, vec![1, 3, 5]);
}

#[test]
fn test_dense_sweep_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    generate_matrix_files(dir.path(), &[16], &[], 42).unwrap();
    let csv = dir.path().join("results.csv");

    let config = SweepConfig {
        sizes: vec![16],
        thread_counts: vec![1, 2],
        warmup: 1,
        repetitions: 1,
        ..SweepConfig::dense_default()
    }
    .without_pauses();

    let sink = CsvSink::open(&csv, RecordShape::Dense).unwrap();
    let mut controller = SweepController::new(config, BinaryMatrixLoader::new(dir.path()), sink);
    let summary = controller.run(|c: &RunConfig| DenseKernel::new(c.block_size, c.vectorize, c.threads));
    assert_eq!(summary.emitted, 8);

    let text = std::fs::read_to_string(&csv).unwrap();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], RecordShape::Dense.header_line());

    let first: Vec<_> = lines[1].split(';').collect();
    assert_eq!(first.len(), RecordShape::Dense.header().len());
    assert!(first[0].starts_with("run_"));
    assert_eq!(&first[1..4], &["16", "none", "1"]);
    assert_eq!(first[9], "1");
    assert_eq!(first[11], "1");
    assert_eq!(first[12], "Pre-touched memory & CPU frequency stabilized");

    let last: Vec<_> = lines[8].split(';').collect();
    assert_eq!(&last[2..4], &["simd", "2"]);
    assert_eq!(last[9], "2");
    assert_eq!(last[11], "0");
}

#[test]
fn test_every_kernel_is_built_per_configuration() {
    let dir = tempfile::tempdir().unwrap();
    generate_matrix_files(dir.path(), &[4], &[], 2).unwrap();

    let config = SweepConfig {
        sizes: vec![4],
        thread_counts: vec![1, 3],
        warmup: 0,
        repetitions: 1,
        sample_memory: false,
        ..SweepConfig::dense_default()
    }
    .without_pauses();

    let mut seen = Vec::new();
    let mut controller =
        SweepController::new(config, BinaryMatrixLoader::new(dir.path()), Vec::<RunRecord>::new());
    controller.run(|c: &RunConfig| {
        seen.push((c.vectorize, c.threads));
        DenseKernel::new(c.block_size, c.vectorize, c.threads)
    });

    assert_eq!(seen, vec![(false, 1), (false, 3), (true, 1), (true, 3)]);
    assert!(controller.into_sink().iter().all(|r| !r.warmup));
}

#[test]
fn test_unopenable_output_counts_every_run_as_failed() {
    let dir = tempfile::tempdir().unwrap();
    generate_matrix_files(dir.path(), &[4], &[50], 5).unwrap();
    let csv = dir.path().join("missing").join("out.csv");

    let mut sink = CsvSink::new(&csv, RecordShape::Sparse);
    assert!(sink.prepare().is_err());

    let mut controller = SweepController::new(
        sparse_config(vec![4], vec![50]),
        BinaryMatrixLoader::new(dir.path()),
        sink,
    );
    let summary = controller.run(|_: &RunConfig| Ok(GustavsonKernel));

    assert_eq!(summary.emitted, 0);
    assert_eq!(summary.failed_emissions, 5);
    assert_eq!(controller.state(), SweepState::Exhausted);
    assert!(!csv.exists());
}
