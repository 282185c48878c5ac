//! End-to-end tests for the sequential chunk pipeline: chunk boundaries,
//! skip-limit bookkeeping and fault-tolerance behavior.

use chunkflow::testing::{FailingSource, FlakySink, raw};
use chunkflow::{
    ChunkConfig, ChunkPipeline, MemorySink, RawRecord, RejectReason, RunError, RunStatus,
    VecSource,
};

fn config(chunk_size: usize, skip_limit: u64) -> ChunkConfig {
    ChunkConfig {
        chunk_size,
        skip_limit,
        ..ChunkConfig::default()
    }
}

fn sample_records() -> Vec<RawRecord> {
    vec![
        raw("1", "Ann", "Lee", "ann@x.com"),
        raw("0", "Bob", "Lee", "bob@x.com"),
        raw("2", " Cid ", "", "cid@x.com"),
    ]
}

#[test]
fn mixed_input_completes_within_skip_limit() {
    let mut source = VecSource::new(sample_records());
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(2, 1)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.records_read, 3);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.records_skipped, 1);
    assert_eq!(report.skips[0].reason, RejectReason::InvalidId);

    let rows = sink.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].first_name, "Ann");
    assert_eq!(rows[0].last_name, "Lee");
    assert_eq!(rows[1].id, 2);
    assert_eq!(rows[1].first_name, "Cid");
    assert_eq!(rows[1].last_name, "");
}

#[test]
fn zero_skip_limit_fails_on_first_rejection() {
    let mut source = VecSource::new(sample_records());
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(2, 0)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(
        report.failure,
        Some(RunError::SkipLimitExceeded {
            skipped: 1,
            limit: 0
        })
    );
    // The first valid record was still buffered (chunk size 2), never flushed.
    assert_eq!(report.records_read, 2);
    assert_eq!(report.records_written, 0);
    assert_eq!(report.records_skipped, 1);
    assert_eq!(sink.commit_count(), 0);
}

#[test]
fn refused_chunk_counts_as_bulk_skip_and_can_breach_the_limit() {
    let mut source = VecSource::new(vec![
        raw("1", "Ann", "Lee", "ann@x.com"),
        raw("2", "Bob", "Ray", "bob@x.com"),
    ]);
    let sink = FlakySink::failing_on(vec![0]);
    let report = ChunkPipeline::new(config(2, 1)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(
        report.failure,
        Some(RunError::SkipLimitExceeded {
            skipped: 2,
            limit: 1
        })
    );
    assert_eq!(report.records_written, 0);
    assert_eq!(report.records_skipped, 2);
    assert!(
        report
            .skips
            .iter()
            .all(|s| s.reason == RejectReason::SinkError)
    );
    assert_eq!(sink.commit_calls(), 1);
    assert!(sink.rows().is_empty());
}

#[test]
fn refused_chunk_within_budget_keeps_the_run_alive() {
    // Chunks of 2: [1,2] refused, [3,4] lands, [5] partial lands.
    let mut source = VecSource::new(vec![
        raw("1", "A", "", "a@x.com"),
        raw("2", "B", "", "b@x.com"),
        raw("3", "C", "", "c@x.com"),
        raw("4", "D", "", "d@x.com"),
        raw("5", "E", "", "e@x.com"),
    ]);
    let sink = FlakySink::failing_on(vec![0]);
    let report = ChunkPipeline::new(config(2, 2)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.records_read, 5);
    assert_eq!(report.records_written, 3);
    assert_eq!(report.records_skipped, 2);
    assert_eq!(report.chunks_committed, 2);
    assert_eq!(sink.commit_calls(), 3);
    assert_eq!(
        sink.rows().iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![3, 4, 5]
    );
}

#[test]
fn completed_counts_always_balance() {
    // 10 records, 3 invalid, chunk size 4: read == written + skipped.
    let records: Vec<RawRecord> = (1..=10)
        .map(|i| {
            if i % 3 == 0 {
                raw(&i.to_string(), "", "", "x@x.com")
            } else {
                raw(&i.to_string(), "Ann", "Lee", "ann@x.com")
            }
        })
        .collect();
    let mut source = VecSource::new(records);
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(4, 10)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(
        report.records_read,
        report.records_written + report.records_skipped
    );
    assert_eq!(report.records_written, 7);
    assert_eq!(report.records_skipped, 3);
}

#[test]
fn commit_calls_match_chunk_arithmetic() {
    // 7 survivors, chunk size 3 -> ceil(7 / 3) = 3 commits.
    let records: Vec<RawRecord> = (1..=7)
        .map(|i| raw(&i.to_string(), "Ann", "Lee", "ann@x.com"))
        .collect();
    let mut source = VecSource::new(records);
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(3, 0)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(sink.commit_count(), 3);
    assert_eq!(report.chunks_committed, 3);
    assert_eq!(report.chunk_millis.len(), 3);
}

#[test]
fn chunk_size_one_commits_every_record() {
    let mut source = VecSource::new(sample_records());
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(1, 1)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(sink.commit_count(), 2);
    assert_eq!(report.records_written, 2);
}

#[test]
fn skips_equal_to_limit_complete_one_more_fails() {
    let bad = |i: u32| raw("0", "Bad", "", &format!("bad{i}@x.com"));
    let good = raw("1", "Ann", "Lee", "ann@x.com");

    // Exactly at the limit: completes.
    let mut source = VecSource::new(vec![bad(1), bad(2), good.clone()]);
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(5, 2)).run(&mut source, &sink);
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.records_skipped, 2);
    assert_eq!(report.records_written, 1);

    // One past the limit: fails, and the source is not drained further.
    let mut source = VecSource::new(vec![bad(1), bad(2), bad(3), good]);
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(5, 2)).run(&mut source, &sink);
    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.records_read, 3);
    assert_eq!(report.records_skipped, 3);
    assert_eq!(report.records_written, 0);
}

#[test]
fn id_boundary_zero_rejected_one_accepted() {
    let mut source = VecSource::new(vec![
        raw("0", "Ann", "Lee", "ann@x.com"),
        raw("1", "Ann", "Lee", "ann@x.com"),
    ]);
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(1, 5)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.skips[0].reason, RejectReason::InvalidId);
    assert_eq!(sink.rows().iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn read_error_is_fatal_but_reported() {
    let mut source = FailingSource::after(vec![
        raw("1", "Ann", "Lee", "ann@x.com"),
        raw("2", "Bob", "Ray", "bob@x.com"),
    ]);
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(2, 5)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Failed);
    assert!(matches!(report.failure, Some(RunError::Read(_))));
    // The first chunk filled and committed before the source broke.
    assert_eq!(report.records_read, 2);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.records_skipped, 0);
}

#[test]
fn zero_chunk_size_fails_before_reading() {
    let mut source = VecSource::new(sample_records());
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(config(0, 5)).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Failed);
    assert!(matches!(report.failure, Some(RunError::Config(_))));
    assert_eq!(report.records_read, 0);
    assert_eq!(sink.commit_count(), 0);
}

#[test]
fn empty_source_completes_with_no_commits() {
    let mut source = VecSource::new(vec![]);
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(ChunkConfig::default()).run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.records_read, 0);
    assert_eq!(report.chunks_committed, 0);
    assert_eq!(report.max_chunk_millis, 0);
    assert_eq!(report.average_chunk_millis, 0.0);
    assert_eq!(sink.commit_count(), 0);
}
