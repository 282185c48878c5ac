//! Tests for the CSV-backed source and sink.
#![cfg(feature = "io-csv")]

use chunkflow::testing::mock_csv_file;
use chunkflow::{
    ChunkConfig, ChunkPipeline, CsvRecordSource, CsvSink, MemorySink, ReadOptions, RecordSource,
    RunStatus,
};

#[test]
fn skips_the_header_line_by_default() {
    let temp = mock_csv_file(&[
        "id,first_name,last_name,email",
        "1,Ann,Lee,ann@x.com",
        "2,Bob,Ray,bob@x.com",
    ])
    .unwrap();
    let mut source = CsvRecordSource::open_default(temp.path()).unwrap();

    let first = source.next_record().unwrap().unwrap();
    assert_eq!(first.id, "1");
    assert_eq!(first.first_name, "Ann");
    let second = source.next_record().unwrap().unwrap();
    assert_eq!(second.email, "bob@x.com");
    assert!(source.next_record().unwrap().is_none());
}

#[test]
fn skips_multiple_header_lines_when_asked() {
    let temp = mock_csv_file(&["# extract 2024-11-02", "id,first_name,last_name,email", "1,Ann,Lee,ann@x.com"])
        .unwrap();
    let options = ReadOptions {
        header_lines_to_skip: 2,
        ..ReadOptions::default()
    };
    let mut source = CsvRecordSource::open(temp.path(), options).unwrap();

    let record = source.next_record().unwrap().unwrap();
    assert_eq!(record.id, "1");
    assert!(source.next_record().unwrap().is_none());
}

#[test]
fn short_rows_pad_missing_fields_with_empty_strings() {
    let temp = mock_csv_file(&["id,first_name,last_name,email", "3,Cid"]).unwrap();
    let mut source = CsvRecordSource::open_default(temp.path()).unwrap();

    let record = source.next_record().unwrap().unwrap();
    assert_eq!(record.id, "3");
    assert_eq!(record.first_name, "Cid");
    assert_eq!(record.last_name, "");
    assert_eq!(record.email, "");
}

#[test]
fn header_only_file_is_an_empty_source() {
    let temp = mock_csv_file(&["id,first_name,last_name,email"]).unwrap();
    let mut source = CsvRecordSource::open_default(temp.path()).unwrap();
    assert!(source.next_record().unwrap().is_none());
}

#[test]
fn undecodable_row_surfaces_as_a_read_error() {
    use std::io::Write;

    let temp = mock_csv_file(&["id,first_name,last_name,email", "1,Ann,Lee,ann@x.com"]).unwrap();
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(temp.path())
        .unwrap();
    file.write_all(b"2,B\xffob,Ray,bob@x.com\n").unwrap();
    drop(file);

    let mut source = CsvRecordSource::open_default(temp.path()).unwrap();
    assert!(source.next_record().unwrap().is_some());

    let err = source.next_record().unwrap_err();
    assert!(err.message.contains("CSV"), "message: {}", err.message);
    assert_eq!(err.record, Some(1));
}

#[test]
fn csv_source_feeds_the_pipeline() {
    let temp = mock_csv_file(&[
        "id,first_name,last_name,email",
        "1,Ann,Lee,ann@x.com",
        "0,Bob,Lee,bob@x.com",
        "2, Cid ,,cid@x.com",
    ])
    .unwrap();
    let mut source = CsvRecordSource::open_default(temp.path()).unwrap();
    let sink = MemorySink::new();
    let report = ChunkPipeline::new(ChunkConfig {
        chunk_size: 2,
        skip_limit: 1,
        ..ChunkConfig::default()
    })
    .run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.records_written, 2);
    assert_eq!(report.records_skipped, 1);
    assert_eq!(sink.rows()[1].first_name, "Cid");
}

#[test]
fn csv_sink_appends_committed_chunks_with_header() {
    let input = mock_csv_file(&[
        "id,first_name,last_name,email",
        "1,Ann,Lee,ann@x.com",
        "2,Bob,Ray,bob@x.com",
        "3,Dee,Dawn,dee@x.com",
    ])
    .unwrap();
    let output = mock_csv_file(&[]).unwrap();

    let mut source = CsvRecordSource::open_default(input.path()).unwrap();
    let sink = CsvSink::create(output.path()).unwrap();
    let report = ChunkPipeline::new(ChunkConfig {
        chunk_size: 2,
        ..ChunkConfig::default()
    })
    .run(&mut source, &sink);

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.records_written, 3);
    assert_eq!(report.chunks_committed, 2);

    let contents = std::fs::read_to_string(output.path()).unwrap();
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("id,first_name,last_name,email"));
    assert_eq!(lines.next(), Some("1,Ann,Lee,ann@x.com"));
    assert_eq!(lines.next(), Some("2,Bob,Ray,bob@x.com"));
    assert_eq!(lines.next(), Some("3,Dee,Dawn,dee@x.com"));
    assert_eq!(lines.next(), None);
}

#[test]
fn empty_lines_are_skipped_by_the_tokenizer() {
    // The csv crate treats blank lines as record separators, not records.
    let temp = mock_csv_file(&["id,first_name,last_name,email", "", "1,Ann,Lee,ann@x.com"])
        .unwrap();
    let mut source = CsvRecordSource::open_default(temp.path()).unwrap();

    let record = source.next_record().unwrap().unwrap();
    assert_eq!(record.id, "1");
}
