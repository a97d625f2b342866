use std::fs;
use std::io::Cursor;
use std::time::{SystemTime, UNIX_EPOCH};

use tic_core::protocol::encoder::{FrameBuilder, apply_parity};
use tic_core::{ByteSource, Decoder, Generation, Outcome, ReaderSource, SliceSource, SourceError};

fn two_dataset_stream() -> Vec<u8> {
    apply_parity(
        &FrameBuilder::new()
            .dataset(Generation::Historic, "ADCO", "", "031528123456")
            .dataset(Generation::Historic, "IINST", "", "002")
            .finish(),
    )
}

#[test]
fn drain_returns_one_dataset_per_call() {
    let wire = two_dataset_stream();
    let mut source = SliceSource::new(&wire);
    let mut decoder = Decoder::default();

    let first = decoder.drain(&mut source).unwrap();
    assert!(matches!(first, Outcome::DatasetReady(ref d) if d.name == "ADCO"));
    let second = decoder.drain(&mut source).unwrap();
    assert!(matches!(second, Outcome::DatasetReady(ref d) if d.name == "IINST"));
    // Only the frame stop is left.
    assert_eq!(source.remaining(), 1);
    assert_eq!(decoder.drain(&mut source).unwrap(), Outcome::NeedMore);
    assert!(!source.available());
}

#[test]
fn drain_stops_at_error_and_resumes() {
    let mut wire = apply_parity(b"\x02Z");
    wire.extend(two_dataset_stream());
    let mut source = SliceSource::new(&wire);
    let mut decoder = Decoder::default();

    let outcome = decoder.drain(&mut source).unwrap();
    assert!(matches!(outcome, Outcome::Error(_)));
    assert_eq!(source.position(), 2);
    let outcome = decoder.drain(&mut source).unwrap();
    assert!(matches!(outcome, Outcome::DatasetReady(_)));
}

#[test]
fn drain_on_empty_source_needs_more() {
    let mut source = SliceSource::new(&[]);
    let mut decoder = Decoder::default();
    assert_eq!(decoder.drain(&mut source).unwrap(), Outcome::NeedMore);
}

#[test]
fn reader_source_feeds_decoder() {
    let mut source = ReaderSource::new(Cursor::new(two_dataset_stream()));
    let mut decoder = Decoder::default();
    let mut names = Vec::new();
    loop {
        match decoder.drain(&mut source).unwrap() {
            Outcome::DatasetReady(dataset) => names.push(dataset.name),
            Outcome::Error(err) => panic!("unexpected error: {err}"),
            Outcome::NeedMore => {
                if !source.fill().unwrap() {
                    break;
                }
            }
        }
    }
    assert_eq!(names, vec!["ADCO".to_string(), "IINST".to_string()]);
    assert!(source.is_exhausted());
}

#[test]
fn drain_on_unfilled_reader_source_needs_more() {
    let mut source = ReaderSource::new(Cursor::new(two_dataset_stream()));
    let mut decoder = Decoder::default();
    assert_eq!(decoder.drain(&mut source).unwrap(), Outcome::NeedMore);
    assert_eq!(decoder.stats().bytes, 0);
    assert!(source.fill().unwrap());
    assert!(matches!(
        decoder.drain(&mut source).unwrap(),
        Outcome::DatasetReady(ref d) if d.name == "ADCO"
    ));
}

#[test]
fn reader_source_open_missing_file_is_io_error() {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("tic_missing_{unique}.tic"));

    let err = match ReaderSource::open(&path) {
        Ok(_) => panic!("expected missing file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}

#[test]
fn reader_source_reads_file() {
    let mut path = std::env::temp_dir();
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("tic_capture_{unique}.tic"));
    fs::write(&path, two_dataset_stream()).unwrap();

    let mut source = ReaderSource::open(&path).unwrap();
    let mut count = 0;
    while source.read_byte().unwrap().is_some() {
        count += 1;
    }
    let _ = fs::remove_file(&path);

    assert_eq!(count, two_dataset_stream().len());
}
