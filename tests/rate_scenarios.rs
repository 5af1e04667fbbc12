use approx::assert_relative_eq;
use phonorate::rate::{FailureKind, RateInput};
use phonorate::{
    Annotatable, Annotated, Batch, ColumnNames, FailurePolicy, MockPhonemizer, PhonorateError,
    RateAnnotator, Record,
};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::tempdir;

fn annotator() -> RateAnnotator<MockPhonemizer> {
    RateAnnotator::new(MockPhonemizer::new("en-us"))
}

fn rate(record: &Record) -> f64 {
    record
        .get("speaking_rate")
        .and_then(Value::as_f64)
        .unwrap_or(f64::NAN)
}

fn write_wav(path: &Path, sample_rate: u32, frames: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for _ in 0..frames {
        writer.write_sample(0i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn scenario_precomputed_duration() {
    let record = Record::new()
        .with("text", "hello world")
        .with("speech_duration", 2.0);

    let out = annotator()
        .annotate_record(record, &ColumnNames::default())
        .unwrap();

    let tokens = out
        .get("phonemes")
        .and_then(Value::as_str)
        .map(|p| p.split_whitespace().count())
        .unwrap();
    assert_relative_eq!(rate(&out), tokens as f64 / 2.0);
}

#[test]
fn scenario_duration_from_samples() {
    let record = Record::new().with("text", "one").with(
        "audio",
        json!({"array": vec![0.0; 16000], "sampling_rate": 16000}),
    );
    let columns = ColumnNames::default();

    let measurement = annotator()
        .measure(RateInput::from_record(&record, &columns))
        .unwrap();

    assert_eq!(measurement.duration.seconds, 1.0);
    assert_relative_eq!(measurement.speaking_rate, 1.0);
}

#[test]
fn scenario_zero_duration_floor() {
    let record = Record::new().with("text", "a b").with("speech_duration", 0);
    let columns = ColumnNames::default();

    let measurement = annotator()
        .measure(RateInput::from_record(&record, &columns))
        .unwrap();

    assert_eq!(measurement.duration.seconds, 0.01);
    assert!(measurement.speaking_rate.is_finite());
    assert_relative_eq!(measurement.speaking_rate, 200.0);
}

#[test]
fn duration_from_wav_file_relative_to_audio_root() {
    let dir = tempdir().unwrap();
    write_wav(&dir.path().join("clip.wav"), 8000, 4000);

    let record = Record::new()
        .with("text", "a b c")
        .with("audio", json!({"path": "clip.wav"}));

    let out = annotator()
        .with_audio_root(dir.path())
        .annotate_record(record, &ColumnNames::default())
        .unwrap();

    assert_relative_eq!(rate(&out), 6.0);
}

#[test]
fn missing_wav_file_is_an_error() {
    let dir = tempdir().unwrap();
    let record = Record::new()
        .with("text", "a")
        .with("audio", json!({"path": "absent.wav"}));

    let result = annotator()
        .with_audio_root(dir.path())
        .annotate_record(record, &ColumnNames::default());
    assert!(result.is_err());
}

#[test]
fn empty_audio_is_degenerate() {
    let record = Record::new()
        .with("text", "a")
        .with("audio", json!({"array": [], "sampling_rate": 16000}));

    assert!(matches!(
        annotator().annotate_record(record, &ColumnNames::default()),
        Err(PhonorateError::DegenerateDuration { .. })
    ));
}

#[test]
fn batch_and_single_paths_agree() {
    let records = vec![
        Record::new().with("text", "hello there").with("speech_duration", 1.5),
        Record::new().with("text", "x").with(
            "audio",
            json!({"array": [[0.0], [0.0], [0.0], [0.0]], "sampling_rate": 2}),
        ),
        Record::new()
            .with("text", "three short words")
            .with("speech_duration", 0)
            .with("speaker", "s1"),
    ];
    let columns = ColumnNames::default();

    let singles: Vec<Record> = records
        .iter()
        .cloned()
        .map(|r| annotator().annotate_record(r, &columns).unwrap())
        .collect();

    let batch = annotator()
        .annotate_batch(Batch::from_records(records), &columns)
        .unwrap();

    assert!(batch.is_clean());
    assert_eq!(batch.batch.into_records(), singles);
}

#[test]
fn annotate_dispatches_on_shape() {
    let columns = ColumnNames::default();
    let record = Record::new().with("text", "a b").with("speech_duration", 1.0);

    match annotator()
        .annotate(Annotatable::Single(record.clone()), &columns)
        .unwrap()
    {
        Annotated::Single(out) => assert_relative_eq!(rate(&out), 2.0),
        Annotated::Batch(_) => panic!("Expected a single record"),
    }

    match annotator()
        .annotate(Annotatable::Batch(Batch::from_records(vec![record])), &columns)
        .unwrap()
    {
        Annotated::Batch(out) => assert_eq!(out.batch.len(), 1),
        Annotated::Single(_) => panic!("Expected a batch"),
    }
}

#[test]
fn reannotation_is_idempotent() {
    let columns = ColumnNames::default();
    let record = Record::new().with("text", "a b c").with("speech_duration", 3.0);

    let mut annotator = annotator();
    let once = annotator.annotate_record(record, &columns).unwrap();
    let twice = annotator.annotate_record(once.clone(), &columns).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn isolate_policy_keeps_batch_going() {
    let columns = ColumnNames::default();
    let records = vec![
        Record::new().with("text", "fine").with("speech_duration", 1.0),
        Record::new().with("text", "boom").with("speech_duration", 1.0),
        Record::new().with("text", "also fine").with("speech_duration", 1.0),
    ];

    let out = RateAnnotator::new(MockPhonemizer::new("en-us").failing_on("boom"))
        .annotate_batch(Batch::from_records(records), &columns)
        .unwrap();

    assert_eq!(out.failures.len(), 1);
    assert_eq!(out.failures[0].index, 1);
    assert_eq!(out.failures[0].kind, FailureKind::Phonemization);

    let rows = out.batch.into_records();
    assert_relative_eq!(rate(&rows[0]), 1.0);
    assert_eq!(rows[1].get("speaking_rate"), Some(&Value::Null));
    assert_eq!(rows[1].get("phonemes"), Some(&Value::Null));
    assert_relative_eq!(rate(&rows[2]), 2.0);
}

#[test]
fn abort_policy_names_the_failed_record() {
    let columns = ColumnNames::default();
    let records = vec![
        Record::new().with("text", "fine").with("speech_duration", 1.0),
        Record::new().with("text", "fine"),
    ];

    let result = annotator()
        .with_failure_policy(FailurePolicy::Abort)
        .annotate_batch(Batch::from_records(records), &columns);

    match result {
        Err(PhonorateError::RecordFailed { index, source }) => {
            assert_eq!(index, 1);
            assert!(matches!(*source, PhonorateError::MissingField { .. }));
        }
        other => panic!("Expected RecordFailed, got {:?}", other),
    }
}
