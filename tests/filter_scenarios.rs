use phonorate::filter::Rejection;
use phonorate::{Batch, FilterConfig, Record, ValidityFilter};
use serde_json::{Value, json};

fn record(text: Value, duration: Value, filesize: Value) -> Record {
    Record::new()
        .with("text", text)
        .with("duration", duration)
        .with("wav_filesize", filesize)
}

#[test]
fn scenario_placeholder_text() {
    let filter = ValidityFilter::default();
    assert!(!filter.is_valid(&record(json!("--"), json!(5.0), json!(10000))));
}

#[test]
fn scenario_short_duration() {
    let filter = ValidityFilter::default();
    assert!(!filter.is_valid(&record(json!("ok"), json!(0.05), json!(10000))));
}

#[test]
fn rejects_exactly_when_a_check_fails() {
    let filter = ValidityFilter::default();
    let texts = [json!(null), json!(""), json!("--"), json!("ok"), json!("- -")];
    let durations = [0.0, 0.05, 0.1, 0.11, 12.0];
    let sizes = [0u64, 1999, 2000, 2001, 1 << 20];

    for text in &texts {
        for &duration in &durations {
            for &size in &sizes {
                let text_bad = matches!(text.as_str(), None | Some("") | Some("--"));
                let expected = !(text_bad || duration <= 0.1 || size <= 2000);
                let r = record(text.clone(), json!(duration), json!(size));
                assert_eq!(
                    filter.is_valid(&r),
                    expected,
                    "text={} duration={} size={}",
                    text,
                    duration,
                    size
                );
            }
        }
    }
}

#[test]
fn first_failed_check_is_reported() {
    let filter = ValidityFilter::default();
    assert_eq!(
        filter.rejection(&record(json!(""), json!(0.0), json!(0))),
        Some(Rejection::Text)
    );
    assert_eq!(
        filter.rejection(&record(json!("ok"), json!(0.0), json!(0))),
        Some(Rejection::Duration)
    );
    assert_eq!(
        filter.rejection(&record(json!("ok"), json!(1.0), json!(0))),
        Some(Rejection::Filesize)
    );
}

#[test]
fn batch_mask_follows_record_order() {
    let filter = ValidityFilter::new(FilterConfig {
        min_duration: 1.0,
        ..FilterConfig::default()
    });
    let batch = Batch::from_records(vec![
        record(json!("a"), json!(0.5), json!(9000)),
        record(json!("b"), json!(1.5), json!(9000)),
        record(json!("c"), json!(1.5), json!(20)),
    ]);
    assert_eq!(filter.mask(&batch), vec![false, true, false]);
}
