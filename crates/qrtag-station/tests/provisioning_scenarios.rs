//! End-to-end provisioning scenarios.
//!
//! Runs the real workflow, `NfcHandler`, and Type 2 tag logic against the
//! emulated reader in `infrastructure::nfc::mock`.  The QR side is a scripted
//! scanner that yields a fixed list of URIs and then reports a cancel, like an
//! operator pressing `q` after the last tag.

use std::collections::VecDeque;

use qrtag_core::Record;
use qrtag_station::application::{
    detect_qr::{ScanError, UriScanner},
    events::{RecordingReporter, StationEvent, VerifyFailure},
    provision::{ProvisioningWorkflow, WorkflowError, WorkflowOptions},
    show_records::show_records,
    tag_io::{TagError, TagStation},
};
use qrtag_station::infrastructure::nfc::{
    handler::NfcHandler,
    mock::{MockTagReader, TagMemory},
};

struct ScriptedScanner(VecDeque<String>);

impl ScriptedScanner {
    fn new(uris: &[&str]) -> Self {
        Self(uris.iter().map(|u| u.to_string()).collect())
    }
}

impl UriScanner for ScriptedScanner {
    fn scan(&mut self) -> Result<String, ScanError> {
        self.0.pop_front().ok_or(ScanError::Cancelled)
    }
}

type Workflow = ProvisioningWorkflow<ScriptedScanner, NfcHandler<MockTagReader>, RecordingReporter>;

fn workflow(uris: &[&str], reader: MockTagReader, verify: bool) -> Workflow {
    ProvisioningWorkflow::new(
        ScriptedScanner::new(uris),
        NfcHandler::new(reader),
        RecordingReporter::new(),
        WorkflowOptions {
            verify_after_write: verify,
        },
    )
}

#[test]
fn test_tag_without_ndef_area_returns_to_scan() {
    // Arrange
    let tag = TagMemory::unformatted(45).shared();
    let mut wf = workflow(
        &["https://example.com"],
        MockTagReader::new().with_touch(&tag),
        true,
    );

    // Act
    let summary = wf.run().expect("workflow ends by cancel");

    // Assert
    assert_eq!(summary.provisioned, 0);
    assert_eq!(summary.failed_writes, 1);
    let events = wf.reporter().events();
    assert!(events.iter().any(|e| matches!(
        e,
        StationEvent::WriteFailed { uri, .. } if uri == "https://example.com"
    )));
    // After the failure the workflow went back to scanning.
    assert_eq!(
        &events[events.len() - 2..],
        &[StationEvent::AwaitingQr, StationEvent::Cancelled]
    );
}

#[test]
fn test_verify_reading_a_different_uri_is_a_mismatch() {
    let written = TagMemory::ntag213().shared();
    let other = TagMemory::ntag213()
        .with_records(&[Record::uri("https://other.example")])
        .shared();
    let reader = MockTagReader::new().with_touch(&written).with_touch(&other);
    let mut wf = workflow(&["https://connpass.com/event/1"], reader, true);

    let summary = wf.run().unwrap();

    assert_eq!(summary.provisioned, 0);
    assert_eq!(summary.failed_verifications, 1);
    assert!(wf.reporter().events().contains(&StationEvent::VerifyFailed {
        uri: "https://connpass.com/event/1".to_string(),
        reason: VerifyFailure::Mismatch,
    }));
}

#[test]
fn test_two_tags_are_provisioned_in_one_session() {
    // Arrange: each tag is touched once to write and once to verify.
    let first = TagMemory::ntag213().shared();
    let second = TagMemory::ntag213()
        .with_records(&[Record::uri("https://stale.example"), Record::empty()])
        .shared();
    let reader = MockTagReader::new()
        .with_touch(&first)
        .with_touch(&first)
        .with_touch(&second)
        .with_touch(&second);
    let mut wf = workflow(
        &["https://connpass.com/event/1", "https://connpass.com/event/2"],
        reader,
        true,
    );

    // Act
    let summary = wf.run().unwrap();

    // Assert
    assert_eq!(summary.provisioned, 2);
    let (_, mut tags, _) = wf.into_parts();
    assert_eq!(tags.reader().releases(), 2);
    assert_eq!(tags.reader().pending_touches(), 0);

    let mut check = NfcHandler::new(MockTagReader::new().with_touch(&second));
    assert_eq!(
        check.get_records().unwrap(),
        vec![Record::uri("https://connpass.com/event/2")]
    );
    // The first tag's handler has no touches left.
    assert!(matches!(tags.get_records(), Err(TagError::Cancelled)));
}

#[test]
fn test_skipping_verification_touches_each_tag_once() {
    let tag = TagMemory::ntag213().shared();
    let mut wf = workflow(
        &["https://example.com/a"],
        MockTagReader::new().with_touch(&tag),
        false,
    );

    let summary = wf.run().unwrap();

    assert_eq!(summary.provisioned, 1);
    let (_, tags, _) = wf.into_parts();
    assert_eq!(tags.reader().connects(), 1);
}

#[test]
fn test_tag_pulled_away_mid_write_returns_to_scan() {
    let tag = TagMemory::ntag213().fail_writes_after(1).shared();
    let mut wf = workflow(
        &["https://connpass.com/event/123456/"],
        MockTagReader::new().with_touch(&tag),
        true,
    );

    let summary = wf.run().unwrap();

    assert_eq!(summary.failed_writes, 1);
    assert!(wf
        .reporter()
        .events()
        .iter()
        .any(|e| matches!(e, StationEvent::WriteFailed { .. })));

    // The half-written tag holds an empty message, not a truncated record.
    let mut check = NfcHandler::new(MockTagReader::new().with_touch(&tag));
    assert_eq!(check.get_records().unwrap(), Vec::<Record>::new());
}

#[test]
fn test_cancel_while_waiting_for_tag_exits_cleanly() {
    // No touches scripted: the reader reports a cancelled wait.
    let mut wf = workflow(&["https://example.com"], MockTagReader::new(), true);

    let summary = wf.run().unwrap();

    assert_eq!(summary.provisioned, 0);
    assert_eq!(summary.failed_writes, 0);
    assert_eq!(wf.reporter().events().last(), Some(&StationEvent::Cancelled));
}

#[test]
fn test_unplugged_reader_ends_the_session() {
    let mut wf = workflow(&["https://example.com"], MockTagReader::unplugged(), true);

    let err = wf.run().unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Tag(TagError::DeviceUnavailable(_))
    ));
}

#[test]
fn test_show_records_lists_written_uri() {
    // Arrange: provision a tag, then list it.
    let tag = TagMemory::ntag213().shared();
    let mut wf = workflow(
        &["https://connpass.com/event/9"],
        MockTagReader::new().with_touch(&tag),
        false,
    );
    wf.run().unwrap();

    let mut tags = NfcHandler::new(MockTagReader::new().with_touch(&tag));
    let mut reporter = RecordingReporter::new();

    // Act
    show_records(&mut tags, &mut reporter).unwrap();

    // Assert
    assert_eq!(
        reporter.events().last(),
        Some(&StationEvent::RecordsRead(vec![Record::uri(
            "https://connpass.com/event/9"
        )]))
    );
}

#[test]
fn test_show_records_on_unformatted_tag_reports_no_data() {
    let tag = TagMemory::unformatted(16).shared();
    let mut tags = NfcHandler::new(MockTagReader::new().with_touch(&tag));
    let mut reporter = RecordingReporter::new();

    show_records(&mut tags, &mut reporter).unwrap();

    assert!(matches!(
        reporter.events().last(),
        Some(StationEvent::NoStructuredData(_))
    ));
}
