//! Use case: list the records on one touched tag.

use tracing::info;

use super::{
    events::{StationEvent, StatusReporter},
    tag_io::{TagError, TagStation},
};

/// Waits for one tag, reads it, and reports what it holds.
///
/// A tag without NDEF data and a cancelled wait are both reported and count
/// as a normal end of the command.
///
/// # Errors
///
/// Returns the [`TagError`] for reader failures and interrupted exchanges.
pub fn show_records<T, R>(tags: &mut T, reporter: &mut R) -> Result<(), TagError>
where
    T: TagStation + ?Sized,
    R: StatusReporter + ?Sized,
{
    reporter.report(StationEvent::AwaitingReadTouch);
    match tags.get_records() {
        Ok(records) => {
            info!(count = records.len(), "tag records read");
            reporter.report(StationEvent::RecordsRead(records));
            Ok(())
        }
        Err(TagError::StructuredData(e)) => {
            reporter.report(StationEvent::NoStructuredData(e.to_string()));
            Ok(())
        }
        Err(TagError::Cancelled) => {
            reporter.report(StationEvent::Cancelled);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use qrtag_core::{NdefError, Record};

    use super::*;
    use crate::application::events::RecordingReporter;

    struct OneRead(Option<Result<Vec<Record>, TagError>>);

    impl TagStation for OneRead {
        fn write_uri(&mut self, _uri: &str) -> Result<(), TagError> {
            unreachable!("show_records never writes")
        }
        fn get_records(&mut self) -> Result<Vec<Record>, TagError> {
            self.0.take().expect("read once")
        }
    }

    #[test]
    fn test_records_are_reported() {
        let records = vec![Record::uri("https://a.example"), Record::empty()];
        let mut tags = OneRead(Some(Ok(records.clone())));
        let mut reporter = RecordingReporter::new();

        show_records(&mut tags, &mut reporter).unwrap();

        assert_eq!(
            reporter.events(),
            &[StationEvent::AwaitingReadTouch, StationEvent::RecordsRead(records)]
        );
    }

    #[test]
    fn test_unformatted_tag_is_reported_not_failed() {
        let mut tags = OneRead(Some(Err(NdefError::NotFormatted(0).into())));
        let mut reporter = RecordingReporter::new();

        show_records(&mut tags, &mut reporter).unwrap();

        assert!(matches!(
            reporter.events().last(),
            Some(StationEvent::NoStructuredData(_))
        ));
    }

    #[test]
    fn test_reader_failure_is_returned() {
        let mut tags = OneRead(Some(Err(TagError::DeviceUnavailable("gone".into()))));
        let mut reporter = RecordingReporter::new();

        let err = show_records(&mut tags, &mut reporter).unwrap_err();

        assert!(matches!(err, TagError::DeviceUnavailable(_)));
    }
}
