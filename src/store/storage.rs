use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::{debug, info};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use super::error::StoreError;
use super::record::{CsvRow, PositionRecord, HEADER};

/// The append-only CSV log of detections.
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: PathBuf) -> Self {
        RecordStore { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read every record. One malformed row fails the whole load.
    pub fn load(&self) -> Result<Vec<PositionRecord>, StoreError> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        let records = read_records(file)?;
        debug!(
            "Loaded {} records from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }

    /// Create the file with its header line unless it already exists.
    pub fn ensure_header(&self) -> Result<bool, StoreError> {
        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(HEADER)?;
        writer.flush()?;
        info!("Created record store {}", self.path.display());
        Ok(true)
    }

    pub fn append(&self, records: &[PositionRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }
        self.ensure_header()?;

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        for record in records {
            writer.serialize(CsvRow::from(record))?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub fn read_records<R: Read>(input: R) -> Result<Vec<PositionRecord>, StoreError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    let mut raw = StringRecord::new();
    while reader.read_record(&mut raw)? {
        let line = raw.position().map(|p| p.line()).unwrap_or_default();
        if raw.len() != headers.len() {
            return Err(StoreError::Malformed {
                line,
                reason: format!("expected {} fields, found {}", headers.len(), raw.len()),
            });
        }
        let row: CsvRow = raw
            .deserialize(Some(&headers))
            .map_err(|e| StoreError::Malformed {
                line,
                reason: e.to_string(),
            })?;
        let record = row
            .into_record()
            .map_err(|reason| StoreError::Malformed { line, reason })?;
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::parse_timestamp;
    use chrono::NaiveDate;

    const LOG: &str = "\
timestamp,callsign,regis,hex,type,desc,alt,vspeed,lat,lon,track,dist,azimuth
2025-06-14T10:00:00,AFR12,F-GKXA,39c4a2,A320,L2J,3500,-640,48.61,2.70,271,1.2,80
2025-06-14T10:01:00,,,3c6444,C172,L1P,,,,,,,
2025-06-14T10:02:00Z,EZY45,G-EZAA,4006a1,A319,L2J,5200,0,48.58,2.64,90,2.5,200
";

    #[test]
    fn reads_rows_by_header_name() {
        let records = read_records(LOG.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.hex, "39c4a2");
        assert_eq!(first.callsign.as_deref(), Some("AFR12"));
        assert_eq!(first.registration.as_deref(), Some("F-GKXA"));
        assert_eq!(first.aircraft_type.as_deref(), Some("A320"));
        assert_eq!(first.description.as_deref(), Some("L2J"));
        assert_eq!(first.altitude_ft, Some(3500.0));
        assert_eq!(first.vertical_speed_fpm, Some(-640.0));
        assert_eq!(first.position(), Some((48.61, 2.70)));
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());

        let second = &records[1];
        assert_eq!(second.callsign, None);
        assert_eq!(second.altitude_ft, None);
        assert_eq!(second.position(), None);
    }

    #[test]
    fn column_order_does_not_matter() {
        let log = "hex,lon,lat,timestamp\nabc123,2.5,48.5,2025-06-14T10:00:00\n";
        let records = read_records(log.as_bytes()).unwrap();
        assert_eq!(records[0].position(), Some((48.5, 2.5)));
        assert_eq!(records[0].altitude_ft, None);
    }

    #[test]
    fn malformed_row_fails_with_line_number() {
        let log = format!("{LOG}not-a-date,X,,abc,,,,,1,2,,,\n");
        match read_records(log.as_bytes()) {
            Err(StoreError::Malformed { line, reason }) => {
                assert_eq!(line, 5);
                assert!(reason.contains("not-a-date"));
            }
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn truncated_row_is_malformed() {
        let log = format!("{LOG}2025-06-14T10:03:00,AFR12,F-GKXA,39c4a2,A320,L2J,3400,-640,48.6\n");
        match read_records(log.as_bytes()) {
            Err(StoreError::Malformed { line, reason }) => {
                assert_eq!(line, 5);
                assert!(reason.contains("found 9"), "got {reason}");
            }
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn appended_instants_survive_a_dst_fold() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));

        let mut records = read_records(LOG.as_bytes()).unwrap();
        records.truncate(2);
        records[0].timestamp = parse_timestamp("2025-10-26T00:50:00Z").unwrap();
        records[1].timestamp = parse_timestamp("2025-10-26T01:20:00Z").unwrap();
        store.append(&records).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded[0].timestamp, records[0].timestamp);
        assert_eq!(reloaded[1].timestamp, records[1].timestamp);
        assert!(reloaded[0].timestamp < reloaded[1].timestamp);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));
        assert!(!store.exists());
        assert!(matches!(store.load(), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));

        let records = read_records(LOG.as_bytes()).unwrap();
        store.append(&records[..1]).unwrap();
        store.append(&records[1..]).unwrap();
        assert!(!store.ensure_header().unwrap());

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.matches("timestamp,callsign").count(), 1);

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded[0], records[0]);
        assert_eq!(reloaded[1], records[1]);
        assert_eq!(reloaded[2].timestamp, records[2].timestamp);
    }

    #[test]
    fn empty_append_does_not_create_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records.csv"));
        store.append(&[]).unwrap();
        assert!(!store.exists());
    }
}
