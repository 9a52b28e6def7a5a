mod error;
mod record;
mod storage;

pub use error::StoreError;
pub use record::{parse_timestamp, PositionRecord, HEADER};
pub use storage::RecordStore;
