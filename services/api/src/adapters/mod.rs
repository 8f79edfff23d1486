pub mod db;
pub mod snapshot_files;

pub use db::DbAdapter;
pub use snapshot_files::JsonFileSnapshotWriter;
