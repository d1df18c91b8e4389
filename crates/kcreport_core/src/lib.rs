pub mod dump;
pub mod error;
pub mod loader;
pub mod report;
pub mod shape;
pub mod tables;

pub use dump::dump_value;
pub use error::{ReportError, ReportErrorCode};
pub use loader::load_document;
pub use report::{
    FLEET_REPORT_HEADER, SLOT_ITEM_HEADER, export_master_tables, format_repair_time,
    write_fleet_report, write_slot_item_report,
};
pub use shape::CollectionShape;
pub use tables::{MasterTables, PLACEHOLDER_SHIP_NAME, ShipEntry, build_equip_table};
