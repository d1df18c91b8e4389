use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{ReportError, ReportErrorCode};
use crate::shape::{self, PORT_SHIPS, SLOT_ITEM_LIST};
use crate::tables::MasterTables;

pub const FLEET_REPORT_HEADER: [&str; 10] = [
    "遠征回数",
    "疲労",
    "名",
    "艦種",
    "レベル",
    "状態",
    "EXP",
    "修理資源",
    "修理時間",
    "艦種id",
];

pub const SLOT_ITEM_HEADER: [&str; 4] = ["ID", "ITEMID", "名前", "装備艦"];

const LEVEL_CELL: usize = 4;
const TYPE_ID_CELL: usize = 9;

/// Builds the expedition-fatigue fleet report: one row per ship in the
/// port document, sorted by type id then level, with the first two cells
/// holding spreadsheet formulas keyed to each row's final position.
pub fn write_fleet_report<W: Write>(
    out: W,
    port_root: &JsonMap<String, JsonValue>,
    tables: &MasterTables,
) -> Result<(), ReportError> {
    let mut rows = Vec::new();
    for record in shape::records(port_root, &PORT_SHIPS)? {
        rows.push(fleet_row(record, tables)?);
    }
    sort_fleet_rows(&mut rows);
    inject_formulas(&mut rows);
    write_csv(out, &FLEET_REPORT_HEADER, &rows)
}

pub fn write_slot_item_report<W: Write>(
    out: W,
    item_root: &JsonMap<String, JsonValue>,
    tables: &MasterTables,
    equip: &BTreeMap<i64, String>,
) -> Result<(), ReportError> {
    let mut rows = Vec::new();
    for record in shape::records(item_root, &SLOT_ITEM_LIST)? {
        let instance_id = shape::require_i64(record, "api_id")?;
        let template_id = shape::require_i64(record, "api_slotitem_id")?;
        // Items sitting in the depot have no holder; that is a blank cell,
        // not an error. Same for template ids absent from the item master.
        let name = tables.item_name(template_id).unwrap_or("");
        let holder = equip.get(&instance_id).map(String::as_str).unwrap_or("");
        rows.push(vec![
            template_id.to_string(),
            instance_id.to_string(),
            name.to_string(),
            holder.to_string(),
        ]);
    }
    rows.sort_by(|a, b| {
        numeric_cell(a, 0)
            .cmp(&numeric_cell(b, 0))
            .then_with(|| numeric_cell(a, 1).cmp(&numeric_cell(b, 1)))
    });
    write_csv(out, &SLOT_ITEM_HEADER, &rows)
}

/// Writes `type_master.txt`, `ship_master.txt` and `item_master.txt` into
/// `dir` as fixed-width comma-separated text, ascending by id.
pub fn export_master_tables(tables: &MasterTables, dir: &Path) -> Result<(), ReportError> {
    let mut types = String::new();
    for (id, name) in tables.types() {
        let _ = writeln!(types, "{id:>6},{name}");
    }
    write_text_file(&dir.join("type_master.txt"), &types)?;

    let mut ships = String::new();
    for (id, entry) in tables.ships() {
        let type_name = tables
            .types()
            .get(&entry.type_id)
            .map(String::as_str)
            .unwrap_or("");
        let _ = writeln!(ships, "{id:>6},{type_name:<10},{}", entry.name);
    }
    write_text_file(&dir.join("ship_master.txt"), &ships)?;

    let mut items = String::new();
    for (id, name) in tables.items() {
        let _ = writeln!(items, "{id:>6},{name}");
    }
    write_text_file(&dir.join("item_master.txt"), &items)
}

pub fn format_repair_time(milliseconds: i64) -> String {
    if milliseconds <= 0 {
        return String::new();
    }
    let hours = milliseconds / 3_600_000;
    let minutes = (milliseconds - hours * 3_600_000) / 60_000;
    let seconds = (milliseconds - hours * 3_600_000 - minutes * 60_000) / 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

fn fleet_row(
    record: &JsonMap<String, JsonValue>,
    tables: &MasterTables,
) -> Result<Vec<String>, ReportError> {
    let ship_id = shape::require_i64(record, "api_ship_id")?;
    let ship = tables.ship(ship_id)?;
    let type_name = tables.type_name(ship.type_id)?;

    let level = cell_text(shape::require_value(record, "api_lv")?);
    let status = cell_text(shape::require_value(record, "api_cond")?);

    // api_exp is [current total, progress to next level]; only the second
    // element goes into the report.
    let exp = shape::require_array(record, "api_exp")?;
    let exp_to_next = exp.get(1).map(cell_text).ok_or_else(|| {
        ReportError::new(
            ReportErrorCode::Parse,
            "api_exp must hold at least two elements",
        )
    })?;

    let ndock_item = shape::require_array(record, "api_ndock_item")?;
    let fuel = ndock_item.first().and_then(shape::as_i64).unwrap_or(0);
    let steel = ndock_item.get(1).and_then(shape::as_i64).unwrap_or(0);
    let repair_resource = if fuel > 0 || steel > 0 {
        JsonValue::Array(ndock_item.to_vec()).to_string()
    } else {
        String::new()
    };

    let repair_time = format_repair_time(shape::require_i64(record, "api_ndock_time")?);

    Ok(vec![
        String::new(),
        String::new(),
        ship.name.clone(),
        type_name.to_string(),
        level,
        status,
        exp_to_next,
        repair_resource,
        repair_time,
        ship.type_id.to_string(),
    ])
}

fn sort_fleet_rows(rows: &mut [Vec<String>]) {
    rows.sort_by(|a, b| {
        numeric_cell(a, TYPE_ID_CELL)
            .cmp(&numeric_cell(b, TYPE_ID_CELL))
            .then_with(|| numeric_cell(b, LEVEL_CELL).cmp(&numeric_cell(a, LEVEL_CELL)))
    });
}

/// The formulas reference column F (status/fatigue) of their own sheet
/// row; data starts on sheet row 2, below the header.
fn inject_formulas(rows: &mut [Vec<String>]) {
    for (position, row) in rows.iter_mut().enumerate() {
        let sheet_row = position + 2;
        row[0] = expedition_formula(sheet_row);
        row[1] = fatigue_formula(sheet_row);
    }
}

fn expedition_formula(sheet_row: usize) -> String {
    format!("=IF(F{sheet_row}>49,ROUNDUP((F{sheet_row}-49)/3),\"\")")
}

fn fatigue_formula(sheet_row: usize) -> String {
    format!("=IF(F{sheet_row}<49,49-F{sheet_row},\"\")")
}

/// Sort keys are convenience, not contract: unparseable cell text counts
/// as zero instead of failing the run.
fn numeric_cell(row: &[String], index: usize) -> i64 {
    row.get(index)
        .and_then(|cell| cell.parse::<i64>().ok())
        .unwrap_or(0)
}

fn cell_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn write_csv<W: Write>(
    out: W,
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    writer
        .flush()
        .map_err(|e| ReportError::new(ReportErrorCode::Csv, format!("failed to flush csv: {e}")))
}

fn csv_error(e: csv::Error) -> ReportError {
    ReportError::new(ReportErrorCode::Csv, format!("failed to write csv: {e}"))
}

fn write_text_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|e| {
        ReportError::new(
            ReportErrorCode::Io,
            format!("failed to write {}: {e}", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        expedition_formula, fatigue_formula, fleet_row, format_repair_time, inject_formulas,
        sort_fleet_rows,
    };
    use crate::error::ReportErrorCode;
    use crate::tables::MasterTables;

    fn master_tables() -> MasterTables {
        let root = json!({
            "api_data": {
                "api_mst_stype": [{"api_id": 2, "api_name": "駆逐艦"}],
                "api_mst_ship": [{"api_id": 1, "api_name": "睦月", "api_stype": 2}],
                "api_mst_slotitem": [],
            },
        });
        let root = root.as_object().expect("fixture root should be an object");
        MasterTables::from_master_document(root).expect("master fixture should build")
    }

    fn row(type_id: i64, level: i64) -> Vec<String> {
        let mut row = vec![String::new(); 10];
        row[4] = level.to_string();
        row[9] = type_id.to_string();
        row
    }

    #[test]
    fn repair_time_formats_hh_mm_ss() {
        assert_eq!(format_repair_time(3_723_000), "01:02:03");
        assert_eq!(format_repair_time(0), "");
        assert_eq!(format_repair_time(360_000_000), "100:00:00");
    }

    #[test]
    fn rows_sort_by_type_id_then_level_descending() {
        let mut rows = vec![row(2, 10), row(1, 5), row(2, 20)];
        sort_fleet_rows(&mut rows);
        let keys: Vec<(i64, i64)> = rows
            .iter()
            .map(|r| (r[9].parse().expect("type id"), r[4].parse().expect("level")))
            .collect();
        assert_eq!(keys, vec![(1, 5), (2, 20), (2, 10)]);
    }

    #[test]
    fn unparseable_sort_keys_count_as_zero() {
        let mut rows = vec![row(3, 1), row(1, 1)];
        rows[1][9] = "not a number".to_string();
        sort_fleet_rows(&mut rows);
        assert_eq!(rows[0][9], "not a number");
        assert_eq!(rows[1][9], "3");
    }

    #[test]
    fn formulas_reference_the_sheet_row_below_the_header() {
        assert_eq!(
            expedition_formula(5),
            "=IF(F5>49,ROUNDUP((F5-49)/3),\"\")"
        );
        assert_eq!(fatigue_formula(5), "=IF(F5<49,49-F5,\"\")");

        let mut rows = vec![row(1, 1), row(1, 1), row(1, 1), row(1, 1)];
        inject_formulas(&mut rows);
        assert_eq!(rows[3][0], "=IF(F5>49,ROUNDUP((F5-49)/3),\"\")");
        assert_eq!(rows[3][1], "=IF(F5<49,49-F5,\"\")");
        assert_eq!(rows[0][0], "=IF(F2>49,ROUNDUP((F2-49)/3),\"\")");
    }

    #[test]
    fn fleet_row_projects_the_fixed_cells() {
        let tables = master_tables();
        let record = json!({
            "api_ship_id": 1,
            "api_lv": 52,
            "api_cond": 71,
            "api_exp": [153450, 4550],
            "api_ndock_item": [30, 15],
            "api_ndock_time": 3_723_000,
        });
        let record = record.as_object().expect("fixture should be an object");
        let row = fleet_row(record, &tables).expect("row should build");
        assert_eq!(
            row,
            vec![
                "".to_string(),
                "".to_string(),
                "睦月".to_string(),
                "駆逐艦".to_string(),
                "52".to_string(),
                "71".to_string(),
                "4550".to_string(),
                "[30,15]".to_string(),
                "01:02:03".to_string(),
                "2".to_string(),
            ]
        );
    }

    #[test]
    fn fleet_row_suppresses_zero_repair_fields() {
        let tables = master_tables();
        let record = json!({
            "api_ship_id": 1,
            "api_lv": 1,
            "api_cond": 49,
            "api_exp": [0, 100],
            "api_ndock_item": [0, 0],
            "api_ndock_time": 0,
        });
        let record = record.as_object().expect("fixture should be an object");
        let row = fleet_row(record, &tables).expect("row should build");
        assert_eq!(row[7], "");
        assert_eq!(row[8], "");
    }

    #[test]
    fn fleet_row_fails_on_unknown_ship_id() {
        let tables = master_tables();
        let record = json!({
            "api_ship_id": 999,
            "api_lv": 1,
            "api_cond": 49,
            "api_exp": [0, 100],
            "api_ndock_item": [0, 0],
            "api_ndock_time": 0,
        });
        let record = record.as_object().expect("fixture should be an object");
        let err = fleet_row(record, &tables).expect_err("unknown ship id should fail");
        assert_eq!(err.code, ReportErrorCode::Lookup);
    }

    #[test]
    fn fleet_row_fails_on_short_exp_array() {
        let tables = master_tables();
        let record = json!({
            "api_ship_id": 1,
            "api_lv": 1,
            "api_cond": 49,
            "api_exp": [0],
            "api_ndock_item": [0, 0],
            "api_ndock_time": 0,
        });
        let record = record.as_object().expect("fixture should be an object");
        let err = fleet_row(record, &tables).expect_err("short api_exp should fail");
        assert_eq!(err.code, ReportErrorCode::Parse);
    }
}
