use std::collections::BTreeMap;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{ReportError, ReportErrorCode};
use crate::shape::{self, MASTER_SHIP_TYPES, MASTER_SHIPS, MASTER_SLOT_ITEMS, PORT_SHIPS};

/// Master-data placeholder entries carry this name instead of a real ship
/// identity and are excluded from the ship table.
pub const PLACEHOLDER_SHIP_NAME: &str = "なし";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipEntry {
    pub type_id: i64,
    pub name: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MasterTables {
    types: BTreeMap<i64, String>,
    ships: BTreeMap<i64, ShipEntry>,
    items: BTreeMap<i64, String>,
}

impl MasterTables {
    pub fn from_master_document(root: &JsonMap<String, JsonValue>) -> Result<Self, ReportError> {
        let mut tables = Self::default();

        for record in shape::records(root, &MASTER_SHIP_TYPES)? {
            let id = shape::require_i64(record, "api_id")?;
            let name = shape::require_str(record, "api_name")?;
            tables.types.insert(id, name.to_string());
        }

        for record in shape::records(root, &MASTER_SHIPS)? {
            let name = shape::require_str(record, "api_name")?;
            if name == PLACEHOLDER_SHIP_NAME {
                continue;
            }
            let id = shape::require_i64(record, "api_id")?;
            let type_id = shape::require_i64(record, "api_stype")?;
            tables.ships.insert(
                id,
                ShipEntry {
                    type_id,
                    name: name.to_string(),
                },
            );
        }

        for record in shape::records(root, &MASTER_SLOT_ITEMS)? {
            let id = shape::require_i64(record, "api_id")?;
            let name = shape::require_str(record, "api_name")?;
            tables.items.insert(id, name.to_string());
        }

        Ok(tables)
    }

    pub fn type_name(&self, type_id: i64) -> Result<&str, ReportError> {
        self.types.get(&type_id).map(String::as_str).ok_or_else(|| {
            ReportError::new(
                ReportErrorCode::Lookup,
                format!("unknown ship type id {type_id}"),
            )
        })
    }

    pub fn ship(&self, ship_id: i64) -> Result<&ShipEntry, ReportError> {
        self.ships.get(&ship_id).ok_or_else(|| {
            ReportError::new(ReportErrorCode::Lookup, format!("unknown ship id {ship_id}"))
        })
    }

    pub fn item_name(&self, template_id: i64) -> Option<&str> {
        self.items.get(&template_id).map(String::as_str)
    }

    pub fn types(&self) -> &BTreeMap<i64, String> {
        &self.types
    }

    pub fn ships(&self) -> &BTreeMap<i64, ShipEntry> {
        &self.ships
    }

    pub fn items(&self) -> &BTreeMap<i64, String> {
        &self.items
    }
}

/// Maps each equipped item instance id to the name of the ship holding it.
/// Ships are scanned in document order and a later entry overwrites an
/// earlier one; item instance ids are unique upstream, so a collision only
/// happens on invalid input and then the last ship wins.
pub fn build_equip_table(
    port_root: &JsonMap<String, JsonValue>,
    tables: &MasterTables,
) -> Result<BTreeMap<i64, String>, ReportError> {
    let mut equip = BTreeMap::new();
    for record in shape::records(port_root, &PORT_SHIPS)? {
        let ship_id = shape::require_i64(record, "api_ship_id")?;
        let holder = tables.ship(ship_id)?;
        for slot in shape::require_array(record, "api_slot")? {
            let item_id = shape::as_i64(slot).ok_or_else(|| {
                ReportError::new(
                    ReportErrorCode::Parse,
                    "api_slot entries must be integers",
                )
            })?;
            equip.insert(item_id, holder.name.clone());
        }
    }
    Ok(equip)
}
