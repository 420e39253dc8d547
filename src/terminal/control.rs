// ==========================================
// Inventory Count Automation - control descriptors
// ==========================================
// A control is located by role plus accessible name, the same way an
// accessibility-tree adapter would query it. The core only ever uses
// the named constants below.
// ==========================================

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Textbox,
    Button,
    Checkbox,
    Cell,
    Row,
    Dialog,
    Radio,
    DialogButton,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Textbox => "textbox",
            Role::Button => "button",
            Role::Checkbox => "checkbox",
            Role::Cell => "cell",
            Role::Row => "row",
            Role::Dialog => "dialog",
            Role::Radio => "radio",
            Role::DialogButton => "dialogbutton",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Control {
    pub role: Role,
    pub name: Cow<'static, str>,
}

impl Control {
    pub const fn new(role: Role, name: &'static str) -> Self {
        Self {
            role,
            name: Cow::Borrowed(name),
        }
    }

    /// Control whose name is only known at run time (e.g. a variant row).
    pub fn named(role: Role, name: impl Into<String>) -> Self {
        Self {
            role,
            name: Cow::Owned(name.into()),
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "role:{}|name:{}", self.role, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    F8,
    Escape,
    SelectAll,
    Delete,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Key::Enter => "Enter",
            Key::F8 => "F8",
            Key::Escape => "Escape",
            Key::SelectAll => "Control+A",
            Key::Delete => "Delete",
        };
        f.write_str(s)
    }
}

pub mod controls {
    use super::{Control, Role};

    // ===== Session =====
    pub const TRANSACTION_FIELD: Control = Control::new(Role::Textbox, "Enter transaction code");
    pub const SYSTEM_MESSAGES: Control = Control::new(Role::Dialog, "System Messages");

    // ===== Inventory entry =====
    pub const WAREHOUSE_FIELD: Control = Control::new(Role::Textbox, "Warehouse Number");
    pub const INVENTORY_FIELD: Control = Control::new(Role::Textbox, "Number of system inventory");
    pub const SINGLE_RECORD_BUTTON: Control = Control::new(Role::Button, "Single Record Entry");
    pub const STORAGE_BIN_FIELD: Control = Control::new(Role::Textbox, "Storage Bin");
    pub const MATERIAL_FIELD: Control = Control::new(Role::Textbox, "Material Number");
    pub const QUANTITY_FIELD: Control = Control::new(
        Role::Textbox,
        "Counted quantity in alternative unit of measure",
    );
    pub const STORAGE_LOCATION_FIELD: Control = Control::new(Role::Textbox, "Storage Location");
    pub const PLANT_FIELD: Control = Control::new(Role::Textbox, "Plant");
    pub const ZERO_STOCK_TOGGLE: Control = Control::new(Role::Checkbox, "Zero stock");
    pub const CANCEL_BUTTON: Control = Control::new(Role::Button, "Cancel");
    pub const SAVE_BUTTON: Control = Control::new(Role::Button, "Save");
    pub const YES_BUTTON: Control = Control::new(Role::DialogButton, "Yes");

    // ===== Storage-type processing =====
    pub const STORAGE_TYPE_FIELD: Control = Control::new(Role::Textbox, "Storage Type");
    pub const GET_VARIANT_BUTTON: Control = Control::new(Role::Button, "Get Variant...");
    pub const CHOOSE_BUTTON: Control = Control::new(Role::DialogButton, "Choose (F2)");
    pub const TRANSFER_ACTIVE_CELL: Control = Control::new(Role::Cell, "Transfer active");
    pub const ACTIVATE_BUTTON: Control = Control::new(Role::Button, "Activate");
    pub const EXIT_BUTTON: Control = Control::new(Role::Button, "Exit");

    // ===== Background batch queue =====
    pub const BATCH_FIRST_ROW: Control = Control::new(Role::Row, "Session 1");
    pub const PROCESS_BUTTON: Control = Control::new(Role::Button, "Process");
    pub const BACKGROUND_OPTION: Control = Control::new(Role::Radio, "Background");
    pub const PROCESS_CONFIRM_BUTTON: Control = Control::new(Role::DialogButton, "Process");

    pub fn variant_row(variant: &str) -> Control {
        Control::named(Role::Cell, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_role_name_selector() {
        assert_eq!(
            controls::STORAGE_BIN_FIELD.to_string(),
            "role:textbox|name:Storage Bin"
        );
        assert_eq!(controls::variant_row("MMS3CA").to_string(), "role:cell|name:MMS3CA");
    }

    #[test]
    fn test_role_distinguishes_same_name() {
        assert_ne!(controls::PROCESS_BUTTON, controls::PROCESS_CONFIRM_BUTTON);
        assert_eq!(
            controls::variant_row("X"),
            Control::named(Role::Cell, "X".to_string())
        );
    }
}
