use serde_json::Value;

use crate::{payload::DEVICE_ID_KEY, report::ScanReport};

const FIXED_COLUMNS: [&str; 7] = [
    "Module ID",
    "QR Code Data",
    "Center X",
    "Center Y",
    "Width",
    "Height",
    "Device ID",
];

/// Renders the modules of a report as a CSV table, one row per module.
///
/// After the fixed columns, every device info key other than `device_id` gets a
/// `Device <Key>` column, in first-seen order across the modules. Cells of keys a module
/// does not have are left empty; a module without a device id gets `N/A`.
pub fn to_csv(report: &ScanReport) -> String {
    let mut extra_keys: Vec<String> = Vec::new();
    for module in &report.modules {
        for key in module.device_info.to_map().keys() {
            if key != DEVICE_ID_KEY && !extra_keys.contains(key) {
                extra_keys.push(key.clone());
            }
        }
    }

    let mut out = String::new();

    let header = FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(extra_keys.iter().map(|k| format!("Device {}", title_case(k))));
    push_row(&mut out, header);

    for module in &report.modules {
        let info = module.device_info.to_map();
        let pos = &module.position;

        let fixed = [
            module.module_id.to_string(),
            module.qr_code_data.clone(),
            pos.center.x.to_string(),
            pos.center.y.to_string(),
            pos.bounding_box.width.to_string(),
            pos.bounding_box.height.to_string(),
            info.get(DEVICE_ID_KEY)
                .map(cell)
                .unwrap_or_else(|| "N/A".to_string()),
        ];
        let extra = extra_keys
            .iter()
            .map(|k| info.get(k).map(cell).unwrap_or_default());

        push_row(&mut out, fixed.into_iter().chain(extra));
    }

    out
}

fn push_row(out: &mut String, fields: impl Iterator<Item = String>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&quote(&field));
    }
    out.push('\n');
}

/// Quotes a field when it holds a delimiter, a quote or a line break.
fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Upper-cases the first letter of every word and lower-cases the rest, where a word is
/// a run of letters.
fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_word = false;
    for c in key.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
