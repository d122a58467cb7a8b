use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::info;

/// Brings raw task records up to the current schema.
///
/// A missing `priority` becomes `"medium"`, a missing `dueDate` becomes null
/// and a missing or null `createdAt` becomes `now`. Other fields that are
/// present, even as null, are left alone. Returns whether any record changed;
/// running it again on its own output changes nothing.
pub fn migrate_tasks(records: &mut [Value], now: DateTime<Utc>) -> bool {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    let mut changed = 0usize;
    for record in records.iter_mut() {
        if let Value::Object(fields) = record {
            if fill_missing(fields, &stamp) {
                changed += 1;
            }
        }
    }
    if changed > 0 {
        info!(changed, "migrated task records to the current schema");
    }
    changed > 0
}

fn fill_missing(fields: &mut Map<String, Value>, stamp: &str) -> bool {
    let mut changed = false;
    if !fields.contains_key("priority") {
        fields.insert("priority".into(), Value::from("medium"));
        changed = true;
    }
    if !fields.contains_key("dueDate") {
        fields.insert("dueDate".into(), Value::Null);
        changed = true;
    }
    if fields.get("createdAt").map_or(true, Value::is_null) {
        fields.insert("createdAt".into(), Value::from(stamp));
        changed = true;
    }
    changed
}
