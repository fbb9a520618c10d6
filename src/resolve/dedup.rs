use super::record::CallRecord;
use std::collections::BTreeMap;

/// Collapse records with the same (url, method, service) ignoring case.
/// The earliest record of each group is kept and the result is sorted by
/// that key, so the output order does not depend on the input order.
pub fn dedup_records(records: Vec<CallRecord>) -> Vec<CallRecord> {
    let mut unique: BTreeMap<(String, String, String), CallRecord> = BTreeMap::new();
    for record in records {
        unique.entry(record.dedup_key()).or_insert(record);
    }
    unique.into_values().collect()
}
