//! The fixed field correspondence table between the SQL Server reporting
//! table and the destination table.

/// Source table in the `aggregated_reporting` database.
pub const SOURCE_TABLE: &str = "executive_report_new_month";

/// Destination table, fully replaced on every run.
pub const DESTINATION_TABLE: &str = "executive_monthly_reports";

/// Ordering of the source fetch: reporting month first, then the two
/// secondary dimensions.
pub const ORDER_KEYS: &[(&str, bool)] = &[
    ("month", true), // descending
    ("clinic", false),
    ("traffic_source", false),
];

/// Fields that identify a reporting row. A record carrying none of them is
/// unmappable.
pub const KEY_FIELDS: &[&str] = &["clinic", "month", "traffic_source"];

/// (destination column, source column), in declared destination order.
///
/// `%total_conversion` and `total_roas` each feed two destination columns.
/// That asymmetry is observed in the upstream mapping and preserved verbatim;
/// it is reported as a warning finding on every run rather than corrected.
pub const FIELD_MAP: &[(&str, &str)] = &[
    ("clinic", "clinic"),
    ("month", "month"),
    ("traffic_source", "traffic_source"),
    ("impressions", "impressions"),
    ("visits", "visits"),
    ("spend", "spend"),
    ("ltv", "ltv"),
    ("estimated_ltv_6m", "estimated_ltv_6m"),
    ("avg_ltv", "avg_ltv"),
    ("roas", "total_roas"),
    ("leads", "leads"),
    ("new_leads", "new_leads"),
    ("returning_leads", "returning_leads"),
    ("conversion_rate", "%total_conversion"),
    ("new_conversion", "%new_conversion"),
    ("returning_conversion", "%returning_conversion"),
    ("total_conversion", "%total_conversion"),
    ("cac_total", "cac_total"),
    ("cac_new", "cac_new"),
    ("appointments", "total_appointments"),
    ("new_appointments", "new_appointments"),
    ("returning_appointments", "returning_appointments"),
    ("online_booking", "online_booking"),
    ("conversations", "total_conversations"),
    ("new_conversations", "new_conversations"),
    ("returning_conversations", "returning_conversations"),
    ("total_estimated_revenue", "total_estimated_revenue"),
    ("new_estimated_revenue", "new_estimated_revenue"),
    ("total_roas", "total_roas"),
    ("new_roas", "new_roas"),
];

/// Destination column names in declared order.
pub fn destination_columns() -> Vec<String> {
    FIELD_MAP.iter().map(|(dest, _)| dest.to_string()).collect()
}

/// Source columns that feed more than one destination column, with the
/// destination columns they feed.
pub fn duplicated_sources() -> Vec<(String, Vec<String>)> {
    let mut duplicates = Vec::new();

    for (i, (_, source)) in FIELD_MAP.iter().enumerate() {
        // Report each duplicated source once, at its first occurrence.
        if FIELD_MAP[..i].iter().any(|(_, s)| s == source) {
            continue;
        }

        let dests: Vec<String> = FIELD_MAP
            .iter()
            .filter(|(_, s)| s == source)
            .map(|(d, _)| d.to_string())
            .collect();

        if dests.len() > 1 {
            duplicates.push((source.to_string(), dests));
        }
    }

    duplicates
}
