/// Pollution categories the classifier is asked to choose from.
pub const POLLUTION_TYPES: [&str; 11] = [
    "air pollution",
    "water pollution",
    "soil pollution",
    "noise pollution",
    "oil spill",
    "chemical spill",
    "waste dumping",
    "sewage overflow",
    "industrial emission",
    "plastic pollution",
    "radioactive contamination",
];

/// Agency assigned when no mapping matches.
pub const DEFAULT_AGENCY: &str = "Environmental Protection Agency (EPA)";

const AGENCY_MAP: [(&str, &str); 11] = [
    ("air pollution", "Environmental Protection Agency (EPA)"),
    ("water pollution", "EPA Water Quality Division"),
    ("oil spill", "Coast Guard and EPA"),
    ("chemical spill", "EPA Emergency Response Team"),
    ("waste dumping", "Local Environmental Health Department"),
    ("sewage overflow", "Municipal Water Authority"),
    ("industrial emission", "EPA Air Quality Management"),
    ("noise pollution", "Local Environmental Control Board"),
    ("soil pollution", "EPA Superfund Division"),
    ("plastic pollution", "EPA Waste Management Division"),
    ("radioactive contamination", "Nuclear Regulatory Commission (NRC)"),
];

/// Resolve the agency responsible for a pollution type.
///
/// The mapping is authoritative: model output never overrides it. Exact
/// match first, then substring match against the table keys, then the
/// default agency.
pub fn responsible_agency_for(pollution_type: &str) -> &'static str {
    let needle = pollution_type.trim().to_lowercase();

    for (key, agency) in AGENCY_MAP {
        if key == needle {
            return agency;
        }
    }

    for (key, agency) in AGENCY_MAP {
        if needle.contains(key) {
            return agency;
        }
    }

    DEFAULT_AGENCY
}
