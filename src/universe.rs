//! Work items rated by the AAA calculator and their source/destination names.

/// Sectors rated on fundamental analysis data.
pub const FA_SECTORS: [&str; 11] = [
    "basicmaterials",
    "communicationservices",
    "consumercyclical",
    "consumerdefensive",
    "energy",
    "financial",
    "healthcare",
    "industrials",
    "realestate",
    "technology",
    "utilities",
];

/// Market-capitalization indexes.
pub const INDEXES: [&str; 6] = ["SnP500", "MegaCap", "LargeCap", "MidCap", "SmallCap", "MicroCap"];

/// Item covering the whole universe.
pub const ALL: &str = "all";

/// Source identifier for an item, e.g. `AAA - energy.csv`.
pub fn source_name(item: &str) -> String {
    format!("AAA - {item}.csv")
}

/// Destination identifier for an item, e.g. `AAA_energy`.
pub fn destination_name(item: &str) -> String {
    format!("AAA_{item}")
}
