//! Fixed manufacturer tables

/// Manufacturer that forces VLAN segmentation and never gets a cross-integration server
pub const NISSAN: &str = "NISSAN";

pub const RENAULT: &str = "RENAULT";

/// Manufacturer groups sharing one cross-integration backend
pub const MANUFACTURER_GROUPS: &[(&str, &[&str])] = &[
    ("PSA", &["PEUGEOT", "CITROEN", "DS", "OPEL"]),
    (
        "FCA",
        &[
            "FIAT",
            "FIAT (SOLO SERVICE)",
            "ALFA ROMEO",
            "ALFA ROMEO (SOLO SERVICE)",
            "LANCIA",
            "LANCIA (SOLO SERVICE)",
            "JEEP",
            "JEEP (SOLO SERVICE)",
            "ABARTH",
            "MASERATI",
        ],
    ),
    (
        "VGI",
        &[
            "VOLKSWAGEN",
            "AUDI",
            "SEAT",
            "CUPRA",
            "SKODA",
            "PORSCHE",
            "LAMBORGHINI",
            "BUGATTI",
        ],
    ),
    ("RENAULT", &["RENAULT", "DACIA", "ALPINE"]),
    ("JLR", &["JAGUAR", "LAND ROVER"]),
];

/// Group label of a brand, if it belongs to one of the manufacturer groups
pub fn group_for(brand: &str) -> Option<&'static str> {
    MANUFACTURER_GROUPS
        .iter()
        .find(|(_, members)| members.contains(&brand))
        .map(|(group, _)| *group)
}

/// True when the label names a manufacturer group
pub fn is_group(label: &str) -> bool {
    MANUFACTURER_GROUPS.iter().any(|(group, _)| *group == label)
}

/// Brands of the PSA group
pub fn is_psa(brand: &str) -> bool {
    group_for(brand) == Some("PSA")
}
