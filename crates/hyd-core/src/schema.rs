//! Static section-schema registry for the INP dialects.
//!
//! Declarative knowledge of the known section names, their column layouts and
//! per-dialect variants. Schemas are plain static tables built once at first
//! use; nothing here touches parsing or serialization, so new section types
//! can be registered without changing the tokenizer or the writers.
//!
//! Lookup is case-insensitive. Section names absent from the registry are
//! handled by the builder as *opaque* sections (retained verbatim), never as
//! a fatal condition.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::Dialect;

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Int,
    Real,
}

/// Semantic role of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Uniquely identifies a row within its section.
    PrimaryKey,
    /// Soft link to the primary key of a row in one of the listed sections.
    Reference(&'static [&'static str]),
    /// Plain data field.
    Scalar,
}

/// One ordered column of a tabular section.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub role: FieldRole,
    pub required: bool,
}

/// Structural kind of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    /// Ordered data rows split into schema-declared columns.
    Tabular,
    /// `KEY  VALUE...` settings rows (OPTIONS, TIMES, REPORT, ...).
    KeyValue,
    /// Retained verbatim, no column structure (TITLE, CONTROLS, ...).
    FreeText,
}

/// Schema for a single named section.
#[derive(Debug, Clone, Copy)]
pub struct SectionSchema {
    pub name: &'static str,
    pub kind: SectionKind,
    pub fields: &'static [FieldSpec],
    /// The last field absorbs all remaining tokens (patterns, curves, series).
    pub greedy_tail: bool,
}

impl SectionSchema {
    /// Index of the primary-key field, if the schema defines one.
    pub fn primary_key(&self) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| matches!(f.role, FieldRole::PrimaryKey))
    }

    /// Look up a field spec by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields carrying a reference role, with their target section lists.
    pub fn reference_fields(
        &self,
    ) -> impl Iterator<Item = (&'static FieldSpec, &'static [&'static str])> {
        self.fields.iter().filter_map(|f| match f.role {
            FieldRole::Reference(targets) => Some((f, targets)),
            _ => None,
        })
    }
}

/// Canonical (registry) form of a section name.
pub fn canonical_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

/// Look up the schema for a section in the given dialect.
///
/// Returns `None` for unknown sections, which callers treat as opaque.
pub fn schema_for(dialect: Dialect, name: &str) -> Option<&'static SectionSchema> {
    let canonical = canonical_name(name);
    registry(dialect).get(canonical.as_str()).copied()
}

/// Section names holding network nodes for the dialect.
pub fn node_sections(dialect: Dialect) -> &'static [&'static str] {
    match dialect {
        Dialect::Epanet => EPANET_NODE_SECTIONS,
        Dialect::Swmm => SWMM_NODE_SECTIONS,
    }
}

/// Section names holding network links for the dialect.
pub fn link_sections(dialect: Dialect) -> &'static [&'static str] {
    match dialect {
        Dialect::Epanet => EPANET_LINK_SECTIONS,
        Dialect::Swmm => SWMM_LINK_SECTIONS,
    }
}

const EPANET_NODE_SECTIONS: &[&str] = &["JUNCTIONS", "RESERVOIRS", "TANKS"];
const EPANET_LINK_SECTIONS: &[&str] = &["PIPES", "PUMPS", "VALVES"];
const SWMM_NODE_SECTIONS: &[&str] = &["JUNCTIONS", "OUTFALLS", "DIVIDERS", "STORAGE"];
const SWMM_LINK_SECTIONS: &[&str] = &["CONDUITS", "PUMPS", "ORIFICES", "WEIRS", "OUTLETS"];

const fn key(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Text,
        role: FieldRole::PrimaryKey,
        required: true,
    }
}

const fn real(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Real,
        role: FieldRole::Scalar,
        required: true,
    }
}

const fn opt_real(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Real,
        role: FieldRole::Scalar,
        required: false,
    }
}

const fn opt_int(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Int,
        role: FieldRole::Scalar,
        required: false,
    }
}

const fn text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Text,
        role: FieldRole::Scalar,
        required: true,
    }
}

const fn opt_text(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Text,
        role: FieldRole::Scalar,
        required: false,
    }
}

const fn reference(name: &'static str, targets: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        name,
        ty: FieldType::Text,
        role: FieldRole::Reference(targets),
        required: true,
    }
}

/// Fields of a KEY VALUE settings row.
const KV_FIELDS: &[FieldSpec] = &[key("key"), opt_text("value")];

const fn key_value(name: &'static str) -> SectionSchema {
    SectionSchema {
        name,
        kind: SectionKind::KeyValue,
        fields: KV_FIELDS,
        greedy_tail: true,
    }
}

const fn free_text(name: &'static str) -> SectionSchema {
    SectionSchema {
        name,
        kind: SectionKind::FreeText,
        fields: &[],
        greedy_tail: false,
    }
}

const fn tabular(name: &'static str, fields: &'static [FieldSpec]) -> SectionSchema {
    SectionSchema {
        name,
        kind: SectionKind::Tabular,
        fields,
        greedy_tail: false,
    }
}

const fn tabular_greedy(name: &'static str, fields: &'static [FieldSpec]) -> SectionSchema {
    SectionSchema {
        name,
        kind: SectionKind::Tabular,
        fields,
        greedy_tail: true,
    }
}

static EPANET_SCHEMAS: &[SectionSchema] = &[
    free_text("TITLE"),
    tabular(
        "JUNCTIONS",
        &[
            key("name"),
            real("elevation"),
            opt_real("demand"),
            opt_text("pattern"),
        ],
    ),
    tabular(
        "RESERVOIRS",
        &[key("name"), real("head"), opt_text("pattern")],
    ),
    tabular(
        "TANKS",
        &[
            key("name"),
            real("elevation"),
            real("init_level"),
            real("min_level"),
            real("max_level"),
            real("diameter"),
            opt_real("min_volume"),
            opt_text("volume_curve"),
            opt_text("overflow"),
        ],
    ),
    tabular(
        "PIPES",
        &[
            key("name"),
            reference("node1", EPANET_NODE_SECTIONS),
            reference("node2", EPANET_NODE_SECTIONS),
            real("length"),
            real("diameter"),
            real("roughness"),
            opt_real("minor_loss"),
            opt_text("status"),
        ],
    ),
    tabular_greedy(
        "PUMPS",
        &[
            key("name"),
            reference("node1", EPANET_NODE_SECTIONS),
            reference("node2", EPANET_NODE_SECTIONS),
            opt_text("properties"),
        ],
    ),
    tabular(
        "VALVES",
        &[
            key("name"),
            reference("node1", EPANET_NODE_SECTIONS),
            reference("node2", EPANET_NODE_SECTIONS),
            real("diameter"),
            text("valve_type"),
            real("setting"),
            opt_real("minor_loss"),
        ],
    ),
    tabular(
        "DEMANDS",
        &[
            reference("junction", &["JUNCTIONS"]),
            real("demand"),
            opt_text("pattern"),
            opt_text("category"),
        ],
    ),
    tabular(
        "STATUS",
        &[reference("link", EPANET_LINK_SECTIONS), text("status")],
    ),
    tabular_greedy("PATTERNS", &[text("name"), opt_text("multipliers")]),
    tabular("CURVES", &[text("name"), real("x"), real("y")]),
    free_text("CONTROLS"),
    free_text("RULES"),
    key_value("ENERGY"),
    tabular(
        "EMITTERS",
        &[reference("junction", &["JUNCTIONS"]), real("coefficient")],
    ),
    tabular(
        "QUALITY",
        &[reference("node", EPANET_NODE_SECTIONS), real("init_quality")],
    ),
    tabular_greedy(
        "SOURCES",
        &[
            reference("node", EPANET_NODE_SECTIONS),
            text("source_type"),
            real("strength"),
            opt_text("pattern"),
        ],
    ),
    key_value("REACTIONS"),
    tabular(
        "MIXING",
        &[
            reference("tank", &["TANKS"]),
            text("model"),
            opt_real("fraction"),
        ],
    ),
    key_value("TIMES"),
    key_value("REPORT"),
    key_value("OPTIONS"),
    tabular(
        "COORDINATES",
        &[reference("node", EPANET_NODE_SECTIONS), real("x"), real("y")],
    ),
    tabular(
        "VERTICES",
        &[reference("link", EPANET_LINK_SECTIONS), real("x"), real("y")],
    ),
    free_text("LABELS"),
    free_text("BACKDROP"),
    tabular("TAGS", &[text("object"), text("name"), text("tag")]),
];

static SWMM_SCHEMAS: &[SectionSchema] = &[
    free_text("TITLE"),
    key_value("OPTIONS"),
    key_value("REPORT"),
    free_text("FILES"),
    tabular_greedy(
        "RAINGAGES",
        &[
            key("name"),
            text("format"),
            text("interval"),
            real("scf"),
            opt_text("source"),
        ],
    ),
    key_value("EVAPORATION"),
    tabular(
        "SUBCATCHMENTS",
        &[
            key("name"),
            reference("raingage", &["RAINGAGES"]),
            reference("outlet", SWMM_NODE_SECTIONS),
            real("area"),
            real("imperv_pct"),
            real("width"),
            real("slope"),
            opt_real("curb_length"),
            opt_text("snow_pack"),
        ],
    ),
    tabular(
        "SUBAREAS",
        &[
            reference("subcatchment", &["SUBCATCHMENTS"]),
            real("n_imperv"),
            real("n_perv"),
            real("s_imperv"),
            real("s_perv"),
            real("pct_zero"),
            opt_text("route_to"),
            opt_real("pct_routed"),
        ],
    ),
    tabular_greedy(
        "INFILTRATION",
        &[
            reference("subcatchment", &["SUBCATCHMENTS"]),
            real("param1"),
            real("param2"),
            real("param3"),
            opt_text("extra"),
        ],
    ),
    tabular(
        "JUNCTIONS",
        &[
            key("name"),
            real("elevation"),
            opt_real("depth_max"),
            opt_real("depth_init"),
            opt_real("depth_surcharge"),
            opt_real("area_ponded"),
        ],
    ),
    tabular_greedy(
        "OUTFALLS",
        &[
            key("name"),
            real("elevation"),
            text("kind"),
            opt_text("data"),
        ],
    ),
    tabular_greedy(
        "DIVIDERS",
        &[
            key("name"),
            real("elevation"),
            reference("link", &["CONDUITS"]),
            text("kind"),
            opt_text("data"),
        ],
    ),
    tabular_greedy(
        "STORAGE",
        &[
            key("name"),
            real("elevation"),
            real("depth_max"),
            real("depth_init"),
            text("kind"),
            opt_text("data"),
        ],
    ),
    tabular(
        "CONDUITS",
        &[
            key("name"),
            reference("from_node", SWMM_NODE_SECTIONS),
            reference("to_node", SWMM_NODE_SECTIONS),
            real("length"),
            real("roughness"),
            opt_real("offset_upstream"),
            opt_real("offset_downstream"),
            opt_real("flow_initial"),
            opt_real("flow_max"),
        ],
    ),
    tabular_greedy(
        "PUMPS",
        &[
            key("name"),
            reference("from_node", SWMM_NODE_SECTIONS),
            reference("to_node", SWMM_NODE_SECTIONS),
            text("pump_curve"),
            opt_text("status"),
            opt_real("depth_on"),
            opt_real("depth_off"),
        ],
    ),
    tabular_greedy(
        "ORIFICES",
        &[
            key("name"),
            reference("from_node", SWMM_NODE_SECTIONS),
            reference("to_node", SWMM_NODE_SECTIONS),
            text("orientation"),
            real("offset"),
            real("discharge_coefficient"),
            opt_text("has_flap_gate"),
            opt_real("close_time"),
        ],
    ),
    tabular_greedy(
        "WEIRS",
        &[
            key("name"),
            reference("from_node", SWMM_NODE_SECTIONS),
            reference("to_node", SWMM_NODE_SECTIONS),
            text("form"),
            real("height_crest"),
            real("discharge_coefficient"),
            opt_text("has_flap_gate"),
            opt_real("n_end_contractions"),
            opt_text("extra"),
        ],
    ),
    tabular_greedy(
        "OUTLETS",
        &[
            key("name"),
            reference("from_node", SWMM_NODE_SECTIONS),
            reference("to_node", SWMM_NODE_SECTIONS),
            real("offset"),
            text("curve_type"),
            opt_text("curve_description"),
        ],
    ),
    tabular_greedy(
        "XSECTIONS",
        &[
            reference("link", SWMM_LINK_SECTIONS),
            text("shape"),
            real("height"),
            opt_real("parameter_2"),
            opt_real("parameter_3"),
            opt_real("parameter_4"),
            opt_int("n_barrels"),
            opt_text("extra"),
        ],
    ),
    free_text("TRANSECTS"),
    tabular(
        "LOSSES",
        &[
            reference("link", SWMM_LINK_SECTIONS),
            real("k_entry"),
            real("k_exit"),
            real("k_avg"),
            opt_text("has_flap_gate"),
            opt_real("seepage"),
        ],
    ),
    free_text("CONTROLS"),
    tabular_greedy(
        "INFLOWS",
        &[
            reference("node", SWMM_NODE_SECTIONS),
            text("constituent"),
            text("timeseries"),
            opt_text("extra"),
        ],
    ),
    tabular_greedy(
        "DWF",
        &[
            reference("node", SWMM_NODE_SECTIONS),
            text("constituent"),
            real("base"),
            opt_text("patterns"),
        ],
    ),
    tabular_greedy("PATTERNS", &[text("name"), opt_text("factors")]),
    tabular_greedy("TIMESERIES", &[text("name"), opt_text("data")]),
    tabular_greedy("CURVES", &[text("name"), opt_text("data")]),
    tabular(
        "COORDINATES",
        &[reference("node", SWMM_NODE_SECTIONS), real("x"), real("y")],
    ),
    tabular(
        "VERTICES",
        &[reference("link", SWMM_LINK_SECTIONS), real("x"), real("y")],
    ),
    tabular(
        "POLYGONS",
        &[
            reference("subcatchment", &["SUBCATCHMENTS"]),
            real("x"),
            real("y"),
        ],
    ),
    tabular(
        "SYMBOLS",
        &[reference("gage", &["RAINGAGES"]), real("x"), real("y")],
    ),
    key_value("MAP"),
];

static EPANET_REGISTRY: Lazy<HashMap<&'static str, &'static SectionSchema>> =
    Lazy::new(|| EPANET_SCHEMAS.iter().map(|s| (s.name, s)).collect());

static SWMM_REGISTRY: Lazy<HashMap<&'static str, &'static SectionSchema>> =
    Lazy::new(|| SWMM_SCHEMAS.iter().map(|s| (s.name, s)).collect());

fn registry(dialect: Dialect) -> &'static HashMap<&'static str, &'static SectionSchema> {
    match dialect {
        Dialect::Epanet => &EPANET_REGISTRY,
        Dialect::Swmm => &SWMM_REGISTRY,
    }
}

/// All registered schemas for a dialect (used by the referential pass).
pub fn schemas(dialect: Dialect) -> &'static [SectionSchema] {
    match dialect {
        Dialect::Epanet => EPANET_SCHEMAS,
        Dialect::Swmm => SWMM_SCHEMAS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let schema = schema_for(Dialect::Swmm, "junctions").unwrap();
        assert_eq!(schema.name, "JUNCTIONS");
        assert!(schema_for(Dialect::Swmm, "  Conduits ").is_some());
    }

    #[test]
    fn test_unknown_section_is_not_found() {
        assert!(schema_for(Dialect::Epanet, "SUBCATCHMENTS").is_none());
        assert!(schema_for(Dialect::Swmm, "NO_SUCH_SECTION").is_none());
    }

    #[test]
    fn test_primary_key_position() {
        let junctions = schema_for(Dialect::Swmm, "JUNCTIONS").unwrap();
        assert_eq!(junctions.primary_key(), Some(0));

        // Pattern rows legitimately repeat their name; no primary key.
        let patterns = schema_for(Dialect::Swmm, "PATTERNS").unwrap();
        assert_eq!(patterns.primary_key(), None);
    }

    #[test]
    fn test_reference_targets() {
        let conduits = schema_for(Dialect::Swmm, "CONDUITS").unwrap();
        let refs: Vec<_> = conduits.reference_fields().collect();
        assert_eq!(refs.len(), 2);
        assert!(refs[0].1.contains(&"OUTFALLS"));
    }

    #[test]
    fn test_dialects_diverge() {
        assert!(schema_for(Dialect::Epanet, "PIPES").is_some());
        assert!(schema_for(Dialect::Swmm, "PIPES").is_none());
        let epanet = schema_for(Dialect::Epanet, "JUNCTIONS").unwrap();
        let swmm = schema_for(Dialect::Swmm, "JUNCTIONS").unwrap();
        assert_ne!(epanet.fields.len(), swmm.fields.len());
    }

    #[test]
    fn test_node_link_groups() {
        assert!(node_sections(Dialect::Swmm).contains(&"STORAGE"));
        assert!(link_sections(Dialect::Epanet).contains(&"VALVES"));
    }
}
