use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{CanonicalField, ReconciledResource};

/// Aggregate counts over a reconciled catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total_resources: usize,
    pub by_platform: BTreeMap<String, usize>,
    pub by_license: BTreeMap<String, usize>,
    pub by_resource_type: BTreeMap<String, usize>,
    pub by_level: BTreeMap<String, usize>,
    pub by_area: BTreeMap<String, usize>,
}

/// Whole-cell counts; empty cells are skipped.
fn count_single(resources: &[ReconciledResource], field: CanonicalField) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in resources {
        let value = r.record.get(field).trim();
        if !value.is_empty() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Comma-separated cells: every trimmed, non-empty item counts once.
fn count_multi(resources: &[ReconciledResource], field: CanonicalField) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for r in resources {
        for item in r.record.get(field).split(',') {
            let item = item.trim();
            if !item.is_empty() {
                *counts.entry(item.to_string()).or_insert(0) += 1;
            }
        }
    }
    counts
}

pub fn compute_stats(resources: &[ReconciledResource]) -> CatalogStats {
    CatalogStats {
        total_resources: resources.len(),
        by_platform: count_single(resources, CanonicalField::Plataforma),
        by_license: count_single(resources, CanonicalField::Licencia),
        by_resource_type: count_single(resources, CanonicalField::TipoRecurso),
        by_level: count_multi(resources, CanonicalField::NivelEducativo),
        by_area: count_multi(resources, CanonicalField::AreaConocimiento),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CanonicalRecord;

    fn resource(key: &str, platform: &str, levels: &str) -> ReconciledResource {
        ReconciledResource {
            key: key.into(),
            source_row: 0,
            record: CanonicalRecord {
                url_app: key.into(),
                plataforma: platform.into(),
                nivel_educativo: levels.into(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn counts_single_and_multi_values() {
        let resources = vec![
            resource("https://a", "Gemini", "Primaria, Secundaria"),
            resource("https://b", "Gemini", "Secundaria,, "),
            resource("https://c", "", "Bachillerato"),
        ];
        let stats = compute_stats(&resources);
        assert_eq!(stats.total_resources, 3);
        assert_eq!(stats.by_platform.len(), 1);
        assert_eq!(stats.by_platform["Gemini"], 2);
        assert_eq!(stats.by_level["Secundaria"], 2);
        assert_eq!(stats.by_level["Primaria"], 1);
        assert_eq!(stats.by_level["Bachillerato"], 1);
        assert_eq!(stats.by_level.len(), 3);
        assert!(stats.by_license.is_empty());
    }

    #[test]
    fn resource_type_counts_whole_cell() {
        let mut a = resource("https://a", "Gemini", "");
        a.record.tipo_recurso = "Juego, Simulación".into();
        let mut b = resource("https://b", "Gemini", "");
        b.record.tipo_recurso = "Juego".into();
        let stats = compute_stats(&[a, b]);
        assert_eq!(stats.by_resource_type.len(), 2);
        assert_eq!(stats.by_resource_type["Juego, Simulación"], 1);
        assert_eq!(stats.by_resource_type["Juego"], 1);
    }

    #[test]
    fn empty_catalog() {
        assert_eq!(compute_stats(&[]), CatalogStats::default());
    }
}
