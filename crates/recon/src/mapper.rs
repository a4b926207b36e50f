use crate::header::HeaderNormalizer;
use crate::model::{CanonicalRecord, RawRow};

/// Map one raw row onto the canonical fields.
///
/// Unrecognized headers are dropped and missing values become empty
/// strings. When two columns resolve to the same field the later one wins.
pub fn map_row(normalizer: &HeaderNormalizer, row: &RawRow) -> CanonicalRecord {
    let mut record = CanonicalRecord::default();
    for (header, value) in &row.cells {
        if let Some(field) = normalizer.resolve(header) {
            let value = value.as_deref().map(str::trim).unwrap_or("");
            record.set(field, value.to_string());
        }
    }
    record
}

/// One canonical record per input row, in input order.
pub fn map_rows(normalizer: &HeaderNormalizer, rows: &[RawRow]) -> Vec<CanonicalRecord> {
    rows.iter().map(|row| map_row(normalizer, row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconConfig;

    fn normalizer() -> HeaderNormalizer {
        HeaderNormalizer::from_config(&ReconConfig::builtin().unwrap())
    }

    #[test]
    fn maps_and_trims_values() {
        let row = RawRow::new()
            .with("Marca temporal", " 15/03/2024 10:00:00 ")
            .with("Dirección de correo electrónico", "ana@example.org\n")
            .with("Título del recurso", "  Sistema solar ")
            .with("Enlace (URL) al recurso", "https://example.org/solar");
        let rec = map_row(&normalizer(), &row);
        assert_eq!(rec.timestamp, "15/03/2024 10:00:00");
        assert_eq!(rec.correo_autor, "ana@example.org");
        assert_eq!(rec.titulo_app, "Sistema solar");
        assert_eq!(rec.url_app, "https://example.org/solar");
        assert_eq!(rec.licencia, "");
        assert_eq!(rec.imagen_url, None);
    }

    #[test]
    fn absent_values_become_empty() {
        let mut row = RawRow::new();
        row.push("Licencia", None);
        let rec = map_row(&normalizer(), &row);
        assert_eq!(rec.licencia, "");
    }

    #[test]
    fn row_without_known_headers_is_all_empty() {
        let row = RawRow::new().with("Comentarios", "hola").with("", "x");
        let rec = map_row(&normalizer(), &row);
        assert_eq!(rec, CanonicalRecord::default());
    }

    #[test]
    fn later_column_wins_for_same_field() {
        let row = RawRow::new()
            .with("Licencia de uso", "CC BY")
            .with("Licencia", "CC BY-SA");
        let rec = map_row(&normalizer(), &row);
        assert_eq!(rec.licencia, "CC BY-SA");
    }

    #[test]
    fn preserves_length_and_order() {
        let rows: Vec<RawRow> = (0..5)
            .map(|i| RawRow::new().with("Título del recurso", format!("t{i}")))
            .collect();
        let records = map_rows(&normalizer(), &rows);
        assert_eq!(records.len(), 5);
        for (i, rec) in records.iter().enumerate() {
            assert_eq!(rec.titulo_app, format!("t{i}"));
        }
    }
}
