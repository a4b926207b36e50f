use std::collections::BTreeMap;

use crate::config::ReconConfig;
use crate::deletion::deletion_cutoffs;
use crate::error::ReconError;
use crate::header::HeaderNormalizer;
use crate::mapper::map_rows;
use crate::model::{Catalog, RawRow, ReconMeta, ReconResult, ReconSummary, Submission};
use crate::normalize::TimestampParser;
use crate::ownership::resolve_owners;
use crate::select::select_versions;

/// Replays submission logs against one set of header tables.
///
/// Immutable after construction; share it by reference across runs.
#[derive(Debug, Clone)]
pub struct Reconciler {
    normalizer: HeaderNormalizer,
    timestamps: TimestampParser,
}

impl Reconciler {
    pub fn new(config: &ReconConfig) -> Self {
        Self {
            normalizer: HeaderNormalizer::from_config(config),
            timestamps: TimestampParser::new(&config.timestamps.formats),
        }
    }

    pub fn normalizer(&self) -> &HeaderNormalizer {
        &self.normalizer
    }

    /// Rebuild the current catalog from the full log.
    pub fn reconcile(&self, rows: &[RawRow]) -> Catalog {
        let records = map_rows(&self.normalizer, rows);
        log::debug!("mapped {} row(s)", records.len());

        let submissions: Vec<Submission> = records
            .into_iter()
            .enumerate()
            .map(|(row, record)| Submission::new(row, record, &self.timestamps))
            .collect();

        let unparsable = submissions.iter().filter(|s| s.submitted_at.is_none()).count();
        if unparsable > 0 {
            log::debug!("{unparsable} row(s) with unparsable timestamp");
        }

        let owners = resolve_owners(&submissions);
        let cutoffs = deletion_cutoffs(&submissions, &owners);
        let (resources, rejections) = select_versions(&submissions, &owners, &cutoffs);
        log::debug!(
            "selected {} resource(s), rejected {} row(s)",
            resources.len(),
            rejections.len()
        );

        Catalog {
            resources,
            rejections,
            owners: owners.len(),
            deletion_cutoffs: cutoffs.len(),
        }
    }
}

/// Run reconciliation per config. Returns the catalog + summary.
///
/// `explain` keeps the per-row rejection trace in the result.
pub fn run(config: &ReconConfig, rows: &[RawRow], explain: bool) -> Result<ReconResult, ReconError> {
    config.validate()?;

    let catalog = Reconciler::new(config).reconcile(rows);
    let summary = compute_summary(rows.len(), &catalog);

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        resources: catalog.resources,
        rejections: explain.then_some(catalog.rejections),
    })
}

/// Compute summary statistics from a reconciled catalog.
pub fn compute_summary(rows_read: usize, catalog: &Catalog) -> ReconSummary {
    let mut rejection_counts: BTreeMap<String, usize> = BTreeMap::new();
    for r in &catalog.rejections {
        *rejection_counts.entry(r.reason.label().to_string()).or_insert(0) += 1;
    }

    ReconSummary {
        rows_read,
        resources: catalog.resources.len(),
        owners: catalog.owners,
        deletion_cutoffs: catalog.deletion_cutoffs,
        rejected: catalog.rejections.len(),
        rejection_counts,
    }
}

/// Read only the header record of a CSV export. Works on a log with no
/// submissions yet.
pub fn load_csv_headers(csv_data: &str) -> Result<Vec<String>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    Ok(reader.headers()?.iter().map(|h| h.to_string()).collect())
}

/// Load a CSV export (header row first) into raw rows.
///
/// Short rows yield absent values for the missing columns; cells beyond
/// the header width are dropped. Blank lines are skipped.
pub fn load_csv_rows(csv_data: &str) -> Result<Vec<RawRow>, ReconError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let mut row = RawRow::new();
        for (i, h) in headers.iter().enumerate() {
            row.push(h.clone(), record.get(i).map(str::to_string));
        }
        rows.push(row);
    }

    log::debug!("loaded {} row(s) with {} column(s)", rows.len(), headers.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RejectReason;

    const EMAIL: &str = "Dirección de correo electrónico";
    const URL: &str = "Enlace (URL) al recurso";
    const TITLE: &str = "Título del recurso multimedia";
    const NAME: &str = "Tu nombre";
    const DELETE: &str = "¿Quieres eliminar un registro?";

    fn row(ts: &str, email: &str, url: &str, title: &str, delete: &str) -> RawRow {
        RawRow::new()
            .with("Marca temporal", ts)
            .with(EMAIL, email)
            .with(NAME, "Autora")
            .with(TITLE, title)
            .with(URL, url)
            .with(DELETE, delete)
    }

    fn reconciler() -> Reconciler {
        Reconciler::new(&ReconConfig::builtin().unwrap())
    }

    #[test]
    fn full_pipeline_edit_and_delete() {
        let rows = vec![
            row("01/03/2024 10:00:00", "a@x.org", "https://x.org/1", "Uno", ""),
            row("01/03/2024 11:00:00", "b@x.org", "https://x.org/2", "Dos", ""),
            row("02/03/2024 10:00:00", "a@x.org", "https://x.org/1", "Uno v2", ""),
            row("03/03/2024 10:00:00", "b@x.org", "https://x.org/2", "", "Sí"),
        ];
        let catalog = reconciler().reconcile(&rows);
        assert_eq!(catalog.resources.len(), 1);
        assert_eq!(catalog.resources[0].record.titulo_app, "Uno v2");
        assert_eq!(catalog.owners, 2);
        assert_eq!(catalog.deletion_cutoffs, 1);
        let tombstoned = catalog
            .rejections
            .iter()
            .filter(|r| r.reason == RejectReason::Tombstoned)
            .count();
        assert_eq!(tombstoned, 1);
    }

    #[test]
    fn run_fills_meta_and_summary() {
        let config = ReconConfig::builtin().unwrap();
        let rows = vec![
            row("01/03/2024 10:00:00", "a@x.org", "https://x.org/1", "Uno", ""),
            row("02/03/2024 10:00:00", "z@x.org", "https://x.org/1", "Hack", ""),
        ];
        let result = run(&config, &rows, false).unwrap();
        assert_eq!(result.meta.config_name, "catalogo-recursos");
        assert_eq!(result.meta.engine_version, env!("CARGO_PKG_VERSION"));
        assert_eq!(result.summary.rows_read, 2);
        assert_eq!(result.summary.resources, 1);
        assert_eq!(result.summary.rejected, 1);
        assert_eq!(result.summary.rejection_counts["not_owner"], 1);
        assert!(result.rejections.is_none());

        let explained = run(&config, &rows, true).unwrap();
        assert_eq!(explained.rejections.unwrap().len(), 1);
    }

    #[test]
    fn run_rejects_invalid_config() {
        let mut config = ReconConfig::builtin().unwrap();
        config.timestamps.formats.clear();
        assert!(matches!(
            run(&config, &[], false),
            Err(ReconError::ConfigValidation(_))
        ));
    }

    #[test]
    fn empty_log_is_empty_catalog() {
        let catalog = reconciler().reconcile(&[]);
        assert_eq!(catalog, Catalog::default());
    }

    #[test]
    fn load_csv_basic() {
        let csv = "\
Marca temporal,Dirección de correo electrónico,Enlace (URL) al recurso
01/03/2024 10:00:00,a@x.org,https://x.org/1
01/03/2024 11:00:00,b@x.org,https://x.org/2
";
        let rows = load_csv_rows(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells.len(), 3);
        assert_eq!(rows[1].cells[1], (EMAIL.to_string(), Some("b@x.org".to_string())));
    }

    #[test]
    fn load_csv_ragged_and_blank_lines() {
        let csv = "\
a,b,c
1,2

,,
4
5,6,7,8
";
        let rows = load_csv_rows(csv).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cells[2], ("c".to_string(), None));
        assert_eq!(rows[1].cells[0], ("a".to_string(), Some("4".to_string())));
        assert_eq!(rows[1].cells[1].1, None);
        // Extra cell dropped
        assert_eq!(rows[2].cells.len(), 3);
    }

    #[test]
    fn load_csv_headers_without_data_rows() {
        let csv = "Marca temporal,\"Título del recurso\nsegunda línea\",Licencia\n";
        let headers = load_csv_headers(csv).unwrap();
        assert_eq!(
            headers,
            vec!["Marca temporal", "Título del recurso\nsegunda línea", "Licencia"]
        );
        assert!(load_csv_rows(csv).unwrap().is_empty());
    }

    #[test]
    fn load_csv_multiline_headers() {
        let csv = "\"Título del recurso multimedia\nEl nombre que verán los usuarios en el repositorio.\",Licencia\nSolar,CC BY\n";
        let rows = load_csv_rows(csv).unwrap();
        let rec = crate::mapper::map_row(reconciler().normalizer(), &rows[0]);
        assert_eq!(rec.titulo_app, "Solar");
        assert_eq!(rec.licencia, "CC BY");
    }
}
