//! Builders shared by the unit tests of the pipeline stages.

use crate::model::{CanonicalRecord, Submission};
use crate::normalize::TimestampParser;

/// A submission with only the fields ownership and deletion look at.
pub(crate) fn sub(row: usize, ts: &str, email: &str, url: &str, delete: &str) -> Submission {
    let record = CanonicalRecord {
        timestamp: ts.into(),
        correo_autor: email.into(),
        eliminar_registro: delete.into(),
        url_app: url.into(),
        ..Default::default()
    };
    Submission::new(row, record, &TimestampParser::default())
}

/// A complete, publishable submission.
pub(crate) fn full(row: usize, ts: &str, email: &str, url: &str, title: &str) -> Submission {
    let record = CanonicalRecord {
        timestamp: ts.into(),
        correo_autor: email.into(),
        nombre_autor: "Autora".into(),
        titulo_app: title.into(),
        url_app: url.into(),
        ..Default::default()
    };
    Submission::new(row, record, &TimestampParser::default())
}
