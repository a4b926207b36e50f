use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::normalize::{normalize_text, TimestampParser};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One submission exactly as exported by the form: header text → cell value.
///
/// Cells keep their column order. A `None` value means the row had no cell
/// for that column (ragged CSV), which maps the same as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<(String, Option<String>)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, header: impl Into<String>, value: Option<String>) {
        self.cells.push((header.into(), value));
    }

    /// Builder-style `push` with a present value.
    pub fn with(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.push((header.into(), Some(value.into())));
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Canonical fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Timestamp,
    CorreoAutor,
    EliminarRegistro,
    NombreAutor,
    TituloApp,
    UrlApp,
    DescripcionApp,
    Plataforma,
    TipoRecurso,
    NivelEducativo,
    AreaConocimiento,
    PalabrasClave,
    Licencia,
    ImagenUrl,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 14] = [
        Self::Timestamp,
        Self::CorreoAutor,
        Self::EliminarRegistro,
        Self::NombreAutor,
        Self::TituloApp,
        Self::UrlApp,
        Self::DescripcionApp,
        Self::Plataforma,
        Self::TipoRecurso,
        Self::NivelEducativo,
        Self::AreaConocimiento,
        Self::PalabrasClave,
        Self::Licencia,
        Self::ImagenUrl,
    ];

    /// Fields that must be non-empty for a submission to be published.
    pub const REQUIRED: [CanonicalField; 4] = [
        Self::CorreoAutor,
        Self::NombreAutor,
        Self::TituloApp,
        Self::UrlApp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::CorreoAutor => "correo_autor",
            Self::EliminarRegistro => "eliminar_registro",
            Self::NombreAutor => "nombre_autor",
            Self::TituloApp => "titulo_app",
            Self::UrlApp => "url_app",
            Self::DescripcionApp => "descripcion_app",
            Self::Plataforma => "plataforma",
            Self::TipoRecurso => "tipo_recurso",
            Self::NivelEducativo => "nivel_educativo",
            Self::AreaConocimiento => "area_conocimiento",
            Self::PalabrasClave => "palabras_clave",
            Self::Licencia => "licencia",
            Self::ImagenUrl => "imagen_url",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Canonical record
// ---------------------------------------------------------------------------

/// A submission row after header normalization. Every value is trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    pub timestamp: String,
    pub correo_autor: String,
    pub eliminar_registro: String,
    pub nombre_autor: String,
    pub titulo_app: String,
    pub url_app: String,
    pub descripcion_app: String,
    pub plataforma: String,
    pub tipo_recurso: String,
    pub nivel_educativo: String,
    pub area_conocimiento: String,
    pub palabras_clave: String,
    pub licencia: String,
    /// Only present when the form had an image column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
}

impl CanonicalRecord {
    pub fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::Timestamp => &self.timestamp,
            CanonicalField::CorreoAutor => &self.correo_autor,
            CanonicalField::EliminarRegistro => &self.eliminar_registro,
            CanonicalField::NombreAutor => &self.nombre_autor,
            CanonicalField::TituloApp => &self.titulo_app,
            CanonicalField::UrlApp => &self.url_app,
            CanonicalField::DescripcionApp => &self.descripcion_app,
            CanonicalField::Plataforma => &self.plataforma,
            CanonicalField::TipoRecurso => &self.tipo_recurso,
            CanonicalField::NivelEducativo => &self.nivel_educativo,
            CanonicalField::AreaConocimiento => &self.area_conocimiento,
            CanonicalField::PalabrasClave => &self.palabras_clave,
            CanonicalField::Licencia => &self.licencia,
            CanonicalField::ImagenUrl => self.imagen_url.as_deref().unwrap_or(""),
        }
    }

    pub fn set(&mut self, field: CanonicalField, value: String) {
        let slot = match field {
            CanonicalField::Timestamp => &mut self.timestamp,
            CanonicalField::CorreoAutor => &mut self.correo_autor,
            CanonicalField::EliminarRegistro => &mut self.eliminar_registro,
            CanonicalField::NombreAutor => &mut self.nombre_autor,
            CanonicalField::TituloApp => &mut self.titulo_app,
            CanonicalField::UrlApp => &mut self.url_app,
            CanonicalField::DescripcionApp => &mut self.descripcion_app,
            CanonicalField::Plataforma => &mut self.plataforma,
            CanonicalField::TipoRecurso => &mut self.tipo_recurso,
            CanonicalField::NivelEducativo => &mut self.nivel_educativo,
            CanonicalField::AreaConocimiento => &mut self.area_conocimiento,
            CanonicalField::PalabrasClave => &mut self.palabras_clave,
            CanonicalField::Licencia => &mut self.licencia,
            CanonicalField::ImagenUrl => {
                self.imagen_url = Some(value);
                return;
            }
        };
        *slot = value;
    }

    /// Resource identity: the trimmed URL.
    pub fn identity(&self) -> &str {
        self.url_app.trim()
    }

    /// First required field that is empty, if any.
    pub fn missing_required(&self) -> Option<CanonicalField> {
        CanonicalField::REQUIRED
            .into_iter()
            .find(|f| self.get(*f).is_empty())
    }
}

// ---------------------------------------------------------------------------
// Submission (record + derived comparison keys)
// ---------------------------------------------------------------------------

/// A canonical record paired with the values every later stage compares on.
/// Built once per row so ownership, deletion and selection agree on them.
#[derive(Debug, Clone)]
pub struct Submission {
    /// 0-based position in the log (submission order).
    pub row: usize,
    pub record: CanonicalRecord,
    pub identity: String,
    pub email: String,
    pub is_deletion: bool,
    /// `None` when the timestamp could not be parsed.
    pub submitted_at: Option<NaiveDateTime>,
}

impl Submission {
    pub fn new(row: usize, record: CanonicalRecord, timestamps: &TimestampParser) -> Self {
        let identity = record.identity().to_string();
        let email = normalize_text(&record.correo_autor);
        let is_deletion = normalize_text(&record.eliminar_registro) == "si";
        let submitted_at = timestamps.parse(&record.timestamp);
        Self {
            row,
            record,
            identity,
            email,
            is_deletion,
            submitted_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Ownership + deletion
// ---------------------------------------------------------------------------

/// The verified author of a resource: first valid creation for its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub email: String,
    pub submitted_at: Option<NaiveDateTime>,
    pub row: usize,
}

pub type Owners = HashMap<String, Owner>;

/// Resource identity → latest owner-verified deletion timestamp.
pub type DeletionCutoffs = HashMap<String, NaiveDateTime>;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledResource {
    pub key: String,
    pub source_row: usize,
    #[serde(flatten)]
    pub record: CanonicalRecord,
}

/// Why a submission is not part of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    MissingUrl,
    DeletionRequest,
    NoOwner,
    NotOwner,
    Tombstoned,
    MissingRequiredField { field: CanonicalField },
    InvalidUrl,
    Superseded,
}

impl RejectReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingUrl => "missing_url",
            Self::DeletionRequest => "deletion_request",
            Self::NoOwner => "no_owner",
            Self::NotOwner => "not_owner",
            Self::Tombstoned => "tombstoned",
            Self::MissingRequiredField { .. } => "missing_required_field",
            Self::InvalidUrl => "invalid_url",
            Self::Superseded => "superseded",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredField { field } => write!(f, "missing required field '{field}'"),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub row: usize,
    pub url: String,
    #[serde(flatten)]
    pub reason: RejectReason,
}

/// Result of replaying one log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub resources: Vec<ReconciledResource>,
    pub rejections: Vec<Rejection>,
    pub owners: usize,
    pub deletion_cutoffs: usize,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ReconSummary {
    pub rows_read: usize,
    pub resources: usize,
    pub owners: usize,
    pub deletion_cutoffs: usize,
    pub rejected: usize,
    pub rejection_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub resources: Vec<ReconciledResource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejections: Option<Vec<Rejection>>,
}
