//! REST API types for the upload page.
//!
//! Field names are the ones the page already reads (Spanish, camelCase).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::load::LoadReport;
use crate::models::NormalizedRow;
use crate::transform::pipeline::PreviewReport;

/// Response to `POST /api/preview`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// Every row had a blank sociedad.
    pub empty_after_filter: bool,

    pub removed_sociedad: usize,

    /// Rows retained by the sociedad filter.
    pub total_filas: usize,

    /// First retained rows, each an object keyed by column name.
    pub preview: Vec<NormalizedRow>,

    /// Exclusion candidates, locale-sorted.
    pub clientes_unicos: Vec<String>,

    /// Sum of column "o".
    pub suma_o: f64,

    pub columnas: Vec<String>,

    /// Whether `suma_o` was computed over a real column.
    pub tiene_columna_o: bool,
}

impl From<PreviewReport> for PreviewResponse {
    fn from(report: PreviewReport) -> Self {
        PreviewResponse {
            empty_after_filter: report.empty_after_filter,
            removed_sociedad: report.removed,
            total_filas: report.total,
            preview: report.rows,
            clientes_unicos: report.unique_clients,
            suma_o: report.amount_total,
            columnas: report.columns,
            tiene_columna_o: report.has_amount_column,
        }
    }
}

/// Response to `POST /api/load`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub ok: bool,
    pub removed_sociedad: usize,
    /// Rows in the destination after the purge.
    pub total_final: u64,
    /// Rows purged for an invalid date.
    pub filas_inconsistentes: u64,
    pub filas_cargadas: usize,
    pub filas_excluidas: usize,
}

impl From<LoadReport> for LoadResponse {
    fn from(report: LoadReport) -> Self {
        LoadResponse {
            ok: true,
            removed_sociedad: report.removed_sociedad,
            total_final: report.outcome.total_final,
            filas_inconsistentes: report.outcome.inconsistent,
            filas_cargadas: report.loaded,
            filas_excluidas: report.excluded,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({ "error": error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoadOutcome;
    use crate::transform::pipeline::preview;

    #[test]
    fn test_preview_response_shape() {
        let bytes = b"1,X,,,,,,,,,,,,,\"10,00\"\n,Y\n2,Z,,,,,,,,,,,,,5.5".to_vec();
        let response = PreviewResponse::from(preview("fbl1n.csv", &bytes).unwrap());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["emptyAfterFilter"], false);
        assert_eq!(json["removedSociedad"], 1);
        assert_eq!(json["totalFilas"], 2);
        assert_eq!(json["clientesUnicos"], json!(["X", "Z"]));
        assert_eq!(json["sumaO"], 15.5);
        assert_eq!(json["tieneColumnaO"], true);
        assert_eq!(json["preview"][0]["b"], "X");
        assert_eq!(json["preview"][1]["o"], "5.5");
        assert_eq!(json["columnas"].as_array().unwrap().len(), 15);
    }

    #[test]
    fn test_load_response_shape() {
        let response = LoadResponse::from(LoadReport {
            removed_sociedad: 1,
            excluded: 1,
            loaded: 1,
            outcome: LoadOutcome {
                inconsistent: 0,
                total_final: 1,
            },
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(
            json,
            json!({
                "ok": true,
                "removedSociedad": 1,
                "totalFinal": 1,
                "filasInconsistentes": 0,
                "filasCargadas": 1,
                "filasExcluidas": 1,
            })
        );
    }

    #[test]
    fn test_error_response() {
        assert_eq!(
            error_response("Formato no soportado: datos.ods"),
            json!({ "error": "Formato no soportado: datos.ods" })
        );
    }
}
