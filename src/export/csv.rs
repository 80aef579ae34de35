//! Exportación CSV
//!
//! Separador coma, fila de encabezado y cada fila terminada en `\n`.
//! Los valores con coma, comillas o saltos de línea van entre comillas.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::export::{headers, rows, ExportColumn};
use crate::utils::errors::{ApiError, ApiResult};

const SEP: char = ',';

fn escape(value: &str) -> String {
    if value.contains(SEP) || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn line<S: AsRef<str>>(cells: &[S]) -> String {
    let escaped: Vec<String> = cells.iter().map(|c| escape(c.as_ref())).collect();
    format!("{}\n", escaped.join(&SEP.to_string()))
}

/// Contenido CSV completo (encabezado incluido)
pub fn to_csv<T: Serialize>(records: &[T], columns: &[ExportColumn]) -> ApiResult<String> {
    let mut out = line(&headers(columns));
    for row in rows(records, columns)? {
        out.push_str(&line(&row));
    }
    Ok(out)
}

/// Escribir el CSV en disco; devuelve la cantidad de filas de datos
pub fn write_csv<T: Serialize>(
    path: &Path,
    records: &[T],
    columns: &[ExportColumn],
) -> ApiResult<usize> {
    let content = to_csv(records, columns)?;
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(content.as_bytes())?;
    file.flush()?;

    info!("📄 {} filas exportadas a {}", records.len(), path.display());
    Ok(records.len())
}

/// Leer un CSV producido por `to_csv`: filas con encabezado en la primera
pub fn read_csv(content: &str) -> ApiResult<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if quoted {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => quoted = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => quoted = true,
            SEP => row.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if quoted {
        return Err(ApiError::Export("CSV con comillas sin cerrar".to_string()));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}
