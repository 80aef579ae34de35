//! Exportación a Excel (una hoja, ancho de columna según el encabezado)

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use tracing::info;

use crate::export::{headers, rows, ExportColumn};
use crate::utils::errors::{ApiError, ApiResult};

impl From<XlsxError> for ApiError {
    fn from(e: XlsxError) -> Self {
        ApiError::Export(e.to_string())
    }
}

/// Escribir el libro en disco; devuelve la cantidad de filas de datos
pub fn write_xlsx<T: Serialize>(
    path: &Path,
    sheet_name: &str,
    records: &[T],
    columns: &[ExportColumn],
) -> ApiResult<usize> {
    let data = rows(records, columns)?;
    let bold = Format::new().set_bold();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    for (col, header) in headers(columns).into_iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, header, &bold)?;
        sheet.set_column_width(col, header.chars().count() as f64)?;
    }

    for (row, cells) in data.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            sheet.write_string(row as u32 + 1, col as u16, cell)?;
        }
    }

    workbook.save(path)?;
    info!("📊 {} filas exportadas a {}", data.len(), path.display());
    Ok(data.len())
}
