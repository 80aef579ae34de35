//! Comprobante de entrega en PDF
//!
//! Diseño fijo: dos imágenes de encabezado, bloque tabular con los datos de
//! la entrega, grilla de inventario de 3 columnas en 3 bandas y líneas de
//! firma para quien entrega y quien recibe.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use genpdf::elements::{Break, FrameCellDecorator, Image, Paragraph, StyledElement, TableLayout};
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, Margins, Scale, SimplePageDecorator};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::models::delivery::DeliveryView;
use crate::models::inventory::{Inventory, InventoryItem};
use crate::utils::errors::{ApiError, ApiResult};

const BANDS: usize = 3;
const COLUMNS: usize = 3;

static TEMP_IMAGES: AtomicUsize = AtomicUsize::new(0);

/// Archivo temporal para un logo en base64; único por proceso, entrega y render
fn temp_image_path(delivery_id: i64, slot: &str) -> PathBuf {
    let seq = TEMP_IMAGES.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "flota_receipt_{}_{}_{}_{}.img",
        std::process::id(),
        delivery_id,
        slot,
        seq
    ))
}

fn pdf_error(e: genpdf::error::Error) -> ApiError {
    ApiError::Export(format!("Error generando PDF: {}", e))
}

fn p(text: &str, style: Style) -> StyledElement<Paragraph> {
    Paragraph::new(text).styled(style)
}

fn pp(text: &str, style: Style) -> impl Element {
    Paragraph::new(text).styled(style).padded(Margins::trbl(1, 1, 1, 2))
}

/// Imagen del encabezado: archivo en disco o data URL en base64
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptImage {
    Path(PathBuf),
    Base64(Vec<u8>),
}

impl ReceiptImage {
    /// `data:image/png;base64,...`, base64 pelado o ruta a un archivo
    pub fn parse(source: &str) -> ApiResult<Self> {
        let source = source.trim();
        if let Some(rest) = source.strip_prefix("data:") {
            let (_, encoded) = rest
                .split_once(',')
                .ok_or_else(|| ApiError::Export("Data URL de imagen inválida".to_string()))?;
            let bytes = BASE64
                .decode(encoded)
                .map_err(|e| ApiError::Export(format!("Imagen base64 inválida: {}", e)))?;
            return Ok(ReceiptImage::Base64(bytes));
        }
        Ok(ReceiptImage::Path(PathBuf::from(source)))
    }

    fn load(&self, delivery_id: i64, slot: &str) -> ApiResult<Image> {
        match self {
            ReceiptImage::Path(path) => Image::from_path(path).map_err(pdf_error),
            ReceiptImage::Base64(bytes) => {
                let temp = temp_image_path(delivery_id, slot);
                std::fs::write(&temp, bytes)?;
                let image = Image::from_path(&temp).map_err(pdf_error);
                let _ = std::fs::remove_file(&temp);
                image
            }
        }
    }
}

/// Reparte los 35 ítems en bandas de 3 columnas, conservando el orden.
/// Cada banda se llena columna por columna.
pub fn inventory_bands(inventory: &Inventory) -> Vec<Vec<Vec<(InventoryItem, bool)>>> {
    let items: Vec<(InventoryItem, bool)> = inventory.iter().collect();
    let per_band = items.len().div_ceil(BANDS);

    items
        .chunks(per_band.max(1))
        .map(|band| {
            let per_column = band.len().div_ceil(COLUMNS);
            band.chunks(per_column.max(1)).map(|c| c.to_vec()).collect()
        })
        .collect()
}

/// Línea al pie del inventario con los elementos que no se entregaron
fn missing_line(inventory: &Inventory) -> String {
    let missing = inventory.missing();
    if missing.is_empty() {
        return "Faltantes: ninguno".to_string();
    }
    let labels: Vec<&str> = missing.iter().map(|item| item.label()).collect();
    format!("Faltantes ({}): {}", missing.len(), labels.join(", "))
}

fn check_label(item: InventoryItem, present: bool) -> String {
    format!("[{}] {}", if present { "X" } else { " " }, item.label())
}

fn or_dash(value: Option<String>) -> String {
    value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| "-".to_string())
}

/// Generador del comprobante
pub struct DeliveryReceipt {
    fonts_dir: PathBuf,
    font_family: String,
    left_image: Option<ReceiptImage>,
    right_image: Option<ReceiptImage>,
}

impl DeliveryReceipt {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: &str) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.to_string(),
            left_image: None,
            right_image: None,
        }
    }

    /// Fuentes y logos configurados; un logo ilegible se omite
    pub fn from_config(config: &AppConfig) -> Self {
        let parse = |source: &Option<String>| {
            source.as_deref().and_then(|s| match ReceiptImage::parse(s) {
                Ok(image) => Some(image),
                Err(e) => {
                    warn!("⚠️ Logo ignorado: {}", e);
                    None
                }
            })
        };
        Self {
            left_image: parse(&config.pdf_logo_left),
            right_image: parse(&config.pdf_logo_right),
            ..Self::new(&config.pdf_fonts_dir, &config.pdf_font_family)
        }
    }

    pub fn with_images(mut self, left: Option<ReceiptImage>, right: Option<ReceiptImage>) -> Self {
        self.left_image = left;
        self.right_image = right;
        self
    }

    /// Renderizar el comprobante en `path`
    pub fn render(&self, delivery: &DeliveryView, path: &Path) -> ApiResult<()> {
        let doc = self.build(delivery)?;
        doc.render_to_file(path).map_err(pdf_error)?;
        info!("🧾 Comprobante de entrega {} generado en {}", delivery.id, path.display());
        Ok(())
    }

    fn build(&self, delivery: &DeliveryView) -> ApiResult<Document> {
        let fonts = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)
            .map_err(|e| {
                ApiError::Export(format!(
                    "Error cargando fuentes {} desde {}: {}",
                    self.font_family,
                    self.fonts_dir.display(),
                    e
                ))
            })?;

        let mut doc = Document::new(fonts);
        doc.set_title(format!("Entrega #{}", delivery.id));
        doc.set_paper_size(genpdf::Size::new(210, 297));
        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(Margins::trbl(12, 12, 12, 12));
        doc.set_page_decorator(decorator);

        let s_normal = Style::new().with_font_size(9);
        let s_bold = Style::new().with_font_size(9).bold();
        let s_small = Style::new().with_font_size(7);
        let s_title = Style::new().with_font_size(14).bold();

        // Encabezado con las dos imágenes
        if self.left_image.is_some() || self.right_image.is_some() {
            let mut logos = TableLayout::new(vec![1, 1]);
            let mut row = logos.row();
            for (slot, image) in [("izq", &self.left_image), ("der", &self.right_image)] {
                match image.as_ref().map(|i| i.load(delivery.id, slot)) {
                    Some(Ok(image)) => {
                        row = row.element(
                            image
                                .with_alignment(Alignment::Center)
                                .with_scale(Scale::new(0.5, 0.5)),
                        );
                    }
                    Some(Err(e)) => {
                        warn!("⚠️ Imagen {} omitida: {}", slot, e);
                        row = row.element(Paragraph::new(""));
                    }
                    None => row = row.element(Paragraph::new("")),
                }
            }
            row.push().map_err(pdf_error)?;
            doc.push(logos);
            doc.push(Break::new(1));
        }

        doc.push(
            Paragraph::new(format!("COMPROBANTE DE ENTREGA N° {}", delivery.id))
                .aligned(Alignment::Center)
                .styled(s_title),
        );
        doc.push(Break::new(1));

        // Bloque de datos
        let handover = &delivery.handover;
        let ret = &delivery.return_info;
        let vehicle = &delivery.vehicle_data;
        let fields: Vec<(&str, String)> = vec![
            ("Vehículo", delivery.vehicle_label.clone()),
            ("Patente", vehicle.plate.clone()),
            ("Designación", or_dash(vehicle.designation.clone())),
            ("Cliente", delivery.client_name.clone()),
            (
                "Entrega",
                format!("{} (DNI {})", handover.deliverer, handover.deliverer_document),
            ),
            (
                "Recibe",
                format!("{} (DNI {})", handover.receiver, handover.receiver_document),
            ),
            ("Fecha de entrega", or_dash(handover.date.map(|d| d.format("%d/%m/%Y").to_string()))),
            ("Lugar de entrega", handover.place.clone()),
            ("Km de entrega", or_dash(handover.odometer.map(|k| k.to_string()))),
            ("Combustible", or_dash(handover.fuel_level.clone())),
            ("Fecha de devolución", or_dash(ret.date.map(|d| d.format("%d/%m/%Y").to_string()))),
            ("Lugar de devolución", or_dash(ret.place.clone())),
            ("Km de devolución", or_dash(ret.odometer.map(|k| k.to_string()))),
            ("Observaciones", or_dash(delivery.notes.clone())),
        ];

        let mut header = TableLayout::new(vec![1, 2]);
        header.set_cell_decorator(FrameCellDecorator::new(true, true, false));
        for (label, value) in fields {
            header
                .row()
                .element(pp(label, s_bold))
                .element(pp(&value, s_normal))
                .push()
                .map_err(pdf_error)?;
        }
        doc.push(header);
        doc.push(Break::new(1));

        // Inventario
        doc.push(p("INVENTARIO", s_bold));
        for band in inventory_bands(&delivery.inventory) {
            let mut grid = TableLayout::new(vec![1; COLUMNS]);
            grid.set_cell_decorator(FrameCellDecorator::new(true, true, false));
            let height = band.iter().map(Vec::len).max().unwrap_or(0);

            for line in 0..height {
                let mut row = grid.row();
                for col in 0..COLUMNS {
                    let text = band
                        .get(col)
                        .and_then(|column| column.get(line))
                        .map(|(item, present)| check_label(*item, *present))
                        .unwrap_or_default();
                    row = row.element(pp(&text, s_small));
                }
                row.push().map_err(pdf_error)?;
            }
            doc.push(grid);
            doc.push(Break::new(0.5));
        }
        doc.push(p(&missing_line(&delivery.inventory), s_normal));

        // Firmas
        doc.push(Break::new(3));
        let mut signatures = TableLayout::new(vec![1, 1]);
        signatures
            .row()
            .element(Paragraph::new("______________________").aligned(Alignment::Center))
            .element(Paragraph::new("______________________").aligned(Alignment::Center))
            .push()
            .map_err(pdf_error)?;
        signatures
            .row()
            .element(
                Paragraph::new(format!("Entrega: {}", handover.deliverer))
                    .aligned(Alignment::Center)
                    .styled(s_normal),
            )
            .element(
                Paragraph::new(format!("Recibe: {}", handover.receiver))
                    .aligned(Alignment::Center)
                    .styled(s_normal),
            )
            .push()
            .map_err(pdf_error)?;
        doc.push(signatures);

        Ok(doc)
    }
}
