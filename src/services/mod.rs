//! Services module
//!
//! Este módulo contiene la lógica de la aplicación sobre el cliente HTTP:
//! controlador genérico de colecciones, ciclo de vida de entregas,
//! facturación, tablero y autenticación.

pub mod auth;
pub mod collection;
pub mod dashboard;
pub mod deliveries;
pub mod entity;
pub mod invoices;
pub mod notifications;

pub use auth::AuthService;
pub use collection::CollectionController;
pub use dashboard::{Dashboard, DashboardSnapshot};
pub use deliveries::DeliveryService;
pub use entity::{Creatable, Deletable, Editable, Entity};
pub use invoices::InvoiceService;
pub use notifications::{Confirmer, FixedAnswer, Notification, NotificationQueue, Notifier, TracingNotifier};
