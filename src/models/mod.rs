//! Modelos del sistema
//!
//! Este módulo contiene los modelos de vista y los payloads que se
//! intercambian con el backend.

pub mod client;
pub mod delivery;
pub mod envelope;
pub mod inventory;
pub mod invoice;
pub mod stats;
pub mod user;
pub mod vehicle;
pub mod wire;

pub use client::{Client, ClientForm, ClientType};
pub use delivery::{DeliveryPatch, DeliveryStatus, DeliveryView, NewDelivery, ReturnPatch};
pub use envelope::Envelope;
pub use inventory::{Inventory, InventoryItem};
pub use invoice::{Invoice, InvoiceBook, Month};
pub use stats::{ChartPoint, Stats};
pub use user::{Credentials, NewUser, User, UserForm};
pub use vehicle::{Vehicle, VehicleForm, VehicleStatus};
