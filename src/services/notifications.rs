//! Notificaciones y confirmaciones hacia el operador
//!
//! La capa de UI implementa estos traits; por defecto las notificaciones
//! se registran en el log.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{info, warn};

/// Avisos tipo "toast"
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notificador que solo escribe en el log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!("✅ {}", message);
    }

    fn error(&self, message: &str) {
        warn!("❌ {}", message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

/// Notificador que acumula los avisos para que la UI los consuma
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<Vec<Notification>>,
}

impl NotificationQueue {
    /// Retirar los avisos pendientes
    pub fn drain(&self) -> Vec<Notification> {
        self.pending
            .lock()
            .map(|mut pending| pending.drain(..).collect())
            .unwrap_or_default()
    }

    fn push(&self, notification: Notification) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(notification);
        }
    }
}

impl Notifier for NotificationQueue {
    fn success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }
}

/// Paso de confirmación no bloqueante antes de una operación destructiva
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Respuesta fija (procesos batch y tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl Confirmer for FixedAnswer {
    async fn confirm(&self, prompt: &str) -> bool {
        info!("❓ {} -> {}", prompt, if self.0 { "sí" } else { "no" });
        self.0
    }
}
