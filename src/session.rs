//! Sesión del operador
//!
//! El token de autenticación vive en un objeto `Session` explícito que se
//! inyecta en el cliente HTTP. La única persistencia local es el token.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

/// Estado observable de la sesión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated,
    /// El backend invalidó el token: volver a la pantalla de login
    Expired,
}

/// Almacenamiento persistente del token
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Store en memoria (tests y procesos efímeros)
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "token store poisoned"))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "token store poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// Store en archivo plano
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Sesión compartida entre el cliente HTTP y la UI
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    token: Arc<RwLock<Option<String>>>,
    state: Arc<watch::Sender<SessionState>>,
}

impl Session {
    /// Crear la sesión cargando el token persistido, si existe
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let token = store.load();
        let initial = if token.is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        let (state, _) = watch::channel(initial);
        debug!("🔐 Sesión inicializada: {:?}", initial);

        Self {
            store,
            token: Arc::new(RwLock::new(token)),
            state: Arc::new(state),
        }
    }

    /// Sesión sin persistencia
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::default()))
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Suscribirse a los cambios de estado (p. ej. para redirigir al login)
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Guardar el token recibido en el login
    pub async fn set_token(&self, token: &str) -> io::Result<()> {
        self.store.save(token)?;
        *self.token.write().await = Some(token.to_string());
        self.state.send_replace(SessionState::Authenticated);
        info!("🔐 Sesión iniciada");
        Ok(())
    }

    /// Cerrar sesión por pedido del operador
    pub async fn logout(&self) {
        self.clear_token().await;
        self.state.send_replace(SessionState::Anonymous);
        info!("👋 Sesión cerrada");
    }

    /// El backend rechazó el token: limpiar y forzar vuelta al login
    pub async fn invalidate(&self) {
        self.clear_token().await;
        self.state.send_replace(SessionState::Expired);
        warn!("⚠️ Sesión invalidada por el backend, se requiere login");
    }

    async fn clear_token(&self) {
        *self.token.write().await = None;
        if let Err(e) = self.store.clear() {
            warn!("❌ No se pudo borrar el token persistido: {}", e);
        }
    }
}
