//! Entidades administrables por el controlador de colecciones
//!
//! Cada entidad declara sus rutas, su id y cómo se traduce desde y hacia el
//! backend. `Creatable`, `Editable` y `Deletable` habilitan las operaciones
//! que la UI ofrece para esa entidad.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

use crate::clients::ApiClient;
use crate::mapping::{FieldMap, CLIENT_FIELDS, USER_FIELDS, VEHICLE_FIELDS};
use crate::models::{Client, DeliveryView, User, Vehicle};
use crate::utils::errors::{ApiError, ApiResult};
use crate::utils::validation::validate_patente;

pub trait Entity: Clone + Serialize + Send + Sync + 'static {
    /// Nombre para los mensajes al operador
    const NAME: &'static str;
    /// GET del listado
    const LIST_PATH: &'static str;
    /// Prefijo de las rutas por registro (`{ITEM_PATH}/{id}`) y del POST de alta
    const ITEM_PATH: &'static str;

    fn id(&self) -> i64;

    fn field_map() -> Option<&'static FieldMap>;

    fn from_backend(value: Value) -> ApiResult<Self>;
}

/// Entidades con alta desde formulario (POST a `ITEM_PATH`)
pub trait Creatable: Entity {}

/// Entidades con edición en modal (PATCH del registro completo)
pub trait Editable: Entity {
    fn to_backend(&self) -> ApiResult<Value>;

    fn validate_edit(&self) -> ApiResult<()> {
        Ok(())
    }
}

/// Entidades que la UI permite borrar
pub trait Deletable: Entity {}

fn from_mapped<T: DeserializeOwned>(map: &FieldMap, value: Value) -> ApiResult<T> {
    Ok(serde_json::from_value(map.to_ui(value))?)
}

/// Payload del backend sin el id (viaja en la ruta)
fn to_mapped<T: Serialize>(map: &FieldMap, record: &T) -> ApiResult<Value> {
    let mut value = serde_json::to_value(record)?;
    if let Some(obj) = value.as_object_mut() {
        obj.remove("id");
    }
    Ok(map.to_backend(value))
}

/// Traducir un formulario de alta a nombres del backend
pub fn form_payload<F: Serialize + Validate>(map: Option<&FieldMap>, form: &F) -> ApiResult<Value> {
    form.validate()?;
    let value = serde_json::to_value(form)?;
    Ok(match map {
        Some(map) => map.to_backend(value),
        None => value,
    })
}

/// GET del listado completo de una entidad
pub async fn fetch_all<E: Entity>(api: &ApiClient) -> ApiResult<Vec<E>> {
    let rows: Vec<Value> = api.get(E::LIST_PATH).await?;
    rows.into_iter().map(E::from_backend).collect()
}

impl Entity for Vehicle {
    const NAME: &'static str = "Vehículo";
    const LIST_PATH: &'static str = "/vehiculos";
    const ITEM_PATH: &'static str = "/vehiculo";

    fn id(&self) -> i64 {
        self.id
    }

    fn field_map() -> Option<&'static FieldMap> {
        Some(&*VEHICLE_FIELDS)
    }

    fn from_backend(value: Value) -> ApiResult<Self> {
        from_mapped(&VEHICLE_FIELDS, value)
    }
}

impl Creatable for Vehicle {}

impl Editable for Vehicle {
    fn to_backend(&self) -> ApiResult<Value> {
        to_mapped(&VEHICLE_FIELDS, self)
    }

    fn validate_edit(&self) -> ApiResult<()> {
        if let Err(e) = validate_patente(&self.plate) {
            let mut errors = validator::ValidationErrors::new();
            errors.add("plate", e);
            return Err(ApiError::Validation(errors));
        }
        Ok(())
    }
}

impl Entity for Client {
    const NAME: &'static str = "Cliente";
    const LIST_PATH: &'static str = "/clientes";
    const ITEM_PATH: &'static str = "/cliente";

    fn id(&self) -> i64 {
        self.id
    }

    fn field_map() -> Option<&'static FieldMap> {
        Some(&*CLIENT_FIELDS)
    }

    fn from_backend(value: Value) -> ApiResult<Self> {
        from_mapped(&CLIENT_FIELDS, value)
    }
}

impl Creatable for Client {}

impl Editable for Client {
    fn to_backend(&self) -> ApiResult<Value> {
        to_mapped(&CLIENT_FIELDS, self)
    }

    fn validate_edit(&self) -> ApiResult<()> {
        self.to_form().validate()?;
        Ok(())
    }
}

impl Deletable for Client {}

impl Entity for User {
    const NAME: &'static str = "Usuario";
    const LIST_PATH: &'static str = "/users";
    const ITEM_PATH: &'static str = "/user";

    fn id(&self) -> i64 {
        self.id
    }

    fn field_map() -> Option<&'static FieldMap> {
        Some(&*USER_FIELDS)
    }

    fn from_backend(value: Value) -> ApiResult<Self> {
        from_mapped(&USER_FIELDS, value)
    }
}

impl Creatable for User {}

impl Editable for User {
    fn to_backend(&self) -> ApiResult<Value> {
        to_mapped(&USER_FIELDS, self)
    }

    fn validate_edit(&self) -> ApiResult<()> {
        self.to_form().validate()?;
        Ok(())
    }
}

impl Deletable for User {}

// Las entregas solo se modifican con `DeliveryPatch`
impl Entity for DeliveryView {
    const NAME: &'static str = "Entrega";
    const LIST_PATH: &'static str = "/entregas";
    const ITEM_PATH: &'static str = "/entrega";

    fn id(&self) -> i64 {
        self.id
    }

    fn field_map() -> Option<&'static FieldMap> {
        None
    }

    fn from_backend(value: Value) -> ApiResult<Self> {
        DeliveryView::from_raw_value(value)
    }
}
