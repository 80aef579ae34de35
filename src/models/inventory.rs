//! Checklist de inventario de una entrega
//!
//! Lista fija de 35 ítems que se relevan al momento de entregar el vehículo.
//! El backend guarda cada ítem como una columna `0/1`.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::wire::parse_flag;

pub const INVENTORY_SIZE: usize = 35;

macro_rules! inventory_items {
    ($( $variant:ident => $key:literal, $label:literal; )*) => {
        /// Ítem del checklist de inventario
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum InventoryItem {
            $( $variant, )*
        }

        impl InventoryItem {
            pub const ALL: [InventoryItem; INVENTORY_SIZE] = [
                $( InventoryItem::$variant, )*
            ];

            /// Nombre de la columna en el backend
            pub fn key(&self) -> &'static str {
                match self {
                    $( InventoryItem::$variant => $key, )*
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $( InventoryItem::$variant => $label, )*
                }
            }
        }
    };
}

inventory_items! {
    HighBeams => "luces_altas", "Luces altas";
    LowBeams => "luces_bajas", "Luces bajas";
    TurnSignals => "luces_giro", "Luces de giro";
    BrakeLights => "luces_freno", "Luces de freno";
    PositionLights => "luces_posicion", "Luces de posición";
    InteriorLight => "luz_interior", "Luz interior";
    RearviewMirror => "espejo_retrovisor", "Espejo retrovisor";
    SideMirrors => "espejos_laterales", "Espejos laterales";
    Windshield => "parabrisas", "Parabrisas";
    Wipers => "limpiaparabrisas", "Limpiaparabrisas";
    Horn => "bocina", "Bocina";
    Dashboard => "tablero", "Tablero";
    AirConditioning => "aire_acondicionado", "Aire acondicionado";
    Heating => "calefaccion", "Calefacción";
    Radio => "radio", "Radio";
    Lighter => "encendedor", "Encendedor";
    SeatBelts => "cinturones", "Cinturones de seguridad";
    SeatCovers => "fundas_asientos", "Fundas de asientos";
    FloorMats => "alfombras", "Alfombras";
    SunVisors => "parasoles", "Parasoles";
    DoorLocks => "cerraduras", "Cerraduras";
    Alarm => "alarma", "Alarma";
    Keys => "llaves", "Llaves";
    SpareTire => "rueda_auxilio", "Rueda de auxilio";
    Jack => "gato", "Gato";
    WheelWrench => "llave_rueda", "Llave de rueda";
    FireExtinguisher => "matafuego", "Matafuego";
    WarningTriangles => "balizas", "Balizas";
    FirstAidKit => "botiquin", "Botiquín";
    ReflectiveVest => "chaleco_reflectivo", "Chaleco reflectivo";
    FuelCap => "tapa_combustible", "Tapa de combustible";
    RadiatorCap => "tapa_radiador", "Tapa de radiador";
    Antenna => "antena", "Antena";
    Registration => "documentacion", "Documentación";
    InsuranceProof => "comprobante_seguro", "Comprobante de seguro";
}

impl fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Estado de los 35 ítems, indexado por `InventoryItem`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inventory {
    flags: [bool; INVENTORY_SIZE],
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            flags: [false; INVENTORY_SIZE],
        }
    }
}

impl Inventory {
    /// Todos los ítems presentes
    pub fn complete() -> Self {
        Self {
            flags: [true; INVENTORY_SIZE],
        }
    }

    pub fn checked(&self, item: InventoryItem) -> bool {
        self.flags[item as usize]
    }

    pub fn set(&mut self, item: InventoryItem, present: bool) {
        self.flags[item as usize] = present;
    }

    pub fn iter(&self) -> impl Iterator<Item = (InventoryItem, bool)> + '_ {
        InventoryItem::ALL
            .into_iter()
            .map(move |item| (item, self.checked(item)))
    }

    pub fn count_checked(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }

    pub fn missing(&self) -> Vec<InventoryItem> {
        self.iter().filter(|(_, ok)| !ok).map(|(item, _)| item).collect()
    }

    /// Leer los flags desde una fila cruda; columnas ausentes valen `false`
    pub fn from_row(row: &Map<String, Value>) -> Self {
        let mut inventory = Self::default();
        for item in InventoryItem::ALL {
            if let Some(value) = row.get(item.key()) {
                inventory.set(item, parse_flag(value));
            }
        }
        inventory
    }

    /// Columnas `0/1` tal como las espera el backend
    pub fn to_row(&self) -> Map<String, Value> {
        self.iter()
            .map(|(item, ok)| (item.key().to_string(), Value::from(u8::from(ok))))
            .collect()
    }
}

// En la vista el inventario es un mapa `clave -> bool`
impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(INVENTORY_SIZE))?;
        for (item, ok) in self.iter() {
            map.serialize_entry(item.key(), &ok)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Inventory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct InventoryVisitor;

        impl<'de> Visitor<'de> for InventoryVisitor {
            type Value = Inventory;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("un mapa de ítems de inventario")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Inventory, A::Error> {
                let mut row = Map::new();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    row.insert(key, value);
                }
                Ok(Inventory::from_row(&row))
            }
        }

        deserializer.deserialize_map(InventoryVisitor)
    }
}
