// ==========================================
// App Granja - Entity catalog
// ==========================================
// Explicit, ordered (entity, display config) list.
// Order = dependency order: an entity only depends on entities
// listed before it. Schema creation and CLI listing walk it as-is.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Granja,
    Galpon,
    Raza,
    Alimento,
    Lote,
    SeguimientoDiario,
    SeguimientoEngorde,
    MortalidadDiaria,
    MortalidadSemanal,
    Venta,
    TipoHuevo,
    DetalleVenta,
    Vacuna,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Granja => "GRANJA",
            EntityKind::Galpon => "GALPON",
            EntityKind::Raza => "RAZA",
            EntityKind::Alimento => "ALIMENTO",
            EntityKind::Lote => "LOTE",
            EntityKind::SeguimientoDiario => "SEGUIMIENTO_DIARIO",
            EntityKind::SeguimientoEngorde => "SEGUIMIENTO_ENGORDE",
            EntityKind::MortalidadDiaria => "MORTALIDAD_DIARIA",
            EntityKind::MortalidadSemanal => "MORTALIDAD_SEMANAL",
            EntityKind::Venta => "VENTA",
            EntityKind::TipoHuevo => "TIPO_HUEVO",
            EntityKind::DetalleVenta => "DETALLE_VENTA",
            EntityKind::Vacuna => "VACUNA",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_uppercase().replace('-', "_");
        ENTITY_CATALOG
            .iter()
            .find(|e| e.kind.as_str() == key || e.table.eq_ignore_ascii_case(s.trim()))
            .map(|e| e.kind)
            .ok_or_else(|| format!("entidad desconocida: {}", s))
    }
}

/// Display configuration of one entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDisplay {
    pub kind: EntityKind,
    pub table: &'static str,
    pub label: &'static str,
    pub label_plural: &'static str,
    pub list_columns: &'static [&'static str],
    pub order_by: &'static str,
    pub depends_on: &'static [EntityKind],
}

pub static ENTITY_CATALOG: &[EntityDisplay] = &[
    EntityDisplay {
        kind: EntityKind::Granja,
        table: "farm",
        label: "Granja",
        label_plural: "Granjas",
        list_columns: &["codigo_granja", "nombre", "capacidad_total_aves", "estado"],
        order_by: "nombre",
        depends_on: &[],
    },
    EntityDisplay {
        kind: EntityKind::Galpon,
        table: "shed",
        label: "Galpón",
        label_plural: "Galpones",
        list_columns: &["numero_galpon", "tipo_galpon", "capacidad_aves", "farm_id"],
        order_by: "farm_id, numero_galpon",
        depends_on: &[EntityKind::Granja],
    },
    EntityDisplay {
        kind: EntityKind::Raza,
        table: "breed",
        label: "Raza",
        label_plural: "Razas",
        list_columns: &["nombre"],
        order_by: "nombre",
        depends_on: &[],
    },
    EntityDisplay {
        kind: EntityKind::Alimento,
        table: "feed",
        label: "Alimento",
        label_plural: "Alimentos",
        list_columns: &["nombre", "etapa", "contenido_proteina", "energia_metabolizable", "activo"],
        order_by: "nombre, etapa",
        depends_on: &[],
    },
    EntityDisplay {
        kind: EntityKind::Lote,
        table: "batch",
        label: "Lote",
        label_plural: "Lotes",
        list_columns: &["codigo_lote", "fecha_inicio", "cantidad_inicial_aves", "estado"],
        order_by: "fecha_inicio DESC, codigo_lote",
        depends_on: &[EntityKind::Galpon, EntityKind::Raza, EntityKind::Alimento],
    },
    EntityDisplay {
        kind: EntityKind::SeguimientoDiario,
        table: "daily_tracking",
        label: "Seguimiento Diario",
        label_plural: "Seguimientos Diarios",
        list_columns: &[
            "batch_id",
            "fecha_seguimiento",
            "tipo_seguimiento",
            "huevos_totales",
            "peso_promedio_ave",
            "consumo_alimento_kg",
            "mortalidad",
        ],
        order_by: "fecha_seguimiento DESC",
        depends_on: &[EntityKind::Lote],
    },
    EntityDisplay {
        kind: EntityKind::SeguimientoEngorde,
        table: "growth_detail",
        label: "Seguimiento de Engorde",
        label_plural: "Seguimientos de Engorde",
        list_columns: &[
            "tracking_id",
            "ganancia_diaria_peso",
            "conversion_alimenticia",
            "eficiencia_energetica",
            "eficiencia_proteica",
            "relacion_energia_proteina",
        ],
        order_by: "calculated_at DESC",
        depends_on: &[EntityKind::SeguimientoDiario],
    },
    EntityDisplay {
        kind: EntityKind::MortalidadDiaria,
        table: "daily_mortality",
        label: "Mortalidad Diaria",
        label_plural: "Mortalidades Diarias",
        list_columns: &["batch_id", "fecha", "cantidad_muertes", "causa"],
        order_by: "fecha DESC",
        depends_on: &[EntityKind::Lote],
    },
    EntityDisplay {
        kind: EntityKind::MortalidadSemanal,
        table: "weekly_mortality",
        label: "Mortalidad Semanal",
        label_plural: "Mortalidades Semanales",
        list_columns: &["batch_id", "anio", "semana", "total_muertes", "porcentaje_mortalidad"],
        order_by: "anio DESC, semana DESC",
        depends_on: &[EntityKind::Lote],
    },
    EntityDisplay {
        kind: EntityKind::Venta,
        table: "sale",
        label: "Venta",
        label_plural: "Ventas",
        list_columns: &["cliente", "fecha_venta", "total_venta"],
        order_by: "fecha_venta DESC",
        depends_on: &[],
    },
    EntityDisplay {
        kind: EntityKind::TipoHuevo,
        table: "egg_type",
        label: "Tipo de Huevo",
        label_plural: "Tipos de Huevo",
        list_columns: &["clasificacion", "descripcion"],
        order_by: "clasificacion",
        depends_on: &[],
    },
    EntityDisplay {
        kind: EntityKind::DetalleVenta,
        table: "sale_item",
        label: "Detalle de Venta",
        label_plural: "Detalles de Venta",
        list_columns: &["sale_id", "egg_type_id", "cantidad", "precio_unitario", "subtotal_item"],
        order_by: "sale_id",
        depends_on: &[EntityKind::Venta, EntityKind::TipoHuevo],
    },
    EntityDisplay {
        kind: EntityKind::Vacuna,
        table: "vaccine",
        label: "Vacuna",
        label_plural: "Vacunas",
        list_columns: &["nombre_comercial", "principio_activo", "fecha_vencimiento", "stock_ml", "activo"],
        order_by: "nombre_comercial",
        depends_on: &[],
    },
];

/// Display config of an entity
pub fn display_of(kind: EntityKind) -> &'static EntityDisplay {
    ENTITY_CATALOG
        .iter()
        .find(|e| e.kind == kind)
        .unwrap_or(&ENTITY_CATALOG[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_is_in_dependency_order() {
        let mut seen = HashSet::new();
        for entry in ENTITY_CATALOG {
            for dep in entry.depends_on {
                assert!(seen.contains(dep), "{} listed before its dependency {}", entry.kind, dep);
            }
            assert!(seen.insert(entry.kind), "{} listed twice", entry.kind);
        }
    }

    #[test]
    fn test_every_kind_has_display_config() {
        for entry in ENTITY_CATALOG {
            assert_eq!(display_of(entry.kind).kind, entry.kind);
            assert!(!entry.list_columns.is_empty());
        }
        assert_eq!(ENTITY_CATALOG.len(), 13);
    }

    #[test]
    fn test_parse_by_kind_or_table() {
        assert_eq!("lote".parse::<EntityKind>().unwrap(), EntityKind::Lote);
        assert_eq!("daily_tracking".parse::<EntityKind>().unwrap(), EntityKind::SeguimientoDiario);
        assert_eq!("seguimiento-engorde".parse::<EntityKind>().unwrap(), EntityKind::SeguimientoEngorde);
        assert_eq!("sale_item".parse::<EntityKind>().unwrap(), EntityKind::DetalleVenta);
        assert!("sensor".parse::<EntityKind>().is_err());
    }
}
