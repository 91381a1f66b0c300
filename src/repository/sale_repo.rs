// ==========================================
// App Granja - Sale repository
// ==========================================
// sale, sale_item and the egg_type lookup table
// ==========================================

use crate::domain::sale::{EggType, Sale, SaleItem};
use crate::domain::types::EggClass;
use crate::repository::error::{
    parse_datetime, parse_enum, RepositoryError, RepositoryResult, DATETIME_FMT, DATE_FMT,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

pub struct SaleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SaleRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, sale: &Sale) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sale (sale_id, cliente, fecha_venta, subtotal, impuesto, total_venta, vendedor, observaciones)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                sale.sale_id,
                sale.cliente,
                sale.fecha_venta.format(DATETIME_FMT).to_string(),
                sale.subtotal,
                sale.impuesto,
                sale.total_venta,
                sale.vendedor,
                sale.observaciones,
            ],
        )?;
        Ok(())
    }

    /// Sales whose date falls in [start, end], oldest first
    pub fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> RepositoryResult<Vec<Sale>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT sale_id, cliente, fecha_venta, subtotal, impuesto, total_venta, vendedor, observaciones
            FROM sale
            WHERE date(fecha_venta) BETWEEN ?1 AND ?2
            ORDER BY fecha_venta
            "#,
        )?;
        let rows = stmt
            .query_map(
                params![start.format(DATE_FMT).to_string(), end.format(DATE_FMT).to_string()],
                map_sale,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ==========================================
    // Lines / egg types
    // ==========================================

    pub fn insert_egg_type(&self, t: &EggType) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO egg_type (egg_type_id, clasificacion, descripcion) VALUES (?1, ?2, ?3)",
            params![t.egg_type_id, t.clasificacion.as_str(), t.descripcion],
        )?;
        Ok(())
    }

    pub fn find_egg_type(&self, clasificacion: EggClass) -> RepositoryResult<Option<EggType>> {
        let conn = self.get_conn()?;
        let t = conn
            .query_row(
                "SELECT egg_type_id, clasificacion, descripcion FROM egg_type WHERE clasificacion = ?1",
                params![clasificacion.as_str()],
                |row| {
                    Ok(EggType {
                        egg_type_id: row.get(0)?,
                        clasificacion: parse_enum::<EggClass>(1, &row.get::<_, String>(1)?)?,
                        descripcion: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(t)
    }

    pub fn insert_item(&self, item: &SaleItem) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO sale_item (item_id, sale_id, egg_type_id, cantidad, precio_unitario, subtotal_item)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                item.item_id,
                item.sale_id,
                item.egg_type_id,
                item.cantidad,
                item.precio_unitario,
                item.subtotal_item,
            ],
        )?;
        Ok(())
    }

    /// Units sold per egg class over all sales, largest first
    pub fn units_by_egg_class(&self) -> RepositoryResult<Vec<(EggClass, i64)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT t.clasificacion, SUM(i.cantidad) AS total
            FROM sale_item i
            JOIN egg_type t ON t.egg_type_id = i.egg_type_id
            GROUP BY t.clasificacion
            ORDER BY total DESC, t.clasificacion
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    parse_enum::<EggClass>(0, &row.get::<_, String>(0)?)?,
                    row.get::<_, i64>(1)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn map_sale(row: &Row<'_>) -> rusqlite::Result<Sale> {
    Ok(Sale {
        sale_id: row.get(0)?,
        cliente: row.get(1)?,
        fecha_venta: parse_datetime(2, &row.get::<_, String>(2)?)?,
        subtotal: row.get(3)?,
        impuesto: row.get(4)?,
        total_venta: row.get(5)?,
        vendedor: row.get(6)?,
        observaciones: row.get(7)?,
    })
}
