use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::order_line::OrderLine;
use crate::repositories::{three_tier_delete, write_validated};
use crate::services::dual_path::{settle_list, settle_write, DualPathExecutor, ReadPlan, WritePlan};
use crate::utils::errors::{DataError, DataResult};

const REPORT_COLUMNS: &[&str] = &[
    "codigo_orden",
    "codigo_producto",
    "nombre_producto",
    "cantidad",
    "precio_unitario",
    "subtotal",
];

pub struct OrderLineRepository {
    executor: DualPathExecutor,
}

impl OrderLineRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    /// El número de ítem lo asigna la base
    pub async fn add(&self, line: &OrderLine) -> bool {
        let plan = WritePlan::new("agregar detalle de orden")
            .procedure("sp_agregar_detalle_orden", params(line))
            .direct(Statement::with_params(
                r#"INSERT INTO detalle_orden (codigo_orden, numero_item, codigo_producto, cantidad, precio_unitario, subtotal)
                   VALUES (
                       $1,
                       (SELECT COALESCE(MAX(numero_item), 0) + 1 FROM detalle_orden WHERE codigo_orden = $1),
                       $2, $3, $4, $3 * $4
                   )"#,
                params(line),
            ));
        settle_write("agregar detalle de orden", write_validated(&self.executor, line, plan).await)
    }

    /// Borra todos los detalles de la orden
    pub async fn delete_for_order(&self, order_code: &str) -> bool {
        let plan = three_tier_delete(
            "eliminar detalles de orden",
            "sp_eliminar_detalle_orden",
            order_code,
            Statement::new("DELETE FROM detalle_orden WHERE codigo_orden = $1").bind(order_code),
        );
        settle_write("eliminar detalles de orden", self.executor.write(&plan).await)
    }

    pub async fn list_for_order(&self, order_code: &str) -> Vec<OrderLine> {
        let plan = ReadPlan::direct(
            "listar detalles de orden",
            Statement::new(
                r#"SELECT d.numero_item, d.codigo_orden, d.codigo_producto, p.nombre_producto,
                          d.cantidad, d.precio_unitario, d.subtotal
                   FROM detalle_orden d
                   LEFT JOIN producto p ON p.codigo_producto = d.codigo_producto
                   WHERE d.codigo_orden = $1
                   ORDER BY d.numero_item"#,
            )
            .bind(order_code),
            map_row,
        )
        .preferred(
            Statement::set_returning("sp_reporte_detalle_orden", vec![order_code.into()]),
            REPORT_COLUMNS,
        );

        let mut lines = settle_list("listar detalles de orden", self.executor.read(&plan).await);
        for (index, line) in lines.iter_mut().enumerate() {
            if line.line_number == 0 {
                line.line_number = index as i32 + 1;
            }
        }
        lines
    }
}

fn params(l: &OrderLine) -> Vec<SqlValue> {
    vec![
        l.order_code.as_str().into(),
        l.product_code.as_str().into(),
        l.quantity.into(),
        l.unit_price.into(),
    ]
}

fn map_row(row: &RowRef<'_>) -> DataResult<OrderLine> {
    let quantity = row
        .opt_decimal("cantidad")?
        .ok_or_else(|| DataError::Mapping("cantidad is NULL".to_string()))?;
    let unit_price = row.opt_decimal("precio_unitario")?.unwrap_or_default();
    let subtotal = match row.try_get("subtotal").and_then(|v| v.as_decimal()) {
        Some(subtotal) => subtotal,
        None => quantity * unit_price,
    };

    Ok(OrderLine {
        order_code: row.text("codigo_orden")?,
        line_number: row
            .try_get("numero_item")
            .and_then(|v| v.as_i64())
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0),
        product_code: row.text("codigo_producto")?,
        product_name: row.try_get("nombre_producto").and_then(|v| v.as_text()),
        quantity,
        unit_price,
        subtotal,
    })
}
