use chrono::Local;
use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::payment_order::{status_for_display, status_for_storage, PaymentOrder};
use crate::repositories::write_validated;
use crate::services::dual_path::{settle_find, settle_list, settle_write, DualPathExecutor, ReadPlan, WritePlan};
use crate::utils::errors::DataResult;

const COLUMNS: &[&str] = &["codigo_orden", "fecha", "ruc_cliente", "estado"];

/// Órdenes de pago; el estado se traduce en cada lectura y escritura
pub struct PaymentOrderRepository {
    executor: DualPathExecutor,
}

impl PaymentOrderRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    /// Sin fecha se registra la de hoy, igual en ambas rutas
    pub async fn create(&self, order: &PaymentOrder) -> bool {
        let plan = create_plan(order);
        settle_write("crear orden de pago", write_validated(&self.executor, order, plan).await)
    }

    pub async fn update(&self, order: &PaymentOrder) -> bool {
        let plan = WritePlan::new("actualizar orden de pago")
            .procedure("sp_actualizar_orden_de_pago", params(order))
            .direct(Statement::with_params(
                r#"UPDATE orden_de_pago
                   SET fecha = COALESCE($2, fecha), ruc_cliente = $3, estado = $4
                   WHERE codigo_orden = $1"#,
                params(order),
            ))
            .require_rows();
        settle_write("actualizar orden de pago", write_validated(&self.executor, order, plan).await)
    }

    /// La ruta directa borra primero los detalles y luego la orden
    pub async fn delete(&self, code: &str) -> bool {
        settle_write("eliminar orden de pago", self.executor.write(&delete_plan(code)).await)
    }

    pub async fn list(&self) -> Vec<PaymentOrder> {
        let plan = ReadPlan::direct(
            "listar órdenes",
            Statement::new("SELECT codigo_orden, fecha, ruc_cliente, estado FROM orden_de_pago ORDER BY fecha DESC"),
            map_row,
        )
        .preferred(Statement::set_returning("sp_listar_ordenes", vec![]), COLUMNS);
        settle_list("listar órdenes", self.executor.read(&plan).await)
    }

    pub async fn find(&self, code: &str) -> Option<PaymentOrder> {
        let plan = ReadPlan::direct(
            "buscar orden de pago",
            Statement::new("SELECT codigo_orden, fecha, ruc_cliente, estado FROM orden_de_pago WHERE codigo_orden = $1")
                .bind(code),
            map_row,
        );
        settle_find("buscar orden de pago", self.executor.read(&plan).await)
    }
}

fn params(o: &PaymentOrder) -> Vec<SqlValue> {
    vec![
        o.code.as_str().into(),
        SqlValue::opt_date(o.date),
        o.client_ruc.as_str().into(),
        SqlValue::opt_text(status_for_storage(&o.status).as_deref()),
    ]
}

fn create_plan(order: &PaymentOrder) -> WritePlan {
    let dated = PaymentOrder {
        date: Some(order.date.unwrap_or_else(|| Local::now().date_naive())),
        ..order.clone()
    };
    WritePlan::new("crear orden de pago")
        .procedure("sp_crear_orden_de_pago", params(&dated))
        .direct(Statement::with_params(
            r#"INSERT INTO orden_de_pago (codigo_orden, fecha, ruc_cliente, estado)
               VALUES ($1, $2, $3, $4)"#,
            params(&dated),
        ))
}

fn delete_plan(code: &str) -> WritePlan {
    WritePlan::new("eliminar orden de pago")
        .procedure("sp_eliminar_orden_de_pago", vec![code.into()])
        .function("sp_eliminar_orden_de_pago", vec![code.into()])
        .direct_steps(vec![
            Statement::new("DELETE FROM detalle_orden WHERE codigo_orden = $1").bind(code),
            Statement::new("DELETE FROM orden_de_pago WHERE codigo_orden = $1").bind(code),
        ])
        .require_rows()
}

fn map_row(row: &RowRef<'_>) -> DataResult<PaymentOrder> {
    let stored = row.opt_text("estado")?;
    Ok(PaymentOrder {
        code: row.text("codigo_orden")?,
        date: row.opt_date("fecha")?,
        client_ruc: row.text("ruc_cliente")?,
        status: status_for_display(stored.as_deref()),
    })
}
