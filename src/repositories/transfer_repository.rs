use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::transfer::Transfer;
use crate::repositories::{three_tier_delete, write_validated};
use crate::services::dual_path::{settle_find, settle_list, settle_write, DualPathExecutor, ReadPlan, WritePlan};
use crate::utils::errors::{DataError, DataResult};

const COLUMNS: &[&str] = &[
    "codigo_traslado",
    "codigo_guia",
    "placa",
    "licencia",
    "fecha_inicio",
    "fecha_fin",
    "estado_traslado",
    "observaciones",
];

const SELECT_ALL: &str = r#"SELECT codigo_traslado, codigo_guia, placa, licencia, fecha_inicio, fecha_fin,
          estado_traslado, observaciones
   FROM traslado"#;

/// Traslados; sin fecha de fin registrada se devuelve la de inicio
pub struct TransferRepository {
    executor: DualPathExecutor,
}

impl TransferRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    pub async fn register(&self, transfer: &Transfer) -> bool {
        let plan = WritePlan::new("registrar traslado")
            .procedure("sp_registrar_traslado", params(transfer))
            .direct(Statement::with_params(
                r#"INSERT INTO traslado (codigo_traslado, codigo_guia, placa, licencia, fecha_inicio, fecha_fin,
                       estado_traslado, observaciones)
                   VALUES ($1, $2, $3, $4, $5, COALESCE($6, $5), $7, $8)"#,
                params(transfer),
            ));
        settle_write("registrar traslado", write_validated(&self.executor, transfer, plan).await)
    }

    pub async fn update(&self, transfer: &Transfer) -> bool {
        let plan = WritePlan::new("actualizar traslado")
            .procedure("sp_actualizar_traslado", params(transfer))
            .direct(Statement::with_params(
                r#"UPDATE traslado
                   SET codigo_guia = $2, placa = $3, licencia = $4, fecha_inicio = $5,
                       fecha_fin = COALESCE($6, $5), estado_traslado = $7, observaciones = $8
                   WHERE codigo_traslado = $1"#,
                params(transfer),
            ))
            .require_rows();
        settle_write("actualizar traslado", write_validated(&self.executor, transfer, plan).await)
    }

    pub async fn delete(&self, code: &str) -> bool {
        let plan = three_tier_delete(
            "eliminar traslado",
            "sp_eliminar_traslado",
            code,
            Statement::new("DELETE FROM traslado WHERE codigo_traslado = $1").bind(code),
        )
        .require_rows();
        settle_write("eliminar traslado", self.executor.write(&plan).await)
    }

    pub async fn list(&self) -> Vec<Transfer> {
        let plan = ReadPlan::direct(
            "listar traslados",
            Statement::new(format!("{} ORDER BY fecha_inicio DESC", SELECT_ALL)),
            map_row,
        )
        .preferred(Statement::set_returning("sp_listar_traslados", vec![]), COLUMNS);
        settle_list("listar traslados", self.executor.read(&plan).await)
    }

    /// El traslado más reciente (por fecha de inicio) de una guía
    pub async fn find_latest_by_waybill(&self, waybill_code: &str) -> Option<Transfer> {
        let plan = ReadPlan::direct(
            "buscar traslado por guía",
            Statement::new(format!(
                "{} WHERE codigo_guia = $1 ORDER BY fecha_inicio DESC LIMIT 1",
                SELECT_ALL
            ))
            .bind(waybill_code),
            map_row,
        )
        .preferred(
            Statement::set_returning("sp_obtener_traslado_por_guia", vec![waybill_code.into()]),
            COLUMNS,
        );

        let mut transfers = settle_list("buscar traslado por guía", self.executor.read(&plan).await);
        transfers.sort_by(|a, b| b.start.cmp(&a.start));
        settle_find("buscar traslado por guía", Ok(transfers))
    }
}

fn params(t: &Transfer) -> Vec<SqlValue> {
    vec![
        t.code.as_str().into(),
        t.waybill_code.as_str().into(),
        t.plate.as_str().into(),
        t.license.as_str().into(),
        t.start.into(),
        SqlValue::opt_timestamp(t.end),
        SqlValue::text_or_null(&t.status),
        SqlValue::text_or_null(&t.notes),
    ]
}

fn map_row(row: &RowRef<'_>) -> DataResult<Transfer> {
    let start = row
        .opt_timestamp("fecha_inicio")?
        .ok_or_else(|| DataError::Mapping("fecha_inicio is NULL".to_string()))?;
    let end = row.opt_timestamp("fecha_fin")?.unwrap_or(start);

    Ok(Transfer {
        code: row.text("codigo_traslado")?,
        waybill_code: row.text("codigo_guia")?,
        plate: row.text("placa")?,
        license: row.text("licencia")?,
        start,
        end: Some(end),
        status: row.text("estado_traslado")?,
        notes: row.text("observaciones")?,
    })
}
