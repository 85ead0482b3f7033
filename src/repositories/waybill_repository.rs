use std::sync::Arc;

use validator::Validate;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::session::Session;
use crate::models::waybill::{Waybill, STATUS_ISSUED};
use crate::repositories::location_repository::location_exists;
use crate::services::dual_path::{
    settle_find, settle_list, settle_write, DualPathExecutor, ReadPlan, TierKind, WritePlan,
};
use crate::utils::errors::{validation_error, DataResult};
use crate::utils::validation::is_valid_ruc;

const COLUMNS: &[&str] = &[
    "codigo_guia",
    "serie",
    "numero",
    "codigo_orden",
    "ruc_remitente",
    "ruc_destinatario",
    "direccion_partida",
    "direccion_llegada",
    "ubigeo_origen",
    "ubigeo_destino",
    "motivo_traslado",
    "modalidad_transporte",
    "peso_total",
    "numero_bultos",
    "fecha_emision",
    "hora_emision",
    "estado_guia",
];

const SELECT_ALL: &str = r#"SELECT codigo_guia, serie, numero, codigo_orden, ruc_remitente, ruc_destinatario,
          direccion_partida, direccion_llegada, ubigeo_origen, ubigeo_destino,
          motivo_traslado, modalidad_transporte, peso_total, numero_bultos,
          fecha_emision, hora_emision, estado_guia
   FROM guia_remision"#;

/// Cabeceras de guía de remisión
pub struct WaybillRepository {
    executor: DualPathExecutor,
}

impl WaybillRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    /// Emitir la guía; la fecha, hora y estado inicial los fija la base
    pub async fn emit(&self, waybill: &Waybill) -> bool {
        settle_write("emitir guía", self.checked_emit(waybill).await)
    }

    /// Emitir en nombre del remitente de la sesión cuando la guía no trae uno
    pub async fn emit_for(&self, session: &Session, waybill: &Waybill) -> bool {
        let mut waybill = waybill.clone();
        if waybill.sender_ruc.trim().is_empty() {
            match session.current_ruc() {
                Some(ruc) => waybill.sender_ruc = ruc.to_string(),
                None => {
                    log::error!("❌ emitir guía {}: no hay remitente en sesión", waybill.code);
                    return false;
                }
            }
        }
        self.emit(&waybill).await
    }

    pub async fn update_status(&self, code: &str, status: &str) -> bool {
        let status = status.trim();
        if status.is_empty() {
            log::error!("❌ actualizar estado de guía {}: estado vacío", code);
            return false;
        }
        let plan = WritePlan::new("actualizar estado de guía")
            .procedure("sp_actualizar_estado_guia", vec![code.into(), status.into()])
            .direct(
                Statement::new("UPDATE guia_remision SET estado_guia = $2 WHERE codigo_guia = $1")
                    .bind(code)
                    .bind(status),
            )
            .require_rows();
        settle_write("actualizar estado de guía", self.executor.write(&plan).await)
    }

    pub async fn list(&self) -> Vec<Waybill> {
        let plan = ReadPlan::direct(
            "listar guías",
            Statement::new(format!("{} ORDER BY fecha_emision DESC, codigo_guia", SELECT_ALL)),
            map_row,
        )
        .preferred(Statement::set_returning("sp_listar_guias", vec![]), COLUMNS);
        settle_list("listar guías", self.executor.read(&plan).await)
    }

    pub async fn find(&self, code: &str) -> Option<Waybill> {
        let plan = ReadPlan::direct(
            "buscar guía",
            Statement::new(format!("{} WHERE codigo_guia = $1", SELECT_ALL)).bind(code),
            map_row,
        )
        .preferred(Statement::set_returning("sp_buscar_guia", vec![code.into()]), COLUMNS);
        settle_find("buscar guía", self.executor.read(&plan).await)
    }

    async fn checked_emit(&self, waybill: &Waybill) -> DataResult<TierKind> {
        waybill.validate()?;
        if !is_valid_ruc(&waybill.sender_ruc) {
            return Err(validation_error("ruc_remitente", "debe tener 11 dígitos"));
        }
        for code in [&waybill.origin_location, &waybill.destination_location] {
            if !location_exists(&self.executor, code).await? {
                return Err(validation_error("ubigeo", &format!("ubigeo '{}' no existe", code)));
            }
        }
        self.executor.write(&emit_plan(waybill)).await
    }
}

fn emit_params(w: &Waybill) -> Vec<SqlValue> {
    vec![
        w.code.as_str().into(),
        SqlValue::text_or_null(&w.series),
        SqlValue::text_or_null(&w.number),
        SqlValue::opt_text(w.order_code.as_deref()),
        w.sender_ruc.trim().into(),
        w.recipient_ruc.trim().into(),
        SqlValue::text_or_null(&w.origin_address),
        SqlValue::text_or_null(&w.destination_address),
        w.origin_location.trim().into(),
        w.destination_location.trim().into(),
        SqlValue::text_or_null(&w.motive),
        SqlValue::text_or_null(&w.modality),
        SqlValue::numeric_from_f64(w.total_weight),
        w.bundle_count.into(),
    ]
}

fn emit_plan(w: &Waybill) -> WritePlan {
    WritePlan::new("emitir guía")
        .procedure("sp_emitir_guia", emit_params(w))
        .direct(Statement::with_params(
            format!(
                r#"INSERT INTO guia_remision (codigo_guia, serie, numero, codigo_orden, ruc_remitente, ruc_destinatario,
                       direccion_partida, direccion_llegada, ubigeo_origen, ubigeo_destino,
                       motivo_traslado, modalidad_transporte, peso_total, numero_bultos,
                       fecha_emision, hora_emision, estado_guia)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                           CURRENT_DATE, LOCALTIME, '{}')"#,
                STATUS_ISSUED
            ),
            emit_params(w),
        ))
}

fn map_row(row: &RowRef<'_>) -> DataResult<Waybill> {
    Ok(Waybill {
        code: row.text("codigo_guia")?,
        series: row.text("serie")?,
        number: row.text("numero")?,
        order_code: row.opt_text("codigo_orden")?,
        sender_ruc: row.text("ruc_remitente")?,
        recipient_ruc: row.text("ruc_destinatario")?,
        origin_address: row.text("direccion_partida")?,
        destination_address: row.text("direccion_llegada")?,
        origin_location: row.text("ubigeo_origen")?,
        destination_location: row.text("ubigeo_destino")?,
        motive: row.text("motivo_traslado")?,
        modality: row.text("modalidad_transporte")?,
        total_weight: row.f64_or_zero("peso_total")?,
        bundle_count: row
            .opt_i64("numero_bultos")?
            .and_then(|n| i32::try_from(n).ok())
            .unwrap_or(0),
        issue_date: row.opt_date("fecha_emision")?,
        issue_time: row.opt_time("hora_emision")?,
        status: row.text("estado_guia")?,
    })
}
