use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::waybill_line::WaybillLine;
use crate::repositories::write_validated;
use crate::services::dual_path::{settle_list, settle_write, DualPathExecutor, ReadPlan, WritePlan};
use crate::utils::errors::DataResult;

const COLUMNS: &[&str] = &[
    "codigo_guia",
    "bien_normalizado",
    "codigo_bien",
    "codigo_producto_sunat",
    "partida_arancelaria",
    "codigo_gtin",
    "descripcion",
    "unidad_medida",
    "cantidad",
];

pub struct WaybillLineRepository {
    executor: DualPathExecutor,
}

impl WaybillLineRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    pub async fn add(&self, line: &WaybillLine) -> bool {
        let plan = WritePlan::new("agregar detalle de guía")
            .procedure("sp_agregar_detalle_guia", params(line))
            .direct(Statement::with_params(
                r#"INSERT INTO detalle_guia (codigo_guia, numero_item, bien_normalizado, codigo_bien,
                       codigo_producto_sunat, partida_arancelaria, codigo_gtin, descripcion, unidad_medida, cantidad)
                   VALUES (
                       $1,
                       (SELECT COALESCE(MAX(numero_item), 0) + 1 FROM detalle_guia WHERE codigo_guia = $1),
                       $2, $3, $4, $5, $6, $7, $8, $9
                   )"#,
                params(line),
            ));
        settle_write("agregar detalle de guía", write_validated(&self.executor, line, plan).await)
    }

    /// Las líneas se numeran en orden de lectura, desde 1
    pub async fn list(&self, waybill_code: &str) -> Vec<WaybillLine> {
        let plan = ReadPlan::direct(
            "listar detalle de guía",
            Statement::new(
                r#"SELECT codigo_guia, bien_normalizado, codigo_bien, codigo_producto_sunat, partida_arancelaria,
                          codigo_gtin, descripcion, unidad_medida, cantidad
                   FROM detalle_guia WHERE codigo_guia = $1 ORDER BY numero_item"#,
            )
            .bind(waybill_code),
            map_row,
        )
        .preferred(
            Statement::set_returning("sp_listar_detalle_guia", vec![waybill_code.into()]),
            COLUMNS,
        );

        let mut lines = settle_list("listar detalle de guía", self.executor.read(&plan).await);
        for (index, line) in lines.iter_mut().enumerate() {
            line.line_number = index as i32 + 1;
        }
        lines
    }
}

fn params(l: &WaybillLine) -> Vec<SqlValue> {
    vec![
        l.waybill_code.as_str().into(),
        SqlValue::text_or_null(&l.normalized_goods),
        SqlValue::text_or_null(&l.goods_code),
        SqlValue::text_or_null(&l.sunat_product_code),
        SqlValue::text_or_null(&l.tariff_heading),
        SqlValue::text_or_null(&l.gtin),
        l.description.as_str().into(),
        SqlValue::text_or_null(&l.unit),
        SqlValue::text_or_null(&l.quantity),
    ]
}

fn map_row(row: &RowRef<'_>) -> DataResult<WaybillLine> {
    Ok(WaybillLine {
        waybill_code: row.text("codigo_guia")?,
        line_number: 0,
        normalized_goods: row.text("bien_normalizado")?,
        goods_code: row.text("codigo_bien")?,
        sunat_product_code: row.text("codigo_producto_sunat")?,
        tariff_heading: row.text("partida_arancelaria")?,
        gtin: row.text("codigo_gtin")?,
        description: row.text("descripcion")?,
        unit: row.text("unidad_medida")?,
        quantity: row.text("cantidad")?,
    })
}
