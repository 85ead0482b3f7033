use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::sender::Sender;
use crate::repositories::{exists, three_tier_delete, write_validated};
use crate::services::dual_path::{settle_find, settle_list, settle_write, DualPathExecutor, ReadPlan, WritePlan};
use crate::utils::errors::DataResult;

const COLUMNS: &[&str] = &[
    "ruc",
    "nombre_empresa",
    "razon_social",
    "telefono",
    "email",
    "calle_direccion",
    "codigo_ubigeo",
];

const SELECT_ALL: &str = r#"SELECT ruc, nombre_empresa, razon_social, telefono, email, calle_direccion, codigo_ubigeo
   FROM remitente"#;

pub struct SenderRepository {
    executor: DualPathExecutor,
}

impl SenderRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    pub async fn insert(&self, sender: &Sender) -> bool {
        let plan = WritePlan::new("insertar remitente")
            .procedure("sp_insertar_remitente", params(sender))
            .direct(Statement::with_params(
                r#"INSERT INTO remitente (ruc, nombre_empresa, razon_social, telefono, email, calle_direccion, codigo_ubigeo)
                   VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
                params(sender),
            ));
        settle_write("insertar remitente", write_validated(&self.executor, sender, plan).await)
    }

    pub async fn update(&self, sender: &Sender) -> bool {
        let plan = WritePlan::new("actualizar remitente")
            .procedure("sp_actualizar_remitente", params(sender))
            .direct(Statement::with_params(
                r#"UPDATE remitente
                   SET nombre_empresa = $2, razon_social = $3, telefono = $4, email = $5,
                       calle_direccion = $6, codigo_ubigeo = $7
                   WHERE ruc = $1"#,
                params(sender),
            ))
            .require_rows();
        settle_write("actualizar remitente", write_validated(&self.executor, sender, plan).await)
    }

    pub async fn delete(&self, ruc: &str) -> bool {
        let plan = three_tier_delete(
            "eliminar remitente",
            "sp_eliminar_remitente",
            ruc,
            Statement::new("DELETE FROM remitente WHERE ruc = $1").bind(ruc),
        )
        .require_rows();
        settle_write("eliminar remitente", self.executor.write(&plan).await)
    }

    pub async fn find(&self, ruc: &str) -> Option<Sender> {
        let plan = ReadPlan::direct(
            "buscar remitente",
            Statement::new(format!("{} WHERE ruc = $1", SELECT_ALL)).bind(ruc),
            map_row,
        )
        .preferred(Statement::set_returning("sp_buscar_remitente", vec![ruc.into()]), COLUMNS);
        settle_find("buscar remitente", self.executor.read(&plan).await)
    }

    pub async fn list(&self) -> Vec<Sender> {
        let plan = ReadPlan::direct(
            "listar remitentes",
            Statement::new(format!("{} ORDER BY nombre_empresa", SELECT_ALL)),
            map_row,
        )
        .preferred(Statement::set_returning("sp_listar_remitentes", vec![]), COLUMNS);
        settle_list("listar remitentes", self.executor.read(&plan).await)
    }

    pub async fn exists(&self, ruc: &str) -> bool {
        let stmt = Statement::new("SELECT 1 FROM remitente WHERE ruc = $1").bind(ruc);
        match exists(&self.executor, &stmt).await {
            Ok(found) => found,
            Err(e) => {
                log::error!("❌ verificar remitente {} falló: {}", ruc, e);
                false
            }
        }
    }
}

fn params(s: &Sender) -> Vec<SqlValue> {
    vec![
        s.ruc.as_str().into(),
        s.company_name.as_str().into(),
        SqlValue::text_or_null(&s.legal_name),
        SqlValue::text_or_null(&s.phone),
        SqlValue::text_or_null(&s.email),
        SqlValue::text_or_null(&s.street),
        SqlValue::text_or_null(&s.location_code),
    ]
}

fn map_row(row: &RowRef<'_>) -> DataResult<Sender> {
    Ok(Sender {
        ruc: row.text("ruc")?,
        company_name: row.text("nombre_empresa")?,
        legal_name: row.text("razon_social")?,
        phone: row.text("telefono")?,
        email: row.text("email")?,
        street: row.text("calle_direccion")?,
        location_code: row.text("codigo_ubigeo")?,
    })
}
