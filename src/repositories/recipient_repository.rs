use std::sync::Arc;

use validator::Validate;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::recipient::Recipient;
use crate::repositories::location_repository::location_exists;
use crate::services::dual_path::{
    settle_find, settle_list, settle_write, DualPathExecutor, ReadPlan, TierKind, WritePlan,
};
use crate::utils::errors::{validation_error, DataResult};

const COLUMNS: &[&str] = &["ruc", "nombre", "numero_telefono", "calle_direccion", "codigo_ubigeo", "gmail"];

/// Destinatarios con borrado lógico
pub struct RecipientRepository {
    executor: DualPathExecutor,
}

impl RecipientRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    pub async fn insert(&self, recipient: &Recipient) -> bool {
        settle_write("insertar destinatario", self.checked_write(recipient, insert_plan(recipient)).await)
    }

    pub async fn update(&self, recipient: &Recipient) -> bool {
        settle_write("actualizar destinatario", self.checked_write(recipient, update_plan(recipient)).await)
    }

    /// Borrado lógico; repetirlo sobre un registro ya eliminado también es éxito
    pub async fn delete(&self, ruc: &str) -> bool {
        let plan = WritePlan::new("eliminar destinatario")
            .procedure("sp_eliminar_destinatario", vec![ruc.into()])
            .direct(Statement::new("UPDATE destinatario SET eliminado = true WHERE ruc = $1").bind(ruc));
        settle_write("eliminar destinatario", self.executor.write(&plan).await)
    }

    /// Quita la marca de eliminado; sobre un registro activo no cambia nada
    pub async fn recover(&self, ruc: &str) -> bool {
        let plan = WritePlan::new("recuperar destinatario")
            .direct(Statement::new("UPDATE destinatario SET eliminado = false WHERE ruc = $1").bind(ruc));
        settle_write("recuperar destinatario", self.executor.write(&plan).await)
    }

    pub async fn list(&self) -> Vec<Recipient> {
        settle_list("listar destinatarios", self.executor.read(&list_plan()).await)
    }

    pub async fn find(&self, ruc: &str) -> Option<Recipient> {
        let plan = ReadPlan::direct(
            "buscar destinatario",
            Statement::new(
                r#"SELECT ruc, nombre, numero_telefono, calle_direccion, codigo_ubigeo, gmail
                   FROM destinatario WHERE ruc = $1 AND eliminado = false"#,
            )
            .bind(ruc),
            map_row,
        );
        settle_find("buscar destinatario", self.executor.read(&plan).await)
    }

    pub async fn location_exists(&self, code: &str) -> bool {
        match location_exists(&self.executor, code).await {
            Ok(found) => found,
            Err(e) => {
                log::error!("❌ verificar ubigeo {} falló: {}", code, e);
                false
            }
        }
    }

    async fn checked_write(&self, recipient: &Recipient, plan: WritePlan) -> DataResult<TierKind> {
        recipient.validate()?;
        if !location_exists(&self.executor, &recipient.location_code).await? {
            return Err(validation_error(
                "codigo_ubigeo",
                &format!("ubigeo '{}' no existe", recipient.location_code),
            ));
        }
        self.executor.write(&plan).await
    }
}

fn params(r: &Recipient) -> Vec<SqlValue> {
    vec![
        r.ruc.as_str().into(),
        r.name.as_str().into(),
        SqlValue::text_or_null(&r.phone),
        SqlValue::text_or_null(&r.street),
        r.location_code.trim().into(),
        SqlValue::text_or_null(&r.email),
    ]
}

fn insert_plan(r: &Recipient) -> WritePlan {
    WritePlan::new("insertar destinatario")
        .procedure("sp_insertar_destinatario", params(r))
        .direct(Statement::with_params(
            r#"INSERT INTO destinatario (ruc, nombre, numero_telefono, calle_direccion, codigo_ubigeo, gmail, eliminado)
               VALUES ($1, $2, $3, $4, $5, $6, false)"#,
            params(r),
        ))
}

fn update_plan(r: &Recipient) -> WritePlan {
    WritePlan::new("actualizar destinatario")
        .procedure("sp_actualizar_destinatario", params(r))
        .direct(Statement::with_params(
            r#"UPDATE destinatario
               SET nombre = $2, numero_telefono = $3, calle_direccion = $4, codigo_ubigeo = $5, gmail = $6
               WHERE ruc = $1"#,
            params(r),
        ))
        .require_rows()
}

fn list_plan() -> ReadPlan<Recipient> {
    ReadPlan::direct(
        "listar destinatarios",
        Statement::new(
            r#"SELECT ruc, nombre, numero_telefono, calle_direccion, codigo_ubigeo, gmail
               FROM destinatario WHERE eliminado = false ORDER BY nombre"#,
        ),
        map_row,
    )
    .preferred(Statement::set_returning("sp_listar_destinatarios", vec![]), COLUMNS)
}

fn map_row(row: &RowRef<'_>) -> DataResult<Recipient> {
    Ok(Recipient {
        ruc: row.text("ruc")?,
        name: row.text("nombre")?,
        phone: row.text("numero_telefono")?,
        street: row.text("calle_direccion")?,
        location_code: row.text("codigo_ubigeo")?,
        email: row.text("gmail")?,
    })
}
