use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::location::Location;
use crate::repositories::{exists, three_tier_delete, write_validated};
use crate::services::dual_path::{settle_find, settle_list, settle_write, DualPathExecutor, ReadPlan, WritePlan};
use crate::utils::errors::DataResult;

const COLUMNS: &[&str] = &["codigo_ubigeo", "departamento", "provincia", "distrito"];

/// Ubigeos: códigos de departamento / provincia / distrito
pub struct LocationRepository {
    executor: DualPathExecutor,
}

impl LocationRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    pub async fn insert(&self, location: &Location) -> bool {
        let plan = WritePlan::new("insertar ubigeo")
            .procedure("sp_insertar_ubigeo", params(location))
            .direct(Statement::with_params(
                "INSERT INTO ubigeo (codigo_ubigeo, departamento, provincia, distrito) VALUES ($1, $2, $3, $4)",
                params(location),
            ));
        settle_write("insertar ubigeo", write_validated(&self.executor, location, plan).await)
    }

    pub async fn update(&self, location: &Location) -> bool {
        let plan = WritePlan::new("actualizar ubigeo")
            .procedure("sp_actualizar_ubigeo", params(location))
            .direct(Statement::with_params(
                "UPDATE ubigeo SET departamento = $2, provincia = $3, distrito = $4 WHERE codigo_ubigeo = $1",
                params(location),
            ))
            .require_rows();
        settle_write("actualizar ubigeo", write_validated(&self.executor, location, plan).await)
    }

    pub async fn delete(&self, code: &str) -> bool {
        let plan = three_tier_delete(
            "eliminar ubigeo",
            "sp_eliminar_ubigeo",
            code,
            Statement::new("DELETE FROM ubigeo WHERE codigo_ubigeo = $1").bind(code),
        )
        .require_rows();
        settle_write("eliminar ubigeo", self.executor.write(&plan).await)
    }

    pub async fn list(&self) -> Vec<Location> {
        let plan = ReadPlan::direct(
            "listar ubigeos",
            Statement::new(
                r#"SELECT codigo_ubigeo, departamento, provincia, distrito
                   FROM ubigeo ORDER BY departamento, provincia, distrito"#,
            ),
            map_row,
        )
        .preferred(Statement::set_returning("sp_listar_ubigeos", vec![]), COLUMNS);
        settle_list("listar ubigeos", self.executor.read(&plan).await)
    }

    pub async fn find(&self, code: &str) -> Option<Location> {
        let plan = ReadPlan::direct(
            "buscar ubigeo",
            Statement::new(
                "SELECT codigo_ubigeo, departamento, provincia, distrito FROM ubigeo WHERE codigo_ubigeo = $1",
            )
            .bind(code),
            map_row,
        );
        settle_find("buscar ubigeo", self.executor.read(&plan).await)
    }

    pub async fn exists(&self, code: &str) -> bool {
        location_exists(&self.executor, code).await.unwrap_or_else(|e| {
            log::error!("❌ verificar ubigeo {} falló: {}", code, e);
            false
        })
    }
}

/// Verificación previa a escrituras que referencian un ubigeo
pub(crate) async fn location_exists(executor: &DualPathExecutor, code: &str) -> DataResult<bool> {
    exists(
        executor,
        &Statement::new("SELECT 1 FROM ubigeo WHERE codigo_ubigeo = $1").bind(code.trim()),
    )
    .await
}

fn params(l: &Location) -> Vec<SqlValue> {
    vec![
        l.code.trim().into(),
        SqlValue::text_or_null(&l.department),
        SqlValue::text_or_null(&l.province),
        SqlValue::text_or_null(&l.district),
    ]
}

fn map_row(row: &RowRef<'_>) -> DataResult<Location> {
    Ok(Location {
        code: row.text("codigo_ubigeo")?,
        department: row.text("departamento")?,
        province: row.text("provincia")?,
        district: row.text("distrito")?,
    })
}
