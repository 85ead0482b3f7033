use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlValue, Statement};
use crate::models::driver::Driver;
use crate::repositories::{three_tier_delete, write_validated};
use crate::services::dual_path::{settle_find, settle_list, settle_write, DualPathExecutor, ReadPlan, WritePlan};
use crate::utils::errors::DataResult;

const COLUMNS: &[&str] = &["licencia", "dni", "nombre", "telefono", "fecha_vencimiento_licencia"];

pub struct DriverRepository {
    executor: DualPathExecutor,
}

impl DriverRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    pub async fn insert(&self, driver: &Driver) -> bool {
        let plan = WritePlan::new("insertar conductor")
            .procedure("sp_insertar_conductor", params(driver))
            .direct(Statement::with_params(
                r#"INSERT INTO conductor (licencia, dni, nombre, telefono, fecha_vencimiento_licencia)
                   VALUES ($1, $2, $3, $4, $5)"#,
                params(driver),
            ));
        settle_write("insertar conductor", write_validated(&self.executor, driver, plan).await)
    }

    pub async fn update(&self, driver: &Driver) -> bool {
        let plan = WritePlan::new("actualizar conductor")
            .procedure("sp_actualizar_conductor", params(driver))
            .direct(Statement::with_params(
                r#"UPDATE conductor
                   SET dni = $2, nombre = $3, telefono = $4, fecha_vencimiento_licencia = $5
                   WHERE licencia = $1"#,
                params(driver),
            ))
            .require_rows();
        settle_write("actualizar conductor", write_validated(&self.executor, driver, plan).await)
    }

    pub async fn delete(&self, license: &str) -> bool {
        let plan = three_tier_delete(
            "eliminar conductor",
            "sp_eliminar_conductor",
            license,
            Statement::new("DELETE FROM conductor WHERE licencia = $1").bind(license),
        )
        .require_rows();
        settle_write("eliminar conductor", self.executor.write(&plan).await)
    }

    pub async fn list(&self) -> Vec<Driver> {
        let plan = ReadPlan::direct(
            "listar conductores",
            Statement::new(
                r#"SELECT licencia, dni, nombre, telefono, fecha_vencimiento_licencia
                   FROM conductor ORDER BY nombre"#,
            ),
            map_row,
        )
        .preferred(Statement::set_returning("sp_listar_conductores", vec![]), COLUMNS);
        settle_list("listar conductores", self.executor.read(&plan).await)
    }

    pub async fn find(&self, license: &str) -> Option<Driver> {
        let plan = ReadPlan::direct(
            "buscar conductor",
            Statement::new(
                r#"SELECT licencia, dni, nombre, telefono, fecha_vencimiento_licencia
                   FROM conductor WHERE licencia = $1"#,
            )
            .bind(license),
            map_row,
        );
        settle_find("buscar conductor", self.executor.read(&plan).await)
    }
}

fn params(d: &Driver) -> Vec<SqlValue> {
    vec![
        d.license.as_str().into(),
        SqlValue::text_or_null(&d.national_id),
        d.name.as_str().into(),
        SqlValue::text_or_null(&d.phone),
        SqlValue::opt_date(d.license_expiry),
    ]
}

fn map_row(row: &RowRef<'_>) -> DataResult<Driver> {
    Ok(Driver {
        license: row.text("licencia")?,
        national_id: row.text("dni")?,
        name: row.text("nombre")?,
        phone: row.text("telefono")?,
        license_expiry: row.opt_date("fecha_vencimiento_licencia")?,
    })
}
