use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{RowRef, SqlType, SqlValue, Statement};
use crate::models::vehicle::Vehicle;
use crate::repositories::{three_tier_delete, write_validated};
use crate::services::dual_path::{settle_find, settle_list, settle_write, DualPathExecutor, ReadPlan, WritePlan};
use crate::utils::errors::DataResult;

const COLUMNS: &[&str] = &["placa", "numero_mtc", "tipo_vehiculo", "marca", "modelo", "carga_max"];

pub struct VehicleRepository {
    executor: DualPathExecutor,
}

impl VehicleRepository {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    pub async fn insert(&self, vehicle: &Vehicle) -> bool {
        let plan = insert_plan(vehicle);
        settle_write("insertar vehículo", write_validated(&self.executor, vehicle, plan).await)
    }

    pub async fn update(&self, vehicle: &Vehicle) -> bool {
        let plan = update_plan(vehicle);
        settle_write("actualizar vehículo", write_validated(&self.executor, vehicle, plan).await)
    }

    /// Rechazado por la base si algún traslado referencia la placa
    pub async fn delete(&self, plate: &str) -> bool {
        let plan = three_tier_delete(
            "eliminar vehículo",
            "sp_eliminar_vehiculo",
            plate,
            Statement::new("DELETE FROM vehiculo WHERE placa = $1").bind(plate),
        )
        .require_rows();
        settle_write("eliminar vehículo", self.executor.write(&plan).await)
    }

    pub async fn list(&self) -> Vec<Vehicle> {
        settle_list("listar vehículos", self.executor.read(&list_plan()).await)
    }

    pub async fn find(&self, plate: &str) -> Option<Vehicle> {
        let plan = ReadPlan::direct(
            "buscar vehículo",
            Statement::new(
                r#"SELECT placa, numero_mtc, tipo_vehiculo, marca, modelo, carga_max
                   FROM vehiculo WHERE placa = $1"#,
            )
            .bind(plate),
            map_row,
        );
        settle_find("buscar vehículo", self.executor.read(&plan).await)
    }
}

/// Carga 0.0 viaja como NULL NUMERIC
fn max_load_param(max_load: f64) -> SqlValue {
    if max_load == 0.0 {
        SqlValue::Null(SqlType::Numeric)
    } else {
        SqlValue::numeric_from_f64(max_load)
    }
}

fn params(v: &Vehicle) -> Vec<SqlValue> {
    vec![
        v.plate.as_str().into(),
        SqlValue::text_or_null(&v.registration_number),
        SqlValue::text_or_null(&v.vehicle_type),
        SqlValue::text_or_null(&v.make),
        SqlValue::text_or_null(&v.model),
        max_load_param(v.max_load),
    ]
}

fn insert_plan(v: &Vehicle) -> WritePlan {
    WritePlan::new("insertar vehículo")
        .procedure("sp_insertar_vehiculo", params(v))
        .direct(Statement::with_params(
            r#"INSERT INTO vehiculo (placa, numero_mtc, tipo_vehiculo, marca, modelo, carga_max)
               VALUES ($1, $2, $3, $4, $5, $6)
               ON CONFLICT (placa) DO NOTHING"#,
            params(v),
        ))
        .require_rows()
}

fn update_plan(v: &Vehicle) -> WritePlan {
    WritePlan::new("actualizar vehículo")
        .procedure("sp_actualizar_vehiculo", params(v))
        .direct(Statement::with_params(
            r#"UPDATE vehiculo
               SET numero_mtc = $2, tipo_vehiculo = $3, marca = $4, modelo = $5, carga_max = $6
               WHERE placa = $1"#,
            params(v),
        ))
        .require_rows()
}

fn list_plan() -> ReadPlan<Vehicle> {
    ReadPlan::direct(
        "listar vehículos",
        Statement::new(
            "SELECT placa, numero_mtc, tipo_vehiculo, marca, modelo, carga_max FROM vehiculo ORDER BY placa",
        ),
        map_row,
    )
    .preferred(Statement::set_returning("sp_listar_vehiculos", vec![]), COLUMNS)
}

fn map_row(row: &RowRef<'_>) -> DataResult<Vehicle> {
    Ok(Vehicle {
        plate: row.text("placa")?,
        registration_number: row.text("numero_mtc")?,
        vehicle_type: row.text("tipo_vehiculo")?,
        make: row.text("marca")?,
        model: row.text("modelo")?,
        max_load: row.f64_or_zero("carga_max")?,
    })
}
