//! Repositorios (adaptadores por entidad)
//!
//! Cada repositorio conoce los nombres de rutina y el SQL directo de su
//! entidad, arma los planes y los entrega al `DualPathExecutor`. Los métodos
//! públicos devuelven `bool`, `Vec` u `Option`; la causa de un fallo queda
//! en el log.

pub mod driver_repository;
pub mod location_repository;
pub mod order_line_repository;
pub mod payment_order_repository;
pub mod product_repository;
pub mod recipient_repository;
pub mod sender_repository;
pub mod transfer_repository;
pub mod vehicle_repository;
pub mod waybill_line_repository;
pub mod waybill_repository;

pub use driver_repository::DriverRepository;
pub use location_repository::LocationRepository;
pub use order_line_repository::OrderLineRepository;
pub use payment_order_repository::PaymentOrderRepository;
pub use product_repository::ProductRepository;
pub use recipient_repository::RecipientRepository;
pub use sender_repository::SenderRepository;
pub use transfer_repository::TransferRepository;
pub use vehicle_repository::VehicleRepository;
pub use waybill_line_repository::WaybillLineRepository;
pub use waybill_repository::WaybillRepository;

use validator::Validate;

use crate::database::value::Statement;
use crate::services::dual_path::{DualPathExecutor, TierKind, WritePlan};
use crate::utils::errors::DataResult;

/// Validar el registro antes de tocar la base y luego ejecutar el plan
pub(crate) async fn write_validated<R: Validate>(
    executor: &DualPathExecutor,
    record: &R,
    plan: WritePlan,
) -> DataResult<TierKind> {
    record.validate()?;
    executor.write(&plan).await
}

/// `true` si la consulta devuelve al menos una fila
pub(crate) async fn exists(executor: &DualPathExecutor, stmt: &Statement) -> DataResult<bool> {
    Ok(!executor.query(stmt).await?.is_empty())
}

/// Plan de borrado en tres niveles: CALL, SELECT fn y SQL directo
pub(crate) fn three_tier_delete(operation: &str, routine: &str, key: &str, direct: Statement) -> WritePlan {
    WritePlan::new(operation)
        .procedure(routine, vec![key.into()])
        .function(routine, vec![key.into()])
        .direct(direct)
}
