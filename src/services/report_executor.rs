//! Catálogo de reportes
//!
//! Reportes de sólo lectura que devuelven datos tabulares genéricos. Se
//! ejecutan una sola vez, sin ruta alternativa; un fallo se registra en el
//! log y produce un resultado vacío.

use std::fmt;
use std::sync::Arc;

use crate::database::connection::ConnectionProvider;
use crate::database::value::{ResultSet, SqlValue, Statement};
use crate::services::dual_path::DualPathExecutor;
use crate::utils::errors::{validation_error, DataResult};

pub const DEFAULT_EXPIRY_DAYS: i32 = 90;

/// Clientes sin órdenes en los últimos 60 días
const INACTIVE_CLIENTS_SQL: &str = r#"SELECT d.ruc, d.nombre
   FROM destinatario d
   WHERE NOT EXISTS (
       SELECT 1 FROM orden_de_pago o
       WHERE o.ruc_cliente = d.ruc
         AND o.fecha >= (CURRENT_DATE - INTERVAL '60 days')
   )
   ORDER BY d.nombre"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    OrderDetail(String),
    GuidesByDateAndStatus,
    TopSellingProducts,
    VehicleUtilization,
    LicensesExpiring(i32),
    GuidesWithoutTransfer,
    BundlesPerClient90d,
    DailyGuideKpi,
    TransferListing,
    InactiveClients,
}

impl Report {
    pub const NAMES: [&'static str; 10] = [
        "order-detail",
        "guides-by-date-and-status",
        "top-selling-products",
        "vehicle-utilization",
        "licenses-expiring",
        "guides-without-transfer",
        "bundles-per-client-90d",
        "daily-guide-kpi",
        "transfer-listing",
        "inactive-clients",
    ];

    /// Resolver un reporte por nombre y parámetro opcional
    pub fn parse(name: &str, param: Option<&str>) -> DataResult<Self> {
        let param = param.map(str::trim).filter(|p| !p.is_empty());
        let report = match name.trim().to_lowercase().as_str() {
            "order-detail" => {
                let code = param.ok_or_else(|| validation_error("order-detail", "requiere código de orden"))?;
                Report::OrderDetail(code.to_string())
            }
            "guides-by-date-and-status" => Report::GuidesByDateAndStatus,
            "top-selling-products" => Report::TopSellingProducts,
            "vehicle-utilization" => Report::VehicleUtilization,
            "licenses-expiring" => {
                let days = match param {
                    Some(raw) => raw
                        .parse::<i32>()
                        .map_err(|_| validation_error("licenses-expiring", "días debe ser un entero"))?,
                    None => DEFAULT_EXPIRY_DAYS,
                };
                Report::LicensesExpiring(days)
            }
            "guides-without-transfer" => Report::GuidesWithoutTransfer,
            "bundles-per-client-90d" => Report::BundlesPerClient90d,
            "daily-guide-kpi" => Report::DailyGuideKpi,
            "transfer-listing" => Report::TransferListing,
            "inactive-clients" => Report::InactiveClients,
            other => return Err(validation_error("report", &format!("reporte desconocido '{}'", other))),
        };
        Ok(report)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Report::OrderDetail(_) => "order-detail",
            Report::GuidesByDateAndStatus => "guides-by-date-and-status",
            Report::TopSellingProducts => "top-selling-products",
            Report::VehicleUtilization => "vehicle-utilization",
            Report::LicensesExpiring(_) => "licenses-expiring",
            Report::GuidesWithoutTransfer => "guides-without-transfer",
            Report::BundlesPerClient90d => "bundles-per-client-90d",
            Report::DailyGuideKpi => "daily-guide-kpi",
            Report::TransferListing => "transfer-listing",
            Report::InactiveClients => "inactive-clients",
        }
    }

    pub fn statement(&self) -> Statement {
        match self {
            Report::OrderDetail(code) => {
                Statement::set_returning("sp_reporte_detalle_orden", vec![code.as_str().into()])
            }
            Report::GuidesByDateAndStatus => Statement::set_returning("sp_reporte_guias_por_fecha_estado", vec![]),
            Report::TopSellingProducts => Statement::set_returning("sp_reporte_productos_mas_vendidos", vec![]),
            Report::VehicleUtilization => Statement::set_returning("sp_reporte_utilizacion_vehiculos", vec![]),
            Report::LicensesExpiring(days) => {
                Statement::set_returning("sp_reporte_licencias_por_vencer", vec![SqlValue::Integer(*days)])
            }
            Report::GuidesWithoutTransfer => Statement::set_returning("sp_reporte_guias_sin_traslado", vec![]),
            Report::BundlesPerClient90d => Statement::set_returning("sp_reporte_bultos_por_cliente_90d", vec![]),
            Report::DailyGuideKpi => Statement::set_returning("sp_reporte_kpi_guias_diario", vec![]),
            Report::TransferListing => Statement::set_returning("sp_listar_traslados", vec![]),
            Report::InactiveClients => Statement::new(INACTIVE_CLIENTS_SQL),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::OrderDetail(code) => write!(f, "{}({})", self.name(), code),
            Report::LicensesExpiring(days) => write!(f, "{}({})", self.name(), days),
            _ => f.write_str(self.name()),
        }
    }
}

pub struct ReportExecutor {
    executor: DualPathExecutor,
}

impl ReportExecutor {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            executor: DualPathExecutor::new(provider),
        }
    }

    pub async fn run(&self, report: &Report) -> ResultSet {
        match self.executor.query(&report.statement()).await {
            Ok(result) => {
                log::debug!("📊 Reporte {}: {} filas", report, result.len());
                result
            }
            Err(e) => {
                log::error!("❌ Reporte {} falló: {}", report, e);
                ResultSet::empty()
            }
        }
    }

    /// Por nombre; un nombre o parámetro inválido produce un resultado vacío
    pub async fn run_named(&self, name: &str, param: Option<&str>) -> ResultSet {
        match Report::parse(name, param) {
            Ok(report) => self.run(&report).await,
            Err(e) => {
                log::error!("❌ Reporte {}: {}", name, e);
                ResultSet::empty()
            }
        }
    }
}
