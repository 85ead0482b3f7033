//! Services module
//!
//! Estrategia de ejecución con ruta alternativa, verificación de la forma de
//! los resultados y catálogo de reportes.

pub mod dual_path;
pub mod prober;
pub mod report_executor;

pub use dual_path::{DualPathExecutor, ReadPlan, TierKind, WritePlan};
pub use prober::{ProbeVerdict, ShapeProber};
pub use report_executor::{Report, ReportExecutor};
