mod common;

use common::{missing_routine, result, ScriptedProvider};

use guia_remision::database::SqlValue;
use guia_remision::services::{Report, ReportExecutor};

#[tokio::test]
async fn test_report_returns_routine_rows() {
    let db = ScriptedProvider::new();
    db.rows(
        "sp_reporte_licencias_por_vencer",
        result(
            &["licencia", "nombre", "dias_restantes"],
            vec![vec!["Q12345678".into(), "Juan Quispe".into(), SqlValue::Integer(12)]],
        ),
    );
    let reports = ReportExecutor::new(db.shared());

    let rows = reports.run(&Report::LicensesExpiring(30)).await;

    assert_eq!(rows.len(), 1);
    assert!(rows.has_column("dias_restantes"));
    let stmt = db.last("sp_reporte_licencias_por_vencer").unwrap();
    assert_eq!(stmt.params, vec![SqlValue::Integer(30)]);
}

#[tokio::test]
async fn test_failed_report_is_empty_without_fallback() {
    let db = ScriptedProvider::new();
    db.fail("sp_reporte_kpi_guias_diario", missing_routine());
    let reports = ReportExecutor::new(db.shared());

    let rows = reports.run(&Report::DailyGuideKpi).await;

    assert!(rows.is_empty());
    assert_eq!(db.sql_log().len(), 1);
    assert_eq!(db.acquired(), db.closed());
}

#[tokio::test]
async fn test_inactive_clients_never_calls_a_routine() {
    let db = ScriptedProvider::new();
    db.rows(
        "FROM destinatario",
        result(&["ruc", "nombre"], vec![vec!["20123456789".into(), "Distribuidora Acme".into()]]),
    );
    let reports = ReportExecutor::new(db.shared());

    let rows = reports.run_named("inactive-clients", None).await;

    assert_eq!(rows.len(), 1);
    assert!(db.sql_log().iter().all(|sql| !sql.contains("sp_")));
}

#[tokio::test]
async fn test_unknown_report_name_is_empty() {
    let db = ScriptedProvider::new();
    let reports = ReportExecutor::new(db.shared());

    assert!(reports.run_named("ventas-por-hora", None).await.is_empty());
    assert!(reports.run_named("order-detail", None).await.is_empty());
    assert_eq!(db.acquired(), 0);
}

#[tokio::test]
async fn test_order_detail_report_binds_code() {
    let db = ScriptedProvider::new();
    let reports = ReportExecutor::new(db.shared());

    reports.run_named("order-detail", Some("ORD-001")).await;

    let stmt = db.last("sp_reporte_detalle_orden").unwrap();
    assert_eq!(stmt.params, vec![SqlValue::from("ORD-001")]);
}
