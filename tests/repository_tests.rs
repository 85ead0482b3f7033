mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use common::{foreign_key_violation, missing_routine, normalize, result, Outcome, ScriptedProvider};

use guia_remision::database::{SqlType, SqlValue, Statement};
use guia_remision::models::{OrderLine, PaymentOrder, Recipient, Sender, Session, Vehicle, Waybill};
use guia_remision::repositories::*;

const VEHICLE_COLUMNS: &[&str] = &["placa", "numero_mtc", "tipo_vehiculo", "marca", "modelo", "carga_max"];
const ORDER_COLUMNS: &[&str] = &["codigo_orden", "fecha", "ruc_cliente", "estado"];
const TRANSFER_COLUMNS: &[&str] = &[
    "codigo_traslado",
    "codigo_guia",
    "placa",
    "licencia",
    "fecha_inicio",
    "fecha_fin",
    "estado_traslado",
    "observaciones",
];

fn last_params(history: &[Statement], pattern: &str) -> Vec<SqlValue> {
    history
        .iter()
        .rev()
        .find(|s| normalize(&s.sql).contains(pattern))
        .map(|s| s.params.clone())
        .unwrap_or_default()
}

fn truck(max_load: f64) -> Vehicle {
    Vehicle {
        plate: "ABC-123".to_string(),
        registration_number: "MTC-991".to_string(),
        vehicle_type: "Camión".to_string(),
        make: "Volvo".to_string(),
        model: "FH".to_string(),
        max_load,
    }
}

fn acme() -> Recipient {
    Recipient {
        ruc: "20123456789".to_string(),
        name: "Distribuidora Acme".to_string(),
        phone: "987654321".to_string(),
        street: "Av. Grau 123".to_string(),
        location_code: "150101".to_string(),
        email: "compras@acme.pe".to_string(),
    }
}

fn order(status: &str) -> PaymentOrder {
    PaymentOrder {
        code: "ORD-001".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 5, 2),
        client_ruc: "20123456789".to_string(),
        status: status.to_string(),
    }
}

fn waybill(sender_ruc: &str) -> Waybill {
    Waybill {
        code: "GR-0001".to_string(),
        series: "T001".to_string(),
        number: "0001".to_string(),
        sender_ruc: sender_ruc.to_string(),
        recipient_ruc: "20987654321".to_string(),
        origin_location: "150101".to_string(),
        destination_location: "040101".to_string(),
        motive: "Venta".to_string(),
        modality: "Privado".to_string(),
        total_weight: 1250.5,
        bundle_count: 12,
        ..Default::default()
    }
}

fn known_locations(db: &ScriptedProvider) {
    db.rows("FROM ubigeo", result(&["?column?"], vec![vec![SqlValue::Integer(1)]]));
}

#[tokio::test]
async fn test_zero_max_load_is_stored_as_null_and_listed_as_zero() {
    let db = ScriptedProvider::new();
    db.fail("sp_insertar_vehiculo", missing_routine());
    db.fail("sp_listar_vehiculos", missing_routine());
    // La tabla devuelve lo que se insertó
    db.on_fn("FROM vehiculo ORDER BY", |_, history| {
        let row = last_params(history, "INSERT INTO vehiculo");
        Ok(Outcome::Rows(result(VEHICLE_COLUMNS, vec![row])))
    });
    let repo = VehicleRepository::new(db.shared());

    assert!(repo.insert(&truck(0.0)).await);
    let stored = db.last("INSERT INTO vehiculo").unwrap();
    assert_eq!(stored.params[5], SqlValue::Null(SqlType::Numeric));

    let listed = repo.list().await;
    assert_eq!(listed, vec![truck(0.0)]);
}

#[tokio::test]
async fn test_duplicate_plate_insert_fails_without_rows() {
    let db = ScriptedProvider::new();
    db.fail("sp_insertar_vehiculo", missing_routine());
    db.affected("INSERT INTO vehiculo", 0);
    let repo = VehicleRepository::new(db.shared());

    assert!(!repo.insert(&truck(18.0)).await);
}

#[tokio::test]
async fn test_vehicle_with_transfers_is_not_deleted() {
    let db = ScriptedProvider::new();
    db.fail("CALL sp_eliminar_vehiculo", missing_routine());
    db.fail("SELECT sp_eliminar_vehiculo", foreign_key_violation());
    let repo = VehicleRepository::new(db.shared());

    assert!(!repo.delete("ABC-123").await);
    assert_eq!(db.count("DELETE FROM vehiculo"), 0);
}

#[tokio::test]
async fn test_invalid_record_never_reaches_the_database() {
    let db = ScriptedProvider::new();
    let vehicles = VehicleRepository::new(db.shared());
    let recipients = RecipientRepository::new(db.shared());

    let mut blank_plate = truck(10.0);
    blank_plate.plate = "   ".to_string();
    assert!(!vehicles.insert(&blank_plate).await);

    let mut short_ruc = acme();
    short_ruc.ruc = "2012345".to_string();
    assert!(!recipients.insert(&short_ruc).await);

    assert!(db.sql_log().is_empty());
    assert_eq!(db.acquired(), 0);
}

#[tokio::test]
async fn test_recipient_with_unknown_location_is_rejected() {
    let db = ScriptedProvider::new();
    db.rows("FROM ubigeo", result(&["?column?"], vec![]));
    let repo = RecipientRepository::new(db.shared());

    assert!(!repo.insert(&acme()).await);
    assert_eq!(db.count("destinatario"), 0);
    assert_eq!(db.count("FROM ubigeo"), 1);
}

#[tokio::test]
async fn test_recipient_insert_falls_back_to_direct_sql() {
    let db = ScriptedProvider::new();
    known_locations(&db);
    db.fail("sp_insertar_destinatario", missing_routine());
    let repo = RecipientRepository::new(db.shared());

    assert!(repo.insert(&acme()).await);
    let insert = db.last("INSERT INTO destinatario").unwrap();
    assert!(normalize(&insert.sql).contains("false)"));
    assert_eq!(insert.params[0], SqlValue::Text("20123456789".to_string()));
}

#[tokio::test]
async fn test_recipient_soft_delete_and_recover_are_idempotent() {
    let db = ScriptedProvider::new();
    let deleted = Arc::new(AtomicBool::new(false));
    db.fail("sp_eliminar_destinatario", missing_routine());
    {
        let deleted = deleted.clone();
        db.on_fn("SET eliminado = true", move |_, _| {
            let changed = !deleted.swap(true, Ordering::SeqCst);
            Ok(Outcome::Affected(changed as u64))
        });
    }
    {
        let deleted = deleted.clone();
        db.on_fn("SET eliminado = false", move |_, _| {
            let changed = deleted.swap(false, Ordering::SeqCst);
            Ok(Outcome::Affected(changed as u64))
        });
    }
    let repo = RecipientRepository::new(db.shared());

    assert!(repo.delete("20123456789").await);
    assert!(repo.delete("20123456789").await);
    assert!(deleted.load(Ordering::SeqCst));

    assert!(repo.recover("20123456789").await);
    assert!(repo.recover("20123456789").await);
    assert!(!deleted.load(Ordering::SeqCst));

    assert_eq!(db.count("DELETE FROM destinatario"), 0);
}

#[tokio::test]
async fn test_recipient_listing_excludes_deleted_rows() {
    let db = ScriptedProvider::new();
    db.fail("sp_listar_destinatarios", missing_routine());
    let repo = RecipientRepository::new(db.shared());

    assert!(repo.list().await.is_empty());
    let fallback = db.last("FROM destinatario").unwrap();
    assert!(normalize(&fallback.sql).contains("eliminado = false"));
}

#[tokio::test]
async fn test_order_status_round_trip() {
    for (written, stored, read_back) in [
        ("Emitida", "E", "Emitida"),
        ("pendiente de pago", "P", "Pendiente"),
        ("anulada por cliente", "anulada por cliente", "Anulada por cliente"),
    ] {
        let db = ScriptedProvider::new();
        db.fail("sp_crear_orden_de_pago", missing_routine());
        db.fail("sp_listar_ordenes", missing_routine());
        db.on_fn("FROM orden_de_pago ORDER BY", |_, history| {
            let row = last_params(history, "INSERT INTO orden_de_pago");
            Ok(Outcome::Rows(result(ORDER_COLUMNS, vec![row])))
        });
        let repo = PaymentOrderRepository::new(db.shared());

        assert!(repo.create(&order(written)).await);
        let insert = db.last("INSERT INTO orden_de_pago").unwrap();
        assert_eq!(insert.params[3], SqlValue::Text(stored.to_string()));

        let listed = repo.list().await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, read_back);
    }
}

#[tokio::test]
async fn test_order_delete_removes_lines_before_header() {
    let db = ScriptedProvider::new();
    db.fail("sp_eliminar_orden_de_pago", missing_routine());
    let repo = PaymentOrderRepository::new(db.shared());

    assert!(repo.delete("ORD-001").await);
    assert_eq!(
        db.sql_log()[2..].to_vec(),
        vec![
            "DELETE FROM detalle_orden WHERE codigo_orden = $1".to_string(),
            "DELETE FROM orden_de_pago WHERE codigo_orden = $1".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_sender_find_matches_across_paths() {
    let row = || {
        vec![
            SqlValue::from("20123456789"),
            SqlValue::from("Transportes Andinos"),
            SqlValue::from("Transportes Andinos S.A.C."),
            SqlValue::from("014445566"),
            SqlValue::Null(SqlType::Text),
            SqlValue::from("Jr. Lampa 500"),
            SqlValue::from("150101"),
        ]
    };
    let columns = &[
        "ruc",
        "nombre_empresa",
        "razon_social",
        "telefono",
        "email",
        "calle_direccion",
        "codigo_ubigeo",
    ];

    let preferred = ScriptedProvider::new();
    preferred.rows("sp_buscar_remitente", result(columns, vec![row()]));
    let via_routine = SenderRepository::new(preferred.shared()).find("20123456789").await;

    let fallback = ScriptedProvider::new();
    // La rutina existe pero devuelve otra forma
    fallback.rows("sp_buscar_remitente", result(&["ruc", "nombre"], vec![]));
    fallback.rows("FROM remitente", result(columns, vec![row()]));
    let via_sql = SenderRepository::new(fallback.shared()).find("20123456789").await;

    let expected = Sender {
        ruc: "20123456789".to_string(),
        company_name: "Transportes Andinos".to_string(),
        legal_name: "Transportes Andinos S.A.C.".to_string(),
        phone: "014445566".to_string(),
        email: String::new(),
        street: "Jr. Lampa 500".to_string(),
        location_code: "150101".to_string(),
    };
    assert_eq!(via_routine, Some(expected));
    assert_eq!(via_routine, via_sql);
    assert_eq!(fallback.count("FROM remitente"), 1);
}

#[tokio::test]
async fn test_latest_transfer_without_end_reports_start() {
    let early = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(7, 0, 0).unwrap();
    let late = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap().and_hms_opt(8, 30, 0).unwrap();
    let transfer_row = |code: &str, start| {
        vec![
            SqlValue::from(code),
            SqlValue::from("GR-0001"),
            SqlValue::from("ABC-123"),
            SqlValue::from("Q12345678"),
            SqlValue::Timestamp(start),
            SqlValue::Null(SqlType::Timestamp),
            SqlValue::from("en tránsito"),
            SqlValue::Null(SqlType::Text),
        ]
    };

    let db = ScriptedProvider::new();
    db.fail("sp_obtener_traslado_por_guia", missing_routine());
    db.rows(
        "FROM traslado",
        result(TRANSFER_COLUMNS, vec![transfer_row("TR-01", early), transfer_row("TR-02", late)]),
    );
    let repo = TransferRepository::new(db.shared());

    let latest = repo.find_latest_by_waybill("GR-0001").await.unwrap();
    assert_eq!(latest.code, "TR-02");
    assert_eq!(latest.end, Some(late));
}

#[tokio::test]
async fn test_order_lines_from_report_routine_are_numbered() {
    let db = ScriptedProvider::new();
    db.rows(
        "sp_reporte_detalle_orden",
        result(
            &[
                "codigo_orden",
                "codigo_producto",
                "nombre_producto",
                "cantidad",
                "precio_unitario",
                "subtotal",
            ],
            vec![
                vec![
                    "ORD-001".into(),
                    "P-01".into(),
                    "Cemento".into(),
                    Decimal::new(10, 0).into(),
                    Decimal::new(2550, 2).into(),
                    Decimal::new(25500, 2).into(),
                ],
                vec![
                    "ORD-001".into(),
                    "P-02".into(),
                    "Fierro".into(),
                    Decimal::new(4, 0).into(),
                    Decimal::new(3000, 2).into(),
                    SqlValue::Null(SqlType::Numeric),
                ],
            ],
        ),
    );
    let repo = OrderLineRepository::new(db.shared());

    let lines = repo.list_for_order("ORD-001").await;

    let numbers: Vec<i32> = lines.iter().map(|l| l.line_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(lines[0].product_name.as_deref(), Some("Cemento"));
    assert_eq!(lines[1].subtotal, Decimal::new(120, 0));
    assert_eq!(db.count("FROM detalle_orden"), 0);
}

#[tokio::test]
async fn test_order_line_insert_computes_subtotal_in_sql() {
    let db = ScriptedProvider::new();
    db.fail("sp_agregar_detalle_orden", missing_routine());
    let repo = OrderLineRepository::new(db.shared());
    let line = OrderLine {
        order_code: "ORD-001".to_string(),
        product_code: "P-01".to_string(),
        quantity: Decimal::new(3, 0),
        unit_price: Decimal::new(1050, 2),
        ..Default::default()
    };

    assert!(repo.add(&line).await);
    let insert = normalize(&db.last("INSERT INTO detalle_orden").unwrap().sql);
    assert!(insert.contains("$3 * $4"));
    assert!(insert.contains("MAX(numero_item)"));
}

#[tokio::test]
async fn test_emit_for_uses_session_sender() {
    let db = ScriptedProvider::new();
    known_locations(&db);
    let repo = WaybillRepository::new(db.shared());
    let session = Session::login("20111222333");

    assert!(repo.emit_for(&session, &waybill("")).await);
    let call = db.last("CALL sp_emitir_guia").unwrap();
    assert_eq!(call.params.len(), 14);
    assert_eq!(call.params[4], SqlValue::Text("20111222333".to_string()));
    assert_eq!(db.count("FROM ubigeo"), 2);
}

#[tokio::test]
async fn test_emit_without_sender_is_rejected() {
    let db = ScriptedProvider::new();
    known_locations(&db);
    let repo = WaybillRepository::new(db.shared());

    assert!(!repo.emit_for(&Session::anonymous(), &waybill("")).await);
    assert!(!repo.emit(&waybill("2011")).await);
    assert!(db.sql_log().is_empty());
}

#[tokio::test]
async fn test_emit_direct_fallback_sets_issue_defaults() {
    let db = ScriptedProvider::new();
    known_locations(&db);
    db.fail("sp_emitir_guia", missing_routine());
    let repo = WaybillRepository::new(db.shared());

    assert!(repo.emit(&waybill("20111222333")).await);
    let insert = normalize(&db.last("INSERT INTO guia_remision").unwrap().sql);
    assert!(insert.contains("CURRENT_DATE, LOCALTIME, 'emitida'"));
}

#[tokio::test]
async fn test_every_session_is_closed() {
    let db = ScriptedProvider::new();
    known_locations(&db);
    db.fail("sp_emitir_guia", missing_routine());
    db.fail("CALL sp_eliminar_vehiculo", missing_routine());
    db.fail("SELECT sp_eliminar_vehiculo", foreign_key_violation());
    db.fail("sp_listar_guias", missing_routine());

    let waybills = WaybillRepository::new(db.shared());
    let vehicles = VehicleRepository::new(db.shared());
    waybills.emit(&waybill("20111222333")).await;
    waybills.list().await;
    vehicles.delete("ABC-123").await;
    vehicles.find("ABC-123").await;

    assert!(db.acquired() > 0);
    assert_eq!(db.acquired(), db.closed());
}

#[tokio::test]
async fn test_waybill_lines_are_numbered_in_read_order() {
    let line = |description: &str| {
        vec![
            SqlValue::from("GR-0001"),
            SqlValue::Null(SqlType::Text),
            SqlValue::from("B-01"),
            SqlValue::from("10101501"),
            SqlValue::Null(SqlType::Text),
            SqlValue::Null(SqlType::Text),
            SqlValue::from(description),
            SqlValue::from("NIU"),
            SqlValue::from("12"),
        ]
    };
    let db = ScriptedProvider::new();
    db.fail("sp_listar_detalle_guia", missing_routine());
    db.rows(
        "FROM detalle_guia",
        result(
            &[
                "codigo_guia",
                "bien_normalizado",
                "codigo_bien",
                "codigo_producto_sunat",
                "partida_arancelaria",
                "codigo_gtin",
                "descripcion",
                "unidad_medida",
                "cantidad",
            ],
            vec![line("Cemento Sol 42.5kg"), line("Fierro corrugado 1/2")],
        ),
    );
    let repo = WaybillLineRepository::new(db.shared());

    let lines = repo.list("GR-0001").await;

    let numbered: Vec<(i32, &str)> = lines.iter().map(|l| (l.line_number, l.description.as_str())).collect();
    assert_eq!(numbered, vec![(1, "Cemento Sol 42.5kg"), (2, "Fierro corrugado 1/2")]);
    assert_eq!(lines[0].normalized_goods, "");
}

#[tokio::test]
async fn test_order_lines_match_across_paths() {
    let line = |product: &str, name: &str, quantity: i64, price: i64| {
        vec![
            SqlValue::from("ORD-001"),
            SqlValue::from(product),
            SqlValue::from(name),
            SqlValue::Numeric(Decimal::new(quantity, 0)),
            SqlValue::Numeric(Decimal::new(price, 2)),
            SqlValue::Numeric(Decimal::new(quantity * price, 2)),
        ]
    };
    let report_columns = &[
        "codigo_orden",
        "codigo_producto",
        "nombre_producto",
        "cantidad",
        "precio_unitario",
        "subtotal",
    ];

    let preferred = ScriptedProvider::new();
    preferred.rows(
        "sp_reporte_detalle_orden",
        result(
            report_columns,
            vec![line("P-01", "Cemento", 10, 2550), line("P-02", "Fierro", 4, 3000)],
        ),
    );
    let via_routine = OrderLineRepository::new(preferred.shared())
        .list_for_order("ORD-001")
        .await;

    let fallback = ScriptedProvider::new();
    fallback.fail("sp_reporte_detalle_orden", missing_routine());
    let mut table_columns = vec!["numero_item"];
    table_columns.extend_from_slice(report_columns);
    fallback.rows(
        "FROM detalle_orden",
        result(
            &table_columns,
            [line("P-01", "Cemento", 10, 2550), line("P-02", "Fierro", 4, 3000)]
                .into_iter()
                .enumerate()
                .map(|(i, mut row)| {
                    row.insert(0, SqlValue::Integer(i as i32 + 1));
                    row
                })
                .collect(),
        ),
    );
    let via_sql = OrderLineRepository::new(fallback.shared())
        .list_for_order("ORD-001")
        .await;

    assert_eq!(via_routine.len(), 2);
    assert_eq!(via_routine[0].product_name.as_deref(), Some("Cemento"));
    assert_eq!(via_routine, via_sql);
    let fallback_sql = normalize(&fallback.last("FROM detalle_orden").unwrap().sql);
    assert!(fallback_sql.contains("LEFT JOIN producto"));
}

#[tokio::test]
async fn test_waybill_lines_match_across_paths() {
    let columns = &[
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
    let rows = || {
        vec![vec![
            SqlValue::from("GR-0001"),
            SqlValue::from("CEMENTO"),
            SqlValue::from("B-01"),
            SqlValue::from("10101501"),
            SqlValue::from("2523.29.00"),
            SqlValue::from("7751234000012"),
            SqlValue::from("Cemento Sol 42.5kg"),
            SqlValue::from("NIU"),
            SqlValue::from("120"),
        ]]
    };

    let preferred = ScriptedProvider::new();
    preferred.rows("sp_listar_detalle_guia", result(columns, rows()));
    let via_routine = WaybillLineRepository::new(preferred.shared()).list("GR-0001").await;

    let fallback = ScriptedProvider::new();
    fallback.fail("sp_listar_detalle_guia", missing_routine());
    fallback.rows("FROM detalle_guia", result(columns, rows()));
    let via_sql = WaybillLineRepository::new(fallback.shared()).list("GR-0001").await;

    assert_eq!(via_routine.len(), 1);
    assert_eq!(via_routine, via_sql);
    assert_eq!(fallback.count("FROM detalle_guia"), 1);
}
