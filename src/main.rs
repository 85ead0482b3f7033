use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use guia_remision::config::{ConnectionOverrides, ConnectionSettings};
use guia_remision::database::{build_provider, ConnectionProvider, Statement};
use guia_remision::repositories::*;
use guia_remision::services::report_executor::{Report, ReportExecutor};

#[derive(Parser)]
#[command(name = "guia_remision")]
#[command(about = "Acceso a datos de guías de remisión", long_about = None)]
struct Cli {
    /// URL de la base de datos
    #[arg(long)]
    db_url: Option<String>,
    #[arg(long)]
    db_user: Option<String>,
    #[arg(long)]
    db_pass: Option<String>,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            url: self.db_url.clone(),
            user: self.db_user.clone(),
            password: self.db_pass.clone(),
        }
    }
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Verificar la conexión
    Ping,
    /// Ejecutar un reporte por nombre
    Report { name: String, param: Option<String> },
    /// Listar una entidad en JSON
    List { entity: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let settings = ConnectionSettings::resolve(&cli.overrides());
    let provider = build_provider(&settings)?;

    match cli.command {
        Command::Ping => ping(provider).await,
        Command::Report { name, param } => {
            let report = Report::parse(&name, param.as_deref())?;
            let result = ReportExecutor::new(provider).run(&report).await;
            info!("📊 {}: {} filas", report, result.len());
            print_json(&result)
        }
        Command::List { entity } => list(provider, &entity).await,
    }
}

async fn ping(provider: Arc<dyn ConnectionProvider>) -> Result<()> {
    let mut session = provider.acquire().await?;
    let outcome = session.query(&Statement::new("SELECT 1 AS ok")).await;
    session.close().await;
    match outcome {
        Ok(_) => {
            info!("✅ Conexión exitosa a {}", provider.target());
            Ok(())
        }
        Err(e) => {
            error!("❌ Error consultando {}: {}", provider.target(), e);
            Err(e.into())
        }
    }
}

async fn list(provider: Arc<dyn ConnectionProvider>, entity: &str) -> Result<()> {
    match entity {
        "destinatarios" => print_json(&RecipientRepository::new(provider).list().await),
        "remitentes" => print_json(&SenderRepository::new(provider).list().await),
        "conductores" => print_json(&DriverRepository::new(provider).list().await),
        "vehiculos" => print_json(&VehicleRepository::new(provider).list().await),
        "productos" => print_json(&ProductRepository::new(provider).list().await),
        "ubigeos" => print_json(&LocationRepository::new(provider).list().await),
        "ordenes" => print_json(&PaymentOrderRepository::new(provider).list().await),
        "guias" => print_json(&WaybillRepository::new(provider).list().await),
        "traslados" => print_json(&TransferRepository::new(provider).list().await),
        other => Err(anyhow!("entidad desconocida '{}'", other)),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
