//! Ejecución con ruta preferida y ruta alternativa
//!
//! Cada operación describe una cadena de niveles: rutina almacenada como
//! procedimiento, la misma rutina como función y SQL directo sobre las
//! tablas base. Sólo un error de rutina ausente o incompatible avanza al
//! siguiente nivel; cada nivel usa una sesión nueva.

use std::fmt;
use std::sync::Arc;

use crate::database::connection::{ConnectionProvider, DbSession};
use crate::database::value::{ResultSet, RowRef, SqlValue, Statement};
use crate::services::prober::{ProbeVerdict, ShapeProber};
use crate::utils::errors::{DataError, DataResult};

/// Forma de invocación de un nivel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierKind {
    Procedure,
    Function,
    Direct,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TierKind::Procedure => "CALL",
            TierKind::Function => "SELECT fn",
            TierKind::Direct => "SQL directo",
        };
        f.write_str(name)
    }
}

/// Un intento dentro de la cadena: una o más sentencias sobre la misma sesión
#[derive(Debug, Clone)]
pub struct Tier {
    pub kind: TierKind,
    pub steps: Vec<Statement>,
    /// Cero filas afectadas en la última sentencia es un fallo terminal
    pub require_rows: bool,
}

/// Descriptor de una escritura
#[derive(Debug, Clone)]
pub struct WritePlan {
    pub operation: String,
    pub tiers: Vec<Tier>,
}

impl WritePlan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            tiers: Vec::new(),
        }
    }

    pub fn procedure(self, routine: &str, params: Vec<SqlValue>) -> Self {
        self.push(TierKind::Procedure, vec![Statement::procedure_call(routine, params)])
    }

    pub fn function(self, routine: &str, params: Vec<SqlValue>) -> Self {
        self.push(TierKind::Function, vec![Statement::function_call(routine, params)])
    }

    pub fn direct(self, stmt: Statement) -> Self {
        self.push(TierKind::Direct, vec![stmt])
    }

    /// Varias sentencias en orden sobre una sola sesión
    pub fn direct_steps(self, steps: Vec<Statement>) -> Self {
        self.push(TierKind::Direct, steps)
    }

    /// Aplica al último nivel agregado
    pub fn require_rows(mut self) -> Self {
        if let Some(tier) = self.tiers.last_mut() {
            tier.require_rows = true;
        }
        self
    }

    fn push(mut self, kind: TierKind, steps: Vec<Statement>) -> Self {
        self.tiers.push(Tier {
            kind,
            steps,
            require_rows: false,
        });
        self
    }
}

/// Mapeo de una fila a un registro
pub type RowMapper<T> = fn(&RowRef<'_>) -> DataResult<T>;

/// Descriptor de una lectura
pub struct ReadPlan<T> {
    pub operation: String,
    pub preferred: Option<Statement>,
    pub required: &'static [&'static str],
    pub fallback: Statement,
    pub mapper: RowMapper<T>,
}

impl<T> ReadPlan<T> {
    /// Lectura sólo por SQL directo
    pub fn direct(operation: impl Into<String>, fallback: Statement, mapper: RowMapper<T>) -> Self {
        Self {
            operation: operation.into(),
            preferred: None,
            required: &[],
            fallback,
            mapper,
        }
    }

    /// Intentar primero la rutina, verificando las columnas requeridas
    pub fn preferred(mut self, stmt: Statement, required: &'static [&'static str]) -> Self {
        self.preferred = Some(stmt);
        self.required = required;
        self
    }
}

/// Ejecutor genérico de planes de escritura y lectura
#[derive(Clone)]
pub struct DualPathExecutor {
    provider: Arc<dyn ConnectionProvider>,
}

impl DualPathExecutor {
    pub fn new(provider: Arc<dyn ConnectionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn ConnectionProvider> {
        &self.provider
    }

    /// Ejecutar los niveles en orden; devuelve el nivel que completó
    pub async fn write(&self, plan: &WritePlan) -> DataResult<TierKind> {
        let last = plan.tiers.len().saturating_sub(1);

        for (index, tier) in plan.tiers.iter().enumerate() {
            match self.run_tier(&plan.operation, tier).await {
                Ok(()) => {
                    if index > 0 {
                        log::info!("✅ {} completado por {}", plan.operation, tier.kind);
                    }
                    return Ok(tier.kind);
                }
                Err(e) if e.is_recoverable() && index < last => {
                    log::warn!(
                        "⚠️ {} vía {} no disponible, se intenta el siguiente nivel: {}",
                        plan.operation,
                        tier.kind,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(DataError::Database(format!(
            "{}: no execution tier defined",
            plan.operation
        )))
    }

    /// Leer por la ruta preferida y, si no sirve, por la alternativa
    pub async fn read<T>(&self, plan: &ReadPlan<T>) -> DataResult<Vec<T>> {
        if let Some(preferred) = &plan.preferred {
            match self.read_preferred(plan, preferred).await {
                Ok(items) => return Ok(items),
                Err(e) if e.is_recoverable() => {
                    log::warn!(
                        "⚠️ {} vía rutina no utilizable, se usa SQL directo: {}",
                        plan.operation,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }

        let result = self.query(&plan.fallback).await?;
        map_rows(&result, plan.mapper)
    }

    /// Una consulta sobre una sesión propia, sin niveles alternativos
    pub async fn query(&self, stmt: &Statement) -> DataResult<ResultSet> {
        let mut session = self.provider.acquire().await?;
        let outcome = session.query(stmt).await;
        session.close().await;
        outcome
    }

    async fn read_preferred<T>(&self, plan: &ReadPlan<T>, stmt: &Statement) -> DataResult<Vec<T>> {
        let result = self.query(stmt).await?;

        if let ProbeVerdict::Rejected { missing } = ShapeProber::probe(&result, plan.required) {
            return Err(DataError::routine_unavailable(format!(
                "{} result lacks columns {:?}",
                plan.operation, missing
            )));
        }

        map_rows(&result, plan.mapper).map_err(|e| {
            DataError::routine_unavailable(format!("{} result unreadable: {}", plan.operation, e))
        })
    }

    async fn run_tier(&self, operation: &str, tier: &Tier) -> DataResult<()> {
        let mut session = self.provider.acquire().await?;
        let outcome = run_steps(session.as_mut(), operation, tier).await;
        session.close().await;
        outcome
    }
}

async fn run_steps(session: &mut dyn DbSession, operation: &str, tier: &Tier) -> DataResult<()> {
    let mut affected = 0;
    for stmt in &tier.steps {
        affected = session.execute(stmt).await?;
    }
    if tier.require_rows && affected == 0 {
        return Err(DataError::NoRowsAffected(format!("{} via {}", operation, tier.kind)));
    }
    Ok(())
}

fn map_rows<T>(result: &ResultSet, mapper: RowMapper<T>) -> DataResult<Vec<T>> {
    result.iter().map(|row| mapper(&row)).collect()
}

/// Escrituras: `true` si algún nivel completó
pub fn settle_write(operation: &str, result: DataResult<TierKind>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) => {
            log::error!("❌ {} falló: {}", operation, e);
            false
        }
    }
}

/// Listados: la secuencia mapeada o vacía si hubo error
pub fn settle_list<T>(operation: &str, result: DataResult<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        log::error!("❌ {} falló: {}", operation, e);
        Vec::new()
    })
}

/// Búsquedas: el primer registro, si existe
pub fn settle_find<T>(operation: &str, result: DataResult<Vec<T>>) -> Option<T> {
    settle_list(operation, result).into_iter().next()
}
