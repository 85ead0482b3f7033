//! Configuración de base de datos
//!
//! Resuelve los parámetros de conexión a PostgreSQL a partir de una lista
//! ordenada de fuentes. Gana la primera fuente que tenga URL y usuario.

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat, Map};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::database::connection::mask_database_url;

pub const DEFAULT_URL: &str = "postgres://localhost:5432/guia_remision";
pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_PASSWORD: &str = "root";
pub const DEFAULT_PROPERTIES_FILE: &str = "db.properties";

/// Fuente de la que se tomaron los parámetros
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    Overrides,
    Environment,
    PropertiesFile,
    Defaults,
}

/// Valores provistos por el programa que embebe la librería (o por línea de comandos)
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Tamaño del pool, sólo cuando se configura `db.pool.max` / `DB_POOL_MAX`
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl PoolSettings {
    pub fn with_max(max_connections: u32) -> Self {
        Self {
            max_connections: max_connections.max(1),
            min_connections: 0,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        }
    }
}

/// Parámetros de conexión resueltos
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub url: String,
    pub user: String,
    pub password: String,
    pub source: SettingsSource,
    pub pool: Option<PoolSettings>,
}

/// Una fuente de parámetros; se usa completa o no se usa
struct Candidate {
    url: Option<String>,
    user: Option<String>,
    password: Option<String>,
}

impl Candidate {
    fn from_config(source: &Config, keys: [&str; 3]) -> Self {
        let [url, user, password] = keys.map(|key| source.get_string(key).ok());
        Self { url, user, password }
    }

    fn usable(&self) -> bool {
        non_blank(&self.url).is_some() && non_blank(&self.user).is_some()
    }
}

impl ConnectionSettings {
    /// Resolver desde el entorno del proceso: overrides, variables `DB_*`,
    /// `db.properties` y por último los valores por defecto
    pub fn resolve(overrides: &ConnectionOverrides) -> Self {
        let properties = std::env::var("DB_PROPERTIES")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PROPERTIES_FILE));
        Self::resolve_with(overrides, None, &properties)
    }

    /// Igual que `resolve` pero con variables y archivo explícitos;
    /// `env = None` lee las variables del proceso
    pub fn resolve_with(
        overrides: &ConnectionOverrides,
        env: Option<Map<String, String>>,
        properties_path: &Path,
    ) -> Self {
        let environment = read_source(
            "variables DB_*",
            Config::builder().add_source(Environment::with_prefix("DB").source(env)),
        );
        let properties = read_source(
            &properties_path.display().to_string(),
            Config::builder().add_source(
                File::new(&properties_path.to_string_lossy(), FileFormat::Ini).required(false),
            ),
        );

        let candidates = [
            (
                SettingsSource::Overrides,
                Candidate {
                    url: overrides.url.clone(),
                    user: overrides.user.clone(),
                    password: overrides.password.clone(),
                },
            ),
            (
                SettingsSource::Environment,
                Candidate::from_config(&environment, ["url", "user", "pass"]),
            ),
            (
                SettingsSource::PropertiesFile,
                Candidate::from_config(&properties, ["db.url", "db.user", "db.pass"]),
            ),
        ];

        let pool = environment
            .get_string("pool_max")
            .or_else(|_| properties.get_string("db.pool.max"))
            .ok()
            .and_then(|raw| match raw.trim().parse::<u32>() {
                Ok(max) => Some(PoolSettings::with_max(max)),
                Err(_) => {
                    log::warn!("⚠️ Tamaño de pool inválido '{}', se usa conexión directa", raw);
                    None
                }
            });

        let chosen = candidates.into_iter().find(|(_, c)| c.usable());
        let settings = match chosen {
            Some((source, c)) => Self {
                url: normalize_url(non_blank(&c.url).unwrap_or(DEFAULT_URL)),
                user: non_blank(&c.user).unwrap_or(DEFAULT_USER).to_string(),
                password: c.password.unwrap_or_default(),
                source,
                pool,
            },
            None => Self {
                url: DEFAULT_URL.to_string(),
                user: DEFAULT_USER.to_string(),
                password: DEFAULT_PASSWORD.to_string(),
                source: SettingsSource::Defaults,
                pool,
            },
        };

        log::info!(
            "🗄️ Conexión configurada desde {:?}: {} (usuario {})",
            settings.source,
            settings.masked_target(),
            settings.user
        );
        settings
    }

    /// Destino de conexión sin credenciales, apto para logs y errores
    pub fn masked_target(&self) -> String {
        mask_database_url(&self.url)
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        Ok(PgConnectOptions::from_str(&self.url)?
            .username(&self.user)
            .password(&self.password))
    }

    /// Pool perezoso: no abre conexiones hasta el primer `acquire()`
    pub fn lazy_pool(&self) -> Result<PgPool, sqlx::Error> {
        let pool = self
            .pool
            .clone()
            .unwrap_or_else(|| PoolSettings::with_max(5));
        Ok(PgPoolOptions::new()
            .max_connections(pool.max_connections)
            .min_connections(pool.min_connections)
            .acquire_timeout(pool.acquire_timeout)
            .idle_timeout(pool.idle_timeout)
            .max_lifetime(pool.max_lifetime)
            .connect_lazy_with(self.connect_options()?))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Acepta URLs estilo JDBC (`jdbc:postgresql://...`)
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = url.strip_prefix("jdbc:").unwrap_or(url);
    match url.strip_prefix("postgresql://") {
        Some(rest) => format!("postgres://{}", rest),
        None => url.to_string(),
    }
}

/// Una fuente ilegible (archivo mal formado) se trata como vacía
fn read_source(label: &str, builder: ConfigBuilder<DefaultState>) -> Config {
    builder.build().unwrap_or_else(|e| {
        log::warn!("⚠️ No se pudo leer {}: {}", label, e);
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn missing_file() -> PathBuf {
        PathBuf::from("/nonexistent/db.properties")
    }

    fn properties_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("guia_remision_{}_{}.properties", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_when_nothing_configured() {
        let s = ConnectionSettings::resolve_with(&ConnectionOverrides::default(), vars(&[]), &missing_file());
        assert_eq!(s.source, SettingsSource::Defaults);
        assert_eq!(s.url, DEFAULT_URL);
        assert_eq!(s.user, DEFAULT_USER);
        assert_eq!(s.password, DEFAULT_PASSWORD);
        assert!(s.pool.is_none());
    }

    #[test]
    fn test_overrides_win_over_environment() {
        let env = vars(&[("DB_URL", "postgres://env-host/guia"), ("DB_USER", "env_user")]);
        let overrides = ConnectionOverrides {
            url: Some("jdbc:postgresql://cli-host:5432/guia".to_string()),
            user: Some("cli_user".to_string()),
            password: None,
        };
        let s = ConnectionSettings::resolve_with(&overrides, env, &missing_file());
        assert_eq!(s.source, SettingsSource::Overrides);
        assert_eq!(s.url, "postgres://cli-host:5432/guia");
        assert_eq!(s.password, "");
    }

    #[test]
    fn test_environment_source_and_pool_size() {
        let env = vars(&[
            ("DB_URL", "postgres://env-host/guia"),
            ("DB_USER", "env_user"),
            ("DB_PASS", "clave"),
            ("DB_POOL_MAX", "8"),
        ]);
        let s = ConnectionSettings::resolve_with(&ConnectionOverrides::default(), env, &missing_file());
        assert_eq!(s.source, SettingsSource::Environment);
        assert_eq!(s.user, "env_user");
        assert_eq!(s.password, "clave");
        assert_eq!(s.pool.map(|p| p.max_connections), Some(8));
    }

    #[test]
    fn test_source_without_user_is_skipped() {
        let env = vars(&[("DB_URL", "postgres://env-host/guia"), ("DB_USER", "   ")]);
        let s = ConnectionSettings::resolve_with(&ConnectionOverrides::default(), env, &missing_file());
        assert_eq!(s.source, SettingsSource::Defaults);
    }

    #[test]
    fn test_properties_file_is_used_as_a_whole() {
        let path = properties_file(
            "whole",
            "# conexión\ndb.url = jdbc:postgresql://files/guia\ndb.user=admin\ndb.pass=secreto\ndb.pool.max=4\n",
        );
        // El usuario del entorno no basta sin URL; no se mezcla con el archivo
        let env = vars(&[("DB_USER", "env_user")]);
        let s = ConnectionSettings::resolve_with(&ConnectionOverrides::default(), env, &path);
        std::fs::remove_file(&path).ok();

        assert_eq!(s.source, SettingsSource::PropertiesFile);
        assert_eq!(s.url, "postgres://files/guia");
        assert_eq!(s.user, "admin");
        assert_eq!(s.password, "secreto");
        assert_eq!(s.pool.map(|p| p.max_connections), Some(4));
    }

    #[test]
    fn test_jdbc_urls_are_normalized() {
        assert_eq!(normalize_url("postgresql://h/db"), "postgres://h/db");
        assert_eq!(normalize_url(" jdbc:postgresql://h:5432/db "), "postgres://h:5432/db");
    }
}
