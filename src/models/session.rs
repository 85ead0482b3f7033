//! Sesión del remitente autenticado
//!
//! Se pasa explícitamente a las operaciones que la necesitan.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    sender_ruc: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn login(ruc: impl Into<String>) -> Self {
        let ruc = ruc.into();
        let ruc = ruc.trim();
        Self {
            sender_ruc: (!ruc.is_empty()).then(|| ruc.to_string()),
        }
    }

    pub fn is_logged(&self) -> bool {
        self.sender_ruc.is_some()
    }

    pub fn current_ruc(&self) -> Option<&str> {
        self.sender_ruc.as_deref()
    }

    pub fn logout(&mut self) {
        self.sender_ruc = None;
    }
}
