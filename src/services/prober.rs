//! Verificación de la forma de un resultado
//!
//! Antes de leer filas de una rutina preferida se comprueba que el resultado
//! exponga todas las columnas requeridas.

use crate::database::value::ResultSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeVerdict {
    Accepted,
    Rejected { missing: Vec<String> },
}

impl ProbeVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ProbeVerdict::Accepted)
    }
}

pub struct ShapeProber;

impl ShapeProber {
    /// Resolver cada columna requerida sin distinguir mayúsculas; no lee filas
    pub fn probe(result: &ResultSet, required: &[&str]) -> ProbeVerdict {
        let missing: Vec<String> = required
            .iter()
            .filter(|name| !result.has_column(name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            ProbeVerdict::Accepted
        } else {
            ProbeVerdict::Rejected { missing }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> ResultSet {
        ResultSet::new(names.iter().map(|n| n.to_string()).collect(), vec![])
    }

    #[test]
    fn test_exact_columns_are_accepted() {
        let required = ["codigo_ubigeo", "departamento", "provincia", "distrito"];
        let rs = columns(&["CODIGO_UBIGEO", "Departamento", "provincia", "distrito"]);
        assert!(ShapeProber::probe(&rs, &required).is_accepted());
    }

    #[test]
    fn test_each_missing_column_rejects() {
        let required = ["placa", "numero_mtc", "carga_max"];
        for skip in required {
            let present: Vec<&str> = required.iter().copied().filter(|c| *c != skip).collect();
            let verdict = ShapeProber::probe(&columns(&present), &required);
            assert_eq!(
                verdict,
                ProbeVerdict::Rejected {
                    missing: vec![skip.to_string()]
                }
            );
        }
    }

    #[test]
    fn test_empty_result_without_columns_is_rejected() {
        // Un resultado sin filas no expone columnas
        let verdict = ShapeProber::probe(&ResultSet::empty(), &["ruc"]);
        assert!(!verdict.is_accepted());
    }
}
