//! # Tabla de Resultados
//! src/jobs/dataset.rs
//!
//! Datos tabulares que devuelve `/viewresults`. Por ahora es un conjunto fijo
//! que ocupa el lugar del procesamiento real del artefacto.

use serde::Serialize;

/// Una fila de la tabla de resultados
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: u32,
    pub year: u16,
    pub user_gain: u32,
    pub user_lost: u32,
}

/// Vista de solo lectura del resultado de un job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    /// Nombres de las columnas
    #[serde(rename = "Headers")]
    pub headers: Vec<&'static str>,

    /// Filas
    pub data: Vec<UserRecord>,
}

const HEADERS: [&str; 4] = ["id", "year", "userGain", "userLost"];

const RECORDS: [UserRecord; 6] = [
    UserRecord { id: 1, year: 2016, user_gain: 80000, user_lost: 823 },
    UserRecord { id: 6, year: 2016, user_gain: 80000, user_lost: 823 },
    UserRecord { id: 2, year: 2017, user_gain: 45677, user_lost: 345 },
    UserRecord { id: 3, year: 2018, user_gain: 78888, user_lost: 555 },
    UserRecord { id: 4, year: 2019, user_gain: 90000, user_lost: 4555 },
    UserRecord { id: 5, year: 2020, user_gain: 4300, user_lost: 234 },
];

impl ResultTable {
    /// Construye la tabla de resultados de un job completado
    pub fn placeholder() -> Self {
        Self {
            headers: HEADERS.to_vec(),
            data: RECORDS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_shape() {
        let table = ResultTable::placeholder();
        assert_eq!(table.headers, vec!["id", "year", "userGain", "userLost"]);
        assert_eq!(table.data.len(), 6);
    }

    #[test]
    fn test_table_json_field_names() {
        let json = serde_json::to_value(ResultTable::placeholder()).unwrap();

        assert!(json.get("Headers").is_some());
        let first = &json["data"][0];
        assert_eq!(first["id"], 1);
        assert_eq!(first["year"], 2016);
        assert_eq!(first["userGain"], 80000);
        assert_eq!(first["userLost"], 823);
    }
}
