//! Domain types for the cadeiras table.

use serde::{Deserialize, Serialize};

/// Primary key of a cadeira, assigned by storage.
pub type CadeiraId = i32;

/// A stored cadeira, as returned to clients.
///
/// Field names mirror the table columns. `qtdPernas` is declared unquoted
/// in SQL, so the engine folds it to `qtdpernas` and that is the key
/// clients receive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cadeira {
    pub id: CadeiraId,
    pub personalidade: String,
    pub qtdpernas: i32,
    /// Always serialized; `null` when the column is NULL.
    pub acolchoada: Option<bool>,
}

/// Column values written by create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCadeira {
    pub personalidade: String,
    pub qtd_pernas: i32,
    pub acolchoada: Option<bool>,
}

impl NewCadeira {
    /// Materialize a row with the given id.
    pub fn with_id(&self, id: CadeiraId) -> Cadeira {
        Cadeira {
            id,
            personalidade: self.personalidade.clone(),
            qtdpernas: self.qtd_pernas,
            acolchoada: self.acolchoada,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_in_column_order_with_null_acolchoada() {
        let cadeira = Cadeira {
            id: 1,
            personalidade: "rígida".to_string(),
            qtdpernas: 3,
            acolchoada: None,
        };
        let json = serde_json::to_string(&cadeira).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"personalidade":"rígida","qtdpernas":3,"acolchoada":null}"#
        );
    }

    #[test]
    fn with_id_copies_every_column() {
        let new = NewCadeira {
            personalidade: "confortável".to_string(),
            qtd_pernas: 4,
            acolchoada: Some(true),
        };
        let cadeira = new.with_id(7);
        assert_eq!(cadeira.id, 7);
        assert_eq!(cadeira.qtdpernas, 4);
        assert_eq!(cadeira.acolchoada, Some(true));
    }
}
