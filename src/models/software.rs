use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Software {
    pub id: i64,
    pub nome: String,
    pub versione: String,
    pub descrizione: String,
    pub azienda_id: i64,
    pub prezzo: Decimal,
    pub gratuito: bool,
    pub attivo: bool,
    pub data_rilascio: NaiveDate,
    pub creato_il: DateTime<Utc>,
    pub modificato_il: DateTime<Utc>,
}

impl Software {
    /// "Gratuito" for free entries, otherwise the euro amount.
    pub fn prezzo_formattato(&self) -> String {
        if self.gratuito {
            "Gratuito".to_string()
        } else {
            format!("€{}", self.prezzo)
        }
    }
}

/// A software row joined with the owning company's summary columns.
#[derive(Debug, Clone, FromRow)]
pub struct SoftwareRecord {
    #[sqlx(flatten)]
    pub software: Software,
    pub azienda_nome: String,
    pub azienda_sede: String,
    pub azienda_email: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoftwareData {
    pub nome: String,
    pub versione: String,
    pub descrizione: String,
    pub azienda_id: i64,
    pub prezzo: Decimal,
    pub gratuito: bool,
    pub attivo: bool,
    pub data_rilascio: NaiveDate,
}

impl From<&Software> for SoftwareData {
    fn from(s: &Software) -> Self {
        Self {
            nome: s.nome.clone(),
            versione: s.versione.clone(),
            descrizione: s.descrizione.clone(),
            azienda_id: s.azienda_id,
            prezzo: s.prezzo,
            gratuito: s.gratuito,
            attivo: s.attivo,
            data_rilascio: s.data_rilascio,
        }
    }
}

/// Aggregates over a set of software rows. Price figures are `None` when the set is empty.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct CatalogStats {
    pub totale: i64,
    pub gratuiti: i64,
    pub a_pagamento: i64,
    pub attivi: i64,
    pub prezzo_medio: Option<Decimal>,
    pub prezzo_max: Option<Decimal>,
    pub prezzo_min: Option<Decimal>,
}
