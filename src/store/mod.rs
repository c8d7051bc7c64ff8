//! Persistence behind the handlers.
//!
//! `PgStore` is the production backend; `MemoryStore` keeps everything in
//! process and backs the test suite and database-less development runs.
//! Both report constraint violations with the same field errors.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::AppError;
use crate::models::azienda::{AziendaData, AziendaRecord};
use crate::models::software::{CatalogStats, SoftwareData, SoftwareRecord};
use crate::models::user::{NewUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Row filter for software listings. Every `Some` narrows the result.
#[derive(Debug, Clone, Default)]
pub struct SoftwareFilter {
    pub azienda_id: Option<i64>,
    pub gratuito: Option<bool>,
    pub attivo: Option<bool>,
    /// Case-insensitive exact match on the owning company's name.
    pub produttore: Option<String>,
    /// Case-insensitive substring over name, version, description and company name.
    pub search: Option<String>,
    pub prezzo_min: Option<Decimal>,
    pub prezzo_max: Option<Decimal>,
}

impl SoftwareFilter {
    pub fn matches(&self, rec: &SoftwareRecord) -> bool {
        let s = &rec.software;
        if self.azienda_id.is_some_and(|id| id != s.azienda_id) {
            return false;
        }
        if self.gratuito.is_some_and(|g| g != s.gratuito) {
            return false;
        }
        if self.attivo.is_some_and(|a| a != s.attivo) {
            return false;
        }
        if let Some(p) = &self.produttore {
            if rec.azienda_nome.to_lowercase() != p.to_lowercase() {
                return false;
            }
        }
        if let Some(q) = &self.search {
            let q = q.to_lowercase();
            let hit = [&s.nome, &s.versione, &s.descrizione, &rec.azienda_nome]
                .iter()
                .any(|field| field.to_lowercase().contains(&q));
            if !hit {
                return false;
            }
        }
        if self.prezzo_min.is_some_and(|min| s.prezzo < min) {
            return false;
        }
        if self.prezzo_max.is_some_and(|max| s.prezzo > max) {
            return false;
        }
        true
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_aziende(&self) -> Result<Vec<AziendaRecord>, AppError>;
    async fn get_azienda(&self, id: i64) -> Result<Option<AziendaRecord>, AppError>;
    async fn insert_azienda(&self, data: &AziendaData) -> Result<AziendaRecord, AppError>;
    /// `Ok(None)` when no row has this id.
    async fn update_azienda(&self, id: i64, data: &AziendaData) -> Result<Option<AziendaRecord>, AppError>;
    /// Deletes the company and all of its software. Returns whether a row existed.
    async fn delete_azienda(&self, id: i64) -> Result<bool, AppError>;
    async fn count_aziende(&self) -> Result<i64, AppError>;

    async fn list_software(&self, filter: &SoftwareFilter) -> Result<Vec<SoftwareRecord>, AppError>;
    async fn get_software(&self, id: i64) -> Result<Option<SoftwareRecord>, AppError>;
    async fn insert_software(&self, data: &SoftwareData) -> Result<SoftwareRecord, AppError>;
    async fn update_software(&self, id: i64, data: &SoftwareData) -> Result<Option<SoftwareRecord>, AppError>;
    async fn delete_software(&self, id: i64) -> Result<bool, AppError>;
    /// Aggregates over all software, or over one company's when `azienda_id` is set.
    async fn catalog_stats(&self, azienda_id: Option<i64>) -> Result<CatalogStats, AppError>;

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError>;
    /// Enables or disables login. Returns whether the user exists.
    async fn set_user_active(&self, id: i64, active: bool) -> Result<bool, AppError>;
}

pub(crate) fn duplicate_azienda_nome() -> AppError {
    AppError::invalid_field("nome", "azienda with this nome already exists.")
}

pub(crate) fn duplicate_partita_iva() -> AppError {
    AppError::invalid_field("partita_iva", "azienda with this partita iva already exists.")
}

pub(crate) fn duplicate_software_release() -> AppError {
    AppError::invalid_field(
        "non_field_errors",
        "The fields nome, versione, azienda must make a unique set.",
    )
}

pub(crate) fn unknown_azienda(id: i64) -> AppError {
    AppError::invalid_field("azienda", format!("Invalid pk \"{id}\" - object does not exist."))
}

pub(crate) fn duplicate_username() -> AppError {
    AppError::invalid_field("username", "A user with that username already exists.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::software::Software;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;

    fn record(nome: &str, azienda: &str, prezzo: &str, gratuito: bool) -> SoftwareRecord {
        let now = Utc::now();
        SoftwareRecord {
            software: Software {
                id: 1,
                nome: nome.into(),
                versione: "1.0".into(),
                descrizione: "Editor di testo".into(),
                azienda_id: 7,
                prezzo: Decimal::from_str(prezzo).unwrap(),
                gratuito,
                attivo: true,
                data_rilascio: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                creato_il: now,
                modificato_il: now,
            },
            azienda_nome: azienda.into(),
            azienda_sede: "Redmond, WA".into(),
            azienda_email: "info@example.com".into(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(SoftwareFilter::default().matches(&record("VS Code", "Microsoft", "0", true)));
    }

    #[test]
    fn producer_match_ignores_case_but_not_substrings() {
        let rec = record("Photoshop", "Adobe", "239.88", false);
        let exact = SoftwareFilter { produttore: Some("ADOBE".into()), ..Default::default() };
        let partial = SoftwareFilter { produttore: Some("Ado".into()), ..Default::default() };
        assert!(exact.matches(&rec));
        assert!(!partial.matches(&rec));
    }

    #[test]
    fn search_covers_description_and_company() {
        let rec = record("VS Code", "Microsoft", "0", true);
        for q in ["code", "TESTO", "micro"] {
            let f = SoftwareFilter { search: Some(q.into()), ..Default::default() };
            assert!(f.matches(&rec), "query {q} should match");
        }
        let miss = SoftwareFilter { search: Some("adobe".into()), ..Default::default() };
        assert!(!miss.matches(&rec));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let rec = record("Photoshop", "Adobe", "239.88", false);
        let f = SoftwareFilter {
            prezzo_min: Some(Decimal::from_str("239.88").unwrap()),
            prezzo_max: Some(Decimal::from_str("239.88").unwrap()),
            ..Default::default()
        };
        assert!(f.matches(&rec));
        let below = SoftwareFilter { prezzo_max: Some(Decimal::from(100)), ..Default::default() };
        assert!(!below.matches(&rec));
    }
}
