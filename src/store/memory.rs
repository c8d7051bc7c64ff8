use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::sync::RwLock;

use super::{
    duplicate_azienda_nome, duplicate_partita_iva, duplicate_software_release, duplicate_username,
    unknown_azienda, CatalogStore, SoftwareFilter,
};
use crate::error::AppError;
use crate::models::azienda::{Azienda, AziendaData, AziendaRecord};
use crate::models::software::{CatalogStats, Software, SoftwareData, SoftwareRecord};
use crate::models::user::{NewUser, User};

#[derive(Default)]
struct Tables {
    aziende: BTreeMap<i64, Azienda>,
    software: BTreeMap<i64, Software>,
    users: BTreeMap<i64, User>,
    last_azienda_id: i64,
    last_software_id: i64,
    last_user_id: i64,
}

impl Tables {
    fn azienda_record(&self, azienda: &Azienda) -> AziendaRecord {
        let num_software = self
            .software
            .values()
            .filter(|s| s.azienda_id == azienda.id)
            .count() as i64;
        AziendaRecord { azienda: azienda.clone(), num_software }
    }

    fn software_record(&self, software: &Software) -> Option<SoftwareRecord> {
        let owner = self.aziende.get(&software.azienda_id)?;
        Some(SoftwareRecord {
            software: software.clone(),
            azienda_nome: owner.nome.clone(),
            azienda_sede: owner.sede.clone(),
            azienda_email: owner.email.clone(),
        })
    }

    /// Mirrors the UNIQUE constraints on `aziende`, ignoring the row being updated.
    fn check_azienda_unique(&self, data: &AziendaData, except: Option<i64>) -> Result<(), AppError> {
        let mut others = self.aziende.values().filter(|a| Some(a.id) != except);
        if others.clone().any(|a| a.nome == data.nome) {
            return Err(duplicate_azienda_nome());
        }
        if others.any(|a| a.partita_iva == data.partita_iva) {
            return Err(duplicate_partita_iva());
        }
        Ok(())
    }

    fn check_software_writable(&self, data: &SoftwareData, except: Option<i64>) -> Result<(), AppError> {
        if !self.aziende.contains_key(&data.azienda_id) {
            return Err(unknown_azienda(data.azienda_id));
        }
        let clash = self.software.values().any(|s| {
            Some(s.id) != except
                && s.nome == data.nome
                && s.versione == data.versione
                && s.azienda_id == data.azienda_id
        });
        if clash {
            return Err(duplicate_software_release());
        }
        Ok(())
    }
}

/// Process-local store. Ids are assigned sequentially per table, like a serial column.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_aziende(&self) -> Result<Vec<AziendaRecord>, AppError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<AziendaRecord> =
            tables.aziende.values().map(|a| tables.azienda_record(a)).collect();
        rows.sort_by(|a, b| a.azienda.nome.cmp(&b.azienda.nome));
        Ok(rows)
    }

    async fn get_azienda(&self, id: i64) -> Result<Option<AziendaRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.aziende.get(&id).map(|a| tables.azienda_record(a)))
    }

    async fn insert_azienda(&self, data: &AziendaData) -> Result<AziendaRecord, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_azienda_unique(data, None)?;

        tables.last_azienda_id += 1;
        let now = Utc::now();
        let azienda = Azienda {
            id: tables.last_azienda_id,
            nome: data.nome.clone(),
            partita_iva: data.partita_iva.clone(),
            sede: data.sede.clone(),
            email: data.email.clone(),
            telefono: data.telefono.clone(),
            sito_web: data.sito_web.clone(),
            descrizione: data.descrizione.clone(),
            data_fondazione: data.data_fondazione,
            creata_il: now,
            modificata_il: now,
        };
        tables.aziende.insert(azienda.id, azienda.clone());
        Ok(AziendaRecord { azienda, num_software: 0 })
    }

    async fn update_azienda(&self, id: i64, data: &AziendaData) -> Result<Option<AziendaRecord>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.aziende.contains_key(&id) {
            return Ok(None);
        }
        tables.check_azienda_unique(data, Some(id))?;

        let Some(azienda) = tables.aziende.get_mut(&id) else {
            return Ok(None);
        };
        azienda.nome = data.nome.clone();
        azienda.partita_iva = data.partita_iva.clone();
        azienda.sede = data.sede.clone();
        azienda.email = data.email.clone();
        azienda.telefono = data.telefono.clone();
        azienda.sito_web = data.sito_web.clone();
        azienda.descrizione = data.descrizione.clone();
        azienda.data_fondazione = data.data_fondazione;
        azienda.modificata_il = Utc::now();

        let updated = azienda.clone();
        Ok(Some(tables.azienda_record(&updated)))
    }

    async fn delete_azienda(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.aziende.remove(&id).is_none() {
            return Ok(false);
        }
        tables.software.retain(|_, s| s.azienda_id != id);
        Ok(true)
    }

    async fn count_aziende(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().await.aziende.len() as i64)
    }

    async fn list_software(&self, filter: &SoftwareFilter) -> Result<Vec<SoftwareRecord>, AppError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<SoftwareRecord> = tables
            .software
            .values()
            .filter_map(|s| tables.software_record(s))
            .filter(|rec| filter.matches(rec))
            .collect();
        rows.sort_by(|a, b| {
            b.software
                .data_rilascio
                .cmp(&a.software.data_rilascio)
                .then(a.software.id.cmp(&b.software.id))
        });
        Ok(rows)
    }

    async fn get_software(&self, id: i64) -> Result<Option<SoftwareRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.software.get(&id).and_then(|s| tables.software_record(s)))
    }

    async fn insert_software(&self, data: &SoftwareData) -> Result<SoftwareRecord, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_software_writable(data, None)?;

        tables.last_software_id += 1;
        let now = Utc::now();
        let software = Software {
            id: tables.last_software_id,
            nome: data.nome.clone(),
            versione: data.versione.clone(),
            descrizione: data.descrizione.clone(),
            azienda_id: data.azienda_id,
            prezzo: data.prezzo,
            gratuito: data.gratuito,
            attivo: data.attivo,
            data_rilascio: data.data_rilascio,
            creato_il: now,
            modificato_il: now,
        };
        tables.software.insert(software.id, software.clone());
        tables
            .software_record(&software)
            .ok_or_else(|| unknown_azienda(data.azienda_id))
    }

    async fn update_software(&self, id: i64, data: &SoftwareData) -> Result<Option<SoftwareRecord>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.software.contains_key(&id) {
            return Ok(None);
        }
        tables.check_software_writable(data, Some(id))?;

        let Some(software) = tables.software.get_mut(&id) else {
            return Ok(None);
        };
        software.nome = data.nome.clone();
        software.versione = data.versione.clone();
        software.descrizione = data.descrizione.clone();
        software.azienda_id = data.azienda_id;
        software.prezzo = data.prezzo;
        software.gratuito = data.gratuito;
        software.attivo = data.attivo;
        software.data_rilascio = data.data_rilascio;
        software.modificato_il = Utc::now();

        let updated = software.clone();
        Ok(tables.software_record(&updated))
    }

    async fn delete_software(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.software.remove(&id).is_some())
    }

    async fn catalog_stats(&self, azienda_id: Option<i64>) -> Result<CatalogStats, AppError> {
        let tables = self.tables.read().await;
        let rows: Vec<&Software> = tables
            .software
            .values()
            .filter(|s| azienda_id.map_or(true, |id| s.azienda_id == id))
            .collect();

        let totale = rows.len() as i64;
        let gratuiti = rows.iter().filter(|s| s.gratuito).count() as i64;
        let attivi = rows.iter().filter(|s| s.attivo).count() as i64;
        let prezzo_medio = if rows.is_empty() {
            None
        } else {
            let sum: Decimal = rows.iter().map(|s| s.prezzo).sum();
            Some((sum / Decimal::from(totale)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        };

        Ok(CatalogStats {
            totale,
            gratuiti,
            a_pagamento: totale - gratuiti,
            attivi,
            prezzo_medio,
            prezzo_max: rows.iter().map(|s| s.prezzo).max(),
            prezzo_min: rows.iter().map(|s| s.prezzo).min(),
        })
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(duplicate_username());
        }
        tables.last_user_id += 1;
        let created = User {
            id: tables.last_user_id,
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            is_active: true,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            permissions: user.permissions.clone(),
            date_joined: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn set_user_active(&self, id: i64, active: bool) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn azienda(nome: &str, piva: &str) -> AziendaData {
        AziendaData {
            nome: nome.into(),
            partita_iva: piva.into(),
            sede: "Milano".into(),
            email: format!("info@{}.it", nome.to_lowercase()),
            telefono: String::new(),
            sito_web: String::new(),
            descrizione: String::new(),
            data_fondazione: None,
        }
    }

    fn software(nome: &str, azienda_id: i64, prezzo: &str, gratuito: bool, day: u32) -> SoftwareData {
        SoftwareData {
            nome: nome.into(),
            versione: "1.0".into(),
            descrizione: String::new(),
            azienda_id,
            prezzo: Decimal::from_str(prezzo).unwrap(),
            gratuito,
            attivo: true,
            data_rilascio: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        }
    }

    #[tokio::test]
    async fn unique_company_fields_are_enforced() {
        let store = MemoryStore::new();
        store.insert_azienda(&azienda("Adobe", "111")).await.unwrap();

        let err = store.insert_azienda(&azienda("Adobe", "222")).await.unwrap_err();
        assert!(err.to_string().contains("nome"));
        let err = store.insert_azienda(&azienda("Other", "111")).await.unwrap_err();
        assert!(err.to_string().contains("partita_iva"));
    }

    #[tokio::test]
    async fn update_may_keep_its_own_unique_values() {
        let store = MemoryStore::new();
        let created = store.insert_azienda(&azienda("Adobe", "111")).await.unwrap();
        let mut data = azienda("Adobe", "111");
        data.sede = "San Jose".into();

        let updated = store.update_azienda(created.azienda.id, &data).await.unwrap().unwrap();
        assert_eq!(updated.azienda.sede, "San Jose");
        assert!(store.update_azienda(99, &data).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_a_company_cascades() {
        let store = MemoryStore::new();
        let a = store.insert_azienda(&azienda("Adobe", "111")).await.unwrap().azienda.id;
        let b = store.insert_azienda(&azienda("JetBrains", "222")).await.unwrap().azienda.id;
        store.insert_software(&software("Photoshop", a, "239.88", false, 1)).await.unwrap();
        store.insert_software(&software("IntelliJ", b, "0", true, 2)).await.unwrap();

        assert!(store.delete_azienda(a).await.unwrap());
        let left = store.list_software(&SoftwareFilter::default()).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].azienda_nome, "JetBrains");
        assert!(!store.delete_azienda(a).await.unwrap());
    }

    #[tokio::test]
    async fn software_needs_an_existing_owner_and_a_unique_release() {
        let store = MemoryStore::new();
        let err = store.insert_software(&software("Photoshop", 5, "1", false, 1)).await.unwrap_err();
        assert!(err.to_string().contains("azienda"));

        let a = store.insert_azienda(&azienda("Adobe", "111")).await.unwrap().azienda.id;
        store.insert_software(&software("Photoshop", a, "1", false, 1)).await.unwrap();
        let err = store.insert_software(&software("Photoshop", a, "2", false, 2)).await.unwrap_err();
        assert!(err.to_string().contains("non_field_errors"));
    }

    #[tokio::test]
    async fn listing_is_newest_release_first() {
        let store = MemoryStore::new();
        let a = store.insert_azienda(&azienda("Adobe", "111")).await.unwrap().azienda.id;
        store.insert_software(&software("Old", a, "1", false, 1)).await.unwrap();
        store.insert_software(&software("New", a, "1", false, 20)).await.unwrap();

        let names: Vec<String> = store
            .list_software(&SoftwareFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.software.nome)
            .collect();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn stats_round_the_average_and_scope_by_company() {
        let store = MemoryStore::new();
        let a = store.insert_azienda(&azienda("Adobe", "111")).await.unwrap().azienda.id;
        let b = store.insert_azienda(&azienda("Mozilla", "222")).await.unwrap().azienda.id;
        store.insert_software(&software("A", a, "10.00", false, 1)).await.unwrap();
        store.insert_software(&software("B", a, "10.01", false, 2)).await.unwrap();
        store.insert_software(&software("C", a, "0", true, 3)).await.unwrap();
        store.insert_software(&software("Firefox", b, "0", true, 4)).await.unwrap();

        let stats = store.catalog_stats(Some(a)).await.unwrap();
        assert_eq!(stats.totale, 3);
        assert_eq!(stats.gratuiti, 1);
        assert_eq!(stats.a_pagamento, 2);
        assert_eq!(stats.prezzo_medio, Some(Decimal::from_str("6.67").unwrap()));
        assert_eq!(stats.prezzo_max, Some(Decimal::from_str("10.01").unwrap()));
        assert_eq!(stats.prezzo_min, Some(Decimal::ZERO));

        let empty = store.catalog_stats(Some(999)).await.unwrap();
        assert_eq!(empty, CatalogStats::default());
        assert_eq!(store.catalog_stats(None).await.unwrap().totale, 4);
    }
}
