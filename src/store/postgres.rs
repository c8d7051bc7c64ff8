use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{error, instrument};

use super::{
    duplicate_azienda_nome, duplicate_partita_iva, duplicate_software_release, duplicate_username,
    unknown_azienda, CatalogStore, SoftwareFilter,
};
use crate::error::AppError;
use crate::models::azienda::{AziendaData, AziendaRecord};
use crate::models::software::{CatalogStats, SoftwareData, SoftwareRecord};
use crate::models::user::{NewUser, User};

const AZIENDA_COLUMNS: &str = "a.id, a.nome, a.partita_iva, a.sede, a.email, a.telefono, a.sito_web, \
     a.descrizione, a.data_fondazione, a.creata_il, a.modificata_il, \
     (SELECT COUNT(*) FROM software s WHERE s.azienda_id = a.id) AS num_software";

const SOFTWARE_COLUMNS: &str = "s.id, s.nome, s.versione, s.descrizione, s.azienda_id, s.prezzo, \
     s.gratuito, s.attivo, s.data_rilascio, s.creato_il, s.modificato_il, \
     a.nome AS azienda_nome, a.sede AS azienda_sede, a.email AS azienda_email";

const USER_COLUMNS: &str =
    "id, username, password_hash, is_active, is_staff, is_superuser, permissions, date_joined";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translates constraint violations into the field errors clients see.
fn map_write_error(err: sqlx::Error, azienda_id: Option<i64>) -> AppError {
    if let Some(db) = err.as_database_error() {
        match db.code().as_deref() {
            Some("23505") => {
                return match db.constraint() {
                    Some("aziende_nome_key") => duplicate_azienda_nome(),
                    Some("aziende_partita_iva_key") => duplicate_partita_iva(),
                    Some("software_nome_versione_azienda_key") => duplicate_software_release(),
                    Some("users_username_key") => duplicate_username(),
                    _ => AppError::validation("Duplicate value"),
                };
            }
            Some("23503") => {
                if let Some(id) = azienda_id {
                    return unknown_azienda(id);
                }
            }
            _ => {}
        }
    }
    error!(error = %err, "Write failed");
    AppError::db(err)
}

fn like_pattern(q: &str) -> String {
    let escaped = q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl CatalogStore for PgStore {
    #[instrument(skip(self))]
    async fn list_aziende(&self) -> Result<Vec<AziendaRecord>, AppError> {
        let sql = format!("SELECT {AZIENDA_COLUMNS} FROM aziende a ORDER BY a.nome");
        let rows = sqlx::query_as::<_, AziendaRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_azienda(&self, id: i64) -> Result<Option<AziendaRecord>, AppError> {
        let sql = format!("SELECT {AZIENDA_COLUMNS} FROM aziende a WHERE a.id = $1");
        let row = sqlx::query_as::<_, AziendaRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    #[instrument(skip(self, data), fields(nome = %data.nome))]
    async fn insert_azienda(&self, data: &AziendaData) -> Result<AziendaRecord, AppError> {
        let sql = format!(
            "INSERT INTO aziende AS a
                (nome, partita_iva, sede, email, telefono, sito_web, descrizione, data_fondazione)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {AZIENDA_COLUMNS}"
        );
        sqlx::query_as::<_, AziendaRecord>(&sql)
            .bind(&data.nome)
            .bind(&data.partita_iva)
            .bind(&data.sede)
            .bind(&data.email)
            .bind(&data.telefono)
            .bind(&data.sito_web)
            .bind(&data.descrizione)
            .bind(data.data_fondazione)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, None))
    }

    #[instrument(skip(self, data))]
    async fn update_azienda(&self, id: i64, data: &AziendaData) -> Result<Option<AziendaRecord>, AppError> {
        let sql = format!(
            "UPDATE aziende AS a SET
                nome = $2, partita_iva = $3, sede = $4, email = $5, telefono = $6,
                sito_web = $7, descrizione = $8, data_fondazione = $9, modificata_il = NOW()
             WHERE a.id = $1
             RETURNING {AZIENDA_COLUMNS}"
        );
        sqlx::query_as::<_, AziendaRecord>(&sql)
            .bind(id)
            .bind(&data.nome)
            .bind(&data.partita_iva)
            .bind(&data.sede)
            .bind(&data.email)
            .bind(&data.telefono)
            .bind(&data.sito_web)
            .bind(&data.descrizione)
            .bind(data.data_fondazione)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, None))
    }

    #[instrument(skip(self))]
    async fn delete_azienda(&self, id: i64) -> Result<bool, AppError> {
        // software rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM aziende WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_aziende(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM aziende")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn list_software(&self, filter: &SoftwareFilter) -> Result<Vec<SoftwareRecord>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {SOFTWARE_COLUMNS} FROM software s JOIN aziende a ON a.id = s.azienda_id WHERE TRUE"
        ));

        if let Some(id) = filter.azienda_id {
            qb.push(" AND s.azienda_id = ").push_bind(id);
        }
        if let Some(gratuito) = filter.gratuito {
            qb.push(" AND s.gratuito = ").push_bind(gratuito);
        }
        if let Some(attivo) = filter.attivo {
            qb.push(" AND s.attivo = ").push_bind(attivo);
        }
        if let Some(produttore) = &filter.produttore {
            qb.push(" AND LOWER(a.nome) = LOWER(").push_bind(produttore.clone()).push(")");
        }
        if let Some(q) = &filter.search {
            let pattern = like_pattern(q);
            qb.push(" AND (s.nome ILIKE ").push_bind(pattern.clone());
            qb.push(" OR s.versione ILIKE ").push_bind(pattern.clone());
            qb.push(" OR s.descrizione ILIKE ").push_bind(pattern.clone());
            qb.push(" OR a.nome ILIKE ").push_bind(pattern).push(")");
        }
        if let Some(min) = filter.prezzo_min {
            qb.push(" AND s.prezzo >= ").push_bind(min);
        }
        if let Some(max) = filter.prezzo_max {
            qb.push(" AND s.prezzo <= ").push_bind(max);
        }
        qb.push(" ORDER BY s.data_rilascio DESC, s.id");

        let rows = qb
            .build_query_as::<SoftwareRecord>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_software(&self, id: i64) -> Result<Option<SoftwareRecord>, AppError> {
        let sql = format!(
            "SELECT {SOFTWARE_COLUMNS} FROM software s JOIN aziende a ON a.id = s.azienda_id WHERE s.id = $1"
        );
        let row = sqlx::query_as::<_, SoftwareRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    #[instrument(skip(self, data), fields(nome = %data.nome, versione = %data.versione))]
    async fn insert_software(&self, data: &SoftwareData) -> Result<SoftwareRecord, AppError> {
        let sql = format!(
            "WITH s AS (
                INSERT INTO software
                    (nome, versione, descrizione, azienda_id, prezzo, gratuito, attivo, data_rilascio)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
             )
             SELECT {SOFTWARE_COLUMNS} FROM s JOIN aziende a ON a.id = s.azienda_id"
        );
        sqlx::query_as::<_, SoftwareRecord>(&sql)
            .bind(&data.nome)
            .bind(&data.versione)
            .bind(&data.descrizione)
            .bind(data.azienda_id)
            .bind(data.prezzo)
            .bind(data.gratuito)
            .bind(data.attivo)
            .bind(data.data_rilascio)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, Some(data.azienda_id)))
    }

    #[instrument(skip(self, data))]
    async fn update_software(&self, id: i64, data: &SoftwareData) -> Result<Option<SoftwareRecord>, AppError> {
        let sql = format!(
            "WITH s AS (
                UPDATE software SET
                    nome = $2, versione = $3, descrizione = $4, azienda_id = $5, prezzo = $6,
                    gratuito = $7, attivo = $8, data_rilascio = $9, modificato_il = NOW()
                WHERE id = $1
                RETURNING *
             )
             SELECT {SOFTWARE_COLUMNS} FROM s JOIN aziende a ON a.id = s.azienda_id"
        );
        sqlx::query_as::<_, SoftwareRecord>(&sql)
            .bind(id)
            .bind(&data.nome)
            .bind(&data.versione)
            .bind(&data.descrizione)
            .bind(data.azienda_id)
            .bind(data.prezzo)
            .bind(data.gratuito)
            .bind(data.attivo)
            .bind(data.data_rilascio)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, Some(data.azienda_id)))
    }

    #[instrument(skip(self))]
    async fn delete_software(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM software WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn catalog_stats(&self, azienda_id: Option<i64>) -> Result<CatalogStats, AppError> {
        let stats = sqlx::query_as::<_, CatalogStats>(
            "SELECT COUNT(*) AS totale,
                    COUNT(*) FILTER (WHERE gratuito) AS gratuiti,
                    COUNT(*) FILTER (WHERE NOT gratuito) AS a_pagamento,
                    COUNT(*) FILTER (WHERE attivo) AS attivi,
                    ROUND(AVG(prezzo), 2) AS prezzo_medio,
                    MAX(prezzo) AS prezzo_max,
                    MIN(prezzo) AS prezzo_min
             FROM software
             WHERE ($1::BIGINT IS NULL OR azienda_id = $1)",
        )
        .bind(azienda_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert_user(&self, user: &NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, password_hash, is_staff, is_superuser, permissions)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.is_staff)
            .bind(user.is_superuser)
            .bind(user.permissions.clone())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, None))
    }

    async fn set_user_active(&self, id: i64, active: bool) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
