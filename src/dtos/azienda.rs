use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;
use crate::models::azienda::{AziendaData, AziendaRecord};
use crate::validation::Validator;

/// Write payload for create, full update and partial update.
#[derive(Debug, Default, Deserialize)]
pub struct AziendaPayload {
    pub nome: Option<String>,
    pub partita_iva: Option<String>,
    pub sede: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub sito_web: Option<String>,
    pub descrizione: Option<String>,
    /// Absent keeps the stored date on PATCH; `null` or `""` clears it.
    #[serde(default, deserialize_with = "nullable")]
    pub data_fondazione: Option<Option<String>>,
}

/// Keeps an explicit `null` apart from a missing key: `Some(None)` vs `None`.
fn nullable<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

impl AziendaPayload {
    /// Validates the payload. With `base` (partial update) absent fields keep the stored value.
    pub fn into_data(self, base: Option<&AziendaData>) -> Result<AziendaData, AppError> {
        let mut v = Validator::new();

        let nome = v.text("nome", self.nome, base.map(|b| &b.nome), 200);
        let partita_iva = v.text("partita_iva", self.partita_iva, base.map(|b| &b.partita_iva), 20);
        let sede = v.text("sede", self.sede, base.map(|b| &b.sede), 200);
        let email = v.text("email", self.email, base.map(|b| &b.email), 254);
        v.email("email", &email);
        let telefono = v.optional_text("telefono", self.telefono, base.map(|b| &b.telefono), Some(20));
        let sito_web = v.optional_text("sito_web", self.sito_web, base.map(|b| &b.sito_web), Some(200));
        v.url("sito_web", &sito_web);
        let descrizione = v.optional_text("descrizione", self.descrizione, base.map(|b| &b.descrizione), None);

        let data_fondazione = match self.data_fondazione {
            Some(Some(raw)) if raw.trim().is_empty() => None,
            Some(Some(raw)) => v.date("data_fondazione", &raw),
            Some(None) => None,
            None => base.and_then(|b| b.data_fondazione),
        };

        v.finish()?;
        Ok(AziendaData {
            nome,
            partita_iva,
            sede,
            email,
            telefono,
            sito_web,
            descrizione,
            data_fondazione,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AziendaResponse {
    pub id: i64,
    pub nome: String,
    pub partita_iva: String,
    pub sede: String,
    pub email: String,
    pub telefono: String,
    pub sito_web: String,
    pub descrizione: String,
    pub data_fondazione: Option<NaiveDate>,
    pub creata_il: DateTime<Utc>,
    pub modificata_il: DateTime<Utc>,
    pub num_software: i64,
}

impl From<AziendaRecord> for AziendaResponse {
    fn from(rec: AziendaRecord) -> Self {
        let a = rec.azienda;
        Self {
            id: a.id,
            nome: a.nome,
            partita_iva: a.partita_iva,
            sede: a.sede,
            email: a.email,
            telefono: a.telefono,
            sito_web: a.sito_web,
            descrizione: a.descrizione,
            data_fondazione: a.data_fondazione,
            creata_il: a.creata_il,
            modificata_il: a.modificata_il,
            num_software: rec.num_software,
        }
    }
}

/// Company summary nested inside software representations.
#[derive(Debug, Serialize)]
pub struct AziendaMinimal {
    pub id: i64,
    pub nome: String,
    pub sede: String,
    pub email: String,
}

impl From<&AziendaRecord> for AziendaMinimal {
    fn from(rec: &AziendaRecord) -> Self {
        Self {
            id: rec.azienda.id,
            nome: rec.azienda.nome.clone(),
            sede: rec.azienda.sede.clone(),
            email: rec.azienda.email.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub messaggio: String,
}
