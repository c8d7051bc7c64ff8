use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dtos::azienda::AziendaMinimal;
use crate::error::AppError;
use crate::models::software::{SoftwareData, SoftwareRecord};
use crate::validation::Validator;

#[derive(Debug, Default, Deserialize)]
pub struct SoftwarePayload {
    pub nome: Option<String>,
    pub versione: Option<String>,
    pub descrizione: Option<String>,
    /// Id of the owning company.
    pub azienda: Option<i64>,
    /// String or number, e.g. `"239.88"` or `239.88`.
    pub prezzo: Option<Value>,
    pub gratuito: Option<bool>,
    pub attivo: Option<bool>,
    pub data_rilascio: Option<String>,
}

impl SoftwarePayload {
    /// Validates fields and the free/price rule. With `base` absent fields keep the stored value.
    pub fn into_data(self, base: Option<&SoftwareData>) -> Result<SoftwareData, AppError> {
        let mut v = Validator::new();

        let nome = v.text("nome", self.nome, base.map(|b| &b.nome), 100);
        let versione = v.text("versione", self.versione, base.map(|b| &b.versione), 20);
        let descrizione = v.optional_text("descrizione", self.descrizione, base.map(|b| &b.descrizione), None);
        let azienda_id = v.present("azienda", self.azienda, base.map(|b| b.azienda_id));

        let prezzo = match self.prezzo {
            Some(raw) => v.price("prezzo", &raw),
            None => v.present("prezzo", None, base.map(|b| b.prezzo)),
        };
        let gratuito = self.gratuito.or(base.map(|b| b.gratuito)).unwrap_or(false);
        let attivo = self.attivo.or(base.map(|b| b.attivo)).unwrap_or(true);

        let data_rilascio = match self.data_rilascio {
            Some(raw) => v.date("data_rilascio", &raw),
            None => v.present("data_rilascio", None, base.map(|b| b.data_rilascio)),
        };

        if let Some(prezzo) = prezzo {
            if gratuito && !prezzo.is_zero() {
                v.error("non_field_errors", "Free software must have a price of 0.");
            }
            if !gratuito && prezzo.is_zero() {
                v.error("non_field_errors", "Paid software must have a price greater than 0.");
            }
        }

        v.finish()?;
        match (azienda_id, prezzo, data_rilascio) {
            (Some(azienda_id), Some(prezzo), Some(data_rilascio)) => Ok(SoftwareData {
                nome,
                versione,
                descrizione,
                azienda_id,
                prezzo,
                gratuito,
                attivo,
                data_rilascio,
            }),
            _ => Err(AppError::internal("validated software payload is incomplete")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SoftwareResponse {
    pub id: i64,
    pub nome: String,
    pub versione: String,
    pub descrizione: String,
    pub azienda_dettagli: AziendaMinimal,
    pub prezzo: Decimal,
    pub prezzo_formattato: String,
    pub gratuito: bool,
    pub attivo: bool,
    pub data_rilascio: NaiveDate,
    pub creato_il: DateTime<Utc>,
    pub modificato_il: DateTime<Utc>,
}

impl From<SoftwareRecord> for SoftwareResponse {
    fn from(rec: SoftwareRecord) -> Self {
        let prezzo_formattato = rec.software.prezzo_formattato();
        let s = rec.software;
        Self {
            id: s.id,
            nome: s.nome,
            versione: s.versione,
            descrizione: s.descrizione,
            azienda_dettagli: AziendaMinimal {
                id: s.azienda_id,
                nome: rec.azienda_nome,
                sede: rec.azienda_sede,
                email: rec.azienda_email,
            },
            prezzo: s.prezzo,
            prezzo_formattato,
            gratuito: s.gratuito,
            attivo: s.attivo,
            data_rilascio: s.data_rilascio,
            creato_il: s.creato_il,
            modificato_il: s.modificato_il,
        }
    }
}

pub fn to_responses(rows: Vec<SoftwareRecord>) -> Vec<SoftwareResponse> {
    rows.into_iter().map(SoftwareResponse::from).collect()
}

#[derive(Serialize)]
pub struct SoftwareListResponse {
    pub count: usize,
    pub software: Vec<SoftwareResponse>,
}

impl From<Vec<SoftwareRecord>> for SoftwareListResponse {
    fn from(rows: Vec<SoftwareRecord>) -> Self {
        Self { count: rows.len(), software: to_responses(rows) }
    }
}

#[derive(Serialize)]
pub struct AziendaSoftwareResponse {
    pub azienda: AziendaMinimal,
    pub count: usize,
    pub software: Vec<SoftwareResponse>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub software: Vec<SoftwareResponse>,
}

#[derive(Serialize)]
pub struct PriceRangeResponse {
    pub prezzo_min: Option<Decimal>,
    pub prezzo_max: Option<Decimal>,
    pub count: usize,
    pub software: Vec<SoftwareResponse>,
}

#[derive(Serialize)]
pub struct ProducerResponse {
    pub produttore: String,
    pub count: usize,
    pub software: Vec<SoftwareResponse>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Bounds arrive as raw strings so bad numbers become a field error instead of a rejection.
#[derive(Debug, Deserialize)]
pub struct PriceRangeQuery {
    pub prezzo_min: Option<String>,
    pub prezzo_max: Option<String>,
}

/// Query string accepted by the software ViewSet list.
#[derive(Debug, Default, Deserialize)]
pub struct SoftwareListQuery {
    pub gratuito: Option<bool>,
    pub attivo: Option<bool>,
    pub azienda: Option<i64>,
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(prezzo: Value, gratuito: bool) -> SoftwarePayload {
        SoftwarePayload {
            nome: Some("Photoshop".into()),
            versione: Some("25.0".into()),
            azienda: Some(1),
            prezzo: Some(prezzo),
            gratuito: Some(gratuito),
            data_rilascio: Some("2024-10-01".into()),
            ..Default::default()
        }
    }

    #[test]
    fn valid_paid_software() {
        let data = payload(json!("239.88"), false).into_data(None).unwrap();
        assert_eq!(data.prezzo.to_string(), "239.88");
        assert!(data.attivo);
        assert_eq!(data.descrizione, "");
    }

    #[test]
    fn free_software_must_cost_nothing() {
        let err = payload(json!("9.99"), true).into_data(None).unwrap_err().to_string();
        assert!(err.contains("non_field_errors: Free software must have a price of 0."), "{err}");
        assert!(payload(json!(0), true).into_data(None).is_ok());
    }

    #[test]
    fn paid_software_needs_a_price() {
        let err = payload(json!("0.00"), false).into_data(None).unwrap_err().to_string();
        assert!(err.contains("Paid software must have a price greater than 0."), "{err}");
    }

    #[test]
    fn patch_rechecks_the_price_rule_against_stored_values() {
        let stored = payload(json!("239.88"), false).into_data(None).unwrap();
        let flip = SoftwarePayload { gratuito: Some(true), ..Default::default() };
        assert!(flip.into_data(Some(&stored)).is_err());

        let both = SoftwarePayload { gratuito: Some(true), prezzo: Some(json!(0)), ..Default::default() };
        let merged = both.into_data(Some(&stored)).unwrap();
        assert!(merged.gratuito);
        assert_eq!(merged.nome, "Photoshop");
    }

    #[test]
    fn missing_fields_on_create() {
        let err = SoftwarePayload::default().into_data(None).unwrap_err().to_string();
        for field in ["nome", "versione", "azienda", "prezzo", "data_rilascio"] {
            assert!(err.contains(&format!("{field}: This field is required.")), "{err}");
        }
    }
}
