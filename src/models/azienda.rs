use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Azienda {
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
}

/// A company row together with how many software entries it owns.
#[derive(Debug, Clone, FromRow)]
pub struct AziendaRecord {
    #[sqlx(flatten)]
    pub azienda: Azienda,
    pub num_software: i64,
}

/// Validated column values for an insert or a full update.
#[derive(Debug, Clone, PartialEq)]
pub struct AziendaData {
    pub nome: String,
    pub partita_iva: String,
    pub sede: String,
    pub email: String,
    pub telefono: String,
    pub sito_web: String,
    pub descrizione: String,
    pub data_fondazione: Option<NaiveDate>,
}

impl From<&Azienda> for AziendaData {
    fn from(a: &Azienda) -> Self {
        Self {
            nome: a.nome.clone(),
            partita_iva: a.partita_iva.clone(),
            sede: a.sede.clone(),
            email: a.email.clone(),
            telefono: a.telefono.clone(),
            sito_web: a.sito_web.clone(),
            descrizione: a.descrizione.clone(),
            data_fondazione: a.data_fondazione,
        }
    }
}
