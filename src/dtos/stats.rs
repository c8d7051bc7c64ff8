use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::software::CatalogStats;

#[derive(Debug, Serialize, PartialEq)]
pub struct StatisticheResponse {
    pub totale: i64,
    pub gratuiti: i64,
    pub a_pagamento: i64,
    pub attivi: i64,
    pub prezzo_medio: Option<f64>,
    pub prezzo_max: Option<f64>,
    pub prezzo_min: Option<f64>,
}

fn as_float(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|d| d.to_f64())
}

impl From<CatalogStats> for StatisticheResponse {
    fn from(s: CatalogStats) -> Self {
        Self {
            totale: s.totale,
            gratuiti: s.gratuiti,
            a_pagamento: s.a_pagamento,
            attivi: s.attivi,
            prezzo_medio: as_float(s.prezzo_medio),
            prezzo_max: as_float(s.prezzo_max),
            prezzo_min: as_float(s.prezzo_min),
        }
    }
}

#[derive(Serialize)]
pub struct GlobalStatsResponse {
    pub aziende: i64,
    #[serde(flatten)]
    pub software: StatisticheResponse,
}

#[derive(Serialize)]
pub struct AziendaStatsResponse {
    pub azienda: String,
    #[serde(flatten)]
    pub software: StatisticheResponse,
}
