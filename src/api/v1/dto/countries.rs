use serde::{Deserialize, Serialize};

use crate::repos::country_repo::CountryRecord;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryResponse {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub flag_url: String,
}

impl From<CountryRecord> for CountryResponse {
    fn from(c: CountryRecord) -> Self {
        Self {
            id: c.id,
            name: c.name,
            code: c.code,
            flag_url: c.flag_url,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CountryIdsRequest {
    pub country_ids: Vec<i64>,
}
