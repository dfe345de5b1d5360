//! DGEG API response DTOs.
//!
//! These types map directly to the JSON returned by the DGEG price API.
//! Every field is optional here; required fields are enforced when
//! converting to domain types, so a missing field produces a precise
//! error instead of a generic deserialization failure.

use serde::Deserialize;

/// Response from `GetDadosPostoMapa`.
#[derive(Debug, Clone, Deserialize)]
pub struct StationDetailsResponse {
    pub resultado: Option<StationDetailsDto>,
}

/// Station detail record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StationDetailsDto {
    /// Station name.
    pub nome: Option<String>,

    /// Brand, or "Genérico" for unbranded stations.
    pub marca: Option<String>,

    /// Kind of station (e.g. "Posto de abastecimento").
    pub tipo_posto: Option<String>,

    /// Address and position. Upstream sends `null` when unknown.
    pub morada: Option<AddressDto>,

    /// Fuel prices, in upstream order.
    pub combustiveis: Option<Vec<FuelDto>>,
}

/// Address block of a station detail record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressDto {
    /// Street address.
    pub morada: Option<String>,
    pub localidade: Option<String>,
    pub cod_postal: Option<String>,
    pub latitude: Option<NumberOrText>,
    pub longitude: Option<NumberOrText>,
}

/// One fuel entry of a station detail record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FuelDto {
    pub tipo_combustivel: Option<String>,

    /// Price as `"1,699 €/litro"`.
    pub preco: Option<String>,

    /// Last update as `"YYYY-MM-DD HH:MM"`.
    pub data_atualizacao: Option<String>,
}

/// Response from `PesquisarPostos`.
///
/// Records are kept as raw JSON so one bad record can be skipped without
/// losing the rest of the listing.
#[derive(Debug, Clone, Deserialize)]
pub struct StationListResponse {
    pub resultado: Option<Vec<serde_json::Value>>,
}

/// One search result. The search returns a record per station and fuel.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StationListItemDto {
    pub id: NumberOrText,
    pub nome: Option<String>,
    pub marca: Option<String>,
    pub localidade: Option<String>,
}

/// A JSON value DGEG sends either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrText {
    /// Textual form, as upstream would print it.
    pub fn to_text(&self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s.clone(),
        }
    }
}
