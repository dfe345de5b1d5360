//! Conversion from DGEG DTOs to domain types.
//!
//! `parse_station` is all-or-nothing: either every required field parses
//! and a complete `Station` comes back, or the whole payload is rejected.

use tracing::debug;

use crate::domain::{
    Address, Coordinates, FuelQuote, MalformedDataError, Station, StationId, StationSummary,
    parse_price, parse_timestamp,
};

use super::types::{
    AddressDto, FuelDto, NumberOrText, StationDetailsDto, StationDetailsResponse,
    StationListItemDto, StationListResponse,
};

/// Parse a raw `GetDadosPostoMapa` body into a station.
pub fn parse_station(id: &StationId, raw: &str) -> Result<Station, MalformedDataError> {
    let response: StationDetailsResponse = serde_json::from_str(raw)
        .map_err(|e| MalformedDataError::InvalidJson(e.to_string()))?;

    let details = response
        .resultado
        .ok_or(MalformedDataError::MissingField("resultado"))?;

    convert_station(id, details)
}

/// Convert a station detail record to a domain station.
pub fn convert_station(
    id: &StationId,
    dto: StationDetailsDto,
) -> Result<Station, MalformedDataError> {
    let name = dto.nome.ok_or(MalformedDataError::MissingField("Nome"))?;
    let brand = dto.marca.ok_or(MalformedDataError::MissingField("Marca"))?;
    let station_type = dto
        .tipo_posto
        .ok_or(MalformedDataError::MissingField("TipoPosto"))?;
    let fuels = dto
        .combustiveis
        .ok_or(MalformedDataError::MissingField("Combustiveis"))?;

    // Coordinates are required, so a null address block is fatal too
    let morada = dto
        .morada
        .ok_or(MalformedDataError::MissingField("Morada"))?;
    let coordinates = Coordinates {
        latitude: parse_coordinate("Morada.Latitude", morada.latitude.as_ref())?,
        longitude: parse_coordinate("Morada.Longitude", morada.longitude.as_ref())?,
    };

    let fuels = fuels
        .into_iter()
        .map(convert_fuel)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Station {
        id: id.clone(),
        name,
        brand,
        station_type,
        address: convert_address(morada),
        coordinates,
        fuels,
    })
}

/// Parse a raw `PesquisarPostos` body into station summaries.
///
/// Records without a usable id are skipped. The result is in upstream order.
pub fn parse_station_list(raw: &str) -> Result<Vec<StationSummary>, MalformedDataError> {
    let response: StationListResponse = serde_json::from_str(raw)
        .map_err(|e| MalformedDataError::InvalidJson(e.to_string()))?;

    let records = response
        .resultado
        .ok_or(MalformedDataError::MissingField("resultado"))?;

    let mut stations = Vec::with_capacity(records.len());

    for record in records {
        match serde_json::from_value::<StationListItemDto>(record) {
            Ok(item) => match StationId::parse(&item.id.to_text()) {
                Ok(id) => stations.push(StationSummary {
                    id,
                    name: item.nome,
                    brand: item.marca,
                    locality: item.localidade,
                }),
                Err(e) => debug!(error = %e, "skipping station list record"),
            },
            Err(e) => debug!(error = %e, "skipping station list record"),
        }
    }

    Ok(stations)
}

fn convert_fuel(dto: FuelDto) -> Result<FuelQuote, MalformedDataError> {
    let fuel_type = dto
        .tipo_combustivel
        .ok_or(MalformedDataError::MissingField("Combustiveis.TipoCombustivel"))?;
    let price = dto
        .preco
        .ok_or(MalformedDataError::MissingField("Combustiveis.Preco"))?;
    let updated = dto
        .data_atualizacao
        .ok_or(MalformedDataError::MissingField("Combustiveis.DataAtualizacao"))?;

    Ok(FuelQuote {
        fuel_type,
        price: parse_price(&price)?,
        last_updated_at: parse_timestamp(&updated)?,
    })
}

/// Build an address, or `None` when upstream has no address parts at all.
fn convert_address(dto: AddressDto) -> Option<Address> {
    let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

    let address = Address {
        street: non_empty(dto.morada),
        locality: non_empty(dto.localidade),
        postal_code: non_empty(dto.cod_postal),
    };

    if address.street.is_none() && address.locality.is_none() && address.postal_code.is_none() {
        None
    } else {
        Some(address)
    }
}

fn parse_coordinate(
    field: &'static str,
    value: Option<&NumberOrText>,
) -> Result<f64, MalformedDataError> {
    let value = value.ok_or(MalformedDataError::MissingField(field))?;
    let invalid = || MalformedDataError::InvalidCoordinate {
        field,
        value: value.to_text(),
    };

    let parsed = match value {
        NumberOrText::Number(n) => n.as_f64().ok_or_else(invalid)?,
        NumberOrText::Text(s) => s.trim().parse::<f64>().map_err(|_| invalid())?,
    };

    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(invalid())
    }
}
