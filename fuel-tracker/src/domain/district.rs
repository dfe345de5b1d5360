//! Mainland Portuguese districts, as numbered by DGEG.

/// A district used to scope station searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct District {
    pub id: u8,
    pub name: &'static str,
}

impl District {
    const fn new(id: u8, name: &'static str) -> Self {
        Self { id, name }
    }

    /// Look up a district by its DGEG id.
    pub fn by_id(id: u8) -> Option<District> {
        DISTRICTS.iter().copied().find(|d| d.id == id)
    }
}

/// All 18 mainland districts.
pub const DISTRICTS: [District; 18] = [
    District::new(1, "Aveiro"),
    District::new(2, "Beja"),
    District::new(3, "Braga"),
    District::new(4, "Bragança"),
    District::new(5, "Castelo Branco"),
    District::new(6, "Coimbra"),
    District::new(7, "Évora"),
    District::new(8, "Faro"),
    District::new(9, "Guarda"),
    District::new(10, "Leiria"),
    District::new(11, "Lisboa"),
    District::new(12, "Portalegre"),
    District::new(13, "Porto"),
    District::new(14, "Santarém"),
    District::new(15, "Setúbal"),
    District::new(16, "Viana do Castelo"),
    District::new(17, "Vila Real"),
    District::new(18, "Viseu"),
];
