//! Brand and model codes used by the `ms` search parameter.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct Brand {
    pub name: &'static str,
    pub code: u32,
    pub models: &'static [Model],
}

#[derive(Debug)]
pub struct Model {
    pub name: &'static str,
    pub kind: ModelKind,
}

#[derive(Debug)]
pub enum ModelKind {
    Single(u32),
    /// A model group such as a BMW series, searchable as a whole or per variant
    Series {
        group: u32,
        variants: &'static [Variant],
    },
}

#[derive(Debug)]
pub struct Variant {
    pub name: &'static str,
    pub code: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelCode {
    Model(u32),
    Group(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MakeFilter {
    pub brand: u32,
    #[serde(default)]
    pub model: Option<ModelCode>,
}

impl fmt::Display for MakeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.model {
            None => write!(f, "{}", self.brand),
            Some(ModelCode::Model(code)) => write!(f, "{};{code}", self.brand),
            Some(ModelCode::Group(group)) => write!(f, "{};;{group}", self.brand),
        }
    }
}

impl Brand {
    /// Resolves a model name, then a series variant name, then a raw numeric code.
    pub fn model(&self, name: &str) -> Option<ModelCode> {
        let name = name.trim();
        if let Some(model) = self
            .models
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
        {
            return Some(match model.kind {
                ModelKind::Single(code) => ModelCode::Model(code),
                ModelKind::Series { group, .. } => ModelCode::Group(group),
            });
        }

        let variant = self.models.iter().find_map(|m| match m.kind {
            ModelKind::Series { variants, .. } => variants
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(name)),
            ModelKind::Single(_) => None,
        });
        if let Some(variant) = variant {
            return Some(ModelCode::Model(variant.code));
        }

        name.parse().ok().map(ModelCode::Model)
    }

    pub fn filter(&self, model: Option<&str>) -> anyhow::Result<MakeFilter> {
        let model = match model {
            Some(name) => Some(self.model(name).ok_or_else(|| {
                anyhow::anyhow!("Unknown model {name:?} for brand {}", self.name)
            })?),
            None => None,
        };
        Ok(MakeFilter {
            brand: self.code,
            model,
        })
    }
}

/// Case-insensitive brand lookup
pub fn find_brand(name: &str) -> Option<&'static Brand> {
    let name = name.trim();
    BRANDS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
}

/// Builds a make filter from a brand name (or raw brand code) and an optional model.
pub fn make_filter(brand: &str, model: Option<&str>) -> anyhow::Result<MakeFilter> {
    match find_brand(brand) {
        Some(brand) => brand.filter(model),
        None => {
            let code: u32 = brand
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown brand {brand:?}"))?;
            let model = match model {
                Some(m) => Some(ModelCode::Model(m.trim().parse().map_err(|_| {
                    anyhow::anyhow!("Model must be a numeric code for raw brand {code}")
                })?)),
                None => None,
            };
            Ok(MakeFilter { brand: code, model })
        }
    }
}

macro_rules! single {
    ($name:expr, $code:expr $(,)?) => {
        Model {
            name: $name,
            kind: ModelKind::Single($code),
        }
    };
}

macro_rules! series {
    ($name:expr, $group:expr, $variants:expr $(,)?) => {
        Model {
            name: $name,
            kind: ModelKind::Series {
                group: $group,
                variants: $variants,
            },
        }
    };
}

macro_rules! v {
    ($name:expr, $code:expr $(,)?) => {
        Variant {
            name: $name,
            code: $code,
        }
    };
}

macro_rules! brand {
    ($name:expr, $code:expr, $models:expr $(,)?) => {
        Brand {
            name: $name,
            code: $code,
            models: $models,
        }
    };
}

pub static BRANDS: &[Brand] = &[
    brand!(
        "audi",
        1900,
        &[
            single!("100", 2),
            single!("200", 3),
            single!("80", 5),
            single!("90", 6),
            single!("A1", 25),
            single!("A2", 7),
            single!("A3", 8),
            single!("A4", 9),
            single!("A4 Allroad", 33),
            single!("A5", 31),
            single!("A6", 10),
            single!("A6 Allroad", 12),
            single!("A7", 34),
            single!("A8", 11),
            single!("Q1", 43),
            single!("Q2", 45),
            single!("Q3", 37),
            single!("Q5", 32),
            single!("Q7", 15),
            single!("Q8", 46),
            single!("R8", 29),
            single!("RS2", 26),
            single!("RS3", 36),
            single!("RS4", 27),
            single!("RS5", 17),
            single!("RS6", 28),
            single!("RS7", 40),
            single!("RSQ3", 41),
            single!("RSQ8", 55),
            single!("S1", 42),
            single!("S2", 18),
            single!("S3", 19),
            single!("S4", 20),
            single!("S5", 30),
            single!("S6", 21),
            single!("S7", 38),
            single!("S8", 22),
            single!("SQ2", 47),
            single!("SQ5", 39),
            single!("SQ7", 44),
            single!("SQ8", 54),
            single!("TT", 23),
            single!("TT RS", 35),
            single!("TTS", 4),
            single!("V8", 24),
        ],
    ),
    brand!(
        "bmw",
        3500,
        &[
            series!(
                "Series 1",
                20,
                &[
                    v!("114", 73),
                    v!("116", 2),
                    v!("118", 3),
                    v!("120", 4),
                    v!("123", 59),
                    v!("125", 61),
                    v!("130", 5),
                    v!("135", 58),
                ],
            ),
            series!(
                "Series 2",
                55,
                &[
                    v!("214 Active Tourer", 110),
                    v!("214 Gran Tourer", 116),
                    v!("216", 106),
                    v!("216 Active Tourer", 111),
                    v!("216 Gran Tourer", 114),
                    v!("218", 90),
                    v!("218 Active Tourer", 107),
                    v!("218 Gran Tourer", 112),
                    v!("220", 84),
                    v!("220 Active Tourer", 108),
                    v!("220 Gran Tourer", 113),
                    v!("225", 91),
                    v!("225 Active Tourer", 109),
                    v!("228", 104),
                    v!("230", 125),
                ],
            ),
            series!(
                "Series 3",
                21,
                &[
                    v!("315", 7),
                    v!("316", 8),
                    v!("318", 9),
                    v!("318 Gran Turismo", 75),
                    v!("320", 10),
                    v!("320 Gran Turismo", 76),
                    v!("323", 11),
                    v!("324", 12),
                    v!("325", 13),
                    v!("325 Gran Turismo", 88),
                    v!("328", 14),
                    v!("328 Gran Turismo", 77),
                    v!("330", 15),
                    v!("330 Gran Turismo", 103),
                    v!("335", 56),
                    v!("335 Gran Turismo", 78),
                    v!("340", 118),
                    v!("340 Gran Turismo", 130),
                ],
            ),
            series!(
                "Series 4",
                53,
                &[
                    v!("418", 115),
                    v!("418 Gran Coupe", 98),
                    v!("420", 80),
                    v!("420 Gran Coupe", 99),
                    v!("425", 102),
                    v!("425 Gran Coupe", 124),
                    v!("428", 81),
                    v!("428 Gran Coupe", 100),
                    v!("430", 83),
                    v!("430 Gran Coupe", 105),
                    v!("435", 82),
                    v!("435 Gran Coupe", 101),
                    v!("440", 120),
                    v!("440 Gran Coupe", 121),
                ],
            ),
        ],
    ),
    brand!(
        "ford",
        9000,
        &[
            single!("B-Max", 54),
            single!("C-Max", 52),
            single!("EcoSport", 56),
            single!("Edge", 48),
            single!("Fiesta", 19),
            single!("Focus", 20),
            single!("Fusion", 22),
            single!("Galaxy", 23),
            single!("Ka/Ka+", 25),
            single!("Kuga", 49),
            single!("Mondeo", 29),
            single!("S-Max", 47),
        ],
    ),
    brand!(
        "mercedes-benz",
        17200,
        &[
            series!(
                "Class A",
                4,
                &[
                    v!("A140", 2),
                    v!("A150", 3),
                    v!("A160", 4),
                    v!("A170", 5),
                    v!("A180", 6),
                    v!("A190", 7),
                    v!("A200", 8),
                    v!("A210", 9),
                    v!("A220", 221),
                    v!("A250", 220),
                ],
            ),
            series!(
                "Class B",
                5,
                &[
                    v!("B150", 12),
                    v!("B160", 11),
                    v!("B170", 13),
                    v!("B180", 14),
                    v!("B200", 15),
                    v!("B220", 222),
                    v!("B250", 223),
                ],
            ),
            series!(
                "Class C",
                6,
                &[
                    v!("C160", 16),
                    v!("C180", 17),
                    v!("C200", 18),
                    v!("C220", 19),
                    v!("C230", 20),
                    v!("C240", 21),
                    v!("C250", 22),
                    v!("C270", 23),
                    v!("C280", 24),
                    v!("C300", 44),
                    v!("C30 AMG", 25),
                    v!("C320", 27),
                    v!("C32 AMG", 26),
                    v!("C350", 28),
                    v!("C36 AMG", 29),
                    v!("C400", 245),
                    v!("C43 AMG", 30),
                    v!("C450 AMG", 246),
                    v!("C55 AMG", 31),
                    v!("C63 AMG", 198),
                ],
            ),
        ],
    ),
    brand!(
        "opel",
        19000,
        &[
            single!("Adam", 38),
            single!("Agila", 2),
            single!("Astra", 5),
            single!("Combo", 8),
            single!("Corsa", 10),
            single!("Insignia", 35),
            single!("Karl", 41),
            single!("Meriva", 16),
            single!("Mokka", 37),
            single!("Mokka X", 44),
            single!("Signum", 24),
            single!("Vectra", 29),
            single!("Vivaro", 30),
            single!("Zafira", 31),
        ],
    ),
    brand!(
        "skoda",
        22900,
        &[
            single!("Citigo", 17),
            single!("Fabia", 6),
            single!("Kamiq", 24),
            single!("Karoq", 20),
            single!("Kodiaq", 19),
            single!("Octavia", 10),
            single!("Rapid", 18),
            single!("Roomster", 13),
            single!("Scala", 21),
            single!("Superb", 12),
            single!("Yeti", 15),
        ],
    ),
    brand!("toyota", 24100, &[single!("Auris", 39)]),
    brand!("volkswagen", 25200, &[]),
    brand!("alfa romeo", 900, &[]),
    brand!("chevrolet", 5600, &[]),
    brand!("citroen", 5900, &[]),
    brand!("dacia", 6600, &[]),
    brand!("fiat", 8800, &[]),
    brand!("honda", 11000, &[]),
    brand!("hyundai", 11600, &[]),
    brand!("kia", 13200, &[]),
    brand!("mazda", 16800, &[]),
    brand!("nissan", 18700, &[]),
    brand!("peugeot", 19300, &[]),
    brand!("renault", 20700, &[]),
    brand!("seat", 22500, &[]),
    brand!("suzuki", 23600, &[]),
    brand!("volvo", 25100, &[]),
];
