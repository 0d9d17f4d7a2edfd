use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One product card on a catalog listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SneakerCard {
    #[validate(length(min = 1, max = 128))]
    pub brand: String,
    #[validate(length(max = 128))]
    pub model: String,
    /// Displayed price text, e.g. `"419.59 р."`.
    pub price: Option<String>,
}

/// A card's link to its product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SneakerLink {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(length(min = 1))]
    pub href: String,
}

/// A product page. `attributes` holds every title/value row as rendered;
/// the named fields are the rows the catalog is known to carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct SneakerDetail {
    #[validate(length(max = 128))]
    pub brand: Option<String>,
    #[validate(length(max = 128))]
    pub model: Option<String>,
    pub price: Option<String>,
    pub article: Option<String>,
    pub kind_of_sport: Option<String>,
    pub internal_material: Option<String>,
    pub outer_material: Option<String>,
    pub sole_material: Option<String>,
    pub insole_material: Option<String>,
    pub season: Option<String>,
    pub country_of_production: Option<String>,
    pub color: Option<String>,
    pub clasp: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl SneakerDetail {
    /// True when the page yielded nothing worth keeping.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.brand.is_none() && self.model.is_none()
    }

    /// Fill the typed fields from the raw attribute rows.
    pub(crate) fn from_attributes(attributes: BTreeMap<String, String>) -> Self {
        let get = |title: &str| attributes.get(title).cloned();
        Self {
            article: get("Артикул"),
            kind_of_sport: get("Вид спорта"),
            internal_material: get("Внутренний материал"),
            outer_material: get("Внешний материал").or_else(|| get("Материал верха")),
            sole_material: get("Материал подошвы"),
            insole_material: get("Материал стельки"),
            season: get("Сезон"),
            country_of_production: get("Страна производства"),
            color: get("Цвет"),
            clasp: get("Застёжка").or_else(|| get("Застежка")),
            attributes,
            ..Default::default()
        }
    }
}
