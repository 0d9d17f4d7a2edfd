//! HTML extraction for catalog and product pages.
//!
//! Selectors track the site's current markup. When it changes these return
//! empty results rather than errors; callers decide what empty means.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::types::{SneakerCard, SneakerDetail, SneakerLink};

/// Product-kind word the catalog prefixes to every model name.
const PRODUCT_KIND: &str = "Кроссовки";

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid static selector {css}: {e}"))
}

static CARD_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector("div.x-product-card-description"));
static CARD: LazyLock<Selector> = LazyLock::new(|| selector("div.x-product-card__card"));
static BRAND_NAME: LazyLock<Selector> =
    LazyLock::new(|| selector("div.x-product-card-description__brand-name"));
static PRODUCT_NAME: LazyLock<Selector> =
    LazyLock::new(|| selector("div.x-product-card-description__product-name"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static CARD_LINK: LazyLock<Selector> =
    LazyLock::new(|| selector("a.x-product-card__link.x-product-card__hit-area"));
static ATTRIBUTE_TITLE: LazyLock<Selector> =
    LazyLock::new(|| selector("span.x-premium-product-description-attribute__title"));
static ATTRIBUTE_VALUE: LazyLock<Selector> =
    LazyLock::new(|| selector("span.x-premium-product-description-attribute__value"));
static MAIN: LazyLock<Selector> = LazyLock::new(|| selector("main.width-wrapper"));
static TITLE_BRAND: LazyLock<Selector> =
    LazyLock::new(|| selector("span.x-premium-product-title__brand-name"));
static TITLE_MODEL: LazyLock<Selector> =
    LazyLock::new(|| selector("div.x-premium-product-title__model-name"));
static TITLE_PRICE: LazyLock<Selector> =
    LazyLock::new(|| selector("span.x-premium-product-prices__price"));

fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(element: &ElementRef, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|el| text_of(&el))
        .filter(|s| !s.is_empty())
}

/// Strip the product-kind word from a model name.
pub fn clean_model(raw: &str) -> String {
    raw.replace(PRODUCT_KIND, "").trim().to_string()
}

/// Attribute rows are padded with dot leaders (`"Сезон . . ."`).
fn clean_attribute(raw: &str) -> String {
    raw.trim().replace(" .", "").trim().to_string()
}

/// Product cards on a listing page, in page order.
pub fn parse_sneaker_cards(html: &str) -> Vec<SneakerCard> {
    let document = Html::parse_document(html);

    document
        .select(&CARD_DESCRIPTION)
        .filter_map(|item| {
            let brand = first_text(&item, &BRAND_NAME)?;
            let model = first_text(&item, &PRODUCT_NAME)?;
            Some(SneakerCard {
                brand,
                model: clean_model(&model),
                price: first_text(&item, &PRICE),
            })
        })
        .collect()
}

/// Product page links on a listing page, in page order.
pub fn parse_sneaker_links(html: &str) -> Vec<SneakerLink> {
    let document = Html::parse_document(html);

    document
        .select(&CARD)
        .filter_map(|item| {
            let brand = first_text(&item, &BRAND_NAME)?;
            let model = first_text(&item, &PRODUCT_NAME)?;
            let href = item
                .select(&CARD_LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())?;
            Some(SneakerLink {
                name: format!("{brand}{}", model.replace(PRODUCT_KIND, "")),
                href,
            })
        })
        .collect()
}

/// A product page: attribute rows plus the title block.
pub fn parse_sneaker_detail(html: &str) -> SneakerDetail {
    let document = Html::parse_document(html);

    let titles = document
        .select(&ATTRIBUTE_TITLE)
        .map(|el| clean_attribute(&text_of(&el)));
    let values = document
        .select(&ATTRIBUTE_VALUE)
        .map(|el| clean_attribute(&text_of(&el)));
    let attributes: BTreeMap<String, String> = titles
        .zip(values)
        .filter(|(title, _)| !title.is_empty())
        .collect();

    let mut detail = SneakerDetail::from_attributes(attributes);

    // Later blocks win, matching the page's own render order.
    for main in document.select(&MAIN) {
        if let Some(brand) = first_text(&main, &TITLE_BRAND) {
            detail.brand = Some(brand);
        }
        if let Some(model) = first_text(&main, &TITLE_MODEL) {
            detail.model = Some(clean_model(&model));
        }
        if let Some(price) = first_text(&main, &TITLE_PRICE) {
            detail.price = Some(price);
        }
    }

    detail
}
