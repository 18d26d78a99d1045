//! Field extraction: listing-page markup → [`CandidateRecord`]s.
//!
//! Extraction is pure and per-card isolated. A card that cannot be read is
//! reported as an [`ExtractionError`] and skipped; its siblings are still
//! extracted. Missing or unparseable fields become `None`.

use std::collections::BTreeSet;

use supplydb_core::{CandidateRecord, ResaleStatus};

use crate::document::{Element, TagSelector};
use crate::error::ExtractionError;
use crate::parse::{
    category_from_url, parse_count, parse_price, parse_response_rate, parse_small_count,
};

/// Where each field lives inside a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardSelectors {
    /// The repeating container, one per supplier/product.
    pub card: TagSelector,
    pub name: TagSelector,
    pub price: TagSelector,
    pub minimum_order_quantity: TagSelector,
    pub certifications: TagSelector,
    pub certification_item: TagSelector,
    pub years_in_business: TagSelector,
    pub review_count: TagSelector,
    pub response_rate: TagSelector,
    pub contact: TagSelector,
    pub address: TagSelector,
    pub resale_policy: TagSelector,
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            card: TagSelector::parse("div.product-card"),
            name: TagSelector::parse("h2"),
            price: TagSelector::parse("span.price"),
            minimum_order_quantity: TagSelector::parse("span.moq"),
            certifications: TagSelector::parse("ul.certifications"),
            certification_item: TagSelector::parse("li"),
            years_in_business: TagSelector::parse("span.years-active"),
            review_count: TagSelector::parse("span.review-count"),
            response_rate: TagSelector::parse("span.response-rate"),
            contact: TagSelector::parse("a.contact-link"),
            address: TagSelector::parse("span.address"),
            resale_policy: TagSelector::parse("div.resale-policy"),
        }
    }
}

/// Result of extracting one page: the readable cards and the skipped ones.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<CandidateRecord>,
    pub skipped: Vec<ExtractionError>,
}

impl Extraction {
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.records.len() + self.skipped.len()
    }
}

/// Extract every card on a page.
///
/// `page_url`, when known, supplies `source_url` and `category` for each record.
/// A page with no cards yields an empty [`Extraction`].
#[must_use]
pub fn extract_candidates<E: Element>(
    page: &E,
    selectors: &CardSelectors,
    page_url: Option<&str>,
) -> Extraction {
    let category = page_url.and_then(category_from_url);
    let mut extraction = Extraction::default();

    for (index, card) in page.find_all(&selectors.card).iter().enumerate() {
        match extract_card(card, index, selectors) {
            Ok(mut record) => {
                record.category.clone_from(&category);
                record.source_url = page_url.map(str::to_string);
                extraction.records.push(record);
            }
            Err(err) => {
                tracing::warn!(card = index, error = %err, "skipping card");
                extraction.skipped.push(err);
            }
        }
    }

    extraction
}

/// Read one card.
///
/// # Errors
///
/// - [`ExtractionError::NestedCard`] if the card wraps another card (the inner
///   card is extracted on its own).
/// - [`ExtractionError::UnrecognisedCard`] if none of the expected fields is present.
pub fn extract_card<E: Element>(
    card: &E,
    index: usize,
    selectors: &CardSelectors,
) -> Result<CandidateRecord, ExtractionError> {
    if card.find(&selectors.card).is_some() {
        return Err(ExtractionError::NestedCard { index });
    }

    let supplier_name = card.find_text(&selectors.name);
    let price_text = card.find_text(&selectors.price);
    let moq_text = card.find_text(&selectors.minimum_order_quantity);
    let certifications = card
        .find(&selectors.certifications)
        .map(|list| read_certifications(&list, &selectors.certification_item));
    let years_text = card.find_text(&selectors.years_in_business);
    let reviews_text = card.find_text(&selectors.review_count);
    let rate_text = card.find_text(&selectors.response_rate);
    let contact = card
        .find(&selectors.contact)
        .and_then(|link| link.attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty());
    let address = card.find_text(&selectors.address);
    let resale_text = card.find_text(&selectors.resale_policy);

    let recognised = supplier_name.is_some()
        || price_text.is_some()
        || moq_text.is_some()
        || certifications.is_some()
        || years_text.is_some()
        || reviews_text.is_some()
        || rate_text.is_some()
        || contact.is_some()
        || address.is_some()
        || resale_text.is_some();
    if !recognised {
        return Err(ExtractionError::UnrecognisedCard { index });
    }

    Ok(CandidateRecord {
        supplier_name,
        price: price_text.as_deref().and_then(parse_price),
        minimum_order_quantity: moq_text.as_deref().and_then(parse_count),
        certifications,
        years_in_business: years_text.as_deref().and_then(parse_small_count),
        review_count: reviews_text.as_deref().and_then(parse_count),
        response_rate: rate_text.as_deref().and_then(parse_response_rate),
        contact,
        address,
        resale_status: ResaleStatus::from_policy_text(resale_text.as_deref()),
        category: None,
        source_url: None,
    })
}

fn read_certifications<E: Element>(list: &E, item: &TagSelector) -> BTreeSet<String> {
    list.find_all(item)
        .iter()
        .map(Element::text)
        .filter(|text| !text.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
