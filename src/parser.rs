//! Search-result extraction.
//!
//! Rows are described declaratively by a [`RowSpec`]: one selector for the
//! row element, the attribute carrying its id, and a selector per field.
//! [`CompiledSpec`] applies a spec to a parsed document, and
//! [`ListingParser`] turns the resulting rows into [`Listing`]s.

use crate::error::{Error, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::debug;

/// One discounted item from the search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub app_id: String,
    pub name: String,
    /// Percentage off, 0 to 100.
    pub discount_pct: u8,
    pub original_price: String,
    pub final_price: String,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub selector: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RowSpec {
    pub row: &'static str,
    pub id_attr: &'static str,
    pub fields: &'static [FieldSpec],
}

const NAME: &str = "name";
const DISCOUNT: &str = "discount";
const ORIGINAL_PRICE: &str = "original_price";
const FINAL_PRICE: &str = "final_price";

/// Steam search results. Free-to-play and bundle rows lack the price block
/// or the app id and drop out as incomplete.
pub const STEAM_SEARCH_ROWS: RowSpec = RowSpec {
    row: "a.search_result_row",
    id_attr: "data-ds-appid",
    fields: &[
        FieldSpec { key: NAME, selector: "span.title", required: true },
        FieldSpec { key: DISCOUNT, selector: "div.discount_pct", required: true },
        FieldSpec { key: ORIGINAL_PRICE, selector: "div.discount_original_price", required: true },
        FieldSpec { key: FINAL_PRICE, selector: "div.discount_final_price", required: true },
    ],
};

/// Values pulled from one row element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    fields: HashMap<&'static str, String>,
}

impl Row {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn take(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }
}

/// A [`RowSpec`] with its selectors parsed.
#[derive(Debug)]
pub struct CompiledSpec {
    row: Selector,
    id_attr: &'static str,
    fields: Vec<(FieldSpec, Selector)>,
}

fn compile(selector: &'static str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| Error::Selector(selector, format!("{e:?}")))
}

impl CompiledSpec {
    pub fn compile(spec: &RowSpec) -> Result<Self> {
        let fields = spec
            .fields
            .iter()
            .map(|field| compile(field.selector).map(|selector| (*field, selector)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            row: compile(spec.row)?,
            id_attr: spec.id_attr,
            fields,
        })
    }

    /// Complete rows in document order. Evaluated lazily.
    pub fn rows<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = Row> + 'a {
        document
            .select(&self.row)
            .filter_map(move |element| self.extract_row(element))
    }

    /// `None` when the id or any required field is missing or blank.
    pub fn extract_row(&self, element: ElementRef<'_>) -> Option<Row> {
        let id = element
            .value()
            .attr(self.id_attr)
            .map(str::trim)
            .filter(|id| !id.is_empty())?;

        let mut fields = HashMap::with_capacity(self.fields.len());
        for (spec, selector) in &self.fields {
            let value = element
                .select(selector)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|text| !text.is_empty());

            match value {
                Some(value) => {
                    fields.insert(spec.key, value);
                }
                None if spec.required => {
                    debug!(id, field = spec.key, "Skipping row with missing field");
                    return None;
                }
                None => {}
            }
        }

        Some(Row {
            id: id.to_string(),
            fields,
        })
    }
}

/// `"-90%"` becomes `90`. Anything that is not a whole percentage up to 100 is rejected.
pub fn normalize_discount(text: &str) -> Option<u8> {
    let digits: String = text.chars().filter(|c| *c != '%' && *c != '-').collect();
    digits.trim().parse::<u8>().ok().filter(|pct| *pct <= 100)
}

pub struct ListingParser {
    spec: CompiledSpec,
}

impl ListingParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            spec: CompiledSpec::compile(&STEAM_SEARCH_ROWS)?,
        })
    }

    pub fn listings<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = Listing> + 'a {
        self.spec.rows(document).filter_map(listing_from_row)
    }
}

fn listing_from_row(mut row: Row) -> Option<Listing> {
    let discount_text = row.take(DISCOUNT)?;
    let Some(discount_pct) = normalize_discount(&discount_text) else {
        debug!(id = %row.id, discount = %discount_text, "Skipping row with unreadable discount");
        return None;
    };

    Some(Listing {
        name: row.take(NAME)?,
        discount_pct,
        original_price: row.take(ORIGINAL_PRICE)?,
        final_price: row.take(FINAL_PRICE)?,
        app_id: row.id,
    })
}

/// Parses a whole search page.
pub fn parse_listings(markup: &str) -> Result<Vec<Listing>> {
    let parser = ListingParser::new()?;
    let document = Html::parse_document(markup);
    let listings: Vec<Listing> = parser.listings(&document).collect();
    debug!(count = listings.len(), "Listings parsed");
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, name: &str, pct: &str, old: &str, new: &str) -> String {
        format!(
            r#"<a href="https://store.steampowered.com/app/{id}/" data-ds-appid="{id}" class="search_result_row ds_collapse_flag">
    <div class="responsive_search_name_combined">
        <div class="col search_name ellipsis"><span class="title">{name}</span></div>
        <div class="col search_price_discount_combined responsive_secondrow">
            <div class="col search_discount_and_price responsive_secondrow">
                <div class="discount_block search_discount_block">
                    <div class="discount_pct">{pct}</div>
                    <div class="discount_prices">
                        <div class="discount_original_price">{old}</div>
                        <div class="discount_final_price">{new}</div>
                    </div>
                </div>
            </div>
        </div>
    </div>
</a>"#
        )
    }

    fn page(rows: &[String]) -> String {
        format!(
            r#"<!DOCTYPE html><html><body><div id="search_resultsRows">{}</div></body></html>"#,
            rows.join("\n")
        )
    }

    const FREE_TO_PLAY_ROW: &str = r#"<a data-ds-appid="570" class="search_result_row">
    <span class="title">Dota 2</span>
    <div class="discount_block no_discount"><div class="discount_prices"><div class="discount_final_price free">Free</div></div></div>
</a>"#;

    const BUNDLE_ROW: &str = r#"<a data-ds-bundleid="1234" class="search_result_row">
    <span class="title">Farming Bundle</span>
    <div class="discount_pct">-40%</div>
    <div class="discount_original_price">$50</div>
    <div class="discount_final_price">$30</div>
</a>"#;

    #[test]
    fn normalizes_signed_percentages() {
        assert_eq!(normalize_discount("-90%"), Some(90));
        assert_eq!(normalize_discount("-5%"), Some(5));
        assert_eq!(normalize_discount(" -100% "), Some(100));
        assert_eq!(normalize_discount("75"), Some(75));
    }

    #[test]
    fn rejects_non_percentages() {
        assert_eq!(normalize_discount(""), None);
        assert_eq!(normalize_discount("-%"), None);
        assert_eq!(normalize_discount("-abc%"), None);
        assert_eq!(normalize_discount("-150%"), None);
        assert_eq!(normalize_discount("-12.5%"), None);
    }

    #[test]
    fn extracts_complete_row() {
        let html = page(&[row("123", "Game A", "-50%", "$20", "$10")]);
        let listings = parse_listings(&html).expect("should parse");
        assert_eq!(
            listings,
            vec![Listing {
                app_id: "123".into(),
                name: "Game A".into(),
                discount_pct: 50,
                original_price: "$20".into(),
                final_price: "$10".into(),
            }]
        );
    }

    #[test]
    fn row_missing_price_is_dropped() {
        let partial = r#"<a data-ds-appid="456" class="search_result_row">
    <span class="title">Game B</span>
    <div class="discount_pct">-30%</div>
    <div class="discount_original_price">$15</div>
</a>"#;
        let html = page(&[row("123", "Game A", "-50%", "$20", "$10"), partial.to_string()]);
        let listings = parse_listings(&html).expect("should parse");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].app_id, "123");
    }

    #[test]
    fn free_to_play_and_bundle_rows_are_dropped() {
        let html = page(&[
            FREE_TO_PLAY_ROW.to_string(),
            BUNDLE_ROW.to_string(),
            row("413150", "Stardew Valley", "-20%", "₺140,00", "₺112,00"),
        ]);
        let listings = parse_listings(&html).expect("should parse");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name, "Stardew Valley");
        assert_eq!(listings[0].final_price, "₺112,00");
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let html = page(&[
            row("1", "   ", "-10%", "$5", "$4"),
            row("", "No Id", "-10%", "$5", "$4"),
            row("3", "Bad Discount", "-x%", "$5", "$4"),
        ]);
        assert!(parse_listings(&html).expect("should parse").is_empty());
    }

    #[test]
    fn preserves_document_order_and_trims_text() {
        let html = page(&[
            row("30", "  Third  ", "-75%", " $40 ", " $10 "),
            row("10", "First", "-5%", "$20", "$19"),
            row("20", "Second", "-90%", "$100", "$10"),
        ]);
        let listings = parse_listings(&html).expect("should parse");
        let ids: Vec<&str> = listings.iter().map(|l| l.app_id.as_str()).collect();
        assert_eq!(ids, vec!["30", "10", "20"]);
        assert_eq!(listings[0].name, "Third");
        assert_eq!(listings[0].original_price, "$40");
        assert_eq!(listings[2].discount_pct, 90);
    }

    #[test]
    fn rows_outside_result_anchor_are_ignored() {
        let html = r#"<html><body>
<div class="search_result_row" data-ds-appid="9">
    <span class="title">Not an anchor</span>
    <div class="discount_pct">-10%</div>
    <div class="discount_original_price">$1</div>
    <div class="discount_final_price">$0.90</div>
</div></body></html>"#;
        assert!(parse_listings(html).expect("should parse").is_empty());
    }

    #[test]
    fn empty_page_yields_nothing() {
        let listings = parse_listings("<html><body></body></html>").expect("should parse");
        assert!(listings.is_empty());
    }

    #[test]
    fn listings_iterator_is_lazy() {
        let html = page(&[
            row("1", "A", "-10%", "$1", "$0.90"),
            row("2", "B", "-10%", "$1", "$0.90"),
        ]);
        let parser = ListingParser::new().expect("parser");
        let document = Html::parse_document(&html);
        let first = parser.listings(&document).next().expect("one listing");
        assert_eq!(first.app_id, "1");
    }

    #[test]
    fn optional_fields_do_not_drop_rows() {
        const SPEC: RowSpec = RowSpec {
            row: "li.item",
            id_attr: "data-id",
            fields: &[
                FieldSpec { key: "title", selector: "span.t", required: true },
                FieldSpec { key: "note", selector: "em", required: false },
            ],
        };
        let spec = CompiledSpec::compile(&SPEC).expect("compile");
        let document = Html::parse_document(
            r#"<ul><li class="item" data-id="a"><span class="t">Alpha</span></li>
<li class="item" data-id="b"><span class="t">Beta</span><em>sale</em></li>
<li class="item" data-id="c"><em>orphan</em></li></ul>"#,
        );

        let rows: Vec<Row> = spec.rows(&document).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("title"), Some("Alpha"));
        assert_eq!(rows[0].get("note"), None);
        assert_eq!(rows[1].id, "b");
        assert_eq!(rows[1].get("note"), Some("sale"));
    }

    #[test]
    fn invalid_selector_is_reported() {
        const BROKEN: RowSpec = RowSpec {
            row: "a..row",
            id_attr: "id",
            fields: &[],
        };
        let err = CompiledSpec::compile(&BROKEN).expect_err("should fail");
        assert!(matches!(err, Error::Selector("a..row", _)));
    }
}
