//! Catalog lookup helpers used by the search page and the barcode scanner.

use crate::dtos::product::ProductResponse;

/// Free-text search: case-insensitive substring match across the fields the
/// search page indexes. An empty query matches nothing.
pub fn search_products<'a>(
    products: &'a [ProductResponse],
    query: &str,
) -> Vec<&'a ProductResponse> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    products
        .iter()
        .filter(|p| matches_query(p, &query))
        .collect()
}

fn matches_query(product: &ProductResponse, query: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(query);
    contains(&product.code)
        || contains(&product.name)
        || contains(&product.brand)
        || contains(&product.category)
        || contains(&product.color)
        || product.model.as_deref().is_some_and(contains)
}

/// Structured catalog filters, all optional and combined with AND.
#[derive(Debug, Default, Clone)]
pub struct FilterOptions {
    pub search: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: Option<bool>,
}

pub fn apply_filters<'a>(
    products: &'a [ProductResponse],
    options: &FilterOptions,
) -> Vec<&'a ProductResponse> {
    let search = options
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    products
        .iter()
        .filter(|p| {
            search.as_deref().is_none_or(|q| matches_query(p, q))
                && options
                    .brand
                    .as_deref()
                    .is_none_or(|b| p.brand.eq_ignore_ascii_case(b))
                && options
                    .color
                    .as_deref()
                    .is_none_or(|c| p.color.eq_ignore_ascii_case(c))
                && options.category.as_deref().is_none_or(|c| p.category == c)
                && options.min_price.is_none_or(|min| p.sale_price >= min)
                && options.max_price.is_none_or(|max| p.sale_price <= max)
                && options.in_stock.is_none_or(|wanted| p.in_stock == wanted)
        })
        .collect()
}

/// Scanner lookup: exact barcode match wins, then case-insensitive code match.
pub fn find_by_code_or_barcode<'a>(
    products: &'a [ProductResponse],
    scanned: &str,
) -> Option<&'a ProductResponse> {
    if scanned.is_empty() {
        return None;
    }
    products
        .iter()
        .find(|p| p.barcode.as_deref() == Some(scanned))
        .or_else(|| {
            products
                .iter()
                .find(|p| p.code.eq_ignore_ascii_case(scanned))
        })
}
