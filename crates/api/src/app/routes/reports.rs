//! Report endpoints, aggregated in the handler from raw list data.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    routing::get,
    Json, Router,
};
use chrono::{Months, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use vendora_core::{ProductId, SupplierId};
use vendora_offers::{OfferFilter, OfferSort, ReportFilter, ReportStatus};

use crate::app::errors::{store_error, ApiError};
use crate::app::routes::offers;
use crate::app::{dto, AppState};

const NOT_FOUND: &str = "Offer not found";
const CONFLICT: &str = "Offer already exists";

pub fn router() -> Router {
    Router::new()
        .route("/summary", get(summary_report))
        .route("/offers", get(offers_report))
}

/// Counts, top suppliers by offer count, and offers per month for the
/// last six months.
pub async fn summary_report(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let suppliers = state
        .suppliers
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;
    let product_count = state
        .products
        .list()
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .len();
    let contact_count = state
        .contacts
        .list(None)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .len();

    let now = Utc::now();
    let today = now.date_naive();
    let offers = state
        .offers
        .list(OfferFilter::default(), OfferSort::default(), today)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?;

    let active_offers = offers.iter().filter(|o| o.valid_to >= today).count();

    let mut offers_per_supplier: HashMap<SupplierId, usize> = HashMap::new();
    for offer in &offers {
        *offers_per_supplier.entry(offer.supplier_id).or_default() += 1;
    }
    let mut ranked: Vec<_> = suppliers
        .iter()
        .map(|s| (s, offers_per_supplier.get(&s.id).copied().unwrap_or(0)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let top_suppliers: Vec<Value> = ranked
        .into_iter()
        .take(5)
        .map(|(s, count)| json!({ "id": s.id, "name": s.name, "offerCount": count }))
        .collect();

    let cutoff = now.checked_sub_months(Months::new(5)).unwrap_or(now);
    let mut by_month: BTreeMap<String, usize> = BTreeMap::new();
    for offer in &offers {
        if offer.created_at >= cutoff {
            *by_month
                .entry(offer.created_at.format("%Y-%m").to_string())
                .or_default() += 1;
        }
    }
    let offers_by_month: Vec<Value> = by_month
        .into_iter()
        .map(|(month, count)| json!({ "month": month, "count": count }))
        .collect();

    Ok(Json(json!({
        "counts": {
            "suppliers": suppliers.len(),
            "products": product_count,
            "contacts": contact_count,
            "offers": offers.len(),
            "activeOffers": active_offers,
        },
        "topSuppliers": top_suppliers,
        "offersByMonth": offers_by_month,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffersReportParams {
    pub supplier_id: Option<i64>,
    pub product_id: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub status: Option<ReportStatus>,
}

impl OffersReportParams {
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            supplier_id: self.supplier_id.map(SupplierId::new),
            product_id: self.product_id.map(ProductId::new),
            date_from: self.date_from,
            date_to: self.date_to,
            status: self.status,
        }
    }
}

/// Filtered offer listing, latest validity window first.
pub async fn offers_report(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<OffersReportParams>,
) -> Result<Json<Vec<dto::OfferResponse>>, ApiError> {
    let today = Utc::now().date_naive();
    let filter = params.filter();

    let mut matching: Vec<_> = state
        .offers
        .list(OfferFilter::default(), OfferSort::default(), today)
        .await
        .map_err(|e| store_error(e, NOT_FOUND, CONFLICT))?
        .into_iter()
        .filter(|o| filter.matches(o, today))
        .collect();
    matching.sort_by(|a, b| b.valid_to.cmp(&a.valid_to));

    let (suppliers, products) = offers::parent_maps(&state).await?;
    Ok(Json(
        matching
            .iter()
            .map(|o| {
                dto::OfferResponse::new(
                    o,
                    suppliers.get(&o.supplier_id),
                    products.get(&o.product_id),
                )
            })
            .collect(),
    ))
}
