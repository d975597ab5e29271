//! Búsqueda pública de disponibilidades de retorno
//!
//! Siempre filtra por estado ACTIVE y ordena por fecha disponible ascendente.
//! La página y el total se consultan en paralelo.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::dto::availability_dto::{Pagination, SearchAvailabilityQuery, SearchResponse};
use crate::models::availability::AvailabilityOrder;
use crate::repositories::AvailabilityRepository;
use crate::utils::errors::AppResult;

pub struct SearchService {
    availabilities: Arc<dyn AvailabilityRepository>,
}

impl SearchService {
    pub fn new(availabilities: Arc<dyn AvailabilityRepository>) -> Self {
        Self { availabilities }
    }

    pub async fn search(&self, query: &SearchAvailabilityQuery) -> AppResult<SearchResponse> {
        let filter = query.to_filter(Utc::now())?;
        let window = query.window();

        let (availabilities, total) = futures::try_join!(
            self.availabilities
                .list(&filter, AvailabilityOrder::AvailableDateAsc, Some(window)),
            self.availabilities.count(&filter),
        )?;

        debug!(
            "🔎 Búsqueda: {} de {} resultados (página {})",
            availabilities.len(),
            total,
            query.page()
        );

        Ok(SearchResponse {
            availabilities,
            pagination: Pagination::new(query.page(), query.limit(), total),
        })
    }
}
