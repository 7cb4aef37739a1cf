use super::helpers::catalog_call;
use super::Engine;

use async_trait::async_trait;

use crate::{
    api::QuoteAPI,
    entities::{Quote, RouteRequest},
    error::Error,
};

#[async_trait]
impl QuoteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn get_quotes(&self, request: RouteRequest) -> Result<Vec<Quote>, Error> {
        request.validate()?;

        let vehicles = catalog_call(
            self.timeouts.catalog,
            self.catalog.list_active_vehicles(request.service_class),
        )
        .await?;

        // the distance belongs to the route, so it is estimated once and
        // shared by every vehicle's fare
        let distance = self.estimator.estimate(&request.pickup, &request.drop);

        let quotes: Vec<Quote> = vehicles
            .iter()
            .filter(|vehicle| vehicle.is_active() && vehicle.service_class == request.service_class)
            .map(|vehicle| {
                let mut quote = Quote::new(vehicle, distance);
                quote.seal = self.sealer.seal_quote(&request, &quote);
                quote
            })
            .collect();

        if quotes.is_empty() {
            tracing::info!("no active vehicles for this service class");
        } else {
            tracing::info!(count = quotes.len(), %distance, "quoted route");
        }

        Ok(quotes)
    }
}
