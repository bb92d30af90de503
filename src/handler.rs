//! Facade tying the catalogue, renderer, router and codec together for the
//! two CLI phases.

use std::io::Write;

use crate::catalogue::TransportCatalogue;
use crate::errors::Result;
use crate::json_io::JsonIO;
use crate::map_renderer::RenderSettings;
use crate::router::{RoutingSettings, TransportRouter};
use crate::serialization::{SerializeSettings, Serializator};

#[derive(Default)]
pub struct TransportCatalogueHandler {
    catalogue: TransportCatalogue,
    router: Option<TransportRouter>,
    render_settings: Option<RenderSettings>,
    routing_settings: Option<RoutingSettings>,
    serialize_settings: Option<SerializeSettings>,
}

impl TransportCatalogueHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalogue(&self) -> &TransportCatalogue {
        &self.catalogue
    }

    /// Loads whatever the input document carries: base requests into the
    /// catalogue, plus the three optional settings sections.
    pub fn load_from_json(&mut self, json: &JsonIO) -> Result<()> {
        json.load_data(&mut self.catalogue)?;
        self.render_settings = json.render_settings();
        self.serialize_settings = json.serialize_settings();
        self.routing_settings = json.routing_settings();
        Ok(())
    }

    /// Persists the catalogue together with the available settings. The
    /// router is built first when routing settings are present, so its
    /// preprocessed state lands in the blob. Returns false when no
    /// serialization settings are configured.
    pub fn serialize_data(&mut self) -> Result<bool> {
        let Some(settings) = self.serialize_settings.clone() else {
            tracing::error!("no serialization settings, skipping serialize");
            return Ok(false);
        };
        if self.routing_settings.is_some() {
            self.init_router()?;
        }
        Serializator::new(settings).serialize(
            &self.catalogue,
            self.render_settings.as_ref(),
            self.router.as_ref(),
        )?;
        Ok(true)
    }

    /// Replaces the catalogue and settings with the persisted state. A
    /// router restored from the blob is ready to answer immediately.
    /// Returns false when no serialization settings are configured.
    pub fn deserialize_data(&mut self) -> Result<bool> {
        let Some(settings) = self.serialize_settings.clone() else {
            tracing::error!("no serialization settings, skipping deserialize");
            return Ok(false);
        };
        let (catalogue, render_settings, router) = Serializator::new(settings).deserialize()?;
        self.catalogue = catalogue;
        if let Some(render_settings) = render_settings {
            self.render_settings = Some(render_settings);
        }
        if let Some(router) = router {
            self.routing_settings = Some(*router.settings());
            self.router = Some(router);
        }
        Ok(true)
    }

    /// Answers the document's stat requests into `out` as a JSON array.
    /// Without a usable router the whole batch is skipped, matching the
    /// all-or-nothing phase contract. The caller owns flushing `out`.
    pub fn answer_requests(&mut self, json: &JsonIO, out: impl Write) -> Result<()> {
        self.init_router()?;
        let Some(router) = self.router.as_ref() else {
            tracing::error!("cannot init transport router, skipping stat requests");
            return Ok(());
        };
        let render_settings = self.render_settings.clone().unwrap_or_default();
        let answers = json.answer_requests(&self.catalogue, &render_settings, router);
        serde_json::to_writer_pretty(out, &answers)?;
        Ok(())
    }

    pub fn get_route_info(&self, route_name: &str) -> Result<crate::models::RouteInfo> {
        self.catalogue.get_route_info(route_name)
    }

    pub fn get_buses_on_stop(&self, stop_name: &str) -> Result<Vec<&str>> {
        self.catalogue.get_buses_on_stop(stop_name)
    }

    pub fn set_render_settings(&mut self, settings: RenderSettings) {
        self.render_settings = Some(settings);
    }

    pub fn set_routing_settings(&mut self, settings: RoutingSettings) {
        self.routing_settings = Some(settings);
    }

    pub fn set_serialize_settings(&mut self, settings: SerializeSettings) {
        self.serialize_settings = Some(settings);
    }

    /// Builds the router once; later calls are no-ops. False when routing
    /// settings are missing.
    fn init_router(&mut self) -> Result<bool> {
        if self.router.is_some() {
            return Ok(true);
        }
        self.re_init_router()
    }

    /// Rebuilds the router from the current catalogue and settings, for
    /// callers that mutated either after a previous init.
    pub fn re_init_router(&mut self) -> Result<bool> {
        match self.routing_settings {
            Some(settings) => {
                self.router = Some(TransportRouter::new(&self.catalogue, settings)?);
                Ok(true)
            }
            None => {
                tracing::error!("routing settings are not available");
                Ok(false)
            }
        }
    }
}
