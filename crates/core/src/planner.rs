//! Destination search and line selection.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use helpbus_transit::prelude::{Coordinate, Line, LineCatalog, MatchResult};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geocode::{Geocoder, Place};
use crate::location::cached_user_location;
use crate::request::RouteRequest;
use crate::storage::recents::CURRENT_LOCATION_LABEL;
use crate::storage::{Favorites, KeyValueStore, RecentSearch, Recents};

/// Lines offered for a destination.
#[derive(Debug)]
pub enum Suggestions<'a> {
    /// Lines with a stop near the destination, closest first
    Nearby(Vec<MatchResult<'a>>),
    /// Nothing was close enough; the whole catalog is offered instead
    Fallback(&'a [Arc<Line>]),
}

impl<'a> Suggestions<'a> {
    pub fn lines(&self) -> Vec<&'a Line> {
        match self {
            Self::Nearby(matches) => matches.iter().map(|m| m.line).collect(),
            Self::Fallback(lines) => lines.iter().map(Arc::as_ref).collect(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

#[derive(Debug)]
pub struct DestinationSearch<'a> {
    pub destination: Place,
    pub suggestions: Suggestions<'a>,
}

pub struct TripPlanner<G, S> {
    config: Config,
    catalog: Arc<dyn LineCatalog>,
    geocoder: G,
    store: S,
}

impl<G: Geocoder, S: KeyValueStore> TripPlanner<G, S> {
    pub fn new(config: Config, catalog: Arc<dyn LineCatalog>, geocoder: G, store: S) -> Self {
        Self {
            config,
            catalog,
            geocoder,
            store,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &dyn LineCatalog {
        self.catalog.as_ref()
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn recents(&self) -> Recents<&S> {
        Recents::new(&self.store, self.config.recents_capacity)
    }

    pub fn favorites(&self) -> Favorites<&S> {
        Favorites::new(&self.store)
    }

    async fn first_place(&self, text: &str, limit: usize) -> Result<Place> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyQuery);
        }

        self.geocoder
            .search(text, limit)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::PlaceNotFound(text.to_owned()))
    }

    /// Find lines serving a destination.
    ///
    /// `picked` is an autocomplete suggestion the user already chose; without
    /// one the text is geocoded. The search is recorded in the recents list.
    pub async fn search_destination(
        &self,
        text: &str,
        picked: Option<Place>,
        origin_text: Option<&str>,
    ) -> Result<DestinationSearch<'_>> {
        if text.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }

        let destination = match picked {
            Some(place) => place,
            None => self.first_place(text, self.config.geocoder.destination_limit).await?,
        };

        let matches = self
            .catalog
            .lines_near(destination.position, self.config.search_radius_m);

        let suggestions = if matches.is_empty() {
            info!(
                destination = %destination.name,
                radius_m = self.config.search_radius_m,
                "no line passes nearby, offering the full catalog"
            );
            Suggestions::Fallback(self.catalog.all_lines())
        } else {
            debug!(destination = %destination.name, lines = matches.len(), "lines near destination");
            Suggestions::Nearby(matches)
        };

        self.recents().save(RecentSearch {
            origin: origin_label(origin_text),
            destination: destination.name.clone(),
            line_id: String::new(),
            line_number: String::new(),
        })?;

        Ok(DestinationSearch {
            destination,
            suggestions,
        })
    }

    /// Resolve an origin typed by the user.
    pub async fn resolve_origin(&self, text: &str) -> Result<Place> {
        self.first_place(text, self.config.geocoder.origin_limit).await
    }

    /// Record the choice of `line` and build the map-page request for it.
    pub fn select_line(
        &self,
        line: &Line,
        destination: Option<Coordinate>,
        origin_text: Option<&str>,
        destination_text: &str,
    ) -> Result<RouteRequest> {
        self.recents().save(RecentSearch {
            origin: origin_label(origin_text),
            destination: destination_text.to_owned(),
            line_id: line.id().to_string(),
            line_number: line.number().to_string(),
        })?;

        let user = cached_user_location(&self.store, self.config.location_max_age, Utc::now())?;

        Ok(RouteRequest {
            line: Some(line.clone()),
            destination,
            user,
        })
    }

    pub fn toggle_favorite(&self, line: &Line) -> Result<bool> {
        self.favorites().toggle(line)
    }
}

fn origin_label(origin_text: Option<&str>) -> String {
    origin_text
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(CURRENT_LOCATION_LABEL)
        .to_owned()
}
