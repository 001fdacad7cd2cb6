// Route and map links derived from an assignment's coordinate pair
use crate::domain::dispatch::DispatchAssignment;
use crate::domain::geo::Coordinate;
use serde::Serialize;

const STATIC_MAP_BASE: &str = "https://staticmap.openstreetmap.de/staticmap.php";
const DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir";
const MAP_WIDTH: u32 = 650;
const MAP_HEIGHT: u32 = 350;
const MAP_ZOOM: u32 = 11;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLinks {
    /// Without a crew this is the site's own map link, when the roster has one
    pub directions_url: Option<String>,
    pub static_map_url: String,
}

pub fn route_links(assignment: &DispatchAssignment) -> RouteLinks {
    let site = assignment.outage_location;
    match assignment.crew() {
        Some(crew) => RouteLinks {
            directions_url: Some(directions_url(&crew.location, &site)),
            static_map_url: static_map_url(&site, &crew.location),
        },
        None => RouteLinks {
            directions_url: assignment.site_map_link.clone(),
            static_map_url: static_map_url(&site, &site),
        },
    }
}

pub fn directions_url(crew: &Coordinate, site: &Coordinate) -> String {
    format!(
        "{}/{},{}/{},{}/",
        DIRECTIONS_BASE, crew.latitude, crew.longitude, site.latitude, site.longitude
    )
}

/// Static map centered between both markers
pub fn static_map_url(site: &Coordinate, crew: &Coordinate) -> String {
    let center = site.midpoint(crew);
    format!(
        "{}?center={},{}&zoom={}&size={}x{}&markers={},{},lightblue1&markers={},{},red-pushpin",
        STATIC_MAP_BASE,
        center.latitude,
        center.longitude,
        MAP_ZOOM,
        MAP_WIDTH,
        MAP_HEIGHT,
        crew.latitude,
        crew.longitude,
        site.latitude,
        site.longitude
    )
}
