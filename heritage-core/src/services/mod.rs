pub mod encoding;
pub mod enrich;
pub mod extract;
pub mod geojson;
pub mod inspect;
pub mod link_matcher;
pub mod output;
pub mod pipeline;
pub mod translation_map;
