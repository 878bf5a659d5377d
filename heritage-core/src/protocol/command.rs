#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Ingest,
    Tokenize,
    GeojsonBuild,
    TranslationFill,
    TranslationMerge,
    LinksInject,
    PipelineRun,
    Inspect,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "ingest" => Command::Ingest,
            "tokenize" => Command::Tokenize,
            "geojson.build" => Command::GeojsonBuild,
            "translation.fill" => Command::TranslationFill,
            "translation.merge" => Command::TranslationMerge,
            "links.inject" => Command::LinksInject,
            "pipeline.run" | "run" => Command::PipelineRun,
            "inspect" => Command::Inspect,
            _ => Command::Unknown,
        }
    }
}
