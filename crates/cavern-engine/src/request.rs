//! Requests, responses and their JSON wire form.

use std::fmt;
use std::sync::Arc;

use cavern_analysis::{
    compute_heat_map, compute_statistics, find_path, HeatMap, HeatMapKind, HeatMapOptions,
    PathOptions, PathResult, Statistics, ValidationContext, ValidationReport, Validator,
    ValidatorConfig,
};
use cavern_core::{Coord, LevelGrid};
use cavern_space::{build_chunks, prioritize, Chunk, Viewport};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::cache::CacheKey;
use crate::error::GatewayError;

// ── RequestId ────────────────────────────────────────────────────

/// Caller-chosen request identifier, echoed back on the response.
///
/// Numbers and strings are both accepted and echoed in the form they
/// arrived in: `-1` comes back as `-1` and `1.5` as `1.5`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric id, signed, unsigned or fractional.
    Number(serde_json::Number),
    /// String id.
    Text(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<u64> for RequestId {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

// ── Query ────────────────────────────────────────────────────────

/// One analysis to run. Grids are shared, never copied per request.
#[derive(Clone, Debug)]
pub enum Query {
    /// Full validation report.
    Validate {
        /// Level snapshot.
        grid: Arc<LevelGrid>,
        /// Objectives, start positions, script references.
        context: ValidationContext,
        /// Thresholds.
        config: ValidatorConfig,
    },
    /// Shortest path.
    FindPath {
        /// Level snapshot.
        grid: Arc<LevelGrid>,
        /// Start cell.
        start: Coord,
        /// Goal cell.
        goal: Coord,
        /// Movement rules.
        options: PathOptions,
    },
    /// Aggregate statistics.
    Statistics {
        /// Level snapshot.
        grid: Arc<LevelGrid>,
    },
    /// Per-cell heat map.
    HeatMap {
        /// Level snapshot.
        grid: Arc<LevelGrid>,
        /// Which map.
        kind: HeatMapKind,
        /// Tuning.
        options: HeatMapOptions,
    },
    /// Chunk partition, optionally ordered for a viewport.
    Chunks {
        /// Level snapshot.
        grid: Arc<LevelGrid>,
        /// Chunk edge length.
        chunk_size: u32,
        /// Viewport to prioritize for.
        viewport: Option<Viewport>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidatePayload {
    grid: Arc<LevelGrid>,
    #[serde(default)]
    context: ValidationContext,
    #[serde(default)]
    config: ValidatorConfig,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FindPathPayload {
    grid: Arc<LevelGrid>,
    start: Coord,
    goal: Coord,
    #[serde(default)]
    options: PathOptions,
}

#[derive(Deserialize)]
struct StatisticsPayload {
    grid: Arc<LevelGrid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeatMapPayload {
    grid: Arc<LevelGrid>,
    #[serde(rename = "type")]
    kind: HeatMapKind,
    #[serde(default)]
    options: HeatMapOptions,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChunksPayload {
    grid: Arc<LevelGrid>,
    chunk_size: u32,
    #[serde(default)]
    viewport: Option<Viewport>,
}

fn payload<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, GatewayError> {
    Ok(serde_json::from_value(value)?)
}

impl Query {
    /// Wire `kind` of this query.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validate { .. } => "validate",
            Self::FindPath { .. } => "findPath",
            Self::Statistics { .. } => "statistics",
            Self::HeatMap { .. } => "heatmap",
            Self::Chunks { .. } => "chunks",
        }
    }

    /// The grid this query reads.
    pub fn grid(&self) -> &Arc<LevelGrid> {
        match self {
            Self::Validate { grid, .. }
            | Self::FindPath { grid, .. }
            | Self::Statistics { grid }
            | Self::HeatMap { grid, .. }
            | Self::Chunks { grid, .. } => grid,
        }
    }

    /// Decode a query from its wire `kind` and `payload`.
    pub fn from_parts(kind: &str, value: serde_json::Value) -> Result<Self, GatewayError> {
        Ok(match kind {
            "validate" => {
                let p: ValidatePayload = payload(value)?;
                Self::Validate {
                    grid: p.grid,
                    context: p.context,
                    config: p.config,
                }
            }
            "findPath" => {
                let p: FindPathPayload = payload(value)?;
                Self::FindPath {
                    grid: p.grid,
                    start: p.start,
                    goal: p.goal,
                    options: p.options,
                }
            }
            "statistics" => {
                let p: StatisticsPayload = payload(value)?;
                Self::Statistics { grid: p.grid }
            }
            "heatmap" => {
                let p: HeatMapPayload = payload(value)?;
                Self::HeatMap {
                    grid: p.grid,
                    kind: p.kind,
                    options: p.options,
                }
            }
            "chunks" => {
                let p: ChunksPayload = payload(value)?;
                Self::Chunks {
                    grid: p.grid,
                    chunk_size: p.chunk_size,
                    viewport: p.viewport,
                }
            }
            other => return Err(GatewayError::Decode(format!("unknown request kind `{other}`"))),
        })
    }

    /// Run the analysis on the current thread.
    pub fn execute(&self) -> Result<AnalysisResult, GatewayError> {
        Ok(match self {
            Self::Validate {
                grid,
                context,
                config,
            } => AnalysisResult::Validation(Validator::new(config.clone()).validate(grid, context)),
            Self::FindPath {
                grid,
                start,
                goal,
                options,
            } => AnalysisResult::Path(find_path(grid, *start, *goal, options)?),
            Self::Statistics { grid } => AnalysisResult::Statistics(compute_statistics(grid)),
            Self::HeatMap {
                grid,
                kind,
                options,
            } => AnalysisResult::HeatMap(compute_heat_map(grid, *kind, options)?),
            Self::Chunks {
                grid,
                chunk_size,
                viewport,
            } => {
                let chunks = build_chunks(grid, *chunk_size)?;
                AnalysisResult::Chunks(match viewport {
                    Some(vp) => prioritize(chunks, vp),
                    None => chunks,
                })
            }
        })
    }

    /// Cache key, or `None` for queries that are not worth caching.
    ///
    /// Chunk partitions are a plain copy of the grid and are rebuilt on
    /// demand.
    pub(crate) fn cache_key(&self) -> Option<CacheKey> {
        let params = match self {
            Self::Validate {
                context, config, ..
            } => serde_json::to_string(&(context, config)),
            Self::FindPath {
                start,
                goal,
                options,
                ..
            } => serde_json::to_string(&(start, goal, options)),
            Self::Statistics { .. } => Ok(String::new()),
            Self::HeatMap { kind, options, .. } => serde_json::to_string(&(kind, options)),
            Self::Chunks { .. } => return None,
        }
        .ok()?;
        Some(CacheKey::new(self.grid(), self.kind(), params))
    }
}

// ── Request ──────────────────────────────────────────────────────

/// A query tagged with the caller's id.
#[derive(Clone, Debug)]
pub struct Request {
    /// Echoed on the response.
    pub id: RequestId,
    /// What to compute.
    pub query: Query,
}

#[derive(Deserialize)]
struct RawRequest {
    id: RequestId,
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

impl Request {
    /// Tag `query` with `id`.
    pub fn new(id: impl Into<RequestId>, query: Query) -> Self {
        Self {
            id: id.into(),
            query,
        }
    }

    /// Decode `{ "id", "kind", "payload" }`.
    ///
    /// On failure the error response carries the id when one could be
    /// recovered from the input.
    pub fn from_json(input: &str) -> Result<Self, Box<Response>> {
        let raw: RawRequest = match serde_json::from_str(input) {
            Ok(raw) => raw,
            Err(e) => {
                let id = serde_json::from_str::<serde_json::Value>(input)
                    .ok()
                    .and_then(|v| serde_json::from_value(v.get("id")?.clone()).ok());
                return Err(Box::new(Response {
                    id,
                    result: Err(e.into()),
                }));
            }
        };
        match Query::from_parts(&raw.kind, raw.payload) {
            Ok(query) => Ok(Self { id: raw.id, query }),
            Err(e) => Err(Box::new(Response::failure(raw.id, e))),
        }
    }
}

// ── Response ─────────────────────────────────────────────────────

/// Successful analysis output.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResult {
    /// From [`Query::Validate`].
    Validation(ValidationReport),
    /// From [`Query::FindPath`].
    Path(PathResult),
    /// From [`Query::Statistics`].
    Statistics(Statistics),
    /// From [`Query::HeatMap`].
    HeatMap(HeatMap),
    /// From [`Query::Chunks`].
    Chunks(Vec<Chunk>),
}

/// Outcome of one request.
///
/// `id` is `None` only when the request was too broken to read an id
/// from; it serializes as `null`.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    /// The request's id.
    pub id: Option<RequestId>,
    /// Result or failure.
    pub result: Result<Arc<AnalysisResult>, GatewayError>,
}

impl Response {
    /// A successful response.
    pub fn success(id: RequestId, result: Arc<AnalysisResult>) -> Self {
        Self {
            id: Some(id),
            result: Ok(result),
        }
    }

    /// A failed response.
    pub fn failure(id: RequestId, error: GatewayError) -> Self {
        Self {
            id: Some(id),
            result: Err(error),
        }
    }

    /// Whether the request succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&GatewayError> {
        self.result.as_ref().err()
    }

    /// Encode as `{ "id", "kind", ... }`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for Response {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(if self.result.is_ok() { 3 } else { 4 }))?;
        map.serialize_entry("id", &self.id)?;
        match &self.result {
            Ok(result) => {
                map.serialize_entry("kind", "success")?;
                map.serialize_entry("result", result.as_ref())?;
            }
            Err(error) => {
                map.serialize_entry("kind", "error")?;
                map.serialize_entry("errorMessage", &error.to_string())?;
                map.serialize_entry("errorCode", error.code())?;
            }
        }
        map.end()
    }
}
