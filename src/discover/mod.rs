//! Controller, action and parameter discovery over a [`SymbolGraph`].

pub mod actions;
pub mod area;
pub mod classify;
pub mod markers;
pub mod params;

use crate::config::Config;
use crate::model::{AreaModel, ControllerModel};
use crate::symbols::{SymbolGraph, TypeDecl};
use area::AreaAggregator;
use rayon::prelude::*;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_CONTROLLER_BASES: &[&str] = &[
    "Microsoft.AspNetCore.Mvc.Controller",
    "Microsoft.AspNetCore.Mvc.ControllerBase",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("discovery exceeded timeout of {0:?}")]
    Timeout(Duration),
    #[error("symbol graph input is empty")]
    EmptyGraphInput,
}

#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Fully qualified names of the types that make a class a controller.
    pub controller_bases: Vec<String>,
    /// Suffix stripped from controller names.
    pub controller_suffix: String,
    pub skip_abstract: bool,
    /// Graphs with at least this many types are processed on the rayon
    /// pool. Zero keeps discovery on the calling thread.
    pub parallel_threshold: usize,
    pub timeout: Option<Duration>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl DiscoveryOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            controller_bases: DEFAULT_CONTROLLER_BASES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            controller_suffix: config.controller_suffix.clone(),
            skip_abstract: config.skip_abstract,
            parallel_threshold: config.parallel_threshold,
            timeout: (config.timeout_ms > 0).then(|| Duration::from_millis(config.timeout_ms)),
        }
    }
}

pub struct Discoverer {
    options: DiscoveryOptions,
}

impl Discoverer {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    /// Areas with their controllers, actions and parameters, in declaration
    /// order. Empty when no type in the graph is a controller.
    pub fn discover(&self, graph: &SymbolGraph) -> Result<Vec<AreaModel>, DiscoveryError> {
        let started = Instant::now();
        let parallel =
            self.options.parallel_threshold > 0 && graph.len() >= self.options.parallel_threshold;
        let found: Vec<Option<(String, ControllerModel)>> = if parallel {
            graph
                .types
                .par_iter()
                .map(|ty| self.visit(graph, ty, started))
                .collect::<Result<_, _>>()?
        } else {
            graph
                .types
                .iter()
                .map(|ty| self.visit(graph, ty, started))
                .collect::<Result<_, _>>()?
        };

        let mut aggregator = AreaAggregator::new();
        let mut controllers = 0usize;
        for (area, controller) in found.into_iter().flatten() {
            controllers += 1;
            aggregator.push(area, controller);
        }
        let areas = aggregator.finish();
        info!(
            types = graph.len(),
            controllers,
            areas = areas.len(),
            parallel,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "discovery finished"
        );
        Ok(areas)
    }

    fn visit(
        &self,
        graph: &SymbolGraph,
        ty: &TypeDecl,
        started: Instant,
    ) -> Result<Option<(String, ControllerModel)>, DiscoveryError> {
        if let Some(limit) = self.options.timeout {
            if started.elapsed() >= limit {
                return Err(DiscoveryError::Timeout(limit));
            }
        }
        if !classify::is_controller(graph, ty, &self.options) {
            return Ok(None);
        }
        let actions = actions::extract_actions(ty);
        if actions.is_empty() {
            debug!(ty = %ty.full_name(), "controller has no actions");
            return Ok(None);
        }
        let area = area::resolve_area(graph, ty);
        let name = self.controller_name(ty);
        debug!(ty = %ty.full_name(), area = %area, controller = %name, actions = actions.len(), "controller");
        Ok(Some((area, ControllerModel { name, actions })))
    }

    fn controller_name(&self, ty: &TypeDecl) -> String {
        let name = ty.short_name();
        let suffix = self.options.controller_suffix.as_str();
        match name.strip_suffix(suffix) {
            Some(stem) if !suffix.is_empty() && !stem.is_empty() => stem.to_string(),
            _ => name.to_string(),
        }
    }
}

impl Default for Discoverer {
    fn default() -> Self {
        Self::new(DiscoveryOptions::default())
    }
}

/// Discovery with default options.
pub fn discover(graph: &SymbolGraph) -> Result<Vec<AreaModel>, DiscoveryError> {
    Discoverer::default().discover(graph)
}
