//! Server configuration from command-line flags and environment variables.

use std::net::SocketAddr;

use algoviz_trace::{Algorithm, GenerationOptions, InputKind, DEFAULT_MAX_DEQUEUES};
use clap::Parser;

use crate::error::{Error, Result};
use crate::input::InputSpec;

/// Configuration for the visualization server.
#[derive(Debug, Clone, Parser)]
#[command(name = "algoviz-vis", version, about = "Step-by-step algorithm playback server")]
pub struct VisConfig {
    /// Address to bind
    #[arg(long, env = "ALGOVIZ_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "ALGOVIZ_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Initial playback speed (1-10)
    #[arg(long, env = "ALGOVIZ_SPEED", default_value_t = 5)]
    pub speed: i64,

    /// Traversal dequeue bound before a trace is truncated
    #[arg(long, env = "ALGOVIZ_MAX_DEQUEUES", default_value_t = DEFAULT_MAX_DEQUEUES)]
    pub max_dequeues: usize,

    /// Initial algorithm (bubble_sort, selection_sort, breadth_first)
    #[arg(short, long, env = "ALGOVIZ_ALGORITHM", default_value = "bubble_sort")]
    pub algorithm: Algorithm,

    /// Initial values for sorting algorithms
    #[arg(long, env = "ALGOVIZ_VALUES", default_value = "5,3,8,1,9,2,7")]
    pub values: String,

    /// Node count for traversal; the sample graph is used when omitted
    #[arg(long, env = "ALGOVIZ_NODES")]
    pub nodes: Option<usize>,

    /// Edges as comma-separated from-to pairs
    #[arg(long, env = "ALGOVIZ_EDGES", default_value = "")]
    pub edges: String,

    /// Treat edges as one-way
    #[arg(long, env = "ALGOVIZ_DIRECTED")]
    pub directed: bool,

    /// Traversal start node
    #[arg(long, env = "ALGOVIZ_START", default_value_t = 0)]
    pub start: usize,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            speed: 5,
            max_dequeues: DEFAULT_MAX_DEQUEUES,
            algorithm: Algorithm::BubbleSort,
            values: "5,3,8,1,9,2,7".to_string(),
            nodes: None,
            edges: String::new(),
            directed: false,
            start: 0,
        }
    }
}

impl VisConfig {
    /// Socket address to bind.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid listen address {}:{}: {e}", self.host, self.port)))
    }

    /// Generation options derived from the flags.
    pub fn generation_options(&self) -> Result<GenerationOptions> {
        if self.max_dequeues == 0 {
            return Err(Error::Config("max-dequeues must be at least 1".into()));
        }
        Ok(GenerationOptions {
            max_dequeues: self.max_dequeues,
        })
    }

    /// Input description matching the configured algorithm.
    pub fn input_spec(&self) -> InputSpec {
        match (self.algorithm.input_kind(), self.nodes) {
            (InputKind::Sequence, _) => InputSpec::Sequence {
                values: self.values.clone(),
            },
            (InputKind::Graph, Some(node_count)) => InputSpec::Graph {
                node_count,
                edges: self.edges.clone(),
                directed: self.directed,
                start: self.start,
            },
            (InputKind::Graph, None) => InputSpec::SampleGraph,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_usable() {
        let config = VisConfig::default();
        assert_eq!(config.listen_addr().unwrap().port(), 3000);
        assert!(config.input_spec().build().is_ok());
        assert_eq!(config.generation_options().unwrap(), GenerationOptions::default());
    }

    #[test]
    fn parses_flags() {
        let config = VisConfig::try_parse_from([
            "algoviz-vis",
            "--port",
            "8080",
            "--algorithm",
            "bfs",
            "--nodes",
            "4",
            "--edges",
            "0-1,1-2,2-3",
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.algorithm, Algorithm::BreadthFirst);
        assert_eq!(
            config.input_spec(),
            InputSpec::Graph {
                node_count: 4,
                edges: "0-1,1-2,2-3".into(),
                directed: false,
                start: 0,
            }
        );
    }

    #[test]
    fn graph_algorithm_without_nodes_uses_sample() {
        let config = VisConfig {
            algorithm: Algorithm::BreadthFirst,
            ..VisConfig::default()
        };
        assert_eq!(config.input_spec(), InputSpec::SampleGraph);
    }

    #[test]
    fn rejects_unknown_algorithm() {
        assert!(VisConfig::try_parse_from(["algoviz-vis", "--algorithm", "quicksort"]).is_err());
    }

    #[test]
    fn rejects_bad_host_and_zero_bound() {
        let config = VisConfig {
            host: "not an ip".into(),
            max_dequeues: 0,
            ..VisConfig::default()
        };
        assert!(matches!(config.listen_addr(), Err(Error::Config(_))));
        assert!(config.generation_options().is_err());
    }
}
