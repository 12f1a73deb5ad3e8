//! Build Pipeline Planning
//!
//! This example models a small build pipeline as a DAG:
//!
//! ```text
//! fetch ──┬──> compile ──┬──> test ────┐
//!         │              │             ├──> release
//!         │              └──> lint ────┤
//!         └──> docs ───────────────────┘
//! ```
//!
//! Edge weights are estimated minutes. The example shows:
//! 1. Cycle rejection when a bad dependency is declared
//! 2. The critical path (longest path by weight)
//! 3. The minimal dependency set via transitive reduction
//! 4. A JSON snapshot with a stable fingerprint
//! 5. Graphviz output
//!
//! ## Run
//!
//! ```bash
//! cargo run --example task_graph
//! ```

use dagweave::prelude::*;
use dagweave::{fingerprint, DotConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Step {
    name: String,
    stage: String,
}

impl Step {
    fn new(stage: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            stage: stage.to_string(),
        }
    }
}

impl Vertex for Step {
    fn id(&self) -> &str {
        &self.name
    }

    fn category(&self) -> &str {
        &self.stage
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let fetch = Step::new("source", "fetch");
    let compile = Step::new("build", "compile");
    let lint = Step::new("check", "lint");
    let test = Step::new("check", "test");
    let docs = Step::new("build", "docs");
    let release = Step::new("ship", "release");

    let mut pipeline = Dag::new();
    pipeline.add_edges([
        (fetch.clone(), compile.clone(), 2),
        (fetch.clone(), docs.clone(), 1),
        (compile.clone(), test.clone(), 8),
        (compile.clone(), lint.clone(), 3),
        (test.clone(), release.clone(), 1),
        (lint.clone(), release.clone(), 1),
        (docs.clone(), release.clone(), 4),
        // Redundant: already implied through compile
        (fetch.clone(), release.clone(), 0),
    ])?;

    // =========================================================================
    // Cycle rejection
    // =========================================================================
    match pipeline.add_edge(release.clone(), fetch.clone(), 1) {
        Err(e) => println!("rejected: {}", e),
        Ok(()) => println!("unexpectedly accepted a cycle"),
    }

    // =========================================================================
    // Critical path
    // =========================================================================
    let critical = pipeline.longest(&fetch, &release, PathMetric::Weight);
    let names: Vec<_> = critical.iter().map(|s| s.name.as_str()).collect();
    println!("critical path: {}", names.join(" -> "));

    let checks: Vec<_> = pipeline
        .vertices_in("check")
        .into_iter()
        .map(|s| s.name.as_str())
        .collect();
    println!("check stage: {:?}", checks);

    // =========================================================================
    // Minimal dependencies
    // =========================================================================
    let reduced = pipeline.reduce_dag(&fetch, &release);
    println!(
        "reduction keeps {} of {} edges",
        reduced.edge_count(),
        pipeline.edge_count()
    );

    // =========================================================================
    // Snapshot
    // =========================================================================
    let bytes = encode_snapshot(&pipeline.export())?;
    println!(
        "snapshot: {} bytes, fingerprint {:016x}",
        bytes.len(),
        fingerprint(&bytes)
    );
    let restored: Dag<Step> = decode_snapshot(&bytes)?;
    assert_eq!(restored, pipeline);

    let summary = pipeline.summary();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    // =========================================================================
    // Graphviz
    // =========================================================================
    println!("{}", reduced.to_dot(&DotConfig::default()));

    Ok(())
}
