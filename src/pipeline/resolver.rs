use crate::compatibility::CompatibilityDatabase;
use crate::mod_metadata::{ModId, ModMetadata, Status};
use crate::version::SemanticVersion;
use std::collections::HashMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Queued,
    Checking,
    Sorted,
    Failed,
}

struct DependencyEdge {
    declared_id: String,
    target: Option<usize>,
    is_required: bool,
    minimum_version: Option<SemanticVersion>,
}

/// Computes a total load order from a validated metadata sequence: a depth-first topological sort
/// with cycle detection, missing/under-versioned dependency diagnosis, and transitive failure
/// propagation. A dependency is visited, and so pushed, before its dependent, so the push order is
/// already the output order. Mods that were already `Failed` going in are emitted last, after every
/// successfully sorted mod.
pub fn resolve(metadata: Vec<ModMetadata>, compat_db: &CompatibilityDatabase) -> Vec<ModMetadata> {
    let id_to_index = build_id_index(&metadata);
    let edges: Vec<Vec<DependencyEdge>> = metadata
        .iter()
        .map(|meta| build_edges(meta, &id_to_index))
        .collect();

    let mut ctx = ResolverContext {
        metadata,
        states: Vec::new(),
        stack: Vec::new(),
        edges,
        compat_db,
    };
    ctx.states = vec![NodeState::Queued; ctx.metadata.len()];

    // Mark pre-failed input mods first so every visit() sees them as Failed, but don't push them
    // onto the stack yet: visit() appends in post-order as it completes each mod, and a Vec keeps
    // that push order as-is, so appending the pre-failed mods afterward is what lands them last.
    let pre_failed: Vec<usize> = (0..ctx.metadata.len())
        .filter(|&i| ctx.metadata[i].is_failed())
        .collect();
    for &i in &pre_failed {
        ctx.states[i] = NodeState::Failed;
    }

    for i in 0..ctx.metadata.len() {
        if ctx.states[i] == NodeState::Queued {
            ctx.visit(i, &[]);
        }
    }

    ctx.stack.extend(pre_failed);
    let order = ctx.stack;
    let mut metadata = ctx.metadata;
    let mut ordered = Vec::with_capacity(order.len());
    // Build the output by index so the final Vec matches the resolved order exactly once.
    let mut taken = vec![false; metadata.len()];
    for &i in &order {
        taken[i] = true;
    }
    debug_assert!(taken.iter().all(|&t| t), "every mod must be visited exactly once");
    let mut slots: Vec<Option<ModMetadata>> = metadata.drain(..).map(Some).collect();
    for i in order {
        ordered.push(slots[i].take().expect("each index appears exactly once in the stack"));
    }
    ordered
}

fn build_id_index(metadata: &[ModMetadata]) -> HashMap<ModId, usize> {
    let mut index = HashMap::new();
    for (i, meta) in metadata.iter().enumerate() {
        if let Some(manifest) = &meta.manifest {
            if !manifest.unique_id.trim().is_empty() {
                index.insert(ModId::new(manifest.unique_id.clone()), i);
            }
        }
    }
    index
}

fn build_edges(meta: &ModMetadata, id_to_index: &HashMap<ModId, usize>) -> Vec<DependencyEdge> {
    let Some(manifest) = &meta.manifest else {
        return Vec::new();
    };
    let mut edges = Vec::new();

    if let Some(parent) = &manifest.content_pack_for {
        edges.push(DependencyEdge {
            declared_id: parent.unique_id.clone(),
            target: id_to_index.get(&ModId::new(&parent.unique_id)).copied(),
            is_required: true,
            minimum_version: parent.minimum_version.clone(),
        });
    }

    for dep in &manifest.dependencies {
        edges.push(DependencyEdge {
            declared_id: dep.unique_id.clone(),
            target: id_to_index.get(&ModId::new(&dep.unique_id)).copied(),
            is_required: dep.is_required,
            minimum_version: dep.minimum_version.clone(),
        });
    }
    edges
}

struct ResolverContext<'a> {
    metadata: Vec<ModMetadata>,
    states: Vec<NodeState>,
    stack: Vec<usize>,
    edges: Vec<Vec<DependencyEdge>>,
    compat_db: &'a CompatibilityDatabase,
}

impl<'a> ResolverContext<'a> {
    fn display_name(&self, index: usize) -> String {
        self.metadata[index].display_name.clone()
    }

    fn fail(&mut self, index: usize, reason: String) -> NodeState {
        self.metadata[index].set_status(Status::Failed, Some(reason));
        self.states[index] = NodeState::Failed;
        self.stack.push(index);
        NodeState::Failed
    }

    fn sort(&mut self, index: usize) -> NodeState {
        self.states[index] = NodeState::Sorted;
        self.stack.push(index);
        NodeState::Sorted
    }

    fn label_for_missing(&self, declared_id: &str) -> (String, String) {
        let display_name = self
            .compat_db
            .display_name(declared_id)
            .map(str::to_string)
            .unwrap_or_else(|| declared_id.to_string());
        let label = match self.compat_db.mod_page_url(declared_id) {
            Some(url) => format!("{}: {}", display_name, url),
            None => display_name.clone(),
        };
        (display_name, label)
    }

    fn visit(&mut self, index: usize, chain: &[usize]) -> NodeState {
        match self.states[index] {
            NodeState::Sorted | NodeState::Failed => return self.states[index],
            NodeState::Checking => {
                panic!(
                    "internal invariant violated: visited mod '{}' while it was already being checked \
                     (a cycle must be caught by the caller before recursing, never observed here)",
                    self.display_name(index)
                );
            }
            NodeState::Queued => {}
        }

        self.states[index] = NodeState::Checking;
        let edge_count = self.edges[index].len();
        if edge_count == 0 {
            return self.sort(index);
        }

        // Missing required dependencies.
        let mut missing_labels: Vec<(String, String)> = Vec::new();
        for e in 0..edge_count {
            let edge = &self.edges[index][e];
            if edge.is_required && edge.target.is_none() {
                missing_labels.push(self.label_for_missing(&self.edges[index][e].declared_id.clone()));
            }
        }
        if !missing_labels.is_empty() {
            missing_labels.sort_by(|a, b| a.0.cmp(&b.0));
            let joined = missing_labels
                .into_iter()
                .map(|(_, label)| label)
                .collect::<Vec<_>>()
                .join(", ");
            return self.fail(
                index,
                format!("it requires mods which aren't installed ({})", joined),
            );
        }

        // Minimum-version shortfalls.
        let mut shortfalls = Vec::new();
        for e in 0..edge_count {
            let (target, minimum_version) = {
                let edge = &self.edges[index][e];
                (edge.target, edge.minimum_version.clone())
            };
            let Some(target) = target else { continue };
            let Some(minimum_version) = minimum_version else { continue };
            let target_version = self.metadata[target]
                .manifest
                .as_ref()
                .expect("a mod that is an edge target was indexed from a manifest")
                .version
                .clone();
            if minimum_version.is_newer_than(&target_version) {
                shortfalls.push(format!(
                    "{} (needs {} or later)",
                    self.display_name(target),
                    minimum_version
                ));
            }
        }
        if !shortfalls.is_empty() {
            return self.fail(
                index,
                format!(
                    "it needs newer versions of some mods: {}",
                    shortfalls.join(", ")
                ),
            );
        }

        // Recurse into each dependency with a resolvable target (optional dependencies with no
        // installed target were already skipped; required ones without a target failed above).
        for e in 0..edge_count {
            let target = self.edges[index][e].target;
            let Some(target) = target else {
                continue;
            };

            if self.states[target] == NodeState::Checking {
                let mut message = String::from("its dependencies have a circular reference: ");
                for (pos, &ancestor) in chain.iter().enumerate() {
                    if pos > 0 {
                        message.push_str(" => ");
                    }
                    let _ = write!(message, "{}", self.display_name(ancestor));
                }
                if !chain.is_empty() {
                    message.push_str(" => ");
                }
                let _ = write!(message, "{}", self.display_name(target));
                return self.fail(index, message);
            }

            let mut extended_chain = chain.to_vec();
            extended_chain.push(index);
            let result = self.visit(target, &extended_chain);
            if result == NodeState::Failed {
                return self.fail(
                    index,
                    format!(
                        "it needs the '{}' mod, which couldn't be loaded.",
                        self.display_name(target)
                    ),
                );
            }
        }

        self.sort(index)
    }
}
