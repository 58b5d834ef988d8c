// src/dag/plan.rs

use std::collections::{HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::dag::resolver::NameResolver;
use crate::errors::{Result, TaskdagError};
use crate::task::TaskRegistry;
use crate::types::TaskName;

/// One task in an execution plan.
#[derive(Debug, Clone)]
pub struct PlanNode {
    name: TaskName,
    /// Concrete, de-duplicated direct dependencies.
    deps: Vec<TaskName>,
    /// Tasks in this plan that list this one in `deps`.
    dependents: Vec<TaskName>,
    /// Task that pulled this one into the plan (`None` for the root).
    parent: Option<TaskName>,
    /// False when the name is referenced but not present in the registry.
    registered: bool,
}

impl PlanNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deps(&self) -> &[TaskName] {
        &self.deps
    }

    pub fn dependents(&self) -> &[TaskName] {
        &self.dependents
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

/// Glob-resolved dependency closure of a single root task.
///
/// Nodes are kept in discovery order: a pre-order walk from the root that
/// follows each task's dependencies in declared order and visits every task
/// once. The executor activates tasks in exactly this order.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    root: TaskName,
    nodes: HashMap<TaskName, PlanNode>,
    order: Vec<TaskName>,
}

impl ExecutionPlan {
    /// Resolve the full closure of `root` against `registry`.
    ///
    /// Fails on cycles and on malformed glob patterns. Unregistered names are
    /// kept as leaves and only reported when the build reaches them.
    pub fn build(root: &str, registry: &TaskRegistry) -> Result<Self> {
        let mut builder = PlanBuilder {
            registry,
            resolver: NameResolver::new(registry.names()),
            nodes: HashMap::new(),
            order: Vec::new(),
            path: Vec::new(),
            in_progress: HashSet::new(),
        };

        builder.visit(root, None)?;

        let PlanBuilder { mut nodes, order, .. } = builder;

        // Second pass: populate dependents, in discovery order.
        for name in &order {
            let deps = nodes
                .get(name)
                .map(|n| n.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }

        debug!(root = %root, tasks = order.len(), "built execution plan");

        Ok(Self {
            root: root.to_string(),
            nodes,
            order,
        })
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn node(&self, name: &str) -> Option<&PlanNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Nodes in discovery (activation) order.
    pub fn nodes(&self) -> impl Iterator<Item = &PlanNode> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }

    /// Task names in discovery (activation) order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    /// Immediate concrete dependencies of a task.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task within this plan.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Dependencies-first ordering of every task in the plan.
    pub fn execution_order(&self) -> Result<Vec<&str>> {
        // Edge direction: dep -> task.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for name in &self.order {
            graph.add_node(name.as_str());
        }
        for node in self.nodes() {
            for dep in &node.deps {
                graph.add_edge(dep.as_str(), node.name.as_str(), ());
            }
        }

        toposort(&graph, None).map_err(|cycle| {
            TaskdagError::CyclicDependency(format!(
                "cycle in execution plan involving task '{}'",
                cycle.node_id()
            ))
        })
    }
}

struct PlanBuilder<'a> {
    registry: &'a TaskRegistry,
    resolver: NameResolver<'a>,
    nodes: HashMap<TaskName, PlanNode>,
    order: Vec<TaskName>,
    /// Chain of tasks currently being resolved, for cycle messages.
    path: Vec<TaskName>,
    in_progress: HashSet<TaskName>,
}

impl PlanBuilder<'_> {
    fn visit(&mut self, name: &str, parent: Option<&str>) -> Result<()> {
        if self.in_progress.contains(name) {
            return Err(self.cycle_error(name));
        }
        if self.nodes.contains_key(name) {
            return Ok(());
        }

        let Some(task) = self.registry.get(name) else {
            debug!(task = %name, parent = ?parent, "plan references unregistered task");
            self.insert(name, parent, Vec::new(), false);
            return Ok(());
        };

        let deps = self.resolver.resolve_all(task.deps())?;
        self.insert(name, parent, deps.clone(), true);

        self.in_progress.insert(name.to_string());
        self.path.push(name.to_string());

        for dep in &deps {
            self.visit(dep, Some(name))?;
        }

        self.path.pop();
        self.in_progress.remove(name);
        Ok(())
    }

    fn insert(&mut self, name: &str, parent: Option<&str>, deps: Vec<TaskName>, registered: bool) {
        self.order.push(name.to_string());
        self.nodes.insert(
            name.to_string(),
            PlanNode {
                name: name.to_string(),
                deps,
                dependents: Vec::new(),
                parent: parent.map(str::to_string),
                registered,
            },
        );
    }

    fn cycle_error(&self, name: &str) -> TaskdagError {
        let start = self.path.iter().position(|n| n == name).unwrap_or(0);
        let mut cycle: Vec<&str> = self.path[start..].iter().map(|s| s.as_str()).collect();
        cycle.push(name);
        TaskdagError::CyclicDependency(cycle.join(" -> "))
    }
}
